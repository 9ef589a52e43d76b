//! Application state for the composer TUI.

mod state;

pub use state::{
    App, AppOptions, COMPOSER_QUIRKS, Effect, Focus, HELP_CONTENT_ID, PopoverState, Response,
    page_url,
};
