//! TUI rendering components.

mod palette;
mod render;

pub use palette::Palette;
pub use render::{INVITE_PANEL_HEIGHT, draw};
