//! wiwik Core Library
//!
//! Client-side behaviours for the wiwik forum, independent of any UI toolkit:
//! - `@mention` autocomplete widget with caret-anchored menu placement
//! - Tag-input style invite selection
//! - Remote user search (`/users-autocomplete/`)
//! - Theme persistence, popover configuration, dwell-time tracking
//! - Configuration resolution and common error types

pub mod config;
pub mod dwell;
pub mod error;
pub mod invite;
pub mod mention;
pub mod popover;
pub mod search;
pub mod storage;
pub mod theme;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use invite::InviteSelection;
pub use mention::{MentionWidget, TextBuffer, TextField};
pub use search::{SearchError, SearchQuery, SearchResult, UserDirectory, UserSearch, UsersClient};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use theme::Theme;
