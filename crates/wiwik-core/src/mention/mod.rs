//! `@mention` autocomplete.
//!
//! [`MentionWidget`] watches a [`TextField`], detects a trigger token ending
//! at the caret, asks the host to search for matching users, and renders a
//! menu anchored just below the caret.

pub mod caret;
mod field;
pub mod menu;
pub mod trigger;
mod widget;

pub use caret::{CaretCoordinates, EngineQuirks, FieldLayout, FieldStyle, caret_coordinates};
pub use field::{FieldPlacement, Point, TextBuffer, TextField};
pub use menu::{Anchor, MenuBuffer, MenuItem, MenuSurface, MenuView, SelectItem};
pub use trigger::{Trigger, detect_trigger};
pub use widget::{Key, KeyOutcome, MentionWidget, SearchTicket, WidgetState};
