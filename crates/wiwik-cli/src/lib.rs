//! wiwik CLI Library
//!
//! Terminal composer for the wiwik forum with `@mention` autocomplete.
//! Provides both a TUI (ratatui) and headless subcommands.

pub mod app;
pub mod backend;
pub mod clipboard;
pub mod headless;
pub mod tui;
pub mod ui;
