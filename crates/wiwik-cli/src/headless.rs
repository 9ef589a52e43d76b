//! Non-interactive subcommands: user search, invites and theme.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::Write;

use wiwik_core::search::{SearchQuery, SearchResult, UserSearch};
use wiwik_core::storage::KeyValueStore;
use wiwik_core::theme::{self, SchemePreference, Theme};

use crate::backend::Backend;

/// Theme subcommand actions.
#[derive(clap::Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    /// Print the active theme.
    Show,
    /// Switch to the light theme.
    Light,
    /// Switch to the dark theme.
    Dark,
    /// Switch to the other theme.
    Toggle,
}

fn truncate(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        s.to_string()
    } else {
        format!("{}…", s.chars().take(max - 1).collect::<String>())
    }
}

fn status(user: &SearchResult) -> String {
    if user.is_disabled() {
        format!(
            "disabled: {}",
            user.disabled_message.as_deref().unwrap_or_default()
        )
    } else {
        String::new()
    }
}

/// Look users up and print them as a table, or as JSON with `json`.
pub async fn run_search(
    search: &impl UserSearch,
    query: &SearchQuery,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let results = search.search(query).await?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &results)?;
        writeln!(out)?;
        return Ok(());
    }
    if results.is_empty() {
        writeln!(out, "No users found.")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<16} {:<24} {:<28} {}",
        "USERNAME", "NAME", "EMAIL", "STATUS"
    )?;
    for user in &results {
        writeln!(
            out,
            "{:<16} {:<24} {:<28} {}",
            truncate(&user.username, 16),
            truncate(user.name.as_deref().unwrap_or_default(), 24),
            truncate(user.email.as_deref().unwrap_or_default(), 28),
            status(user),
        )?;
    }
    writeln!(out, "\n{} user(s)", results.len())?;
    Ok(())
}

pub async fn run_invite(
    backend: &Backend,
    question_id: u64,
    usernames: &[String],
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if usernames.is_empty() {
        anyhow::bail!("no usernames given");
    }
    backend.invite(question_id, usernames).await?;
    writeln!(
        out,
        "Invited {} user(s) to question #{question_id}: {}",
        usernames.len(),
        usernames.join(", ")
    )?;
    Ok(())
}

/// Show or change the persisted theme.
pub fn run_theme(
    store: &mut impl KeyValueStore,
    action: ThemeAction,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let theme = match action {
        ThemeAction::Show => theme::detect_color_scheme(store, SchemePreference::from_env()),
        ThemeAction::Light => theme::set(store, Theme::Light)?,
        ThemeAction::Dark => theme::set(store, Theme::Dark)?,
        ThemeAction::Toggle => {
            let current = theme::detect_color_scheme(store, SchemePreference::from_env());
            theme::toggle(store, current)?
        }
    };
    writeln!(out, "{theme} [{}]", theme::indicator(theme))?;
    Ok(())
}
