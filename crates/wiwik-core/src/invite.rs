//! Tag-input selection of users to invite to a question.
//!
//! Typing fetches suggestions (excluding users already picked); picked
//! users become tags. Only suggested, enabled users can be added and each
//! user at most once. The selection is submitted as comma-joined usernames.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::mention::SearchTicket;
use crate::search::{SearchError, SearchQuery, SearchResult};

/// Why a user could not be added.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InviteRejection {
    #[error("'{0}' is not among the suggestions")]
    NotSuggested(String),
    #[error("'{username}' cannot be invited: {reason}")]
    Disabled { username: String, reason: String },
    #[error("'{0}' is already selected")]
    Duplicate(String),
}

/// Dropdown text for one suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionLabel {
    /// `name`, or the username when the name is empty.
    pub title: String,
    /// `"(username)"`.
    pub username: String,
    /// Email, plus `" - <reason>"` for disabled users.
    pub detail: String,
}

impl fmt::Display for SuggestionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.title, self.username)?;
        if !self.detail.is_empty() {
            write!(f, " {}", self.detail)?;
        }
        Ok(())
    }
}

pub fn suggestion_label(user: &SearchResult) -> SuggestionLabel {
    let mut detail = user.email.clone().unwrap_or_default();
    if user.is_disabled() {
        detail.push_str(" - ");
        detail.push_str(user.disabled_message.as_deref().unwrap_or_default());
    }
    SuggestionLabel {
        title: user.display_name().to_string(),
        username: format!("({})", user.username),
        detail,
    }
}

/// Text shown on a selected tag.
pub fn tag_label(user: &SearchResult) -> &str {
    user.display_name()
}

fn tag_value(user: &SearchResult) -> &str {
    user.value.as_deref().unwrap_or(&user.username)
}

fn matches_query(user: &SearchResult, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    [Some(user.username.as_str()), user.name.as_deref(), user.email.as_deref()]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// State of the invite tag input.
#[derive(Debug, Clone)]
pub struct InviteSelection {
    selected: Vec<SearchResult>,
    /// `None` while a fetch is in flight.
    whitelist: Option<Vec<SearchResult>>,
    blacklist: Vec<SearchResult>,
    loading: bool,
    dropdown_visible: bool,
    highlighted: Option<usize>,
    input: String,
    generation: u64,
    max_suggestions: usize,
    notice: Option<String>,
}

impl InviteSelection {
    pub const fn new(max_suggestions: usize) -> Self {
        Self {
            selected: Vec::new(),
            whitelist: Some(Vec::new()),
            blacklist: Vec::new(),
            loading: false,
            dropdown_visible: false,
            highlighted: None,
            input: String::new(),
            generation: 0,
            max_suggestions,
            notice: None,
        }
    }

    pub fn selected(&self) -> &[SearchResult] {
        &self.selected
    }

    pub fn selected_usernames(&self) -> Vec<String> {
        self.selected.iter().map(|u| u.username.clone()).collect()
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub const fn dropdown_visible(&self) -> bool {
        self.dropdown_visible
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn whitelist(&self) -> Option<&[SearchResult]> {
        self.whitelist.as_deref()
    }

    pub fn blacklist(&self) -> &[SearchResult] {
        &self.blacklist
    }

    pub const fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// The text being typed changed: clear suggestions and ask for new ones.
    pub fn on_input(&mut self, text: &str) -> SearchTicket {
        text.clone_into(&mut self.input);
        self.whitelist = None;
        self.loading = true;
        self.dropdown_visible = false;
        self.highlighted = None;
        self.generation += 1;
        SearchTicket {
            generation: self.generation,
            query: SearchQuery::new(text).with_selected(self.selected_usernames()),
        }
    }

    /// Apply the results of the latest [`Self::on_input`] ticket.
    pub fn on_results(
        &mut self,
        ticket: &SearchTicket,
        result: Result<Vec<SearchResult>, SearchError>,
    ) {
        if ticket.generation != self.generation {
            debug!(generation = ticket.generation, "Discarding stale invite suggestions");
            return;
        }
        let results = match result {
            Ok(results) => results,
            Err(e) if e.is_malformed() => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Invite suggestions failed");
                self.notice = Some(format!("User search failed: {e}"));
                Vec::new()
            }
        };

        self.blacklist = results.iter().filter(|r| r.is_disabled()).cloned().collect();
        let mut whitelist = results;
        whitelist.extend(self.selected.iter().cloned());
        self.whitelist = Some(whitelist);
        self.loading = false;
        self.dropdown_visible = true;
        self.highlighted = (!self.suggestions().is_empty()).then_some(0);
    }

    /// Dropdown entries: whitelisted users matching the input that are not
    /// selected yet, capped at the configured maximum.
    pub fn suggestions(&self) -> Vec<&SearchResult> {
        let Some(whitelist) = &self.whitelist else {
            return Vec::new();
        };
        whitelist
            .iter()
            .filter(|u| !self.is_selected(&u.username))
            .filter(|u| matches_query(u, &self.input))
            .take(self.max_suggestions)
            .collect()
    }

    pub fn move_highlight(&mut self, delta: isize) {
        let count = self.suggestions().len();
        if count == 0 {
            self.highlighted = None;
            return;
        }
        let current = self.highlighted.unwrap_or(0);
        self.highlighted = Some(current.saturating_add_signed(delta).min(count - 1));
    }

    /// Add the highlighted suggestion.
    pub fn accept_highlighted(&mut self) -> Result<(), InviteRejection> {
        let username = self
            .highlighted
            .and_then(|i| self.suggestions().get(i).map(|u| u.username.clone()))
            .ok_or_else(|| InviteRejection::NotSuggested(self.input.clone()))?;
        self.add(&username)
    }

    /// Add a user by username.
    pub fn add(&mut self, username: &str) -> Result<(), InviteRejection> {
        if self.is_selected(username) {
            return Err(InviteRejection::Duplicate(username.to_string()));
        }
        if let Some(blocked) = self.blacklist.iter().find(|u| u.username == username) {
            return Err(InviteRejection::Disabled {
                username: username.to_string(),
                reason: blocked.disabled_message.clone().unwrap_or_default(),
            });
        }
        let user = self
            .whitelist
            .iter()
            .flatten()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| InviteRejection::NotSuggested(username.to_string()))?;

        debug!(%username, "Added invitee");
        self.selected.push(user);
        self.input.clear();
        self.dropdown_visible = false;
        self.highlighted = None;
        Ok(())
    }

    pub fn remove(&mut self, username: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|u| u.username != username);
        before != self.selected.len()
    }

    pub fn remove_last(&mut self) -> Option<SearchResult> {
        self.selected.pop()
    }

    pub fn hide_dropdown(&mut self) {
        self.dropdown_visible = false;
    }

    /// Value submitted with the invite form.
    pub fn form_value(&self) -> String {
        self.selected
            .iter()
            .map(tag_value)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    fn is_selected(&self, username: &str) -> bool {
        self.selected.iter().any(|u| u.username == username)
    }
}

impl Default for InviteSelection {
    fn default() -> Self {
        Self::new(crate::config::InviteConfig::default().max_suggestions)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(username: &str) -> SearchResult {
        SearchResult::named(username)
    }

    fn disabled(username: &str, reason: &str) -> SearchResult {
        SearchResult {
            disabled: Some(true),
            disabled_message: Some(reason.to_string()),
            ..SearchResult::named(username)
        }
    }

    fn with_results(sel: &mut InviteSelection, text: &str, results: Vec<SearchResult>) {
        let ticket = sel.on_input(text);
        sel.on_results(&ticket, Ok(results));
    }

    #[test]
    fn input_clears_whitelist_and_sets_loading() {
        let mut sel = InviteSelection::default();
        with_results(&mut sel, "a", vec![user("amy")]);
        let ticket = sel.on_input("am");
        assert!(sel.is_loading());
        assert!(!sel.dropdown_visible());
        assert!(sel.whitelist().is_none());
        assert_eq!(ticket.query.text, "am");
    }

    #[test]
    fn ticket_carries_selected_usernames() {
        let mut sel = InviteSelection::default();
        with_results(&mut sel, "a", vec![user("amy"), user("ann")]);
        sel.add("amy").unwrap();
        let ticket = sel.on_input("a");
        assert_eq!(ticket.query.selected, ["amy"]);
    }

    #[test]
    fn results_populate_whitelist_and_blacklist() {
        let mut sel = InviteSelection::default();
        with_results(&mut sel, "a", vec![user("amy")]);
        sel.add("amy").unwrap();
        with_results(
            &mut sel,
            "a",
            vec![user("ann"), disabled("al", "already invited")],
        );
        assert!(!sel.is_loading());
        assert!(sel.dropdown_visible());
        let names: Vec<_> = sel
            .whitelist()
            .unwrap()
            .iter()
            .map(|u| u.username.as_str())
            .collect();
        assert_eq!(names, ["ann", "al", "amy"]);
        assert_eq!(sel.blacklist().len(), 1);
        assert_eq!(sel.highlighted(), Some(0));
    }

    #[test]
    fn suggestions_skip_selected_users() {
        let mut sel = InviteSelection::default();
        with_results(&mut sel, "a", vec![user("amy"), user("ann")]);
        sel.add("amy").unwrap();
        with_results(&mut sel, "a", vec![user("ann")]);
        let names: Vec<_> = sel.suggestions().iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["ann"]);
    }

    #[test]
    fn duplicates_rejected() {
        let mut sel = InviteSelection::default();
        with_results(&mut sel, "a", vec![user("amy")]);
        sel.add("amy").unwrap();
        assert_eq!(
            sel.add("amy"),
            Err(InviteRejection::Duplicate("amy".into()))
        );
        assert_eq!(sel.selected().len(), 1);
    }

    #[test]
    fn unknown_user_skipped() {
        let mut sel = InviteSelection::default();
        with_results(&mut sel, "a", vec![user("amy")]);
        assert!(matches!(
            sel.add("mallory"),
            Err(InviteRejection::NotSuggested(_))
        ));
        assert!(sel.selected().is_empty());
    }

    #[test]
    fn disabled_user_rejected_with_reason() {
        let mut sel = InviteSelection::default();
        with_results(&mut sel, "a", vec![disabled("al", "already invited")]);
        let err = sel.add("al").unwrap_err();
        assert_eq!(err.to_string(), "'al' cannot be invited: already invited");
    }

    #[test]
    fn nothing_addable_while_loading() {
        let mut sel = InviteSelection::default();
        sel.on_input("a");
        assert!(sel.add("amy").is_err());
    }

    #[test]
    fn stale_results_ignored() {
        let mut sel = InviteSelection::default();
        let old = sel.on_input("a");
        let new = sel.on_input("am");
        sel.on_results(&old, Ok(vec![user("al")]));
        assert!(sel.is_loading());
        sel.on_results(&new, Ok(vec![user("amy")]));
        assert_eq!(sel.suggestions().len(), 1);
    }

    #[test]
    fn failure_leaves_notice_and_empty_dropdown() {
        let mut sel = InviteSelection::default();
        let ticket = sel.on_input("a");
        sel.on_results(
            &ticket,
            Err(SearchError::Api {
                status: 502,
                message: "bad gateway".into(),
            }),
        );
        assert!(!sel.is_loading());
        assert!(sel.suggestions().is_empty());
        assert!(sel.take_notice().is_some());
    }

    #[test]
    fn highlight_and_accept() {
        let mut sel = InviteSelection::default();
        with_results(&mut sel, "a", vec![user("amy"), user("ann")]);
        sel.move_highlight(1);
        sel.move_highlight(5);
        assert_eq!(sel.highlighted(), Some(1));
        sel.accept_highlighted().unwrap();
        assert_eq!(sel.selected_usernames(), ["ann"]);
        assert!(!sel.dropdown_visible());
        assert_eq!(sel.input(), "");
    }

    #[test]
    fn form_value_joins_with_commas() {
        let mut sel = InviteSelection::default();
        with_results(&mut sel, "", vec![user("amy"), user("bob"), user("cy")]);
        sel.add("amy").unwrap();
        sel.add("cy").unwrap();
        assert_eq!(sel.form_value(), "amy,cy");
        assert!(sel.remove("amy"));
        assert!(!sel.remove("amy"));
        assert_eq!(sel.remove_last().unwrap().username, "cy");
        assert_eq!(sel.form_value(), "");
    }

    #[test]
    fn suggestions_capped() {
        let mut sel = InviteSelection::new(2);
        with_results(&mut sel, "", vec![user("a1"), user("a2"), user("a3")]);
        assert_eq!(sel.suggestions().len(), 2);
    }

    #[test]
    fn labels() {
        let bob = SearchResult {
            name: Some("Bob Ross".into()),
            email: Some("bob@example.com".into()),
            ..SearchResult::named("bob")
        };
        let label = suggestion_label(&bob);
        assert_eq!(label.to_string(), "Bob Ross (bob) bob@example.com");
        assert_eq!(tag_label(&bob), "Bob Ross");

        let al = SearchResult {
            email: Some("al@example.com".into()),
            ..disabled("al", "already invited")
        };
        assert_eq!(
            suggestion_label(&al).to_string(),
            "al (al) al@example.com - already invited"
        );
    }
}
