//! Composer state and the handlers the event loop drives.
//!
//! Handlers never block: anything that needs the network or the terminal
//! comes back as an [`Effect`] for the loop to run, and its outcome returns
//! as a [`Response`].

use std::collections::HashMap;
use std::time::Duration;

use ratatui::layout::{Position, Rect};
use tracing::{debug, info, warn};

use wiwik_core::config::Config;
use wiwik_core::dwell::{DwellReport, DwellTracker};
use wiwik_core::mention::menu::scroll_window;
use wiwik_core::mention::{EngineQuirks, FieldStyle, MenuBuffer, SearchTicket, SelectItem};
use wiwik_core::popover::{self, PopoverConfig, PopoverTrigger};
use wiwik_core::search::{SearchError, SearchResult};
use wiwik_core::storage::KeyValueStore;
use wiwik_core::theme::{self, SchemePreference, Theme};
use wiwik_core::{InviteSelection, MentionWidget, TextBuffer, TextField};

/// Terminals draw a scrollbar inside the composer once the text overflows.
pub const COMPOSER_QUIRKS: EngineQuirks = EngineQuirks {
    force_scroll_on_overflow: true,
};

/// Content id of the key help popover.
pub const HELP_CONTENT_ID: &str = "composer-keys";

const HELP_TEXT: &str = "Type @ and a few letters to mention someone.\n\
Up/Down pick a user, Enter or Tab insert it, or click a row.\n\
F2 invite panel, F3 share link, F4 theme, F5 send invites.\n\
Ctrl+C quits.";

/// Which input receives typed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Composer,
    Invite,
}

/// Work a handler asks the event loop to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    MentionSearch(SearchTicket),
    InviteSearch(SearchTicket),
    SendInvites {
        question_id: u64,
        usernames: Vec<String>,
    },
    Copy(String),
}

/// Outcome of an [`Effect`] that ran in the background.
#[derive(Debug)]
pub enum Response {
    Mention(SearchTicket, Result<Vec<SearchResult>, SearchError>),
    Invite(SearchTicket, Result<Vec<SearchResult>, SearchError>),
    Invited {
        usernames: Vec<String>,
        result: Result<(), SearchError>,
    },
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// An opened popover and its show/hide timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopoverState {
    pub config: PopoverConfig,
    opened_at: u64,
    closing_at: Option<u64>,
}

impl PopoverState {
    pub const fn new(config: PopoverConfig, now: u64) -> Self {
        Self {
            config,
            opened_at: now,
            closing_at: None,
        }
    }

    pub const fn is_closing(&self) -> bool {
        self.closing_at.is_some()
    }

    pub fn close(&mut self, now: u64) {
        self.closing_at.get_or_insert(now);
    }

    /// Content popovers appear after their show delay and linger for the
    /// hide delay once closed; share links toggle immediately.
    pub fn is_visible(&self, now: u64) -> bool {
        match &self.config {
            PopoverConfig::Content {
                show_delay,
                hide_delay,
                ..
            } => {
                let shown = now >= self.opened_at.saturating_add(millis(*show_delay));
                let hidden = self
                    .closing_at
                    .is_some_and(|at| now >= at.saturating_add(millis(*hide_delay)));
                shown && !hidden
            }
            PopoverConfig::ShareLink { .. } => self.closing_at.is_none(),
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.is_closing() && !self.is_visible(now)
    }
}

/// Per-run settings that do not come from the config file.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub question_id: Option<u64>,
    pub page_url: String,
    pub offline: bool,
}

/// Address of the page being composed on.
pub fn page_url(base_url: &str, question_id: Option<u64>) -> String {
    let base = base_url.trim_end_matches('/');
    match question_id {
        Some(id) => format!("{base}/question/{id}/"),
        None => format!("{base}/"),
    }
}

pub struct App {
    pub field: TextBuffer,
    pub mention: MentionWidget,
    pub menu: MenuBuffer,
    /// First menu row shown when there are more candidates than rows.
    pub menu_scroll: usize,
    pub visible_items: usize,
    pub invite: InviteSelection,
    pub invite_open: bool,
    pub focus: Focus,
    pub popover: Option<PopoverState>,
    pub theme: Theme,
    pub status: String,
    pub should_quit: bool,
    pub question_id: Option<u64>,
    pub page_url: String,
    pub offline: bool,
    /// Screen areas from the last draw, used for mouse hit-testing.
    pub field_area: Option<Rect>,
    pub menu_area: Option<Rect>,
    store: Box<dyn KeyValueStore + Send>,
    dwell: Option<DwellTracker>,
    popover_contents: HashMap<String, String>,
    now: u64,
}

impl App {
    pub fn new(config: &Config, mut store: Box<dyn KeyValueStore + Send>, options: AppOptions) -> Self {
        let theme = theme::detect_color_scheme(&mut store, SchemePreference::from_env());
        let mention = MentionWidget::from_config(&config.mention).with_quirks(COMPOSER_QUIRKS);
        Self {
            field: TextBuffer::new(FieldStyle::default(), COMPOSER_QUIRKS),
            mention,
            menu: MenuBuffer::default(),
            menu_scroll: 0,
            visible_items: config.mention.visible_items,
            invite: InviteSelection::new(config.invite.max_suggestions),
            invite_open: false,
            focus: Focus::Composer,
            popover: None,
            theme,
            status: format!("Type {} to mention someone | F1 for keys", config.mention.trigger),
            should_quit: false,
            question_id: options.question_id,
            page_url: options.page_url,
            offline: options.offline,
            field_area: None,
            menu_area: None,
            store,
            dwell: Some(DwellTracker::new(&config.dwell, 0)),
            popover_contents: HashMap::from([(
                HELP_CONTENT_ID.to_string(),
                HELP_TEXT.to_string(),
            )]),
            now: 0,
        }
    }

    /// Milliseconds since the app started.
    pub const fn now(&self) -> u64 {
        self.now
    }

    pub fn set_now(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    /// The composer's value or caret changed.
    pub fn field_edited(&mut self) -> Option<Effect> {
        self.mention.on_input(&self.field).map(Effect::MentionSearch)
    }

    /// The invite input text changed.
    pub fn invite_edited(&mut self, text: &str) -> Effect {
        Effect::InviteSearch(self.invite.on_input(text))
    }

    pub fn apply(&mut self, response: Response) {
        match response {
            Response::Mention(ticket, result) => self.mention.on_search_result(&ticket, result),
            Response::Invite(ticket, result) => self.invite.on_results(&ticket, result),
            Response::Invited { usernames, result } => match result {
                Ok(()) => {
                    info!(count = usernames.len(), "Invites sent");
                    for username in &usernames {
                        self.invite.remove(username);
                    }
                    self.status = format!("Invited {}", usernames.join(", "));
                }
                Err(e) => {
                    warn!(error = %e, "Failed to send invites");
                    self.status = format!("Invite failed: {e}");
                }
            },
        }
        self.sync();
    }

    /// Run deferred widget work and redraw the menu surface.
    pub fn sync(&mut self) {
        self.mention.tick();
        self.mention.render().apply(&mut self.menu);
        let selected = self.menu.items.iter().position(|item| item.selected);
        self.menu_scroll = match selected {
            Some(idx) if self.menu.visible => {
                scroll_window(idx, self.visible_items, self.menu_scroll)
            }
            _ => 0,
        };
        let notices = [self.mention.take_notice(), self.invite.take_notice()];
        for notice in notices.into_iter().flatten() {
            self.status = notice;
        }
    }

    /// Periodic housekeeping.
    pub fn tick(&mut self, now: u64) {
        self.set_now(now);
        if let Some(dwell) = &mut self.dwell {
            dwell.poll(self.now);
        }
        if self.popover.as_ref().is_some_and(|p| p.is_expired(self.now)) {
            self.popover = None;
        }
        self.sync();
    }

    pub fn focus_composer(&mut self) {
        self.focus = Focus::Composer;
        self.field.focus();
    }

    /// Move focus off the composer; the mention menu closes on the next sync.
    pub fn blur_composer(&mut self) {
        if self.field.is_focused() {
            self.field.blur();
            self.mention.on_blur();
        }
    }

    pub fn focus_invite(&mut self) {
        if !self.invite_open {
            return;
        }
        self.blur_composer();
        self.focus = Focus::Invite;
    }

    pub fn toggle_invite_panel(&mut self) {
        self.invite_open = !self.invite_open;
        if self.invite_open {
            self.focus_invite();
        } else {
            self.invite.hide_dropdown();
            self.focus_composer();
        }
    }

    /// Add the highlighted invite suggestion.
    pub fn accept_invitee(&mut self) {
        if let Err(e) = self.invite.accept_highlighted() {
            debug!(error = %e, "Invitee rejected");
            self.status = e.to_string();
        }
    }

    pub fn send_invites(&mut self) -> Option<Effect> {
        let Some(question_id) = self.question_id else {
            self.status = "No question to invite to (start with --question)".to_string();
            return None;
        };
        let usernames = self.invite.selected_usernames();
        if usernames.is_empty() {
            self.status = "Select users to invite first".to_string();
            return None;
        }
        self.status = format!("Inviting {}...", self.invite.form_value());
        Some(Effect::SendInvites {
            question_id,
            usernames,
        })
    }

    pub fn toggle_theme(&mut self) {
        match theme::toggle(&mut self.store, self.theme) {
            Ok(theme) => {
                self.theme = theme;
                self.status = format!("Theme: {theme}");
            }
            Err(e) => {
                warn!(error = %e, "Failed to persist theme");
                self.theme = self.theme.toggled();
                self.status = format!("Theme not saved: {e}");
            }
        }
    }

    pub fn open_help(&mut self) {
        self.open_popover(&PopoverTrigger {
            title: "Keys".to_string(),
            body: String::new(),
            content_id: Some(HELP_CONTENT_ID.to_string()),
        });
    }

    pub fn open_share(&mut self) {
        self.open_popover(&PopoverTrigger {
            title: "Share a link to this question".to_string(),
            body: self.page_url.clone(),
            content_id: None,
        });
    }

    fn open_popover(&mut self, trigger: &PopoverTrigger) {
        let config = popover::configure(trigger, &self.popover_contents);
        debug!(title = %trigger.title, "Opening popover");
        self.popover = Some(PopoverState::new(config, self.now));
    }

    /// Whether an open popover takes the keyboard.
    pub fn popover_active(&self) -> bool {
        self.popover.as_ref().is_some_and(|p| !p.is_closing())
    }

    pub fn close_popover(&mut self) {
        let now = self.now;
        if let Some(popover) = &mut self.popover {
            popover.close(now);
        }
    }

    /// The popover to draw right now.
    pub fn visible_popover(&self) -> Option<&PopoverConfig> {
        self.popover
            .as_ref()
            .filter(|p| p.is_visible(self.now))
            .map(|p| &p.config)
    }

    /// Clicking a share popover copies its link and closes it.
    pub fn activate_popover(&mut self) -> Option<Effect> {
        let text = self.popover.as_ref()?.config.copy_text()?.to_string();
        self.close_popover();
        Some(Effect::Copy(text))
    }

    /// Menu row under a screen cell.
    pub fn menu_item_at(&self, column: u16, row: u16) -> Option<SelectItem> {
        let area = self.menu_area?;
        if !self.menu.visible {
            return None;
        }
        let inner = Rect::new(
            area.x.saturating_add(1),
            area.y.saturating_add(1),
            area.width.saturating_sub(2),
            area.height.saturating_sub(2),
        );
        if !inner.contains(Position::new(column, row)) {
            return None;
        }
        let idx = usize::from(row - inner.y) + self.menu_scroll;
        self.menu.items.get(idx).map(|item| item.select)
    }

    pub fn field_contains(&self, column: u16, row: u16) -> bool {
        self.field_area
            .is_some_and(|area| area.contains(Position::new(column, row)))
    }

    pub fn record_scroll(&mut self) {
        let now = self.now;
        if let Some(dwell) = &mut self.dwell {
            dwell.on_scroll(now);
        }
    }

    /// Stop dwell tracking and report the time spent.
    pub fn finish(&mut self) -> Option<DwellReport> {
        let now = self.now;
        self.dwell.take().map(|d| d.finish(now, &self.page_url))
    }
}
