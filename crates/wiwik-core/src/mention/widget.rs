//! The `@mention` autocomplete state machine.
//!
//! Event flow:
//! - [`MentionWidget::on_input`] detects a trigger and hands out a
//!   [`SearchTicket`]; the host runs the search and feeds the outcome back
//!   through [`MentionWidget::on_search_result`].
//! - Opening and closing are deferred to [`MentionWidget::tick`], so an
//!   item click that blurs the field first still commits against the open
//!   menu.
//! - [`MentionWidget::render`] is a pure function of the state.

use std::collections::VecDeque;

use tracing::{debug, warn};

use super::caret::{EngineQuirks, caret_coordinates};
use super::field::TextField;
use super::menu::{
    Anchor, MenuItem, MenuItemTemplate, MenuView, ReplaceFn, SelectItem, default_menu_item,
    default_replace,
};
use super::trigger::{clamp_to_boundary, detect_trigger};
use crate::config::MentionConfig;
use crate::search::{SearchError, SearchQuery, SearchResult};

/// Keys the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Tab,
    Other,
}

/// Whether a key was consumed (the host must suppress its default action).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

/// A search request issued for one recognised trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: SearchQuery,
}

/// Menu state; `trigger_offset == None` means closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetState {
    pub options: Vec<SearchResult>,
    pub active_index: Option<usize>,
    pub trigger_offset: Option<usize>,
    pub anchor: Option<Anchor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    Open {
        generation: u64,
        offset: usize,
        anchor: Anchor,
    },
    Close {
        generation: u64,
    },
}

/// Mention autocomplete attached to one text field.
pub struct MentionWidget {
    trigger: char,
    quirks: EngineQuirks,
    state: WidgetState,
    generation: u64,
    deferred: VecDeque<Deferred>,
    notice: Option<String>,
    menu_item: MenuItemTemplate,
    replace: ReplaceFn,
}

impl std::fmt::Debug for MentionWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MentionWidget")
            .field("trigger", &self.trigger)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}

impl MentionWidget {
    pub fn new(trigger: char) -> Self {
        Self {
            trigger,
            quirks: EngineQuirks::default(),
            state: WidgetState::default(),
            generation: 0,
            deferred: VecDeque::new(),
            notice: None,
            menu_item: Box::new(default_menu_item),
            replace: Box::new(default_replace),
        }
    }

    pub fn from_config(config: &MentionConfig) -> Self {
        Self::new(config.trigger)
    }

    #[must_use]
    pub fn with_quirks(mut self, quirks: EngineQuirks) -> Self {
        self.quirks = quirks;
        self
    }

    #[must_use]
    pub fn with_menu_item(
        mut self,
        template: impl Fn(&SearchResult, SelectItem, bool) -> MenuItem + Send + Sync + 'static,
    ) -> Self {
        self.menu_item = Box::new(template);
        self
    }

    #[must_use]
    pub fn with_replace(
        mut self,
        replace: impl Fn(&SearchResult, char) -> String + Send + Sync + 'static,
    ) -> Self {
        self.replace = Box::new(replace);
        self
    }

    pub const fn trigger(&self) -> char {
        self.trigger
    }

    pub const fn state(&self) -> &WidgetState {
        &self.state
    }

    pub const fn is_open(&self) -> bool {
        self.state.trigger_offset.is_some()
    }

    /// Whether deferred work is waiting for [`Self::tick`].
    pub fn has_pending(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Handle a change of the field's value or caret.
    ///
    /// Returns a ticket when the caret sits in a mention token; the host
    /// should run the query and report back with the same ticket.
    pub fn on_input(&mut self, field: &impl TextField) -> Option<SearchTicket> {
        let value = field.value();
        let caret = clamp_to_boundary(value, field.selection_start());
        self.generation += 1;

        let Some(trigger) = detect_trigger(value, caret, self.trigger) else {
            self.schedule_close();
            return None;
        };

        let coords = caret_coordinates(field.style(), self.quirks, value, caret);
        let placement = field.placement();
        let anchor = Anchor {
            top: placement
                .viewport_scroll
                .y
                .saturating_add(placement.origin.y)
                .saturating_add(coords.top)
                .saturating_add(coords.height)
                .saturating_sub(placement.scroll.y),
            left: placement
                .viewport_scroll
                .x
                .saturating_add(placement.origin.x)
                .saturating_add(coords.left)
                .saturating_sub(placement.scroll.x),
        };

        self.deferred.push_back(Deferred::Open {
            generation: self.generation,
            offset: trigger.offset,
            anchor,
        });
        debug!(
            generation = self.generation,
            query = %trigger.query,
            offset = trigger.offset,
            "Mention trigger detected"
        );
        Some(SearchTicket {
            generation: self.generation,
            query: SearchQuery::new(trigger.query),
        })
    }

    /// Apply the outcome of a search issued by [`Self::on_input`].
    pub fn on_search_result(
        &mut self,
        ticket: &SearchTicket,
        result: Result<Vec<SearchResult>, SearchError>,
    ) {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                "Discarding stale search response"
            );
            return;
        }
        match result {
            Ok(options) if !options.is_empty() => {
                self.state.options = options;
                self.state.active_index = Some(0);
            }
            Ok(_) => self.schedule_close(),
            Err(e) if e.is_malformed() => {
                debug!(error = %e, "Malformed search response, treating as empty");
                self.schedule_close();
            }
            Err(e) => {
                warn!(error = %e, query = %ticket.query.text, "User search failed");
                self.notice = Some(format!("User search failed: {e}"));
                self.schedule_close();
            }
        }
    }

    /// Keyboard handling while the menu is open.
    pub fn on_key_down(&mut self, key: Key, field: &mut impl TextField) -> KeyOutcome {
        if self.state.trigger_offset.is_none() || self.state.options.is_empty() {
            return KeyOutcome::Ignored;
        }
        let last = self.state.options.len() - 1;
        let active = self.state.active_index.unwrap_or(0);
        match key {
            Key::ArrowDown => {
                self.state.active_index = Some((active + 1).min(last));
                KeyOutcome::Handled
            }
            Key::ArrowUp => {
                self.state.active_index = Some(active.saturating_sub(1));
                KeyOutcome::Handled
            }
            Key::Enter | Key::Tab => {
                self.commit(active, field);
                KeyOutcome::Handled
            }
            Key::Other => KeyOutcome::Ignored,
        }
    }

    /// The field lost focus; close on the next tick.
    pub fn on_blur(&mut self) {
        self.schedule_close();
    }

    /// Commit the item behind a clicked menu row.
    pub fn select(&mut self, item: SelectItem, field: &mut impl TextField) -> bool {
        self.commit(item.index(), field)
    }

    /// Replace the mention token with the candidate at `index`.
    ///
    /// Returns `false` (and leaves the field untouched) when the menu is
    /// closed or `index` is out of range.
    pub fn commit(&mut self, index: usize, field: &mut impl TextField) -> bool {
        let Some(offset) = self.state.trigger_offset else {
            return false;
        };
        let Some(candidate) = self.state.options.get(index) else {
            return false;
        };

        let value = field.value();
        let offset = clamp_to_boundary(value, offset);
        let caret = clamp_to_boundary(value, field.selection_start()).max(offset);
        let trigger = value[offset..].chars().next().unwrap_or(self.trigger);

        let pre = &value[..offset];
        let mention = (self.replace)(candidate, trigger);
        let post = &value[caret..];
        let mut next = String::with_capacity(pre.len() + mention.len() + post.len());
        next.push_str(pre);
        next.push_str(&mention);
        next.push_str(post);
        let caret = next.len() - post.len();

        debug!(username = %candidate.username, "Committing mention");
        field.set_value(next);
        field.set_selection_range(caret, caret);
        self.schedule_close();
        field.focus();
        true
    }

    /// Close the menu on the next tick.
    pub fn schedule_close(&mut self) {
        self.deferred.push_back(Deferred::Close {
            generation: self.generation,
        });
    }

    /// Run deferred opens and closes. Returns whether the state changed.
    ///
    /// Work scheduled before a newer trigger was detected is dropped, and an
    /// applied close retires every ticket handed out so far.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;
        while let Some(op) = self.deferred.pop_front() {
            match op {
                Deferred::Open {
                    generation,
                    offset,
                    anchor,
                } if generation == self.generation => {
                    self.state.active_index = Some(0);
                    self.state.anchor = Some(anchor);
                    self.state.trigger_offset = Some(offset);
                    changed = true;
                }
                Deferred::Close { generation } if generation == self.generation => {
                    changed |= self.state != WidgetState::default();
                    self.state = WidgetState::default();
                    // Searches issued before the close no longer have a menu to fill.
                    self.generation += 1;
                }
                _ => {}
            }
        }
        changed
    }

    /// Pure view of the current state.
    pub fn render(&self) -> MenuView {
        let Some(anchor) = self.state.anchor else {
            return MenuView::Hidden;
        };
        if self.state.options.is_empty() {
            return MenuView::Hidden;
        }
        let items = self
            .state
            .options
            .iter()
            .enumerate()
            .map(|(idx, option)| {
                (self.menu_item)(
                    option,
                    SelectItem::new(idx),
                    self.state.active_index == Some(idx),
                )
            })
            .collect();
        MenuView::Shown { anchor, items }
    }

    /// Take the pending user-facing notice, if any.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}
