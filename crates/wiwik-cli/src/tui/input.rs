//! Input handling for TUI key and mouse events.
//!
//! Handlers mutate the [`App`] and return the effects the main loop must
//! run; none of them touch the network or the terminal.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tracing::debug;

use wiwik_core::mention::{Key, KeyOutcome};

use crate::app::{App, Effect, Focus};

/// The mention widget's view of a terminal key.
pub const fn mention_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        _ => Key::Other,
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c' | 'q')) {
        app.should_quit = true;
        return Vec::new();
    }

    match key.code {
        KeyCode::F(1) => {
            app.open_help();
            return Vec::new();
        }
        KeyCode::F(2) => {
            app.toggle_invite_panel();
            return Vec::new();
        }
        KeyCode::F(3) => {
            app.open_share();
            return Vec::new();
        }
        KeyCode::F(4) => {
            app.toggle_theme();
            return Vec::new();
        }
        KeyCode::F(5) => return app.send_invites().into_iter().collect(),
        _ => {}
    }

    if app.popover_active() {
        match key.code {
            KeyCode::Esc => {
                app.close_popover();
                return Vec::new();
            }
            KeyCode::Enter => {
                let effect = app.activate_popover();
                app.close_popover();
                return effect.into_iter().collect();
            }
            _ => {}
        }
    }

    match app.focus {
        Focus::Composer => handle_composer_key(app, key, ctrl),
        Focus::Invite => handle_invite_key(app, key.code, ctrl),
    }
}

fn handle_composer_key(app: &mut App, key: KeyEvent, ctrl: bool) -> Vec<Effect> {
    if !app.field.is_focused() {
        app.focus_composer();
    }
    // An open menu takes arrows, Enter and Tab before the field does.
    if app.mention.on_key_down(mention_key(key.code), &mut app.field) == KeyOutcome::Handled {
        return Vec::new();
    }

    let changed = match key.code {
        KeyCode::Char(c) if !ctrl => {
            app.field.insert_char(c);
            true
        }
        KeyCode::Enter => {
            app.field.insert_char('\n');
            true
        }
        KeyCode::Backspace => {
            app.field.backspace();
            true
        }
        KeyCode::Delete => {
            app.field.delete();
            true
        }
        KeyCode::Left => {
            app.field.move_left();
            true
        }
        KeyCode::Right => {
            app.field.move_right();
            true
        }
        KeyCode::Home => {
            app.field.home();
            true
        }
        KeyCode::End => {
            app.field.end();
            true
        }
        KeyCode::Esc => {
            app.mention.schedule_close();
            false
        }
        KeyCode::Tab => {
            if app.invite_open {
                app.focus_invite();
            } else {
                app.blur_composer();
            }
            false
        }
        _ => false,
    };
    if changed {
        app.field_edited().into_iter().collect()
    } else {
        Vec::new()
    }
}

fn handle_invite_key(app: &mut App, code: KeyCode, ctrl: bool) -> Vec<Effect> {
    match code {
        KeyCode::Char(c) if !ctrl => {
            let mut text = app.invite.input().to_string();
            text.push(c);
            vec![app.invite_edited(&text)]
        }
        KeyCode::Backspace if app.invite.input().is_empty() => {
            if let Some(user) = app.invite.remove_last() {
                app.status = format!("Removed {}", user.username);
            }
            Vec::new()
        }
        KeyCode::Backspace => {
            let mut text = app.invite.input().to_string();
            text.pop();
            vec![app.invite_edited(&text)]
        }
        KeyCode::Down => {
            app.invite.move_highlight(1);
            Vec::new()
        }
        KeyCode::Up => {
            app.invite.move_highlight(-1);
            Vec::new()
        }
        KeyCode::Enter => {
            app.accept_invitee();
            Vec::new()
        }
        KeyCode::Esc => {
            app.invite.hide_dropdown();
            Vec::new()
        }
        KeyCode::Tab => {
            app.focus_composer();
            Vec::new()
        }
        _ => Vec::new(),
    }
}

pub fn handle_mouse(app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.popover_active() {
                let effect = app.activate_popover();
                app.close_popover();
                return effect.into_iter().collect();
            }
            if let Some(item) = app.menu_item_at(mouse.column, mouse.row) {
                // Pressing on the menu takes focus from the field first.
                app.blur_composer();
                if app.mention.select(item, &mut app.field) {
                    app.focus = Focus::Composer;
                }
                debug!(index = item.index(), "Menu item clicked");
                return Vec::new();
            }
            if app.field_contains(mouse.column, mouse.row) {
                app.focus_composer();
            } else {
                app.blur_composer();
            }
            Vec::new()
        }
        MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
            app.record_scroll();
            Vec::new()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;
    use wiwik_core::config::Config;
    use wiwik_core::{MemoryStore, SearchResult, TextField};

    use crate::app::{AppOptions, Response};

    fn app() -> App {
        App::new(
            &Config::default(),
            Box::new(MemoryStore::new()),
            AppOptions {
                question_id: Some(1),
                page_url: "https://forum.test/question/1/".to_string(),
                offline: true,
            },
        )
    }

    fn press(app: &mut App, code: KeyCode) -> Vec<Effect> {
        let effects = handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
        app.sync();
        effects
    }

    fn type_str(app: &mut App, text: &str) -> Vec<Effect> {
        text.chars().flat_map(|c| press(app, KeyCode::Char(c))).collect()
    }

    fn click(app: &mut App, column: u16, row: u16) -> Vec<Effect> {
        let effects = handle_mouse(
            app,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            },
        );
        app.sync();
        effects
    }

    /// Type `text` and answer its last search with `names`.
    fn open_menu(app: &mut App, text: &str, names: &[&str]) {
        let effects = type_str(app, text);
        let Some(Effect::MentionSearch(ticket)) = effects.last().cloned() else {
            panic!("expected a mention search");
        };
        let users = names.iter().map(|n| SearchResult::named(n)).collect();
        app.apply(Response::Mention(ticket, Ok(users)));
        assert!(app.menu.visible);
    }

    #[test]
    fn key_mapping() {
        assert_eq!(mention_key(KeyCode::Down), Key::ArrowDown);
        assert_eq!(mention_key(KeyCode::Tab), Key::Tab);
        assert_eq!(mention_key(KeyCode::Char('x')), Key::Other);
    }

    #[test]
    fn typing_emits_searches_for_mentions_only() {
        let mut app = app();
        assert!(type_str(&mut app, "hi ").is_empty());
        let effects = type_str(&mut app, "@b");
        assert!(matches!(
            effects.last(),
            Some(Effect::MentionSearch(t)) if t.query.text == "b"
        ));
    }

    #[test]
    fn arrows_navigate_open_menu_without_moving_caret() {
        let mut app = app();
        open_menu(&mut app, "@a", &["alice", "alan"]);
        let caret = app.field.caret();
        press(&mut app, KeyCode::Down);
        assert_eq!(app.mention.state().active_index, Some(1));
        assert_eq!(app.field.caret(), caret);
    }

    #[test]
    fn enter_commits_mention() {
        let mut app = app();
        open_menu(&mut app, "hey @a", &["alice", "alan"]);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.field.value(), "hey @alan ");
        assert!(!app.menu.visible);
    }

    #[test]
    fn enter_without_menu_inserts_newline() {
        let mut app = app();
        type_str(&mut app, "hi");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.field.value(), "hi\n");
    }

    #[test]
    fn escape_closes_menu() {
        let mut app = app();
        open_menu(&mut app, "@a", &["alice"]);
        press(&mut app, KeyCode::Esc);
        assert!(!app.menu.visible);
        assert_eq!(app.field.value(), "@a");
    }

    #[test]
    fn clicking_menu_row_commits() {
        let mut app = app();
        open_menu(&mut app, "@a", &["alice", "alan"]);
        app.menu_area = Some(Rect::new(4, 3, 20, 4));
        click(&mut app, 6, 5);
        assert_eq!(app.field.value(), "@alan ");
        assert!(app.field.is_focused());
        assert!(!app.menu.visible);
    }

    #[test]
    fn clicking_elsewhere_blurs_and_closes() {
        let mut app = app();
        open_menu(&mut app, "@a", &["alice"]);
        app.field_area = Some(Rect::new(0, 1, 40, 5));
        click(&mut app, 0, 20);
        assert!(!app.field.is_focused());
        assert!(!app.menu.visible);
        assert_eq!(app.field.value(), "@a");
    }

    #[test]
    fn ctrl_c_quits() {
        let mut app = app();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert_eq!(app.field.value(), "");
    }

    #[test]
    fn invite_typing_accumulates_query() {
        let mut app = app();
        press(&mut app, KeyCode::F(2));
        assert_eq!(app.focus, Focus::Invite);
        type_str(&mut app, "bo");
        let effects = press(&mut app, KeyCode::Backspace);
        assert!(matches!(
            effects.as_slice(),
            [Effect::InviteSearch(t)] if t.query.text == "b"
        ));
        assert_eq!(app.field.value(), "");
    }

    #[test]
    fn invite_enter_adds_and_backspace_removes() {
        let mut app = app();
        press(&mut app, KeyCode::F(2));
        let effects = type_str(&mut app, "b");
        let Some(Effect::InviteSearch(ticket)) = effects.last().cloned() else {
            panic!("expected an invite search");
        };
        app.apply(Response::Invite(ticket, Ok(vec![SearchResult::named("bob")])));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.invite.selected_usernames(), ["bob"]);

        let effects = press(&mut app, KeyCode::F(5));
        assert_eq!(
            effects,
            [Effect::SendInvites {
                question_id: 1,
                usernames: vec!["bob".to_string()],
            }]
        );

        press(&mut app, KeyCode::Backspace);
        assert!(app.invite.selected().is_empty());
    }

    #[test]
    fn share_popover_enter_copies() {
        let mut app = app();
        press(&mut app, KeyCode::F(3));
        let effects = press(&mut app, KeyCode::Enter);
        assert_eq!(
            effects,
            [Effect::Copy("https://forum.test/question/1/".to_string())]
        );
        assert!(app.field.value().is_empty());
    }

    #[test]
    fn help_popover_escape_closes() {
        let mut app = app();
        press(&mut app, KeyCode::F(1));
        assert!(app.popover_active());
        press(&mut app, KeyCode::Esc);
        assert!(!app.popover_active());
    }
}
