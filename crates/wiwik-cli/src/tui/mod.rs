//! Two-thread TUI orchestration.
//!
//! Terminal I/O runs on a dedicated OS thread; searches and invites run as
//! tokio tasks. Both report back to the main loop via `tokio::sync::mpsc`
//! channels.

mod input;

pub use input::{handle_key, handle_mouse, mention_key};

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use wiwik_core::UserSearch;

use crate::app::{App, Effect, Response};
use crate::backend::Backend;
use crate::clipboard::{self, CopyMethod};
use crate::ui;

const TICK: Duration = Duration::from_millis(50);

/// Terminal events forwarded from the UI reader thread.
pub enum TermEvent {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize(u16, u16),
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Run the interactive composer until the user quits.
pub async fn run(backend: Backend, mut app: App) -> anyhow::Result<()> {
    let backend = Arc::new(backend);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let cancel = CancellationToken::new();
    let (term_tx, mut term_rx) = mpsc::channel::<TermEvent>(64);
    let (response_tx, mut response_rx) = mpsc::channel::<Response>(64);

    // Dedicated OS thread for crossterm::event::read()
    let cancel_clone = cancel.clone();
    let ui_thread = std::thread::spawn(move || {
        while !cancel_clone.is_cancelled() {
            // Poll with a timeout so cancellation is noticed.
            if !event::poll(TICK).unwrap_or(false) {
                continue;
            }
            let forwarded = match event::read() {
                Ok(Event::Key(key)) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                    TermEvent::Key(key)
                }
                Ok(Event::Mouse(mouse)) => TermEvent::Mouse(mouse),
                Ok(Event::Resize(w, h)) => TermEvent::Resize(w, h),
                _ => continue,
            };
            if term_tx.blocking_send(forwarded).is_err() {
                break;
            }
        }
    });

    info!(offline = backend.is_offline(), "Composer started");
    let started = Instant::now();
    let mut tick = tokio::time::interval(TICK);

    let result: anyhow::Result<()> = loop {
        tokio::select! {
            _ = tick.tick() => {
                app.tick(elapsed_ms(started));
                if let Err(e) = terminal.draw(|f| ui::draw(f, &mut app)) {
                    break Err(e.into());
                }
            }
            Some(term_event) = term_rx.recv() => {
                app.set_now(elapsed_ms(started));
                let effects = match term_event {
                    TermEvent::Key(key) => input::handle_key(&mut app, key),
                    TermEvent::Mouse(mouse) => input::handle_mouse(&mut app, mouse),
                    TermEvent::Resize(w, h) => {
                        debug!(w, h, "Terminal resized");
                        Vec::new()
                    }
                };
                for effect in effects {
                    run_effect(&mut app, &backend, &response_tx, effect);
                }
                app.sync();
            }
            Some(response) = response_rx.recv() => app.apply(response),
        }
        if app.should_quit {
            break Ok(());
        }
    };

    // Shutdown: stop the reader thread, then restore the terminal.
    cancel.cancel();
    let _ = ui_thread.join(); // fast: <50ms due to poll timeout

    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    );
    let _ = terminal.show_cursor();

    app.set_now(elapsed_ms(started));
    app.finish();

    if let Err(ref e) = result {
        error!(error = %e, "Composer failed");
    }
    result
}

fn run_effect(
    app: &mut App,
    backend: &Arc<Backend>,
    responses: &mpsc::Sender<Response>,
    effect: Effect,
) {
    match effect {
        Effect::Copy(text) => {
            app.status = match clipboard::copy_to_clipboard(&text, &mut io::stdout()) {
                Ok(CopyMethod::System) => "Link copied to clipboard".to_string(),
                Ok(CopyMethod::Osc52) => "Link sent to the terminal clipboard".to_string(),
                Err(e) => format!("Copy failed: {e}"),
            };
        }
        effect => spawn_effect(backend, responses, effect),
    }
}

/// Run a network effect in the background and report its outcome.
fn spawn_effect(backend: &Arc<Backend>, responses: &mpsc::Sender<Response>, effect: Effect) {
    let backend = Arc::clone(backend);
    let responses = responses.clone();
    tokio::spawn(async move {
        let response = match effect {
            Effect::MentionSearch(ticket) => {
                let result = backend.search(&ticket.query).await;
                Response::Mention(ticket, result)
            }
            Effect::InviteSearch(ticket) => {
                let result = backend.search(&ticket.query).await;
                Response::Invite(ticket, result)
            }
            Effect::SendInvites {
                question_id,
                usernames,
            } => {
                let result = backend.invite(question_id, &usernames).await;
                Response::Invited { usernames, result }
            }
            Effect::Copy(_) => return,
        };
        if responses.send(response).await.is_err() {
            debug!("Composer closed before the response arrived");
        }
    });
}
