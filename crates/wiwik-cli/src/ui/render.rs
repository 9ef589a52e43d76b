//! TUI rendering functions.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Margin, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};
use unicode_width::UnicodeWidthStr;

use wiwik_core::invite::{suggestion_label, tag_label};
use wiwik_core::mention::Point;
use wiwik_core::popover::PopoverConfig;
use wiwik_core::theme;
use wiwik_core::TextField;

use super::Palette;
use crate::app::{App, Focus};

/// Rows taken by the invite panel when it is open.
pub const INVITE_PANEL_HEIGHT: u16 = 8;

const POPOVER_WIDTH: u16 = 64;

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Draw the full UI.
pub fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let palette = Palette::for_theme(app.theme);
    let invite_height = if app.invite_open {
        INVITE_PANEL_HEIGHT
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Header
            Constraint::Min(3),                // Composer
            Constraint::Length(invite_height), // Invite panel
            Constraint::Length(1),             // Status bar
        ])
        .split(frame.area());

    frame.render_widget(
        Block::default().style(Style::default().fg(palette.fg).bg(palette.bg)),
        frame.area(),
    );
    draw_header(frame, app, &palette, chunks[0]);
    draw_composer(frame, app, &palette, chunks[1]);
    if app.invite_open {
        draw_invite_panel(frame, app, &palette, chunks[2]);
    }
    draw_status_bar(frame, app, &palette, chunks[3]);

    // Overlays last so they sit on top.
    draw_menu(frame, app, &palette);
    draw_popover(frame, app, &palette);
}

fn draw_header(frame: &mut Frame<'_>, app: &App, palette: &Palette, area: Rect) {
    let target = app
        .question_id
        .map_or_else(|| "new post".to_string(), |id| format!("question #{id}"));
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "wiwik",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" | {target} | ")),
        Span::styled(app.page_url.as_str(), Style::default().fg(palette.muted)),
    ]));
    frame.render_widget(header, area);
}

fn draw_composer(frame: &mut Frame<'_>, app: &mut App, palette: &Palette, area: Rect) {
    // The field mirrors the area it is drawn into so caret maths matches.
    app.field.set_origin(Point::new(area.x, area.y));
    app.field.set_size(area.width, area.height);
    app.field_area = Some(area);

    let focused = app.focus == Focus::Composer && app.field.is_focused();
    let border = if focused { palette.accent } else { palette.border };
    let title = format!(" Compose ({} to mention) ", app.mention.trigger());
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title),
        area,
    );

    let style = app.field.style().clone();
    let layout = app.field.layout();
    let line_rows = style.line_rows();
    let text_area = Rect::new(
        area.x + style.border.left + style.padding.left,
        area.y + style.border.top + style.padding.top,
        style.content_width(layout.scrollbar),
        style.content_height(),
    )
    .intersection(area);

    let first_line = usize::from(app.field.scroll_top() / line_rows);
    let visible = usize::from(style.visible_lines());
    let mut lines: Vec<Line<'_>> = Vec::new();
    for row in layout.rows().into_iter().skip(first_line).take(visible) {
        let indent = " ".repeat(usize::from(row.offset));
        lines.push(Line::from(format!("{indent}{}", row.text)));
        for _ in 1..line_rows {
            lines.push(Line::default());
        }
    }
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().fg(palette.fg)),
        text_area,
    );

    if layout.scrollbar {
        let mut state = ScrollbarState::new(layout.layout.rows)
            .viewport_content_length(visible)
            .position(first_line);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None)
                .style(Style::default().fg(palette.muted)),
            area.inner(Margin::new(1, 1)),
            &mut state,
        );
    }

    if focused {
        let (row, col) = layout.caret_position(app.field.caret());
        let top = to_u16(row).saturating_mul(line_rows);
        if let Some(offset) = top.checked_sub(app.field.scroll_top())
            && offset < text_area.height
        {
            let x = text_area
                .x
                .saturating_add(col)
                .min(text_area.right().saturating_sub(1));
            frame.set_cursor_position(Position::new(x, text_area.y + offset));
        }
    }
}

fn draw_invite_panel(frame: &mut Frame<'_>, app: &App, palette: &Palette, area: Rect) {
    let focused = app.focus == Focus::Invite;
    let border = if focused { palette.accent } else { palette.border };
    let title = app.question_id.map_or_else(
        || " Invite ".to_string(),
        |id| format!(" Invite to question #{id} (F5 sends) "),
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut tags: Vec<Span<'_>> = Vec::new();
    for user in app.invite.selected() {
        tags.push(Span::styled(
            format!("[{}]", tag_label(user)),
            Style::default()
                .fg(palette.highlight_fg)
                .bg(palette.highlight_bg),
        ));
        tags.push(Span::raw(" "));
    }
    let prompt = "> ";
    let tags_width: usize = tags.iter().map(Span::width).sum();
    tags.push(Span::styled(prompt, Style::default().fg(palette.muted)));
    tags.push(Span::raw(app.invite.input()));

    let mut lines = vec![Line::from(tags)];
    if app.invite.is_loading() {
        lines.push(Line::styled("Searching...", Style::default().fg(palette.muted)));
    } else if app.invite.dropdown_visible() {
        let suggestions = app.invite.suggestions();
        if suggestions.is_empty() {
            lines.push(Line::styled(
                "No matching users",
                Style::default().fg(palette.muted),
            ));
        }
        for (idx, user) in suggestions.into_iter().enumerate() {
            let label = suggestion_label(user).to_string();
            let style = if app.invite.highlighted() == Some(idx) {
                Style::default()
                    .fg(palette.highlight_fg)
                    .bg(palette.highlight_bg)
            } else if user.is_disabled() {
                Style::default().fg(palette.muted)
            } else {
                Style::default().fg(palette.fg)
            };
            lines.push(Line::styled(label, style));
        }
    }
    frame.render_widget(Paragraph::new(lines), inner);

    if focused {
        let x = inner
            .x
            .saturating_add(to_u16(tags_width + prompt.len() + app.invite.input().width()))
            .min(inner.right().saturating_sub(1));
        frame.set_cursor_position(Position::new(x, inner.y));
    }
}

fn draw_status_bar(frame: &mut Frame<'_>, app: &App, palette: &Palette, area: Rect) {
    let mut right = String::new();
    if app.offline {
        right.push_str("[offline] ");
    }
    if !app.invite.selected().is_empty() {
        right.push_str(&format!("{} to invite | ", app.invite.selected().len()));
    }
    right.push_str(&format!("[{}] {}", theme::indicator(app.theme), app.theme));

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(to_u16(right.width())),
        ])
        .split(area);
    frame.render_widget(
        Paragraph::new(app.status.as_str()).style(Style::default().fg(palette.fg)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(right).style(Style::default().fg(palette.muted)),
        chunks[1],
    );
}

/// Mention menu overlay, drawn at the widget's anchor.
fn draw_menu(frame: &mut Frame<'_>, app: &mut App, palette: &Palette) {
    app.menu_area = None;
    if !app.menu.visible || app.menu.items.is_empty() {
        return;
    }
    let bounds = frame.area();
    let rows = app.menu.items.len().min(app.visible_items.max(1));
    let content_width = app
        .menu
        .items
        .iter()
        .map(|item| item.label.width() + item.detail.width() + 3)
        .max()
        .unwrap_or(0);
    let width = to_u16(content_width + 2).min(bounds.width);
    let height = to_u16(rows + 2).min(bounds.height);

    let anchor = app.menu.anchor;
    // No room below the caret: open above its line instead.
    let top = if anchor.top.saturating_add(height) > bounds.bottom() {
        anchor.top.saturating_sub(height.saturating_add(1))
    } else {
        anchor.top
    };
    let left = anchor.left.min(bounds.right().saturating_sub(width));
    let area = Rect::new(left, top, width, height).intersection(bounds);

    let lines: Vec<Line<'_>> = app
        .menu
        .items
        .iter()
        .skip(app.menu_scroll)
        .take(rows)
        .map(|item| {
            let (style, detail_style) = if item.selected {
                let s = Style::default()
                    .fg(palette.highlight_fg)
                    .bg(palette.highlight_bg);
                (s.add_modifier(Modifier::BOLD), s)
            } else {
                (
                    Style::default().fg(palette.fg),
                    Style::default().fg(palette.muted),
                )
            };
            Line::from(vec![
                Span::styled(format!(" {}", item.label), style),
                Span::styled(format!(" @{}", item.detail), detail_style),
            ])
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent))
                .style(Style::default().bg(palette.bg)),
        ),
        area,
    );
    app.menu_area = Some(area);
}

fn draw_popover(frame: &mut Frame<'_>, app: &App, palette: &Palette) {
    let Some(config) = app.visible_popover() else {
        return;
    };
    let bounds = frame.area();
    let (title, lines) = match config {
        PopoverConfig::Content { content, .. } => (
            " Help ".to_string(),
            content.lines().map(|l| Line::from(l.to_string())).collect::<Vec<_>>(),
        ),
        PopoverConfig::ShareLink { title, link, hint } => (
            format!(" {title} "),
            vec![
                Line::styled(
                    link.clone(),
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::UNDERLINED),
                ),
                Line::styled(format!("{hint} (Enter)"), Style::default().fg(palette.muted)),
            ],
        ),
    };

    let width = POPOVER_WIDTH.min(bounds.width.saturating_sub(4));
    let height = to_u16(lines.len() + 2).min(bounds.height);
    let area = Rect::new(
        bounds.x + (bounds.width.saturating_sub(width)) / 2,
        bounds.y + (bounds.height.saturating_sub(height)) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent))
                .style(Style::default().bg(palette.bg))
                .title(title),
        ),
        area,
    );
}
