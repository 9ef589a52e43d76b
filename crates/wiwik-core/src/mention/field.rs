//! Text field abstraction and an in-memory implementation.

use super::caret::{EngineQuirks, FieldLayout, FieldStyle};
use super::trigger::clamp_to_boundary;

/// A screen position in cells; `x` grows rightwards, `y` downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Where a field sits and how far things are scrolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldPlacement {
    /// Top-left corner of the field's border box relative to the viewport.
    pub origin: Point,
    /// The field's own scroll offsets.
    pub scroll: Point,
    /// Scroll offsets of the viewport/document.
    pub viewport_scroll: Point,
}

/// The editable text control a [`super::MentionWidget`] is attached to.
///
/// Offsets are byte offsets into [`TextField::value`].
pub trait TextField {
    fn value(&self) -> &str;
    fn selection_start(&self) -> usize;
    fn set_value(&mut self, value: String);
    fn set_selection_range(&mut self, start: usize, end: usize);
    fn focus(&mut self);
    fn style(&self) -> &FieldStyle;
    fn placement(&self) -> FieldPlacement;
}

/// A single-caret text buffer with field styling.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    value: String,
    selection: (usize, usize),
    focused: bool,
    style: FieldStyle,
    quirks: EngineQuirks,
    origin: Point,
    viewport_scroll: Point,
    scroll_top: u16,
}

impl TextBuffer {
    pub fn new(style: FieldStyle, quirks: EngineQuirks) -> Self {
        Self {
            value: String::new(),
            selection: (0, 0),
            focused: true,
            style,
            quirks,
            origin: Point::default(),
            viewport_scroll: Point::default(),
            scroll_top: 0,
        }
    }

    /// Caret byte offset (the selection start).
    pub const fn caret(&self) -> usize {
        self.selection.0
    }

    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub const fn quirks(&self) -> EngineQuirks {
        self.quirks
    }

    pub const fn scroll_top(&self) -> u16 {
        self.scroll_top
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn set_viewport_scroll(&mut self, scroll: Point) {
        self.viewport_scroll = scroll;
    }

    /// Resize the field's border box.
    pub fn set_size(&mut self, width: u16, height: u16) {
        self.style.width = width;
        self.style.height = height;
        self.scroll_to_caret();
    }

    /// Lay the current value out the way it is drawn.
    pub fn layout(&self) -> FieldLayout {
        FieldLayout::compute(&self.style, self.quirks, &self.value)
    }

    /// Replace the selection with `text`, leaving the caret after it.
    pub fn insert_str(&mut self, text: &str) {
        let (start, end) = self.selection;
        self.value.replace_range(start..end, text);
        let caret = start + text.len();
        self.selection = (caret, caret);
        self.scroll_to_caret();
    }

    pub fn insert_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.insert_str(c.encode_utf8(&mut buf));
    }

    /// Delete the selection, or the character before the caret.
    pub fn backspace(&mut self) {
        let (start, end) = self.selection;
        if start != end {
            self.insert_str("");
            return;
        }
        if let Some((idx, _)) = self.value[..start].char_indices().next_back() {
            self.value.replace_range(idx..start, "");
            self.selection = (idx, idx);
            self.scroll_to_caret();
        }
    }

    /// Delete the selection, or the character after the caret.
    pub fn delete(&mut self) {
        let (start, end) = self.selection;
        if start != end {
            self.insert_str("");
            return;
        }
        if let Some(c) = self.value[start..].chars().next() {
            self.value.replace_range(start..start + c.len_utf8(), "");
            self.scroll_to_caret();
        }
    }

    pub fn move_left(&mut self) {
        let caret = self.caret();
        let prev = self.value[..caret]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i);
        self.set_selection_range(prev, prev);
    }

    pub fn move_right(&mut self) {
        let caret = self.caret();
        let next = self.value[caret..]
            .chars()
            .next()
            .map_or(caret, |c| caret + c.len_utf8());
        self.set_selection_range(next, next);
    }

    /// Move the caret to the start of its line.
    pub fn home(&mut self) {
        let caret = self.caret();
        let start = self.value[..caret].rfind('\n').map_or(0, |i| i + 1);
        self.set_selection_range(start, start);
    }

    /// Move the caret to the end of its line.
    pub fn end(&mut self) {
        let caret = self.caret();
        let end = self.value[caret..]
            .find('\n')
            .map_or(self.value.len(), |i| caret + i);
        self.set_selection_range(end, end);
    }

    fn scroll_to_caret(&mut self) {
        self.scroll_top = self.layout().scroll_to_caret(self.caret(), self.scroll_top);
    }
}

impl TextField for TextBuffer {
    fn value(&self) -> &str {
        &self.value
    }

    fn selection_start(&self) -> usize {
        self.selection.0
    }

    fn set_value(&mut self, value: String) {
        self.value = value;
        let caret = clamp_to_boundary(&self.value, self.selection.0);
        self.selection = (caret, caret);
        self.scroll_to_caret();
    }

    fn set_selection_range(&mut self, start: usize, end: usize) {
        let start = clamp_to_boundary(&self.value, start);
        let end = clamp_to_boundary(&self.value, end).max(start);
        self.selection = (start, end);
        self.scroll_to_caret();
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn style(&self) -> &FieldStyle {
        &self.style
    }

    fn placement(&self) -> FieldPlacement {
        FieldPlacement {
            origin: self.origin,
            scroll: Point::new(0, self.scroll_top),
            viewport_scroll: self.viewport_scroll,
        }
    }
}
