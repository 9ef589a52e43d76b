//! Caret coordinates inside a text field.
//!
//! Text fields do not report where a given character is drawn. We build a
//! mirror: a hidden copy of the field carrying the same text-layout
//! properties, lay out the text before the caret followed by a marker, and
//! read the marker's position. Units are terminal cells.
//!
//! The same layout routine renders the field itself (see [`FieldLayout`]),
//! so measured and drawn positions agree.

use unicode_width::UnicodeWidthChar;

/// Width of a vertical scrollbar gutter.
pub const SCROLLBAR_WIDTH: u16 = 1;

/// Marker text used when the caret sits at the end of the value.
const END_MARKER: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxSizing {
    ContentBox,
    #[default]
    BorderBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    None,
    #[default]
    Plain,
    Rounded,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontVariant {
    #[default]
    Normal,
    SmallCaps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

/// Per-side widths (border or padding), in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edges {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Edges {
    pub const fn all(n: u16) -> Self {
        Self {
            top: n,
            right: n,
            bottom: n,
            left: n,
        }
    }

    pub const fn horizontal(&self) -> u16 {
        self.left.saturating_add(self.right)
    }

    pub const fn vertical(&self) -> u16 {
        self.top.saturating_add(self.bottom)
    }
}

/// Text-layout style of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStyle {
    pub direction: Direction,
    pub box_sizing: BoxSizing,
    pub width: u16,
    pub height: u16,
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,
    pub border: Edges,
    pub border_style: BorderStyle,
    pub padding: Edges,
    pub font_style: FontStyle,
    pub font_variant: FontVariant,
    pub font_weight: u16,
    /// Percentage, 100 = normal.
    pub font_stretch: u16,
    pub font_size: u16,
    pub font_size_adjust: Option<u16>,
    /// Rows occupied by one line of text.
    pub line_height: u16,
    pub font_family: String,
    pub text_align: TextAlign,
    pub text_transform: TextTransform,
    pub text_indent: u16,
    pub text_decoration: TextDecoration,
    pub letter_spacing: u16,
    pub word_spacing: u16,
    pub tab_size: u16,
}

impl Default for FieldStyle {
    fn default() -> Self {
        Self {
            direction: Direction::Ltr,
            box_sizing: BoxSizing::BorderBox,
            width: 40,
            height: 5,
            overflow_x: Overflow::Hidden,
            overflow_y: Overflow::Auto,
            border: Edges::all(1),
            border_style: BorderStyle::Plain,
            padding: Edges::default(),
            font_style: FontStyle::Normal,
            font_variant: FontVariant::Normal,
            font_weight: 400,
            font_stretch: 100,
            font_size: 1,
            font_size_adjust: None,
            line_height: 1,
            font_family: "monospace".to_string(),
            text_align: TextAlign::Start,
            text_transform: TextTransform::None,
            text_indent: 0,
            text_decoration: TextDecoration::None,
            letter_spacing: 0,
            word_spacing: 0,
            tab_size: 8,
        }
    }
}

/// The text-layout properties a mirror copies from its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutProperty {
    Direction,
    BoxSizing,
    Width,
    Height,
    OverflowX,
    OverflowY,
    BorderTopWidth,
    BorderRightWidth,
    BorderBottomWidth,
    BorderLeftWidth,
    BorderStyle,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    FontStyle,
    FontVariant,
    FontWeight,
    FontStretch,
    FontSize,
    FontSizeAdjust,
    LineHeight,
    FontFamily,
    TextAlign,
    TextTransform,
    TextIndent,
    TextDecoration,
    LetterSpacing,
    WordSpacing,
    TabSize,
}

/// Every property that influences where text lands.
pub const LAYOUT_PROPERTIES: [LayoutProperty; 30] = [
    LayoutProperty::Direction,
    LayoutProperty::BoxSizing,
    LayoutProperty::Width,
    LayoutProperty::Height,
    LayoutProperty::OverflowX,
    LayoutProperty::OverflowY,
    LayoutProperty::BorderTopWidth,
    LayoutProperty::BorderRightWidth,
    LayoutProperty::BorderBottomWidth,
    LayoutProperty::BorderLeftWidth,
    LayoutProperty::BorderStyle,
    LayoutProperty::PaddingTop,
    LayoutProperty::PaddingRight,
    LayoutProperty::PaddingBottom,
    LayoutProperty::PaddingLeft,
    LayoutProperty::FontStyle,
    LayoutProperty::FontVariant,
    LayoutProperty::FontWeight,
    LayoutProperty::FontStretch,
    LayoutProperty::FontSize,
    LayoutProperty::FontSizeAdjust,
    LayoutProperty::LineHeight,
    LayoutProperty::FontFamily,
    LayoutProperty::TextAlign,
    LayoutProperty::TextTransform,
    LayoutProperty::TextIndent,
    LayoutProperty::TextDecoration,
    LayoutProperty::LetterSpacing,
    LayoutProperty::WordSpacing,
    LayoutProperty::TabSize,
];

impl FieldStyle {
    /// Copy a single layout property from `source`.
    pub fn copy_property(&mut self, source: &Self, property: LayoutProperty) {
        match property {
            LayoutProperty::Direction => self.direction = source.direction,
            LayoutProperty::BoxSizing => self.box_sizing = source.box_sizing,
            LayoutProperty::Width => self.width = source.width,
            LayoutProperty::Height => self.height = source.height,
            LayoutProperty::OverflowX => self.overflow_x = source.overflow_x,
            LayoutProperty::OverflowY => self.overflow_y = source.overflow_y,
            LayoutProperty::BorderTopWidth => self.border.top = source.border.top,
            LayoutProperty::BorderRightWidth => self.border.right = source.border.right,
            LayoutProperty::BorderBottomWidth => self.border.bottom = source.border.bottom,
            LayoutProperty::BorderLeftWidth => self.border.left = source.border.left,
            LayoutProperty::BorderStyle => self.border_style = source.border_style,
            LayoutProperty::PaddingTop => self.padding.top = source.padding.top,
            LayoutProperty::PaddingRight => self.padding.right = source.padding.right,
            LayoutProperty::PaddingBottom => self.padding.bottom = source.padding.bottom,
            LayoutProperty::PaddingLeft => self.padding.left = source.padding.left,
            LayoutProperty::FontStyle => self.font_style = source.font_style,
            LayoutProperty::FontVariant => self.font_variant = source.font_variant,
            LayoutProperty::FontWeight => self.font_weight = source.font_weight,
            LayoutProperty::FontStretch => self.font_stretch = source.font_stretch,
            LayoutProperty::FontSize => self.font_size = source.font_size,
            LayoutProperty::FontSizeAdjust => self.font_size_adjust = source.font_size_adjust,
            LayoutProperty::LineHeight => self.line_height = source.line_height,
            LayoutProperty::FontFamily => self.font_family.clone_from(&source.font_family),
            LayoutProperty::TextAlign => self.text_align = source.text_align,
            LayoutProperty::TextTransform => self.text_transform = source.text_transform,
            LayoutProperty::TextIndent => self.text_indent = source.text_indent,
            LayoutProperty::TextDecoration => self.text_decoration = source.text_decoration,
            LayoutProperty::LetterSpacing => self.letter_spacing = source.letter_spacing,
            LayoutProperty::WordSpacing => self.word_spacing = source.word_spacing,
            LayoutProperty::TabSize => self.tab_size = source.tab_size,
        }
    }

    /// Rows one line of text occupies (at least one).
    pub fn line_rows(&self) -> u16 {
        self.line_height.max(1)
    }

    /// Height inside the borders.
    pub const fn client_height(&self) -> u16 {
        self.height.saturating_sub(self.border.vertical())
    }

    /// Width available to text, optionally minus a scrollbar gutter.
    pub fn content_width(&self, scrollbar: bool) -> u16 {
        let base = match self.box_sizing {
            BoxSizing::BorderBox => self
                .width
                .saturating_sub(self.border.horizontal())
                .saturating_sub(self.padding.horizontal()),
            BoxSizing::ContentBox => self.width,
        };
        let gutter = if scrollbar { SCROLLBAR_WIDTH } else { 0 };
        base.saturating_sub(gutter).max(1)
    }

    /// Height of the text area inside borders and padding.
    pub fn content_height(&self) -> u16 {
        match self.box_sizing {
            BoxSizing::BorderBox => self
                .client_height()
                .saturating_sub(self.padding.vertical()),
            BoxSizing::ContentBox => self.height,
        }
    }

    /// Visible text lines.
    pub fn visible_lines(&self) -> u16 {
        (self.content_height() / self.line_rows()).max(1)
    }
}

/// Rendering-engine behaviour the mirror has to reproduce.
///
/// Fixed for the lifetime of the process; injected where fields are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineQuirks {
    /// The host draws a vertical scrollbar inside the field once its content
    /// is taller than the field, narrowing the text area. The mirror must
    /// then force the same gutter or it wraps differently.
    pub force_scroll_on_overflow: bool,
}

/// Position of the caret relative to the field's border box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaretCoordinates {
    pub top: u16,
    pub left: u16,
    pub height: u16,
}

/// One laid-out character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    /// Byte offset of the source character.
    pub byte: usize,
    pub row: usize,
    pub col: u16,
    pub width: u16,
    /// What to draw (after text-transform, tabs expanded to spaces).
    pub text: String,
}

/// Result of wrapping a string at a given width.
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    pub glyphs: Vec<Glyph>,
    pub rows: usize,
    pub width: u16,
}

struct WrapMetrics {
    width: u16,
    indent: u16,
    tab_size: u16,
    letter_spacing: u16,
    word_spacing: u16,
    transform: TextTransform,
}

impl WrapMetrics {
    fn from_style(style: &FieldStyle, scrollbar: bool) -> Self {
        Self {
            width: style.content_width(scrollbar),
            indent: style.text_indent,
            tab_size: style.tab_size.max(1),
            letter_spacing: style.letter_spacing,
            word_spacing: style.word_spacing,
            transform: style.text_transform,
        }
    }
}

fn transform_char(c: char, transform: TextTransform, word_start: bool) -> String {
    match transform {
        TextTransform::None => c.to_string(),
        TextTransform::Uppercase => c.to_uppercase().collect(),
        TextTransform::Lowercase => c.to_lowercase().collect(),
        TextTransform::Capitalize if word_start => c.to_uppercase().collect(),
        TextTransform::Capitalize => c.to_string(),
    }
}

fn text_width(text: &str) -> u16 {
    text.chars()
        .map(|c| u16::try_from(c.width().unwrap_or(0)).unwrap_or(u16::MAX))
        .fold(0u16, u16::saturating_add)
}

/// Wrap like `white-space: pre-wrap; word-wrap: break-word`.
///
/// Newlines force a break, whitespace never causes one (it hangs at the end
/// of a line), words move to the next row when they do not fit and are
/// broken per character when longer than a whole row.
fn wrap(text: &str, m: &WrapMetrics) -> TextLayout {
    let mut glyphs = Vec::new();
    let mut row = 0usize;
    let mut col = m.indent.min(m.width.saturating_sub(1));
    let mut word_start = true;

    let mut chars = text.char_indices().peekable();
    while let Some(&(byte, c)) = chars.peek() {
        if c == '\n' {
            chars.next();
            glyphs.push(Glyph {
                byte,
                row,
                col,
                width: 0,
                text: String::new(),
            });
            row += 1;
            col = 0;
            word_start = true;
            continue;
        }

        if c.is_whitespace() {
            chars.next();
            let width = if c == '\t' {
                m.tab_size - (col % m.tab_size)
            } else {
                1u16.saturating_add(m.word_spacing)
                    .saturating_add(m.letter_spacing)
            };
            glyphs.push(Glyph {
                byte,
                row,
                col,
                width,
                text: " ".repeat(usize::from(width)),
            });
            col = col.saturating_add(width);
            word_start = true;
            continue;
        }

        // Collect the whole word to decide whether it fits.
        let mut word = Vec::new();
        while let Some(&(b, ch)) = chars.peek() {
            if ch.is_whitespace() {
                break;
            }
            chars.next();
            let shown = transform_char(ch, m.transform, word_start && word.is_empty());
            let width = text_width(&shown).saturating_add(m.letter_spacing);
            word.push((b, shown, width));
        }
        word_start = false;
        let word_width = word.iter().fold(0u16, |acc, (_, _, w)| acc.saturating_add(*w));

        if col > 0 && col.saturating_add(word_width) > m.width && word_width <= m.width {
            row += 1;
            col = 0;
        }
        for (b, shown, width) in word {
            if col > 0 && col.saturating_add(width) > m.width {
                row += 1;
                col = 0;
            }
            glyphs.push(Glyph {
                byte: b,
                row,
                col,
                width,
                text: shown,
            });
            col = col.saturating_add(width);
        }
    }

    TextLayout {
        glyphs,
        rows: row + 1,
        width: m.width,
    }
}

impl TextLayout {
    /// Extent of a row, clamped to the wrap width.
    pub fn row_width(&self, row: usize) -> u16 {
        self.glyphs
            .iter()
            .filter(|g| g.row == row)
            .map(|g| g.col.saturating_add(g.width))
            .max()
            .unwrap_or(0)
            .min(self.width)
    }

    /// Row/column of the glyph starting at `byte`, or just past the last
    /// glyph when `byte` is at or beyond the end.
    pub fn locate(&self, byte: usize) -> (usize, u16) {
        if let Some(g) = self.glyphs.iter().find(|g| g.byte >= byte) {
            return (g.row, g.col.min(self.width));
        }
        self.glyphs.last().map_or((0, 0), |g| {
            if g.text.is_empty() {
                // Trailing newline: the caret sits at the start of the next row.
                (g.row + 1, 0)
            } else {
                (g.row, g.col.saturating_add(g.width).min(self.width))
            }
        })
    }

    /// Horizontal shift of a row for the given alignment/direction.
    fn row_shift(&self, row: usize, align: TextAlign, direction: Direction) -> u16 {
        let free = self.width.saturating_sub(self.row_width(row));
        match (align, direction) {
            (TextAlign::Start, Direction::Ltr) | (TextAlign::End, Direction::Rtl) => 0,
            (TextAlign::Center, _) => free / 2,
            (TextAlign::End, Direction::Ltr) | (TextAlign::Start, Direction::Rtl) => free,
        }
    }
}

/// The field's own text laid out the way it is drawn.
#[derive(Debug, Clone)]
pub struct FieldLayout {
    pub layout: TextLayout,
    /// Whether a scrollbar gutter narrows the text area.
    pub scrollbar: bool,
    style: FieldStyle,
}

/// A drawable row of the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    /// Column offset of the first glyph inside the text area.
    pub offset: u16,
    pub text: String,
}

impl FieldLayout {
    /// Lay out `value` in a field styled by `style`.
    pub fn compute(style: &FieldStyle, quirks: EngineQuirks, value: &str) -> Self {
        let plain = wrap(value, &WrapMetrics::from_style(style, false));
        let overflows = content_overflows(style, plain.rows);
        let scrollbar = match style.overflow_y {
            Overflow::Scroll => true,
            Overflow::Auto => quirks.force_scroll_on_overflow && overflows,
            Overflow::Visible | Overflow::Hidden => false,
        };
        let layout = if scrollbar {
            wrap(value, &WrapMetrics::from_style(style, true))
        } else {
            plain
        };
        Self {
            layout,
            scrollbar,
            style: style.clone(),
        }
    }

    /// Total height of the laid-out content, padding included.
    pub fn scroll_height(&self) -> u16 {
        scroll_height(&self.style, self.layout.rows)
    }

    pub fn overflows(&self) -> bool {
        content_overflows(&self.style, self.layout.rows)
    }

    /// Row and column of the caret at byte offset `caret`.
    pub fn caret_position(&self, caret: usize) -> (usize, u16) {
        let (row, col) = self.layout.locate(caret);
        let shift = self
            .layout
            .row_shift(row, self.style.text_align, self.style.direction);
        (row, shift.saturating_add(col).min(self.layout.width))
    }

    /// Drawable rows, one per wrapped line.
    pub fn rows(&self) -> Vec<FieldRow> {
        let mut rows: Vec<FieldRow> = (0..self.layout.rows)
            .map(|row| FieldRow {
                offset: self
                    .layout
                    .row_shift(row, self.style.text_align, self.style.direction),
                text: String::new(),
            })
            .collect();
        for g in &self.layout.glyphs {
            if let Some(r) = rows.get_mut(g.row) {
                r.text.push_str(&g.text);
            }
        }
        rows
    }

    /// Vertical scroll (in rows) that keeps the caret's line visible, given
    /// the current scroll.
    pub fn scroll_to_caret(&self, caret: usize, current: u16) -> u16 {
        let line_rows = self.style.line_rows();
        let visible = self.style.visible_lines();
        let (row, _) = self.caret_position(caret);
        let line = u16::try_from(row).unwrap_or(u16::MAX);
        let first = current / line_rows;
        let first = if line < first {
            line
        } else if line >= first.saturating_add(visible) {
            line.saturating_add(1).saturating_sub(visible)
        } else {
            first
        };
        first.saturating_mul(line_rows)
    }
}

fn scroll_height(style: &FieldStyle, rows: usize) -> u16 {
    let rows = u16::try_from(rows).unwrap_or(u16::MAX);
    rows.saturating_mul(style.line_rows())
        .saturating_add(style.padding.vertical())
}

fn content_overflows(style: &FieldStyle, rows: usize) -> bool {
    scroll_height(style, rows) > style.client_height()
}

/// Hidden copy of a field used to measure character positions.
#[derive(Debug, Clone)]
pub struct Mirror {
    style: FieldStyle,
    scrollbar: bool,
}

impl Mirror {
    /// Build a mirror of `field`, copying every [`LAYOUT_PROPERTIES`] entry.
    ///
    /// `field_overflows` tells whether the real field's content is taller
    /// than the field; it only matters under
    /// [`EngineQuirks::force_scroll_on_overflow`]. Otherwise overflow is hidden.
    pub fn new(field: &FieldStyle, quirks: EngineQuirks, field_overflows: bool) -> Self {
        let mut style = FieldStyle::default();
        for property in LAYOUT_PROPERTIES {
            style.copy_property(field, property);
        }
        let scrollbar = if quirks.force_scroll_on_overflow {
            if field_overflows {
                style.overflow_y = Overflow::Scroll;
            }
            style.overflow_y == Overflow::Scroll
        } else {
            style.overflow_x = Overflow::Hidden;
            style.overflow_y = Overflow::Hidden;
            false
        };
        Self { style, scrollbar }
    }

    pub const fn style(&self) -> &FieldStyle {
        &self.style
    }

    /// Measure where the character at `position` of `value` is drawn.
    ///
    /// The mirror holds `value[..position]` followed by a marker containing
    /// the rest of the value (or `"."` at the end); the marker's offset plus
    /// the border widths is the caret position.
    pub fn measure(&self, value: &str, position: usize) -> CaretCoordinates {
        let position = super::trigger::clamp_to_boundary(value, position);
        let (before, after) = value.split_at(position);
        let marker = if after.is_empty() { END_MARKER } else { after };
        let mut content = String::with_capacity(before.len() + marker.len());
        content.push_str(before);
        content.push_str(marker);

        let layout = wrap(&content, &WrapMetrics::from_style(&self.style, self.scrollbar));
        let (row, col) = layout.locate(position);
        let shift = layout.row_shift(row, self.style.text_align, self.style.direction);
        let line_rows = self.style.line_rows();
        let row = u16::try_from(row).unwrap_or(u16::MAX);

        CaretCoordinates {
            top: self
                .style
                .border
                .top
                .saturating_add(self.style.padding.top)
                .saturating_add(row.saturating_mul(line_rows)),
            left: self
                .style
                .border
                .left
                .saturating_add(self.style.padding.left)
                .saturating_add(shift.saturating_add(col).min(layout.width)),
            height: line_rows,
        }
    }
}

/// Caret coordinates of `position` in a field with the given style.
///
/// Builds a mirror, measures, and drops it.
pub fn caret_coordinates(
    style: &FieldStyle,
    quirks: EngineQuirks,
    value: &str,
    position: usize,
) -> CaretCoordinates {
    let overflows = FieldLayout::compute(style, EngineQuirks::default(), value).overflows();
    Mirror::new(style, quirks, overflows).measure(value, position)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn style(width: u16, height: u16) -> FieldStyle {
        FieldStyle {
            width,
            height,
            ..FieldStyle::default()
        }
    }

    #[test]
    fn mirror_copies_every_layout_property() {
        let field = FieldStyle {
            direction: Direction::Rtl,
            box_sizing: BoxSizing::ContentBox,
            width: 17,
            height: 9,
            border: Edges {
                top: 2,
                right: 3,
                bottom: 4,
                left: 5,
            },
            padding: Edges::all(1),
            font_family: "serif".into(),
            letter_spacing: 1,
            word_spacing: 2,
            tab_size: 4,
            text_indent: 3,
            text_transform: TextTransform::Uppercase,
            ..FieldStyle::default()
        };
        let mirror = Mirror::new(&field, EngineQuirks::default(), false);
        let mut expected = field.clone();
        expected.overflow_x = Overflow::Hidden;
        expected.overflow_y = Overflow::Hidden;
        assert_eq!(mirror.style(), &expected);
    }

    #[test]
    fn oversized_style_saturates() {
        let field = FieldStyle {
            border: Edges::all(u16::MAX / 2 + 1),
            padding: Edges::all(u16::MAX),
            letter_spacing: u16::MAX,
            word_spacing: u16::MAX,
            ..style(40, 5)
        };
        let coords = caret_coordinates(&field, EngineQuirks::default(), "ab cd", 4);
        assert_eq!(coords.top, u16::MAX);
        assert_eq!(coords.left, u16::MAX);
        assert_eq!(coords.height, 1);
    }

    #[test]
    fn caret_on_first_line_offsets_by_border() {
        let coords = caret_coordinates(&style(40, 5), EngineQuirks::default(), "hello @wo", 9);
        assert_eq!(
            coords,
            CaretCoordinates {
                top: 1,
                left: 10,
                height: 1
            }
        );
    }

    #[test]
    fn caret_in_middle_uses_marker_position() {
        let coords = caret_coordinates(&style(40, 5), EngineQuirks::default(), "hi @b there", 5);
        assert_eq!(coords.left, 6);
        assert_eq!(coords.top, 1);
    }

    #[test]
    fn padding_moves_caret() {
        let mut s = style(40, 7);
        s.padding = Edges {
            top: 1,
            right: 0,
            bottom: 1,
            left: 2,
        };
        let coords = caret_coordinates(&s, EngineQuirks::default(), "ab", 2);
        assert_eq!((coords.top, coords.left), (2, 5));
    }

    #[test]
    fn long_text_wraps_words_to_next_row() {
        // 10 cells of text area: "aaaa bbbb " fills row 0, "cccc" moves down.
        let s = style(12, 5);
        let coords = caret_coordinates(&s, EngineQuirks::default(), "aaaa bbbb cccc", 14);
        assert_eq!((coords.top, coords.left), (2, 5));
    }

    #[test]
    fn newline_starts_new_row() {
        let coords = caret_coordinates(&style(40, 5), EngineQuirks::default(), "one\n@tw", 7);
        assert_eq!((coords.top, coords.left), (2, 4));
    }

    #[test]
    fn overlong_word_breaks_per_character() {
        let layout = wrap(
            "abcdefghijkl",
            &WrapMetrics::from_style(&style(7, 5), false),
        );
        // 5 cells per row.
        assert_eq!(layout.rows, 3);
        assert_eq!(layout.locate(5), (1, 0));
    }

    #[test]
    fn tabs_expand_to_tab_stops() {
        let mut s = style(40, 5);
        s.tab_size = 4;
        let coords = caret_coordinates(&s, EngineQuirks::default(), "a\tb", 2);
        assert_eq!(coords.left, 1 + 4);
    }

    #[test]
    fn line_height_scales_rows() {
        let mut s = style(40, 10);
        s.line_height = 2;
        let coords = caret_coordinates(&s, EngineQuirks::default(), "x\ny", 2);
        assert_eq!((coords.top, coords.height), (3, 2));
    }

    #[test]
    fn scrollbar_quirk_changes_wrapping_when_overflowing() {
        // Text area is 6 cells, 2 lines tall. "aaa bb" fits exactly without
        // a gutter but not with one.
        let s = style(8, 4);
        let value = "aaa bb\nc\nd\n@e";
        let caret = 3 + 1 + 2; // end of "aaa bb"
        let plain = caret_coordinates(&s, EngineQuirks::default(), value, caret);
        let quirky = caret_coordinates(
            &s,
            EngineQuirks {
                force_scroll_on_overflow: true,
            },
            value,
            caret,
        );
        assert_eq!((plain.top, plain.left), (1, 7));
        assert_eq!((quirky.top, quirky.left), (2, 3));
        let bb = 4;
        let plain_bb = caret_coordinates(&s, EngineQuirks::default(), value, bb);
        let quirky_bb = caret_coordinates(
            &s,
            EngineQuirks {
                force_scroll_on_overflow: true,
            },
            value,
            bb,
        );
        assert_eq!((plain_bb.top, plain_bb.left), (1, 5));
        assert_eq!((quirky_bb.top, quirky_bb.left), (2, 1));
    }

    #[test]
    fn no_gutter_without_overflow() {
        let s = style(8, 4);
        let quirks = EngineQuirks {
            force_scroll_on_overflow: true,
        };
        let layout = FieldLayout::compute(&s, quirks, "short");
        assert!(!layout.scrollbar);
        assert!(!layout.overflows());
    }

    #[test]
    fn field_layout_matches_mirror_for_inner_positions() {
        let s = style(12, 4);
        let quirks = EngineQuirks {
            force_scroll_on_overflow: true,
        };
        let value = "some words that wrap around\nand more @men";
        let field = FieldLayout::compute(&s, quirks, value);
        for caret in [0, 5, 11, 20, 30, 38] {
            let coords = caret_coordinates(&s, quirks, value, caret);
            let (row, col) = field.caret_position(caret);
            assert_eq!(usize::from(coords.top - 1), row, "caret {caret}");
            assert_eq!(coords.left - 1, col, "caret {caret}");
        }
    }

    #[test]
    fn rows_render_glyph_text() {
        let s = style(12, 4);
        let field = FieldLayout::compute(&s, EngineQuirks::default(), "aaaa bbbb cccc");
        let rows = field.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "aaaa bbbb ");
        assert_eq!(rows[1].text, "cccc");
    }

    #[test]
    fn centered_text_shifts_caret() {
        let mut s = style(12, 4);
        s.text_align = TextAlign::Center;
        let coords = caret_coordinates(&s, EngineQuirks::default(), "ab", 0);
        // Content "ab" is 2 wide in 10 cells.
        assert_eq!(coords.left, 1 + 4);
    }

    #[test]
    fn uppercase_transform_can_widen_text() {
        let mut s = style(40, 4);
        s.text_transform = TextTransform::Uppercase;
        let coords = caret_coordinates(&s, EngineQuirks::default(), "ßx", "ß".len());
        assert_eq!(coords.left, 1 + 2);
    }

    #[test]
    fn wide_characters_take_two_cells() {
        let coords = caret_coordinates(&style(40, 4), EngineQuirks::default(), "日本@", "日本".len());
        assert_eq!(coords.left, 1 + 4);
    }

    #[test]
    fn scroll_to_caret_keeps_caret_visible() {
        let s = style(12, 4); // two visible lines
        let field = FieldLayout::compute(&s, EngineQuirks::default(), "a\nb\nc\nd");
        assert_eq!(field.scroll_to_caret(6, 0), 2);
        assert_eq!(field.scroll_to_caret(0, 2), 0);
        assert_eq!(field.scroll_to_caret(2, 0), 0);
    }
}
