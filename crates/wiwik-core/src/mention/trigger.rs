//! Mention trigger detection.
//!
//! Analyzes the field value and caret position to decide whether the user
//! is currently typing a mention.

/// A recognised mention token ending at the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// Byte offset of the trigger character in the field value.
    pub offset: usize,
    /// The trigger character itself.
    pub trigger: char,
    /// Text typed after the trigger character, up to the caret.
    pub query: String,
}

/// Clamp `pos` into `text` and down to the nearest char boundary.
pub fn clamp_to_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Start of the whitespace-free token ending at `caret`.
pub fn token_start(value: &str, caret: usize) -> usize {
    let before_caret = &value[..clamp_to_boundary(value, caret)];
    before_caret
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8())
}

/// Detect a mention trigger in `value` at `caret`.
///
/// The candidate token is the maximal whitespace-free suffix of the text
/// before the caret. It is a trigger iff it starts with `trigger`; the query
/// is whatever follows the trigger character.
pub fn detect_trigger(value: &str, caret: usize, trigger: char) -> Option<Trigger> {
    let caret = clamp_to_boundary(value, caret);
    let start = token_start(value, caret);
    let token = &value[start..caret];
    let query = token.strip_prefix(trigger)?;
    Some(Trigger {
        offset: start,
        trigger,
        query: query.to_string(),
    })
}
