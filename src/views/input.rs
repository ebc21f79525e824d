//! Editable quantity field of the buy and sell forms.

use unicode_width::UnicodeWidthStr;

/// Quantity text as typed, plus a cursor.
///
/// Typing only admits ASCII digits and a single decimal point. [`set`]
/// stores any text, so what reaches validation may still be invalid.
///
/// [`set`]: QuantityInput::set
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuantityInput {
    text: String,
    /// Character index.
    cursor: usize,
}

impl QuantityInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn offset(&self, index: usize) -> usize {
        self.text
            .char_indices()
            .nth(index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    /// Types `c` at the cursor. Returns `false` when the character is not
    /// part of a decimal quantity and was ignored.
    pub fn type_char(&mut self, c: char) -> bool {
        let accepted = c.is_ascii_digit() || (c == '.' && !self.text.contains('.'));
        if accepted {
            let at = self.offset(self.cursor);
            self.text.insert(at, c);
            self.cursor += 1;
        }
        accepted
    }

    pub fn backspace(&mut self) {
        if let Some(index) = self.cursor.checked_sub(1) {
            let at = self.offset(index);
            self.text.remove(at);
            self.cursor = index;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.len_chars() {
            let at = self.offset(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len_chars());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len_chars();
    }

    /// Replaces the text (sell max, tests) and puts the cursor at the end.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.len_chars();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Display column of the cursor within the field.
    pub fn cursor_column(&self) -> u16 {
        let before = &self.text[..self.offset(self.cursor)];
        u16::try_from(before.width()).unwrap_or(u16::MAX)
    }
}
