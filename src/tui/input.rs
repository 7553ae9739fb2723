//! Input field handling for the terminal user interface.

/// A single-line text input with a character cursor and active state.
#[derive(Clone, Debug, Default)]
pub struct InputField {
    pub value: String,
    /// Cursor position in characters.
    pub cursor: usize,
    pub active: bool,
}

impl InputField {
    /// Create a new empty input field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the text and move the cursor to its end.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value.char_indices().nth(cursor).map(|(i, _)| i).unwrap_or(self.value.len())
    }

    /// Insert a character at the current cursor position.
    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_index(self.cursor - 1);
            self.value.remove(at);
            self.cursor -= 1;
        }
    }

    /// Delete the character at the cursor position.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    /// Move cursor one position to the left.
    pub fn move_cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    /// Move cursor one position to the right.
    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_at_cursor() {
        let mut f = InputField::new();
        for c in "51.5,0".chars() {
            f.handle_char(c);
        }
        f.move_cursor_left();
        f.move_cursor_left();
        f.handle_char(' ');
        assert_eq!(f.value, "51.5 ,0");
        f.handle_backspace();
        f.handle_delete();
        assert_eq!(f.value, "51.50");
    }

    #[test]
    fn handles_multibyte_text() {
        let mut f = InputField::new();
        f.set_value("café");
        f.handle_backspace();
        assert_eq!(f.value, "caf");
        f.move_cursor_left();
        f.handle_char('ñ');
        assert_eq!(f.value, "cañf");
        assert_eq!(f.cursor, 3);
    }
}
