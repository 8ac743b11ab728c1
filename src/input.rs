/// Single-line text input with a character-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputField {
    value: String,
    cursor: usize,
}

impl InputField {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        InputField { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Backspace: removes the character before the cursor.
    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_index(self.cursor - 1);
        self.value.remove(at);
        self.cursor -= 1;
    }

    /// Delete: removes the character under the cursor.
    pub fn delete_forward(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    /// Splits the value around the cursor for rendering.
    pub fn split_at_cursor(&self) -> (&str, Option<char>, &str) {
        let at = self.byte_index(self.cursor);
        let (before, rest) = self.value.split_at(at);
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) => (before, Some(c), chars.as_str()),
            None => (before, None, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_backspace_follow_cursor() {
        let mut field = InputField::default();
        for c in "milk".chars() {
            field.insert_char(c);
        }
        field.move_to_start();
        field.insert_char('B');
        assert_eq!(field.value(), "Bmilk");
        assert_eq!(field.cursor(), 1);

        field.move_to_end();
        field.delete_char();
        assert_eq!(field.value(), "Bmil");
    }

    #[test]
    fn handles_multibyte_characters() {
        let mut field = InputField::new("café");
        field.move_cursor_left();
        field.delete_forward();
        assert_eq!(field.value(), "caf");

        field.insert_char('é');
        field.insert_char('!');
        assert_eq!(field.value(), "café!");
        assert_eq!(field.split_at_cursor(), ("café!", None, ""));
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut field = InputField::new("ab");
        field.move_cursor_right();
        assert_eq!(field.cursor(), 2);
        field.move_to_start();
        field.move_cursor_left();
        field.delete_char();
        assert_eq!(field.cursor(), 0);
        assert_eq!(field.value(), "ab");
        assert_eq!(field.split_at_cursor(), ("", Some('a'), "b"));
    }

    #[test]
    fn clear_resets_cursor() {
        let mut field = InputField::new("Pay rent");
        field.clear();
        assert!(field.is_empty());
        assert_eq!(field.cursor(), 0);
    }
}
