use ratatui::layout::Rect;
use std::cmp;

/// Single-line text field with a cursor and horizontal scrolling.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    chars: Vec<char>,
    pub cursor_col: usize,
    pub scroll_col: usize, // Horizontal scroll (column offset)
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_string(content: &str) -> Self {
        // Fields are single-line; keep only the first line of anything pasted in
        let chars: Vec<char> = content.lines().next().unwrap_or("").chars().collect();
        let cursor_col = chars.len();
        Self {
            chars,
            cursor_col,
            scroll_col: 0,
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_blank(&self) -> bool {
        self.chars.iter().all(|c| c.is_whitespace())
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' || ch == '\r' {
            return;
        }
        let col = cmp::min(self.cursor_col, self.chars.len());
        self.chars.insert(col, ch);
        self.cursor_col = col + 1;
    }

    /// Delete the character before the cursor (Backspace)
    pub fn delete_char(&mut self) {
        let col = cmp::min(self.cursor_col, self.chars.len());
        if col > 0 {
            self.chars.remove(col - 1);
            self.cursor_col = col - 1;
        }
    }

    /// Delete the character under the cursor (Delete)
    pub fn delete_forward(&mut self) {
        if self.cursor_col < self.chars.len() {
            self.chars.remove(self.cursor_col);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_col = self.cursor_col.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.chars.len() {
            self.cursor_col += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.chars.len();
    }

    pub fn move_cursor_word_left(&mut self) {
        let mut pos = cmp::min(self.cursor_col, self.chars.len());

        // Skip whitespace, then the word itself
        while pos > 0 && self.chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && is_word_char(self.chars[pos - 1]) {
            pos -= 1;
        }

        self.cursor_col = pos;
    }

    pub fn move_cursor_word_right(&mut self) {
        let mut pos = cmp::min(self.cursor_col, self.chars.len());

        while pos < self.chars.len() && is_word_char(self.chars[pos]) {
            pos += 1;
        }
        while pos < self.chars.len() && self.chars[pos].is_whitespace() {
            pos += 1;
        }

        self.cursor_col = pos;
    }

    pub fn update_horizontal_scroll(&mut self, viewport_width: usize) {
        // viewport_width includes the field's borders
        let effective_width = viewport_width.saturating_sub(2).max(1);

        if self.cursor_col < self.scroll_col {
            self.scroll_col = self.cursor_col;
        } else if self.cursor_col >= self.scroll_col + effective_width {
            self.scroll_col = self.cursor_col + 1 - effective_width;
        }
    }

    /// Text currently scrolled into view for a field of `viewport_width`
    pub fn visible_text(&self, viewport_width: usize) -> String {
        let effective_width = viewport_width.saturating_sub(2);
        self.chars
            .iter()
            .skip(self.scroll_col)
            .take(effective_width)
            .collect()
    }

    /// Terminal position of the cursor inside a bordered field at `area`
    pub fn get_cursor_screen_pos(&self, area: Rect) -> Option<(u16, u16)> {
        if area.width < 3 || area.height < 3 {
            return None;
        }
        let col = cmp::min(self.cursor_col, self.chars.len());
        let visible_col = col.checked_sub(self.scroll_col)?;

        let max_x = area.width.saturating_sub(2);
        if visible_col >= max_x as usize {
            return None;
        }

        Some((area.x + 1 + visible_col as u16, area.y + 1))
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_backspace() {
        let mut editor = Editor::new();
        for ch in "09:0x".chars() {
            editor.insert_char(ch);
        }
        editor.delete_char();
        editor.insert_char('0');
        assert_eq!(editor.text(), "09:00");
        assert_eq!(editor.cursor_col, 5);
    }

    #[test]
    fn insert_in_the_middle() {
        let mut editor = Editor::from_string("2024-0101");
        editor.move_cursor_left();
        editor.move_cursor_left();
        editor.insert_char('-');
        assert_eq!(editor.text(), "2024-01-01");
    }

    #[test]
    fn newlines_are_ignored() {
        let mut editor = Editor::from_string("first\nsecond");
        assert_eq!(editor.text(), "first");
        editor.insert_char('\n');
        assert_eq!(editor.text(), "first");
    }

    #[test]
    fn word_motion() {
        let mut editor = Editor::from_string("buy more milk");
        editor.move_cursor_word_left();
        assert_eq!(editor.cursor_col, 9);
        editor.move_cursor_home();
        editor.move_cursor_word_right();
        assert_eq!(editor.cursor_col, 4);
    }

    #[test]
    fn scrolls_to_keep_cursor_visible() {
        let mut editor = Editor::from_string("abcdefghij");
        editor.update_horizontal_scroll(6); // 4 visible columns
        assert_eq!(editor.scroll_col, 7);
        assert_eq!(editor.visible_text(6), "hij");

        editor.move_cursor_home();
        editor.update_horizontal_scroll(6);
        assert_eq!(editor.scroll_col, 0);
        assert_eq!(editor.get_cursor_screen_pos(Rect::new(10, 5, 6, 3)), Some((11, 6)));
    }

    #[test]
    fn blank_detection() {
        assert!(Editor::from_string("   ").is_blank());
        assert!(!Editor::from_string(" x ").is_blank());
    }
}
