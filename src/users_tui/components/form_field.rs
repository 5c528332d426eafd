//! Form field component for user input

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::users_tui::ui::Styles;

/// Single-line text input. The cursor is a char index into `value`.
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: String,
    pub value: String,
    pub placeholder: String,
    pub is_focused: bool,
    pub is_disabled: bool,
    pub cursor_position: usize,
}

impl FormField {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: String::new(),
            placeholder: String::new(),
            is_focused: false,
            is_disabled: false,
            cursor_position: 0,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    #[cfg(test)]
    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self.cursor_position = value.chars().count();
        self
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.is_disabled = disabled;
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        if self.is_disabled {
            return;
        }
        let at = self.byte_offset(self.cursor_position);
        self.value.insert(at, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.is_disabled || self.cursor_position == 0 {
            return;
        }
        self.cursor_position -= 1;
        let at = self.byte_offset(self.cursor_position);
        self.value.remove(at);
    }

    pub fn delete_char_forward(&mut self) {
        if self.is_disabled || self.cursor_position >= self.char_len() {
            return;
        }
        let at = self.byte_offset(self.cursor_position);
        self.value.remove(at);
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.char_len() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.char_len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_position = 0;
    }

    /// Render the form field
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let showing_placeholder = self.value.is_empty() && !self.placeholder.is_empty();
        let display_text = if showing_placeholder {
            &self.placeholder
        } else {
            &self.value
        };

        let border_style = if self.is_disabled {
            Styles::inactive_border()
        } else if self.is_focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };

        let text_style = if self.is_disabled || showing_placeholder {
            Styles::inactive()
        } else {
            Styles::default()
        };

        let block = Block::default()
            .title(self.label.clone())
            .borders(Borders::ALL)
            .border_style(border_style);

        let paragraph = Paragraph::new(display_text.to_string())
            .style(text_style)
            .block(block);

        f.render_widget(paragraph, area);

        if self.is_focused && !self.is_disabled {
            if let Some(cursor_x) = self.cursor_column(area) {
                f.set_cursor(cursor_x, area.y.saturating_add(1));
            }
        }
    }

    /// Screen column of the cursor, or `None` when it falls outside the box
    fn cursor_column(&self, area: Rect) -> Option<u16> {
        let before_cursor: String = self.value.chars().take(self.cursor_position).collect();
        let offset = u16::try_from(before_cursor.width()).unwrap_or(u16::MAX);
        let cursor_x = area.x.saturating_add(1).saturating_add(offset);
        let right_edge = area.x.saturating_add(area.width.saturating_sub(1));
        (cursor_x < right_edge).then_some(cursor_x)
    }
}
