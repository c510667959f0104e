//! Application-level state.

use chrono::{DateTime, Utc};

use super::{ConstraintColumn, Notification};

/// The current view/screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Portfolios,
    Backtest,
    Bookmarks,
    Constraints,
}

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Insert,
}

/// The field an in-progress edit will be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Constraint { row: usize, column: ConstraintColumn },
    TotalCash,
}

/// Global application state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current view.
    pub current_view: View,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Field being edited in insert mode.
    pub edit_target: Option<EditTarget>,
    /// Whether to show help overlay.
    pub show_help: bool,
    /// Current notification.
    pub notification: Option<Notification>,
    /// When the current notification was shown.
    pub notification_shown_at: Option<DateTime<Utc>>,
    /// Current error message.
    pub error: Option<String>,
    /// Whether the app is loading data.
    pub loading: bool,
    /// Whether the backend answered the last request.
    pub connected: bool,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Edit buffer.
    pub input_buffer: String,
    /// Cursor position in input buffer.
    pub cursor_position: usize,
}

impl AppState {
    /// Check if in an input mode.
    pub fn is_editing(&self) -> bool {
        self.input_mode == InputMode::Insert
    }

    /// Start editing `target`, pre-filled with `initial`.
    pub fn begin_edit(&mut self, target: EditTarget, initial: String) {
        self.edit_target = Some(target);
        self.input_mode = InputMode::Insert;
        self.cursor_position = initial.chars().count();
        self.input_buffer = initial;
    }

    /// Leave insert mode, returning the target and the typed text.
    pub fn finish_edit(&mut self) -> Option<(EditTarget, String)> {
        self.input_mode = InputMode::Normal;
        let target = self.edit_target.take()?;
        let text = std::mem::take(&mut self.input_buffer);
        self.cursor_position = 0;
        Some((target, text))
    }

    /// Clear the input buffer.
    pub fn clear_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }

    /// Insert a character at the cursor.
    pub fn push_char(&mut self, c: char) {
        let byte_index = self.byte_index();
        self.input_buffer.insert(byte_index, c);
        self.cursor_position += 1;
    }

    /// Remove the character before the cursor.
    pub fn pop_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let byte_index = self.byte_index();
            self.input_buffer.remove(byte_index);
        }
    }

    /// Move cursor left.
    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn cursor_right(&mut self) {
        if self.cursor_position < self.input_buffer.chars().count() {
            self.cursor_position += 1;
        }
    }

    /// Whether the current notification has been visible for its full duration.
    pub fn notification_expired(&self, now: DateTime<Utc>) -> bool {
        match (&self.notification, self.notification_shown_at) {
            (Some(n), Some(shown)) => {
                (now - shown).num_seconds() >= n.duration_secs as i64
            }
            _ => false,
        }
    }

    fn byte_index(&self) -> usize {
        self.input_buffer
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input_buffer.len())
    }
}
