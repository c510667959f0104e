//! Status bar widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::common::format_amount;
use crate::state::{InputMode, Store};

/// Status bar widget.
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let connection_status = if store.app.connected {
            Span::styled("● Connected", Style::default().fg(Color::Green))
        } else {
            Span::styled("○ Disconnected", Style::default().fg(Color::Red))
        };

        let mode = match store.app.input_mode {
            InputMode::Normal => Span::styled(" NORMAL ", Style::default().fg(Color::Yellow)),
            InputMode::Insert => Span::styled(
                " INSERT ",
                Style::default().fg(Color::Black).bg(Color::Yellow),
            ),
        };

        let loading = if store.app.loading {
            Span::styled(
                " Loading... ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Span::raw("")
        };

        let cash = Span::styled(
            format!(" Cash: {} ", format_amount(store.assets.total_cash)),
            Style::default().fg(Color::White),
        );

        let help_hint = Span::styled(" Press ? for help ", Style::default().fg(Color::Gray));

        let left_content = vec![
            Span::styled(
                " MutualRisk ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            connection_status,
            Span::raw(" | "),
            mode,
            Span::raw(" | "),
            cash,
            loading,
        ];

        let status_line = Line::from(left_content);

        // Calculate padding for right-aligned help hint
        let left_len = status_line.width();
        let right_len = help_hint.width();
        let padding = (area.width as usize).saturating_sub(left_len + right_len);

        let mut full_line = status_line.spans;
        full_line.push(Span::raw(" ".repeat(padding)));
        full_line.push(help_hint);

        let paragraph =
            Paragraph::new(Line::from(full_line)).style(Style::default().bg(Color::DarkGray));

        frame.render_widget(paragraph, area);
    }
}
