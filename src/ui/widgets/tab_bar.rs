//! Tab bar widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::config::KeyBindings;
use crate::state::{Store, View};

/// Tab bar widget.
pub struct TabBar;

impl TabBar {
    /// Render the tab bar.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store, keys: &KeyBindings) {
        let selected_count = store.assets.assets.len();
        let picked = store.assets.temp_assets.len();
        let bookmarks_label = if picked > 0 {
            format!("Bookmarks ({picked} picked)")
        } else {
            "Bookmarks".to_string()
        };
        let constraints_label = format!("Constraints ({selected_count})");

        let tabs = [
            (keys.portfolios.as_str(), "Portfolios".to_string(), View::Portfolios),
            (keys.backtest.as_str(), "Backtest".to_string(), View::Backtest),
            (keys.bookmarks.as_str(), bookmarks_label, View::Bookmarks),
            (keys.constraints.as_str(), constraints_label, View::Constraints),
        ];

        let mut spans = vec![Span::raw(" ")];

        for (key, name, view) in tabs {
            let is_selected = store.app.current_view == view;

            let key_style = Style::default().fg(Color::DarkGray);
            let name_style = if is_selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::White)
            };

            spans.push(Span::styled(format!("[{}] ", key), key_style));
            spans.push(Span::styled(name, name_style));
            spans.push(Span::raw("  "));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
