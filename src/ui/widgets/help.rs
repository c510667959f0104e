//! Help panel widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::super::layout::centered_rect;
use crate::config::KeyBindings;

/// Help panel showing keybindings.
pub struct HelpPanel;

fn section(title: &str) -> [Line<'static>; 2] {
    [
        Line::from(vec![Span::styled(
            title.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
    ]
}

fn entry(key: &str, description: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<8}", key), Style::default().fg(Color::Cyan)),
        Span::raw(description.to_string()),
    ])
}

impl HelpPanel {
    /// Render the help panel.
    pub fn render(frame: &mut Frame, area: Rect, keys: &KeyBindings) {
        let popup_area = centered_rect(60, 90, area);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let mut help_text = Vec::new();

        help_text.extend(section("Navigation"));
        help_text.push(entry(&format!("{}/↓", keys.down), "Move down"));
        help_text.push(entry(&format!("{}/↑", keys.up), "Move up"));
        help_text.push(entry("Home/End", "Go to top/bottom"));
        help_text.push(entry("Tab", "Next view"));
        help_text.push(entry(&format!(
            "{} {} {} {}",
            keys.portfolios, keys.backtest, keys.bookmarks, keys.constraints
        ), "Portfolios / Backtest / Bookmarks / Constraints"));
        help_text.push(Line::from(""));

        help_text.extend(section("Portfolios & Backtest"));
        help_text.push(entry(&keys.select, "Open portfolio detail and backtest"));
        help_text.push(entry("d w m y", "Day / week / month / year series"));
        help_text.push(entry(&keys.measure, "Toggle profit / valuation"));
        help_text.push(Line::from(""));

        help_text.extend(section("Bookmarks"));
        help_text.push(entry(&keys.toggle_select, "Pick / unpick asset"));
        help_text.push(entry(&keys.add_selection, "Add picked assets to constraints"));
        help_text.push(entry(&keys.back, "Clear picked assets"));
        help_text.push(entry(&keys.sort, "Cycle sort (name / return / price)"));
        help_text.push(entry(&keys.select, "Load price history and ETF detail"));
        help_text.push(entry(&keys.remove, "Remove bookmark"));
        help_text.push(Line::from(""));

        help_text.extend(section("Constraints"));
        help_text.push(entry(&format!("{}/{}", keys.left, keys.right), "Select column"));
        help_text.push(entry(&keys.edit, "Edit cell (Enter saves, Esc cancels)"));
        help_text.push(entry(&keys.edit_cash, "Edit total cash"));
        help_text.push(entry(&keys.add_cash, "Add one cash unit"));
        help_text.push(entry(&keys.cash_unit, "Cycle cash unit"));
        help_text.push(entry(&keys.remove, "Remove asset"));
        help_text.push(entry(&keys.bookmark, "Bookmark asset"));
        help_text.push(entry(&keys.submit, "Create portfolio"));
        help_text.push(Line::from(""));

        help_text.extend(section("General"));
        help_text.push(entry(&keys.refresh, "Refresh data"));
        help_text.push(entry(&keys.help, "Toggle help"));
        help_text.push(entry(&keys.quit, "Quit"));

        let help = Paragraph::new(help_text)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        frame.render_widget(help, popup_area);
    }
}
