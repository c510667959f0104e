//! UI rendering using ratatui.
//!
//! Rendering is a pure function of the [`Store`]; nothing here mutates state.

mod layout;
mod widgets;

pub use layout::Layout;
pub use widgets::{
    BacktestChart, BookmarkList, ConstraintTable, HelpPanel, PortfolioList, StatusBar, TabBar,
};

use crate::config::KeyBindings;
use crate::state::{Store, View};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Main UI renderer.
pub struct Ui;

impl Ui {
    /// Render the entire UI.
    pub fn render(frame: &mut Frame, store: &Store, keys: &KeyBindings) {
        let layout = Layout::new(frame.area());

        StatusBar::render(frame, layout.status_area, store);
        TabBar::render(frame, layout.tab_area, store, keys);

        match store.app.current_view {
            View::Portfolios => PortfolioList::render(frame, layout.main_area, store),
            View::Backtest => BacktestChart::render(frame, layout.main_area, store),
            View::Bookmarks => BookmarkList::render(frame, layout.main_area, store),
            View::Constraints => ConstraintTable::render(frame, layout.main_area, store),
        }

        render_hints(frame, layout.hint_area, store, keys);

        if store.app.show_help {
            HelpPanel::render(frame, frame.area(), keys);
        }

        if let Some(notification) = &store.app.notification {
            widgets::render_notification(frame, layout.notification_area, notification);
        }

        // Errors take the notification slot until dismissed.
        if let Some(error) = &store.app.error {
            widgets::render_error(frame, layout.notification_area, error);
        }
    }
}

/// Key hints for the current view and mode.
pub fn hints(store: &Store, keys: &KeyBindings) -> Vec<(String, &'static str)> {
    if store.app.is_editing() {
        return vec![
            ("Enter".into(), "save"),
            ("Esc".into(), "cancel"),
        ];
    }

    let mut hints = match store.app.current_view {
        View::Portfolios => vec![(keys.select.clone(), "open")],
        View::Backtest => vec![
            ("d/w/m/y".into(), "interval"),
            (keys.measure.clone(), "measure"),
        ],
        View::Bookmarks => vec![
            (keys.toggle_select.clone(), "pick"),
            (keys.add_selection.clone(), "add picked"),
            (keys.sort.clone(), "sort"),
            (keys.select.clone(), "detail"),
            (keys.remove.clone(), "unbookmark"),
        ],
        View::Constraints => vec![
            (keys.edit.clone(), "edit"),
            (keys.edit_cash.clone(), "cash"),
            (keys.add_cash.clone(), "add unit"),
            (keys.cash_unit.clone(), "unit"),
            (keys.remove.clone(), "remove"),
            (keys.bookmark.clone(), "bookmark"),
            (keys.submit.clone(), "create"),
        ],
    };
    hints.push((keys.help.clone(), "help"));
    hints.push((keys.quit.clone(), "quit"));
    hints
}

fn render_hints(frame: &mut Frame, area: Rect, store: &Store, keys: &KeyBindings) {
    let mut spans = vec![Span::raw(" ")];
    for (key, description) in hints(store, keys) {
        spans.push(Span::styled(key, Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!(" {description}  "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
