//! Layout management for the TUI.

use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// UI layout areas.
pub struct Layout {
    /// Status bar area (top).
    pub status_area: Rect,
    /// Tab bar area.
    pub tab_area: Rect,
    /// Main content area.
    pub main_area: Rect,
    /// Key hint line (bottom).
    pub hint_area: Rect,
    /// Notification area, overlaid on the bottom of the main area.
    pub notification_area: Rect,
}

impl Layout {
    /// Create a new layout from the terminal area.
    pub fn new(area: Rect) -> Self {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Status bar
                Constraint::Length(1), // Tab bar
                Constraint::Min(0),    // Main content
                Constraint::Length(1), // Key hints
            ])
            .split(area);

        let main_area = chunks[2];
        let width = (main_area.width / 2).max(30).min(main_area.width);
        let height = 3.min(main_area.height);
        let notification_area = Rect {
            x: main_area.x + main_area.width.saturating_sub(width + 1),
            y: main_area.y + main_area.height.saturating_sub(height + 1),
            width,
            height,
        };

        Self {
            status_area: chunks[0],
            tab_area: chunks[1],
            main_area,
            hint_area: chunks[3],
            notification_area,
        }
    }
}

/// Create a centered popup area.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = RatatuiLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    RatatuiLayout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_stays_inside_main_area() {
        for (w, h) in [(120, 40), (20, 5), (0, 0)] {
            let layout = Layout::new(Rect::new(0, 0, w, h));
            let n = layout.notification_area;
            let m = layout.main_area;
            assert!(n.x >= m.x && n.x + n.width <= m.x + m.width);
            assert!(n.y >= m.y && n.y + n.height <= m.y + m.height);
        }
    }
}
