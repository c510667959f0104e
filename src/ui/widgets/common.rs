//! Formatting helpers shared by the widgets.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use rust_decimal::Decimal;

/// Format an amount with thousands separators and no fractional part.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round();
    let digits = rounded.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.insert(0, '-');
    }
    out
}

/// Signed percentage, e.g. `+1.25%`.
pub fn format_percent(value: Decimal) -> String {
    let sign = if value > Decimal::ZERO { "+" } else { "" };
    format!("{sign}{:.2}%", value)
}

/// Color for a signed change.
pub fn change_color(value: Decimal) -> Color {
    if value > Decimal::ZERO {
        Color::Green
    } else if value < Decimal::ZERO {
        Color::Red
    } else {
        Color::Gray
    }
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

pub fn render_loading(frame: &mut Frame, area: Rect) {
    let loading = Line::from(vec![Span::styled(
        "Loading...",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::ITALIC),
    )]);

    if area.width < 17 || area.height < 3 {
        return;
    }

    let loading_area = Rect {
        x: area.x + area.width - 16,
        y: area.y + area.height - 2,
        width: 15,
        height: 1,
    };

    frame.render_widget(Paragraph::new(loading), loading_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(0)), "0");
        assert_eq!(format_amount(dec!(999)), "999");
        assert_eq!(format_amount(dec!(1500000)), "1,500,000");
        assert_eq!(format_amount(dec!(-12345.6)), "-12,346");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(1.234)), "+1.23%");
        assert_eq!(format_percent(dec!(-0.5)), "-0.50%");
    }

    #[test]
    fn test_truncate_is_char_aware() {
        assert_eq!(truncate_string("삼성전자우선주", 5), "삼성...");
        assert_eq!(truncate_string("Apple", 10), "Apple");
    }
}
