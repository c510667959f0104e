//! Constraint editor: per-asset bounds, total cash and the last creation result.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use super::common::{format_amount, truncate_string};
use crate::state::{
    AppState, ConstraintColumn, ConstraintState, EditTarget, HoldingChange, Performance,
    PortfolioAnalysis, Store,
};

/// Constraint table widget.
pub struct ConstraintTable;

impl ConstraintTable {
    /// Render the cash line, the constraint rows and the allocation result.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(2),
                Constraint::Length(10),
            ])
            .split(area);

        Self::render_cash(frame, rows[0], store);
        Self::render_table(frame, rows[1], store);
        Self::render_flags(frame, rows[2], &store.constraints);
        Self::render_analysis(frame, rows[3], store.portfolios.last_analysis.as_ref());
    }

    fn render_cash(frame: &mut Frame, area: Rect, store: &Store) {
        let editing = store.app.edit_target == Some(EditTarget::TotalCash);
        let amount = if editing {
            Span::styled(
                format!("{}_", store.app.input_buffer),
                Style::default().fg(Color::Black).bg(Color::Yellow),
            )
        } else {
            Span::styled(
                format_amount(store.assets.total_cash),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )
        };
        let line = Line::from(vec![
            Span::raw(" Total cash "),
            amount,
            Span::raw("   unit "),
            Span::styled(store.assets.cash_unit.label(), Style::default().fg(Color::Yellow)),
            Span::styled(
                format!(" ({})", format_amount(store.assets.cash_unit.amount())),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        let paragraph = Paragraph::new(line).block(
            Block::default()
                .title(" Cash ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_table(frame: &mut Frame, area: Rect, store: &Store) {
        if store.assets.assets.is_empty() {
            let hint = Paragraph::new(Span::styled(
                "Pick assets in Bookmarks and add them here",
                Style::default().fg(Color::DarkGray),
            ))
            .block(
                Block::default()
                    .title(" Constraints ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
            frame.render_widget(hint, area);
            return;
        }

        let constraints = &store.constraints;
        let header = Row::new(["Asset", "Price", "Lower %", "Upper %", "Exact %"].map(|h| {
            Cell::from(h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        }))
        .bottom_margin(1);

        let rows = store.assets.assets.iter().enumerate().map(|(row, asset)| {
            let price_style = if store.assets.is_price_over_total_cash(asset) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            let mut cells = vec![
                Cell::from(truncate_string(asset.label(), 20)),
                Cell::from(format_amount(asset.price)).style(price_style),
            ];
            for column in [ConstraintColumn::Lower, ConstraintColumn::Upper, ConstraintColumn::Exact] {
                cells.push(cell(&store.app, constraints, row, column));
            }
            Row::new(cells)
        });

        let over_cash = store
            .assets
            .assets
            .iter()
            .filter(|a| store.assets.is_price_over_total_cash(a))
            .count();
        let mut title = format!(" Constraints ({}) ", store.assets.assets.len());
        if over_cash > 0 {
            title.push_str(&format!("| {over_cash} priced above total cash "));
        }

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(30),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(10),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(constraints.selected_row);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_flags(frame: &mut Frame, area: Rect, constraints: &ConstraintState) {
        let lower = format!("Lower sum {}%", constraints.lower_sum().normalize());
        let upper = format!("Upper sum {}%", constraints.upper_sum().normalize());
        let flag = |text: String, raised: bool, warning: &str| {
            if raised {
                Span::styled(
                    format!("{text} {warning}"),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(text, Style::default().fg(Color::Gray))
            }
        };
        let line = Line::from(vec![
            Span::raw(" "),
            flag(lower, constraints.is_lower_bound_exceeded, "(over 100%)"),
            Span::raw("   "),
            flag(upper, constraints.is_upper_bound_under_limit, "(under 100%)"),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_analysis(frame: &mut Frame, area: Rect, analysis: Option<&PortfolioAnalysis>) {
        let title = match analysis {
            Some(a) if a.is_rebalance() => " Last created portfolio (rebalance) ",
            _ => " Last created portfolio ",
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let Some(analysis) = analysis else {
            frame.render_widget(block, area);
            return;
        };

        let mut lines = vec![Line::from(Span::styled(
            format!(
                " {}",
                performance_shift(analysis.previous_performance, analysis.performance)
            ),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))];

        if analysis.is_rebalance() {
            lines.extend(analysis.trades().into_iter().map(|c| {
                let color = match c.delta() {
                    d if d > 0 => Color::Green,
                    d if d < 0 => Color::Red,
                    _ => Color::Gray,
                };
                Line::from(vec![
                    Span::raw(format!(" {} ", truncate_string(&c.name, 24))),
                    Span::styled(format!("{} ", c.code), Style::default().fg(Color::DarkGray)),
                    Span::styled(share_shift(c), Style::default().fg(color)),
                ])
            }));
        } else {
            lines.extend(analysis.allocations.iter().map(|a| {
                let shares = a
                    .purchase_num
                    .map(|n| format!("  {n} shares"))
                    .unwrap_or_default();
                Line::from(vec![
                    Span::styled(format!("{:>6.2}% ", a.weight * 100.0), Style::default().fg(Color::Yellow)),
                    Span::raw(truncate_string(&a.name, 24)),
                    Span::styled(format!(" {}{shares}", a.code), Style::default().fg(Color::DarkGray)),
                ])
            }));
        }
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Return and volatility of the new portfolio, prefixed by the replaced one's when known.
fn performance_shift(before: Option<Performance>, after: Option<Performance>) -> String {
    let figure = |label: &str, pick: fn(&Performance) -> Option<f64>| {
        let now = percent(after.as_ref().and_then(pick));
        match before.as_ref() {
            Some(b) => format!("{label} {} → {now}", percent(pick(b))),
            None => format!("{label} {now}"),
        }
    };
    format!(
        "{}   {}",
        figure("return", |p| p.expected_return),
        figure("volatility", |p| p.volatility)
    )
}

fn percent(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}%", v * 100.0)).unwrap_or_else(|| "-".to_string())
}

/// Share count before and after, with the signed trade.
fn share_shift(change: &HoldingChange) -> String {
    format!(
        "{} → {} shares ({:+})",
        change.old_purchase_num,
        change.new_purchase_num,
        change.delta()
    )
}

fn cell<'a>(app: &AppState, constraints: &ConstraintState, row: usize, column: ConstraintColumn) -> Cell<'a> {
    let editing = app.edit_target == Some(EditTarget::Constraint { row, column });
    if editing {
        return Cell::from(format!("{}_", app.input_buffer))
            .style(Style::default().fg(Color::Black).bg(Color::Yellow));
    }

    let text = constraints.cell_text(row, column);
    let text = if text.is_empty() { "-".to_string() } else { text };
    let highlighted = constraints.selected_row == Some(row) && constraints.selected_column == column;
    let style = if highlighted {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    Cell::from(text).style(style)
}
