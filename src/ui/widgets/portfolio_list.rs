//! Portfolio list and detail widget.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use super::common::{change_color, format_amount, format_percent, render_loading, truncate_string};
use crate::state::{Performance, PortfolioDetail, PortfolioState, Store};

/// Portfolio list widget.
pub struct PortfolioList;

impl PortfolioList {
    /// Render the portfolio list with the opened portfolio's detail beside it.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let state = &store.portfolios;
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area);

        Self::render_list(frame, columns[0], state);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(columns[1]);
        Self::render_summary(frame, right[0], state);
        Self::render_detail(frame, right[1], state.detail.as_ref());

        if state.loading {
            render_loading(frame, area);
        }
    }

    fn render_list(frame: &mut Frame, area: Rect, state: &PortfolioState) {
        let latest = state.latest_portfolio_id();
        let items: Vec<ListItem> = state
            .portfolios
            .iter()
            .map(|p| {
                let mut spans = vec![Span::raw(truncate_string(&p.name, 24))];
                if let Some(version) = p.version {
                    spans.push(Span::styled(format!("  v{version}"), Style::default().fg(Color::DarkGray)));
                }
                if let Some(created) = p.created_at {
                    spans.push(Span::styled(
                        format!("  {}", created.format("%Y-%m-%d")),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                if Some(p.id.as_str()) == latest {
                    spans.push(Span::styled("  latest", Style::default().fg(Color::Green)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let title = if !state.has_portfolio && !state.loading {
            " Portfolios (none yet) ".to_string()
        } else {
            format!(" Portfolios ({}) ", state.portfolios.len())
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(state.selected_index);
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_summary(frame: &mut Frame, area: Rect, state: &PortfolioState) {
        let mut lines = Vec::new();
        match &state.status {
            Some(status) => {
                let current = status
                    .cur_valuation
                    .and_then(Decimal::from_f64)
                    .map(format_amount)
                    .unwrap_or_else(|| "-".to_string());
                let mut spans = vec![Span::raw(format!("Valuation {current}"))];
                if let Some(daily) = status.daily_change_percent().and_then(Decimal::from_f64) {
                    spans.push(Span::raw("  Day "));
                    spans.push(Span::styled(format_percent(daily), Style::default().fg(change_color(daily))));
                }
                if let Some(total) = status.total_return_percent().and_then(Decimal::from_f64) {
                    spans.push(Span::raw("  Total "));
                    spans.push(Span::styled(format_percent(total), Style::default().fg(change_color(total))));
                }
                lines.push(Line::from(spans));
                if let Some(sharpe) = status.sharpe_ratio {
                    lines.push(Line::from(format!("Sharpe {sharpe:.2}")));
                }
            }
            None => lines.push(Line::from(Span::styled(
                "No valuation summary",
                Style::default().fg(Color::DarkGray),
            ))),
        }

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(" Summary ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_detail(frame: &mut Frame, area: Rect, detail: Option<&PortfolioDetail>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let Some(detail) = detail else {
            let hint = Paragraph::new(Span::styled(
                "Press Enter on a portfolio to load its holdings",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block.title(" Holdings "));
            frame.render_widget(hint, area);
            return;
        };

        let header = Row::new(["Asset", "Weight", "Valuation", "Day", "Bounds"].map(|h| {
            Cell::from(h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        }))
        .bottom_margin(1);

        let rows = detail.holdings_by_weight().into_iter().map(|h| {
            let change = h
                .asset
                .daily_price_change_rate
                .map(|r| Cell::from(format_percent(r)).style(Style::default().fg(change_color(r))))
                .unwrap_or_else(|| Cell::from("-"));
            let bounds = match (h.lower_bound, h.upper_bound) {
                (Some(lo), Some(hi)) => format!("{:.0}-{:.0}%", lo * 100.0, hi * 100.0),
                _ => "-".to_string(),
            };
            Row::new(vec![
                Cell::from(truncate_string(h.asset.label(), 20)),
                Cell::from(format!("{:.1}%", h.weight_percent())),
                Cell::from(h.valuation.map(format_amount).unwrap_or_else(|| "-".into())),
                change,
                Cell::from(bounds),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(35),
                Constraint::Length(8),
                Constraint::Length(14),
                Constraint::Length(9),
                Constraint::Length(10),
            ],
        )
        .header(header)
        .block(block.title(format!(
            " Holdings | Cash {} | {} ",
            format_amount(detail.total_cash),
            performance_label(detail.performance.as_ref())
        )));

        frame.render_widget(table, area);
    }
}

fn performance_label(performance: Option<&Performance>) -> String {
    let Some(p) = performance else {
        return "no performance data".to_string();
    };
    let pct = |v: Option<f64>| v.map(|v| format!("{:.2}%", v * 100.0)).unwrap_or_else(|| "-".into());
    format!(
        "Return {} Vol {} Sharpe {}",
        pct(p.expected_return),
        pct(p.volatility),
        p.sharpe_ratio.map(|s| format!("{s:.2}")).unwrap_or_else(|| "-".into())
    )
}
