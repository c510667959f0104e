//! Backtest line chart.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

use super::common::render_loading;
use crate::state::{BacktestState, Store, TimeInterval};

/// Backtest chart widget.
pub struct BacktestChart;

impl BacktestChart {
    /// Render the interval selector and the chart.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let backtest = &store.backtest;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        Self::render_controls(frame, chunks[0], backtest);
        Self::render_chart(frame, chunks[1], store);

        if backtest.loading {
            render_loading(frame, chunks[1]);
        }
    }

    fn render_controls(frame: &mut Frame, area: Rect, backtest: &BacktestState) {
        let mut spans = vec![Span::raw(" ")];
        for interval in TimeInterval::ALL {
            let style = if interval == backtest.interval {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::White)
            };
            let key = interval.label().chars().next().unwrap_or(' ').to_ascii_lowercase();
            spans.push(Span::styled(format!("[{key}] "), Style::default().fg(Color::DarkGray)));
            spans.push(Span::styled(interval.label(), style));
            spans.push(Span::raw("  "));
        }
        spans.push(Span::raw("| "));
        spans.push(Span::styled(
            backtest.measure.label(),
            Style::default().fg(Color::Yellow),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_chart(frame: &mut Frame, area: Rect, store: &Store) {
        let backtest = &store.backtest;
        let selected_name = backtest
            .portfolio_id
            .as_deref()
            .and_then(|id| store.portfolios.portfolios.iter().find(|p| p.id == id))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Selected".to_string());

        let block = Block::default()
            .title(format!(" Backtest: {selected_name} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if let Some(error) = &backtest.error {
            let paragraph = Paragraph::new(Span::styled(error.as_str(), Style::default().fg(Color::Red)))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let Some((min, max)) = backtest.bounds() else {
            let message = if backtest.portfolio_id.is_none() {
                "Open a portfolio to see its backtest"
            } else {
                "No backtest data"
            };
            let paragraph =
                Paragraph::new(Span::styled(message, Style::default().fg(Color::DarkGray))).block(block);
            frame.render_widget(paragraph, area);
            return;
        };

        let selected: Vec<(f64, f64)> = backtest
            .merged
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.selected_valuation))
            .collect();
        let latest: Vec<(f64, f64)> = backtest
            .merged
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.latest_valuation.map(|v| (i as f64, v)))
            .collect();

        let mut datasets = vec![
            Dataset::default()
                .name(selected_name)
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Cyan))
                .data(&selected),
        ];
        if backtest.compares_latest() {
            datasets.push(
                Dataset::default()
                    .name("Latest portfolio")
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(Color::Magenta))
                    .data(&latest),
            );
        }

        let last_index = backtest.merged.len().saturating_sub(1);
        let date_label = |i: usize| {
            backtest
                .merged
                .get(i)
                .map(|p| p.date.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        let x_labels = vec![
            Span::raw(date_label(0)),
            Span::raw(date_label(last_index / 2)),
            Span::raw(date_label(last_index)),
        ];
        let y_labels = vec![
            Span::raw(format!("{min:.1}")),
            Span::raw(format!("{:.1}", (min + max) / 2.0)),
            Span::raw(format!("{max:.1}")),
        ];

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, last_index.max(1) as f64])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(backtest.measure.label())
                    .style(Style::default().fg(Color::Gray))
                    .bounds([min, max])
                    .labels(y_labels),
            );

        frame.render_widget(chart, area);
    }
}
