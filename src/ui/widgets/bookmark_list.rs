//! Bookmark list widget with price history and ETF detail.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Sparkline, Table, TableState},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::common::{change_color, format_amount, format_percent, render_loading, truncate_string};
use crate::state::{AssetDetail, AssetHistory, Store};

/// Bookmark list widget.
pub struct BookmarkList;

impl BookmarkList {
    /// Render the bookmark table and the detail pane.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        Self::render_table(frame, columns[0], store);
        Self::render_detail(frame, columns[1], &store.bookmarks.detail);

        if store.bookmarks.loading {
            render_loading(frame, columns[0]);
        }
    }

    fn render_table(frame: &mut Frame, area: Rect, store: &Store) {
        let bookmarks = &store.bookmarks;

        let header_cells = ["", "Name", "Code", "Price", "Return"].iter().map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });
        let header = Row::new(header_cells).height(1).bottom_margin(1);

        let rows = bookmarks.assets.iter().map(|asset| {
            let picked = store.assets.is_temp_selected(asset.asset_id);
            let added = store.assets.contains(asset.asset_id);
            let mark = match (picked, added) {
                (true, _) => Cell::from("[x]").style(Style::default().fg(Color::Green)),
                (false, true) => Cell::from("[+]").style(Style::default().fg(Color::DarkGray)),
                (false, false) => Cell::from("[ ]"),
            };
            let change = asset
                .daily_price_change_rate
                .map(|r| Cell::from(format_percent(r)).style(Style::default().fg(change_color(r))))
                .unwrap_or_else(|| Cell::from("-"));

            Row::new(vec![
                mark,
                Cell::from(truncate_string(&asset.name, 24)),
                Cell::from(asset.code.clone()),
                Cell::from(format_amount(asset.price)),
                change,
            ])
            .height(1)
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Percentage(40),
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Length(9),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .title(format!(
                    " Bookmarks ({}) | Sort: {} | Picked: {} ",
                    bookmarks.assets.len(),
                    bookmarks.sort.label(),
                    store.assets.temp_assets.len()
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(bookmarks.selected_index);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_detail(frame: &mut Frame, area: Rect, detail: &AssetDetail) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(area);

        let history_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        match &detail.history {
            Some(history) if !history.records.is_empty() => {
                let data = sparkline_values(history);
                let change = history
                    .change_percent()
                    .map(format_percent)
                    .unwrap_or_else(|| "-".into());
                let sparkline = Sparkline::default()
                    .block(history_block.title(format!(
                        " History ({} days) {} ",
                        history.records.len(),
                        change
                    )))
                    .data(&data)
                    .style(Style::default().fg(Color::Cyan));
                frame.render_widget(sparkline, rows[0]);
            }
            _ => {
                let hint = Paragraph::new(Span::styled(
                    "Enter loads price history",
                    Style::default().fg(Color::DarkGray),
                ))
                .block(history_block.title(" History "));
                frame.render_widget(hint, rows[0]);
            }
        }

        let etf_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        match &detail.etf {
            Some(etf) => {
                let title = format!(
                    " ETF {} ",
                    etf.name.as_deref().or(etf.code.as_deref()).unwrap_or_default()
                );
                let items: Vec<ListItem> = if etf.holdings.is_empty() {
                    vec![ListItem::new(Span::styled(
                        "No constituents reported",
                        Style::default().fg(Color::DarkGray),
                    ))]
                } else {
                    etf.holdings
                        .iter()
                        .map(|h| {
                            let weight = h
                                .weight
                                .map(|w| format!("{w:>6.2}%"))
                                .unwrap_or_else(|| "     -".into());
                            ListItem::new(Line::from(vec![
                                Span::styled(weight, Style::default().fg(Color::Yellow)),
                                Span::raw("  "),
                                Span::raw(truncate_string(&h.name, 28)),
                            ]))
                        })
                        .collect()
                };
                frame.render_widget(List::new(items).block(etf_block.title(title)), rows[1]);
            }
            None => {
                frame.render_widget(etf_block.title(" ETF "), rows[1]);
            }
        }
    }
}

/// Bar heights in hundredths above the window's lowest close, so fractional
/// moves stay visible.
fn sparkline_values(history: &AssetHistory) -> Vec<u64> {
    let floor = history
        .records
        .iter()
        .map(|r| r.price)
        .min()
        .unwrap_or(Decimal::ZERO);
    history
        .records
        .iter()
        .map(|r| ((r.price - floor) * Decimal::ONE_HUNDRED).round().to_u64().unwrap_or(0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AssetId, PricePoint};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn history(prices: &[Decimal]) -> AssetHistory {
        AssetHistory {
            asset_id: AssetId(1),
            records: prices
                .iter()
                .enumerate()
                .map(|(i, price)| PricePoint {
                    date: NaiveDate::from_ymd_opt(2024, 3, 1 + i as u32).unwrap(),
                    price: *price,
                })
                .collect(),
        }
    }

    #[test]
    fn test_sparkline_keeps_fractional_moves() {
        let values = sparkline_values(&history(&[dec!(0.52), dec!(0.87), dec!(0.61)]));
        assert_eq!(values, vec![0, 35, 9]);
    }

    #[test]
    fn test_sparkline_offsets_from_lowest_close() {
        let values = sparkline_values(&history(&[dec!(230.10), dec!(231.00), dec!(230.55)]));
        assert_eq!(values, vec![0, 90, 45]);
        assert!(sparkline_values(&history(&[])).is_empty());
    }
}
