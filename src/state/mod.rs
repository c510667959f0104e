//! State management for MutualRisk.
//!
//! This module provides centralized state management with a unidirectional
//! data flow pattern inspired by Redux/Elm architecture. Every mutation goes
//! through [`Store::reduce`], which is synchronous and has no side effects, so
//! the whole state machine is testable without a terminal or a network.

mod app_state;
mod asset_state;
mod backtest_state;
mod bookmark_state;
mod constraint_state;
mod portfolio_state;

pub use app_state::{AppState, EditTarget, InputMode, View};
pub use asset_state::{
    Asset, AssetHistory, AssetId, AssetState, CashUnit, EtfDetail, EtfHolding, PricePoint,
};
pub use backtest_state::{
    BacktestState, Measure, MergedPoint, SeriesPoint, TimeInterval, YEARLY_POINTS, merge_series,
    value_bounds,
};
pub use bookmark_state::{
    AssetDetail, BookmarkChange, BookmarkState, PendingBookmarkChange, SortOption,
};
pub use constraint_state::{
    ConstraintColumn, ConstraintState, DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND, parse_percent,
};
pub use portfolio_state::{
    Allocation, Holding, HoldingChange, Performance, PortfolioAnalysis, PortfolioDetail, PortfolioState,
    PortfolioStatus, PortfolioSummary,
};

use crate::error::Result;
use rust_decimal::Decimal;
use tokio::sync::mpsc;

/// Actions that can be dispatched to modify state.
#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    SetView(View),
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    ColumnLeft,
    ColumnRight,
    ToggleHelp,

    // Portfolio actions
    LoadPortfolios,
    PortfoliosLoaded {
        has_portfolio: bool,
        portfolios: Vec<PortfolioSummary>,
    },
    /// Load detail and backtest for the highlighted portfolio.
    OpenSelectedPortfolio,
    PortfolioDetailLoaded(PortfolioDetail),
    PortfolioStatusLoaded(PortfolioStatus),

    // Backtest actions
    LoadBacktest,
    SetTimeInterval(TimeInterval),
    ToggleMeasure,
    BacktestLoaded {
        portfolio_id: String,
        latest_portfolio_id: Option<String>,
        merged: Vec<MergedPoint>,
    },
    BacktestFailed(String),

    // Bookmark actions
    LoadBookmarks,
    BookmarksLoaded(Vec<Asset>),
    CycleBookmarkSort,
    AddBookmark(Asset),
    RemoveBookmark(AssetId),
    /// Undo an optimistic bookmark change the server rejected.
    RollbackBookmark(PendingBookmarkChange),
    LoadAssetDetail(AssetId),
    AssetHistoryLoaded(AssetHistory),
    EtfDetailLoaded(EtfDetail),

    // Asset selection actions
    ToggleTempAsset(Asset),
    ToggleSelectedBookmark,
    ResetTempAssets,
    AddAsset(Asset),
    AddAssetList(Vec<Asset>),
    /// Move the working selection into the constraint list.
    ConfirmTempAssets,
    RemoveAsset(AssetId),
    RemoveSelectedAsset,
    UpdateAssets(Vec<Asset>),
    AddTotalCash(Decimal),
    AddCashUnit,
    CycleCashUnit,
    UpdateTotalCash(Decimal),

    // Constraint actions
    SetLowerBound(usize, String),
    SetUpperBound(usize, String),
    SetExactProportion(usize, String),
    BeginEdit(EditTarget),
    BeginEditSelectedCell,
    InputChar(char),
    /// Pasted text, typed character by character.
    InputText(String),
    InputBackspace,
    InputCursorLeft,
    InputCursorRight,
    CommitEdit,
    CancelEdit,

    // Portfolio creation
    SubmitPortfolio,
    PortfolioCreated(PortfolioAnalysis),

    // UI actions
    ShowNotification(Notification),
    DismissNotification,

    // Data refresh
    RefreshAll,

    // Error handling
    SetError(String),
    ClearError,

    // Connection status
    SetConnected(bool),
    SetLoading(bool),

    // Quit
    Quit,
}

/// A notification to display to the user.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub duration_secs: u64,
}

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
            duration_secs: 3,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Success,
            duration_secs: 3,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Warning,
            duration_secs: 5,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
            duration_secs: 10,
        }
    }
}

/// The application state store.
#[derive(Debug)]
pub struct Store {
    /// Application state.
    pub app: AppState,
    /// Portfolio list and detail.
    pub portfolios: PortfolioState,
    /// Backtest comparison.
    pub backtest: BacktestState,
    /// Bookmarked assets.
    pub bookmarks: BookmarkState,
    /// Assets picked for a new portfolio.
    pub assets: AssetState,
    /// Constraints for the picked assets.
    pub constraints: ConstraintState,
    /// Action sender for dispatching actions.
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Store {
    /// Create a new store with the given action sender.
    pub fn new(action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            app: AppState::default(),
            portfolios: PortfolioState::default(),
            backtest: BacktestState::default(),
            bookmarks: BookmarkState::default(),
            assets: AssetState::default(),
            constraints: ConstraintState::default(),
            action_tx,
        }
    }

    /// Dispatch an action to the store.
    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.action_tx
            .send(action)
            .map_err(|e| crate::Error::channel(e.to_string()))
    }

    /// Apply an action to update state.
    ///
    /// Actions that need the network (`OpenSelectedPortfolio`, `RemoveBookmark`,
    /// `SubmitPortfolio`, ...) only record their loading state here; the app
    /// performs the request and feeds the result back as another action.
    pub fn reduce(&mut self, action: Action) {
        match action {
            // Navigation
            Action::SetView(view) => self.app.current_view = view,
            Action::ScrollUp => self.scroll(-1),
            Action::ScrollDown => self.scroll(1),
            Action::PageUp => self.scroll(-10),
            Action::PageDown => self.scroll(10),
            Action::GoToTop => self.scroll(i32::MIN / 2),
            Action::GoToBottom => self.scroll(i32::MAX / 2),
            Action::ColumnLeft => {
                self.constraints.selected_column = self.constraints.selected_column.prev();
            }
            Action::ColumnRight => {
                self.constraints.selected_column = self.constraints.selected_column.next();
            }
            Action::ToggleHelp => self.app.show_help = !self.app.show_help,

            // Portfolio actions
            Action::LoadPortfolios => self.portfolios.loading = true,
            Action::PortfoliosLoaded {
                has_portfolio,
                portfolios,
            } => {
                self.portfolios.set_portfolios(has_portfolio, portfolios);
            }
            Action::OpenSelectedPortfolio => {
                self.portfolios.loading = true;
                if let Some(portfolio) = self.portfolios.selected_portfolio() {
                    self.backtest.portfolio_id = Some(portfolio.id.clone());
                }
            }
            Action::PortfolioDetailLoaded(detail) => {
                self.portfolios.detail = Some(detail);
                self.portfolios.loading = false;
            }
            Action::PortfolioStatusLoaded(status) => {
                self.portfolios.status = Some(status);
            }

            // Backtest actions
            Action::LoadBacktest => {
                self.backtest.loading = true;
                self.backtest.error = None;
            }
            Action::SetTimeInterval(interval) => self.backtest.interval = interval,
            Action::ToggleMeasure => self.backtest.measure = self.backtest.measure.toggle(),
            Action::BacktestLoaded {
                portfolio_id,
                latest_portfolio_id,
                merged,
            } => {
                self.backtest.portfolio_id = Some(portfolio_id);
                self.backtest.latest_portfolio_id = latest_portfolio_id;
                self.backtest.merged = merged;
                self.backtest.loading = false;
                self.backtest.last_updated = Some(chrono::Utc::now());
            }
            Action::BacktestFailed(error) => {
                self.backtest.error = Some(error);
                self.backtest.merged.clear();
                self.backtest.loading = false;
            }

            // Bookmark actions
            Action::LoadBookmarks => self.bookmarks.loading = true,
            Action::BookmarksLoaded(assets) => {
                self.bookmarks.set_assets(assets);
                self.bookmarks.loading = false;
                self.bookmarks.last_updated = Some(chrono::Utc::now());
            }
            Action::CycleBookmarkSort => {
                let next = self.bookmarks.sort.next();
                self.bookmarks.sort_by(next);
            }
            Action::AddBookmark(asset) => {
                self.bookmarks.begin_add(asset);
            }
            Action::RemoveBookmark(asset_id) => {
                self.bookmarks.begin_remove(asset_id);
            }
            Action::RollbackBookmark(pending) => self.bookmarks.rollback(pending),
            Action::LoadAssetDetail(_) => {
                self.bookmarks.detail = AssetDetail::default();
            }
            Action::AssetHistoryLoaded(history) => {
                self.bookmarks.detail.history = Some(history);
            }
            Action::EtfDetailLoaded(etf) => {
                self.bookmarks.detail.etf = Some(etf);
            }

            // Asset selection actions
            Action::ToggleTempAsset(asset) => self.assets.toggle_temp_asset(asset),
            Action::ToggleSelectedBookmark => {
                if let Some(asset) = self.bookmarks.selected_asset().cloned() {
                    self.assets.toggle_temp_asset(asset);
                }
            }
            Action::ResetTempAssets => self.assets.reset_temp_assets(),
            Action::AddAsset(asset) => {
                self.assets.add_asset(asset);
                self.sync_constraint_rows();
            }
            Action::AddAssetList(list) => {
                self.assets.add_asset_list(list);
                self.sync_constraint_rows();
            }
            Action::ConfirmTempAssets => {
                let picked: Vec<Asset> = self.assets.temp_assets.values().cloned().collect();
                self.assets.add_asset_list(picked);
                self.assets.reset_temp_assets();
                self.sync_constraint_rows();
            }
            Action::RemoveAsset(asset_id) => {
                if let Some(position) = self.assets.remove_asset(asset_id) {
                    self.constraints.remove_row(position);
                }
            }
            Action::RemoveSelectedAsset => {
                let selected = self
                    .constraints
                    .selected_row
                    .and_then(|row| self.assets.assets.get(row))
                    .map(|a| a.asset_id);
                if let Some(asset_id) = selected {
                    self.reduce(Action::RemoveAsset(asset_id));
                }
            }
            Action::UpdateAssets(assets) => {
                self.assets.update_assets(assets);
                self.sync_constraint_rows();
            }
            Action::AddTotalCash(amount) => self.assets.add_total_cash(amount),
            Action::AddCashUnit => {
                let amount = self.assets.cash_unit.amount();
                self.assets.add_total_cash(amount);
            }
            Action::CycleCashUnit => self.assets.cash_unit = self.assets.cash_unit.next(),
            Action::UpdateTotalCash(amount) => self.assets.update_total_cash(amount),

            // Constraint actions
            Action::SetLowerBound(index, value) => self.constraints.set_lower_bound(index, &value),
            Action::SetUpperBound(index, value) => self.constraints.set_upper_bound(index, &value),
            Action::SetExactProportion(index, value) => {
                self.constraints.set_exact_proportion(index, &value)
            }
            Action::BeginEdit(target) => {
                let initial = match target {
                    EditTarget::Constraint { row, column } => self.constraints.cell_text(row, column),
                    EditTarget::TotalCash => self.assets.total_cash.to_string(),
                };
                self.app.begin_edit(target, initial);
            }
            Action::BeginEditSelectedCell => {
                if let Some(row) = self.constraints.selected_row {
                    let column = self.constraints.selected_column;
                    self.reduce(Action::BeginEdit(EditTarget::Constraint { row, column }));
                }
            }
            Action::InputChar(c) => self.app.push_char(c),
            Action::InputText(text) => {
                for c in text.chars().filter(|c| !c.is_control()) {
                    self.app.push_char(c);
                }
            }
            Action::InputBackspace => self.app.pop_char(),
            Action::InputCursorLeft => self.app.cursor_left(),
            Action::InputCursorRight => self.app.cursor_right(),
            Action::CommitEdit => self.commit_edit(),
            Action::CancelEdit => {
                self.app.finish_edit();
            }

            // Portfolio creation
            Action::SubmitPortfolio => self.app.loading = true,
            Action::PortfolioCreated(mut analysis) => {
                if analysis.is_rebalance() && analysis.previous_performance.is_none() {
                    analysis.previous_performance =
                        self.portfolios.detail.as_ref().and_then(|d| d.performance);
                }
                self.portfolios.last_analysis = Some(analysis);
                self.app.loading = false;
            }

            // UI actions
            Action::ShowNotification(notification) => {
                self.app.notification = Some(notification);
                self.app.notification_shown_at = Some(chrono::Utc::now());
            }
            Action::DismissNotification => {
                self.app.notification = None;
                self.app.notification_shown_at = None;
            }

            // Data refresh
            Action::RefreshAll => self.app.loading = true,

            // Error handling
            Action::SetError(error) => {
                self.app.error = Some(error);
                self.app.loading = false;
                self.portfolios.loading = false;
                self.bookmarks.loading = false;
                self.backtest.loading = false;
            }
            Action::ClearError => {
                self.app.error = None;
            }

            // Connection status
            Action::SetConnected(connected) => {
                self.app.connected = connected;
            }
            Action::SetLoading(loading) => {
                self.app.loading = loading;
            }

            // Quit
            Action::Quit => {
                self.app.should_quit = true;
            }
        }
    }

    /// Name for the next portfolio created from the constraint table.
    pub fn next_portfolio_name(&self) -> String {
        format!("Portfolio {}", self.portfolios.portfolios.len() + 1)
    }

    fn sync_constraint_rows(&mut self) {
        self.constraints.resize(self.assets.assets.len());
    }

    fn commit_edit(&mut self) {
        let Some((target, text)) = self.app.finish_edit() else {
            return;
        };
        match target {
            EditTarget::Constraint { row, column } => match column {
                ConstraintColumn::Lower => self.constraints.set_lower_bound(row, &text),
                ConstraintColumn::Upper => self.constraints.set_upper_bound(row, &text),
                ConstraintColumn::Exact => self.constraints.set_exact_proportion(row, &text),
            },
            EditTarget::TotalCash => {
                let cleaned: String = text.chars().filter(|c| *c != ',').collect();
                match cleaned.trim().parse::<Decimal>() {
                    Ok(amount) => self.assets.update_total_cash(amount),
                    Err(_) => {
                        self.app.notification = Some(Notification::warning(format!(
                            "'{}' is not a valid amount",
                            text
                        )));
                        self.app.notification_shown_at = Some(chrono::Utc::now());
                    }
                }
            }
        }
    }

    fn scroll(&mut self, delta: i32) {
        fn step(current: Option<usize>, delta: i32, len: usize) -> Option<usize> {
            if len == 0 {
                return None;
            }
            let current = current.unwrap_or(0) as i64;
            let next = (current + delta as i64).clamp(0, len as i64 - 1);
            Some(next as usize)
        }

        match self.app.current_view {
            View::Portfolios => {
                self.portfolios.selected_index =
                    step(self.portfolios.selected_index, delta, self.portfolios.portfolios.len());
            }
            View::Bookmarks => {
                self.bookmarks.selected_index =
                    step(self.bookmarks.selected_index, delta, self.bookmarks.assets.len());
            }
            View::Constraints => {
                self.constraints.selected_row =
                    step(self.constraints.selected_row, delta, self.constraints.len());
            }
            View::Backtest => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn store() -> Store {
        let (tx, _rx) = mpsc::unbounded_channel();
        Store::new(tx)
    }

    fn asset(id: u32, price: Decimal) -> Asset {
        Asset::new(id, format!("Asset {id}"), format!("A{id}"), price)
    }

    #[test]
    fn test_confirm_temp_assets_creates_constraint_rows() {
        let mut store = store();
        store.reduce(Action::ToggleTempAsset(asset(1, dec!(10))));
        store.reduce(Action::ToggleTempAsset(asset(2, dec!(20))));
        store.reduce(Action::ConfirmTempAssets);

        assert!(store.assets.temp_assets.is_empty());
        assert_eq!(store.assets.asset_ids(), vec![AssetId(1), AssetId(2)]);
        assert_eq!(store.constraints.len(), 2);

        // Confirming again with an overlapping selection adds nothing twice.
        store.reduce(Action::ToggleTempAsset(asset(2, dec!(20))));
        store.reduce(Action::ToggleTempAsset(asset(3, dec!(30))));
        store.reduce(Action::ConfirmTempAssets);
        assert_eq!(store.assets.asset_ids(), vec![AssetId(1), AssetId(2), AssetId(3)]);
        assert_eq!(store.constraints.len(), 3);
    }

    #[test]
    fn test_remove_asset_drops_its_constraint_row() {
        let mut store = store();
        store.reduce(Action::AddAssetList(vec![asset(1, dec!(1)), asset(2, dec!(1)), asset(3, dec!(1))]));
        store.reduce(Action::SetLowerBound(0, "10".into()));
        store.reduce(Action::SetLowerBound(1, "20".into()));
        store.reduce(Action::SetLowerBound(2, "30".into()));

        store.reduce(Action::RemoveAsset(AssetId(2)));
        assert_eq!(store.constraints.lower_bounds, vec![dec!(10), dec!(30)]);

        store.reduce(Action::RemoveAsset(AssetId(42)));
        assert_eq!(store.constraints.len(), 2);
    }

    #[test]
    fn test_edit_constraint_cell() {
        let mut store = store();
        store.reduce(Action::AddAssetList(vec![asset(1, dec!(1)), asset(2, dec!(1))]));
        store.reduce(Action::ScrollDown);
        store.app.current_view = View::Constraints;
        store.reduce(Action::ScrollDown);
        store.reduce(Action::ColumnRight);

        store.reduce(Action::BeginEditSelectedCell);
        assert_eq!(store.app.input_buffer, "100");
        store.reduce(Action::InputBackspace);
        store.reduce(Action::InputBackspace);
        store.reduce(Action::InputBackspace);
        store.reduce(Action::InputChar('4'));
        store.reduce(Action::InputChar('0'));
        store.reduce(Action::CommitEdit);

        assert_eq!(store.constraints.upper_bounds, vec![dec!(100), dec!(40)]);
        assert!(!store.app.is_editing());
    }

    #[test]
    fn test_cancel_edit_discards_input() {
        let mut store = store();
        store.reduce(Action::AddAsset(asset(1, dec!(1))));
        store.reduce(Action::BeginEdit(EditTarget::Constraint {
            row: 0,
            column: ConstraintColumn::Lower,
        }));
        store.reduce(Action::InputChar('9'));
        store.reduce(Action::CancelEdit);
        assert_eq!(store.constraints.lower_bounds, vec![dec!(0)]);
    }

    #[test]
    fn test_edit_total_cash() {
        let mut store = store();
        store.reduce(Action::BeginEdit(EditTarget::TotalCash));
        store.reduce(Action::InputBackspace);
        for c in "1,500,000".chars() {
            store.reduce(Action::InputChar(c));
        }
        store.reduce(Action::CommitEdit);
        assert_eq!(store.assets.total_cash, dec!(1500000));

        store.reduce(Action::BeginEdit(EditTarget::TotalCash));
        store.reduce(Action::InputChar('x'));
        store.reduce(Action::CommitEdit);
        assert_eq!(store.assets.total_cash, dec!(1500000));
        assert!(store.app.notification.is_some());
    }

    #[test]
    fn test_cash_units() {
        let mut store = store();
        store.reduce(Action::AddCashUnit);
        store.reduce(Action::CycleCashUnit);
        store.reduce(Action::AddCashUnit);
        assert_eq!(store.assets.total_cash, dec!(110000));
    }

    #[test]
    fn test_bookmark_remove_then_rollback() {
        let mut store = store();
        store.reduce(Action::BookmarksLoaded(vec![asset(1, dec!(5)), asset(2, dec!(6))]));
        let pending = store.bookmarks.begin_remove(AssetId(1));
        assert_eq!(store.bookmarks.assets.len(), 1);

        store.reduce(Action::RollbackBookmark(pending));
        assert_eq!(store.bookmarks.assets.len(), 2);
    }

    #[test]
    fn test_toggle_selected_bookmark() {
        let mut store = store();
        store.reduce(Action::BookmarksLoaded(vec![asset(1, dec!(5))]));
        store.reduce(Action::ToggleSelectedBookmark);
        assert!(store.assets.is_temp_selected(AssetId(1)));
        store.reduce(Action::ToggleSelectedBookmark);
        assert!(!store.assets.is_temp_selected(AssetId(1)));
    }

    #[test]
    fn test_open_selected_portfolio_targets_backtest() {
        let mut store = store();
        store.reduce(Action::PortfoliosLoaded {
            has_portfolio: true,
            portfolios: vec![PortfolioSummary {
                id: "p-1".into(),
                name: "First".into(),
                version: Some(1),
                created_at: None,
            }],
        });
        store.reduce(Action::OpenSelectedPortfolio);
        assert_eq!(store.backtest.portfolio_id.as_deref(), Some("p-1"));
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut store = store();
        store.app.current_view = View::Bookmarks;
        store.reduce(Action::BookmarksLoaded(vec![asset(1, dec!(5)), asset(2, dec!(6))]));
        store.reduce(Action::GoToBottom);
        assert_eq!(store.bookmarks.selected_index, Some(1));
        store.reduce(Action::PageDown);
        assert_eq!(store.bookmarks.selected_index, Some(1));
        store.reduce(Action::GoToTop);
        assert_eq!(store.bookmarks.selected_index, Some(0));
    }

    #[test]
    fn test_dispatch_sends_action() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let store = Store::new(tx);
        store.dispatch(Action::Quit).unwrap();
        assert!(matches!(rx.try_recv(), Ok(Action::Quit)));
    }

    #[test]
    fn test_set_error_stops_loading() {
        let mut store = store();
        store.reduce(Action::LoadBookmarks);
        store.reduce(Action::LoadBacktest);
        store.reduce(Action::SetError("boom".into()));
        assert!(!store.bookmarks.loading);
        assert!(!store.backtest.loading);
        assert_eq!(store.app.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_rebalance_captures_previous_performance() {
        let mut store = store();
        let previous = Performance {
            expected_return: Some(0.05),
            volatility: Some(0.1),
            sharpe_ratio: None,
        };
        store.reduce(Action::PortfolioDetailLoaded(PortfolioDetail {
            portfolio_id: "p-1".into(),
            total_cash: dec!(1000000),
            performance: Some(previous),
            holdings: Vec::new(),
        }));
        store.reduce(Action::SubmitPortfolio);
        store.reduce(Action::PortfolioCreated(PortfolioAnalysis {
            total_cash: Some(1_000_000.0),
            performance: None,
            fictional_performance: None,
            allocations: Vec::new(),
            previous_allocations: Vec::new(),
            changes: vec![HoldingChange {
                asset_id: 1,
                name: "Samsung".into(),
                code: "005930".into(),
                old_purchase_num: 2,
                new_purchase_num: 6,
            }],
            previous_performance: None,
        }));

        let analysis = store.portfolios.last_analysis.as_ref().unwrap();
        assert_eq!(analysis.previous_performance, Some(previous));
        assert!(!store.app.loading);
    }

    #[test]
    fn test_pasted_text_is_typed_whole() {
        let mut store = store();
        store.reduce(Action::BeginEdit(EditTarget::TotalCash));
        store.reduce(Action::InputBackspace);
        store.reduce(Action::InputText("2,500,000\n".into()));
        assert_eq!(store.app.input_buffer, "2,500,000");

        store.reduce(Action::CommitEdit);
        assert_eq!(store.assets.total_cash, dec!(2500000));
    }
}
