//! Portfolio list and detail state.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Asset;

/// A portfolio as listed on `/portfolio/my`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub id: String,
    pub name: String,
    pub version: Option<u32>,
    pub created_at: Option<NaiveDateTime>,
}

/// Risk/return figures for a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Performance {
    pub expected_return: Option<f64>,
    pub volatility: Option<f64>,
    pub sharpe_ratio: Option<f64>,
}

/// One asset held by a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub asset: Asset,
    /// Weight as a fraction of the portfolio.
    pub weight: f64,
    pub valuation: Option<Decimal>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub exact_proportion: Option<f64>,
}

impl Holding {
    pub fn weight_percent(&self) -> f64 {
        self.weight * 100.0
    }
}

/// Detail of a single portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDetail {
    pub portfolio_id: String,
    pub total_cash: Decimal,
    pub performance: Option<Performance>,
    pub holdings: Vec<Holding>,
}

impl PortfolioDetail {
    /// Sum of holding valuations.
    pub fn total_valuation(&self) -> Decimal {
        self.holdings.iter().filter_map(|h| h.valuation).sum()
    }

    /// Holdings ordered by weight, heaviest first.
    pub fn holdings_by_weight(&self) -> Vec<&Holding> {
        let mut holdings: Vec<&Holding> = self.holdings.iter().collect();
        holdings.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        holdings
    }
}

/// Valuation summary of the user's current portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioStatus {
    pub cur_valuation: Option<f64>,
    pub last_valuation: Option<f64>,
    pub init_valuation: Option<f64>,
    pub sharpe_ratio: Option<f64>,
}

impl PortfolioStatus {
    /// Change since the previous valuation, in percent.
    pub fn daily_change_percent(&self) -> Option<f64> {
        let cur = self.cur_valuation?;
        let last = self.last_valuation?;
        (last != 0.0).then(|| (cur - last) / last * 100.0)
    }

    /// Return since inception, in percent.
    pub fn total_return_percent(&self) -> Option<f64> {
        let cur = self.cur_valuation?;
        let init = self.init_valuation?;
        (init != 0.0).then(|| (cur - init) / init * 100.0)
    }
}

/// A recommended allocation returned when a portfolio is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub asset_id: u32,
    pub name: String,
    pub code: String,
    pub weight: f64,
    pub purchase_num: Option<u32>,
}

/// Share count of one asset before and after a rebalance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingChange {
    pub asset_id: u32,
    pub name: String,
    pub code: String,
    pub old_purchase_num: u32,
    pub new_purchase_num: u32,
}

impl HoldingChange {
    /// Shares to buy (positive) or sell (negative).
    pub fn delta(&self) -> i64 {
        i64::from(self.new_purchase_num) - i64::from(self.old_purchase_num)
    }
}

/// Result of creating a portfolio from constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub total_cash: Option<f64>,
    pub performance: Option<Performance>,
    pub fictional_performance: Option<Performance>,
    pub allocations: Vec<Allocation>,
    /// Holdings of the portfolio this one replaces.
    pub previous_allocations: Vec<Allocation>,
    /// Per-asset share counts against the replaced portfolio.
    pub changes: Vec<HoldingChange>,
    /// Performance of the replaced portfolio, captured when the result arrives.
    pub previous_performance: Option<Performance>,
}

impl PortfolioAnalysis {
    /// Whether this creation replaced an existing portfolio.
    pub fn is_rebalance(&self) -> bool {
        !self.previous_allocations.is_empty() || !self.changes.is_empty()
    }

    /// Changes that actually move shares, largest trade first.
    pub fn trades(&self) -> Vec<&HoldingChange> {
        let mut trades: Vec<&HoldingChange> = self.changes.iter().filter(|c| c.delta() != 0).collect();
        trades.sort_by_key(|c| std::cmp::Reverse(c.delta().abs()));
        trades
    }
}

/// Portfolio state.
#[derive(Debug, Default, Clone)]
pub struct PortfolioState {
    /// The user's portfolios, latest first.
    pub portfolios: Vec<PortfolioSummary>,
    /// Whether the user owns any portfolio.
    pub has_portfolio: bool,
    /// Currently selected portfolio index.
    pub selected_index: Option<usize>,
    /// Detail of the selected portfolio.
    pub detail: Option<PortfolioDetail>,
    /// Valuation summary.
    pub status: Option<PortfolioStatus>,
    /// Result of the last portfolio creation.
    pub last_analysis: Option<PortfolioAnalysis>,
    /// Whether portfolio data is loading.
    pub loading: bool,
    /// Last update timestamp.
    pub last_updated: Option<DateTime<Utc>>,
}

impl PortfolioState {
    /// Get the currently selected portfolio.
    pub fn selected_portfolio(&self) -> Option<&PortfolioSummary> {
        self.selected_index.and_then(|i| self.portfolios.get(i))
    }

    /// The newest portfolio, which the backend lists first.
    pub fn latest_portfolio_id(&self) -> Option<&str> {
        self.portfolios.first().map(|p| p.id.as_str())
    }

    /// Replace the list and keep the selection in range.
    pub fn set_portfolios(&mut self, has_portfolio: bool, portfolios: Vec<PortfolioSummary>) {
        self.has_portfolio = has_portfolio || !portfolios.is_empty();
        self.portfolios = portfolios;
        self.selected_index = match self.selected_index {
            _ if self.portfolios.is_empty() => None,
            Some(i) => Some(i.min(self.portfolios.len() - 1)),
            None => Some(0),
        };
        self.loading = false;
        self.last_updated = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn summary(id: &str) -> PortfolioSummary {
        PortfolioSummary {
            id: id.to_string(),
            name: format!("Portfolio {id}"),
            version: Some(1),
            created_at: None,
        }
    }

    fn holding(id: u32, weight: f64, valuation: Decimal) -> Holding {
        Holding {
            asset: Asset::new(id, "A", "A", dec!(1)),
            weight,
            valuation: Some(valuation),
            lower_bound: None,
            upper_bound: None,
            exact_proportion: None,
        }
    }

    #[test]
    fn test_set_portfolios_selects_first() {
        let mut state = PortfolioState::default();
        state.set_portfolios(false, vec![summary("b"), summary("a")]);
        assert!(state.has_portfolio);
        assert_eq!(state.selected_index, Some(0));
        assert_eq!(state.latest_portfolio_id(), Some("b"));

        state.selected_index = Some(1);
        state.set_portfolios(true, vec![summary("c")]);
        assert_eq!(state.selected_index, Some(0));

        state.set_portfolios(false, vec![]);
        assert_eq!(state.selected_index, None);
        assert!(!state.has_portfolio);
    }

    #[test]
    fn test_detail_totals() {
        let detail = PortfolioDetail {
            portfolio_id: "p".into(),
            total_cash: dec!(1000),
            performance: None,
            holdings: vec![holding(1, 0.25, dec!(250)), holding(2, 0.75, dec!(740))],
        };
        assert_eq!(detail.total_valuation(), dec!(990));
        assert_eq!(detail.holdings_by_weight()[0].asset.asset_id.0, 2);
    }

    #[test]
    fn test_status_changes() {
        let status = PortfolioStatus {
            cur_valuation: Some(110.0),
            last_valuation: Some(100.0),
            init_valuation: Some(50.0),
            sharpe_ratio: None,
        };
        assert_eq!(status.daily_change_percent(), Some(10.0));
        assert_eq!(status.total_return_percent(), Some(120.0));
        assert_eq!(PortfolioStatus::default().daily_change_percent(), None);
    }

    fn change(asset_id: u32, old: u32, new: u32) -> HoldingChange {
        HoldingChange {
            asset_id,
            name: format!("Asset {asset_id}"),
            code: format!("A{asset_id}"),
            old_purchase_num: old,
            new_purchase_num: new,
        }
    }

    #[test]
    fn test_trades_skip_unchanged_and_order_by_size() {
        let analysis = PortfolioAnalysis {
            total_cash: None,
            performance: None,
            fictional_performance: None,
            allocations: Vec::new(),
            previous_allocations: Vec::new(),
            changes: vec![change(1, 5, 5), change(2, 10, 3), change(3, 0, 2)],
            previous_performance: None,
        };
        assert!(analysis.is_rebalance());

        let trades = analysis.trades();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].asset_id, 2);
        assert_eq!(trades[0].delta(), -7);
        assert_eq!(trades[1].delta(), 2);
    }
}
