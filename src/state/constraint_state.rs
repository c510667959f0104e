//! Per-asset weight constraints for portfolio construction.
//!
//! Bounds are percentages held in parallel vectors indexed by the asset's
//! position in [`AssetState::assets`](super::AssetState). Input is parsed but
//! never range-checked; the two sum flags only drive warnings in the view.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::Asset;
use crate::api::PortfolioInitRequest;

/// Lower bound applied to a newly added row.
pub const DEFAULT_LOWER_BOUND: Decimal = Decimal::ZERO;
/// Upper bound applied to a newly added row.
pub const DEFAULT_UPPER_BOUND: Decimal = Decimal::ONE_HUNDRED;

/// Editable column of the constraint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstraintColumn {
    #[default]
    Lower,
    Upper,
    Exact,
}

impl ConstraintColumn {
    pub fn next(&self) -> Self {
        match self {
            Self::Lower => Self::Upper,
            Self::Upper => Self::Exact,
            Self::Exact => Self::Exact,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::Lower => Self::Lower,
            Self::Upper => Self::Lower,
            Self::Exact => Self::Upper,
        }
    }
}

/// Constraint table state.
#[derive(Debug, Clone, Default)]
pub struct ConstraintState {
    /// Minimum weight per asset, in percent.
    pub lower_bounds: Vec<Decimal>,
    /// Maximum weight per asset, in percent.
    pub upper_bounds: Vec<Decimal>,
    /// Fixed weight per asset, in percent, when set.
    pub exact_proportion: Vec<Option<Decimal>>,
    /// Sum of lower bounds is above 100%.
    pub is_lower_bound_exceeded: bool,
    /// Sum of upper bounds is below 100%.
    pub is_upper_bound_under_limit: bool,
    /// Highlighted row.
    pub selected_row: Option<usize>,
    /// Highlighted column.
    pub selected_column: ConstraintColumn,
}

/// Parse user text as a percentage. Surrounding whitespace and a trailing `%` are ignored.
pub fn parse_percent(raw: &str) -> Option<Decimal> {
    raw.trim().trim_end_matches('%').trim().parse::<Decimal>().ok()
}

impl ConstraintState {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.lower_bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower_bounds.is_empty()
    }

    /// Grow or shrink every column to `len` rows. Existing rows are kept.
    pub fn resize(&mut self, len: usize) {
        self.lower_bounds.resize(len, DEFAULT_LOWER_BOUND);
        self.upper_bounds.resize(len, DEFAULT_UPPER_BOUND);
        self.exact_proportion.resize(len, None);
        self.selected_row = match self.selected_row {
            _ if len == 0 => None,
            Some(row) => Some(row.min(len - 1)),
            None => Some(0),
        };
        self.recompute_flags();
    }

    /// Drop the row at `index`, keeping the other rows aligned with their assets.
    pub fn remove_row(&mut self, index: usize) {
        if index >= self.len() {
            return;
        }
        self.lower_bounds.remove(index);
        self.upper_bounds.remove(index);
        self.exact_proportion.remove(index);
        let len = self.len();
        self.resize(len);
    }

    /// Set the lower bound of row `index`. Non-numeric input counts as zero.
    pub fn set_lower_bound(&mut self, index: usize, value: &str) {
        self.ensure_row(index);
        self.lower_bounds[index] = parse_percent(value).unwrap_or(Decimal::ZERO);
        self.recompute_flags();
    }

    /// Set the upper bound of row `index`. Non-numeric input counts as zero.
    pub fn set_upper_bound(&mut self, index: usize, value: &str) {
        self.ensure_row(index);
        self.upper_bounds[index] = parse_percent(value).unwrap_or(Decimal::ZERO);
        self.recompute_flags();
    }

    /// Set the exact proportion of row `index`. Empty or non-numeric input clears it.
    pub fn set_exact_proportion(&mut self, index: usize, value: &str) {
        self.ensure_row(index);
        self.exact_proportion[index] = parse_percent(value);
    }

    /// Current text of a cell, for pre-filling the editor.
    pub fn cell_text(&self, index: usize, column: ConstraintColumn) -> String {
        match column {
            ConstraintColumn::Lower => self.lower_bounds.get(index).map(|v| v.to_string()),
            ConstraintColumn::Upper => self.upper_bounds.get(index).map(|v| v.to_string()),
            ConstraintColumn::Exact => self.exact_proportion.get(index).copied().flatten().map(|v| v.to_string()),
        }
        .unwrap_or_default()
    }

    pub fn lower_sum(&self) -> Decimal {
        self.lower_bounds.iter().copied().sum()
    }

    pub fn upper_sum(&self) -> Decimal {
        self.upper_bounds.iter().copied().sum()
    }

    /// Build the creation request. Percentages become fractions (`5` -> `0.05`).
    pub fn to_init_request(
        &self,
        name: impl Into<String>,
        total_cash: Decimal,
        assets: &[Asset],
    ) -> PortfolioInitRequest {
        let fraction = |v: Decimal| (v / Decimal::ONE_HUNDRED).to_f64().unwrap_or_default();
        let row_count = assets.len();

        PortfolioInitRequest {
            name: name.into(),
            total_cash: total_cash.to_f64().unwrap_or_default(),
            asset_ids: assets.iter().map(|a| a.asset_id.0).collect(),
            lower_bounds: (0..row_count)
                .map(|i| fraction(self.lower_bounds.get(i).copied().unwrap_or(DEFAULT_LOWER_BOUND)))
                .collect(),
            upper_bounds: (0..row_count)
                .map(|i| fraction(self.upper_bounds.get(i).copied().unwrap_or(DEFAULT_UPPER_BOUND)))
                .collect(),
            exact_proportion: (0..row_count)
                .map(|i| self.exact_proportion.get(i).copied().flatten().map(fraction))
                .collect(),
        }
    }

    fn ensure_row(&mut self, index: usize) {
        if index >= self.len() {
            self.resize(index + 1);
        }
    }

    fn recompute_flags(&mut self) {
        let hundred = Decimal::ONE_HUNDRED;
        self.is_lower_bound_exceeded = self.lower_sum() > hundred;
        // An empty table has nothing to warn about.
        self.is_upper_bound_under_limit = !self.is_empty() && self.upper_sum() < hundred;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn three_rows() -> ConstraintState {
        let mut state = ConstraintState::default();
        state.resize(3);
        state
    }

    #[test]
    fn test_resize_fills_defaults() {
        let state = three_rows();
        assert_eq!(state.lower_bounds, vec![dec!(0); 3]);
        assert_eq!(state.upper_bounds, vec![dec!(100); 3]);
        assert_eq!(state.exact_proportion, vec![None; 3]);
        assert_eq!(state.selected_row, Some(0));
        assert!(!state.is_lower_bound_exceeded);
        assert!(!state.is_upper_bound_under_limit);
    }

    #[test]
    fn test_set_lower_bound_touches_only_its_row() {
        let mut state = three_rows();
        state.set_lower_bound(0, "10");
        state.set_lower_bound(2, "30");
        let before = state.clone();

        state.set_lower_bound(1, "25.5");

        assert_eq!(state.lower_bounds[1], dec!(25.5));
        assert_eq!(state.lower_bounds[0], before.lower_bounds[0]);
        assert_eq!(state.lower_bounds[2], before.lower_bounds[2]);
        assert_eq!(state.upper_bounds, before.upper_bounds);
        assert_eq!(state.exact_proportion, before.exact_proportion);
    }

    #[test]
    fn test_lower_bound_exceeded_flag() {
        let mut state = three_rows();
        state.set_lower_bound(0, "50");
        state.set_lower_bound(1, "50");
        assert!(!state.is_lower_bound_exceeded);

        state.set_lower_bound(2, "0.1");
        assert!(state.is_lower_bound_exceeded);

        state.set_lower_bound(2, "0");
        assert!(!state.is_lower_bound_exceeded);
    }

    #[test]
    fn test_upper_bound_under_limit_flag() {
        let mut state = three_rows();
        state.set_upper_bound(0, "30");
        state.set_upper_bound(1, "30");
        assert!(!state.is_upper_bound_under_limit);

        state.set_upper_bound(2, "39");
        assert!(state.is_upper_bound_under_limit);
    }

    #[test]
    fn test_out_of_range_input_is_accepted() {
        let mut state = three_rows();
        state.set_lower_bound(0, "-20");
        state.set_upper_bound(0, "250");
        assert_eq!(state.lower_bounds[0], dec!(-20));
        assert_eq!(state.upper_bounds[0], dec!(250));
    }

    #[test]
    fn test_non_numeric_input() {
        let mut state = three_rows();
        state.set_lower_bound(0, "abc");
        state.set_exact_proportion(1, "20");
        state.set_exact_proportion(1, "");
        state.set_exact_proportion(2, " 15 % ");
        assert_eq!(state.lower_bounds[0], dec!(0));
        assert_eq!(state.exact_proportion[1], None);
        assert_eq!(state.exact_proportion[2], Some(dec!(15)));
    }

    #[test]
    fn test_set_beyond_length_grows() {
        let mut state = ConstraintState::default();
        state.set_upper_bound(2, "40");
        assert_eq!(state.len(), 3);
        assert_eq!(state.upper_bounds, vec![dec!(100), dec!(100), dec!(40)]);
    }

    #[test]
    fn test_remove_row_keeps_alignment() {
        let mut state = three_rows();
        state.set_lower_bound(0, "1");
        state.set_lower_bound(1, "2");
        state.set_lower_bound(2, "3");
        state.selected_row = Some(2);

        state.remove_row(1);
        assert_eq!(state.lower_bounds, vec![dec!(1), dec!(3)]);
        assert_eq!(state.selected_row, Some(1));

        state.remove_row(7);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_to_init_request_converts_to_fractions() {
        let mut state = three_rows();
        state.set_lower_bound(0, "5");
        state.set_upper_bound(1, "50");
        state.set_exact_proportion(2, "20");
        let assets = vec![
            Asset::new(1, "A", "A", dec!(10)),
            Asset::new(2, "B", "B", dec!(10)),
            Asset::new(3, "C", "C", dec!(10)),
        ];

        let request = state.to_init_request("Portfolio 1", dec!(1500000), &assets);
        assert_eq!(request.asset_ids, vec![1, 2, 3]);
        assert_eq!(request.total_cash, 1_500_000.0);
        assert_eq!(request.lower_bounds, vec![0.05, 0.0, 0.0]);
        assert_eq!(request.upper_bounds, vec![1.0, 0.5, 1.0]);
        assert_eq!(request.exact_proportion, vec![None, None, Some(0.2)]);
    }
}
