//! Backtest comparison between the selected and the latest portfolio.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Number of trailing points kept for yearly granularity.
pub const YEARLY_POINTS: usize = 10;

/// Sampling granularity of a backtest series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInterval {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl TimeInterval {
    /// Value sent as the `timeInterval` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Year => "YEAR",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Year => "Year",
        }
    }

    pub const ALL: [TimeInterval; 4] = [Self::Day, Self::Week, Self::Month, Self::Year];
}

/// What a backtest series measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Measure {
    #[default]
    Profit,
    Valuation,
}

impl Measure {
    /// Value sent as the `measure` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Profit => "PROFIT",
            Self::Valuation => "VALUATION",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Profit => Self::Valuation,
            Self::Valuation => Self::Profit,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Profit => "Profit",
            Self::Valuation => "Valuation",
        }
    }
}

/// One point of a backtest series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub valuation: f64,
}

/// A selected-series point joined with the latest series on date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergedPoint {
    pub date: NaiveDate,
    pub selected_valuation: f64,
    pub latest_valuation: Option<f64>,
}

fn trailing(series: &[SeriesPoint], interval: TimeInterval) -> &[SeriesPoint] {
    if interval == TimeInterval::Year {
        &series[series.len().saturating_sub(YEARLY_POINTS)..]
    } else {
        series
    }
}

/// Left-join `selected` with `latest` on date.
///
/// Yearly series are first cut to their last [`YEARLY_POINTS`] points. The
/// output follows the selected series' order; the first latest point with a
/// matching date wins.
pub fn merge_series(
    selected: &[SeriesPoint],
    latest: &[SeriesPoint],
    interval: TimeInterval,
) -> Vec<MergedPoint> {
    let selected = trailing(selected, interval);
    let latest = trailing(latest, interval);

    selected
        .iter()
        .map(|point| MergedPoint {
            date: point.date,
            selected_valuation: point.valuation,
            latest_valuation: latest
                .iter()
                .find(|l| l.date == point.date)
                .map(|l| l.valuation),
        })
        .collect()
}

/// Y-axis range for a merged chart.
///
/// Each end is pushed outward by 10% of its own magnitude, so negative profit
/// series stay inside the range. A flat series is widened by one unit each way.
pub fn value_bounds(points: &[MergedPoint]) -> Option<(f64, f64)> {
    let values = points
        .iter()
        .flat_map(|p| std::iter::once(p.selected_valuation).chain(p.latest_valuation));

    let (min, max) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;

    let lo = min - min.abs() * 0.1;
    let hi = max + max.abs() * 0.1;
    if hi - lo < f64::EPSILON {
        return Some((lo - 1.0, hi + 1.0));
    }
    Some((lo, hi))
}

/// Backtest view state.
#[derive(Debug, Clone, Default)]
pub struct BacktestState {
    /// Portfolio whose backtest is shown.
    pub portfolio_id: Option<String>,
    /// Latest portfolio, when it differs from the selected one.
    pub latest_portfolio_id: Option<String>,
    /// Granularity.
    pub interval: TimeInterval,
    /// Measure.
    pub measure: Measure,
    /// Joined series.
    pub merged: Vec<MergedPoint>,
    /// Whether data is loading.
    pub loading: bool,
    /// Error from the last load.
    pub error: Option<String>,
    /// Last update timestamp.
    pub last_updated: Option<DateTime<Utc>>,
}

impl BacktestState {
    /// Whether a second (latest portfolio) line is plotted.
    pub fn compares_latest(&self) -> bool {
        match (&self.portfolio_id, &self.latest_portfolio_id) {
            (Some(selected), Some(latest)) => selected != latest,
            _ => false,
        }
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        value_bounds(&self.merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn point(d: &str, v: f64) -> SeriesPoint {
        SeriesPoint {
            date: date(d),
            valuation: v,
        }
    }

    fn daily(start: NaiveDate, count: usize, base: f64) -> Vec<SeriesPoint> {
        (0..count)
            .map(|i| SeriesPoint {
                date: start + chrono::Duration::days(i as i64),
                valuation: base + i as f64,
            })
            .collect()
    }

    #[test]
    fn test_merge_example() {
        let selected = vec![point("2024-01-01", 100.0), point("2024-01-02", 110.0)];
        let latest = vec![point("2024-01-02", 120.0)];

        let merged = merge_series(&selected, &latest, TimeInterval::Day);
        assert_eq!(
            merged,
            vec![
                MergedPoint {
                    date: date("2024-01-01"),
                    selected_valuation: 100.0,
                    latest_valuation: None,
                },
                MergedPoint {
                    date: date("2024-01-02"),
                    selected_valuation: 110.0,
                    latest_valuation: Some(120.0),
                },
            ]
        );
    }

    #[test]
    fn test_merge_full_overlap_has_no_gaps() {
        let start = date("2023-03-01");
        let selected = daily(start, 30, 100.0);
        let mut latest = daily(start - chrono::Duration::days(5), 50, 500.0);
        latest.reverse();

        let merged = merge_series(&selected, &latest, TimeInterval::Week);
        assert_eq!(merged.len(), selected.len());
        assert!(merged.iter().all(|p| p.latest_valuation.is_some()));
        assert_eq!(merged[0].latest_valuation, Some(505.0));
    }

    #[test]
    fn test_merge_preserves_selected_order() {
        let selected = vec![point("2024-01-03", 3.0), point("2024-01-01", 1.0)];
        let merged = merge_series(&selected, &[], TimeInterval::Day);
        let dates: Vec<_> = merged.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date("2024-01-03"), date("2024-01-01")]);
    }

    #[test]
    fn test_merge_first_match_wins() {
        let selected = vec![point("2024-01-01", 1.0)];
        let latest = vec![point("2024-01-01", 7.0), point("2024-01-01", 8.0)];
        let merged = merge_series(&selected, &latest, TimeInterval::Month);
        assert_eq!(merged[0].latest_valuation, Some(7.0));
    }

    #[test]
    fn test_yearly_truncates_both_inputs() {
        let start = date("2000-01-01");
        let selected = daily(start, 15, 0.0);
        // Latest covers only the first 12 dates; after truncation it keeps days 2..12.
        let latest = daily(start, 12, 100.0);

        let merged = merge_series(&selected, &latest, TimeInterval::Year);
        assert_eq!(merged.len(), YEARLY_POINTS);
        assert_eq!(merged[0].date, start + chrono::Duration::days(5));
        let matched = merged.iter().filter(|p| p.latest_valuation.is_some()).count();
        assert_eq!(matched, 7);
    }

    #[test]
    fn test_yearly_short_series_untouched() {
        let selected = daily(date("2000-01-01"), 4, 0.0);
        let merged = merge_series(&selected, &selected, TimeInterval::Year);
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_value_bounds() {
        let merged = vec![
            MergedPoint {
                date: date("2024-01-01"),
                selected_valuation: 100.0,
                latest_valuation: None,
            },
            MergedPoint {
                date: date("2024-01-02"),
                selected_valuation: 110.0,
                latest_valuation: Some(200.0),
            },
        ];
        let (lo, hi) = value_bounds(&merged).unwrap();
        assert!((lo - 90.0).abs() < 1e-9);
        assert!((hi - 220.0).abs() < 1e-9);
        assert_eq!(value_bounds(&[]), None);
    }

    fn flat(values: &[f64]) -> Vec<MergedPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MergedPoint {
                date: date("2024-01-01") + chrono::Duration::days(i as i64),
                selected_valuation: *v,
                latest_valuation: None,
            })
            .collect()
    }

    #[test]
    fn test_value_bounds_contain_negative_series() {
        let (lo, hi) = value_bounds(&flat(&[-20.0, -10.0])).unwrap();
        assert!((lo + 22.0).abs() < 1e-9);
        assert!((hi + 9.0).abs() < 1e-9);
        assert!(lo < -20.0 && hi > -10.0);
    }

    #[test]
    fn test_value_bounds_straddling_zero() {
        let (lo, hi) = value_bounds(&flat(&[-5.0, 0.0, 15.0])).unwrap();
        assert!(lo < -5.0 && hi > 15.0);
    }

    #[test]
    fn test_value_bounds_flat_series_has_height() {
        assert_eq!(value_bounds(&flat(&[0.0, 0.0])), Some((-1.0, 1.0)));
        let (lo, hi) = value_bounds(&flat(&[50.0])).unwrap();
        assert!(lo < 50.0 && hi > 50.0);
    }

    #[test]
    fn test_compares_latest() {
        let mut state = BacktestState {
            portfolio_id: Some("a".into()),
            latest_portfolio_id: Some("a".into()),
            ..Default::default()
        };
        assert!(!state.compares_latest());

        state.latest_portfolio_id = Some("b".into());
        assert!(state.compares_latest());
    }
}
