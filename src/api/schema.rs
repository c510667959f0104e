//! Wire types for the MutualRisk backend.
//!
//! Every response is wrapped in [`Envelope`]; the payload types mirror the
//! backend's JSON field names. Fields the backend may omit are defaulted, and
//! values it sends inconsistently (ids, change rates, timestamps) go through
//! the lenient deserializers at the bottom of this file.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `{ "status"?, "message"?, "data": T }`
///
/// `data` is required: a body without it fails to decode.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
}

/// `/portfolio/my` payload, either wrapped or a bare list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortfolioListDto {
    Bare(Vec<SimplePortfolioDto>),
    Wrapped {
        #[serde(rename = "hasPortfolio", default)]
        has_portfolio: Option<bool>,
        #[serde(rename = "portfolioList", alias = "portfolios", default)]
        portfolio_list: Vec<SimplePortfolioDto>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplePortfolioDto {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDto {
    #[serde(default)]
    pub expected_return: Option<f64>,
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default)]
    pub sharpe_ratio: Option<f64>,
}

/// `/portfolio/detail` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResultDto {
    #[serde(default)]
    pub has_portfolio: Option<bool>,
    #[serde(default)]
    pub portfolio: Option<PortfolioInfoDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioInfoDto {
    #[serde(deserialize_with = "string_or_number")]
    pub portfolio_id: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_cash: Option<Decimal>,
    #[serde(default)]
    pub performance: Option<PerformanceDto>,
    #[serde(default)]
    pub assets: Vec<PortfolioAssetDto>,
}

/// An asset row as the backend reports it in lists and portfolios.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDto {
    pub asset_id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub expected_return: Option<f64>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub daily_price_change_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub daily_price_change: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAssetDto {
    #[serde(flatten)]
    pub asset: AssetDto,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub valuation: Option<Decimal>,
    #[serde(default)]
    pub lower_bound: Option<f64>,
    #[serde(default)]
    pub upper_bound: Option<f64>,
    #[serde(default)]
    pub exact_proportion: Option<f64>,
}

/// `/portfolio/backtest` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuationDto {
    #[serde(default)]
    pub time_interval: Option<String>,
    #[serde(default)]
    pub measure: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub portfolio_id: Option<String>,
    #[serde(default)]
    pub performances: Vec<ValuationPointDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationPointDto {
    #[serde(alias = "date", deserialize_with = "calendar_date")]
    pub time: NaiveDate,
    pub valuation: f64,
    #[serde(default, rename = "sp500Valuation")]
    pub sp500_valuation: Option<f64>,
}

/// `/asset/history/{assetId}` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetHistoryDto {
    pub asset_id: u32,
    #[serde(default)]
    pub record_num: Option<u32>,
    #[serde(default)]
    pub records: Vec<PriceRecordDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceRecordDto {
    pub price: Decimal,
    #[serde(deserialize_with = "calendar_date")]
    pub date: NaiveDate,
}

/// `/asset/detail/etf` payload. Only the common fields are read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtfDetailDto {
    #[serde(default)]
    pub asset_id: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    #[serde(default, alias = "assets", alias = "portfolio")]
    pub holdings: Vec<EtfHoldingDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EtfHoldingDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, alias = "proportion", alias = "ratio")]
    pub weight: Option<f64>,
}

/// `/asset/interest` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookmarkListDto {
    #[serde(default)]
    pub assets: Vec<AssetDto>,
}

/// `/portfolio/summary` payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStatusDto {
    #[serde(default)]
    pub cur_valuation: Option<f64>,
    #[serde(default)]
    pub last_valuation: Option<f64>,
    #[serde(default)]
    pub init_valuation: Option<f64>,
    #[serde(default)]
    pub sharpe_ratio: Option<f64>,
}

/// `/portfolio/init` request body.
///
/// Bounds are fractions of the portfolio (`0.05` for 5%).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioInitRequest {
    pub name: String,
    pub total_cash: f64,
    pub asset_ids: Vec<u32>,
    #[serde(rename = "lower_bounds")]
    pub lower_bounds: Vec<f64>,
    #[serde(rename = "upper_bounds")]
    pub upper_bounds: Vec<f64>,
    #[serde(rename = "exact_proportion")]
    pub exact_proportion: Vec<Option<f64>>,
}

/// `/portfolio/init` payload.
///
/// The backend wraps the recommendation in `original` alongside the holding
/// changes against the user's current portfolio. A bare analysis is accepted
/// for first portfolios served without the wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CalculatedPortfolioDto {
    Calculated {
        original: PortfolioAnalysisDto,
        #[serde(rename = "oldPortfolioAssetInfoList", default)]
        old_assets: Option<Vec<RecommendAssetDto>>,
        #[serde(rename = "newPortfolioAssetInfoList", default)]
        new_assets: Option<Vec<RecommendAssetDto>>,
        #[serde(rename = "changeAssetInfoList", default)]
        changes: Option<Vec<ChangeAssetDto>>,
    },
    Bare(PortfolioAnalysisDto),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalysisDto {
    #[serde(default)]
    pub total_cash: Option<f64>,
    #[serde(default)]
    pub fictional_performance: Option<PerformanceDto>,
    #[serde(default)]
    pub performance: Option<PerformanceDto>,
    pub assets: Vec<RecommendAssetDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendAssetDto {
    pub asset_id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub purchase_num: Option<u32>,
}

/// Share count of one asset before and after a rebalance.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAssetDto {
    pub asset_id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub old_purchase_num: Option<u32>,
    #[serde(default)]
    pub new_purchase_num: Option<u32>,
}

// Lenient deserializers

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts a number, a numeric string (`"1.25"`, `"+1.25%"`, `"1,500"`), or null.
/// Anything else becomes `None` rather than an error.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .to_string()
            .parse::<Decimal>()
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => parse_decimal_text(&s),
        _ => None,
    })
}

pub(crate) fn parse_decimal_text(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && *c != '+' && !c.is_whitespace())
        .collect();
    cleaned
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&cleaned).ok())
}

fn parse_datetime_text(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) => parse_datetime_text(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{s}'"))),
    }
}

/// Reduces a timestamp or date string to its calendar date.
fn calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_datetime_text(&s)
        .map(|dt| dt.date())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{s}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_data_fails() {
        let result = serde_json::from_str::<Envelope<BookmarkListDto>>(r#"{"status":200}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_portfolio_list_shapes() {
        let wrapped: Envelope<PortfolioListDto> = serde_json::from_str(
            r#"{"data":{"hasPortfolio":true,"portfolioList":[{"id":"p1","name":"One","version":2,"createdAt":"2024-05-01T09:30:00"}]}}"#,
        )
        .unwrap();
        match wrapped.data {
            PortfolioListDto::Wrapped {
                has_portfolio,
                portfolio_list,
            } => {
                assert_eq!(has_portfolio, Some(true));
                assert_eq!(portfolio_list[0].id, "p1");
                assert_eq!(portfolio_list[0].version, Some(2));
                assert!(portfolio_list[0].created_at.is_some());
            }
            other => panic!("unexpected shape: {other:?}"),
        }

        let bare: Envelope<PortfolioListDto> =
            serde_json::from_str(r#"{"data":[{"id":7,"name":"Numeric"}]}"#).unwrap();
        match bare.data {
            PortfolioListDto::Bare(list) => assert_eq!(list[0].id, "7"),
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn test_change_rate_is_lenient() {
        let dto: AssetDto = serde_json::from_str(
            r#"{"assetId":1,"name":"A","code":"A","price":1000,"dailyPriceChangeRate":"+1.25%","dailyPriceChange":"N/A"}"#,
        )
        .unwrap();
        assert_eq!(dto.daily_price_change_rate, Some(dec!(1.25)));
        assert_eq!(dto.daily_price_change, None);
        assert_eq!(dto.price, Some(dec!(1000)));
    }

    #[test]
    fn test_valuation_points_reduce_to_dates() {
        let dto: PortfolioValuationDto = serde_json::from_str(
            r#"{"timeInterval":"DAY","measure":"PROFIT","portfolioId":"p","performances":[
                {"time":"2024-01-02T00:00:00","valuation":101.5,"sp500Valuation":99.0},
                {"time":"2024-01-03","valuation":102.0}
            ]}"#,
        )
        .unwrap();
        assert_eq!(dto.performances[0].time, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(dto.performances[1].sp500_valuation, None);
    }

    #[test]
    fn test_bad_timestamp_is_an_error() {
        let result = serde_json::from_str::<ValuationPointDto>(r#"{"time":"yesterday","valuation":1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_init_request_keys() {
        let request = PortfolioInitRequest {
            name: "P".into(),
            total_cash: 1000.0,
            asset_ids: vec![1],
            lower_bounds: vec![0.0],
            upper_bounds: vec![1.0],
            exact_proportion: vec![None],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "P",
                "totalCash": 1000.0,
                "assetIds": [1],
                "lower_bounds": [0.0],
                "upper_bounds": [1.0],
                "exact_proportion": [null]
            })
        );
    }

    #[test]
    fn test_etf_holdings_alias() {
        let dto: EtfDetailDto =
            serde_json::from_str(r#"{"name":"KODEX 200","assets":[{"name":"Samsung","proportion":31.2}]}"#)
                .unwrap();
        assert_eq!(dto.holdings.len(), 1);
        assert_eq!(dto.holdings[0].weight, Some(31.2));
    }

    #[test]
    fn test_calculated_portfolio_unwraps_original() {
        let dto: CalculatedPortfolioDto = serde_json::from_str(
            r#"{
                "original": {
                    "totalCash": 1000000.0,
                    "lowerBounds": [0.0],
                    "upperBounds": [1.0],
                    "exactProportion": [null],
                    "performance": {"expectedReturn": 0.12, "volatility": 0.2},
                    "assets": [{"assetId": 7, "name": "Apple", "code": "AAPL", "weight": 1.0, "purchaseNum": 4}]
                },
                "oldPortfolioAssetInfoList": [{"assetId": 7, "name": "Apple", "code": "AAPL", "weight": 1.0, "purchaseNum": 2}],
                "newPortfolioAssetInfoList": [{"assetId": 7, "name": "Apple", "code": "AAPL", "weight": 1.0, "purchaseNum": 4}],
                "changeAssetInfoList": [{"assetId": 7, "name": "Apple", "code": "AAPL", "oldPurchaseNum": 2, "newPurchaseNum": 4}]
            }"#,
        )
        .unwrap();
        match dto {
            CalculatedPortfolioDto::Calculated { original, changes, .. } => {
                assert_eq!(original.assets.len(), 1);
                assert_eq!(original.total_cash, Some(1_000_000.0));
                let changes = changes.unwrap_or_default();
                assert_eq!(changes[0].old_purchase_num, Some(2));
                assert_eq!(changes[0].new_purchase_num, Some(4));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn test_calculated_portfolio_without_assets_fails() {
        let result = serde_json::from_str::<CalculatedPortfolioDto>(
            r#"{"original":{"totalCash":1000.0},"changeAssetInfoList":[]}"#,
        );
        assert!(result.is_err());

        let result = serde_json::from_str::<CalculatedPortfolioDto>(r#"{"totalCash":1000.0}"#);
        assert!(result.is_err());
    }
}
