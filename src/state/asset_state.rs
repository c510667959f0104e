//! Asset selection state: the working selection, the confirmed list, and total cash.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Backend asset identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u32);

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An investable asset (stock or ETF).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset ID.
    pub asset_id: AssetId,
    /// Display name.
    pub name: String,
    /// Ticker code.
    pub code: String,
    /// Exchange (e.g., "KOSPI", "NASDAQ").
    pub market: String,
    /// Region code (e.g., "KR", "US").
    pub region: String,
    /// Latest price.
    pub price: Decimal,
    /// Daily price change in percent, when the backend reports a parseable value.
    pub daily_price_change_rate: Option<Decimal>,
    /// Daily price change in currency units.
    pub daily_price_change: Option<Decimal>,
    /// Expected annual return.
    pub expected_return: Option<f64>,
}

impl Asset {
    /// Create an asset with the given identity and price.
    pub fn new(asset_id: u32, name: impl Into<String>, code: impl Into<String>, price: Decimal) -> Self {
        Self {
            asset_id: AssetId(asset_id),
            name: name.into(),
            code: code.into(),
            market: String::new(),
            region: String::new(),
            price,
            daily_price_change_rate: None,
            daily_price_change: None,
            expected_return: None,
        }
    }

    /// Whether this is a domestic (Korean) listing.
    pub fn is_domestic(&self) -> bool {
        self.region.eq_ignore_ascii_case("KR")
    }

    /// Domestic assets are labelled by name, foreign ones by ticker.
    pub fn label(&self) -> &str {
        if self.is_domestic() { &self.name } else { &self.code }
    }

    /// Heuristic used to decide whether ETF detail is worth requesting.
    pub fn is_etf(&self) -> bool {
        self.market.to_ascii_uppercase().contains("ETF")
    }
}

/// A closing price on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

/// Recent closing prices for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetHistory {
    pub asset_id: AssetId,
    pub records: Vec<PricePoint>,
}

impl AssetHistory {
    /// Change between the first and last record, in percent.
    pub fn change_percent(&self) -> Option<Decimal> {
        let first = self.records.first()?.price;
        let last = self.records.last()?.price;
        if first.is_zero() {
            return None;
        }
        Some((last - first) / first * Decimal::ONE_HUNDRED)
    }
}

/// One constituent of an ETF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfHolding {
    pub name: String,
    pub code: Option<String>,
    /// Weight in percent.
    pub weight: Option<f64>,
}

/// ETF detail as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfDetail {
    pub asset_id: AssetId,
    pub name: Option<String>,
    pub code: Option<String>,
    pub market: Option<String>,
    pub price: Option<Decimal>,
    pub holdings: Vec<EtfHolding>,
}

/// Increment applied by the quick cash buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CashUnit {
    #[default]
    TenThousand,
    HundredThousand,
    Million,
    TenMillion,
}

impl CashUnit {
    pub fn amount(&self) -> Decimal {
        match self {
            Self::TenThousand => Decimal::from(10_000),
            Self::HundredThousand => Decimal::from(100_000),
            Self::Million => Decimal::from(1_000_000),
            Self::TenMillion => Decimal::from(10_000_000),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TenThousand => "만원",
            Self::HundredThousand => "십만원",
            Self::Million => "백만원",
            Self::TenMillion => "천만원",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::TenThousand => Self::HundredThousand,
            Self::HundredThousand => Self::Million,
            Self::Million => Self::TenMillion,
            Self::TenMillion => Self::TenThousand,
        }
    }
}

/// Assets picked for a new portfolio.
///
/// `temp_assets` is the working selection toggled while browsing; confirming it
/// merges it into `assets`, the list the constraint table is indexed by.
#[derive(Debug, Default, Clone)]
pub struct AssetState {
    /// Working selection, keyed by asset ID.
    pub temp_assets: BTreeMap<AssetId, Asset>,
    /// Confirmed assets, in insertion order.
    pub assets: Vec<Asset>,
    /// Total cash to invest.
    pub total_cash: Decimal,
    /// Unit for quick cash increments.
    pub cash_unit: CashUnit,
}

impl AssetState {
    /// Add the asset to the working selection, or remove it if already there.
    pub fn toggle_temp_asset(&mut self, asset: Asset) {
        if self.temp_assets.remove(&asset.asset_id).is_none() {
            self.temp_assets.insert(asset.asset_id, asset);
        }
    }

    pub fn is_temp_selected(&self, asset_id: AssetId) -> bool {
        self.temp_assets.contains_key(&asset_id)
    }

    /// Clear the working selection.
    pub fn reset_temp_assets(&mut self) {
        self.temp_assets.clear();
    }

    /// Append an asset unless one with the same ID is already present.
    pub fn add_asset(&mut self, asset: Asset) -> bool {
        if self.contains(asset.asset_id) {
            return false;
        }
        self.assets.push(asset);
        true
    }

    /// Merge a list by asset ID, skipping duplicates. Returns how many were added.
    pub fn add_asset_list(&mut self, list: impl IntoIterator<Item = Asset>) -> usize {
        list.into_iter()
            .map(|asset| self.add_asset(asset))
            .filter(|added| *added)
            .count()
    }

    /// Remove an asset by ID. Returns its former position, if it was present.
    pub fn remove_asset(&mut self, asset_id: AssetId) -> Option<usize> {
        let position = self.position(asset_id)?;
        self.assets.remove(position);
        Some(position)
    }

    /// Replace the confirmed list.
    pub fn update_assets(&mut self, assets: Vec<Asset>) {
        self.assets = assets;
    }

    pub fn add_total_cash(&mut self, amount: Decimal) {
        self.total_cash += amount;
    }

    pub fn update_total_cash(&mut self, amount: Decimal) {
        self.total_cash = amount;
    }

    pub fn contains(&self, asset_id: AssetId) -> bool {
        self.position(asset_id).is_some()
    }

    pub fn position(&self, asset_id: AssetId) -> Option<usize> {
        self.assets.iter().position(|a| a.asset_id == asset_id)
    }

    pub fn asset_ids(&self) -> Vec<AssetId> {
        self.assets.iter().map(|a| a.asset_id).collect()
    }

    /// Assets whose unit price alone exceeds the total cash.
    pub fn is_price_over_total_cash(&self, asset: &Asset) -> bool {
        asset.price > self.total_cash
    }
}
