//! Bookmarked assets with optimistic add/remove.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use uuid::Uuid;

use super::{Asset, AssetHistory, AssetId, EtfDetail};

/// Bookmark list ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    /// Name, ascending.
    #[default]
    Name,
    /// Daily return, descending.
    Return,
    /// Price, descending.
    Price,
}

impl SortOption {
    pub fn next(&self) -> Self {
        match self {
            Self::Name => Self::Return,
            Self::Return => Self::Price,
            Self::Price => Self::Name,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Return => "Return",
            Self::Price => "Price",
        }
    }

    /// Compare two bookmarks under this ordering.
    pub fn compare(&self, a: &Asset, b: &Asset) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            // Unparseable rates sort last.
            Self::Return => match (a.daily_price_change_rate, b.daily_price_change_rate) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Price => b.price.cmp(&a.price),
        }
    }
}

/// Kind of optimistic bookmark change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkChange {
    Add,
    Remove,
}

/// An optimistic change awaiting server confirmation.
///
/// Holds the list as it was before the change so a failed request can be
/// compensated with [`BookmarkState::rollback`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingBookmarkChange {
    pub id: Uuid,
    pub asset_id: AssetId,
    pub change: BookmarkChange,
    previous: Vec<Asset>,
}

impl PendingBookmarkChange {
    fn new(asset_id: AssetId, change: BookmarkChange, previous: Vec<Asset>) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_id,
            change,
            previous,
        }
    }

    /// The list as it was before the change.
    pub fn previous(&self) -> &[Asset] {
        &self.previous
    }
}

/// Detail loaded for the highlighted bookmark.
#[derive(Debug, Clone, Default)]
pub struct AssetDetail {
    pub history: Option<AssetHistory>,
    pub etf: Option<EtfDetail>,
}

/// Bookmark list state.
#[derive(Debug, Clone, Default)]
pub struct BookmarkState {
    /// Bookmarked assets, in display order.
    pub assets: Vec<Asset>,
    /// Active ordering.
    pub sort: SortOption,
    /// Currently selected bookmark index.
    pub selected_index: Option<usize>,
    /// Detail for the selected bookmark.
    pub detail: AssetDetail,
    /// Whether bookmarks are loading.
    pub loading: bool,
    /// Last update timestamp.
    pub last_updated: Option<DateTime<Utc>>,
}

impl BookmarkState {
    /// Replace the list with server data, keeping the active ordering.
    pub fn set_assets(&mut self, assets: Vec<Asset>) {
        self.assets = assets;
        self.apply_sort();
        self.clamp_selection();
    }

    /// Change ordering and re-sort.
    pub fn sort_by(&mut self, option: SortOption) {
        self.sort = option;
        self.apply_sort();
    }

    pub fn selected_asset(&self) -> Option<&Asset> {
        self.selected_index.and_then(|i| self.assets.get(i))
    }

    pub fn contains(&self, asset_id: AssetId) -> bool {
        self.assets.iter().any(|a| a.asset_id == asset_id)
    }

    /// Remove a bookmark locally before the server confirms it.
    ///
    /// Removing an asset that is not in the list leaves the list unchanged.
    pub fn begin_remove(&mut self, asset_id: AssetId) -> PendingBookmarkChange {
        let pending = PendingBookmarkChange::new(asset_id, BookmarkChange::Remove, self.assets.clone());
        self.assets.retain(|a| a.asset_id != asset_id);
        self.clamp_selection();
        pending
    }

    /// Add a bookmark locally before the server confirms it.
    pub fn begin_add(&mut self, asset: Asset) -> PendingBookmarkChange {
        let pending = PendingBookmarkChange::new(asset.asset_id, BookmarkChange::Add, self.assets.clone());
        if !self.contains(asset.asset_id) {
            self.assets.push(asset);
            self.apply_sort();
        }
        self.clamp_selection();
        pending
    }

    /// Undo an optimistic change after the server rejected it.
    pub fn rollback(&mut self, pending: PendingBookmarkChange) {
        self.assets = pending.previous;
        self.clamp_selection();
    }

    fn apply_sort(&mut self) {
        let sort = self.sort;
        self.assets.sort_by(|a, b| sort.compare(a, b));
    }

    fn clamp_selection(&mut self) {
        self.selected_index = match self.selected_index {
            _ if self.assets.is_empty() => None,
            Some(i) => Some(i.min(self.assets.len() - 1)),
            None => Some(0),
        };
    }
}
