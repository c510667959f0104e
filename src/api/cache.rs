//! Query cache keyed by request identity.
//!
//! Values are stored type-erased and read back by downcasting, so a single
//! cache serves every endpoint. Freshness is decided per call by the
//! caller's stale time; `invalidate` forces the next `fetch` to go to the
//! network while keeping the old value readable for optimistic updates.

use crate::error::Result;
use crate::state::{AssetId, Measure, TimeInterval};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

/// Identity of a cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    PortfolioList,
    PortfolioDetail(String),
    Backtest {
        portfolio_id: String,
        interval: TimeInterval,
        measure: Measure,
    },
    Bookmarks,
    AssetHistory {
        asset_id: AssetId,
        period: u32,
    },
    EtfDetail(AssetId),
    PortfolioSummary(u32),
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
    invalidated: bool,
}

impl Entry {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < stale_time
    }
}

/// Shared cache of query results.
#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, Entry>>,
    gates: Mutex<HashMap<QueryKey, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache").finish_non_exhaustive()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value when younger than `stale_time`, otherwise run
    /// `fetcher` and cache its result.
    ///
    /// Callers sharing a key are serialized, so at most one fetch per key is
    /// in flight; a caller that waited reuses the value the first one stored.
    /// A failed fetch leaves the previous entry untouched.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, stale_time: Duration, fetcher: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.fresh::<T>(&key, stale_time).await {
            tracing::trace!(?key, "cache hit");
            return Ok(value);
        }

        let gate = self.gate(&key).await;
        let outcome = self.fill(&key, stale_time, &gate, fetcher).await;
        self.release_gate(&key, gate).await;
        outcome
    }

    async fn fill<T, F, Fut>(
        &self,
        key: &QueryKey,
        stale_time: Duration,
        gate: &Mutex<()>,
        fetcher: F,
    ) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let _in_flight = gate.lock().await;

        if let Some(value) = self.fresh::<T>(key, stale_time).await {
            tracing::trace!(?key, "filled while waiting");
            return Ok(value);
        }

        tracing::debug!(?key, "cache miss, fetching");
        let value = fetcher().await?;
        self.set(key.clone(), value.clone()).await;
        Ok(value)
    }

    /// Read a cached value regardless of age.
    pub async fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .and_then(|entry| entry.value.downcast_ref::<T>())
            .cloned()
    }

    /// Store a value as freshly fetched.
    pub async fn set<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            Entry {
                value: Arc::new(value),
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    /// Mark an entry stale. Its value stays readable through [`get`](Self::get).
    pub async fn invalidate(&self, key: &QueryKey) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.invalidated = true;
        }
    }

    /// Drop every entry and idle gate.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        self.gates.lock().await.retain(|_, gate| Arc::strong_count(gate) > 1);
    }

    async fn fresh<T>(&self, key: &QueryKey, stale_time: Duration) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(stale_time))
            .and_then(|entry| entry.value.downcast_ref::<T>())
            .cloned()
    }

    async fn gate(&self, key: &QueryKey) -> Arc<Mutex<()>> {
        let mut gates = self.gates.lock().await;
        gates
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the gate for `key` once no other caller holds it.
    async fn release_gate(&self, key: &QueryKey, gate: Arc<Mutex<()>>) {
        let mut gates = self.gates.lock().await;
        // One reference in the map plus ours.
        if Arc::strong_count(&gate) <= 2 {
            gates.remove(key);
        }
    }
}
