//! Concurrent per-item price cache.
//!
//! One background job calls [`PriceCache::refresh`]; any number of readers
//! (the overlay, tooltips) call the synchronous query methods concurrently.
//! The map is sharded, so a reader only ever waits on the single shard an
//! in-flight merge is touching, and only for the duration of one record
//! update.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::{TraceId, child_span, root_span, warn_if_slow};
use dashmap::{DashMap, mapref::entry::Entry};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{Instrument, Span, debug, error, warn};

use crate::directory::ItemNameDirectory;
use crate::types::{ItemId, ItemPriceRecord, PriceModel, PriceObservation};
use crate::wiki::{LatestEnvelope, RawPrice, WikiApi, WikiError};

const SLOW_REFRESH: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Entries that created or updated a record.
    pub merged: usize,
    /// Entries dropped: bad id, malformed value, or no positive price.
    pub skipped: usize,
}

/// What a single `refresh` call did. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Merged(MergeStats),
    /// Fetch or whole-body parse failed; the cache was not touched.
    Aborted,
    /// Another refresh was still running.
    Skipped,
}

pub struct PriceCache<A: WikiApi> {
    api: Arc<A>,
    names: Arc<ItemNameDirectory<A>>,
    model: PriceModel,
    records: DashMap<ItemId, ItemPriceRecord>,
    refresh_gate: Mutex<()>,
}

impl<A: WikiApi> PriceCache<A> {
    pub fn new(api: Arc<A>, names: Arc<ItemNameDirectory<A>>, model: PriceModel) -> Self {
        Self {
            api,
            names,
            model,
            records: DashMap::new(),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Run one fetch-parse-merge cycle against the latest snapshot.
    ///
    /// Never fails: transport and whole-body errors are logged and leave the
    /// cache as it was. If a cycle is already in flight this returns
    /// [`RefreshOutcome::Skipped`] without fetching.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Ok(_gate) = self.refresh_gate.try_lock() else {
            debug!("price refresh already in flight; skipping");
            return RefreshOutcome::Skipped;
        };

        let trace_id = TraceId::default();
        let span = root_span("price_refresh", &trace_id);

        warn_if_slow("price_refresh", SLOW_REFRESH, self.run_cycle())
            .instrument(span)
            .await
    }

    async fn run_cycle(&self) -> RefreshOutcome {
        let body = match self.api.fetch_latest().await {
            Ok(body) => body,
            Err(e) => {
                log_abort(&e);
                return RefreshOutcome::Aborted;
            }
        };

        let merged = child_span("merge_snapshot").in_scope(|| self.merge_snapshot(&body));

        match merged {
            Ok(stats) => {
                Span::current().record("item_count", stats.merged);
                debug!(
                    merged = stats.merged,
                    skipped = stats.skipped,
                    tracked = self.tracked_count(),
                    "price snapshot merged"
                );
                RefreshOutcome::Merged(stats)
            }
            Err(e) => {
                log_abort(&e);
                RefreshOutcome::Aborted
            }
        }
    }

    /// Merge a `/latest` body into the cache.
    ///
    /// Fails only if the body as a whole is unusable, in which case nothing
    /// was merged. Individual bad entries are counted and skipped.
    pub fn merge_snapshot(&self, body: &str) -> Result<MergeStats, WikiError> {
        let envelope = LatestEnvelope::parse(body)?;
        let now = Utc::now();
        let mut stats = MergeStats::default();

        for (key, value) in envelope.data {
            if self.merge_entry(&key, value, now) {
                stats.merged += 1;
            } else {
                stats.skipped += 1;
            }
        }

        Ok(stats)
    }

    fn merge_entry(&self, key: &str, value: Value, at: DateTime<Utc>) -> bool {
        let Some(item_id) = ItemId::parse(key) else {
            debug!(key, "skipping price entry with invalid item id");
            return false;
        };

        let raw = match serde_json::from_value::<RawPrice>(value) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(%item_id, error = %e, "skipping malformed price entry");
                return false;
            }
        };

        let Some(obs) = PriceObservation::from_raw(raw.high, raw.low) else {
            return false;
        };

        self.merge(item_id, obs, at);
        true
    }

    /// Create or update the record for `item_id`.
    ///
    /// The name directory is consulted only when the record is created.
    pub fn merge(&self, item_id: ItemId, obs: PriceObservation, at: DateTime<Utc>) {
        match self.records.entry(item_id) {
            Entry::Occupied(mut e) => e.get_mut().apply(obs, at),
            Entry::Vacant(e) => {
                let name = self.names.name_for(item_id);
                e.insert(ItemPriceRecord::new(item_id, name, self.model, obs, at));
            }
        }
    }

    pub fn lookup(&self, item_id: ItemId) -> Option<ItemPriceRecord> {
        self.records.get(&item_id).map(|r| r.value().clone())
    }

    pub fn is_above_average(&self, item_id: ItemId) -> bool {
        self.records
            .get(&item_id)
            .is_some_and(|r| r.is_above_average())
    }

    pub fn is_at_all_time_high(&self, item_id: ItemId) -> bool {
        self.records
            .get(&item_id)
            .is_some_and(|r| r.is_at_all_time_high())
    }

    pub fn tracked_count(&self) -> usize {
        self.records.len()
    }

    /// Drop every record. The next refresh starts from scratch.
    pub fn clear(&self) {
        self.records.clear();
        debug!("price cache cleared");
    }
}

fn log_abort(e: &WikiError) {
    if e.is_transport() {
        error!(error = %e, "price refresh aborted: fetch failed");
    } else {
        warn!(error = %e, "price refresh aborted: unusable response");
    }
}
