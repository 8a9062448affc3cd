use std::sync::Arc;

use async_trait::async_trait;
use market::{ItemNameDirectory, PriceCache, RefreshOutcome, WikiApi};
use scheduler::Job;
use tracing::debug;

/// Loads the name directory once, then refreshes prices on every tick.
pub struct PriceRefreshJob<A: WikiApi> {
    prices: Arc<PriceCache<A>>,
    names: Arc<ItemNameDirectory<A>>,
}

impl<A: WikiApi> PriceRefreshJob<A> {
    pub fn new(prices: Arc<PriceCache<A>>, names: Arc<ItemNameDirectory<A>>) -> Self {
        Self { prices, names }
    }
}

#[async_trait]
impl<A: WikiApi> Job for PriceRefreshJob<A> {
    fn name(&self) -> &'static str {
        "price_refresh"
    }

    async fn prepare(&self) {
        // Names must be in place before the first records are created;
        // they are never backfilled.
        self.names.load().await;
    }

    async fn run(&self) {
        if let RefreshOutcome::Skipped = self.prices.refresh().await {
            debug!("previous refresh still running");
        }
    }
}
