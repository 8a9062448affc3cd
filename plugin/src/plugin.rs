//! Plugin host: owns the price core and drives its lifecycle.
//!
//! ```text
//! start:  PeriodicTask(PriceRefreshJob) ── prepare ─▶ ItemNameDirectory::load
//!                                       └─ every tick ─▶ PriceCache::refresh
//! render: overlay ── lookup / is_at_all_time_high / tier ─▶ PriceCache
//! stop:   cancel task ─▶ wait for in-flight refresh ─▶ PriceCache::clear
//! ```

use std::sync::Arc;

use market::{ItemNameDirectory, PriceCache, WikiApi, WikiClient};
use scheduler::{PeriodicTask, TaskHandle};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::PluginConfig;
use crate::error::PluginError;
use crate::jobs::PriceRefreshJob;

/// Client connection states the host reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    LoginScreen,
    Loading,
    LoggedIn,
    Hopping,
}

pub struct SellNowPlugin<A: WikiApi = WikiClient> {
    config: PluginConfig,
    names: Arc<ItemNameDirectory<A>>,
    prices: Arc<PriceCache<A>>,
    /// Held across the whole of `start` and `stop`, so the two never
    /// interleave.
    task: Mutex<Option<TaskHandle>>,
}

impl SellNowPlugin<WikiClient> {
    pub fn new(config: PluginConfig) -> Result<Self, PluginError> {
        let api = Arc::new(WikiClient::new(config.endpoints.clone())?);
        Ok(Self::with_api(config, api))
    }
}

impl<A: WikiApi> SellNowPlugin<A> {
    pub fn with_api(config: PluginConfig, api: Arc<A>) -> Self {
        let names = Arc::new(ItemNameDirectory::new(Arc::clone(&api)));
        let prices = Arc::new(PriceCache::new(api, Arc::clone(&names), config.price_model));

        Self {
            config,
            names,
            prices,
            task: Mutex::new(None),
        }
    }

    /// Spawn background price tracking. Waits for a `stop` in progress.
    pub async fn start(&self) -> Result<(), PluginError> {
        let mut task = self.task.lock().await;
        if task.is_some() {
            return Err(PluginError::AlreadyRunning);
        }

        let every = self.config.refresh_interval();
        let job = Arc::new(PriceRefreshJob::new(
            Arc::clone(&self.prices),
            Arc::clone(&self.names),
        ));
        *task = Some(PeriodicTask::new(job, every).spawn());

        info!(
            interval_minutes = every.as_secs() / 60,
            model = ?self.config.price_model,
            "price tracking started"
        );

        Ok(())
    }

    /// Cancel background tracking and clear the cache.
    ///
    /// Waits for a refresh that is already running so it cannot repopulate
    /// the cache after the clear. A `start` issued meanwhile runs only once
    /// the clear is done. Safe to call when not running.
    pub async fn stop(&self) {
        let mut task = self.task.lock().await;

        if let Some(handle) = task.take() {
            debug!("price update task cancelled");
            if let Err(e) = handle.shutdown().await {
                error!(error = %e, "price update task ended abnormally");
            }
        }

        self.prices.clear();
        info!("price tracking stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.task.lock().await.is_some()
    }

    pub fn on_game_state_changed(&self, state: GameState) {
        if state == GameState::LoggedIn {
            info!(
                tracked = self.prices.tracked_count(),
                "player logged in; price data available"
            );
        }
    }

    /// Read handle for the overlay.
    pub fn prices(&self) -> Arc<PriceCache<A>> {
        Arc::clone(&self.prices)
    }

    pub fn names(&self) -> Arc<ItemNameDirectory<A>> {
        Arc::clone(&self.names)
    }
}
