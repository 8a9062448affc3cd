use common::init_logger;
use sellnow::{PluginConfig, SellNowPlugin};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_logger("sellnow", is_production);

    tracing::info!("Starting Sell Now price tracker...");

    let cfg = PluginConfig::from_env();
    let plugin = SellNowPlugin::new(cfg)?;

    plugin.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!(
        tracked = plugin.prices().tracked_count(),
        "Shutdown signal received"
    );

    plugin.stop().await;

    Ok(())
}
