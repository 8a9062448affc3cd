pub mod config;
pub mod error;
pub mod jobs;
pub mod plugin;

pub use config::PluginConfig;
pub use error::PluginError;
pub use plugin::{GameState, SellNowPlugin};
