//! Grand Exchange price tracking: the wiki price client, the item name
//! directory and the concurrent price cache read by the overlay.

pub mod cache;
pub mod directory;
pub mod types;
pub mod wiki;

pub use cache::{MergeStats, PriceCache, RefreshOutcome};
pub use directory::ItemNameDirectory;
pub use types::*;
pub use wiki::{WikiApi, WikiClient, WikiEndpoints, WikiError};
