pub mod client;
pub mod errors;
pub mod types;

pub use client::{WikiApi, WikiClient, WikiEndpoints};
pub use errors::WikiError;
pub use types::*;
