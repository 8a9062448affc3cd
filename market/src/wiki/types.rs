use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::wiki::errors::WikiError;

/// Body of `/latest`. Entries stay as raw JSON so one bad entry can be
/// skipped without rejecting the snapshot.
#[derive(Debug, Deserialize)]
pub struct LatestEnvelope {
    pub data: Map<String, Value>,
}

impl LatestEnvelope {
    pub fn parse(body: &str) -> Result<Self, WikiError> {
        Ok(serde_json::from_str(body)?)
    }
}

/// One entry of the `data` object. Timestamps are ignored.
///
/// Each side decodes on its own: a side that is not a usable number reads as
/// missing instead of rejecting the entry.
#[derive(Debug, Deserialize)]
pub struct RawPrice {
    #[serde(default, deserialize_with = "lenient_price")]
    pub high: Option<i64>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub low: Option<i64>,
}

/// Integral numbers pass through. Fractional ones truncate and values past
/// `i64::MAX` saturate. Anything else is `None`.
fn lenient_price<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let price = match Value::deserialize(de)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    };
    Ok(price)
}

/// One element of `/mapping`. The endpoint carries more fields (examine
/// text, limits, alch values) that nothing here reads.
#[derive(Debug, Deserialize)]
pub struct MappingEntry {
    pub id: u32,
    pub name: String,
}

/// Split the `/mapping` array into raw elements for per-element decoding.
pub fn parse_mapping(body: &str) -> Result<Vec<Value>, WikiError> {
    Ok(serde_json::from_str(body)?)
}
