use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when the name directory has no entry for an item.
pub const UNKNOWN_ITEM_NAME: &str = "Unknown Item";

/// Grand Exchange item id, the key of every cache in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl ItemId {
    /// Parse a stringified id as found in the keys of a price snapshot.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse::<u32>().ok().map(Self)
    }
}

impl From<u32> for ItemId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which price shape the cache keeps per item. One model per cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceModel {
    /// Latest low/high pair plus their midpoint.
    #[default]
    Spread,
    /// Latest price plus the running all-time high.
    Peak,
}

impl FromStr for PriceModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spread" => Ok(Self::Spread),
            "peak" => Ok(Self::Peak),
            other => Err(format!("unknown price model: {other}")),
        }
    }
}

/// A normalized observation from one snapshot entry.
///
/// Both sides are strictly positive. A one-sided raw entry collapses so that
/// the missing side takes the value of the present one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceObservation {
    low: u64,
    high: u64,
}

impl PriceObservation {
    /// Build an observation from the raw `high` / `low` fields.
    ///
    /// Absent and non-positive values count as missing. Returns `None` when
    /// both sides are missing.
    pub fn from_raw(high: Option<i64>, low: Option<i64>) -> Option<Self> {
        let positive = |v: Option<i64>| v.filter(|p| *p > 0).map(|p| p as u64);

        match (positive(low), positive(high)) {
            (Some(low), Some(high)) => Some(Self { low, high }),
            (Some(only), None) | (None, Some(only)) => Some(Self {
                low: only,
                high: only,
            }),
            (None, None) => None,
        }
    }

    pub fn low(&self) -> u64 {
        self.low
    }

    pub fn high(&self) -> u64 {
        self.high
    }
}

/// Per-item price fields. The variant is fixed by the cache's `PriceModel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceState {
    Spread { low: u64, high: u64, average: u64 },
    Peak { current: u64, all_time_high: u64 },
}

impl PriceState {
    fn initial(model: PriceModel, obs: PriceObservation) -> Self {
        match model {
            PriceModel::Spread => Self::Spread {
                low: obs.low,
                high: obs.high,
                average: midpoint(obs.low, obs.high),
            },
            PriceModel::Peak => Self::Peak {
                current: obs.high,
                all_time_high: obs.high,
            },
        }
    }

    fn apply(&mut self, obs: PriceObservation) {
        match self {
            Self::Spread { low, high, average } => {
                *low = obs.low;
                *high = obs.high;
                *average = midpoint(obs.low, obs.high);
            }
            Self::Peak {
                current,
                all_time_high,
            } => {
                *current = obs.high;
                *all_time_high = (*all_time_high).max(obs.high);
            }
        }
    }

    /// The price the overlay colours by: latest high, or latest price.
    pub fn reference_price(&self) -> u64 {
        match *self {
            Self::Spread { high, .. } => high,
            Self::Peak { current, .. } => current,
        }
    }
}

/// floor((low + high) / 2) without overflowing.
fn midpoint(low: u64, high: u64) -> u64 {
    ((low as u128 + high as u128) / 2) as u64
}

/// Cached price data for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPriceRecord {
    item_id: ItemId,
    item_name: Arc<str>,
    state: PriceState,
    last_updated: DateTime<Utc>,
}

impl ItemPriceRecord {
    pub fn new(
        item_id: ItemId,
        item_name: Arc<str>,
        model: PriceModel,
        obs: PriceObservation,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            item_id,
            item_name,
            state: PriceState::initial(model, obs),
            last_updated: at,
        }
    }

    /// Fold a newer observation into the record.
    pub fn apply(&mut self, obs: PriceObservation, at: DateTime<Utc>) {
        self.state.apply(obs);
        self.last_updated = at;
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn state(&self) -> PriceState {
        self.state
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn average_price(&self) -> Option<u64> {
        match self.state {
            PriceState::Spread { average, .. } => Some(average),
            PriceState::Peak { .. } => None,
        }
    }

    pub fn all_time_high(&self) -> Option<u64> {
        match self.state {
            PriceState::Peak { all_time_high, .. } => Some(all_time_high),
            PriceState::Spread { .. } => None,
        }
    }

    /// Latest high sits above the low/high midpoint.
    pub fn is_above_average(&self) -> bool {
        match self.state {
            PriceState::Spread { high, average, .. } => high > average,
            PriceState::Peak { .. } => false,
        }
    }

    /// Latest price equals the highest price seen since the cache was cleared.
    pub fn is_at_all_time_high(&self) -> bool {
        match self.state {
            PriceState::Peak {
                current,
                all_time_high,
            } => current > 0 && all_time_high > 0 && current >= all_time_high,
            PriceState::Spread { .. } => false,
        }
    }

    pub fn tier(&self) -> PriceTier {
        PriceTier::from_price(self.state.reference_price())
    }
}

/// Seven value bands the overlay maps to highlight colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriceTier {
    Gray,
    White,
    Green,
    Blue,
    Purple,
    Orange,
    Red,
}

impl PriceTier {
    pub fn from_price(price: u64) -> Self {
        match price {
            0..10_000 => Self::Gray,
            10_000..100_000 => Self::White,
            100_000..1_000_000 => Self::Green,
            1_000_000..10_000_000 => Self::Blue,
            10_000_000..100_000_000 => Self::Purple,
            100_000_000..1_000_000_000 => Self::Orange,
            _ => Self::Red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(high: i64, low: i64) -> PriceObservation {
        PriceObservation::from_raw(Some(high), Some(low)).unwrap()
    }

    fn record(model: PriceModel, first: PriceObservation) -> ItemPriceRecord {
        ItemPriceRecord::new(ItemId(4151), Arc::from("Abyssal whip"), model, first, Utc::now())
    }

    #[test]
    fn one_sided_observation_collapses_to_both_bounds() {
        let o = PriceObservation::from_raw(None, Some(500)).unwrap();
        assert_eq!((o.low(), o.high()), (500, 500));

        let o = PriceObservation::from_raw(Some(0), Some(500)).unwrap();
        assert_eq!((o.low(), o.high()), (500, 500));

        let o = PriceObservation::from_raw(Some(900), Some(-3)).unwrap();
        assert_eq!((o.low(), o.high()), (900, 900));
    }

    #[test]
    fn observation_without_positive_side_is_rejected() {
        assert!(PriceObservation::from_raw(None, None).is_none());
        assert!(PriceObservation::from_raw(Some(0), Some(0)).is_none());
        assert!(PriceObservation::from_raw(Some(-1), None).is_none());
    }

    #[test]
    fn spread_record_floors_average() {
        let r = record(PriceModel::Spread, obs(101, 100));

        assert_eq!(r.average_price(), Some(100));
        assert!(r.is_above_average());
        assert!(!r.is_at_all_time_high());
        assert_eq!(r.all_time_high(), None);
    }

    #[test]
    fn flat_spread_is_not_above_average() {
        let r = record(PriceModel::Spread, obs(500, 500));
        assert!(!r.is_above_average());
    }

    #[test]
    fn peak_record_tracks_running_max() {
        let mut r = record(PriceModel::Peak, obs(1_000, 900));
        assert!(r.is_at_all_time_high());

        r.apply(obs(800, 700), Utc::now());
        assert_eq!(
            r.state(),
            PriceState::Peak {
                current: 800,
                all_time_high: 1_000
            }
        );
        assert!(!r.is_at_all_time_high());

        r.apply(obs(1_000, 950), Utc::now());
        assert!(r.is_at_all_time_high());
        assert!(!r.is_above_average());
    }

    #[test]
    fn apply_stamps_last_updated() {
        let mut r = record(PriceModel::Spread, obs(10, 10));
        let later = r.last_updated() + chrono::Duration::seconds(300);

        r.apply(obs(20, 10), later);
        assert_eq!(r.last_updated(), later);
    }

    #[test]
    fn midpoint_does_not_overflow() {
        assert_eq!(midpoint(u64::MAX, u64::MAX), u64::MAX);
        assert_eq!(midpoint(u64::MAX, u64::MAX - 1), u64::MAX - 1);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(PriceTier::from_price(9_999), PriceTier::Gray);
        assert_eq!(PriceTier::from_price(10_000), PriceTier::White);
        assert_eq!(PriceTier::from_price(100_000), PriceTier::Green);
        assert_eq!(PriceTier::from_price(1_000_000), PriceTier::Blue);
        assert_eq!(PriceTier::from_price(10_000_000), PriceTier::Purple);
        assert_eq!(PriceTier::from_price(100_000_000), PriceTier::Orange);
        assert_eq!(PriceTier::from_price(999_999_999), PriceTier::Orange);
        assert_eq!(PriceTier::from_price(1_000_000_000), PriceTier::Red);
    }

    #[test]
    fn record_tier_uses_reference_price() {
        let r = record(PriceModel::Spread, obs(150_000, 90_000));
        assert_eq!(r.tier(), PriceTier::Green);
    }

    #[test]
    fn price_model_parses_case_insensitively() {
        assert_eq!("Spread".parse::<PriceModel>(), Ok(PriceModel::Spread));
        assert_eq!(" PEAK ".parse::<PriceModel>(), Ok(PriceModel::Peak));
        assert!("median".parse::<PriceModel>().is_err());
    }

    #[test]
    fn item_id_parse_rejects_non_integers() {
        assert_eq!(ItemId::parse("4151"), Some(ItemId(4151)));
        assert_eq!(ItemId::parse("-1"), None);
        assert_eq!(ItemId::parse("abc"), None);
        assert_eq!(ItemId::parse(""), None);
    }
}
