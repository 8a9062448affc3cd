use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use market::{PriceModel, WikiEndpoints};

/// The prices wiki asks clients not to poll more often than this.
pub const MIN_UPDATE_INTERVAL_MINUTES: u64 = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct PluginConfig {
    // =========================
    // Price tracking
    // =========================
    /// Minutes between price refreshes, as configured.
    ///
    /// Values below [`MIN_UPDATE_INTERVAL_MINUTES`] are accepted here but
    /// raised to the floor by [`PluginConfig::refresh_interval`].
    pub update_interval_minutes: u64,

    /// Price shape kept per item: low/high/average or current/all-time-high.
    pub price_model: PriceModel,

    /// Wiki URLs and the User-Agent sent with every request.
    pub endpoints: WikiEndpoints,

    // =========================
    // Overlay
    // =========================
    /// Passed through to the renderer; the price core never reads these.
    pub highlight_enabled: bool,
    pub show_tooltip: bool,
    pub highlight_thickness: u32,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            update_interval_minutes: MIN_UPDATE_INTERVAL_MINUTES,
            price_model: PriceModel::default(),
            endpoints: WikiEndpoints::default(),
            highlight_enabled: true,
            show_tooltip: true,
            highlight_thickness: 2,
        }
    }
}

impl PluginConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys take the default;
    /// unparseable ones take the default and log a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let endpoints = WikiEndpoints {
            latest_url: lookup("SELLNOW_LATEST_URL").unwrap_or(defaults.endpoints.latest_url),
            mapping_url: lookup("SELLNOW_MAPPING_URL").unwrap_or(defaults.endpoints.mapping_url),
            user_agent: lookup("SELLNOW_USER_AGENT").unwrap_or(defaults.endpoints.user_agent),
        };

        Self {
            update_interval_minutes: parse_or(
                &lookup,
                "SELLNOW_UPDATE_INTERVAL_MINUTES",
                defaults.update_interval_minutes,
            ),
            price_model: parse_or(&lookup, "SELLNOW_PRICE_MODEL", defaults.price_model),
            endpoints,
            highlight_enabled: parse_or(
                &lookup,
                "SELLNOW_HIGHLIGHT_ENABLED",
                defaults.highlight_enabled,
            ),
            show_tooltip: parse_or(&lookup, "SELLNOW_SHOW_TOOLTIP", defaults.show_tooltip),
            highlight_thickness: parse_or(
                &lookup,
                "SELLNOW_HIGHLIGHT_THICKNESS",
                defaults.highlight_thickness,
            ),
        }
    }

    /// Effective refresh cadence, never below the five minute floor.
    pub fn refresh_interval(&self) -> Duration {
        let minutes = self.update_interval_minutes.max(MIN_UPDATE_INTERVAL_MINUTES);
        Duration::from_secs(minutes * 60)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "invalid config value; using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> PluginConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PluginConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let cfg = from_pairs(&[]);

        assert_eq!(cfg, PluginConfig::default());
        assert_eq!(cfg.endpoints.user_agent, "RuneLite Sell-Now Plugin");
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(300));
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = from_pairs(&[
            ("SELLNOW_UPDATE_INTERVAL_MINUTES", "15"),
            ("SELLNOW_PRICE_MODEL", "peak"),
            ("SELLNOW_LATEST_URL", "http://localhost:9000/latest"),
            ("SELLNOW_SHOW_TOOLTIP", "false"),
            ("SELLNOW_HIGHLIGHT_THICKNESS", "4"),
        ]);

        assert_eq!(cfg.refresh_interval(), Duration::from_secs(15 * 60));
        assert_eq!(cfg.price_model, PriceModel::Peak);
        assert_eq!(cfg.endpoints.latest_url, "http://localhost:9000/latest");
        assert!(!cfg.show_tooltip);
        assert!(cfg.highlight_enabled);
        assert_eq!(cfg.highlight_thickness, 4);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let cfg = from_pairs(&[
            ("SELLNOW_UPDATE_INTERVAL_MINUTES", "soon"),
            ("SELLNOW_PRICE_MODEL", "median"),
            ("SELLNOW_HIGHLIGHT_ENABLED", "yes please"),
        ]);

        assert_eq!(cfg.update_interval_minutes, MIN_UPDATE_INTERVAL_MINUTES);
        assert_eq!(cfg.price_model, PriceModel::Spread);
        assert!(cfg.highlight_enabled);
    }

    #[test]
    fn refresh_interval_is_floored() {
        for minutes in [0, 1, 4] {
            let cfg = PluginConfig {
                update_interval_minutes: minutes,
                ..PluginConfig::default()
            };
            assert_eq!(cfg.refresh_interval(), Duration::from_secs(300));
        }
    }
}
