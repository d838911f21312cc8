//! Aggregator configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default number of recent accepted commitments kept per path.
pub const DEFAULT_MAX_RECENT: usize = 64;

/// Default period between QoS snapshots.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(10);

/// Smallest accepted flush period.
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(200);

/// Configuration for the QoS [`Aggregator`](crate::Aggregator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Capacity of the per-path recent-commitments ring.
    pub max_recent: usize,

    /// How often the flush task logs a snapshot. Serialized as milliseconds.
    #[serde(rename = "flush_interval_ms", with = "duration_ms")]
    pub flush_interval: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_recent: DEFAULT_MAX_RECENT,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

impl AggregatorConfig {
    /// Check the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_recent == 0 {
            return Err(ConfigError::ZeroRecentCapacity);
        }
        if self.flush_interval < MIN_FLUSH_INTERVAL {
            return Err(ConfigError::FlushIntervalTooSmall {
                got: self.flush_interval,
                min: MIN_FLUSH_INTERVAL,
            });
        }
        Ok(())
    }
}

/// Serde adapter for a `Duration` stored as integer milliseconds.
pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AggregatorConfig::default();
        assert_eq!(cfg.max_recent, 64);
        assert_eq!(cfg.flush_interval, Duration::from_secs(10));
        cfg.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cfg = AggregatorConfig {
            max_recent: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroRecentCapacity));

        let cfg = AggregatorConfig {
            flush_interval: Duration::from_millis(199),
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::FlushIntervalTooSmall { .. })
        ));
    }

    #[test]
    fn test_deserialize_partial() {
        let cfg: AggregatorConfig = serde_json::from_str(r#"{"flush_interval_ms": 2500}"#).unwrap();
        assert_eq!(cfg.flush_interval, Duration::from_millis(2500));
        assert_eq!(cfg.max_recent, DEFAULT_MAX_RECENT);

        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["flush_interval_ms"], 2500);
    }
}
