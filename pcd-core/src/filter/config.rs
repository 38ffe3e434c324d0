use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SAMPLE_NUM: usize = 1000;

/// Runtime reconfiguration message for the random filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub sample_num: i64,
}

impl ConfigUpdate {
    pub fn validate(&self) -> Result<usize, ConfigError> {
        if self.sample_num <= 0 {
            return Err(ConfigError::NonPositiveSampleNum(self.sample_num));
        }
        usize::try_from(self.sample_num)
            .map_err(|_| ConfigError::SampleNumOutOfRange(self.sample_num))
    }
}

/// Target output point count shared between the config handler and the
/// cloud handler.
///
/// Single writer, single reader: relaxed loads and stores are enough, and a
/// cloud only ever sees the value it snapshotted before it started.
#[derive(Debug)]
pub struct SamplerConfig {
    target_count: AtomicUsize,
}

impl SamplerConfig {
    pub fn new(target_count: usize) -> Self {
        Self {
            target_count: AtomicUsize::new(target_count),
        }
    }

    pub fn get(&self) -> usize {
        self.target_count.load(Ordering::Relaxed)
    }

    /// Overwrites the target count as-is. Use [`SamplerConfig::apply`] for
    /// values coming from outside the process.
    pub fn set(&self, target_count: usize) {
        self.target_count.store(target_count, Ordering::Relaxed);
    }

    /// Validates `update` and stores it. On error the previous value is kept.
    pub fn apply(&self, update: &ConfigUpdate) -> Result<usize, ConfigError> {
        let target_count = update.validate()?;
        self.set(target_count);
        Ok(target_count)
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_NUM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_thousand() {
        assert_eq!(SamplerConfig::default().get(), 1000);
    }

    #[test]
    fn set_overwrites_without_checks() {
        let config = SamplerConfig::default();
        config.set(0);
        assert_eq!(config.get(), 0);
        config.set(42);
        assert_eq!(config.get(), 42);
    }

    #[test]
    fn apply_accepts_positive_values() {
        let config = SamplerConfig::default();
        assert_eq!(config.apply(&ConfigUpdate { sample_num: 250 }), Ok(250));
        assert_eq!(config.get(), 250);
    }

    #[test]
    fn apply_rejects_non_positive_values_and_keeps_previous() {
        let config = SamplerConfig::new(300);

        assert_eq!(
            config.apply(&ConfigUpdate { sample_num: 0 }),
            Err(ConfigError::NonPositiveSampleNum(0))
        );
        assert_eq!(
            config.apply(&ConfigUpdate { sample_num: -5 }),
            Err(ConfigError::NonPositiveSampleNum(-5))
        );
        assert_eq!(config.get(), 300);
    }

    #[test]
    fn update_deserializes_from_json() {
        let update: ConfigUpdate = serde_json::from_str(r#"{"sample_num": 500}"#).unwrap();
        assert_eq!(update.sample_num, 500);
    }
}
