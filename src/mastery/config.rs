use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::Tier;

const DEFAULT_UNLOCK_THRESHOLD: f64 = 90.0;
const DEFAULT_MIN_MASTERED_FOR_EXAM: usize = 25;
const DEFAULT_EXAM_FRACTION: f64 = 0.8;
const DEFAULT_MIN_EXAM_SIZE: usize = 10;
const DEFAULT_SESSION_SIZE: usize = 10;
const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 3000;

/// What the retained count is divided by when computing mastery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DenominatorPolicy {
    /// Number of catalog items in the given tier.
    Tier(Tier),
    /// Number of items in the whole catalog.
    Catalog,
    Fixed(u64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryConfig {
    pub unlock_threshold: f64,
    pub min_mastered_for_exam: usize,
    pub exam_fraction: f64,
    pub min_exam_size: usize,
    pub session_size: usize,
    pub base_tier: Tier,
    pub next_tier: Tier,
    pub denominator: DenominatorPolicy,
    #[serde(with = "duration_ms")]
    pub storage_timeout: Duration,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            unlock_threshold: DEFAULT_UNLOCK_THRESHOLD,
            min_mastered_for_exam: DEFAULT_MIN_MASTERED_FOR_EXAM,
            exam_fraction: DEFAULT_EXAM_FRACTION,
            min_exam_size: DEFAULT_MIN_EXAM_SIZE,
            session_size: DEFAULT_SESSION_SIZE,
            base_tier: 1,
            next_tier: 2,
            denominator: DenominatorPolicy::Tier(1),
            storage_timeout: Duration::from_millis(DEFAULT_STORAGE_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

impl MasteryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let base_tier = env_parse("BASE_TIER")?.unwrap_or(defaults.base_tier);
        let denominator = match env_string("MASTERY_DENOMINATOR") {
            Some(raw) => parse_denominator(&raw, base_tier)?,
            None => DenominatorPolicy::Tier(base_tier),
        };

        let config = Self {
            unlock_threshold: env_parse("MASTERY_UNLOCK_THRESHOLD")?
                .unwrap_or(defaults.unlock_threshold),
            min_mastered_for_exam: env_parse("MIN_MASTERED_FOR_EXAM")?
                .unwrap_or(defaults.min_mastered_for_exam),
            exam_fraction: env_parse("EXAM_FRACTION")?.unwrap_or(defaults.exam_fraction),
            min_exam_size: env_parse("MIN_EXAM_SIZE")?.unwrap_or(defaults.min_exam_size),
            session_size: env_parse("SESSION_SIZE")?.unwrap_or(defaults.session_size),
            base_tier,
            next_tier: env_parse("NEXT_TIER")?.unwrap_or(defaults.next_tier),
            denominator,
            storage_timeout: env_parse::<u64>("STORAGE_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.storage_timeout),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.unlock_threshold.is_finite() || self.unlock_threshold < 0.0 {
            return Err(invalid("MASTERY_UNLOCK_THRESHOLD", self.unlock_threshold));
        }
        if !(self.exam_fraction > 0.0 && self.exam_fraction <= 1.0) {
            return Err(invalid("EXAM_FRACTION", self.exam_fraction));
        }
        if self.session_size == 0 {
            return Err(invalid("SESSION_SIZE", self.session_size));
        }
        if self.storage_timeout.is_zero() {
            return Err(invalid("STORAGE_TIMEOUT_MS", 0));
        }
        if self.next_tier == self.base_tier {
            return Err(invalid("NEXT_TIER", self.next_tier));
        }
        Ok(())
    }
}

pub fn parse_denominator(raw: &str, base_tier: Tier) -> Result<DenominatorPolicy, ConfigError> {
    let value = raw.trim();
    match value.to_ascii_lowercase().as_str() {
        "tier" => return Ok(DenominatorPolicy::Tier(base_tier)),
        "catalog" => return Ok(DenominatorPolicy::Catalog),
        _ => {}
    }
    if let Some(tier) = value.strip_prefix("tier:") {
        return tier
            .trim()
            .parse::<Tier>()
            .map(DenominatorPolicy::Tier)
            .map_err(|_| invalid("MASTERY_DENOMINATOR", value));
    }
    value
        .parse::<u64>()
        .map(DenominatorPolicy::Fixed)
        .map_err(|_| invalid("MASTERY_DENOMINATOR", value))
}

fn invalid(key: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env_string(key) {
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| invalid(key, raw)),
        None => Ok(None),
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = MasteryConfig::default();
        assert_eq!(config.unlock_threshold, 90.0);
        assert_eq!(config.min_mastered_for_exam, 25);
        assert_eq!(config.exam_fraction, 0.8);
        assert_eq!(config.min_exam_size, 10);
        assert_eq!(config.session_size, 10);
        assert_eq!(config.denominator, DenominatorPolicy::Tier(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn denominator_parsing() {
        assert_eq!(parse_denominator("tier", 1), Ok(DenominatorPolicy::Tier(1)));
        assert_eq!(parse_denominator("tier:2", 1), Ok(DenominatorPolicy::Tier(2)));
        assert_eq!(parse_denominator("Catalog", 1), Ok(DenominatorPolicy::Catalog));
        assert_eq!(parse_denominator("100", 1), Ok(DenominatorPolicy::Fixed(100)));
        assert!(parse_denominator("half", 1).is_err());
    }

    #[test]
    fn validate_rejects_bad_fraction_and_session_size() {
        let config = MasteryConfig {
            exam_fraction: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MasteryConfig {
            session_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MasteryConfig {
            unlock_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_next_tier_equal_to_base() {
        let config = MasteryConfig {
            base_tier: 2,
            next_tier: 2,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Invalid {
                key: "NEXT_TIER",
                value: "2".to_string(),
            })
        );
    }
}
