//! Engine configuration

use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::context::DEFAULT_CONTEXT_WINDOW_SECS;
use crate::error::ComputeError;
use crate::segmentation::DEFAULT_GAP_THRESHOLD_SECS;
use crate::transitions::DEFAULT_TOP_N;
use crate::types::Granularity;

/// Largest accepted UTC offset magnitude (±14:00)
const MAX_OFFSET_MINUTES: u32 = 14 * 60;

/// Options recognized by the analysis pipeline.
///
/// Every field has a default, so a partial JSON object (or `{}`) is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Session split threshold in seconds
    pub gap_threshold_secs: i64,
    /// Number of transitions reported
    pub top_n: usize,
    /// Screenshot context half-width in seconds
    pub context_window_secs: i64,
    /// Fixed offset from UTC used for calendar boundaries and local hours
    pub utc_offset_minutes: i32,
    /// When set, the report also carries buckets at this granularity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granularity: Option<Granularity>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gap_threshold_secs: DEFAULT_GAP_THRESHOLD_SECS,
            top_n: DEFAULT_TOP_N,
            context_window_secs: DEFAULT_CONTEXT_WINDOW_SECS,
            utc_offset_minutes: 0,
            granularity: None,
        }
    }
}

impl EngineConfig {
    /// Load and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.gap_threshold_secs <= 0 {
            return Err(ComputeError::InvalidConfig(format!(
                "gap_threshold_secs must be positive, got {}",
                self.gap_threshold_secs
            )));
        }
        if self.context_window_secs < 0 {
            return Err(ComputeError::InvalidConfig(format!(
                "context_window_secs must not be negative, got {}",
                self.context_window_secs
            )));
        }
        if self.utc_offset_minutes.unsigned_abs() > MAX_OFFSET_MINUTES {
            return Err(ComputeError::InvalidConfig(format!(
                "utc_offset_minutes must be within ±{}, got {}",
                MAX_OFFSET_MINUTES, self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    pub fn gap_threshold(&self) -> Duration {
        Duration::seconds(self.gap_threshold_secs)
    }

    pub fn context_window(&self) -> Duration {
        Duration::seconds(self.context_window_secs)
    }

    /// The configured offset; out-of-range values fall back to UTC
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or(Utc.fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.gap_threshold(), Duration::minutes(15));
        assert_eq!(config.top_n, 10);
        assert_eq!(config.context_window(), Duration::minutes(30));
        assert_eq!(config.utc_offset(), FixedOffset::east_opt(0).unwrap());
        assert_eq!(config.granularity, None);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EngineConfig::from_json(
            r#"{"top_n": 3, "granularity": "day", "utc_offset_minutes": -300}"#,
        )
        .unwrap();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.granularity, Some(Granularity::Day));
        assert_eq!(config.gap_threshold_secs, 900);
        assert_eq!(config.utc_offset().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = EngineConfig::from_json(r#"{"gap_threshold_secs": 0}"#).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidConfig(_)));

        let err = EngineConfig::from_json(r#"{"utc_offset_minutes": 2000}"#).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidConfig(_)));

        let err = EngineConfig::from_json(r#"{"granularity": "fortnight"}"#).unwrap_err();
        assert!(matches!(err, ComputeError::JsonError(_)));
    }

    #[test]
    fn test_round_trip() {
        let config = EngineConfig {
            granularity: Some(Granularity::Week),
            ..EngineConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}
