//! Report encoding
//!
//! Wraps an [`AnalysisReport`] in an envelope carrying producer and provenance
//! metadata. Encoding is deterministic: the envelope holds no wall-clock time or
//! generated identifiers, so the same input always encodes to the same bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::ComputeError;
use crate::pipeline::AnalysisReport;
use crate::{ENGINE_VERSION, PRODUCER_NAME};

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Software that produced the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// What the report was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProvenance {
    /// Timestamp of the earliest analyzed activity
    pub first_activity_utc: Option<DateTime<Utc>>,
    /// Timestamp of the latest analyzed activity
    pub last_activity_utc: Option<DateTime<Utc>>,
    pub activity_count: usize,
    pub config: EngineConfig,
}

/// Top-level output document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub schema_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub report: AnalysisReport,
}

/// Encoder producing report envelopes
#[derive(Debug, Clone, Default)]
pub struct ReportEncoder {
    instance_id: Option<String>,
}

impl ReportEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag every envelope with a caller-chosen instance identifier
    pub fn with_instance_id(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: Some(instance_id.into()),
        }
    }

    /// Wrap a report in an envelope
    pub fn encode(&self, report: &AnalysisReport, config: &EngineConfig) -> ReportEnvelope {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            first_activity_utc: report.sessions.first().map(|s| s.start),
            last_activity_utc: report.sessions.last().map(|s| s.end),
            activity_count: report
                .sessions
                .iter()
                .map(|s| s.activities.len())
                .sum(),
            config: config.clone(),
        };

        ReportEnvelope {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            producer,
            provenance,
            report: report.clone(),
        }
    }

    /// Encode to pretty-printed JSON
    pub fn encode_to_json(
        &self,
        report: &AnalysisReport,
        config: &EngineConfig,
    ) -> Result<String, ComputeError> {
        let envelope = self.encode(report, config);
        serde_json::to_string_pretty(&envelope).map_err(ComputeError::JsonError)
    }

    /// Encode to single-line JSON
    pub fn encode_to_compact_json(
        &self,
        report: &AnalysisReport,
        config: &EngineConfig,
    ) -> Result<String, ComputeError> {
        let envelope = self.encode(report, config);
        serde_json::to_string(&envelope).map_err(ComputeError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analyze;
    use crate::types::Activity;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn sample_activities() -> Vec<Activity> {
        let base = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        vec![
            Activity::new(1, base, "Code", "Development", 400),
            Activity::new(2, base + Duration::minutes(5), "Slack", "Communication", 200),
            Activity::new(3, base + Duration::hours(2), "Code", "Development", 100),
        ]
    }

    #[test]
    fn test_encode_envelope() {
        let config = EngineConfig::default();
        let report = analyze(&sample_activities(), &config);
        let envelope = ReportEncoder::new().encode(&report, &config);

        assert_eq!(envelope.schema_version, REPORT_SCHEMA_VERSION);
        assert_eq!(envelope.producer.name, PRODUCER_NAME);
        assert_eq!(envelope.producer.version, ENGINE_VERSION);
        assert_eq!(envelope.producer.instance_id, None);
        assert_eq!(envelope.provenance.activity_count, 3);
        assert_eq!(
            envelope.provenance.first_activity_utc,
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap())
        );
        assert_eq!(
            envelope.provenance.last_activity_utc,
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 11, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let config = EngineConfig::default();
        let encoder = ReportEncoder::new();
        let first = encoder
            .encode_to_json(&analyze(&sample_activities(), &config), &config)
            .unwrap();
        let second = encoder
            .encode_to_json(&analyze(&sample_activities(), &config), &config)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig::default();
        let report = analyze(&sample_activities(), &config);
        let json = ReportEncoder::with_instance_id("test-instance")
            .encode_to_compact_json(&report, &config)
            .unwrap();
        assert!(!json.contains('\n'));

        let parsed: ReportEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.producer.instance_id.as_deref(), Some("test-instance"));
        assert_eq!(parsed.report.sessions.len(), report.sessions.len());
    }
}
