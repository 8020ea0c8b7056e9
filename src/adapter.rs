//! Activity ingestion
//!
//! Parses JSON and NDJSON activity payloads into lenient [`RawActivity`] records and
//! sanitizes them into [`Activity`] values. Records without a usable timestamp cannot
//! be placed in time; they are reported as [`UnplacedActivity`] instead of failing the
//! whole payload.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ComputeError;
use crate::types::Activity;

/// Longest focus interval a single record may carry; longer values are clamped
pub const MAX_FOCUS_DURATION_SECS: u64 = 24 * 60 * 60;

/// Wire form of an activity as emitted by capture clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawActivity {
    #[serde(default)]
    pub id: i64,
    /// RFC 3339, or a naive `YYYY-MM-DD[T ]HH:MM:SS` taken as UTC
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub window_title: String,
    #[serde(default)]
    pub category: String,
    /// Seconds; may arrive negative or fractional
    #[serde(default)]
    pub focus_duration: Option<f64>,
    #[serde(default)]
    pub total_windows: u32,
    #[serde(default)]
    pub has_screenshot: bool,
}

/// Problems found in a single raw record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActivityIssue {
    #[error("missing timestamp")]
    MissingTimestamp,

    #[error("unparseable timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("missing focus_duration, treated as 0")]
    MissingDuration,

    #[error("negative focus_duration {0}, clamped to 0")]
    NegativeDuration(f64),

    #[error("non-finite focus_duration, clamped to 0")]
    NonFiniteDuration,

    #[error("focus_duration {0} exceeds one day, clamped to 86400")]
    ExcessiveDuration(f64),
}

impl ActivityIssue {
    /// Whether the record is dropped from analysis because of this issue
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ActivityIssue::MissingTimestamp | ActivityIssue::InvalidTimestamp(_)
        )
    }
}

/// Issue found at a given position of the input
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub index: usize,
    pub id: i64,
    pub issue: ActivityIssue,
}

/// A record that could not be placed in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnplacedActivity {
    /// Position in the input
    pub index: usize,
    pub id: i64,
    pub app_name: String,
    pub reason: String,
}

/// Counts describing how an input was ingested
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub received: usize,
    pub accepted: usize,
    pub unplaced: usize,
    pub clamped_durations: usize,
    /// Filled in once the timeline is built
    pub duplicates_dropped: usize,
}

impl IngestSummary {
    /// Summary for activities that were supplied already typed
    pub fn for_activities(count: usize) -> Self {
        Self {
            received: count,
            accepted: count,
            ..Self::default()
        }
    }
}

/// Sanitized input ready for analysis
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub activities: Vec<Activity>,
    pub unplaced: Vec<UnplacedActivity>,
    pub summary: IngestSummary,
}

/// Adapter from wire payloads to activities
pub struct ActivityAdapter;

impl ActivityAdapter {
    /// Parse a JSON array of activities
    pub fn parse_array(json: &str) -> Result<Vec<RawActivity>, ComputeError> {
        let raws: Vec<RawActivity> = serde_json::from_str(json)?;
        Ok(raws)
    }

    /// Parse NDJSON, one activity per non-blank line
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawActivity>, ComputeError> {
        let mut raws = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawActivity>(trimmed) {
                Ok(raw) => raws.push(raw),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(raws)
    }

    /// Every issue in the input, in input order
    pub fn validate(raws: &[RawActivity]) -> Vec<ValidationIssue> {
        raws.iter()
            .enumerate()
            .flat_map(|(index, raw)| {
                inspect(raw).into_iter().map(move |issue| ValidationIssue {
                    index,
                    id: raw.id,
                    issue,
                })
            })
            .collect()
    }

    /// Turn raw records into activities.
    ///
    /// Bad durations are clamped to 0 and the activity is kept. Records without a
    /// usable timestamp are moved to `unplaced`.
    pub fn sanitize(raws: &[RawActivity]) -> Ingested {
        let mut ingested = Ingested {
            summary: IngestSummary {
                received: raws.len(),
                ..IngestSummary::default()
            },
            ..Ingested::default()
        };

        for (index, raw) in raws.iter().enumerate() {
            let timestamp = match parse_timestamp(raw.timestamp.as_deref()) {
                Ok(ts) => ts,
                Err(issue) => {
                    tracing::warn!(index, id = raw.id, %issue, "activity cannot be placed in time");
                    ingested.unplaced.push(UnplacedActivity {
                        index,
                        id: raw.id,
                        app_name: raw.app_name.clone(),
                        reason: issue.to_string(),
                    });
                    continue;
                }
            };

            let (focus_duration, issue) = sanitize_duration(raw.focus_duration);
            if let Some(issue) = issue {
                tracing::warn!(index, id = raw.id, %issue, "sanitized focus duration");
                ingested.summary.clamped_durations += 1;
            }

            ingested.activities.push(Activity {
                id: raw.id,
                timestamp,
                app_name: raw.app_name.clone(),
                window_title: raw.window_title.clone(),
                category: raw.category.clone(),
                focus_duration,
                total_windows: raw.total_windows,
                has_screenshot: raw.has_screenshot,
            });
        }

        ingested.summary.accepted = ingested.activities.len();
        ingested.summary.unplaced = ingested.unplaced.len();
        ingested
    }
}

fn inspect(raw: &RawActivity) -> Vec<ActivityIssue> {
    let mut issues = Vec::new();
    if let Err(issue) = parse_timestamp(raw.timestamp.as_deref()) {
        issues.push(issue);
    }
    if let (_, Some(issue)) = sanitize_duration(raw.focus_duration) {
        issues.push(issue);
    }
    issues
}

/// Parse an RFC 3339 timestamp, or a naive one taken as UTC
pub fn parse_timestamp(value: Option<&str>) -> Result<DateTime<Utc>, ActivityIssue> {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ActivityIssue::MissingTimestamp),
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(ActivityIssue::InvalidTimestamp(value.to_string()))
}

/// Parse a caller-supplied instant such as a range bound
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, ComputeError> {
    parse_timestamp(Some(value))
        .map_err(|issue| ComputeError::InvalidTimestamp(issue.to_string()))
}

/// Round a raw duration to whole seconds.
///
/// Invalid values become 0; values above [`MAX_FOCUS_DURATION_SECS`] are clamped to it.
fn sanitize_duration(value: Option<f64>) -> (u64, Option<ActivityIssue>) {
    match value {
        None => (0, Some(ActivityIssue::MissingDuration)),
        Some(v) if !v.is_finite() => (0, Some(ActivityIssue::NonFiniteDuration)),
        Some(v) if v < 0.0 => (0, Some(ActivityIssue::NegativeDuration(v))),
        Some(v) if v.round() > MAX_FOCUS_DURATION_SECS as f64 => (
            MAX_FOCUS_DURATION_SECS,
            Some(ActivityIssue::ExcessiveDuration(v)),
        ),
        Some(v) => (v.round() as u64, None),
    }
}
