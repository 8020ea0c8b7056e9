//! Core data types for Compass Flux
//!
//! This module defines the activity record consumed by the engine and every entity the
//! engine derives from it. All derived types are plain values: they are recomputed from
//! scratch on each invocation and carry no identity beyond their contents.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ComputeError;

/// Label substituted for a missing or blank app name or category
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Resolve a free-form label, falling back to [`UNKNOWN_LABEL`] when blank
pub(crate) fn label_or_unknown(label: &str) -> &str {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        UNKNOWN_LABEL
    } else {
        trimmed
    }
}

// ============================================================================
// Input
// ============================================================================

/// One recorded interval of user focus on an application window.
///
/// Activities are immutable inputs. The engine sorts its own copies and never
/// mutates the caller's slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Upstream record identifier
    pub id: i64,
    /// When the activity was captured
    pub timestamp: DateTime<Utc>,
    /// Application name (e.g. "Code", "Google Chrome")
    pub app_name: String,
    /// Title of the focused window
    #[serde(default)]
    pub window_title: String,
    /// Category assigned by the upstream categorizer
    #[serde(default)]
    pub category: String,
    /// Seconds of focus attributed to this activity
    pub focus_duration: u64,
    /// Number of open windows at capture time
    #[serde(default)]
    pub total_windows: u32,
    /// Whether a screenshot was captured with this activity
    #[serde(default)]
    pub has_screenshot: bool,
}

impl Activity {
    /// Create an activity with the required fields; optional fields take their defaults
    pub fn new(
        id: i64,
        timestamp: DateTime<Utc>,
        app_name: impl Into<String>,
        category: impl Into<String>,
        focus_duration: u64,
    ) -> Self {
        Self {
            id,
            timestamp,
            app_name: app_name.into(),
            window_title: String::new(),
            category: category.into(),
            focus_duration,
            total_windows: 0,
            has_screenshot: false,
        }
    }

    /// Mark the activity as carrying a screenshot
    pub fn with_screenshot(mut self) -> Self {
        self.has_screenshot = true;
        self
    }

    /// App name, or `"Unknown"` when blank
    pub fn app(&self) -> &str {
        label_or_unknown(&self.app_name)
    }

    /// Category, or `"Unknown"` when blank
    pub fn category_label(&self) -> &str {
        label_or_unknown(&self.category)
    }
}

// ============================================================================
// Granularity
// ============================================================================

/// Time bucketing granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    /// Every granularity, finest first
    pub const ALL: [Granularity; 6] = [
        Granularity::Minute,
        Granularity::Hour,
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Year,
    ];

    /// Lowercase name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Minute => "minute",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minute" => Ok(Granularity::Minute),
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            _ => Err(ComputeError::InvalidGranularity(s.to_string())),
        }
    }
}

// ============================================================================
// Breakdowns and buckets
// ============================================================================

/// Time attributed to one app within a bucket or session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppShare {
    pub app: String,
    /// Seconds
    pub duration: u64,
    /// Share of the enclosing total (0-100)
    pub percentage: f64,
    /// Category of the app's most recent activity
    pub category: String,
}

/// Time attributed to one category within a bucket or session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    /// Seconds
    pub duration: u64,
    /// Share of the enclosing total (0-100)
    pub percentage: f64,
}

/// Aggregate of all activities falling into one time bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketAggregate {
    /// Canonical bucket key (see [`crate::bucketing::Bucketer::key_for`])
    pub key: String,
    pub granularity: Granularity,
    /// Inclusive bucket start
    pub start: DateTime<Utc>,
    /// Exclusive bucket end
    pub end: DateTime<Utc>,
    /// Total focus seconds in the bucket
    pub total_time: u64,
    /// Ordered by duration descending, ties by first occurrence
    pub app_breakdown: Vec<AppShare>,
    /// Ordered by duration descending, ties by first occurrence
    pub category_breakdown: Vec<CategoryShare>,
    pub activity_count: u32,
    pub screenshot_ids: BTreeSet<i64>,
}

impl BucketAggregate {
    /// Whether no activity landed in this bucket
    pub fn is_empty(&self) -> bool {
        self.activity_count == 0
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// Coarse focus quality of a work session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusQuality {
    High,
    Medium,
    Low,
}

/// Classification of a work session by its dominant app and category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    DeepWork,
    Collaboration,
    Browsing,
    Mixed,
}

/// A maximal run of activities with no internal gap above the gap threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSession {
    /// `session-<start unix millis>`
    pub id: String,
    /// Timestamp of the first activity
    pub start: DateTime<Utc>,
    /// Timestamp of the last activity
    pub end: DateTime<Utc>,
    /// Sum of focus seconds
    pub duration: u64,
    /// Activities in chronological order
    pub activities: Vec<Activity>,
    pub dominant_app: String,
    pub dominant_category: String,
    pub app_breakdown: Vec<AppShare>,
    pub category_breakdown: Vec<CategoryShare>,
    /// 0-100, where an average focus of five minutes scores 100
    pub productivity_score: f64,
    pub context_switches: u32,
    pub screenshot_ids: BTreeSet<i64>,
    pub focus_quality: FocusQuality,
    pub session_type: SessionType,
}

// ============================================================================
// Transitions
// ============================================================================

/// Aggregated app-to-app switch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from_app: String,
    pub to_app: String,
    pub frequency: u32,
    /// Running mean of the destination activity's focus seconds
    pub avg_duration: f64,
    /// Category of the most recent destination activity
    pub category: String,
}

/// Display tier of a transition relative to the most frequent one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionQuality {
    Problematic,
    High,
    Moderate,
    Good,
    Excellent,
}

/// Headline statistics over the full transition table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSummary {
    pub total_transitions: u32,
    pub unique_pairs: u32,
    /// Frequency-weighted mean of `avg_duration`
    pub weighted_avg_duration: f64,
    /// Pairs whose frequency exceeds 60% of the maximum
    pub problematic_pairs: u32,
    /// App most often switched away from
    pub most_distracting_app: Option<String>,
    /// App most often switched to
    pub most_attractive_app: Option<String>,
}

// ============================================================================
// Energy, efficiency and trends
// ============================================================================

/// Energy and productivity for one hourly bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyMetric {
    /// Start of the hour
    pub timestamp: DateTime<Utc>,
    /// 0-100
    pub energy_level: f64,
    /// 0-100
    pub productivity: f64,
    pub context_switches: u32,
    /// 0-1
    pub flow_state: f64,
}

/// Efficiency of a single app across the input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppEfficiency {
    pub app: String,
    /// 0-100, share of focus time that falls under the ten-minute cap
    pub efficiency: f64,
    /// Minutes
    pub time_spent: f64,
    /// 0-100
    pub output_score: f64,
    /// Seconds per usage run
    pub avg_focus_duration: f64,
}

/// Efficiency for one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTrendPoint {
    pub day: Weekday,
    /// Seconds
    pub total_time: u64,
    /// 0-100
    pub efficiency: f64,
    pub activity_count: u32,
}

/// Mean focus quality for one (weekday, hour) cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusPattern {
    pub day: Weekday,
    /// Local hour, 0-23
    pub hour: u32,
    /// 0-100
    pub focus_score: f64,
    /// Seconds
    pub total_time: u64,
    pub activity_count: u32,
}

/// Qualitative strength of a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
    VeryWeak,
}

/// Energy range associated with high productivity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyZone {
    pub min: f64,
    pub max: f64,
}

/// Cross-bucket energy/productivity statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyCorrelation {
    /// Pearson coefficient in [-1, 1]
    pub correlation: f64,
    pub strength: CorrelationStrength,
    pub optimal_zone: EnergyZone,
    /// Bucket with the highest productivity (earliest on ties)
    pub peak: Option<EnergyMetric>,
    pub average_energy: f64,
}

// ============================================================================
// Insights
// ============================================================================

/// Kind of insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    Optimization,
    Pattern,
    Recommendation,
}

/// Expected impact of acting on an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Low,
    Medium,
    High,
}

/// Human-readable recommendation derived from the aggregated metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    pub category: String,
}

// ============================================================================
// Screenshot context
// ============================================================================

/// Activities surrounding a screenshot within the context window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotContext {
    pub screenshot_id: i64,
    pub timestamp: DateTime<Utc>,
    /// Nearest first
    pub before: Vec<Activity>,
    /// Nearest first
    pub after: Vec<Activity>,
    /// Seconds across before, screenshot and after
    pub total_duration: u64,
    /// Up to three apps by duration
    pub dominant_apps: Vec<String>,
    /// 0-100
    pub productivity_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_granularity_round_trips_through_str() {
        for granularity in Granularity::ALL {
            let parsed: Granularity = granularity.as_str().parse().unwrap();
            assert_eq!(parsed, granularity);
        }
        assert_eq!("HOUR".parse::<Granularity>().unwrap(), Granularity::Hour);
    }

    #[test]
    fn test_unknown_granularity_is_rejected() {
        let err = "fortnight".parse::<Granularity>().unwrap_err();
        assert!(matches!(err, ComputeError::InvalidGranularity(ref g) if g == "fortnight"));
    }

    #[test]
    fn test_session_type_serialization() {
        let json = serde_json::to_string(&SessionType::DeepWork).unwrap();
        assert_eq!(json, "\"deep-work\"");
    }

    #[test]
    fn test_insight_type_field_is_renamed() {
        let insight = Insight {
            insight_type: InsightType::Pattern,
            title: "t".to_string(),
            description: "d".to_string(),
            impact: Impact::Low,
            category: "c".to_string(),
        };
        let value = serde_json::to_value(&insight).unwrap();
        assert_eq!(value["type"], "pattern");
        assert_eq!(value["impact"], "low");
    }

    #[test]
    fn test_blank_labels_fall_back_to_unknown() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let activity = Activity::new(1, ts, "  ", "", 30);
        assert_eq!(activity.app(), UNKNOWN_LABEL);
        assert_eq!(activity.category_label(), UNKNOWN_LABEL);
    }

    #[test]
    fn test_impact_ordering() {
        assert!(Impact::High > Impact::Medium);
        assert!(Impact::Medium > Impact::Low);
    }
}
