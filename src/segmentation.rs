//! Session segmentation
//!
//! Partitions a chronologically sorted activity sequence into work sessions. A new
//! session starts whenever the gap between two consecutive activities reaches the gap
//! threshold, so every gap inside a session is strictly shorter than the threshold.

use chrono::{DateTime, Duration, Utc};

use crate::bucketing::Breakdown;
use crate::keywords;
use crate::timeline::ActivityTimeline;
use crate::types::{Activity, FocusQuality, SessionType, WorkSession, UNKNOWN_LABEL};

/// Default maximum gap between consecutive activities of one session
pub const DEFAULT_GAP_THRESHOLD_SECS: i64 = 15 * 60;

/// Average focus (seconds) that scores a productivity of 100
const FULL_PRODUCTIVITY_FOCUS_SECS: f64 = 300.0;
const HIGH_FOCUS_SECS: f64 = 600.0;
const MEDIUM_FOCUS_SECS: f64 = 180.0;

/// Splits a timeline into work sessions
#[derive(Debug, Clone, Copy)]
pub struct SessionSegmenter {
    gap_threshold: Duration,
}

impl Default for SessionSegmenter {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_GAP_THRESHOLD_SECS))
    }
}

impl SessionSegmenter {
    pub fn new(gap_threshold: Duration) -> Self {
        Self { gap_threshold }
    }

    pub fn gap_threshold(&self) -> Duration {
        self.gap_threshold
    }

    /// Segment a prepared timeline into ordered, non-overlapping sessions
    pub fn segment(&self, timeline: &ActivityTimeline) -> Vec<WorkSession> {
        let mut sessions = Vec::new();
        let mut current: Vec<Activity> = Vec::new();

        for activity in timeline.activities() {
            if let Some(previous) = current.last() {
                if activity.timestamp - previous.timestamp >= self.gap_threshold {
                    sessions.push(build_session(std::mem::take(&mut current)));
                }
            }
            current.push(activity.clone());
        }

        if !current.is_empty() {
            sessions.push(build_session(current));
        }

        tracing::debug!(
            sessions = sessions.len(),
            activities = timeline.len(),
            "segmented sessions"
        );

        sessions
    }
}

/// Segment activities into sessions using `gap_threshold`
pub fn segment(activities: &[Activity], gap_threshold: Duration) -> Vec<WorkSession> {
    SessionSegmenter::new(gap_threshold).segment(&ActivityTimeline::new(activities))
}

/// Find the session whose `[start, end]` range contains `instant`
pub fn find_session_at(sessions: &[WorkSession], instant: DateTime<Utc>) -> Option<&WorkSession> {
    sessions
        .iter()
        .find(|s| s.start <= instant && instant <= s.end)
}

fn build_session(activities: Vec<Activity>) -> WorkSession {
    let mut breakdown = Breakdown::default();
    for activity in &activities {
        breakdown.add(activity);
    }

    let context_switches = activities
        .windows(2)
        .filter(|w| w[0].app() != w[1].app())
        .count() as u32;

    let duration = breakdown.total();
    let average_focus = if activities.is_empty() {
        0.0
    } else {
        duration as f64 / activities.len() as f64
    };

    let dominant_app = breakdown
        .dominant_app()
        .unwrap_or(UNKNOWN_LABEL)
        .to_string();
    let dominant_category = breakdown
        .dominant_category()
        .unwrap_or(UNKNOWN_LABEL)
        .to_string();
    let session_type = classify_session(&dominant_app, &dominant_category);

    // Both are present: build_session is only called with a non-empty buffer
    let start = activities.first().map(|a| a.timestamp).unwrap_or_default();
    let end = activities.last().map(|a| a.timestamp).unwrap_or_default();

    WorkSession {
        id: format!("session-{}", start.timestamp_millis()),
        start,
        end,
        duration,
        app_breakdown: breakdown.app_shares(),
        category_breakdown: breakdown.category_shares(),
        screenshot_ids: breakdown.screenshot_ids().clone(),
        dominant_app,
        dominant_category,
        productivity_score: productivity_score(average_focus),
        context_switches,
        focus_quality: focus_quality(average_focus),
        session_type,
        activities,
    }
}

/// Score an average focus duration on a 0-100 scale
pub(crate) fn productivity_score(average_focus: f64) -> f64 {
    (average_focus / FULL_PRODUCTIVITY_FOCUS_SECS * 100.0).min(100.0)
}

fn focus_quality(average_focus: f64) -> FocusQuality {
    if average_focus > HIGH_FOCUS_SECS {
        FocusQuality::High
    } else if average_focus > MEDIUM_FOCUS_SECS {
        FocusQuality::Medium
    } else {
        FocusQuality::Low
    }
}

fn classify_session(dominant_app: &str, dominant_category: &str) -> SessionType {
    let either = |matches: fn(&str) -> bool| matches(dominant_category) || matches(dominant_app);

    if either(keywords::is_development) {
        SessionType::DeepWork
    } else if either(keywords::is_communication) {
        SessionType::Collaboration
    } else if either(keywords::is_browsing) {
        SessionType::Browsing
    } else {
        SessionType::Mixed
    }
}
