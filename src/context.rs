//! Screenshot context
//!
//! Links every screenshot-bearing activity to the activities recorded shortly before
//! and after it, and summarizes that neighbourhood.

use chrono::Duration;
use std::collections::HashMap;

use crate::segmentation::productivity_score;
use crate::timeline::ActivityTimeline;
use crate::types::{Activity, ScreenshotContext};

/// Default half-width of the context window
pub const DEFAULT_CONTEXT_WINDOW_SECS: i64 = 30 * 60;

/// Maximum activities kept on each side of a screenshot
pub const MAX_NEIGHBOURS: usize = 10;

const DOMINANT_APPS: usize = 3;

/// Builds screenshot contexts over a timeline
#[derive(Debug, Clone, Copy)]
pub struct ScreenshotLinker {
    window: Duration,
}

impl Default for ScreenshotLinker {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_CONTEXT_WINDOW_SECS))
    }
}

impl ScreenshotLinker {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// One context per screenshot activity, in timeline order
    pub fn link(&self, timeline: &ActivityTimeline) -> Vec<ScreenshotContext> {
        let activities = timeline.activities();
        activities
            .iter()
            .enumerate()
            .filter(|(_, a)| a.has_screenshot)
            .map(|(idx, shot)| self.context_at(activities, idx, shot))
            .collect()
    }

    fn context_at(
        &self,
        activities: &[Activity],
        idx: usize,
        shot: &Activity,
    ) -> ScreenshotContext {
        let earliest = shot.timestamp - self.window;
        let latest = shot.timestamp + self.window;

        // Scan outward from the screenshot so both sides come out nearest first
        let before: Vec<Activity> = activities[..idx]
            .iter()
            .rev()
            .filter(|a| a.timestamp < shot.timestamp)
            .take_while(|a| a.timestamp >= earliest)
            .take(MAX_NEIGHBOURS)
            .cloned()
            .collect();
        let after: Vec<Activity> = activities[idx + 1..]
            .iter()
            .filter(|a| a.timestamp > shot.timestamp)
            .take_while(|a| a.timestamp <= latest)
            .take(MAX_NEIGHBOURS)
            .cloned()
            .collect();

        let neighbourhood: Vec<&Activity> = before
            .iter()
            .chain(std::iter::once(shot))
            .chain(after.iter())
            .collect();

        let total_duration = neighbourhood
            .iter()
            .fold(0u64, |acc, a| acc.saturating_add(a.focus_duration));
        let average_focus = total_duration as f64 / neighbourhood.len() as f64;

        ScreenshotContext {
            screenshot_id: shot.id,
            timestamp: shot.timestamp,
            dominant_apps: dominant_apps(&neighbourhood),
            total_duration,
            productivity_score: productivity_score(average_focus),
            before,
            after,
        }
    }
}

/// Build screenshot contexts with the given window
pub fn screenshot_contexts(activities: &[Activity], window: Duration) -> Vec<ScreenshotContext> {
    ScreenshotLinker::new(window).link(&ActivityTimeline::new(activities))
}

/// Up to three apps by summed duration; ties keep first appearance
fn dominant_apps(activities: &[&Activity]) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, u64> = HashMap::new();
    for activity in activities {
        let app = activity.app();
        if !totals.contains_key(app) {
            order.push(app);
        }
        let total = totals.entry(app).or_insert(0);
        *total = total.saturating_add(activity.focus_duration);
    }

    let mut ranked: Vec<(&str, u64)> = order
        .into_iter()
        .map(|app| (app, totals.get(app).copied().unwrap_or(0)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(DOMINANT_APPS)
        .map(|(app, _)| app.to_string())
        .collect()
}
