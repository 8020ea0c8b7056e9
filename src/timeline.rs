//! Per-call activity timeline
//!
//! Every analysis stage works on the same sorted, deduplicated copy of the caller's
//! activities. The timeline is built once per call and dropped with it.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::types::Activity;

/// Chronologically ordered, deduplicated copy of an activity slice
#[derive(Debug, Clone, Default)]
pub struct ActivityTimeline {
    activities: Vec<Activity>,
    duplicates_dropped: usize,
}

impl ActivityTimeline {
    /// Build a timeline from the caller's activities.
    ///
    /// Activities are stable-sorted by timestamp, so records sharing a timestamp keep
    /// their input order. A record repeating the `id` and `timestamp` of an earlier one
    /// is dropped.
    pub fn new(activities: &[Activity]) -> Self {
        let mut sorted = activities.to_vec();
        sorted.sort_by_key(|a| a.timestamp);

        let mut seen: HashSet<(i64, DateTime<Utc>)> = HashSet::with_capacity(sorted.len());
        let before = sorted.len();
        sorted.retain(|a| seen.insert((a.id, a.timestamp)));
        let duplicates_dropped = before - sorted.len();

        if duplicates_dropped > 0 {
            tracing::debug!(duplicates_dropped, "dropped duplicate activities");
        }

        Self {
            activities: sorted,
            duplicates_dropped,
        }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Number of records removed as duplicates
    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    /// Temporally adjacent activity pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&Activity, &Activity)> {
        self.activities.windows(2).map(|w| (&w[0], &w[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, minute, 0).unwrap()
    }

    #[test]
    fn test_sorts_without_touching_input() {
        let input = vec![
            Activity::new(2, at(10), "B", "x", 10),
            Activity::new(1, at(0), "A", "x", 10),
        ];
        let timeline = ActivityTimeline::new(&input);
        let ids: Vec<i64> = timeline.activities().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(input[0].id, 2);
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let input = vec![
            Activity::new(5, at(0), "B", "x", 10),
            Activity::new(3, at(0), "A", "x", 10),
        ];
        let timeline = ActivityTimeline::new(&input);
        let ids: Vec<i64> = timeline.activities().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![5, 3]);
    }

    #[test]
    fn test_drops_repeated_id_and_timestamp() {
        let input = vec![
            Activity::new(1, at(0), "A", "x", 10),
            Activity::new(1, at(0), "A", "x", 10),
            Activity::new(1, at(1), "A", "x", 10),
        ];
        let timeline = ActivityTimeline::new(&input);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.duplicates_dropped(), 1);
        let stamps: Vec<DateTime<Utc>> =
            timeline.activities().iter().map(|a| a.timestamp).collect();
        assert_eq!(stamps, vec![at(0), at(1)]);
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = ActivityTimeline::new(&[]);
        assert!(timeline.is_empty());
        assert_eq!(timeline.pairs().count(), 0);
    }
}
