//! Property tests for the aggregation pipeline.
//!
//! Covers invariants that must hold for any activity stream:
//! - Segmentation partitions the timeline
//! - Breakdown percentages add up to 100
//! - Bucket counts cover every in-range activity
//! - Analysis is deterministic
//! - Pearson coefficients stay in [-1, 1]

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use compass_flux::{analyze, bucket, pearson, segment, Activity, EngineConfig, Granularity};

const APPS: [(&str, &str); 4] = [
    ("Code", "Development"),
    ("Slack", "Communication"),
    ("Chrome", "Browsing"),
    ("Figma", "Design"),
];

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
}

fn activity_strategy() -> impl Strategy<Value = Vec<Activity>> {
    let row = (0i64..3 * 86_400, 0usize..APPS.len(), 1u64..2_000, any::<bool>());
    prop::collection::vec(row, 1..60).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (offset, app, duration, screenshot))| {
                let (name, category) = APPS[app];
                let ts = base() + Duration::seconds(offset);
                let activity = Activity::new(i as i64, ts, name, category, duration);
                if screenshot {
                    activity.with_screenshot()
                } else {
                    activity
                }
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn sessions_partition_the_timeline(
        activities in activity_strategy(),
        gap_secs in 60i64..3_600,
    ) {
        let gap = Duration::seconds(gap_secs);
        let sessions = segment(&activities, gap);

        let mut sorted = activities.clone();
        sorted.sort_by_key(|a| a.timestamp);
        let expected: Vec<i64> = sorted.iter().map(|a| a.id).collect();
        let covered: Vec<i64> = sessions
            .iter()
            .flat_map(|s| s.activities.iter().map(|a| a.id))
            .collect();
        prop_assert_eq!(covered, expected);

        for session in &sessions {
            for pair in session.activities.windows(2) {
                prop_assert!(pair[1].timestamp >= pair[0].timestamp);
                prop_assert!(pair[1].timestamp - pair[0].timestamp < gap);
            }
            prop_assert!(session.start <= session.end);
        }
        for pair in sessions.windows(2) {
            prop_assert!(pair[1].start - pair[0].end >= gap);
        }
    }

    #[test]
    fn session_percentages_sum_to_100(activities in activity_strategy()) {
        for session in segment(&activities, Duration::minutes(15)) {
            let apps: f64 = session.app_breakdown.iter().map(|a| a.percentage).sum();
            let categories: f64 = session
                .category_breakdown
                .iter()
                .map(|c| c.percentage)
                .sum();
            prop_assert!((apps - 100.0).abs() < 0.1, "app shares sum to {}", apps);
            prop_assert!((categories - 100.0).abs() < 0.1, "category shares sum to {}", categories);
        }
    }

    #[test]
    fn hourly_buckets_cover_every_activity(activities in activity_strategy()) {
        let from = base();
        let to = base() + Duration::days(3) - Duration::seconds(1);
        let buckets = bucket(&activities, Granularity::Hour, from, to);

        prop_assert_eq!(buckets.len(), 72);
        let counted: u32 = buckets.iter().map(|b| b.activity_count).sum();
        prop_assert_eq!(counted as usize, activities.len());

        let total: u64 = buckets.iter().map(|b| b.total_time).sum();
        let expected: u64 = activities.iter().map(|a| a.focus_duration).sum();
        prop_assert_eq!(total, expected);

        for pair in buckets.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }

        for b in buckets.iter().filter(|b| !b.is_empty()) {
            let apps: f64 = b.app_breakdown.iter().map(|a| a.percentage).sum();
            let categories: f64 = b.category_breakdown.iter().map(|c| c.percentage).sum();
            prop_assert!((apps - 100.0).abs() < 0.1, "{}: app shares sum to {}", b.key, apps);
            prop_assert!(
                (categories - 100.0).abs() < 0.1,
                "{}: category shares sum to {}",
                b.key,
                categories
            );
        }
    }

    #[test]
    fn analysis_is_deterministic(activities in activity_strategy()) {
        let config = EngineConfig::default();
        let first = serde_json::to_string(&analyze(&activities, &config)).unwrap();
        let second = serde_json::to_string(&analyze(&activities, &config)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn pearson_is_bounded(pairs in prop::collection::vec((-1e6f64..1e6, -1e6f64..1e6), 0..50)) {
        let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let r = pearson(&xs, &ys);
        prop_assert!(r.is_finite());
        prop_assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn pearson_of_constant_series_is_zero(
        x in -1_000i32..1_000,
        ys in prop::collection::vec(-1_000_000i32..1_000_000, 2..50),
    ) {
        let xs = vec![f64::from(x); ys.len()];
        let ys: Vec<f64> = ys.into_iter().map(f64::from).collect();
        prop_assert_eq!(pearson(&xs, &ys), 0.0);
    }
}

#[test]
fn gap_at_threshold_splits_sessions() {
    let gap = Duration::minutes(15);
    let activities = vec![
        Activity::new(1, base(), "Code", "Development", 300),
        Activity::new(2, base() + gap, "Code", "Development", 300),
        Activity::new(3, base() + gap + gap - Duration::seconds(1), "Code", "Development", 300),
    ];

    let sessions = segment(&activities, gap);
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].activities.len(), 1);
    assert_eq!(sessions[1].activities.len(), 2);
}
