//! Time bucketing
//!
//! Maps timestamps to canonical bucket keys at one of six granularities and accumulates
//! per-bucket totals. Buckets are half-open intervals `[start, next_start)` computed in
//! local time for a fixed UTC offset (UTC by default). Weeks start on Monday.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Timelike, Utc,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::timeline::ActivityTimeline;
use crate::types::{Activity, AppShare, BucketAggregate, CategoryShare, Granularity};

/// `part / total * 100`, or 0 when `total` is 0
pub(crate) fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

struct AppTally {
    app: String,
    duration: u64,
    category: String,
}

struct CategoryTally {
    category: String,
    duration: u64,
}

/// Running per-app and per-category totals for a group of activities.
///
/// Entries keep first-occurrence order so that ties in duration resolve to whichever
/// app or category was seen first.
#[derive(Default)]
pub(crate) struct Breakdown {
    apps: Vec<AppTally>,
    app_index: HashMap<String, usize>,
    categories: Vec<CategoryTally>,
    category_index: HashMap<String, usize>,
    total: u64,
    activity_count: u32,
    screenshot_ids: BTreeSet<i64>,
}

impl Breakdown {
    pub(crate) fn add(&mut self, activity: &Activity) {
        let app = activity.app();
        let category = activity.category_label();
        let duration = activity.focus_duration;

        match self.app_index.get(app) {
            Some(&idx) => {
                let tally = &mut self.apps[idx];
                tally.duration = tally.duration.saturating_add(duration);
                tally.category = category.to_string();
            }
            None => {
                self.app_index.insert(app.to_string(), self.apps.len());
                self.apps.push(AppTally {
                    app: app.to_string(),
                    duration,
                    category: category.to_string(),
                });
            }
        }

        match self.category_index.get(category) {
            Some(&idx) => {
                let tally = &mut self.categories[idx];
                tally.duration = tally.duration.saturating_add(duration);
            }
            None => {
                self.category_index
                    .insert(category.to_string(), self.categories.len());
                self.categories.push(CategoryTally {
                    category: category.to_string(),
                    duration,
                });
            }
        }

        self.total = self.total.saturating_add(duration);
        self.activity_count = self.activity_count.saturating_add(1);
        if activity.has_screenshot {
            self.screenshot_ids.insert(activity.id);
        }
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    pub(crate) fn activity_count(&self) -> u32 {
        self.activity_count
    }

    pub(crate) fn screenshot_ids(&self) -> &BTreeSet<i64> {
        &self.screenshot_ids
    }

    /// App shares ordered by duration descending; the sort is stable so ties keep
    /// first-occurrence order
    pub(crate) fn app_shares(&self) -> Vec<AppShare> {
        let mut shares: Vec<AppShare> = self
            .apps
            .iter()
            .map(|tally| AppShare {
                app: tally.app.clone(),
                duration: tally.duration,
                percentage: percentage(tally.duration, self.total),
                category: tally.category.clone(),
            })
            .collect();
        shares.sort_by(|a, b| b.duration.cmp(&a.duration));
        shares
    }

    pub(crate) fn category_shares(&self) -> Vec<CategoryShare> {
        let mut shares: Vec<CategoryShare> = self
            .categories
            .iter()
            .map(|tally| CategoryShare {
                category: tally.category.clone(),
                duration: tally.duration,
                percentage: percentage(tally.duration, self.total),
            })
            .collect();
        shares.sort_by(|a, b| b.duration.cmp(&a.duration));
        shares
    }

    pub(crate) fn dominant_app(&self) -> Option<&str> {
        first_max(self.apps.iter().map(|t| (t.app.as_str(), t.duration)))
    }

    pub(crate) fn dominant_category(&self) -> Option<&str> {
        first_max(self.categories.iter().map(|t| (t.category.as_str(), t.duration)))
    }
}

/// Highest-duration label; the earliest entry wins ties
fn first_max<'a>(entries: impl Iterator<Item = (&'a str, u64)>) -> Option<&'a str> {
    let mut best: Option<(&str, u64)> = None;
    for (label, duration) in entries {
        match best {
            Some((_, best_duration)) if duration <= best_duration => {}
            _ => best = Some((label, duration)),
        }
    }
    best.map(|(label, _)| label)
}

/// Buckets activities at a fixed granularity and UTC offset
#[derive(Debug, Clone, Copy)]
pub struct Bucketer {
    granularity: Granularity,
    offset: FixedOffset,
}

impl Bucketer {
    /// Create a bucketer that computes calendar boundaries in UTC
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            offset: Utc.fix(),
        }
    }

    /// Compute calendar boundaries (midnight, Monday, the 1st) in the given offset
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Start of the bucket containing `timestamp`
    pub fn bucket_start(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        self.from_local(self.truncate_local(self.to_local(timestamp)))
    }

    /// Start of the bucket following the one that starts at `start`.
    ///
    /// Returns `None` only when the next boundary is outside chrono's representable range.
    pub fn next_bucket_start(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local = self.truncate_local(self.to_local(start));
        self.advance_local(local).map(|next| self.from_local(next))
    }

    /// Canonical key of the bucket containing `timestamp`.
    ///
    /// Equal bucket starts always produce equal keys.
    pub fn key_for(&self, timestamp: DateTime<Utc>) -> String {
        self.format_key(self.truncate_local(self.to_local(timestamp)))
    }

    /// Bucket activities within the closed range `[from, to]`.
    ///
    /// Every bucket overlapping the range is reported in ascending order, including
    /// buckets without activity.
    pub fn bucket(
        &self,
        activities: &[Activity],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<BucketAggregate> {
        self.bucket_timeline(&ActivityTimeline::new(activities), from, to)
    }

    /// Same as [`Bucketer::bucket`] over an already prepared timeline
    pub fn bucket_timeline(
        &self,
        timeline: &ActivityTimeline,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<BucketAggregate> {
        if from > to {
            return Vec::new();
        }

        let mut grouped = self.group(
            timeline
                .activities()
                .iter()
                .filter(|a| a.timestamp >= from && a.timestamp <= to),
        );

        let last = self.to_local(to);
        let mut cursor = self.truncate_local(self.to_local(from));
        let mut buckets = Vec::new();

        while cursor <= last {
            let next = self.advance_local(cursor);
            let breakdown = grouped.remove(&cursor).unwrap_or_default();
            buckets.push(self.finish(cursor, next, &breakdown));
            match next {
                Some(next) => cursor = next,
                None => break,
            }
        }

        tracing::debug!(
            granularity = %self.granularity,
            buckets = buckets.len(),
            "bucketed activity range"
        );

        buckets
    }

    /// Bucket every activity without a range; only non-empty buckets are reported
    pub fn bucket_all(&self, activities: &[Activity]) -> Vec<BucketAggregate> {
        self.bucket_all_timeline(&ActivityTimeline::new(activities))
    }

    /// Same as [`Bucketer::bucket_all`] over an already prepared timeline
    pub fn bucket_all_timeline(&self, timeline: &ActivityTimeline) -> Vec<BucketAggregate> {
        self.group(timeline.activities().iter())
            .iter()
            .map(|(start, breakdown)| self.finish(*start, self.advance_local(*start), breakdown))
            .collect()
    }

    fn group<'a>(
        &self,
        activities: impl Iterator<Item = &'a Activity>,
    ) -> BTreeMap<NaiveDateTime, Breakdown> {
        let mut grouped: BTreeMap<NaiveDateTime, Breakdown> = BTreeMap::new();
        for activity in activities {
            let start = self.truncate_local(self.to_local(activity.timestamp));
            grouped.entry(start).or_default().add(activity);
        }
        grouped
    }

    fn finish(
        &self,
        start: NaiveDateTime,
        next: Option<NaiveDateTime>,
        breakdown: &Breakdown,
    ) -> BucketAggregate {
        BucketAggregate {
            key: self.format_key(start),
            granularity: self.granularity,
            start: self.from_local(start),
            end: self.from_local(next.unwrap_or(NaiveDateTime::MAX)),
            total_time: breakdown.total(),
            app_breakdown: breakdown.app_shares(),
            category_breakdown: breakdown.category_shares(),
            activity_count: breakdown.activity_count(),
            screenshot_ids: breakdown.screenshot_ids().clone(),
        }
    }

    fn offset_delta(&self) -> Duration {
        Duration::seconds(i64::from(self.offset.local_minus_utc()))
    }

    fn to_local(&self, timestamp: DateTime<Utc>) -> NaiveDateTime {
        timestamp.naive_utc() + self.offset_delta()
    }

    fn from_local(&self, local: NaiveDateTime) -> DateTime<Utc> {
        Utc.from_utc_datetime(&(local - self.offset_delta()))
    }

    fn truncate_local(&self, local: NaiveDateTime) -> NaiveDateTime {
        let date = local.date();
        match self.granularity {
            Granularity::Minute => {
                local
                    - Duration::seconds(i64::from(local.second()))
                    - Duration::nanoseconds(i64::from(local.nanosecond()))
            }
            Granularity::Hour => {
                local
                    - Duration::minutes(i64::from(local.minute()))
                    - Duration::seconds(i64::from(local.second()))
                    - Duration::nanoseconds(i64::from(local.nanosecond()))
            }
            Granularity::Day => date.and_time(NaiveTime::MIN),
            Granularity::Week => {
                let back = i64::from(date.weekday().num_days_from_monday());
                (date - Duration::days(back)).and_time(NaiveTime::MIN)
            }
            Granularity::Month => {
                (date - Duration::days(i64::from(date.day0()))).and_time(NaiveTime::MIN)
            }
            Granularity::Year => {
                (date - Duration::days(i64::from(date.ordinal0()))).and_time(NaiveTime::MIN)
            }
        }
    }

    fn advance_local(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        match self.granularity {
            Granularity::Minute => start.checked_add_signed(Duration::minutes(1)),
            Granularity::Hour => start.checked_add_signed(Duration::hours(1)),
            Granularity::Day => start.checked_add_signed(Duration::days(1)),
            Granularity::Week => start.checked_add_signed(Duration::days(7)),
            Granularity::Month => start.checked_add_months(Months::new(1)),
            Granularity::Year => start.checked_add_months(Months::new(12)),
        }
    }

    fn format_key(&self, start: NaiveDateTime) -> String {
        match self.granularity {
            Granularity::Minute => start.format("%Y-%m-%dT%H:%M").to_string(),
            Granularity::Hour => start.format("%Y-%m-%dT%H:00").to_string(),
            Granularity::Day => start.format("%Y-%m-%d").to_string(),
            Granularity::Week => {
                let week = start.date().iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Granularity::Month => start.format("%Y-%m").to_string(),
            Granularity::Year => start.format("%Y").to_string(),
        }
    }
}

/// Bucket activities in UTC within the closed range `[from, to]`
pub fn bucket(
    activities: &[Activity],
    granularity: Granularity,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<BucketAggregate> {
    Bucketer::new(granularity).bucket(activities, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 17, h, m, s).unwrap()
    }

    fn activity(id: i64, ts: DateTime<Utc>, app: &str, category: &str, secs: u64) -> Activity {
        Activity::new(id, ts, app, category, secs)
    }

    #[test]
    fn test_bucket_keys_per_granularity() {
        // Wednesday 2024-01-17 14:37:21
        let ts = at(14, 37, 21);
        let keys: Vec<String> = Granularity::ALL
            .iter()
            .map(|g| Bucketer::new(*g).key_for(ts))
            .collect();
        assert_eq!(
            keys,
            vec![
                "2024-01-17T14:37",
                "2024-01-17T14:00",
                "2024-01-17",
                "2024-W03",
                "2024-01",
                "2024",
            ]
        );
    }

    #[test]
    fn test_week_starts_on_monday() {
        let bucketer = Bucketer::new(Granularity::Week);
        let sunday = Utc.with_ymd_and_hms(2024, 1, 21, 23, 59, 59).unwrap();
        let monday = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(bucketer.bucket_start(sunday), monday);
        assert_eq!(
            bucketer.next_bucket_start(monday),
            Some(Utc.with_ymd_and_hms(2024, 1, 22, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_month_and_year_boundaries() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        let month = Bucketer::new(Granularity::Month);
        assert_eq!(
            month.bucket_start(ts),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            month.next_bucket_start(month.bucket_start(ts)),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        let year = Bucketer::new(Granularity::Year);
        assert_eq!(
            year.bucket_start(ts),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_offset_moves_day_boundary() {
        // 2024-01-17T02:00Z is still Jan 16 at UTC-05:00
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let bucketer = Bucketer::new(Granularity::Day).with_offset(offset);
        let ts = at(2, 0, 0);
        assert_eq!(bucketer.key_for(ts), "2024-01-16");
        assert_eq!(
            bucketer.bucket_start(ts),
            Utc.with_ymd_and_hms(2024, 1, 16, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_four_activities_in_one_hour_make_one_bucket() {
        let activities = vec![
            activity(1, at(10, 0, 0), "Code", "Development", 120),
            activity(2, at(10, 15, 0), "Chrome", "Browsing", 60),
            activity(3, at(10, 30, 0), "Code", "Development", 300),
            activity(4, at(10, 59, 59), "Slack", "Communication", 20),
        ];
        let buckets = bucket(&activities, Granularity::Hour, at(10, 0, 0), at(10, 59, 59));

        assert_eq!(buckets.len(), 1);
        let only = &buckets[0];
        assert_eq!(only.key, "2024-01-17T10:00");
        assert_eq!(only.total_time, 500);
        assert_eq!(only.activity_count, 4);
        assert_eq!(only.app_breakdown[0].app, "Code");
        assert_eq!(only.app_breakdown[0].duration, 420);
        let sum: f64 = only.app_breakdown.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 0.1);
    }

    #[test]
    fn test_empty_buckets_cover_the_range() {
        let activities = vec![activity(1, at(9, 30, 0), "Code", "Development", 60)];
        let buckets = bucket(&activities, Granularity::Hour, at(8, 0, 0), at(11, 0, 0));

        let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "2024-01-17T08:00",
                "2024-01-17T09:00",
                "2024-01-17T10:00",
                "2024-01-17T11:00",
            ]
        );
        assert!(buckets[0].is_empty());
        assert_eq!(buckets[0].total_time, 0);
        assert!(buckets[0].app_breakdown.is_empty());
        assert_eq!(buckets[1].total_time, 60);
    }

    #[test]
    fn test_boundary_activity_belongs_to_starting_bucket() {
        let activities = vec![activity(1, at(11, 0, 0), "Code", "Development", 60)];
        let buckets = bucket(&activities, Granularity::Hour, at(10, 0, 0), at(11, 30, 0));
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].total_time, 0);
        assert_eq!(buckets[1].total_time, 60);
        assert_eq!(buckets[1].start, at(11, 0, 0));
        assert_eq!(buckets[0].end, at(11, 0, 0));
    }

    #[test]
    fn test_activities_outside_range_are_excluded() {
        let activities = vec![
            activity(1, at(7, 59, 59), "Code", "Development", 60),
            activity(2, at(8, 10, 0), "Code", "Development", 30),
            activity(3, at(9, 0, 1), "Code", "Development", 90),
        ];
        let buckets = bucket(&activities, Granularity::Hour, at(8, 0, 0), at(9, 0, 0));
        let total: u64 = buckets.iter().map(|b| b.total_time).sum();
        assert_eq!(total, 30);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let activities = vec![activity(1, at(9, 0, 0), "Code", "Development", 60)];
        assert!(bucket(&activities, Granularity::Hour, at(10, 0, 0), at(9, 0, 0)).is_empty());
    }

    #[test]
    fn test_zero_total_gives_zero_percentages() {
        let activities = vec![
            activity(1, at(9, 0, 0), "Code", "Development", 0),
            activity(2, at(9, 1, 0), "Chrome", "Browsing", 0),
        ];
        let buckets = bucket(&activities, Granularity::Hour, at(9, 0, 0), at(9, 30, 0));
        assert_eq!(buckets[0].activity_count, 2);
        assert!(buckets[0].app_breakdown.iter().all(|s| s.percentage == 0.0));
    }

    #[test]
    fn test_unknown_labels_and_screenshots() {
        let activities = vec![
            activity(7, at(9, 0, 0), "", "", 45).with_screenshot(),
            activity(8, at(9, 5, 0), "Code", "Development", 15),
        ];
        let buckets = bucket(&activities, Granularity::Day, at(0, 0, 0), at(23, 0, 0));
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].app_breakdown[0].app, "Unknown");
        assert_eq!(buckets[0].category_breakdown[0].category, "Unknown");
        assert_eq!(
            buckets[0].screenshot_ids.iter().copied().collect::<Vec<_>>(),
            vec![7]
        );
    }

    #[test]
    fn test_bucket_all_reports_only_non_empty_buckets() {
        let activities = vec![
            activity(1, at(15, 0, 0), "Code", "Development", 60),
            activity(2, at(9, 0, 0), "Code", "Development", 60),
        ];
        let buckets = Bucketer::new(Granularity::Hour).bucket_all(&activities);
        let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-01-17T09:00", "2024-01-17T15:00"]);
    }

    #[test]
    fn test_dominant_ties_resolve_to_first_occurrence() {
        let mut breakdown = Breakdown::default();
        breakdown.add(&activity(1, at(9, 0, 0), "Slack", "Communication", 100));
        breakdown.add(&activity(2, at(9, 1, 0), "Code", "Development", 100));
        assert_eq!(breakdown.dominant_app(), Some("Slack"));
        assert_eq!(breakdown.dominant_category(), Some("Communication"));
        assert_eq!(breakdown.app_shares()[0].app, "Slack");
    }
}
