//! Per-bucket metrics
//!
//! Derives hourly energy metrics, per-app efficiency, a per-weekday efficiency trend
//! and an hour x weekday focus grid from the activity timeline.

use chrono::{Datelike, FixedOffset, Offset, Timelike, Utc, Weekday};
use std::collections::BTreeMap;

use crate::bucketing::Bucketer;
use crate::timeline::ActivityTimeline;
use crate::types::{
    Activity, AppEfficiency, EnergyMetric, FocusPattern, Granularity, WeeklyTrendPoint,
};

/// Focus seconds that score a per-activity focus quality of 100
const FULL_FOCUS_SECS: f64 = 600.0;

/// Seed of the per-bucket energy fold
pub const ENERGY_SEED: f64 = 50.0;

/// Productivity is energy scaled by this factor
const PRODUCTIVITY_FACTOR: f64 = 0.8;

/// Capped seconds that score an output of 50
const OUTPUT_SCORE_SECS: f64 = 3600.0;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Per-activity focus quality on a 0-100 scale
///
/// Formula: `min(100, focus_duration / 600 * 100)`
pub fn activity_focus_quality(activity: &Activity) -> f64 {
    (activity.focus_duration as f64 / FULL_FOCUS_SECS * 100.0).min(100.0)
}

/// Focus seconds capped at ten minutes
fn capped_focus(activity: &Activity) -> u64 {
    activity.focus_duration.min(FULL_FOCUS_SECS as u64)
}

/// Formula: `round(capped / total * 100)`, 0 when `total` is 0
fn efficiency(capped: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (capped as f64 / total as f64 * 100.0).round()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Derives metrics in local time for a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct MetricsDeriver {
    offset: FixedOffset,
}

impl Default for MetricsDeriver {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl MetricsDeriver {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// One metric per hourly bucket that contains activity, ordered by hour.
    ///
    /// Within a bucket the energy level is a fold over activities in timestamp order,
    /// seeded at [`ENERGY_SEED`]: `energy = (energy + focus_quality) / 2`.
    ///
    /// Flow state is not part of that fold. It is the mean focus quality of every
    /// activity in the bucket divided by 100, so it does not take the value of the
    /// last activity alone.
    pub fn energy_metrics(&self, timeline: &ActivityTimeline) -> Vec<EnergyMetric> {
        let hourly = Bucketer::new(Granularity::Hour).with_offset(self.offset);

        let mut buckets: BTreeMap<_, Vec<&Activity>> = BTreeMap::new();
        for activity in timeline.activities() {
            buckets
                .entry(hourly.bucket_start(activity.timestamp))
                .or_default()
                .push(activity);
        }

        let metrics: Vec<EnergyMetric> = buckets
            .into_iter()
            .map(|(start, activities)| {
                let energy_level = activities
                    .iter()
                    .map(|a| activity_focus_quality(a))
                    .fold(ENERGY_SEED, |energy, quality| (energy + quality) / 2.0);
                let mean_quality = mean(activities.iter().map(|a| activity_focus_quality(a)));
                let context_switches = activities
                    .windows(2)
                    .filter(|w| w[0].app() != w[1].app())
                    .count() as u32;

                EnergyMetric {
                    timestamp: start,
                    energy_level,
                    productivity: (energy_level * PRODUCTIVITY_FACTOR).min(100.0),
                    context_switches,
                    flow_state: (mean_quality / 100.0).min(1.0),
                }
            })
            .collect();

        tracing::debug!(buckets = metrics.len(), "derived energy metrics");
        metrics
    }

    /// Efficiency per app, ordered by efficiency desc, then time spent desc, then name
    pub fn app_efficiency(&self, timeline: &ActivityTimeline) -> Vec<AppEfficiency> {
        #[derive(Default)]
        struct Tally {
            total: u64,
            capped: u64,
            runs: u32,
        }

        let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
        let mut previous_app: Option<&str> = None;
        for activity in timeline.activities() {
            let app = activity.app();
            let tally = tallies.entry(app).or_default();
            tally.total = tally.total.saturating_add(activity.focus_duration);
            tally.capped = tally.capped.saturating_add(capped_focus(activity));
            if previous_app != Some(app) {
                tally.runs += 1;
            }
            previous_app = Some(app);
        }

        let mut efficiencies: Vec<AppEfficiency> = tallies
            .into_iter()
            .map(|(app, tally)| AppEfficiency {
                app: app.to_string(),
                efficiency: efficiency(tally.capped, tally.total),
                time_spent: tally.total as f64 / 60.0,
                output_score: (tally.capped as f64 / OUTPUT_SCORE_SECS * 50.0).min(100.0),
                avg_focus_duration: if tally.runs == 0 {
                    0.0
                } else {
                    tally.total as f64 / f64::from(tally.runs)
                },
            })
            .collect();

        efficiencies.sort_by(|a, b| {
            b.efficiency
                .total_cmp(&a.efficiency)
                .then_with(|| b.time_spent.total_cmp(&a.time_spent))
                .then_with(|| a.app.cmp(&b.app))
        });
        efficiencies
    }

    /// Efficiency per local weekday, Monday first.
    ///
    /// All seven days are reported; days without activity have zero totals.
    pub fn weekly_trend(&self, timeline: &ActivityTimeline) -> Vec<WeeklyTrendPoint> {
        let mut days: [(u64, u64, u32); 7] = [(0, 0, 0); 7];
        for activity in timeline.activities() {
            let day = activity.timestamp.with_timezone(&self.offset).weekday();
            let slot = &mut days[day.num_days_from_monday() as usize];
            slot.0 = slot.0.saturating_add(activity.focus_duration);
            slot.1 = slot.1.saturating_add(capped_focus(activity));
            slot.2 += 1;
        }

        WEEK.iter()
            .zip(days)
            .map(|(day, (total, capped, count))| WeeklyTrendPoint {
                day: *day,
                total_time: total,
                efficiency: efficiency(capped, total),
                activity_count: count,
            })
            .collect()
    }

    /// Mean per-activity focus quality for each (weekday, hour) cell with activity,
    /// ordered by weekday (Monday first) then hour
    pub fn focus_patterns(&self, timeline: &ActivityTimeline) -> Vec<FocusPattern> {
        let mut cells: BTreeMap<(u32, u32), (f64, u64, u32)> = BTreeMap::new();
        for activity in timeline.activities() {
            let local = activity.timestamp.with_timezone(&self.offset);
            let cell = cells
                .entry((local.weekday().num_days_from_monday(), local.hour()))
                .or_insert((0.0, 0, 0));
            cell.0 += activity_focus_quality(activity);
            cell.1 = cell.1.saturating_add(activity.focus_duration);
            cell.2 += 1;
        }

        cells
            .into_iter()
            .map(|((day, hour), (quality_sum, total, count))| FocusPattern {
                day: WEEK[day as usize],
                hour,
                focus_score: quality_sum / f64::from(count),
                total_time: total,
                activity_count: count,
            })
            .collect()
    }
}

/// Hourly energy metrics in UTC
pub fn derive_energy_metrics(activities: &[Activity]) -> Vec<EnergyMetric> {
    MetricsDeriver::default().energy_metrics(&ActivityTimeline::new(activities))
}

/// Per-app efficiency
pub fn derive_app_efficiency(activities: &[Activity]) -> Vec<AppEfficiency> {
    MetricsDeriver::default().app_efficiency(&ActivityTimeline::new(activities))
}

/// Per-weekday efficiency trend in UTC
pub fn derive_weekly_trend(activities: &[Activity]) -> Vec<WeeklyTrendPoint> {
    MetricsDeriver::default().weekly_trend(&ActivityTimeline::new(activities))
}

/// Hour x weekday focus grid in UTC
pub fn derive_focus_patterns(activities: &[Activity]) -> Vec<FocusPattern> {
    MetricsDeriver::default().focus_patterns(&ActivityTimeline::new(activities))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone};
    use pretty_assertions::assert_eq;

    // Monday
    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, 0).unwrap()
    }

    fn activity(id: i64, ts: DateTime<Utc>, app: &str, secs: u64) -> Activity {
        Activity::new(id, ts, app, "Work", secs)
    }

    #[test]
    fn test_energy_fold_per_hour() {
        let activities = vec![
            activity(1, at(9, 0), "Code", 600),
            activity(2, at(9, 10), "Slack", 300),
            activity(3, at(11, 0), "Code", 0),
        ];
        let metrics = derive_energy_metrics(&activities);

        assert_eq!(metrics.len(), 2);
        // (50 + 100) / 2 = 75, then (75 + 50) / 2 = 62.5
        assert!((metrics[0].energy_level - 62.5).abs() < 0.001);
        assert!((metrics[0].productivity - 50.0).abs() < 0.001);
        assert!((metrics[0].flow_state - 0.75).abs() < 0.001);
        assert_eq!(metrics[0].context_switches, 1);
        assert_eq!(metrics[0].timestamp, at(9, 0));

        assert!((metrics[1].energy_level - 25.0).abs() < 0.001);
        assert_eq!(metrics[1].flow_state, 0.0);
        assert_eq!(metrics[1].context_switches, 0);
    }

    #[test]
    fn test_energy_metrics_empty() {
        assert!(derive_energy_metrics(&[]).is_empty());
    }

    #[test]
    fn test_energy_levels_stay_in_range() {
        let activities: Vec<Activity> = (0..20)
            .map(|i| activity(i, at(9, 0) + Duration::minutes(i), "Code", 100_000))
            .collect();
        let metrics = derive_energy_metrics(&activities);
        assert!(metrics[0].energy_level <= 100.0);
        assert!(metrics[0].productivity <= 80.0);
        assert_eq!(metrics[0].flow_state, 1.0);
    }

    #[test]
    fn test_app_efficiency() {
        let activities = vec![
            activity(1, at(9, 0), "Code", 1200),
            activity(2, at(9, 20), "Code", 300),
            activity(3, at(9, 30), "Slack", 100),
            activity(4, at(9, 35), "Code", 300),
        ];
        let efficiencies = derive_app_efficiency(&activities);

        assert_eq!(efficiencies[0].app, "Slack");
        assert_eq!(efficiencies[0].efficiency, 100.0);

        let code = &efficiencies[1];
        assert_eq!(code.app, "Code");
        // capped 600 + 300 + 300 = 1200 of 1800
        assert_eq!(code.efficiency, 67.0);
        assert!((code.time_spent - 30.0).abs() < 0.001);
        // two usage runs
        assert!((code.avg_focus_duration - 900.0).abs() < 0.001);
        assert!((code.output_score - 1200.0 / 3600.0 * 50.0).abs() < 0.001);
    }

    #[test]
    fn test_app_efficiency_tie_breaks() {
        let activities = vec![
            activity(1, at(9, 0), "Zed", 60),
            activity(2, at(9, 1), "Atom", 60),
            activity(3, at(9, 2), "Vim", 120),
        ];
        let names: Vec<String> = derive_app_efficiency(&activities)
            .into_iter()
            .map(|e| e.app)
            .collect();
        assert_eq!(names, vec!["Vim", "Atom", "Zed"]);
    }

    #[test]
    fn test_zero_duration_app_has_zero_efficiency() {
        let efficiencies = derive_app_efficiency(&[activity(1, at(9, 0), "Code", 0)]);
        assert_eq!(efficiencies[0].efficiency, 0.0);
        assert_eq!(efficiencies[0].avg_focus_duration, 0.0);
    }

    #[test]
    fn test_weekly_trend_covers_all_days() {
        let tuesday = Utc.with_ymd_and_hms(2024, 1, 16, 10, 0, 0).unwrap();
        let activities = vec![
            activity(1, at(9, 0), "Code", 300),
            activity(2, tuesday, "Code", 1200),
        ];
        let trend = derive_weekly_trend(&activities);

        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].day, Weekday::Mon);
        assert_eq!(trend[0].efficiency, 100.0);
        assert_eq!(trend[1].efficiency, 50.0);
        assert_eq!(trend[6].day, Weekday::Sun);
        assert_eq!(trend[6].activity_count, 0);
        assert_eq!(trend[6].efficiency, 0.0);
    }

    #[test]
    fn test_weekly_trend_uses_offset() {
        // Monday 01:00 UTC is Sunday evening at UTC-05:00
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let timeline = ActivityTimeline::new(&[activity(1, at(1, 0), "Code", 60)]);
        let trend = MetricsDeriver::new(offset).weekly_trend(&timeline);
        assert_eq!(trend[6].activity_count, 1);
        assert_eq!(trend[0].activity_count, 0);
    }

    #[test]
    fn test_focus_patterns() {
        let activities = vec![
            activity(1, at(9, 0), "Code", 600),
            activity(2, at(9, 30), "Code", 0),
            activity(3, at(14, 0), "Code", 300),
        ];
        let patterns = derive_focus_patterns(&activities);

        assert_eq!(patterns.len(), 2);
        assert_eq!((patterns[0].day, patterns[0].hour), (Weekday::Mon, 9));
        assert!((patterns[0].focus_score - 50.0).abs() < 0.001);
        assert_eq!(patterns[0].activity_count, 2);
        assert_eq!(patterns[1].hour, 14);
    }
}
