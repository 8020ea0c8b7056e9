//! Rule-based insight generation
//!
//! An ordered table of rules, each a pure predicate over the aggregated metrics that
//! emits zero or one [`Insight`]. Every applicable rule fires; the result is sorted by
//! impact with rule order preserved inside an impact tier.

use chrono::{FixedOffset, Offset, Timelike, Utc, Weekday};

use crate::keywords;
use crate::metrics::MetricsDeriver;
use crate::timeline::ActivityTimeline;
use crate::types::{
    Activity, AppEfficiency, EnergyMetric, FocusPattern, Impact, Insight, InsightType,
    Transition, WeeklyTrendPoint, WorkSession,
};

const CONTEXT_SWITCH_LIMIT: u32 = 50;
const MORNING_HOURS: std::ops::RangeInclusive<u32> = 9..=11;
const MORNING_FOCUS_SECS: f64 = 300.0;
const AFTERNOON_HOURS: std::ops::RangeInclusive<u32> = 14..=16;
const MORNING_FOCUS_ADVANTAGE: f64 = 20.0;
const SHORT_DEV_FOCUS_SECS: f64 = 180.0;
const LOW_EFFICIENCY: f64 = 50.0;
const LOW_ENERGY: f64 = 40.0;
const LOW_ENERGY_SHARE: f64 = 0.3;
const WEEKDAY_SPREAD: f64 = 30.0;
const TOP_APP_EFFICIENCY: f64 = 85.0;
const STRONG_ENERGY: f64 = 75.0;
const EXCEPTIONAL_EFFICIENCY: f64 = 90.0;

/// Everything the rules read
#[derive(Debug, Clone, Copy)]
pub struct InsightContext<'a> {
    pub sessions: &'a [WorkSession],
    pub transitions: &'a [Transition],
    pub energy_metrics: &'a [EnergyMetric],
    pub efficiency: &'a [AppEfficiency],
    pub weekly_trend: &'a [WeeklyTrendPoint],
    pub focus_patterns: &'a [FocusPattern],
    /// Offset used to find local morning hours
    pub offset: FixedOffset,
}

/// One entry of the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightRule {
    ContextSwitching,
    MorningPeak,
    MorningFocusAdvantage,
    ShortDevelopmentFocus,
    LowAppEfficiency,
    LowEnergy,
    WeeklyVariance,
    TopPerformingApp,
    StrongEnergy,
    ExceptionalWeek,
}

impl InsightRule {
    /// Rules in evaluation order
    pub const ALL: [InsightRule; 10] = [
        InsightRule::ContextSwitching,
        InsightRule::MorningPeak,
        InsightRule::MorningFocusAdvantage,
        InsightRule::ShortDevelopmentFocus,
        InsightRule::LowAppEfficiency,
        InsightRule::LowEnergy,
        InsightRule::WeeklyVariance,
        InsightRule::TopPerformingApp,
        InsightRule::StrongEnergy,
        InsightRule::ExceptionalWeek,
    ];

    /// Evaluate the rule; `None` when it does not apply
    pub fn evaluate(&self, ctx: &InsightContext<'_>) -> Option<Insight> {
        match self {
            InsightRule::ContextSwitching => context_switching(ctx),
            InsightRule::MorningPeak => morning_peak(ctx),
            InsightRule::MorningFocusAdvantage => morning_focus_advantage(ctx),
            InsightRule::ShortDevelopmentFocus => short_development_focus(ctx),
            InsightRule::LowAppEfficiency => low_app_efficiency(ctx),
            InsightRule::LowEnergy => low_energy(ctx),
            InsightRule::WeeklyVariance => weekly_variance(ctx),
            InsightRule::TopPerformingApp => top_performing_app(ctx),
            InsightRule::StrongEnergy => strong_energy(ctx),
            InsightRule::ExceptionalWeek => exceptional_week(ctx),
        }
    }
}

/// Evaluate every rule and sort the insights by impact, highest first
pub fn generate_insights(ctx: &InsightContext<'_>) -> Vec<Insight> {
    let mut insights: Vec<Insight> = InsightRule::ALL
        .iter()
        .filter_map(|rule| rule.evaluate(ctx))
        .collect();
    insights.sort_by(|a, b| b.impact.cmp(&a.impact));

    tracing::debug!(insights = insights.len(), "generated insights");
    insights
}

/// Generate insights with local hours taken in UTC.
///
/// The focus grid is derived from the sessions' activities.
pub fn insights(
    sessions: &[WorkSession],
    transitions: &[Transition],
    energy_metrics: &[EnergyMetric],
    efficiency: &[AppEfficiency],
    weekly_trend: &[WeeklyTrendPoint],
) -> Vec<Insight> {
    let activities: Vec<Activity> = sessions
        .iter()
        .flat_map(|s| s.activities.iter().cloned())
        .collect();
    let focus_patterns =
        MetricsDeriver::default().focus_patterns(&ActivityTimeline::new(&activities));

    generate_insights(&InsightContext {
        sessions,
        transitions,
        energy_metrics,
        efficiency,
        weekly_trend,
        focus_patterns: &focus_patterns,
        offset: Utc.fix(),
    })
}

fn insight(
    insight_type: InsightType,
    impact: Impact,
    title: &str,
    description: String,
    category: &str,
) -> Insight {
    Insight {
        insight_type,
        title: title.to_string(),
        description,
        impact,
        category: category.to_string(),
    }
}

fn session_activities<'a>(ctx: &'a InsightContext<'_>) -> impl Iterator<Item = &'a Activity> {
    ctx.sessions.iter().flat_map(|s| s.activities.iter())
}

fn average_focus<'a>(activities: impl Iterator<Item = &'a Activity>) -> Option<f64> {
    let (total, count) = activities.fold((0u64, 0u32), |(total, count), a| {
        (total.saturating_add(a.focus_duration), count + 1)
    });
    if count == 0 {
        None
    } else {
        Some(total as f64 / f64::from(count))
    }
}

/// Weekday (Mon-Fri) points that have activity
fn active_weekdays<'a>(ctx: &'a InsightContext<'_>) -> impl Iterator<Item = &'a WeeklyTrendPoint> {
    ctx.weekly_trend
        .iter()
        .filter(|p| p.activity_count > 0 && !matches!(p.day, Weekday::Sat | Weekday::Sun))
}

fn context_switching(ctx: &InsightContext<'_>) -> Option<Insight> {
    let switches: u32 = ctx.sessions.iter().map(|s| s.context_switches).sum();
    if switches <= CONTEXT_SWITCH_LIMIT {
        return None;
    }

    let mut description = format!(
        "{switches} app switches across {} sessions. Batch similar work to protect focus time.",
        ctx.sessions.len()
    );
    if let Some(top) = ctx.transitions.first() {
        description.push_str(&format!(
            " Most frequent switch: {} to {} ({} times).",
            top.from_app, top.to_app, top.frequency
        ));
    }

    Some(insight(
        InsightType::Optimization,
        Impact::High,
        "Reduce Context Switching",
        description,
        "Focus",
    ))
}

fn morning_peak(ctx: &InsightContext<'_>) -> Option<Insight> {
    let offset = ctx.offset;
    let morning = session_activities(ctx)
        .filter(|a| MORNING_HOURS.contains(&a.timestamp.with_timezone(&offset).hour()));
    let avg = average_focus(morning)?;
    if avg <= MORNING_FOCUS_SECS {
        return None;
    }

    Some(insight(
        InsightType::Pattern,
        Impact::Medium,
        "Morning Peak Performance",
        format!(
            "Activities between 9 and 12 average {:.0} seconds of focus. Schedule demanding work in the morning.",
            avg
        ),
        "Scheduling",
    ))
}

/// Mean focus score of the grid cells whose hour falls in `hours`
fn mean_focus_score(
    patterns: &[FocusPattern],
    hours: &std::ops::RangeInclusive<u32>,
) -> Option<f64> {
    let (sum, count) = patterns
        .iter()
        .filter(|p| hours.contains(&p.hour))
        .fold((0.0, 0u32), |(sum, count), p| (sum + p.focus_score, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / f64::from(count))
    }
}

fn morning_focus_advantage(ctx: &InsightContext<'_>) -> Option<Insight> {
    let morning = mean_focus_score(ctx.focus_patterns, &MORNING_HOURS)?;
    let afternoon = mean_focus_score(ctx.focus_patterns, &AFTERNOON_HOURS)?;
    let advantage = morning - afternoon;
    if advantage <= MORNING_FOCUS_ADVANTAGE {
        return None;
    }

    Some(insight(
        InsightType::Optimization,
        Impact::Medium,
        "Morning Focus Advantage",
        format!("Morning focus is {advantage:.0}% higher. Schedule complex tasks before noon."),
        "Scheduling",
    ))
}

fn short_development_focus(ctx: &InsightContext<'_>) -> Option<Insight> {
    let development = session_activities(ctx).filter(|a| {
        keywords::is_development(a.app()) || keywords::is_development(a.category_label())
    });
    let avg = average_focus(development)?;
    if avg >= SHORT_DEV_FOCUS_SECS {
        return None;
    }

    Some(insight(
        InsightType::Recommendation,
        Impact::High,
        "Extend Development Sessions",
        format!(
            "Development activities average only {:.0} seconds of focus. Block out longer uninterrupted stretches for coding.",
            avg
        ),
        "Development",
    ))
}

fn low_app_efficiency(ctx: &InsightContext<'_>) -> Option<Insight> {
    let low: Vec<&AppEfficiency> = ctx
        .efficiency
        .iter()
        .filter(|e| e.efficiency < LOW_EFFICIENCY)
        .collect();
    let first = low.first()?;

    Some(insight(
        InsightType::Optimization,
        Impact::Medium,
        "App Efficiency Optimization",
        format!(
            "{} apps fall below {:.0}% efficiency. Start by restructuring how you use {}.",
            low.len(),
            LOW_EFFICIENCY,
            first.app
        ),
        "Efficiency",
    ))
}

fn low_energy(ctx: &InsightContext<'_>) -> Option<Insight> {
    if ctx.energy_metrics.is_empty() {
        return None;
    }
    let low = ctx
        .energy_metrics
        .iter()
        .filter(|m| m.energy_level < LOW_ENERGY)
        .count();
    let share = low as f64 / ctx.energy_metrics.len() as f64;
    if share <= LOW_ENERGY_SHARE {
        return None;
    }

    Some(insight(
        InsightType::Recommendation,
        Impact::High,
        "Energy Management Needed",
        format!(
            "{:.0}% of active hours run at low energy. Plan breaks between long blocks.",
            share * 100.0
        ),
        "Wellness",
    ))
}

fn weekly_variance(ctx: &InsightContext<'_>) -> Option<Insight> {
    let mut best: Option<&WeeklyTrendPoint> = None;
    let mut worst: Option<&WeeklyTrendPoint> = None;
    for point in active_weekdays(ctx) {
        if best.map_or(true, |b| point.efficiency > b.efficiency) {
            best = Some(point);
        }
        if worst.map_or(true, |w| point.efficiency < w.efficiency) {
            worst = Some(point);
        }
    }
    let (best, worst) = (best?, worst?);
    let spread = best.efficiency - worst.efficiency;
    if spread <= WEEKDAY_SPREAD {
        return None;
    }

    Some(insight(
        InsightType::Pattern,
        Impact::Medium,
        "Weekly Performance Variance",
        format!(
            "{} is {:.0} points more efficient than {}. Look at what differs between the two days.",
            best.day, spread, worst.day
        ),
        "Patterns",
    ))
}

fn top_performing_app(ctx: &InsightContext<'_>) -> Option<Insight> {
    let mut top: Option<&AppEfficiency> = None;
    for app in ctx.efficiency {
        if top.map_or(true, |t| app.efficiency > t.efficiency) {
            top = Some(app);
        }
    }
    let top = top?;
    if top.efficiency <= TOP_APP_EFFICIENCY {
        return None;
    }

    Some(insight(
        InsightType::Pattern,
        Impact::Low,
        "High-Performance App Identified",
        format!(
            "{} runs at {:.0}% efficiency. Carry its usage pattern over to other tools.",
            top.app, top.efficiency
        ),
        "Best Practices",
    ))
}

fn strong_energy(ctx: &InsightContext<'_>) -> Option<Insight> {
    if ctx.energy_metrics.is_empty() {
        return None;
    }
    let total: f64 = ctx.energy_metrics.iter().map(|m| m.energy_level).sum();
    let avg = total / ctx.energy_metrics.len() as f64;
    if avg <= STRONG_ENERGY {
        return None;
    }

    Some(insight(
        InsightType::Pattern,
        Impact::Low,
        "Strong Energy Management",
        format!("Average energy sits at {:.0}. The current routine is working.", avg),
        "Wellness",
    ))
}

fn exceptional_week(ctx: &InsightContext<'_>) -> Option<Insight> {
    let (sum, count) = active_weekdays(ctx).fold((0.0, 0u32), |(sum, count), p| {
        (sum + p.efficiency, count + 1)
    });
    if count == 0 {
        return None;
    }
    let avg = sum / f64::from(count);
    if avg <= EXCEPTIONAL_EFFICIENCY {
        return None;
    }

    Some(insight(
        InsightType::Pattern,
        Impact::Low,
        "Exceptional Weekly Performance",
        format!("Weekdays average {:.0}% efficiency.", avg),
        "Achievement",
    ))
}
