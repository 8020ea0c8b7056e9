//! App transition analysis
//!
//! Scans temporally adjacent activity pairs and builds a frequency/duration table of
//! app-to-app switches. Bucket and session boundaries are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::timeline::ActivityTimeline;
use crate::types::{Activity, Transition, TransitionQuality, TransitionSummary};

/// Default number of transitions reported
pub const DEFAULT_TOP_N: usize = 10;

/// Ratio to the max frequency above which a pair counts toward `problematic_pairs`
const PROBLEMATIC_PAIR_RATIO: f64 = 0.6;

/// Builds the app transition table
pub struct TransitionAnalyzer;

impl TransitionAnalyzer {
    /// Every transition in the timeline, sorted by frequency descending with ties in
    /// first-seen order.
    ///
    /// `avg_duration` is a running mean seeded by the first occurrence:
    /// `avg += (x - avg) / frequency`.
    pub fn analyze(timeline: &ActivityTimeline) -> Vec<Transition> {
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        let table = timeline
            .pairs()
            .filter(|(prev, curr)| prev.app() != curr.app())
            .fold(Vec::<Transition>::new(), |mut table, (prev, curr)| {
                let key = (prev.app().to_string(), curr.app().to_string());
                let slot = *index.entry(key).or_insert_with(|| {
                    table.push(Transition {
                        from_app: prev.app().to_string(),
                        to_app: curr.app().to_string(),
                        frequency: 0,
                        avg_duration: 0.0,
                        category: String::new(),
                    });
                    table.len() - 1
                });

                let entry = &mut table[slot];
                entry.frequency += 1;
                entry.avg_duration +=
                    (curr.focus_duration as f64 - entry.avg_duration) / f64::from(entry.frequency);
                entry.category = curr.category_label().to_string();
                table
            });

        let mut sorted = table;
        sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency));

        tracing::debug!(pairs = sorted.len(), "analyzed app transitions");
        sorted
    }

    /// The `top_n` most frequent transitions
    pub fn top(timeline: &ActivityTimeline, top_n: usize) -> Vec<Transition> {
        let mut all = Self::analyze(timeline);
        all.truncate(top_n);
        all
    }
}

/// Most frequent app transitions, truncated to `top_n`
pub fn transitions(activities: &[Activity], top_n: usize) -> Vec<Transition> {
    TransitionAnalyzer::top(&ActivityTimeline::new(activities), top_n)
}

/// Tier of a transition frequency relative to the most frequent transition
pub fn classify_transition(frequency: u32, max_frequency: u32) -> TransitionQuality {
    let ratio = if max_frequency == 0 {
        0.0
    } else {
        f64::from(frequency) / f64::from(max_frequency)
    };

    if ratio > 0.8 {
        TransitionQuality::Problematic
    } else if ratio > 0.6 {
        TransitionQuality::High
    } else if ratio > 0.4 {
        TransitionQuality::Moderate
    } else if ratio > 0.2 {
        TransitionQuality::Good
    } else {
        TransitionQuality::Excellent
    }
}

/// A transition together with its tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTransition {
    #[serde(flatten)]
    pub transition: Transition,
    pub quality: TransitionQuality,
}

/// Tier every transition against the most frequent one in `all`, keeping the first
/// `top_n`
pub fn rank_transitions(all: &[Transition], top_n: usize) -> Vec<RankedTransition> {
    let max_frequency = all.iter().map(|t| t.frequency).max().unwrap_or(0);
    all.iter()
        .take(top_n)
        .map(|t| RankedTransition {
            transition: t.clone(),
            quality: classify_transition(t.frequency, max_frequency),
        })
        .collect()
}

/// Headline statistics over a full (untruncated) transition table
pub fn summarize_transitions(transitions: &[Transition]) -> TransitionSummary {
    let total: u32 = transitions.iter().map(|t| t.frequency).sum();
    let max_frequency = transitions.iter().map(|t| t.frequency).max().unwrap_or(0);

    let weighted_avg_duration = if total == 0 {
        0.0
    } else {
        transitions
            .iter()
            .map(|t| t.avg_duration * f64::from(t.frequency))
            .sum::<f64>()
            / f64::from(total)
    };

    let problematic_pairs = transitions
        .iter()
        .filter(|t| f64::from(t.frequency) > f64::from(max_frequency) * PROBLEMATIC_PAIR_RATIO)
        .count() as u32;

    TransitionSummary {
        total_transitions: total,
        unique_pairs: transitions.len() as u32,
        weighted_avg_duration,
        problematic_pairs,
        most_distracting_app: most_frequent(transitions.iter().map(|t| (&t.from_app, t.frequency))),
        most_attractive_app: most_frequent(transitions.iter().map(|t| (&t.to_app, t.frequency))),
    }
}

/// App with the highest summed frequency; first seen wins ties
fn most_frequent<'a>(entries: impl Iterator<Item = (&'a String, u32)>) -> Option<String> {
    let mut totals: Vec<(&String, u32)> = Vec::new();
    for (app, frequency) in entries {
        match totals.iter_mut().find(|(seen, _)| *seen == app) {
            Some((_, total)) => *total += frequency,
            None => totals.push((app, frequency)),
        }
    }

    let mut best: Option<(&String, u32)> = None;
    for (app, total) in totals {
        if best.map_or(true, |(_, best_total)| total > best_total) {
            best = Some((app, total));
        }
    }
    best.map(|(app, _)| app.clone())
}
