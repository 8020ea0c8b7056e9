//! Pipeline orchestration
//!
//! This module provides the public API for Compass Flux. It runs every analysis stage
//! over one shared, per-call [`ActivityTimeline`] and assembles an [`AnalysisReport`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adapter::{ActivityAdapter, IngestSummary, Ingested, UnplacedActivity};
use crate::bucketing::Bucketer;
use crate::config::EngineConfig;
use crate::context::ScreenshotLinker;
use crate::correlation::energy_correlation;
use crate::encoder::{ReportEncoder, ReportEnvelope};
use crate::error::ComputeError;
use crate::insights::{generate_insights, InsightContext};
use crate::metrics::MetricsDeriver;
use crate::segmentation::SessionSegmenter;
use crate::timeline::ActivityTimeline;
use crate::transitions::{
    rank_transitions, summarize_transitions, RankedTransition, TransitionAnalyzer,
};
use crate::types::{
    Activity, AppEfficiency, BucketAggregate, EnergyCorrelation, EnergyMetric, FocusPattern,
    Granularity, Insight, ScreenshotContext, TransitionSummary, WeeklyTrendPoint, WorkSession,
};

/// Everything derived from one activity stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub ingest: IngestSummary,
    pub sessions: Vec<WorkSession>,
    pub transitions: Vec<RankedTransition>,
    pub transition_summary: TransitionSummary,
    pub energy_metrics: Vec<EnergyMetric>,
    pub energy_correlation: EnergyCorrelation,
    pub app_efficiency: Vec<AppEfficiency>,
    pub weekly_trend: Vec<WeeklyTrendPoint>,
    pub focus_patterns: Vec<FocusPattern>,
    pub screenshot_contexts: Vec<ScreenshotContext>,
    pub insights: Vec<Insight>,
    /// Present when a report granularity is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buckets: Option<Vec<BucketAggregate>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unplaced: Vec<UnplacedActivity>,
}

/// Analyze typed activities with the given configuration.
///
/// # Example
/// ```ignore
/// let report = analyze(&activities, &EngineConfig::default());
/// for insight in &report.insights {
///     println!("{}: {}", insight.title, insight.description);
/// }
/// ```
pub fn analyze(activities: &[Activity], config: &EngineConfig) -> AnalysisReport {
    Analyzer::with_config(config.clone()).analyze(activities)
}

/// Parse a JSON array of activities, analyze it and encode the report envelope.
///
/// Records without a usable timestamp are listed under `unplaced` in the report.
pub fn activities_to_report_json(
    json: &str,
    config: &EngineConfig,
) -> Result<String, ComputeError> {
    Analyzer::new(config.clone())?.report_json(json)
}

/// Analyzer bound to one configuration.
///
/// Holds no state between calls; every method recomputes from its input.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: EngineConfig,
    encoder: ReportEncoder,
}

impl Analyzer {
    /// Create an analyzer, rejecting an invalid configuration
    pub fn new(config: EngineConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            encoder: ReportEncoder::new(),
        }
    }

    /// Use a specific encoder (e.g. one tagged with an instance id)
    pub fn with_encoder(mut self, encoder: ReportEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run every stage over typed activities
    pub fn analyze(&self, activities: &[Activity]) -> AnalysisReport {
        self.run(activities, IngestSummary::for_activities(activities.len()), Vec::new())
    }

    /// Run every stage over sanitized input
    pub fn analyze_ingested(&self, ingested: &Ingested) -> AnalysisReport {
        self.run(
            &ingested.activities,
            ingested.summary.clone(),
            ingested.unplaced.clone(),
        )
    }

    /// Parse, sanitize, analyze and encode a JSON array payload
    pub fn report_json(&self, json: &str) -> Result<String, ComputeError> {
        let raws = ActivityAdapter::parse_array(json)?;
        let report = self.analyze_ingested(&ActivityAdapter::sanitize(&raws));
        self.encoder.encode_to_json(&report, &self.config)
    }

    /// Wrap a report in this analyzer's envelope
    pub fn envelope(&self, report: &AnalysisReport) -> ReportEnvelope {
        self.encoder.encode(report, &self.config)
    }

    /// Encode an existing report
    pub fn encode(&self, report: &AnalysisReport) -> Result<String, ComputeError> {
        self.encoder.encode_to_json(report, &self.config)
    }

    /// Bucket activities at `granularity`.
    ///
    /// With a range every bucket in `[from, to]` is reported, otherwise only the
    /// non-empty buckets spanning the input.
    pub fn bucket(
        &self,
        activities: &[Activity],
        granularity: Granularity,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Vec<BucketAggregate> {
        let timeline = ActivityTimeline::new(activities);
        let bucketer = Bucketer::new(granularity).with_offset(self.config.utc_offset());
        match range {
            Some((from, to)) => bucketer.bucket_timeline(&timeline, from, to),
            None => bucketer.bucket_all_timeline(&timeline),
        }
    }

    pub fn sessions(&self, activities: &[Activity]) -> Vec<WorkSession> {
        SessionSegmenter::new(self.config.gap_threshold())
            .segment(&ActivityTimeline::new(activities))
    }

    /// Top transitions with their tiers, plus the summary over all transitions
    pub fn transitions(
        &self,
        activities: &[Activity],
    ) -> (Vec<RankedTransition>, TransitionSummary) {
        let all = TransitionAnalyzer::analyze(&ActivityTimeline::new(activities));
        (rank_transitions(&all, self.config.top_n), summarize_transitions(&all))
    }

    /// Hourly energy metrics and their correlation statistics
    pub fn energy(&self, activities: &[Activity]) -> (Vec<EnergyMetric>, EnergyCorrelation) {
        let metrics = self.metrics().energy_metrics(&ActivityTimeline::new(activities));
        let correlation = energy_correlation(&metrics);
        (metrics, correlation)
    }

    fn metrics(&self) -> MetricsDeriver {
        MetricsDeriver::new(self.config.utc_offset())
    }

    fn run(
        &self,
        activities: &[Activity],
        mut ingest: IngestSummary,
        unplaced: Vec<UnplacedActivity>,
    ) -> AnalysisReport {
        let timeline = ActivityTimeline::new(activities);
        ingest.duplicates_dropped = timeline.duplicates_dropped();

        // Stage 1: sessions
        let sessions = SessionSegmenter::new(self.config.gap_threshold()).segment(&timeline);

        // Stage 2: transitions, tiered against the full table
        let all_transitions = TransitionAnalyzer::analyze(&timeline);
        let transition_summary = summarize_transitions(&all_transitions);
        let transitions = rank_transitions(&all_transitions, self.config.top_n);
        let top_transitions: Vec<_> = transitions.iter().map(|r| r.transition.clone()).collect();

        // Stage 3: per-bucket metrics and correlation
        let deriver = self.metrics();
        let energy_metrics = deriver.energy_metrics(&timeline);
        let energy_correlation = energy_correlation(&energy_metrics);
        let app_efficiency = deriver.app_efficiency(&timeline);
        let weekly_trend = deriver.weekly_trend(&timeline);
        let focus_patterns = deriver.focus_patterns(&timeline);

        // Stage 4: screenshot context
        let screenshot_contexts =
            ScreenshotLinker::new(self.config.context_window()).link(&timeline);

        // Stage 5: insights
        let insights = generate_insights(&InsightContext {
            sessions: &sessions,
            transitions: &top_transitions,
            energy_metrics: &energy_metrics,
            efficiency: &app_efficiency,
            weekly_trend: &weekly_trend,
            focus_patterns: &focus_patterns,
            offset: self.config.utc_offset(),
        });

        let buckets = self.config.granularity.map(|granularity| {
            Bucketer::new(granularity)
                .with_offset(self.config.utc_offset())
                .bucket_all_timeline(&timeline)
        });

        tracing::debug!(
            activities = timeline.len(),
            sessions = sessions.len(),
            insights = insights.len(),
            "analysis complete"
        );

        AnalysisReport {
            ingest,
            sessions,
            transitions,
            transition_summary,
            energy_metrics,
            energy_correlation,
            app_efficiency,
            weekly_trend,
            focus_patterns,
            screenshot_contexts,
            insights,
            buckets,
            unplaced,
        }
    }
}
