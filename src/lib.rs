//! Compass Flux - Temporal activity aggregation and session analysis engine
//!
//! Flux turns a flat, irregularly sampled stream of productivity activity records into
//! multi-granularity time buckets, work sessions, app transition statistics,
//! energy/productivity correlation metrics and rule-based insights through a
//! deterministic pipeline: ingestion → timeline → {bucketing, segmentation,
//! transitions} → per-bucket metrics → correlation → insights → encoding.
//!
//! ## Modules
//!
//! - **Ingestion**: [`adapter`] parses JSON / NDJSON payloads and sanitizes records
//! - **Aggregation**: [`bucketing`], [`segmentation`], [`transitions`]
//! - **Metrics**: [`metrics`], [`correlation`], [`insights`], [`context`]
//! - **Pipeline**: [`pipeline`] runs every stage; [`encoder`] wraps the report

pub mod adapter;
pub mod bucketing;
pub mod config;
pub mod context;
pub mod correlation;
pub mod encoder;
pub mod error;
pub mod insights;
mod keywords;
pub mod metrics;
pub mod pipeline;
pub mod segmentation;
pub mod timeline;
pub mod transitions;
pub mod types;

pub use adapter::{ActivityAdapter, IngestSummary, Ingested, RawActivity};
pub use bucketing::{bucket, Bucketer};
pub use config::EngineConfig;
pub use context::screenshot_contexts;
pub use correlation::{energy_correlation, pearson};
pub use encoder::{ReportEncoder, ReportEnvelope};
pub use error::ComputeError;
pub use insights::insights;
pub use metrics::{
    derive_app_efficiency, derive_energy_metrics, derive_focus_patterns, derive_weekly_trend,
};
pub use pipeline::{activities_to_report_json, analyze, AnalysisReport, Analyzer};
pub use segmentation::{find_session_at, segment};
pub use timeline::ActivityTimeline;
pub use transitions::{summarize_transitions, transitions};
pub use types::{Activity, Granularity};

/// Engine version embedded in every report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report envelopes
pub const PRODUCER_NAME: &str = "compass-flux";
