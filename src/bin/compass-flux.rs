//! Compass Flux CLI - Command-line interface for the activity analysis engine
//!
//! Commands:
//! - analyze: Run the full pipeline and print the report envelope
//! - bucket: Aggregate activities into time buckets
//! - sessions: Segment activities into work sessions
//! - transitions: App transition table and summary
//! - energy: Hourly energy metrics and correlation
//! - insights: Rule-based insights
//! - validate: Validate activity records
//! - doctor: Diagnose configuration and environment
//! - schema: Print input/output schema information

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use compass_flux::adapter::{parse_instant, ActivityAdapter, Ingested, RawActivity};
use compass_flux::encoder::REPORT_SCHEMA_VERSION;
use compass_flux::transitions::RankedTransition;
use compass_flux::types::{EnergyCorrelation, EnergyMetric, Granularity, TransitionSummary};
use compass_flux::{
    Analyzer, ComputeError, EngineConfig, ReportEncoder, ENGINE_VERSION, PRODUCER_NAME,
};

/// Environment variable holding the log filter
const LOG_ENV: &str = "COMPASS_FLUX_LOG";

/// Compass Flux - Temporal activity aggregation and session analysis
#[derive(Parser)]
#[command(name = "compass-flux")]
#[command(author = "Compass Contributors")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Aggregate activity streams into sessions, metrics and insights")]
#[command(long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and print the report envelope
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Include buckets at this granularity in the report
        #[arg(long)]
        granularity: Option<Granularity>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Tag the report with this instance identifier
        #[arg(long)]
        instance_id: Option<String>,
    },

    /// Aggregate activities into time buckets
    Bucket {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Bucket granularity (minute, hour, day, week, month, year)
        #[arg(short, long)]
        granularity: Granularity,

        /// Range start (RFC 3339); with --to, empty buckets are reported too
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Range end (RFC 3339, inclusive)
        #[arg(long, requires = "from")]
        to: Option<String>,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Segment activities into work sessions
    Sessions {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// App transition table and summary
    Transitions {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Hourly energy metrics and correlation
    Energy {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Rule-based insights
    Insights {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Validate activity records
    Validate {
        #[command(flatten)]
        input: InputArgs,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check an engine config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Input format
    #[arg(long, default_value = "json")]
    input_format: InputFormat,
}

#[derive(Args)]
struct ConfigArgs {
    /// Engine config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Session split threshold in seconds
    #[arg(long)]
    gap_threshold_secs: Option<i64>,

    /// Number of transitions reported
    #[arg(long)]
    top_n: Option<usize>,

    /// Screenshot context window in seconds
    #[arg(long)]
    context_window_secs: Option<i64>,

    /// Fixed UTC offset in minutes for calendar boundaries
    #[arg(long, allow_hyphen_values = true)]
    utc_offset_minutes: Option<i32>,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one activity per line)
    Ndjson,
    /// JSON array of activities
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Activity input schema
    Input,
    /// Report envelope schema
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("compass_flux=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("compass_flux=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliFailure> {
    match cli.command {
        Commands::Analyze {
            input,
            config,
            granularity,
            output,
            output_format,
            instance_id,
        } => cmd_analyze(
            &input,
            &config,
            granularity,
            &output,
            output_format,
            instance_id,
        ),

        Commands::Bucket {
            input,
            config,
            granularity,
            from,
            to,
            output_format,
        } => cmd_bucket(
            &input,
            &config,
            granularity,
            from.as_deref(),
            to.as_deref(),
            output_format,
        ),

        Commands::Sessions {
            input,
            config,
            output_format,
        } => {
            let (analyzer, ingested) = prepare(&input, &config)?;
            let sessions = analyzer.sessions(&ingested.activities);
            print!("{}", format_output(&sessions, &output_format)?);
            Ok(())
        }

        Commands::Transitions {
            input,
            config,
            output_format,
        } => {
            let (analyzer, ingested) = prepare(&input, &config)?;
            let (transitions, summary) = analyzer.transitions(&ingested.activities);
            let output = TransitionsOutput {
                transitions,
                summary,
            };
            print!("{}", format_document(&output, &output_format)?);
            Ok(())
        }

        Commands::Energy {
            input,
            config,
            output_format,
        } => {
            let (analyzer, ingested) = prepare(&input, &config)?;
            let (metrics, correlation) = analyzer.energy(&ingested.activities);
            let output = EnergyOutput {
                metrics,
                correlation,
            };
            print!("{}", format_document(&output, &output_format)?);
            Ok(())
        }

        Commands::Insights {
            input,
            config,
            output_format,
        } => {
            let (analyzer, ingested) = prepare(&input, &config)?;
            let report = analyzer.analyze_ingested(&ingested);
            print!("{}", format_output(&report.insights, &output_format)?);
            Ok(())
        }

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_analyze(
    input: &InputArgs,
    config: &ConfigArgs,
    granularity: Option<Granularity>,
    output: &Path,
    output_format: OutputFormat,
    instance_id: Option<String>,
) -> Result<(), CliFailure> {
    let mut engine_config = load_config(config)?;
    if granularity.is_some() {
        engine_config.granularity = granularity;
    }
    let mut analyzer = Analyzer::new(engine_config)?;
    if let Some(id) = instance_id {
        analyzer = analyzer.with_encoder(ReportEncoder::with_instance_id(id));
    }
    let ingested = read_activities(input)?;

    let report = analyzer.analyze_ingested(&ingested);
    let envelope = analyzer.envelope(&report);
    let output_data = format_document(&envelope, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_bucket(
    input: &InputArgs,
    config: &ConfigArgs,
    granularity: Granularity,
    from: Option<&str>,
    to: Option<&str>,
    output_format: OutputFormat,
) -> Result<(), CliFailure> {
    let (analyzer, ingested) = prepare(input, config)?;

    let range = match (from, to) {
        (Some(from), Some(to)) => Some((parse_instant(from)?, parse_instant(to)?)),
        _ => None,
    };

    let buckets = analyzer.bucket(&ingested.activities, granularity, range);
    print!("{}", format_output(&buckets, &output_format)?);
    Ok(())
}

fn cmd_validate(input: &InputArgs, json: bool) -> Result<(), CliFailure> {
    let raws = parse_input(input)?;
    let issues = ActivityAdapter::validate(&raws);

    let invalid: std::collections::BTreeSet<usize> = issues
        .iter()
        .filter(|i| i.issue.is_fatal())
        .map(|i| i.index)
        .collect();

    let report = ValidationReport {
        total_activities: raws.len(),
        valid_activities: raws.len() - invalid.len(),
        invalid_activities: invalid.len(),
        issues: issues
            .iter()
            .map(|i| ValidationIssueDetail {
                index: i.index,
                id: i.id,
                fatal: i.issue.is_fatal(),
                issue: i.issue.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total activities:   {}", report.total_activities);
        println!("Valid activities:   {}", report.valid_activities);
        println!("Invalid activities: {}", report.invalid_activities);

        if !report.issues.is_empty() {
            println!("\nIssues:");
            for issue in &report.issues {
                let level = if issue.fatal { "error" } else { "warning" };
                println!(
                    "  - Activity {} (index {}) [{}]: {}",
                    issue.id, issue.index, level, issue.issue
                );
            }
        }
    }

    if report.invalid_activities > 0 {
        Err(CliFailure::ValidationFailed(report.invalid_activities))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), CliFailure> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Compass Flux version {}", ENGINE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Report schema: {}", REPORT_SCHEMA_VERSION),
    });

    if let Some(config_path) = config {
        let check = if !config_path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        } else {
            match fs::read_to_string(config_path) {
                Ok(content) => match EngineConfig::from_json(&content) {
                    Ok(parsed) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid (gap {}s, top {}, window {}s, offset {}min)",
                            parsed.gap_threshold_secs,
                            parsed.top_n,
                            parsed.context_window_secs,
                            parsed.utc_offset_minutes
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid config: {}", e),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            }
        };
        checks.push(check);
    }

    let log_filter = std::env::var(LOG_ENV).unwrap_or_else(|_| "compass_flux=warn".to_string());
    checks.push(DoctorCheck {
        name: "logging".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} = {}", LOG_ENV, log_filter),
    });

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass --input <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready to read activities)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Compass Flux Doctor Report");
        println!("==========================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(CliFailure::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), CliFailure> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", input_json_schema());
            } else {
                println!("Input: activity records (JSON array or NDJSON)");
                println!();
                println!("- id: integer");
                println!("- timestamp: RFC 3339 string (naive timestamps are read as UTC)");
                println!("- app_name: string (blank becomes \"Unknown\")");
                println!("- window_title: string (optional)");
                println!("- category: string (optional, blank becomes \"Unknown\")");
                println!("- focus_duration: seconds (negative values are clamped to 0)");
                println!("- total_windows: integer (optional)");
                println!("- has_screenshot: boolean (optional)");
                println!();
                println!("Records without a usable timestamp are reported as unplaced.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", output_json_schema());
            } else {
                println!("Output: report envelope {}", REPORT_SCHEMA_VERSION);
                println!();
                println!("- schema_version");
                println!("- producer: {{ name, version, instance_id }}");
                println!("- provenance: {{ first_activity_utc, last_activity_utc, activity_count, config }}");
                println!("- report:");
                println!("  - ingest: {{ received, accepted, unplaced, clamped_durations, duplicates_dropped }}");
                println!("  - sessions, transitions, transition_summary");
                println!("  - energy_metrics, energy_correlation");
                println!("  - app_efficiency, weekly_trend, focus_patterns");
                println!("  - screenshot_contexts, insights");
                println!("  - buckets (when a granularity is set), unplaced");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(path: &Path) -> Result<String, CliFailure> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn parse_input(input: &InputArgs) -> Result<Vec<RawActivity>, CliFailure> {
    let data = read_input(&input.input)?;
    let raws = match input.input_format {
        InputFormat::Ndjson => ActivityAdapter::parse_ndjson(&data)?,
        InputFormat::Json => ActivityAdapter::parse_array(&data)?,
    };
    if raws.is_empty() {
        return Err(CliFailure::NoActivities);
    }
    Ok(raws)
}

fn read_activities(input: &InputArgs) -> Result<Ingested, CliFailure> {
    let raws = parse_input(input)?;
    Ok(ActivityAdapter::sanitize(&raws))
}

fn load_config(args: &ConfigArgs) -> Result<EngineConfig, CliFailure> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };

    if let Some(gap) = args.gap_threshold_secs {
        config.gap_threshold_secs = gap;
    }
    if let Some(top_n) = args.top_n {
        config.top_n = top_n;
    }
    if let Some(window) = args.context_window_secs {
        config.context_window_secs = window;
    }
    if let Some(offset) = args.utc_offset_minutes {
        config.utc_offset_minutes = offset;
    }

    config.validate()?;
    Ok(config)
}

fn prepare(input: &InputArgs, config: &ConfigArgs) -> Result<(Analyzer, Ingested), CliFailure> {
    let analyzer = Analyzer::new(load_config(config)?)?;
    let ingested = read_activities(input)?;
    Ok((analyzer, ingested))
}

/// One record per line, or the whole list as a JSON array
fn format_output<T: Serialize>(
    records: &[T],
    format: &OutputFormat,
) -> Result<String, CliFailure> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)? + "\n"),
    }
}

/// A single document; NDJSON and compact JSON are the same line
fn format_document<T: Serialize>(
    document: &T,
    format: &OutputFormat,
) -> Result<String, CliFailure> {
    match format {
        OutputFormat::Ndjson | OutputFormat::Json => Ok(serde_json::to_string(document)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(document)? + "\n"),
    }
}

fn input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "compass-flux activity",
        "description": "Activity record consumed by Compass Flux",
        "type": "object",
        "required": ["timestamp", "app_name", "focus_duration"],
        "properties": {
            "id": { "type": "integer" },
            "timestamp": { "type": "string", "format": "date-time" },
            "app_name": { "type": "string" },
            "window_title": { "type": "string" },
            "category": { "type": "string" },
            "focus_duration": { "type": "number", "minimum": 0 },
            "total_windows": { "type": "integer", "minimum": 0 },
            "has_screenshot": { "type": "boolean" }
        }
    })
    .to_string()
}

fn output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "compass-flux report envelope",
        "description": "Compass Flux analysis report",
        "type": "object",
        "required": ["schema_version", "producer", "provenance", "report"],
        "properties": {
            "schema_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "provenance": {
                "type": "object",
                "properties": {
                    "first_activity_utc": { "type": ["string", "null"] },
                    "last_activity_utc": { "type": ["string", "null"] },
                    "activity_count": { "type": "integer" },
                    "config": { "type": "object" }
                }
            },
            "report": {
                "type": "object",
                "required": [
                    "ingest", "sessions", "transitions", "transition_summary",
                    "energy_metrics", "energy_correlation", "app_efficiency",
                    "weekly_trend", "focus_patterns", "screenshot_contexts", "insights"
                ],
                "properties": {
                    "sessions": { "type": "array", "items": { "type": "object" } },
                    "transitions": { "type": "array", "items": { "type": "object" } },
                    "insights": { "type": "array", "items": { "type": "object" } },
                    "buckets": { "type": "array", "items": { "type": "object" } },
                    "unplaced": { "type": "array", "items": { "type": "object" } }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum CliFailure {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoActivities,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for CliFailure {
    fn from(e: io::Error) -> Self {
        CliFailure::Io(e)
    }
}

impl From<ComputeError> for CliFailure {
    fn from(e: ComputeError) -> Self {
        CliFailure::Compute(e)
    }
}

impl From<serde_json::Error> for CliFailure {
    fn from(e: serde_json::Error) -> Self {
        CliFailure::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CliFailure> for CliError {
    fn from(e: CliFailure) -> Self {
        match e {
            CliFailure::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CliFailure::Compute(ComputeError::InvalidConfig(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'compass-flux doctor --config <file>' for details".to_string()),
            },
            CliFailure::Compute(ComputeError::InvalidTimestamp(msg)) => CliError {
                code: "INVALID_TIMESTAMP".to_string(),
                message: msg,
                hint: Some("Timestamps must be RFC 3339, e.g. 2024-01-15T09:00:00Z".to_string()),
            },
            CliFailure::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(
                    "Run 'compass-flux schema input' to see the expected format".to_string(),
                ),
            },
            CliFailure::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            CliFailure::NoActivities => CliError {
                code: "NO_ACTIVITIES".to_string(),
                message: "No activities found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            CliFailure::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} activities cannot be placed in time", count),
                hint: Some("Fix or drop records without a valid timestamp".to_string()),
            },
            CliFailure::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct TransitionsOutput {
    transitions: Vec<RankedTransition>,
    summary: TransitionSummary,
}

#[derive(Serialize)]
struct EnergyOutput {
    metrics: Vec<EnergyMetric>,
    correlation: EnergyCorrelation,
}

#[derive(Serialize)]
struct ValidationReport {
    total_activities: usize,
    valid_activities: usize,
    invalid_activities: usize,
    issues: Vec<ValidationIssueDetail>,
}

#[derive(Serialize)]
struct ValidationIssueDetail {
    index: usize,
    id: i64,
    fatal: bool,
    issue: String,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
