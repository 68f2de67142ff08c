//! Content recurrence CLI.
//!
//! Loads an event table, runs burst detection per content entity and
//! prints statistics at entity, population or community scale.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rc_common::error::format_error_human;
use rc_common::{ContentId, Error, ErrorReport, OutputFormat, Result};
use rc_config::{read_config, validate_config, ConfigSnapshot, Granularity, LoadedConfig};
use rc_core::exit_codes::ExitCode;
use rc_core::ingest::{load_communities, load_events};
use rc_core::log_event;
use rc_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use rc_core::output::{render, BurstReport, MetricCatalogue, Render, SummaryReport};
use rc_core::{Metric, RecurrenceAnalyzer};

/// Content recurrence - burst detection and measurement for event logs
#[derive(Parser)]
#[command(name = "rc-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to recurrence.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq, -qqq)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    quiet: u8,

    /// Log format on stderr
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Epoch width override (e.g. D, 6H, 30Min)
    #[arg(long, global = true)]
    granularity: Option<String>,

    /// Burst level spacing override (> 1)
    #[arg(long, global = true)]
    s: Option<f64>,

    /// Level transition difficulty override (> 0)
    #[arg(long, global = true)]
    gamma: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Burst summary for every content entity
    Analyze(AnalyzeArgs),

    /// Bursts of one content entity
    Bursts(BurstsArgs),

    /// One metric across content entities
    Population(PopulationArgs),

    /// One metric grouped by community
    Community(CommunityArgs),

    /// List metric names and aliases
    Metrics,

    /// Validate configuration and print the effective snapshot
    Check,

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Event table (JSON array or JSON lines)
    events: PathBuf,

    /// Restrict to these content ids
    #[arg(long, value_delimiter = ',')]
    content: Option<Vec<String>>,
}

#[derive(Args, Debug)]
struct BurstsArgs {
    events: PathBuf,

    /// Content id to inspect
    #[arg(long)]
    content: String,
}

#[derive(Args, Debug)]
struct PopulationArgs {
    events: PathBuf,

    /// Metric name or alias
    #[arg(long)]
    metric: String,

    #[arg(long, value_delimiter = ',')]
    content: Option<Vec<String>>,
}

#[derive(Args, Debug)]
struct CommunityArgs {
    events: PathBuf,

    #[arg(long)]
    metric: String,

    /// Community mapping file ({"community": ["content id", ...]})
    #[arg(long)]
    communities: Option<PathBuf>,

    /// Restrict to these communities
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<String>>,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(
        LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    );
    init_logging(&log_config);

    let ctx = LogContext::new(generate_run_id());
    log_event!(ctx, DEBUG, event_names::RUN_STARTED, Stage::Init, "starting");

    let outcome = match &cli.command {
        Commands::Analyze(args) => run_analyze(&cli.global, args),
        Commands::Bursts(args) => run_bursts(&cli.global, args),
        Commands::Population(args) => run_population(&cli.global, args),
        Commands::Community(args) => run_community(&cli.global, args),
        Commands::Metrics => emit(&cli.global, &MetricCatalogue::new()).map(|_| ExitCode::Clean),
        Commands::Check => run_check(&cli.global),
        Commands::Version => {
            print_version(&cli.global);
            Ok(ExitCode::Clean)
        }
    };

    let exit_code = match outcome {
        Ok(code) => code,
        Err(err) => output_error(&cli.global, &err),
    };
    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Report,
        "finished",
        exit_code = exit_code.as_i32()
    );
    std::process::exit(exit_code.as_i32());
}

/// Load the config file, apply CLI overrides, then validate the result.
fn effective_config(global: &GlobalOpts) -> Result<LoadedConfig> {
    let mut loaded = read_config(global.config.as_deref())?;
    match &loaded.path {
        Some(path) => tracing::debug!(
            event = event_names::CONFIG_LOADED,
            source = %loaded.source,
            path = %path.display(),
            "configuration loaded"
        ),
        None => tracing::debug!(
            event = event_names::CONFIG_DEFAULT_USED,
            "no configuration file, using defaults"
        ),
    }

    if let Some(raw) = &global.granularity {
        loaded.config.granularity = raw.parse::<Granularity>()?;
    }
    if let Some(s) = global.s {
        loaded.config.solver.s = s;
    }
    if let Some(gamma) = global.gamma {
        loaded.config.solver.gamma = gamma;
    }
    validate_config(&loaded.config)?;
    Ok(loaded)
}

fn build_analyzer(global: &GlobalOpts, events: &Path) -> Result<RecurrenceAnalyzer> {
    let loaded = effective_config(global)?;
    let rows = load_events(events, &loaded.config.columns)?;
    RecurrenceAnalyzer::from_config(rows, &loaded.config)
}

fn content_ids(raw: &Option<Vec<String>>) -> Option<Vec<ContentId>> {
    raw.as_ref()
        .map(|ids| ids.iter().map(ContentId::new).collect())
}

fn outcome(found_bursts: bool) -> ExitCode {
    if found_bursts {
        ExitCode::Clean
    } else {
        ExitCode::NoBursts
    }
}

fn run_analyze(global: &GlobalOpts, args: &AnalyzeArgs) -> Result<ExitCode> {
    let analyzer = build_analyzer(global, &args.events)?;
    let selection = content_ids(&args.content);
    let report = SummaryReport {
        entities: analyzer.summaries(selection.as_deref()),
    };
    let found = report
        .entities
        .iter()
        .any(|s| s.burst_count.unwrap_or(0) > 0);
    emit(global, &report)?;
    Ok(outcome(found))
}

fn run_bursts(global: &GlobalOpts, args: &BurstsArgs) -> Result<ExitCode> {
    let analyzer = build_analyzer(global, &args.events)?;
    let id = ContentId::new(args.content.as_str());
    let series = analyzer
        .series(&id)
        .ok_or_else(|| Error::UnknownContent(args.content.clone()))?;
    let report = BurstReport {
        content_id: args.content.clone(),
        status: series.detection().status(),
        bursts: series.burst_details(),
    };
    emit(global, &report)?;
    Ok(outcome(!report.bursts.is_empty()))
}

fn run_population(global: &GlobalOpts, args: &PopulationArgs) -> Result<ExitCode> {
    let metric: Metric = args.metric.parse()?;
    let analyzer = build_analyzer(global, &args.events)?;
    let selection = content_ids(&args.content);
    let table = analyzer.population(metric, selection.as_deref());
    emit(global, &table)?;
    Ok(outcome(analyzer.any_bursts(table.content_ids())))
}

fn run_community(global: &GlobalOpts, args: &CommunityArgs) -> Result<ExitCode> {
    let metric: Metric = args.metric.parse()?;
    let mut analyzer = build_analyzer(global, &args.events)?;
    if let Some(path) = &args.communities {
        analyzer = analyzer.with_communities(load_communities(path)?);
    }
    let tables = analyzer.community_level(metric, args.select.as_deref())?;
    emit(global, &tables)?;
    Ok(outcome(analyzer.any_bursts(tables.content_ids())))
}

fn run_check(global: &GlobalOpts) -> Result<ExitCode> {
    let loaded = effective_config(global)?;
    let snapshot = ConfigSnapshot::new(&loaded);
    match global.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Jsonl => println!("{}", serde_json::to_string(&snapshot)?),
        OutputFormat::Md => {
            println!("# Configuration");
            println!();
            println!("- source: {}", snapshot.source);
            if let Some(path) = &snapshot.path {
                println!("- path: {}", path);
            }
            println!("- granularity: {}", snapshot.config.granularity);
            println!("- s: {}", snapshot.config.solver.s);
            println!("- gamma: {}", snapshot.config.solver.gamma);
            println!("- hash: {}", snapshot.config_hash);
        }
        OutputFormat::Summary => println!(
            "config ok ({}, granularity {}, s {}, gamma {}, hash {})",
            snapshot.source,
            snapshot.config.granularity,
            snapshot.config.solver.s,
            snapshot.config.solver.gamma,
            &snapshot.config_hash[..12.min(snapshot.config_hash.len())]
        ),
    }
    Ok(ExitCode::Clean)
}

fn emit<T: Render>(global: &GlobalOpts, payload: &T) -> Result<()> {
    let text = render(payload, global.format)?;
    tracing::debug!(stage = %Stage::Report, format = %global.format, "rendering output");
    println!("{}", text);
    Ok(())
}

fn output_error(global: &GlobalOpts, err: &Error) -> ExitCode {
    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            eprintln!("{}", ErrorReport::from(err).to_json());
        }
        OutputFormat::Md | OutputFormat::Summary => {
            eprintln!(
                "{}",
                format_error_human(err, std::io::stderr().is_terminal())
            );
        }
    }
    ExitCode::from(err)
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            let info = serde_json::json!({
                "rc_core_version": env!("CARGO_PKG_VERSION"),
                "config_schema_version": rc_config::CONFIG_SCHEMA_VERSION,
            });
            println!("{}", info);
        }
        OutputFormat::Md | OutputFormat::Summary => {
            println!("rc-core {}", env!("CARGO_PKG_VERSION"));
            println!("config schema version: {}", rc_config::CONFIG_SCHEMA_VERSION);
        }
    }
}
