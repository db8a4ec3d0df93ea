#![forbid(unsafe_code)]

mod cmd;
mod config;
mod output;
mod timing;

use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "depflow: task-dependency graph analysis",
    long_about = None
)]
struct Cli {
    /// Enable debug logging for depflow crates.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit a per-stage timing report to stderr.
    #[arg(long, global = true)]
    timing: bool,

    /// Output format (defaults to pretty on a TTY, text otherwise).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (default: ./depflow.toml).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Analyse graph files",
        long_about = "Run the full pipeline on each file: components, condensation, \
                      component and task order, statistics, shortest distances and \
                      critical paths.",
        after_help = "EXAMPLES:\n    # Analyse the assignment graph\n    depflow analyze data/task.json\n\n    # Analyse every dataset as JSON\n    depflow analyze data/*.json --format json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "Generate test datasets",
        long_about = "Write small, medium and large random datasets plus task.json.",
        after_help = "EXAMPLES:\n    # Write into ./data with the default seed\n    depflow generate\n\n    # Another seed, another directory\n    depflow generate --seed 7 --out-dir /tmp/graphs"
    )]
    Generate(cmd::generate::GenerateArgs),

    #[command(
        about = "Shortest or critical path query",
        long_about = "Single-source shortest (or, with --critical, longest) path on an acyclic graph.",
        after_help = "EXAMPLES:\n    # Shortest path from 0 to 5\n    depflow path g.json --source 0 --target 5\n\n    # Critical path through the condensation of a cyclic graph\n    depflow path data/task.json --source 4 --target 7 --critical --condensed"
    )]
    Path(cmd::path::PathArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DEPFLOW_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "depflow=debug,info"
        } else {
            "depflow=info,warn"
        })
    });

    let format = env::var("DEPFLOW_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    let config = config::load_config(cli.config.as_deref())?;
    debug!(?output, "resolved output mode");

    match &cli.command {
        Commands::Analyze(args) => cmd::analyze::run_analyze(args, &config, output),
        Commands::Generate(args) => cmd::generate::run_generate(args, &config, output),
        Commands::Path(args) => cmd::path::run_path(args, output),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let timing_enabled = cli.timing || timing::timing_enabled_from_env();
    timing::set_timing_enabled(timing_enabled);
    timing::clear_timings();

    let output = resolve_output_mode(cli.format, cli.json);
    let result = run(&cli, output);

    if timing_enabled {
        let report = timing::collect_report();
        if report.is_empty() {
            eprintln!("timing report: no samples recorded");
        } else if output.is_json() {
            eprintln!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            eprintln!("timing report:");
            eprintln!("{}", report.display_table());
        }
    }

    if let Err(err) = result {
        render_error(output, &CliError::from_anyhow(&err))?;
        std::process::exit(1);
    }
    Ok(())
}
