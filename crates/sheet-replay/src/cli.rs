use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use sheet_core::SheetConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::{ReplayError, Result};
use crate::trace::{Replayer, Trace, write_jsonl};

#[derive(Debug, Parser)]
#[command(
    name = "sheet-replay",
    about = "Replay recorded bottom-sheet gesture traces through the drag engine",
    version
)]
pub struct Cli {
    /// Log engine transitions to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a JSON trace and print one JSON line per step.
    Run(RunArgs),

    /// Print the effective sheet configuration as JSON.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Trace file to replay.
    pub trace: PathBuf,

    /// TOML or JSON config file; replaces the trace's embedded config.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write JSON lines here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// TOML or JSON config file; built-in defaults when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_replay(&args),
        Commands::Config(args) => print_config(&args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("sheet=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    });
    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load a config file, choosing the parser by extension.
pub fn load_config(path: &Path) -> Result<SheetConfig> {
    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => SheetConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        Some("toml") => SheetConfig::from_toml_file(path)?,
        _ => {
            return Err(ReplayError::invalid(format!(
                "config must be .toml or .json: {}",
                path.display()
            )));
        }
    };
    Ok(config)
}

fn run_replay(args: &RunArgs) -> Result<()> {
    let mut trace = Trace::from_file(&args.trace)?;
    if let Some(path) = &args.config {
        trace.config = Some(load_config(path)?);
    }
    info!(
        target: "sheet.replay",
        trace = %args.trace.display(),
        steps = trace.steps.len(),
        "replaying trace"
    );

    let mut replayer = Replayer::for_trace(&trace)?;
    let lines = trace
        .steps
        .iter()
        .map(|step| replayer.apply(step))
        .collect::<Result<Vec<_>>>()?;

    match &args.output {
        Some(path) => write_jsonl(&lines, BufWriter::new(File::create(path)?)),
        None => write_jsonl(&lines, std::io::stdout().lock()),
    }
}

fn print_config(args: &ConfigArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => SheetConfig::default(),
    };
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &config)?;
    writeln!(out)?;
    Ok(())
}
