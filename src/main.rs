//! # Traffic-phase CLI
//!
//! Command-line interface for the traffic-phase library.
//! Replays a JSON command file against an intersection and writes the
//! vehicles released by every step as JSON.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, info};
use traffic_phase::{
    CommandFile, Intersection, IntersectionLayout, Preset, RunOptions, SimulationRunner,
};

mod cli;

/// Command-line interface for traffic-phase
#[derive(Parser)]
#[command(name = "traffic-phase")]
#[command(about = "Right-of-way scheduler for a four-way intersection")]
#[command(long_about = "Replays vehicle arrivals and scheduling steps from a JSON command file:
  traffic-phase input.json                       # Print step results to stdout
  traffic-phase input.json output.json           # Write step results to a file
  traffic-phase input.json --preset multi-lane   # Use a built-in lane layout
  traffic-phase input.json --layout lanes.json   # Use a custom lane layout

File Overwrite Behavior:
  By default an existing output file is replaced
  --no-clobber                                   # Never overwrite, fail if file exists")]
#[command(version = env!("PHASE_VERSION"))]
struct Cli {
    /// Command file with addVehicle and step commands
    input: String,

    /// Output file path, or "-" for stdout
    #[arg(default_value = "-")]
    output: String,

    /// Built-in lane layout
    #[arg(long, value_enum, default_value_t = Preset::SingleLane)]
    preset: Preset,

    /// JSON lane layout file; overrides --preset
    #[arg(long)]
    layout: Option<String>,

    /// Skip vehicles that cannot be admitted instead of failing
    #[arg(long)]
    skip_invalid: bool,

    /// Validate the command file and layout without running the simulation
    #[arg(long)]
    dry_run: bool,

    /// Never overwrite existing files (fail if destination exists)
    #[arg(long)]
    no_clobber: bool,

    /// Show a progress bar over processed commands
    #[arg(long)]
    progress: bool,

    /// Enable verbose logging, including road states after every command
    #[arg(short, long)]
    verbose: bool,
}

/// Output destination types
#[derive(Debug, PartialEq)]
enum OutputDestination {
    File(String),
    Stdout,
}

/// Resolve output destination from CLI arguments
fn resolve_output(output: &str) -> OutputDestination {
    if output == "-" || output.is_empty() {
        OutputDestination::Stdout
    } else {
        OutputDestination::File(output.to_string())
    }
}

fn main() {
    if let Err(e) = run() {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr; RUST_LOG takes precedence
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    info!("🚦 traffic-phase v{} starting...", env!("PHASE_VERSION"));

    let intersection = build_intersection(cli.layout.as_deref(), cli.preset)?;
    let file = CommandFile::from_path(&cli.input)
        .with_context(|| format!("failed to read command file '{}'", cli.input))?;
    let output = resolve_output(&cli.output);

    if cli.dry_run {
        let stats = file
            .validate(&intersection)
            .with_context(|| format!("invalid command file '{}'", cli.input))?;
        eprintln!("🔍 [DRY RUN] {}: {stats}, output to {output:?}", cli.input);
        return Ok(());
    }

    if let OutputDestination::File(path) = &output {
        if cli.no_clobber && Path::new(path).exists() {
            bail!("output file '{path}' already exists (--no-clobber)");
        }
    }

    let mut options = RunOptions {
        skip_invalid: cli.skip_invalid,
        ..Default::default()
    };
    let progress = cli.progress.then(|| {
        cli::ProgressManager::new(
            file.commands.len() as u64,
            &format!("🚗 Replaying {}", cli.input),
        )
    });
    if let Some(manager) = &progress {
        options.progress = Some(manager.callback());
    }

    let mut runner = SimulationRunner::with_options(intersection, options);
    let result = if cli.verbose {
        runner.run_observed(&file.commands, &mut cli::StateLogger)
    } else {
        runner.run(&file.commands)
    }
    .context("simulation failed")?;

    if runner.skipped() > 0 {
        eprintln!("⚠️  Skipped {} vehicles", runner.skipped());
    }

    let json = result.to_json_pretty()?;
    match output {
        OutputDestination::File(path) => {
            std::fs::write(&path, format!("{json}\n"))
                .with_context(|| format!("failed to write output file '{path}'"))?;
            eprintln!("📁 Saved to: {path}");
        }
        OutputDestination::Stdout => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("failed to write to stdout")?;
        }
    }

    Ok(())
}

/// Layout file if given, otherwise the preset
fn build_intersection(layout: Option<&str>, preset: Preset) -> Result<Intersection> {
    match layout {
        Some(path) => {
            let layout = IntersectionLayout::from_path(path)
                .with_context(|| format!("failed to read layout file '{path}'"))?;
            layout
                .build()
                .with_context(|| format!("invalid layout in '{path}'"))
        }
        None => Ok(preset.build()?),
    }
}
