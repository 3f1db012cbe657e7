//! pixvtx: pixel cluster-shape vertex compatibility filter.
//!
//! Reads JSON Lines event files, decides every event and writes the
//! decisions to CSV or JSON Lines.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::{Parser, Subcommand};
use log::{debug, info};

use pixvtx_algorithms::ClusterShapeFilter;
use pixvtx_core::{DecisionRecord, DecisionStatistics, FilterConfig, PreparedEvent};
use pixvtx_io::{DecisionFileWriter, DecisionRow, DecisionSink, EventFileReader};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    PixvtxIo(#[from] pixvtx_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] pixvtx_core::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("event {0} not found")]
    EventNotFound(u64),
}

/// Pixel cluster-shape vertex compatibility filter.
#[derive(Parser)]
#[command(name = "pixvtx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide every event of one or more event files
    Process {
        /// Input event file(s), JSON Lines
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output file path (.csv or .jsonl)
        #[arg(short, long)]
        output: PathBuf,

        /// Filter configuration (JSON); defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write vertex estimates next to each decision
        #[arg(long)]
        diagnostics: bool,

        /// Worker threads (default: all cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Print the vertex scan profile of a single event
    Scan {
        /// Input event file, JSON Lines
        input: PathBuf,

        /// Event identifier
        #[arg(short, long)]
        event: u64,

        /// Filter configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show summary information about an event file
    Info {
        /// Input event file, JSON Lines
        input: PathBuf,
    },

    /// Print the effective filter configuration
    Config {
        /// Filter configuration (JSON)
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(path: Option<&Path>) -> Result<FilterConfig> {
    match path {
        Some(path) => Ok(pixvtx_io::load_config(path)?),
        None => {
            debug!("no configuration given, using defaults");
            Ok(FilterConfig::default())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(err) = run(cli.command) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Process {
            input,
            output,
            config,
            diagnostics,
            threads,
        } => {
            // Processing pipeline:
            // 1. Load and validate the configuration
            // 2. Read and prepare events per file
            // 3. Decide events in parallel
            // 4. Write decisions in input order

            let config = load_config(config.as_deref())?;
            let filter = ClusterShapeFilter::new(config)?;

            if let Some(threads) = threads {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build_global()?;
            }

            let start = Instant::now();
            let mut stats = DecisionStatistics::default();

            let mut writer = DecisionFileWriter::create(&output)?.with_diagnostics(diagnostics);
            info!("writing decisions to {}", output.display());

            for path in &input {
                info!("reading {}", path.display());
                let reader = EventFileReader::open(path)?;
                let events = reader.read_prepared()?;

                let (outcomes, file_stats) = filter.evaluate_batch(&events);
                for outcome in outcomes {
                    writer.write_row(&DecisionRow {
                        event: outcome.id,
                        decision: outcome.decision,
                        estimate: outcome.estimate,
                    })?;
                }

                info!(
                    "  {} events, {} accepted, {} rejected",
                    file_stats.events, file_stats.accepted, file_stats.rejected
                );
                stats.merge(&file_stats);
            }
            writer.flush()?;

            let elapsed = start.elapsed();

            println!(
                "Processed {} files in {:.2}s",
                input.len(),
                elapsed.as_secs_f64()
            );
            println!("Events: {}", stats.events);
            println!(
                "Accepted: {} ({:.1}%)",
                stats.accepted,
                stats.acceptance_rate() * 100.0
            );
            println!("Rejected: {}", stats.rejected);
            println!("Missing hit collections: {}", stats.missing_collections);
            println!("Mean pixel hits: {:.1}", stats.mean_hits());
        }

        Commands::Scan {
            input,
            event,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let filter = ClusterShapeFilter::new(config)?;

            let reader = EventFileReader::open(&input)?;
            let raw = reader
                .events()?
                .find(|e| e.as_ref().map_or(true, |e| e.id == event))
                .ok_or(CliError::EventNotFound(event))??;
            let prepared = raw.prepare();

            let Some(hits) = &prepared.hits else {
                println!("Event {}: no hit collection", event);
                println!("Decision: {:?}", DecisionRecord::missing_collection());
                return Ok(());
            };

            println!(
                "Event {}: {} vertex hits, {} pixel hits",
                event,
                hits.len(),
                prepared.multiplicity
            );
            println!("{:>10} | {:>6} | {:>10}", "z0", "count", "residual");
            println!("{:-<32}", "");
            for (z0, support) in filter.scanner().profile(hits) {
                if support.count > 0 {
                    println!(
                        "{:>10.3} | {:>6} | {:>10.4}",
                        z0, support.count, support.residual
                    );
                }
            }

            let estimate = filter.estimate(hits, prepared.multiplicity);
            println!();
            println!("Best z: {:.3}", estimate.best_z);
            println!(
                "Counts (best / minus / plus): {} / {} / {}",
                estimate.n_best, estimate.n_minus, estimate.n_plus
            );
            println!("Quality: {:.4}", estimate.quality);
            println!("Threshold: {:.4}", estimate.threshold);
            println!("Degenerate hits: {}", estimate.degenerate_hits);
            println!(
                "Decision: {}",
                if estimate.accepted() { "accept" } else { "reject" }
            );
        }

        Commands::Info { input } => {
            let reader = EventFileReader::open(&input)?;
            let events = reader.read_prepared()?;

            let missing = events.iter().filter(|e| e.hits.is_none()).count();
            let multiplicity: usize = events.iter().map(|e| e.multiplicity).sum();
            let vertex_hits: usize = events.iter().map(PreparedEvent::vertex_hit_count).sum();
            let degenerate: usize = events
                .iter()
                .filter_map(|e| e.hits.as_ref())
                .map(|hits| hits.iter().filter(|h| h.is_degenerate()).count())
                .sum();

            println!("File: {}", input.display());
            println!(
                "Size: {} bytes ({:.2} MB)",
                reader.file_size(),
                reader.file_size() as f64 / 1_000_000.0
            );
            println!("Events: {}", events.len());
            println!("Missing hit collections: {}", missing);
            println!("Pixel hits: {}", multiplicity);
            println!("Vertex hits (barrel, off edge): {}", vertex_hits);
            println!("Degenerate vertex hits: {}", degenerate);

            if let Some(max) = events.iter().map(|e| e.multiplicity).max() {
                let min = events.iter().map(|e| e.multiplicity).min().unwrap_or(0);
                println!("Multiplicity range: {} - {}", min, max);
            }
        }

        Commands::Config { config } => {
            let config = load_config(config.as_deref())?;
            println!("{}", pixvtx_io::config_to_json(&config)?);
        }
    }

    Ok(())
}
