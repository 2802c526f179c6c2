use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ddcore::pairing::reshape::to_component_view;
use ddtool::event::{process_event, run_batch, EventInputs};
use ddtool::io::{
    load_locations, load_station_windows, load_traces, save_component_windows, save_json,
    save_pairs, save_partition,
};
use ddtool::settings::{resolve_config, StageOverrides};

#[derive(Parser)]
#[command(name = "ddtool")]
#[command(about = "Double-difference measurement window pairing")]
struct Cli {
    /// Log filter, e.g. "debug" or "ddcore=trace" (defaults to RUST_LOG, then info)
    #[arg(long, global = true, value_parser = parse_log_filter)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Stage configuration shared by `pair` and `batch`.
#[derive(Args)]
struct StageArgs {
    /// Pairing config JSON; the built-in default has every stage disabled
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable the distance stage with this threshold (km)
    #[arg(long)]
    distance_km: Option<f64>,

    /// Enable the similarity stage with this cross-correlation threshold
    #[arg(long)]
    similarity: Option<f64>,

    /// Enable the phase stage with these phases, in preference order
    #[arg(long, value_delimiter = ',')]
    phases: Option<Vec<String>>,
}

impl StageArgs {
    fn overrides(&self) -> StageOverrides {
        StageOverrides {
            distance_km: self.distance_km,
            similarity: self.similarity,
            phases: self.phases.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert station-keyed windows into the component-keyed view
    Reshape {
        #[arg(short, long)]
        windows: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Pair the windows of one event
    Pair {
        #[arg(short, long)]
        windows: PathBuf,
        /// Channel coordinates, needed by the distance stage
        #[arg(short, long)]
        locations: Option<PathBuf>,
        /// Channel waveforms, needed by the similarity stage
        #[arg(short, long)]
        traces: Option<PathBuf>,
        #[command(flatten)]
        stages: StageArgs,
        #[arg(short, long)]
        output: PathBuf,
        /// Also write paired and single windows here
        #[arg(long)]
        partition_output: Option<PathBuf>,
        /// Also write the run summary here
        #[arg(long)]
        summary_output: Option<PathBuf>,
    },

    /// Pair every event directory under EVENTS_DIR in parallel
    Batch {
        #[arg(long)]
        events_dir: PathBuf,
        #[arg(long)]
        output_dir: PathBuf,
        #[command(flatten)]
        stages: StageArgs,
        /// Worker threads
        #[arg(long, default_value = "4")]
        num_threads: usize,
    },
}

fn parse_log_filter(s: &str) -> std::result::Result<String, String> {
    EnvFilter::try_new(s)
        .map(|_| s.to_string())
        .map_err(|e| format!("invalid log filter {:?}: {}", s, e))
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(l) => EnvFilter::new(l),
        None => match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(e) => {
                if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
                    eprintln!("ignoring invalid {}: {}", EnvFilter::DEFAULT_ENV, e);
                }
                EnvFilter::new("info")
            }
        },
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command {
        Commands::Reshape { windows, output } => {
            let station_windows = load_station_windows(&windows)?;
            let component_windows = to_component_view(&station_windows).context("reshaping windows")?;
            save_component_windows(&output, &component_windows)?;
            info!(output = %output.display(), components = component_windows.len(), "wrote component view");
        }

        Commands::Pair {
            windows,
            locations,
            traces,
            stages,
            output,
            partition_output,
            summary_output,
        } => {
            let config = resolve_config(stages.config.as_deref(), &stages.overrides())?;
            let inputs = EventInputs {
                windows: load_station_windows(&windows)?,
                locations: locations.as_deref().map(load_locations).transpose()?,
                traces: traces.as_deref().map(load_traces).transpose()?,
            };

            let outcome = process_event(&inputs, &config)?;
            save_pairs(&output, &outcome.pairs)?;
            if let Some(path) = partition_output {
                save_partition(&path, &outcome.partition)?;
            }
            if let Some(path) = summary_output {
                save_json(&path, &outcome.summary)?;
            }

            for stage in &outcome.summary.stages {
                info!(stage = %stage.stage, pairs = stage.pairs, "stage result");
            }
            info!(
                windows = outcome.summary.windows,
                candidates = outcome.summary.candidates,
                pairs = outcome.summary.final_pairs(),
                paired_windows = outcome.partition.paired_count(),
                single_windows = outcome.partition.single_count(),
                "pairing done"
            );
        }

        Commands::Batch {
            events_dir,
            output_dir,
            stages,
            num_threads,
        } => {
            let config = resolve_config(stages.config.as_deref(), &stages.overrides())?;
            fs::create_dir_all(&output_dir)
                .with_context(|| format!("cannot create {}", output_dir.display()))?;
            let reports = run_batch(&events_dir, &output_dir, &config, num_threads)?;
            save_json(&output_dir.join("batch_report.json"), &reports)?;

            let failed = reports.iter().filter(|r| r.error.is_some()).count();
            info!(events = reports.len(), failed, "batch done");
            if failed == reports.len() && !reports.is_empty() {
                bail!("all {} events failed", failed);
            }
        }
    }

    Ok(())
}
