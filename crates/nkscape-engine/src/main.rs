//! `nkscape` command-line driver.
//!
//! # Subcommands
//!
//! - `run <config>` simulates every case of an experiment file and appends
//!   step records to one file per agent type, then prints a JSON summary.
//! - `landscape <config> --shock S --step T` prints the fitness of every
//!   configuration of one landscape, one value per line, in configuration
//!   id order.
//!
//! Logging goes to stderr. `RUST_LOG` takes precedence over the config
//! file's `logging.level`, which defaults to `info`.

mod error;

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use nkscape_core::runner::case_at;
use nkscape_core::{CaseSpec, ExperimentConfig, FileSink, inspect_landscape, run_experiment};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

#[derive(Parser, Debug)]
#[command(name = "nkscape")]
#[command(about = "Agents searching NK fitness landscapes under shocks and uncertainty")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Run every case of an experiment and write step records
    Run {
        /// Experiment YAML file
        config: PathBuf,

        /// Output directory, overriding `output.directory`
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the fitness of every configuration of one landscape
    Landscape {
        /// Experiment YAML file
        config: PathBuf,

        /// Shock index, in [0, number of thresholds]
        #[arg(long)]
        shock: usize,

        /// Number of implemented elements, in [0, N]
        #[arg(long)]
        step: usize,

        /// Case index within the file
        #[arg(long, default_value_t = 0)]
        case: usize,

        /// Run index whose random stream builds the landscape
        /// [default: the case's run count]
        #[arg(long)]
        run: Option<u32>,
    },
}

impl Command {
    fn config_path(&self) -> &Path {
        match self {
            Self::Run { config, .. } | Self::Landscape { config, .. } => config,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = ExperimentConfig::from_file(cli.command.config_path());
    let level = loaded
        .as_ref()
        .ok()
        .and_then(|config| config.logging.level.clone());
    init_tracing(level.as_deref());

    let result = loaded
        .map_err(EngineError::from)
        .and_then(|config| execute(&cli.command, &config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "nkscape failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn execute(command: &Command, config: &ExperimentConfig) -> Result<(), EngineError> {
    match command {
        Command::Run { output_dir, .. } => {
            let directory = output_dir
                .clone()
                .unwrap_or_else(|| config.output.directory.clone());
            info!(
                cases = config.cases.len(),
                runs = config.total_runs(),
                directory = %directory.display(),
                format = ?config.output.format,
                "experiment starting"
            );
            let mut sink = FileSink::new(directory, config.output.format);
            let summary = run_experiment(config, &mut sink)?;
            info!(
                cases = summary.cases,
                runs = summary.runs,
                records = summary.records,
                "experiment finished"
            );
            let mut stdout = io::stdout().lock();
            serde_json::to_writer(&mut stdout, &summary)?;
            writeln!(stdout)?;
            Ok(())
        }
        Command::Landscape {
            shock,
            step,
            case,
            run,
            ..
        } => {
            let spec = case_at(config, *case)?;
            let values = inspect_landscape(spec, inspection_run(spec, *run), *shock, *step)?;
            let mut out = BufWriter::new(io::stdout().lock());
            write_values(&mut out, &values)?;
            out.flush()?;
            Ok(())
        }
    }
}

/// The stream after the case's own runs unless one is named.
fn inspection_run(case: &CaseSpec, run: Option<u32>) -> u32 {
    run.unwrap_or(case.runs)
}

fn write_values(out: &mut impl Write, values: &[f64]) -> io::Result<()> {
    for value in values {
        writeln!(out, "{value:?}")?;
    }
    Ok(())
}
