//! looptour: build a closed tour through every location a store locator
//! reports, solved by an external TSP solver.
//!
//! Runs the full pipeline (collect, write, solve, read, export) and
//! prints per-stage timing and count diagnostics. Log output goes to
//! stderr and is controlled by `-v`/`-q` or `RUST_LOG`.
//!
//! # Usage
//!
//! ```text
//! looptour --config demos/california.json --track ca.geojson --track ca.svg
//! looptour --anchor=-121.83,39.70,Chico --region CA --solver ./concorde
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod config;

use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use looptour_io::{CommandSolver, HttpLocationProvider};
use looptour_pipeline::{Clock, Collaborators, PipelineDiagnostics, TourResult, TrackWriter};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::{RunConfig, config_from_cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    if cli.print_config {
        return print_json(&config);
    }

    run(config, cli.json)
}

/// Install the stderr subscriber. `RUST_LOG` wins over `-v`/`-q`.
fn init_logging(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: RunConfig, json: bool) -> ExitCode {
    let provider = HttpLocationProvider::new(config.provider);
    let solver = CommandSolver::new(config.solver);
    let tracks: Vec<&dyn TrackWriter> = config
        .tracks
        .iter()
        .map(|t| t as &dyn TrackWriter)
        .collect();

    info!(
        name = %config.pipeline.name,
        anchors = config.pipeline.anchors.len(),
        tracks = tracks.len(),
        "starting tour"
    );

    let outcome = looptour_pipeline::run_with_diagnostics(
        config.pipeline,
        Collaborators {
            provider: &provider,
            solver: &solver,
            tracks: &tracks,
        },
        &StdClock,
    );

    match outcome {
        Ok((result, diagnostics)) => {
            if json {
                print_json(&Output {
                    result: &result,
                    diagnostics: &diagnostics,
                })
            } else {
                println!("{}", diagnostics.report());
                for track in &result.tracks {
                    eprintln!("Track written: {track}");
                }
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!(stage = ?e.stage(), "run failed");
            eprintln!("Pipeline error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `--json` output.
#[derive(Serialize)]
struct Output<'a> {
    result: &'a TourResult,
    diagnostics: &'a PipelineDiagnostics,
}

fn print_json(value: &impl Serialize) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {e}");
            ExitCode::FAILURE
        }
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
