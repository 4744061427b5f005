//! Run configuration: a JSON document plus command-line overrides.

use std::path::Path;

use looptour_io::{CommandSolverConfig, FileTrackWriter, HttpProviderConfig, TrackFormat};
use looptour_pipeline::{PipelineConfig, SolutionCheck};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Everything a run needs: the core pipeline settings plus the adapters
/// plugged into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Core pipeline settings.
    pub pipeline: PipelineConfig,
    /// Store-locator settings.
    pub provider: HttpProviderConfig,
    /// Solver executable settings.
    pub solver: CommandSolverConfig,
    /// Track outputs. Empty means one GeoJSON file named after the
    /// problem in the work directory.
    pub tracks: Vec<FileTrackWriter>,
}

impl RunConfig {
    /// Read a run configuration file.
    ///
    /// # Errors
    ///
    /// Returns a message naming the file if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
        serde_json::from_str(&text).map_err(|e| format!("Error parsing {}: {e}", path.display()))
    }

    /// The track written when none is configured.
    fn default_track(&self) -> FileTrackWriter {
        let path = self
            .pipeline
            .work_dir
            .join(format!("{}.{}", self.pipeline.name, TrackFormat::GeoJson.extension()));
        FileTrackWriter::new(path, TrackFormat::GeoJson)
    }
}

/// Build the effective [`RunConfig`] from CLI arguments.
///
/// Starts from `--config-json`, `--config`, or the defaults, then
/// applies every flag that was given.
///
/// # Errors
///
/// Returns a message if the configuration JSON cannot be read or parsed.
pub fn config_from_cli(cli: &Cli) -> Result<RunConfig, String> {
    let mut config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else if let Some(ref path) = cli.config {
        RunConfig::load(path)?
    } else {
        RunConfig::default()
    };

    let pipeline = &mut config.pipeline;
    if !cli.anchors.is_empty() {
        pipeline.anchors.clone_from(&cli.anchors);
    }
    if cli.all_regions {
        pipeline.region = None;
    } else if cli.region.is_some() {
        pipeline.region.clone_from(&cli.region);
    }
    if let Some(ref name) = cli.name {
        pipeline.name.clone_from(name);
    }
    if let Some(ref description) = cli.description {
        pipeline.description.clone_from(description);
    }
    if let Some(ref dir) = cli.work_dir {
        pipeline.work_dir.clone_from(dir);
    }
    if cli.lenient {
        pipeline.solution_check = SolutionCheck::Lenient;
    }

    let provider = &mut config.provider;
    if let Some(ref endpoint) = cli.endpoint {
        provider.endpoint.clone_from(endpoint);
    }
    if let Some(max_distance) = cli.max_distance {
        provider.max_distance = max_distance;
    }
    if let Some(max_results) = cli.max_results {
        provider.max_results = max_results;
    }
    if let Some(timeout) = cli.request_timeout {
        provider.timeout_secs = timeout;
    }

    let solver = &mut config.solver;
    if let Some(ref program) = cli.solver {
        solver.program.clone_from(program);
    }
    if !cli.solver_args.is_empty() {
        solver.args.clone_from(&cli.solver_args);
    }
    if cli.solver_timeout.is_some() {
        solver.timeout_secs = cli.solver_timeout;
    }

    if !cli.tracks.is_empty() {
        config.tracks.clone_from(&cli.tracks);
    }
    if config.tracks.is_empty() {
        config.tracks.push(config.default_track());
    }
    if cli.open_route {
        for track in &mut config.tracks {
            track.close_loop = false;
        }
    }

    Ok(config)
}
