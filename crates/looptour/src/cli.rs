//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use looptour_io::FileTrackWriter;
use looptour_pipeline::Anchor;

/// Build a closed tour through every location a store locator reports.
///
/// Queries the provider around each anchor, writes a TSPLIB problem,
/// runs the solver on it, reads the tour back, and writes the configured
/// tracks. Settings come from an optional JSON run configuration; flags
/// override individual fields.
#[derive(Debug, Parser)]
#[command(name = "looptour", version)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Run configuration file (JSON).
    #[arg(long, value_name = "FILE", conflicts_with = "config_json")]
    pub config: Option<PathBuf>,

    /// Run configuration as a JSON string.
    #[arg(long, value_name = "JSON")]
    pub config_json: Option<String>,

    /// Search origin. Repeat for several anchors; replaces the configured
    /// anchors.
    #[arg(
        long = "anchor",
        value_name = "LON,LAT[,LABEL]",
        value_parser = parse_anchor,
        allow_hyphen_values = true
    )]
    pub anchors: Vec<Anchor>,

    /// Keep only locations in this region (e.g. a state code).
    #[arg(long, conflicts_with = "all_regions")]
    pub region: Option<String>,

    /// Drop any configured region filter.
    #[arg(long)]
    pub all_regions: bool,

    /// Problem name, used as the file stem in the work directory.
    #[arg(long)]
    pub name: Option<String>,

    /// Track description.
    #[arg(long)]
    pub description: Option<String>,

    /// Directory for the problem, solution, and solver log.
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Accept solutions that repeat or skip points.
    #[arg(long)]
    pub lenient: bool,

    /// Store-locator URL.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Search radius sent to the store locator.
    #[arg(long)]
    pub max_distance: Option<u32>,

    /// Result cap sent to the store locator.
    #[arg(long)]
    pub max_results: Option<u32>,

    /// HTTP timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub request_timeout: Option<u64>,

    /// Solver executable.
    #[arg(long, value_name = "PROGRAM")]
    pub solver: Option<String>,

    /// Argument passed to the solver before the problem file. Repeatable;
    /// replaces the configured arguments.
    #[arg(long = "solver-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub solver_args: Vec<String>,

    /// Kill the solver after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub solver_timeout: Option<u64>,

    /// Track output file; the format follows the extension (.geojson,
    /// .json, .kml, .svg). Repeatable; replaces the configured tracks.
    #[arg(long = "track", value_name = "FILE", value_parser = parse_track)]
    pub tracks: Vec<FileTrackWriter>,

    /// Do not close GeoJSON or KML routes back to their first stop.
    #[arg(long)]
    pub open_route: bool,

    /// Output the result and diagnostics as JSON instead of a report.
    #[arg(long)]
    pub json: bool,

    /// Print the effective run configuration as JSON and exit.
    #[arg(long)]
    pub print_config: bool,

    /// More log output. Repeat for more detail.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Less log output. Repeat to show only errors.
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

impl Cli {
    /// Default log filter directive for the `-v`/`-q` counts.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match i16::from(self.verbose) - i16::from(self.quiet) {
            ..=-2 => "error",
            -1 => "warn",
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Parse `LON,LAT` or `LON,LAT,LABEL`.
fn parse_anchor(s: &str) -> Result<Anchor, String> {
    let mut parts = s.splitn(3, ',');
    let (Some(lon), Some(lat)) = (parts.next(), parts.next()) else {
        return Err(format!("expected LON,LAT[,LABEL], got {s:?}"));
    };
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude {lon:?}: {e}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude {lat:?}: {e}"))?;

    let anchor = Anchor::new(lon, lat);
    if !anchor.is_valid() {
        return Err(format!("({lon}, {lat}) is not a valid longitude/latitude"));
    }
    Ok(match parts.next().map(str::trim) {
        Some(label) if !label.is_empty() => anchor.with_label(label),
        _ => anchor,
    })
}

fn parse_track(s: &str) -> Result<FileTrackWriter, String> {
    FileTrackWriter::from_path(s)
        .ok_or_else(|| format!("cannot tell the track format of {s:?}; use .geojson, .json, .kml or .svg"))
}
