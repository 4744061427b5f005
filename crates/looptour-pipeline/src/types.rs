//! Shared types for the looptour pipeline.

use std::fmt;
use std::path::PathBuf;

use geo::line_measures::Distance;
use geo::Haversine;
use serde::{Deserialize, Serialize};

use crate::provider::ProviderError;
use crate::solver::SolverError;
use crate::track::TrackError;

/// Identifier of a location as reported by a location provider.
///
/// Providers report either numeric or textual identifiers; both are
/// accepted verbatim. The derived ordering places every integer before
/// every string and orders naturally within each kind. This ordering
/// defines the snapshot index space (see [`PointStore`](crate::PointStore)).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    /// Numeric identifier.
    Integer(i64),
    /// Textual identifier.
    Text(String),
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for PointId {
    fn from(id: i64) -> Self {
        Self::Integer(id)
    }
}

impl From<i32> for PointId {
    fn from(id: i32) -> Self {
        Self::Integer(i64::from(id))
    }
}

impl From<&str> for PointId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

impl From<String> for PointId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// A location: identifier plus coordinates in signed decimal degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Stable identifier, unique per physical location.
    pub id: PointId,
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub fn new(id: impl Into<PointId>, lon: f64, lat: f64) -> Self {
        Self {
            id: id.into(),
            lon,
            lat,
        }
    }

    /// The `(lon, lat)` pair.
    #[must_use]
    pub const fn coord(&self) -> (f64, f64) {
        (self.lon, self.lat)
    }

    /// Whether both coordinates are bit-for-bit identical to `other`'s.
    #[must_use]
    pub fn same_position(&self, other: &Self) -> bool {
        self.lon.to_bits() == other.lon.to_bits() && self.lat.to_bits() == other.lat.to_bits()
    }

    /// Whether both coordinates are finite numbers.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    fn to_geo(&self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

/// A geographic query origin for a location provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Optional human-readable label, used only in log output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Anchor {
    /// Create an unlabeled anchor.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            label: None,
        }
    }

    /// Attach a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether the coordinates are finite and inside the valid
    /// longitude/latitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        valid_coordinates(self.lon, self.lat)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{label} ({}, {})", self.lon, self.lat),
            None => write!(f, "({}, {})", self.lon, self.lat),
        }
    }
}

/// Whether `lon`/`lat` are finite and within `[-180, 180]` / `[-90, 90]`.
#[must_use]
pub fn valid_coordinates(lon: f64, lat: f64) -> bool {
    lon.is_finite() && lat.is_finite() && (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat)
}

/// An ordered closed tour over the points of a snapshot.
///
/// Tours are only produced by the solution reader
/// ([`tsplib::parse_solution`](crate::tsplib::parse_solution)), which
/// dereferences solver indices against the snapshot that was written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tour(Vec<Point>);

impl Tour {
    pub(crate) const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the tour visits no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of stops.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// The stops in visiting order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// `(lon, lat)` pairs in visiting order.
    pub fn coords(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.0.iter().map(Point::coord)
    }

    /// Great-circle length of the closed loop in kilometres, including
    /// the leg from the last stop back to the first.
    #[must_use]
    pub fn length_km(&self) -> f64 {
        let legs = self.0.iter().zip(self.0.iter().cycle().skip(1));
        let meters: f64 = legs
            .map(|(from, to)| Haversine.distance(from.to_geo(), to.to_geo()))
            .sum();
        meters / 1000.0
    }
}

/// How strictly a solver's solution is checked against the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolutionCheck {
    /// The stated count must equal the snapshot size and every index must
    /// appear exactly once.
    #[default]
    Strict,
    /// Only index range and the stated count are checked.
    Lenient,
}

/// Configuration for a pipeline run.
///
/// Adapter settings (provider endpoint, solver executable) belong to the
/// adapters themselves; this struct only carries what the core needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Problem name. Written to the `NAME` header and used as the file
    /// stem of the problem file, so it must be a single path component
    /// without whitespace.
    pub name: String,

    /// Free-form description handed to track writers.
    pub description: String,

    /// Search origins queried in order during collection.
    pub anchors: Vec<Anchor>,

    /// Keep only records whose region matches (ASCII case-insensitive).
    /// `None` keeps everything.
    pub region: Option<String>,

    /// Directory receiving the problem, solution, and solver log files.
    pub work_dir: PathBuf,

    /// Solution validation mode.
    pub solution_check: SolutionCheck,
}

impl PipelineConfig {
    /// Default problem name.
    pub const DEFAULT_NAME: &str = "tour";

    /// Check the configuration before any work is done.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidName`] for an unusable name,
    /// [`ValidationError::NoAnchors`] when no anchor is configured, and
    /// [`ValidationError::InvalidAnchor`] for out-of-range anchors.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        if self.anchors.is_empty() {
            return Err(ValidationError::NoAnchors);
        }
        if let Some((index, anchor)) = self.anchors.iter().enumerate().find(|(_, a)| !a.is_valid()) {
            return Err(ValidationError::InvalidAnchor {
                index,
                lon: anchor.lon,
                lat: anchor.lat,
            });
        }
        Ok(())
    }

    /// Path of the problem file inside [`work_dir`](Self::work_dir).
    #[must_use]
    pub fn problem_path(&self) -> PathBuf {
        self.work_dir.join(format!("{}.tsp", self.name))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_owned(),
            description: String::new(),
            anchors: Vec::new(),
            region: None,
            work_dir: PathBuf::from("."),
            solution_check: SolutionCheck::default(),
        }
    }
}

/// Reject names that cannot serve as a TSPLIB `NAME` and file stem.
pub(crate) fn validate_name(name: &str) -> Result<(), ValidationError> {
    let unusable = name.is_empty()
        || name == "."
        || name == ".."
        || name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '/' || c == '\\');
    if unusable {
        return Err(ValidationError::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Querying the location provider and merging into the store.
    Collect,
    /// Writing the TSPLIB problem file.
    Write,
    /// Running the external solver.
    Solve,
    /// Reading the solution back into a tour.
    Read,
    /// Handing the tour to track writers.
    Export,
}

impl Stage {
    /// Lowercase stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Collect => "collect",
            Self::Write => "write",
            Self::Solve => "solve",
            Self::Read => "read",
            Self::Export => "export",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Input that cannot form a meaningful tour problem.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// No points to tour.
    #[error("point set is empty")]
    EmptyPointSet,

    /// The configuration lists no anchors to query.
    #[error("no anchors configured")]
    NoAnchors,

    /// An anchor lies outside the valid coordinate ranges.
    #[error("anchor {index} has invalid coordinates ({lon}, {lat})")]
    InvalidAnchor {
        /// Position in the anchor list.
        index: usize,
        /// Longitude as configured.
        lon: f64,
        /// Latitude as configured.
        lat: f64,
    },

    /// The problem name is empty or contains whitespace or path separators.
    #[error("invalid problem name {0:?}")]
    InvalidName(String),

    /// A point carries a NaN or infinite coordinate.
    #[error("point {id} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// The offending point.
        id: PointId,
    },
}

/// A malformed solution file.
///
/// Line numbers are 1-based and count the count line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The file is empty or its first line is blank.
    #[error("missing point count on line 1")]
    MissingCount,

    /// The first line is not a non-negative integer.
    #[error("invalid point count {value:?} on line 1")]
    InvalidCount {
        /// The offending text.
        value: String,
    },

    /// A token is not an integer.
    #[error("invalid index {token:?} on line {line}")]
    InvalidIndex {
        /// Line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// An index lies outside `[0, len)`.
    #[error("index {index} on line {line} is out of range for {len} points")]
    IndexOutOfRange {
        /// Line number.
        line: usize,
        /// The parsed index.
        index: i64,
        /// Number of points in the snapshot.
        len: usize,
    },

    /// An index appears more than once (strict mode only).
    #[error("index {index} on line {line} appears more than once")]
    DuplicateIndex {
        /// Line number of the repeat.
        line: usize,
        /// The repeated index.
        index: usize,
    },

    /// The stated count differs from the snapshot size (strict mode only).
    #[error("solution states {stated} points but {expected} were written")]
    DimensionMismatch {
        /// Count from line 1.
        stated: usize,
        /// Snapshot size.
        expected: usize,
    },

    /// The number of indices differs from the stated count.
    #[error("solution states {stated} points but lists {parsed}")]
    CountMismatch {
        /// Count from line 1.
        stated: usize,
        /// Indices actually parsed.
        parsed: usize,
    },
}

/// Errors that can occur during a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A file could not be created, written, or read.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A solution file is malformed.
    #[error("malformed solution: {0}")]
    Format(#[from] FormatError),

    /// The input cannot form a tour problem.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The external solver could not be run or failed.
    #[error("tour solver failed: {0}")]
    ExternalProcess(#[from] SolverError),

    /// A location provider query failed or returned malformed data.
    ///
    /// The built-in collection stage skips failing anchors instead of
    /// failing, so this is for callers that drive
    /// [`LocationProvider::query`](crate::LocationProvider::query) themselves
    /// and want to abort on the first bad anchor with `?`.
    #[error("location provider failed: {0}")]
    Provider(#[from] ProviderError),

    /// A track writer failed.
    #[error("track export failed: {0}")]
    Export(#[from] TrackError),

    /// Wraps an error with the stage it occurred in.
    #[error("{stage} stage failed: {source}")]
    Stage {
        /// The failing stage.
        stage: Stage,
        /// The underlying error.
        #[source]
        source: Box<Self>,
    },
}

impl PipelineError {
    /// Attribute the error to `stage` unless it already names one.
    #[must_use]
    pub fn in_stage(self, stage: Stage) -> Self {
        if matches!(self, Self::Stage { .. }) {
            return self;
        }
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The stage the error was attributed to, if any.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The error with any stage wrapper removed.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}
