//! looptour-pipeline: point collection and the TSPLIB round trip.
//!
//! Builds a closed tour over geographic points:
//! collect -> write problem -> solve (external) -> read solution -> export.
//!
//! Collection, solving, and track output go through the
//! [`LocationProvider`], [`TourSolver`], and [`TrackWriter`] traits. This
//! crate implements none of them against the network or a process; the
//! concrete adapters live in `looptour-io`. The only I/O done here is
//! writing the problem file and reading the solution file.
//!
//! Index stability is the central invariant. Points are deduplicated by
//! id in a [`PointStore`], frozen once into a [`Snapshot`], written with
//! 1-based node numbers in snapshot order, and the solver's 0-based
//! indices are dereferenced against that same snapshot.

pub mod atomic;
pub mod diagnostics;
pub mod pipeline;
pub mod provider;
pub mod solver;
pub mod store;
pub mod track;
pub mod tsplib;
pub mod types;

pub use diagnostics::{Clock, PipelineDiagnostics};
pub use pipeline::{Collaborators, Pipeline, TourResult, run, run_with_diagnostics};
pub use provider::{CollectReport, LocationProvider, LocationRecord, ProviderError};
pub use solver::{SolverError, TourSolver, solution_path};
pub use store::{PointStore, Snapshot};
pub use track::{TrackError, TrackMetadata, TrackWriter};
pub use types::{
    Anchor, FormatError, PipelineConfig, PipelineError, Point, PointId, SolutionCheck, Stage, Tour,
    ValidationError,
};
