//! looptour-io: native adapters for the looptour pipeline.
//!
//! Implements the pipeline's collaborator traits against the outside
//! world: a store-locator web service, an external TSP solver process,
//! and track files on disk.

pub mod command;
pub mod http;
pub mod track;

pub use command::{CommandSolver, CommandSolverConfig};
pub use http::{HttpLocationProvider, HttpProviderConfig, parse_records};
pub use track::{FileTrackWriter, TrackFormat};
