//! The external tour solver seam.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

/// An out-of-process TSP solver.
///
/// Implementations block until the solver finishes and return the path of
/// the solution file it produced. The solution must list 0-based indices
/// into the problem's node order.
pub trait TourSolver {
    /// Solve the problem stored at `problem`.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the solver cannot be launched, exits
    /// unsuccessfully, times out, or leaves no solution behind.
    fn solve(&self, problem: &Path) -> Result<PathBuf, SolverError>;
}

/// Errors raised while running an external solver.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// The executable could not be started.
    #[error("failed to launch {program}: {source}")]
    Launch {
        /// Program name or path.
        program: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// File handling around the solver run failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The solver exited unsuccessfully.
    #[error("{program} exited with {status} (see {})", .log.display())]
    Failed {
        /// Program name or path.
        program: String,
        /// Exit status.
        status: ExitStatus,
        /// File holding the solver's output.
        log: PathBuf,
    },

    /// The solver did not finish in time and was killed.
    #[error("{program} did not finish within {after:?}")]
    Timeout {
        /// Program name or path.
        program: String,
        /// The configured limit.
        after: Duration,
    },

    /// The solver exited successfully but wrote no solution file.
    #[error("{program} produced no solution at {}", .path.display())]
    MissingSolution {
        /// Program name or path.
        program: String,
        /// Where the solution was expected.
        path: PathBuf,
    },

    /// Any other solver failure.
    #[error("{0}")]
    Other(String),
}

/// Where a solver writing `<stem>.<extension>` next to `problem` leaves
/// its solution.
#[must_use]
pub fn solution_path(problem: &Path, extension: &str) -> PathBuf {
    problem.with_extension(extension)
}
