//! Command-line tour solver.
//!
//! Runs `program [args...] <problem file name>` with the problem's
//! directory as working directory, the way Concorde is normally invoked,
//! and expects `<stem>.<solution_extension>` next to the problem
//! afterwards. The child's stdout and stderr go to `<stem>.log` in the
//! same directory.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use looptour_pipeline::{SolverError, TourSolver, solution_path};

/// How often a child with a timeout is checked for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Settings for [`CommandSolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandSolverConfig {
    /// Executable name or path. Relative paths with a directory part are
    /// resolved against the current directory, not the problem's.
    pub program: String,
    /// Arguments placed before the problem file name.
    pub args: Vec<String>,
    /// Extension of the solution file the program writes.
    pub solution_extension: String,
    /// Kill the solver after this many seconds. `None` waits forever.
    pub timeout_secs: Option<u64>,
}

impl CommandSolverConfig {
    /// Default solver executable.
    pub const DEFAULT_PROGRAM: &str = "concorde";
    /// Default solution file extension.
    pub const DEFAULT_SOLUTION_EXTENSION: &str = "sol";
}

impl Default for CommandSolverConfig {
    fn default() -> Self {
        Self {
            program: Self::DEFAULT_PROGRAM.to_owned(),
            args: Vec::new(),
            solution_extension: Self::DEFAULT_SOLUTION_EXTENSION.to_owned(),
            timeout_secs: None,
        }
    }
}

/// [`TourSolver`] that runs an external executable.
#[derive(Debug, Clone)]
pub struct CommandSolver {
    config: CommandSolverConfig,
}

impl CommandSolver {
    /// Create a solver from its settings.
    #[must_use]
    pub const fn new(config: CommandSolverConfig) -> Self {
        Self { config }
    }

    /// The solver's settings.
    #[must_use]
    pub const fn config(&self) -> &CommandSolverConfig {
        &self.config
    }

    fn timeout(&self) -> Option<Duration> {
        self.config.timeout_secs.map(Duration::from_secs)
    }

    /// The executable to launch. Only relative paths such as
    /// `./concorde` are touched; bare names go through `PATH`.
    fn program(&self) -> Result<PathBuf, SolverError> {
        let program = Path::new(&self.config.program);
        if program.is_relative() && program.components().count() > 1 {
            std::path::absolute(program).map_err(|source| self.launch_error(source))
        } else {
            Ok(program.to_path_buf())
        }
    }

    fn launch_error(&self, source: std::io::Error) -> SolverError {
        SolverError::Launch {
            program: self.config.program.clone(),
            source,
        }
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, SolverError> {
        let waited = match self.timeout() {
            None => child.wait(),
            Some(limit) => return self.wait_with_timeout(child, limit),
        };
        waited.map_err(|e| SolverError::Other(format!("waiting for {}: {e}", self.config.program)))
    }

    fn wait_with_timeout(&self, child: &mut Child, limit: Duration) -> Result<ExitStatus, SolverError> {
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {}
                Err(e) => {
                    return Err(SolverError::Other(format!(
                        "waiting for {}: {e}",
                        self.config.program
                    )));
                }
            }

            let elapsed = start.elapsed();
            if elapsed >= limit {
                warn!(program = %self.config.program, ?limit, "solver timed out; killing it");
                // The child may exit between try_wait and kill.
                let _ = child.kill();
                let _ = child.wait();
                return Err(SolverError::Timeout {
                    program: self.config.program.clone(),
                    after: limit,
                });
            }
            thread::sleep(POLL_INTERVAL.min(limit - elapsed));
        }
    }
}

impl TourSolver for CommandSolver {
    fn solve(&self, problem: &Path) -> Result<PathBuf, SolverError> {
        let file_name = problem.file_name().ok_or_else(|| {
            SolverError::Other(format!("{} does not name a file", problem.display()))
        })?;
        let dir = match problem.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let solution = solution_path(problem, &self.config.solution_extension);
        let log = problem.with_extension("log");

        remove_stale(&solution)?;

        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| SolverError::Io { path, source }
        };
        let stdout = File::create(&log).map_err(io_error(&log))?;
        let stderr = stdout.try_clone().map_err(io_error(&log))?;

        info!(
            program = %self.config.program,
            problem = %problem.display(),
            log = %log.display(),
            "launching solver"
        );
        let started = Instant::now();
        let mut child = Command::new(self.program()?)
            .args(&self.config.args)
            .arg(file_name)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|source| self.launch_error(source))?;

        let status = self.wait(&mut child)?;
        info!(program = %self.config.program, %status, elapsed = ?started.elapsed(), "solver exited");

        if !status.success() {
            return Err(SolverError::Failed {
                program: self.config.program.clone(),
                status,
                log,
            });
        }
        if !solution.is_file() {
            return Err(SolverError::MissingSolution {
                program: self.config.program.clone(),
                path: solution,
            });
        }
        Ok(solution)
    }
}

/// Delete a solution left over from an earlier run.
fn remove_stale(solution: &Path) -> Result<(), SolverError> {
    match std::fs::remove_file(solution) {
        Ok(()) => {
            warn!(path = %solution.display(), "removed stale solution");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(SolverError::Io {
            path: solution.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    /// A solver that runs `script` through `sh`; the problem file name is `$1`.
    #[cfg(unix)]
    fn script(body: &str) -> CommandSolver {
        CommandSolver::new(CommandSolverConfig {
            program: "sh".into(),
            args: vec!["-c".into(), body.into(), "solver".into()],
            ..CommandSolverConfig::default()
        })
    }

    fn problem_in(dir: &Path) -> PathBuf {
        let problem = dir.join("ca.tsp");
        std::fs::write(&problem, "NAME : ca\nEOF\n").unwrap();
        problem
    }

    #[cfg(unix)]
    #[test]
    fn successful_run_returns_solution_next_to_problem() {
        let dir = tempfile::tempdir().unwrap();
        let problem = problem_in(dir.path());
        // `$1` is a bare file name, so it only resolves from the problem's directory.
        let solver = script(r#"test -f "$1" || exit 9; echo solving "$1"; printf '1\n0\n' > "${1%.tsp}.sol""#);

        let solution = solver.solve(&problem).unwrap();

        assert_eq!(solution, dir.path().join("ca.sol"));
        assert_eq!(std::fs::read_to_string(&solution).unwrap(), "1\n0\n");
        let log = std::fs::read_to_string(dir.path().join("ca.log")).unwrap();
        assert_eq!(log, "solving ca.tsp\n");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_names_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let problem = problem_in(dir.path());

        let err = script("echo boom >&2; exit 3").solve(&problem).unwrap_err();

        let (status, log) = match err {
            SolverError::Failed { status, log, .. } => (status, log),
            other => panic!("expected Failed, got {other:?}"),
        };
        assert_eq!(status.code(), Some(3));
        assert_eq!(std::fs::read_to_string(log).unwrap(), "boom\n");
    }

    #[cfg(unix)]
    #[test]
    fn stale_solution_is_not_mistaken_for_a_new_one() {
        let dir = tempfile::tempdir().unwrap();
        let problem = problem_in(dir.path());
        std::fs::write(dir.path().join("ca.sol"), "1\n0\n").unwrap();

        let err = script("exit 0").solve(&problem).unwrap_err();

        assert!(matches!(err, SolverError::MissingSolution { .. }), "{err:?}");
        assert!(!dir.path().join("ca.sol").exists());
    }

    #[cfg(unix)]
    #[test]
    fn slow_solver_is_killed() {
        let dir = tempfile::tempdir().unwrap();
        let problem = problem_in(dir.path());
        let mut solver = script("sleep 30");
        solver.config.timeout_secs = Some(1);

        let started = Instant::now();
        let err = solver.solve(&problem).unwrap_err();

        assert!(matches!(err, SolverError::Timeout { .. }), "{err:?}");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn custom_solution_extension() {
        let dir = tempfile::tempdir().unwrap();
        let problem = problem_in(dir.path());
        let mut solver = script(r#"printf '1\n0\n' > "${1%.tsp}.tour""#);
        solver.config.solution_extension = "tour".into();

        assert_eq!(solver.solve(&problem).unwrap(), dir.path().join("ca.tour"));
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let problem = problem_in(dir.path());
        let solver = CommandSolver::new(CommandSolverConfig {
            program: "looptour-no-such-solver".into(),
            ..CommandSolverConfig::default()
        });

        let err = solver.solve(&problem).unwrap_err();

        assert!(matches!(err, SolverError::Launch { .. }), "{err:?}");
        assert!(err.to_string().starts_with("failed to launch looptour-no-such-solver"));
    }

    #[test]
    fn default_config_runs_concorde() {
        let config: CommandSolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CommandSolverConfig::default());
        assert_eq!(config.program, "concorde");
        assert_eq!(config.solution_extension, "sol");
        assert!(config.timeout_secs.is_none());
    }
}
