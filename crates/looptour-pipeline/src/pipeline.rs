//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! ```rust,no_run
//! # use looptour_pipeline::{Pipeline, PipelineConfig, PipelineError};
//! # use looptour_pipeline::{LocationProvider, TourSolver, TrackWriter};
//! # fn run(
//! #     provider: &dyn LocationProvider,
//! #     solver: &dyn TourSolver,
//! #     tracks: &[&dyn TrackWriter],
//! # ) -> Result<(), PipelineError> {
//! let config = PipelineConfig::default();
//! let done = Pipeline::new(config)
//!     .collect(provider)?
//!     .write()?
//!     .solve(solver)?
//!     .read()?
//!     .export(tracks)?;
//!
//! let result = done.into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next state, carrying
//! everything computed so far. The point store is consumed into a
//! [`Snapshot`] when the problem file is written; from then on the
//! snapshot travels with the pipeline and the solution is read against
//! exactly that snapshot. Nothing can add points between writing and
//! reading.
//!
//! Every error leaving a stage method is wrapped with the [`Stage`] it
//! came from (see [`PipelineError::in_stage`]).

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::diagnostics::{Clock, PipelineDiagnostics, PipelineSummary, StageDiagnostics, StageMetrics};
use crate::provider::{self, CollectReport, LocationProvider};
use crate::solver::TourSolver;
use crate::store::{PointStore, Snapshot};
use crate::track::{TrackMetadata, TrackWriter};
use crate::tsplib;
use crate::types::{PipelineConfig, PipelineError, Stage, Tour, ValidationError};

// ───────────────────────── Pending ──────────────────────────

/// Pipeline state before anything has been queried.
///
/// Call [`collect`](Self::collect) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .collect() to continue"]
pub struct Pending {
    config: PipelineConfig,
}

impl Pending {
    /// The run configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validate the configuration, query `provider` around every anchor,
    /// and advance to [`Collected`].
    ///
    /// Anchors whose query fails are skipped (see
    /// [`provider::collect`]).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`] if the configuration is
    /// invalid or no point was collected.
    pub fn collect(self, provider: &dyn LocationProvider) -> Result<Collected, PipelineError> {
        let at = |e: ValidationError| PipelineError::from(e).in_stage(Stage::Collect);

        self.config.validate().map_err(at)?;

        let mut store = PointStore::new();
        let report = provider::collect(
            provider,
            &self.config.anchors,
            self.config.region.as_deref(),
            &mut store,
        );
        if store.is_empty() {
            return Err(at(ValidationError::EmptyPointSet));
        }

        Ok(Collected {
            config: self.config,
            store,
            report,
        })
    }
}

// ───────────────────────── Collected ──────────────────────────

/// Pipeline state after collection.
///
/// Call [`write`](Self::write) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .write() to continue"]
pub struct Collected {
    config: PipelineConfig,
    store: PointStore,
    report: CollectReport,
}

impl Collected {
    /// The collected points.
    #[must_use]
    pub const fn store(&self) -> &PointStore {
        &self.store
    }

    /// Collection counts.
    #[must_use]
    pub const fn report(&self) -> &CollectReport {
        &self.report
    }

    /// Freeze the store into a [`Snapshot`], write it as the problem file
    /// inside the work directory, and advance to [`Written`].
    ///
    /// The work directory is created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the directory or file cannot be
    /// written and [`PipelineError::Validation`] for coordinates the
    /// format cannot carry.
    pub fn write(self) -> Result<Written, PipelineError> {
        let at = |e: PipelineError| e.in_stage(Stage::Write);

        std::fs::create_dir_all(&self.config.work_dir).map_err(|source| {
            at(PipelineError::Io {
                path: self.config.work_dir.clone(),
                source,
            })
        })?;

        let snapshot = self.store.into_snapshot();
        let problem = self.config.problem_path();
        tsplib::write_problem_file(&problem, &self.config.name, snapshot.points()).map_err(at)?;
        info!(path = %problem.display(), points = snapshot.len(), "problem written");

        Ok(Written {
            config: self.config,
            report: self.report,
            snapshot,
            problem,
        })
    }
}

// ───────────────────────── Written ──────────────────────────

/// Pipeline state after the problem file has been written.
///
/// Call [`solve`](Self::solve) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .solve() to continue"]
pub struct Written {
    config: PipelineConfig,
    report: CollectReport,
    snapshot: Snapshot,
    problem: PathBuf,
}

impl Written {
    /// The frozen point order the problem was written in.
    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The problem file.
    #[must_use]
    pub fn problem(&self) -> &Path {
        &self.problem
    }

    /// Run `solver` on the problem file and advance to [`Solved`].
    ///
    /// Blocks until the solver returns.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ExternalProcess`] if the solver fails.
    pub fn solve(self, solver: &dyn TourSolver) -> Result<Solved, PipelineError> {
        let solution = solver
            .solve(&self.problem)
            .map_err(|e| PipelineError::from(e).in_stage(Stage::Solve))?;
        info!(path = %solution.display(), "solver finished");

        Ok(Solved {
            config: self.config,
            report: self.report,
            snapshot: self.snapshot,
            problem: self.problem,
            solution,
        })
    }
}

// ───────────────────────── Solved ──────────────────────────

/// Pipeline state after the solver produced a solution file.
///
/// Call [`read`](Self::read) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .read() to continue"]
pub struct Solved {
    config: PipelineConfig,
    report: CollectReport,
    snapshot: Snapshot,
    problem: PathBuf,
    solution: PathBuf,
}

impl Solved {
    /// The solution file.
    #[must_use]
    pub fn solution(&self) -> &Path {
        &self.solution
    }

    /// Read the solution against the carried snapshot and advance to
    /// [`Reconstructed`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the solution cannot be read and
    /// [`PipelineError::Format`] if it is malformed.
    pub fn read(self) -> Result<Reconstructed, PipelineError> {
        let tour = tsplib::read_solution_file(
            &self.solution,
            self.snapshot.points(),
            self.config.solution_check,
        )
        .map_err(|e| e.in_stage(Stage::Read))?;
        info!(stops = tour.len(), length_km = tour.length_km(), "tour reconstructed");

        Ok(Reconstructed {
            config: self.config,
            report: self.report,
            snapshot: self.snapshot,
            problem: self.problem,
            solution: self.solution,
            tour,
        })
    }
}

// ───────────────────────── Reconstructed ──────────────────────────

/// Pipeline state holding the finished tour.
///
/// Call [`export`](Self::export) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .export() to continue"]
pub struct Reconstructed {
    config: PipelineConfig,
    report: CollectReport,
    snapshot: Snapshot,
    problem: PathBuf,
    solution: PathBuf,
    tour: Tour,
}

impl Reconstructed {
    /// The tour in visiting order.
    #[must_use]
    pub const fn tour(&self) -> &Tour {
        &self.tour
    }

    /// Hand the tour to every writer in `tracks`, in order, and advance
    /// to [`Exported`]. An empty slice is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Export`] for the first writer that fails;
    /// later writers are not run.
    pub fn export(self, tracks: &[&dyn TrackWriter]) -> Result<Exported, PipelineError> {
        let description = Some(self.config.description.as_str()).filter(|d| !d.is_empty());
        let metadata = TrackMetadata {
            name: Some(&self.config.name),
            description,
        };

        let mut written = Vec::with_capacity(tracks.len());
        for track in tracks {
            track
                .write_track(&self.tour, &metadata)
                .map_err(|e| PipelineError::from(e).in_stage(Stage::Export))?;
            let label = track.label();
            info!(track = %label, "track written");
            written.push(label);
        }

        Ok(Exported {
            config: self.config,
            report: self.report,
            snapshot: self.snapshot,
            problem: self.problem,
            solution: self.solution,
            tour: self.tour,
            tracks: written,
        })
    }
}

// ───────────────────────── Exported ──────────────────────────

/// Final pipeline state.
///
/// Call [`into_result`](Self::into_result) to extract the [`TourResult`].
#[must_use = "call .into_result() to extract the TourResult"]
pub struct Exported {
    config: PipelineConfig,
    report: CollectReport,
    snapshot: Snapshot,
    problem: PathBuf,
    solution: PathBuf,
    tour: Tour,
    tracks: Vec<String>,
}

impl Exported {
    /// The tour in visiting order.
    #[must_use]
    pub const fn tour(&self) -> &Tour {
        &self.tour
    }

    /// Consume the pipeline and return everything it produced.
    #[must_use]
    pub fn into_result(self) -> TourResult {
        TourResult {
            name: self.config.name,
            collect: self.report,
            snapshot: self.snapshot,
            problem_path: self.problem,
            solution_path: self.solution,
            tour: self.tour,
            tracks: self.tracks,
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct TourResult {
    /// Problem name.
    pub name: String,
    /// Collection counts.
    pub collect: CollectReport,
    /// The point order shared by the problem and solution files.
    pub snapshot: Snapshot,
    /// The problem file.
    pub problem_path: PathBuf,
    /// The solution file.
    pub solution_path: PathBuf,
    /// The tour in visiting order.
    pub tour: Tour,
    /// Labels of the track writers that ran.
    pub tracks: Vec<String>,
}

// ──────────────────── PipelineStage trait ────────────────

/// Implemented by every state a stage method produces.
pub trait PipelineStage: Sized {
    /// The stage whose completion produced this state.
    const STAGE: Stage;

    /// Human-readable stage name.
    const NAME: &'static str = Self::STAGE.name();

    /// One-based position of [`STAGE`](Self::STAGE) in execution order.
    const INDEX: usize;

    /// Metrics describing the work done to reach this state.
    fn metrics(&self) -> StageMetrics;
}

/// Number of stages in a run.
pub const STAGE_COUNT: usize = 5;

impl PipelineStage for Collected {
    const STAGE: Stage = Stage::Collect;
    const INDEX: usize = 1;

    fn metrics(&self) -> StageMetrics {
        StageMetrics::Collect {
            anchors_queried: self.report.anchors_queried,
            anchors_failed: self.report.anchors_failed,
            records_received: self.report.records_received,
            records_filtered: self.report.records_filtered,
            duplicates: self.report.duplicates,
            points: self.report.points,
        }
    }
}

impl PipelineStage for Written {
    const STAGE: Stage = Stage::Write;
    const INDEX: usize = 2;

    fn metrics(&self) -> StageMetrics {
        StageMetrics::Write {
            points: self.snapshot.len(),
            path: self.problem.display().to_string(),
        }
    }
}

impl PipelineStage for Solved {
    const STAGE: Stage = Stage::Solve;
    const INDEX: usize = 3;

    fn metrics(&self) -> StageMetrics {
        StageMetrics::Solve {
            solution: self.solution.display().to_string(),
        }
    }
}

impl PipelineStage for Reconstructed {
    const STAGE: Stage = Stage::Read;
    const INDEX: usize = 4;

    fn metrics(&self) -> StageMetrics {
        StageMetrics::Read {
            stops: self.tour.len(),
            length_km: self.tour.length_km(),
        }
    }
}

impl PipelineStage for Exported {
    const STAGE: Stage = Stage::Export;
    const INDEX: usize = 5;

    fn metrics(&self) -> StageMetrics {
        StageMetrics::Export {
            writers: self.tracks.clone(),
        }
    }
}

// ──────────────────── One-call runners ────────────────

/// The external collaborators a run needs.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Location source queried during collection.
    pub provider: &'a dyn LocationProvider,
    /// Solver run on the problem file.
    pub solver: &'a dyn TourSolver,
    /// Writers receiving the finished tour, in order.
    pub tracks: &'a [&'a dyn TrackWriter],
}

/// Entry point for the typestate pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline for `config`.
    ///
    /// Nothing is validated or queried yet. Call
    /// [`.collect()`](Pending::collect) to begin.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(config: PipelineConfig) -> Pending {
        Pending { config }
    }
}

/// Run every stage to completion.
///
/// # Errors
///
/// Returns the first stage error, wrapped with its [`Stage`].
pub fn run(
    config: PipelineConfig,
    collaborators: Collaborators<'_>,
) -> Result<TourResult, PipelineError> {
    Ok(Pipeline::new(config)
        .collect(collaborators.provider)?
        .write()?
        .solve(collaborators.solver)?
        .read()?
        .export(collaborators.tracks)?
        .into_result())
}

/// Run every stage to completion, timing each one with `clock`.
///
/// # Errors
///
/// Returns the first stage error, wrapped with its [`Stage`].
pub fn run_with_diagnostics<C: Clock>(
    config: PipelineConfig,
    collaborators: Collaborators<'_>,
    clock: &C,
) -> Result<(TourResult, PipelineDiagnostics), PipelineError> {
    let start = clock.now();

    let (collected, collect) =
        timed(clock, || Pipeline::new(config).collect(collaborators.provider))?;
    let (written, write) = timed(clock, || collected.write())?;
    let (solved, solve) = timed(clock, || written.solve(collaborators.solver))?;
    let (reconstructed, read) = timed(clock, || solved.read())?;
    let (exported, export) = timed(clock, || reconstructed.export(collaborators.tracks))?;

    let total_duration = clock.elapsed(&start);
    let result = exported.into_result();
    let summary = PipelineSummary {
        name: result.name.clone(),
        point_count: result.snapshot.len(),
        stop_count: result.tour.len(),
        length_km: result.tour.length_km(),
    };

    Ok((
        result,
        PipelineDiagnostics {
            collect,
            write,
            solve,
            read,
            export,
            total_duration,
            summary,
        },
    ))
}

fn timed<C: Clock, S: PipelineStage>(
    clock: &C,
    step: impl FnOnce() -> Result<S, PipelineError>,
) -> Result<(S, StageDiagnostics), PipelineError> {
    let start = clock.now();
    let state = step()?;
    let diagnostics = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: state.metrics(),
    };
    Ok((state, diagnostics))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::time::Duration;

    use super::*;
    use crate::provider::tests::{TableProvider, record};
    use crate::solver::SolverError;
    use crate::track::TrackError;
    use crate::types::{Anchor, FormatError, PointId, SolutionCheck};

    /// Answers every problem with its nodes in reverse order.
    struct ReverseSolver;

    impl TourSolver for ReverseSolver {
        fn solve(&self, problem: &Path) -> Result<PathBuf, SolverError> {
            let text = std::fs::read_to_string(problem).unwrap();
            let n: usize = text
                .lines()
                .find_map(|l| l.strip_prefix("DIMENSION : "))
                .unwrap()
                .parse()
                .unwrap();
            let indices: Vec<String> = (0..n).rev().map(|i| i.to_string()).collect();
            let solution = problem.with_extension("sol");
            std::fs::write(&solution, format!("{n}\n{}\n", indices.join(" "))).unwrap();
            Ok(solution)
        }
    }

    /// Writes a fixed solution text regardless of the problem.
    struct CannedSolver(&'static str);

    impl TourSolver for CannedSolver {
        fn solve(&self, problem: &Path) -> Result<PathBuf, SolverError> {
            let solution = problem.with_extension("sol");
            std::fs::write(&solution, self.0).unwrap();
            Ok(solution)
        }
    }

    struct FailingSolver;

    impl TourSolver for FailingSolver {
        fn solve(&self, _problem: &Path) -> Result<PathBuf, SolverError> {
            Err(SolverError::Other("solver crashed".into()))
        }
    }

    #[derive(Default)]
    struct RecordingTrack {
        seen: RefCell<Vec<(Vec<PointId>, Option<String>, Option<String>)>>,
    }

    impl TrackWriter for RecordingTrack {
        fn label(&self) -> String {
            "recording".into()
        }

        fn write_track(&self, tour: &Tour, metadata: &TrackMetadata<'_>) -> Result<(), TrackError> {
            self.seen.borrow_mut().push((
                tour.points().iter().map(|p| p.id.clone()).collect(),
                metadata.name.map(str::to_owned),
                metadata.description.map(str::to_owned),
            ));
            Ok(())
        }
    }

    struct BrokenTrack;

    impl TrackWriter for BrokenTrack {
        fn label(&self) -> String {
            "broken".into()
        }

        fn write_track(&self, _tour: &Tour, _metadata: &TrackMetadata<'_>) -> Result<(), TrackError> {
            Err(TrackError::Encode("no space left".into()))
        }
    }

    /// Advances 5 ms on every reading.
    struct StepClock(Cell<u64>);

    impl Clock for StepClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.0.get();
            self.0.set(t + 5);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.0.get() - since)
        }
    }

    fn provider() -> TableProvider {
        TableProvider::default()
            .with(
                "north",
                vec![
                    record("a", -122.0, 37.0, "CA"),
                    record("b", -118.0, 34.0, "CA"),
                ],
            )
            .with(
                "south",
                vec![
                    record("b", -118.0, 34.0, "CA"),
                    record("c", -117.0, 33.0, "CA"),
                ],
            )
    }

    fn config(dir: &Path) -> PipelineConfig {
        PipelineConfig {
            name: "ca".into(),
            description: "three stops".into(),
            anchors: vec![
                Anchor::new(-121.0, 38.0).with_label("north"),
                Anchor::new(-117.5, 33.5).with_label("south"),
            ],
            work_dir: dir.join("work"),
            ..PipelineConfig::default()
        }
    }

    fn ids(tour: &Tour) -> Vec<String> {
        tour.points().iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn stages_advance_to_a_tour() {
        let dir = tempfile::tempdir().unwrap();
        let track = RecordingTrack::default();

        let collected = Pipeline::new(config(dir.path())).collect(&provider()).unwrap();
        assert_eq!(collected.store().len(), 3);
        assert_eq!(collected.report().duplicates, 1);

        let written = collected.write().unwrap();
        assert!(written.problem().exists());
        assert_eq!(written.snapshot().len(), 3);

        let solved = written.solve(&ReverseSolver).unwrap();
        let reconstructed = solved.read().unwrap();
        assert_eq!(ids(reconstructed.tour()), ["c", "b", "a"]);

        let result = reconstructed.export(&[&track]).unwrap().into_result();
        assert_eq!(result.tracks, ["recording"]);
        assert_eq!(
            track.seen.borrow().as_slice(),
            [(
                vec![PointId::from("c"), PointId::from("b"), PointId::from("a")],
                Some("ca".to_owned()),
                Some("three stops".to_owned()),
            )]
        );
    }

    #[test]
    fn tour_carries_unrounded_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let precise = TableProvider::default()
            .with("only", vec![record("p", -121.123_456_789, 39.987_654_321, "CA")]);
        let cfg = PipelineConfig {
            anchors: vec![Anchor::new(-121.0, 39.0).with_label("only")],
            ..config(dir.path())
        };

        let result = run(
            cfg,
            Collaborators {
                provider: &precise,
                solver: &CannedSolver("1\n0\n"),
                tracks: &[],
            },
        )
        .unwrap();

        assert_eq!(result.tour.points()[0].lon.to_bits(), (-121.123_456_789_f64).to_bits());
        assert_eq!(result.tour.points()[0].lat.to_bits(), 39.987_654_321_f64.to_bits());
    }

    #[test]
    fn no_points_fails_in_collect_stage() {
        let dir = tempfile::tempdir().unwrap();
        let err = Pipeline::new(config(dir.path()))
            .collect(&TableProvider::default())
            .err()
            .unwrap();
        assert_eq!(err.stage(), Some(Stage::Collect));
        assert!(matches!(
            err.root(),
            PipelineError::Validation(ValidationError::EmptyPointSet)
        ));
        assert!(!dir.path().join("work").exists());
    }

    #[test]
    fn invalid_config_fails_before_querying() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig {
            anchors: Vec::new(),
            ..config(dir.path())
        };
        let err = Pipeline::new(cfg).collect(&provider()).err().unwrap();
        assert!(matches!(
            err.root(),
            PipelineError::Validation(ValidationError::NoAnchors)
        ));
    }

    #[test]
    fn solver_failure_is_attributed_to_solve() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            config(dir.path()),
            Collaborators {
                provider: &provider(),
                solver: &FailingSolver,
                tracks: &[],
            },
        )
        .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Solve));
        assert!(err.to_string().starts_with("solve stage failed: tour solver failed"));
    }

    #[test]
    fn malformed_solution_is_attributed_to_read() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            config(dir.path()),
            Collaborators {
                provider: &provider(),
                solver: &CannedSolver("3\n0 1 7\n"),
                tracks: &[],
            },
        )
        .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Read));
        assert!(matches!(
            err.root(),
            PipelineError::Format(FormatError::IndexOutOfRange { index: 7, .. })
        ));
    }

    #[test]
    fn lenient_check_accepts_partial_tour() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig {
            solution_check: SolutionCheck::Lenient,
            ..config(dir.path())
        };
        let result = run(
            cfg,
            Collaborators {
                provider: &provider(),
                solver: &CannedSolver("2\n2 0\n"),
                tracks: &[],
            },
        )
        .unwrap();
        assert_eq!(ids(&result.tour), ["c", "a"]);
    }

    #[test]
    fn failing_track_stops_export() {
        let dir = tempfile::tempdir().unwrap();
        let after = RecordingTrack::default();
        let err = run(
            config(dir.path()),
            Collaborators {
                provider: &provider(),
                solver: &ReverseSolver,
                tracks: &[&BrokenTrack, &after],
            },
        )
        .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Export));
        assert!(after.seen.borrow().is_empty());
    }

    #[test]
    fn diagnostics_cover_every_stage() {
        let dir = tempfile::tempdir().unwrap();
        let track = RecordingTrack::default();
        let clock = StepClock(Cell::new(0));

        let (result, diag) = run_with_diagnostics(
            config(dir.path()),
            Collaborators {
                provider: &provider(),
                solver: &ReverseSolver,
                tracks: &[&track],
            },
            &clock,
        )
        .unwrap();

        assert_eq!(diag.summary.point_count, 3);
        assert_eq!(diag.summary.stop_count, 3);
        assert!((diag.summary.length_km - result.tour.length_km()).abs() < f64::EPSILON);
        for (name, stage) in diag.stages() {
            assert!(stage.duration > Duration::ZERO, "{name} has no duration");
        }
        assert!(diag.total_duration >= diag.collect.duration + diag.export.duration);
        assert_eq!(
            diag.export.metrics,
            StageMetrics::Export {
                writers: vec!["recording".into()]
            }
        );
        assert!(matches!(
            diag.collect.metrics,
            StageMetrics::Collect { points: 3, duplicates: 1, .. }
        ));
    }

    #[test]
    fn stage_constants_follow_execution_order() {
        assert_eq!(Collected::NAME, "collect");
        assert_eq!(Exported::NAME, "export");
        assert_eq!(Exported::INDEX, STAGE_COUNT);
        assert!(Written::INDEX < Solved::INDEX && Solved::INDEX < Reconstructed::INDEX);
    }
}
