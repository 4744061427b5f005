//! Pipeline diagnostics: timing and counts for each stage.
//!
//! [`run_with_diagnostics`](crate::run_with_diagnostics) collects these
//! alongside the tour. Time is read through the [`Clock`] trait so the
//! core never touches a platform timer directly; the binary supplies a
//! [`std::time::Instant`]-backed clock and tests supply a fake one.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::fmt::Write;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: provider queries and merging.
    pub collect: StageDiagnostics,
    /// Stage 2: problem file.
    pub write: StageDiagnostics,
    /// Stage 3: external solver.
    pub solve: StageDiagnostics,
    /// Stage 4: solution file.
    pub read: StageDiagnostics,
    /// Stage 5: track writers.
    pub export: StageDiagnostics,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Collection metrics.
    Collect {
        /// Anchors queried.
        anchors_queried: usize,
        /// Anchors skipped after a failed query or malformed record.
        anchors_failed: usize,
        /// Records received.
        records_received: usize,
        /// Records dropped by the region filter.
        records_filtered: usize,
        /// Records merged onto an existing id.
        duplicates: usize,
        /// Distinct points collected.
        points: usize,
    },
    /// Problem file metrics.
    Write {
        /// Nodes written.
        points: usize,
        /// Problem file location.
        path: String,
    },
    /// Solver metrics.
    Solve {
        /// Solution file location.
        solution: String,
    },
    /// Solution reading metrics.
    Read {
        /// Stops in the tour.
        stops: usize,
        /// Closed-loop length in kilometres.
        length_km: f64,
    },
    /// Export metrics.
    Export {
        /// Labels of the writers that ran, in order.
        writers: Vec<String>,
    },
}

/// High-level summary counts for the entire run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Problem name.
    pub name: String,
    /// Distinct points collected.
    pub point_count: usize,
    /// Stops in the final tour.
    pub stop_count: usize,
    /// Closed-loop tour length in kilometres.
    pub length_km: f64,
}

impl PipelineDiagnostics {
    /// Stages in execution order with their display names.
    #[must_use]
    pub fn stages(&self) -> [(&'static str, &StageDiagnostics); 5] {
        [
            ("Collect", &self.collect),
            ("Write", &self.write),
            ("Solve", &self.solve),
            ("Read", &self.read),
            ("Export", &self.export),
        ]
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Pipeline Diagnostics Report\n{}", "=".repeat(60));
        let _ = writeln!(
            out,
            "Tour: {} ({} points, {} stops, {:.1} km)",
            self.summary.name,
            self.summary.point_count,
            self.summary.stop_count,
            self.summary.length_km,
        );
        let _ = writeln!(
            out,
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration)
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<12} {:>12} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        );
        let _ = writeln!(out, "{}", "-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for (name, diag) in self.stages() {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            let _ = writeln!(out, "{name:<12} {ms:>10.3}ms {pct:>9.1}%  {details}");
        }

        out.truncate(out.trim_end().len());
        out
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Collect {
            anchors_queried,
            anchors_failed,
            records_received,
            records_filtered,
            duplicates,
            points,
        } => format!(
            "{anchors_queried} anchors ({anchors_failed} failed), {records_received} records, \
             {records_filtered} filtered, {duplicates} dup -> {points} pts"
        ),
        StageMetrics::Write { points, path } => format!("{points} nodes -> {path}"),
        StageMetrics::Solve { solution } => format!("solution {solution}"),
        StageMetrics::Read { stops, length_km } => format!("{stops} stops, {length_km:.1} km"),
        StageMetrics::Export { writers } if writers.is_empty() => "no writers".to_owned(),
        StageMetrics::Export { writers } => writers.join(", "),
    }
}
