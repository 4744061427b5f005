//! TSPLIB problem writer and solution reader.
//!
//! The writer numbers nodes `1..=N` in snapshot order. Solvers answer with
//! 0-based indices into the same order, so the reader only has to
//! dereference each index against the snapshot that was written:
//!
//! ```text
//! snapshot position i  <->  NODE_COORD_SECTION index i + 1  <->  solution index i
//! ```
//!
//! Coordinates are written as longitude then latitude with six decimals.
//! The solver only uses them for distances; the tour returned by the
//! reader carries the exact, unrounded values.

use std::fmt::Write;
use std::path::Path;

use crate::atomic::write_atomic;
use crate::types::{
    FormatError, PipelineError, Point, SolutionCheck, Tour, ValidationError, validate_name,
};

/// Serialize `points` into a TSPLIB `EUC_2D` problem.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyPointSet`] if `points` is empty,
/// [`ValidationError::InvalidName`] if `name` is unusable, and
/// [`ValidationError::NonFiniteCoordinate`] for NaN or infinite
/// coordinates.
///
/// # Examples
///
/// ```
/// use looptour_pipeline::Point;
/// use looptour_pipeline::tsplib::to_tsplib;
///
/// let text = to_tsplib("demo", &[Point::new("a", -122.0, 37.0)]).unwrap();
/// assert!(text.contains("DIMENSION : 1\n"));
/// assert!(text.contains("\n1 -122.000000 37.000000\n"));
/// ```
pub fn to_tsplib(name: &str, points: &[Point]) -> Result<String, ValidationError> {
    validate_name(name)?;
    if points.is_empty() {
        return Err(ValidationError::EmptyPointSet);
    }
    if let Some(point) = points.iter().find(|p| !p.is_finite()) {
        return Err(ValidationError::NonFiniteCoordinate {
            id: point.id.clone(),
        });
    }

    let mut out = String::with_capacity(96 + points.len() * 32);
    let _ = writeln!(out, "NAME : {name}");
    let _ = writeln!(out, "TYPE : TSP");
    let _ = writeln!(out, "DIMENSION : {}", points.len());
    let _ = writeln!(out, "EDGE_WEIGHT_TYPE : EUC_2D");
    let _ = writeln!(out, "NODE_COORD_SECTION");
    for (position, point) in points.iter().enumerate() {
        let _ = writeln!(out, "{} {:.6} {:.6}", position + 1, point.lon, point.lat);
    }
    let _ = writeln!(out, "EOF");
    Ok(out)
}

/// Write the problem for `points` to `path`, replacing it atomically.
///
/// # Errors
///
/// Returns [`PipelineError::Validation`] for the cases listed in
/// [`to_tsplib`] and [`PipelineError::Io`] if the file cannot be written.
pub fn write_problem_file(path: &Path, name: &str, points: &[Point]) -> Result<(), PipelineError> {
    let text = to_tsplib(name, points)?;
    write_atomic(path, text.as_bytes()).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a solver solution and dereference its indices against `points`.
///
/// The first line states a count; all following whitespace-separated
/// tokens are 0-based indices into `points`, in visiting order.
///
/// # Errors
///
/// Returns a [`FormatError`] if the count line is missing or invalid, a
/// token is not an integer, an index is out of range, or the number of
/// indices differs from the stated count. With [`SolutionCheck::Strict`]
/// the stated count must also equal `points.len()` and indices must not
/// repeat.
pub fn parse_solution(
    text: &str,
    points: &[Point],
    check: SolutionCheck,
) -> Result<Tour, FormatError> {
    let mut lines = text.lines();
    let count_line = lines.next().map(str::trim).unwrap_or_default();
    if count_line.is_empty() {
        return Err(FormatError::MissingCount);
    }
    let stated: usize = count_line.parse().map_err(|_| FormatError::InvalidCount {
        value: count_line.to_owned(),
    })?;

    let strict = check == SolutionCheck::Strict;
    if strict && stated != points.len() {
        return Err(FormatError::DimensionMismatch {
            stated,
            expected: points.len(),
        });
    }

    let mut seen = if strict {
        vec![false; points.len()]
    } else {
        Vec::new()
    };
    let mut stops = Vec::with_capacity(stated.min(points.len()));

    for (offset, line) in lines.enumerate() {
        let line_number = offset + 2;
        for token in line.split_whitespace() {
            let index: i64 = token.parse().map_err(|_| FormatError::InvalidIndex {
                line: line_number,
                token: token.to_owned(),
            })?;
            let position = usize::try_from(index)
                .ok()
                .filter(|&position| position < points.len())
                .ok_or(FormatError::IndexOutOfRange {
                    line: line_number,
                    index,
                    len: points.len(),
                })?;
            if let Some(visited) = seen.get_mut(position) {
                if *visited {
                    return Err(FormatError::DuplicateIndex {
                        line: line_number,
                        index: position,
                    });
                }
                *visited = true;
            }
            stops.push(points[position].clone());
        }
    }

    if stops.len() != stated {
        return Err(FormatError::CountMismatch {
            stated,
            parsed: stops.len(),
        });
    }
    Ok(Tour::new(stops))
}

/// Read the solution at `path` and dereference it against `points`.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] if the file cannot be read and
/// [`PipelineError::Format`] for the cases listed in [`parse_solution`].
pub fn read_solution_file(
    path: &Path,
    points: &[Point],
    check: SolutionCheck,
) -> Result<Tour, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_solution(&text, points, check)?)
}
