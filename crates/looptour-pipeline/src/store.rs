//! Point accumulation with deduplication by identifier.
//!
//! The store is a map keyed by [`PointId`]. Iteration is in ascending id
//! order, which makes every [`Snapshot`] reproducible and independent of
//! the order in which providers returned their records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{Point, PointId};

/// Accumulates points from repeated provider queries.
#[derive(Debug, Clone, Default)]
pub struct PointStore {
    points: BTreeMap<PointId, Point>,
}

impl PointStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `point`, replacing any point with the same id.
    ///
    /// Returns the replaced point, if there was one.
    pub fn add(&mut self, point: Point) -> Option<Point> {
        self.points.insert(point.id.clone(), point)
    }

    /// The stored point with the given id.
    #[must_use]
    pub fn get(&self, id: &PointId) -> Option<&Point> {
        self.points.get(id)
    }

    /// Number of distinct ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if nothing has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points in ascending id order.
    ///
    /// Repeated calls on an unmodified store return identical sequences.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.points.values().cloned().collect())
    }

    /// Consume the store into its snapshot. Same order as
    /// [`snapshot`](Self::snapshot).
    #[must_use]
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot(self.points.into_values().collect())
    }
}

impl Extend<Point> for PointStore {
    fn extend<I: IntoIterator<Item = Point>>(&mut self, iter: I) {
        for point in iter {
            self.add(point);
        }
    }
}

impl FromIterator<Point> for PointStore {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

/// An immutable, order-stable view of a [`PointStore`].
///
/// Position `i` in the snapshot is node `i + 1` in the problem file and
/// index `i` in the solver's solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot(Vec<Point>);

impl Snapshot {
    /// The points in index order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the snapshot holds no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The point at 0-based `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Point> {
        self.0.get(index)
    }
}

impl AsRef<[Point]> for Snapshot {
    fn as_ref(&self) -> &[Point] {
        &self.0
    }
}
