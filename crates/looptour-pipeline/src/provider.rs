//! Location providers and point collection.
//!
//! A [`LocationProvider`] answers one query per [`Anchor`] with raw
//! [`LocationRecord`]s. Records are validated here, at the boundary, and
//! only well-formed [`Point`]s ever reach the [`PointStore`].
//!
//! Collection tolerates failing anchors: an anchor whose query fails, or
//! whose result set contains a malformed record, contributes nothing and
//! the next anchor is queried.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::store::PointStore;
use crate::types::{Anchor, Point, PointId, valid_coordinates};

/// Source of location records around an anchor.
///
/// Provider-side limits (search radius, result caps) are the
/// implementation's concern.
pub trait LocationProvider {
    /// Query records near `anchor`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the query fails or the response
    /// cannot be decoded.
    fn query(&self, anchor: &Anchor) -> Result<Vec<LocationRecord>, ProviderError>;
}

/// A raw record as returned by a provider.
///
/// Field aliases cover the store-locator response shape
/// (`entityID`, `longitude`, `latitude`, `state`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Provider identifier.
    #[serde(alias = "entityID")]
    pub id: PointId,
    /// Longitude in degrees.
    #[serde(alias = "longitude")]
    pub lon: f64,
    /// Latitude in degrees.
    #[serde(alias = "latitude")]
    pub lat: f64,
    /// Administrative region, e.g. a two-letter state code.
    #[serde(default, alias = "state")]
    pub region: Option<String>,
}

impl LocationRecord {
    /// Whether the record's region matches `region` (ASCII
    /// case-insensitive, surrounding whitespace ignored). Records
    /// without a region never match.
    #[must_use]
    pub fn in_region(&self, region: &str) -> bool {
        self.region
            .as_deref()
            .is_some_and(|r| r.trim().eq_ignore_ascii_case(region.trim()))
    }

    /// Validate the coordinates and convert into a [`Point`].
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidCoordinates`] for non-finite or
    /// out-of-range coordinates.
    pub fn into_point(self) -> Result<Point, ProviderError> {
        if !valid_coordinates(self.lon, self.lat) {
            return Err(ProviderError::InvalidCoordinates {
                id: self.id,
                lon: self.lon,
                lat: self.lat,
            });
        }
        Ok(Point {
            id: self.id,
            lon: self.lon,
            lat: self.lat,
        })
    }
}

/// Errors raised by location providers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// The request could not be completed.
    #[error("request failed: {0}")]
    Request(String),

    /// The response could not be decoded into records.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A record carries unusable coordinates.
    #[error("record {id} has invalid coordinates ({lon}, {lat})")]
    InvalidCoordinates {
        /// Record identifier.
        id: PointId,
        /// Longitude as received.
        lon: f64,
        /// Latitude as received.
        lat: f64,
    },
}

/// Counts gathered while collecting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectReport {
    /// Anchors queried.
    pub anchors_queried: usize,
    /// Anchors whose contribution was skipped.
    pub anchors_failed: usize,
    /// Records received from successful queries.
    pub records_received: usize,
    /// Records dropped by the region filter.
    pub records_filtered: usize,
    /// Records whose id was already in the store.
    pub duplicates: usize,
    /// Duplicates whose coordinates differed from the stored point.
    pub relocated: usize,
    /// Distinct points in the store afterwards.
    pub points: usize,
}

impl CollectReport {
    /// Anchors that contributed their results.
    #[must_use]
    pub const fn anchors_succeeded(&self) -> usize {
        self.anchors_queried - self.anchors_failed
    }
}

/// Query `provider` once per anchor and merge the results into `store`.
///
/// When `region` is set, records outside it are dropped before
/// validation. Anchors that fail are logged and skipped; the returned
/// report says how many.
pub fn collect(
    provider: &dyn LocationProvider,
    anchors: &[Anchor],
    region: Option<&str>,
    store: &mut PointStore,
) -> CollectReport {
    let mut report = CollectReport::default();

    for anchor in anchors {
        report.anchors_queried += 1;

        let records = match provider.query(anchor) {
            Ok(records) => records,
            Err(error) => {
                warn!(%anchor, %error, "skipping anchor: query failed");
                report.anchors_failed += 1;
                continue;
            }
        };
        let received = records.len();

        let (kept, filtered): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|record| region.is_none_or(|region| record.in_region(region)));

        let points = match kept
            .into_iter()
            .map(LocationRecord::into_point)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(points) => points,
            Err(error) => {
                warn!(%anchor, %error, "skipping anchor: malformed record");
                report.anchors_failed += 1;
                continue;
            }
        };

        report.records_received += received;
        report.records_filtered += filtered.len();
        let accepted = points.len();

        for point in points {
            if let Some(existing) = store.get(&point.id) {
                report.duplicates += 1;
                if !existing.same_position(&point) {
                    report.relocated += 1;
                    warn!(
                        id = %point.id,
                        old_lon = existing.lon,
                        old_lat = existing.lat,
                        new_lon = point.lon,
                        new_lat = point.lat,
                        "location reported at different coordinates; keeping the latest"
                    );
                }
            }
            store.add(point);
        }

        debug!(
            %anchor,
            received,
            filtered = filtered.len(),
            accepted,
            total = store.len(),
            "anchor merged"
        );
    }

    report.points = store.len();

    if report.anchors_succeeded() == 0 && !anchors.is_empty() {
        warn!(anchors = anchors.len(), "no anchor query succeeded");
    }
    info!(
        anchors = report.anchors_queried,
        failed = report.anchors_failed,
        records = report.records_received,
        duplicates = report.duplicates,
        points = report.points,
        "collection finished"
    );

    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Provider answering from a fixed table keyed by anchor label.
    /// Unknown labels fail.
    #[derive(Default)]
    pub(crate) struct TableProvider {
        pub(crate) answers: HashMap<String, Vec<LocationRecord>>,
    }

    impl TableProvider {
        pub(crate) fn with(mut self, label: &str, records: Vec<LocationRecord>) -> Self {
            self.answers.insert(label.to_owned(), records);
            self
        }
    }

    impl LocationProvider for TableProvider {
        fn query(&self, anchor: &Anchor) -> Result<Vec<LocationRecord>, ProviderError> {
            anchor
                .label
                .as_ref()
                .and_then(|label| self.answers.get(label))
                .cloned()
                .ok_or_else(|| ProviderError::Request(format!("no answer for {anchor}")))
        }
    }

    pub(crate) fn record(id: &str, lon: f64, lat: f64, region: &str) -> LocationRecord {
        LocationRecord {
            id: id.into(),
            lon,
            lat,
            region: Some(region.to_owned()),
        }
    }

    fn anchor(label: &str) -> Anchor {
        Anchor::new(0.0, 0.0).with_label(label)
    }

    #[test]
    fn overlapping_anchors_are_deduplicated() {
        let provider = TableProvider::default()
            .with(
                "north",
                vec![record("1", -121.8, 39.7, "CA"), record("2", -120.0, 38.0, "CA")],
            )
            .with(
                "south",
                vec![record("2", -120.0, 38.0, "CA"), record("3", -117.0, 34.8, "CA")],
            );
        let mut store = PointStore::new();

        let report = collect(
            &provider,
            &[anchor("north"), anchor("south")],
            None,
            &mut store,
        );

        assert_eq!(store.len(), 3);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.relocated, 0);
        assert_eq!(report.records_received, 4);
        assert_eq!(report.points, 3);
    }

    #[test]
    fn failing_anchor_is_skipped() {
        let provider =
            TableProvider::default().with("ok", vec![record("1", -121.8, 39.7, "CA")]);
        let mut store = PointStore::new();

        let report = collect(
            &provider,
            &[anchor("broken"), anchor("ok")],
            None,
            &mut store,
        );

        assert_eq!(report.anchors_queried, 2);
        assert_eq!(report.anchors_failed, 1);
        assert_eq!(report.anchors_succeeded(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn malformed_record_drops_whole_anchor() {
        let provider = TableProvider::default()
            .with(
                "bad",
                vec![record("1", -121.8, 39.7, "CA"), record("2", f64::NAN, 38.0, "CA")],
            )
            .with("good", vec![record("3", -117.0, 34.8, "CA")]);
        let mut store = PointStore::new();

        let report = collect(&provider, &[anchor("bad"), anchor("good")], None, &mut store);

        assert_eq!(report.anchors_failed, 1);
        assert_eq!(store.snapshot().points(), [Point::new("3", -117.0, 34.8)]);
    }

    #[test]
    fn region_filter_drops_other_regions() {
        let provider = TableProvider::default().with(
            "border",
            vec![
                record("1", -119.9, 39.2, "NV"),
                record("2", -120.0, 38.9, "ca"),
                LocationRecord {
                    id: "3".into(),
                    lon: -120.1,
                    lat: 38.8,
                    region: None,
                },
            ],
        );
        let mut store = PointStore::new();

        let report = collect(&provider, &[anchor("border")], Some("CA"), &mut store);

        assert_eq!(report.records_filtered, 2);
        assert_eq!(store.len(), 1);
        assert!(store.get(&"2".into()).is_some());
    }

    #[test]
    fn relocated_duplicate_keeps_latest() {
        let provider = TableProvider::default()
            .with("first", vec![record("1", -121.0, 39.0, "CA")])
            .with("second", vec![record("1", -121.5, 39.5, "CA")]);
        let mut store = PointStore::new();

        let report = collect(
            &provider,
            &[anchor("first"), anchor("second")],
            None,
            &mut store,
        );

        assert_eq!(report.relocated, 1);
        assert_eq!(
            store.get(&"1".into()),
            Some(&Point::new("1", -121.5, 39.5))
        );
    }

    #[test]
    fn all_anchors_failing_leaves_store_empty() {
        let provider = TableProvider::default();
        let mut store = PointStore::new();

        let report = collect(&provider, &[anchor("a"), anchor("b")], None, &mut store);

        assert_eq!(report.anchors_succeeded(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn record_deserializes_store_locator_fields() {
        let json = r#"[{"entityID": 1021, "longitude": -121.83, "latitude": 39.70, "state": "CA", "city": "Chico"}]"#;
        let records: Vec<LocationRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(
            records,
            vec![LocationRecord {
                id: PointId::Integer(1021),
                lon: -121.83,
                lat: 39.70,
                region: Some("CA".into()),
            }]
        );
    }

    #[test]
    fn out_of_range_record_is_rejected() {
        let err = record("9", -190.0, 10.0, "CA").into_point().unwrap_err();
        assert!(matches!(err, ProviderError::InvalidCoordinates { .. }));
    }

    /// Strict collection: stop at the first failing anchor and report it
    /// through the pipeline error type.
    fn collect_all_or_fail(
        provider: &dyn LocationProvider,
        anchors: &[Anchor],
    ) -> Result<PointStore, crate::PipelineError> {
        let mut store = PointStore::new();
        for anchor in anchors {
            for record in provider.query(anchor)? {
                store.add(record.into_point()?);
            }
        }
        Ok(store)
    }

    #[test]
    fn query_errors_convert_into_pipeline_errors() {
        let provider = TableProvider::default().with("north", vec![record("a", 1.0, 2.0, "CA")]);

        let store = collect_all_or_fail(&provider, &[anchor("north")]).unwrap();
        assert_eq!(store.len(), 1);

        let err = collect_all_or_fail(&provider, &[anchor("north"), anchor("lost")]).unwrap_err();
        assert!(matches!(
            err.root(),
            crate::PipelineError::Provider(ProviderError::Request(_))
        ));
        assert_eq!(
            err.in_stage(crate::Stage::Collect).to_string(),
            "collect stage failed: location provider failed: request failed: no answer for lost (0, 0)"
        );
    }
}
