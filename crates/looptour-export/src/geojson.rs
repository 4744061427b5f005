//! GeoJSON export serializer.
//!
//! Produces a `FeatureCollection` holding the route as one `LineString`
//! feature followed by one `Point` feature per stop. Encoding is left to
//! [`serde_json`]; this module only decides the document shape.
//!
//! Coordinates are written as `[lon, lat]`, the GeoJSON axis order, with
//! the tour's full precision.

use looptour_pipeline::{Tour, TrackMetadata};
use serde_json::{Value, json};

/// Shape options for [`to_geojson`].
#[derive(Debug, Clone, Copy)]
pub struct GeoJsonOptions {
    /// Repeat the first stop at the end of the `LineString` so the
    /// route is drawn as a closed loop.
    pub close_loop: bool,
}

impl Default for GeoJsonOptions {
    fn default() -> Self {
        Self { close_loop: true }
    }
}

/// Serialize `tour` into a pretty-printed GeoJSON `FeatureCollection`.
///
/// The route feature is omitted for tours with fewer than two stops,
/// since a `LineString` needs at least two positions.
///
/// # Examples
///
/// ```
/// use looptour_export::{GeoJsonOptions, to_geojson};
/// use looptour_pipeline::tsplib::parse_solution;
/// use looptour_pipeline::{Point, SolutionCheck, TrackMetadata};
///
/// let points = [Point::new("a", -122.0, 37.0), Point::new("b", -118.0, 34.0)];
/// let tour = parse_solution("2\n1 0\n", &points, SolutionCheck::Strict).unwrap();
/// let metadata = TrackMetadata { name: Some("demo"), description: None };
///
/// let json = to_geojson(&tour, &metadata, GeoJsonOptions::default());
/// assert!(json.contains("\"FeatureCollection\""));
/// assert!(json.contains("\"LineString\""));
/// ```
#[must_use]
pub fn to_geojson(tour: &Tour, metadata: &TrackMetadata<'_>, options: GeoJsonOptions) -> String {
    let mut features = Vec::with_capacity(tour.len() + 1);

    if tour.len() >= 2 {
        let mut line: Vec<Value> = tour.coords().map(|(lon, lat)| json!([lon, lat])).collect();
        if options.close_loop
            && let Some(first) = line.first().cloned()
        {
            line.push(first);
        }
        features.push(json!({
            "type": "Feature",
            "properties": {
                "name": metadata.name,
                "description": metadata.description,
                "points": tour.len(),
                "length_km": tour.length_km(),
            },
            "geometry": {
                "type": "LineString",
                "coordinates": line,
            },
        }));
    }

    for (order, point) in tour.points().iter().enumerate() {
        features.push(json!({
            "type": "Feature",
            "properties": {
                "order": order,
                "id": point.id,
            },
            "geometry": {
                "type": "Point",
                "coordinates": [point.lon, point.lat],
            },
        }));
    }

    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    format!("{collection:#}\n")
}
