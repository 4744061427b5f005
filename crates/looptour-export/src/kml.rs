//! KML export serializer.
//!
//! Produces a KML 2.2 document holding a single `Placemark` whose
//! `LineString` follows the tour. The placemark carries the track name
//! and description. XML is written by the [`kml`] crate.

use std::collections::HashMap;

use kml::types::{Coord, Geometry, LineString, Placemark};
use kml::{Kml, KmlDocument, KmlWriter};

use looptour_pipeline::{Tour, TrackMetadata};

/// Namespace of KML 2.2 documents.
const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// Serialize `tour` into a KML document.
///
/// With `close_loop` the first stop is repeated at the end of the line.
/// A tour with fewer than two stops yields a placemark without geometry.
///
/// # Errors
///
/// Returns the [`kml::Error`] raised while writing XML.
///
/// # Examples
///
/// ```
/// use looptour_export::to_kml;
/// use looptour_pipeline::tsplib::parse_solution;
/// use looptour_pipeline::{Point, SolutionCheck, TrackMetadata};
///
/// let points = [Point::new("a", -122.0, 37.0), Point::new("b", -118.0, 34.0)];
/// let tour = parse_solution("2\n0 1\n", &points, SolutionCheck::Strict).unwrap();
/// let metadata = TrackMetadata { name: Some("CA KFC Tour"), description: None };
///
/// let kml = to_kml(&tour, &metadata, false).unwrap();
/// assert!(kml.contains("<name>CA KFC Tour</name>"));
/// assert!(kml.contains("<LineString>"));
/// ```
pub fn to_kml(
    tour: &Tour,
    metadata: &TrackMetadata<'_>,
    close_loop: bool,
) -> Result<String, kml::Error> {
    let geometry = (tour.len() >= 2).then(|| {
        let mut coords: Vec<Coord> = tour
            .coords()
            .map(|(lon, lat)| Coord {
                x: lon,
                y: lat,
                z: None,
            })
            .collect();
        if close_loop && let Some(first) = coords.first().cloned() {
            coords.push(first);
        }
        Geometry::LineString(LineString {
            coords,
            tessellate: true,
            ..LineString::default()
        })
    });

    let placemark = Placemark {
        name: metadata.name.map(str::to_owned),
        description: metadata.description.map(str::to_owned),
        geometry,
        ..Placemark::default()
    };
    let document = Kml::KmlDocument(KmlDocument {
        attrs: HashMap::from([("xmlns".to_owned(), KML_NAMESPACE.to_owned())]),
        elements: vec![Kml::Document {
            attrs: HashMap::new(),
            elements: vec![Kml::Placemark(placemark)],
        }],
        ..KmlDocument::default()
    });

    let mut buf = Vec::new();
    KmlWriter::from_writer(&mut buf).write(&document)?;

    // The writer emits no XML declaration, so we prepend it.
    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n",
        String::from_utf8_lossy(&buf)
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use looptour_pipeline::tsplib::parse_solution;
    use looptour_pipeline::{Point, SolutionCheck};

    use super::*;

    fn tour(solution: &str) -> Tour {
        let points = [
            Point::new("a", -122.0, 37.0),
            Point::new("b", -118.0, 34.0),
            Point::new(7, -117.5, 33.25),
        ];
        parse_solution(solution, &points, SolutionCheck::Lenient).unwrap()
    }

    fn meta() -> TrackMetadata<'static> {
        TrackMetadata {
            name: Some("CA KFC Tour"),
            description: Some("Tour of California KFC locations"),
        }
    }

    #[test]
    fn placemark_carries_name_and_description() {
        let kml = to_kml(&tour("3\n0 1 2\n"), &meta(), false).unwrap();
        assert!(kml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(kml.contains(KML_NAMESPACE));
        assert_eq!(kml.matches("<Placemark>").count(), 1);
        assert!(kml.contains("<name>CA KFC Tour</name>"));
        assert!(kml.contains("<description>Tour of California KFC locations</description>"));
    }

    #[test]
    fn line_follows_visiting_order() {
        let kml = to_kml(&tour("3\n2 0 1\n"), &meta(), false).unwrap();
        let start = kml.find("-117.5,33.25").unwrap();
        let middle = kml.find("-122,37").unwrap();
        let end = kml.find("-118,34").unwrap();
        assert!(start < middle && middle < end);
    }

    #[test]
    fn closed_loop_returns_to_start() {
        let open = to_kml(&tour("3\n2 0 1\n"), &meta(), false).unwrap();
        let closed = to_kml(&tour("3\n2 0 1\n"), &meta(), true).unwrap();
        assert_eq!(open.matches("-117.5,33.25").count(), 1);
        assert_eq!(closed.matches("-117.5,33.25").count(), 2);
    }

    #[test]
    fn single_stop_has_no_line() {
        let kml = to_kml(&tour("1\n1\n"), &meta(), true).unwrap();
        assert!(kml.contains("<Placemark>"));
        assert!(!kml.contains("<LineString>"));
    }

    #[test]
    fn special_characters_are_escaped() {
        let meta = TrackMetadata {
            name: Some("A & B"),
            description: None,
        };
        let kml = to_kml(&tour("2\n0 1\n"), &meta, false).unwrap();
        assert!(kml.contains("<name>A &amp; B</name>"));
        assert!(!kml.contains("<description>"));
    }
}
