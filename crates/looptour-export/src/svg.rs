//! SVG preview serializer.
//!
//! Draws the tour as a closed `<path>` plus one `<circle>` per stop, using
//! the [`svg`] crate for document construction, XML escaping, and path
//! data formatting.
//!
//! Coordinates are projected equirectangularly: longitude is scaled by
//! the cosine of the tour's mean latitude, latitude is flipped so north
//! is up, and the result is fitted so the longer side spans
//! [`PREVIEW_SIZE`] user units.
//!
//! Optional metadata embeds `<title>` and `<desc>` elements.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Group, Path, Title};
use svg::node::{Text, Value};

use looptour_pipeline::{Point, Tour, TrackMetadata};

/// Length of the longer document side, margins included.
pub const PREVIEW_SIZE: f64 = 800.0;
/// Blank border around the drawing.
const MARGIN: f64 = 16.0;
/// Radius of the stop markers.
const STOP_RADIUS: f64 = 3.0;
/// Lower bound for the longitude scale near the poles.
const MIN_COS_LAT: f64 = 1e-6;

/// Build an SVG path `d` attribute from projected coordinates.
///
/// Uses `M` for the first position and `L` for the rest, closing with `z`
/// when `close` is set. Returns an empty string for fewer than 2
/// positions.
///
/// # Examples
///
/// ```
/// use looptour_export::build_path_data;
///
/// let d = build_path_data(&[(10.0, 20.0), (30.0, 40.0)], false);
/// assert_eq!(d, "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(positions: &[(f64, f64)], close: bool) -> String {
    let [first, rest @ ..] = positions else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to(*first);
    for &p in rest {
        data = data.line_to(p);
    }
    if close {
        data = data.close();
    }
    String::from(Value::from(data))
}

/// Maps `(lon, lat)` onto document coordinates.
#[derive(Debug, Clone, Copy)]
struct Projection {
    cos_lat: f64,
    min_x: f64,
    max_y: f64,
    scale: f64,
    width: f64,
    height: f64,
}

impl Projection {
    /// Fit the stops into the preview. `None` for an empty tour.
    #[allow(clippy::cast_precision_loss)]
    fn fit(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mean_lat = points.iter().map(|p| p.lat).sum::<f64>() / points.len() as f64;
        let cos_lat = mean_lat.to_radians().cos().max(MIN_COS_LAT);

        let (mut min_x, mut max_x) = (first.lon * cos_lat, first.lon * cos_lat);
        let (mut min_y, mut max_y) = (first.lat, first.lat);
        for p in points {
            let x = p.lon * cos_lat;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(p.lat);
            max_y = max_y.max(p.lat);
        }

        let extent = (max_x - min_x).max(max_y - min_y);
        let scale = if extent > 0.0 {
            2.0f64.mul_add(-MARGIN, PREVIEW_SIZE) / extent
        } else {
            1.0
        };

        Some(Self {
            cos_lat,
            min_x,
            max_y,
            scale,
            width: (max_x - min_x).mul_add(scale, 2.0 * MARGIN),
            height: (max_y - min_y).mul_add(scale, 2.0 * MARGIN),
        })
    }

    // Same product as in `fit`, so the westernmost stop lands exactly on
    // the margin.
    #[allow(clippy::suboptimal_flops)]
    fn apply(&self, point: &Point) -> (f64, f64) {
        (
            (point.lon * self.cos_lat - self.min_x) * self.scale + MARGIN,
            (self.max_y - point.lat) * self.scale + MARGIN,
        )
    }
}

/// Serialize `tour` into an SVG preview.
///
/// An empty tour yields a valid, blank `2 * MARGIN` square document.
///
/// # Examples
///
/// ```
/// use looptour_export::to_svg;
/// use looptour_pipeline::tsplib::parse_solution;
/// use looptour_pipeline::{Point, SolutionCheck, TrackMetadata};
///
/// let points = [Point::new("a", 0.0, 0.0), Point::new("b", 1.0, 0.0)];
/// let tour = parse_solution("2\n0 1\n", &points, SolutionCheck::Strict).unwrap();
/// let metadata = TrackMetadata { name: Some("demo"), description: None };
///
/// let svg = to_svg(&tour, &metadata);
/// assert!(svg.contains("<title>demo</title>"));
/// assert!(svg.contains("M16,16 L784,16"));
/// ```
#[must_use]
pub fn to_svg(tour: &Tour, metadata: &TrackMetadata<'_>) -> String {
    let projection = Projection::fit(tour.points());
    let (width, height) = projection.map_or((2.0 * MARGIN, 2.0 * MARGIN), |p| (p.width, p.height));

    let mut doc = Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0.0, 0.0, width, height));

    if let Some(title) = metadata.name {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(projection) = projection {
        let positions: Vec<(f64, f64)> = tour.points().iter().map(|p| projection.apply(p)).collect();

        let d = build_path_data(&positions, true);
        if !d.is_empty() {
            doc = doc.add(
                Path::new()
                    .set("d", d)
                    .set("fill", "none")
                    .set("stroke", "black")
                    .set("stroke-width", 1),
            );
        }

        let mut stops = Group::new().set("id", "stops").set("fill", "red");
        for (point, (x, y)) in tour.points().iter().zip(&positions) {
            stops = stops.add(
                Circle::new()
                    .set("cx", *x)
                    .set("cy", *y)
                    .set("r", STOP_RADIUS)
                    .set("data-id", point.id.to_string()),
            );
        }
        doc = doc.add(stops);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
