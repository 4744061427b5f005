//! looptour-export: Pure track serializers (sans-IO)
//!
//! Converts a finished [`Tour`](looptour_pipeline::Tour) into
//! GeoJSON, KML and SVG. Each serializer returns a `String`; writing it
//! anywhere is the caller's business.

pub mod geojson;
pub mod kml;
pub mod svg;

pub use geojson::{GeoJsonOptions, to_geojson};
pub use self::kml::to_kml;
pub use self::svg::{build_path_data, to_svg};
