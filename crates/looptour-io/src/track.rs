//! File-backed track writers.
//!
//! Encoding is delegated to `looptour-export`; this module only picks the
//! format and stores the bytes atomically so a crashed run never leaves a
//! truncated track behind.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use looptour_export::GeoJsonOptions;
use looptour_pipeline::atomic::write_atomic;
use looptour_pipeline::{Tour, TrackError, TrackMetadata, TrackWriter};

/// Output formats a [`FileTrackWriter`] can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackFormat {
    /// GeoJSON `FeatureCollection`.
    GeoJson,
    /// KML document with one route placemark.
    Kml,
    /// Standalone SVG preview.
    Svg,
}

impl TrackFormat {
    /// Conventional file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::GeoJson => "geojson",
            Self::Kml => "kml",
            Self::Svg => "svg",
        }
    }

    /// Short lowercase name, as accepted in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GeoJson => "geojson",
            Self::Kml => "kml",
            Self::Svg => "svg",
        }
    }

    /// Guess the format from a file extension (case-insensitive).
    /// `.json` counts as GeoJSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "geojson" | "json" => Some(Self::GeoJson),
            "kml" => Some(Self::Kml),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    fn encode(
        self,
        tour: &Tour,
        metadata: &TrackMetadata<'_>,
        close_loop: bool,
    ) -> Result<String, TrackError> {
        Ok(match self {
            Self::GeoJson => looptour_export::to_geojson(tour, metadata, GeoJsonOptions { close_loop }),
            Self::Kml => looptour_export::to_kml(tour, metadata, close_loop)
                .map_err(|e| TrackError::Encode(e.to_string()))?,
            Self::Svg => looptour_export::to_svg(tour, metadata),
        })
    }
}

impl fmt::Display for TrackFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Writes a tour to one file in one format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTrackWriter {
    /// Destination file. Its directory must already exist.
    pub path: PathBuf,
    /// Output format.
    pub format: TrackFormat,
    /// Close the GeoJSON or KML route back to its first stop. The SVG
    /// preview always draws a closed loop.
    #[serde(default = "default_close_loop")]
    pub close_loop: bool,
}

const fn default_close_loop() -> bool {
    true
}

impl FileTrackWriter {
    /// Writer for `path` in `format`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, format: TrackFormat) -> Self {
        Self {
            path: path.into(),
            format,
            close_loop: default_close_loop(),
        }
    }

    /// Writer whose format follows the extension of `path`, or `None` if
    /// the extension is not recognized.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let format = TrackFormat::from_path(&path)?;
        Some(Self::new(path, format))
    }

    /// Set whether the GeoJSON or KML route is closed.
    #[must_use]
    pub const fn with_close_loop(mut self, close_loop: bool) -> Self {
        self.close_loop = close_loop;
        self
    }
}

impl TrackWriter for FileTrackWriter {
    fn label(&self) -> String {
        format!("{}:{}", self.format, self.path.display())
    }

    fn write_track(&self, tour: &Tour, metadata: &TrackMetadata<'_>) -> Result<(), TrackError> {
        let contents = self.format.encode(tour, metadata, self.close_loop)?;
        write_atomic(&self.path, contents.as_bytes()).map_err(|source| TrackError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(
            format = %self.format,
            path = %self.path.display(),
            bytes = contents.len(),
            "track written"
        );
        Ok(())
    }
}
