//! The track output seam.

use std::path::PathBuf;

use crate::types::Tour;

/// Descriptive metadata handed to track writers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackMetadata<'a> {
    /// Track name.
    pub name: Option<&'a str>,
    /// Free-form description.
    pub description: Option<&'a str>,
}

/// Turns a finished tour into a visualization file.
pub trait TrackWriter {
    /// Short label used in logs and diagnostics.
    fn label(&self) -> String;

    /// Write `tour`.
    ///
    /// # Errors
    ///
    /// Returns a [`TrackError`] if the track cannot be encoded or stored.
    fn write_track(&self, tour: &Tour, metadata: &TrackMetadata<'_>) -> Result<(), TrackError>;
}

/// Errors raised by track writers.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// The output file could not be written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The output file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The tour could not be encoded.
    #[error("encoding failed: {0}")]
    Encode(String),
}
