//! Map background image.
//!
//! The engine never decodes the image. It keeps the data URL the host read
//! from the chosen file and hands it back to the renderer and to storage.

#[cfg(test)]
#[path = "background_test.rs"]
mod background_test;

use serde::{Deserialize, Serialize};

/// MIME types the upload control accepts.
pub const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/svg+xml"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("image data is empty")]
    Empty,
}

/// An opaque reference to the uploaded background, usually a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapImage(String);

impl MapImage {
    /// Wrap a stored reference without checking it.
    #[must_use]
    pub fn from_stored(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// CSS `background-image` value for this image.
    #[must_use]
    pub fn css_url(&self) -> String {
        format!("url(\"{}\")", self.0.replace('"', "%22"))
    }
}

/// Validate a freshly read upload.
///
/// # Errors
///
/// Returns [`UploadError::UnsupportedType`] for anything but PNG, JPEG or SVG
/// and [`UploadError::Empty`] when no data was read.
pub fn accept_upload(mime: &str, data_url: &str) -> Result<MapImage, UploadError> {
    let mime = mime.trim().to_ascii_lowercase();
    if !ACCEPTED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(UploadError::UnsupportedType(mime));
    }
    if data_url.trim().is_empty() {
        return Err(UploadError::Empty);
    }
    Ok(MapImage(data_url.to_owned()))
}
