use std::{fs::File, io::BufReader, path::Path};

use crate::{
    assets::decode::OverlayResample,
    foundation::error::{PinmarkError, PinmarkResult},
    render::markers::MarkerStyle,
};

/// Options for an [`crate::Annotator`].
///
/// Every field has a default, so a JSON config only needs the keys it overrides:
///
/// ```json
/// { "cache_budget_bytes": 268435456, "marker": { "default_color": "#ff6600" } }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotatorOpts {
    /// Decoded-pixel budget of the base image cache. `0` disables caching.
    pub cache_budget_bytes: usize,
    /// Side length of the zero-filled outputs returned when no base image is selected.
    pub placeholder_size: u32,
    /// Filter used when the overlay size differs from the base image.
    pub overlay_resample: OverlayResample,
    /// JPEG quality for saved previews (1..=100).
    pub preview_jpeg_quality: u8,
    /// Marker appearance.
    pub marker: MarkerStyle,
}

impl Default for AnnotatorOpts {
    fn default() -> Self {
        Self {
            cache_budget_bytes: 512 * 1024 * 1024,
            placeholder_size: 512,
            overlay_resample: OverlayResample::default(),
            preview_jpeg_quality: 85,
            marker: MarkerStyle::default(),
        }
    }
}

impl AnnotatorOpts {
    /// Parse options from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> PinmarkResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| PinmarkError::serde(format!("parse annotator options JSON: {e}")))
    }

    /// Parse options from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PinmarkResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PinmarkError::validation(format!("open options JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check value ranges.
    pub fn validate(&self) -> PinmarkResult<()> {
        if self.placeholder_size == 0 {
            return Err(PinmarkError::validation("placeholder_size must be >= 1"));
        }
        if !(1..=100).contains(&self.preview_jpeg_quality) {
            return Err(PinmarkError::validation(format!(
                "preview_jpeg_quality must be in 1..=100, got {}",
                self.preview_jpeg_quality
            )));
        }
        self.marker.validate()
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
