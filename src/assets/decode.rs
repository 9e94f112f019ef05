use std::path::Path;

use anyhow::Context;
use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose},
};
use image::{RgbImage, RgbaImage, imageops::FilterType};

use crate::foundation::{
    core::Canvas,
    error::{PinmarkError, PinmarkResult},
};

/// Browsers emit padded payloads, hand-built ones often are not.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Filter used when an overlay has to be resampled onto the base raster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayResample {
    /// Bilinear (`FilterType::Triangle`).
    #[default]
    Bilinear,
    /// Lanczos with a window of 3.
    Lanczos3,
}

impl OverlayResample {
    fn filter(self) -> FilterType {
        match self {
            Self::Bilinear => FilterType::Triangle,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Decode encoded image bytes into an opaque RGB raster.
pub fn decode_base_image(bytes: &[u8]) -> PinmarkResult<RgbImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| PinmarkError::decode(format!("decode base image: {e}")))?;
    Ok(dyn_img.to_rgb8())
}

/// Read and decode a base image from disk.
pub fn load_base_image(path: &Path) -> PinmarkResult<RgbImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read base image '{}'", path.display()))?;
    decode_base_image(&bytes).map_err(|e| match e {
        PinmarkError::Decode(msg) => PinmarkError::decode(format!("{msg} ('{}')", path.display())),
        other => other,
    })
}

/// Return the payload after the first comma of a data URI.
///
/// `None` when there is no comma at all.
pub fn data_uri_payload(data_uri: &str) -> Option<&str> {
    data_uri.split_once(',').map(|(_, payload)| payload.trim())
}

/// Wrap encoded PNG bytes into a `data:image/png;base64,` URI.
pub fn png_data_uri(png_bytes: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png_bytes)
    )
}

/// Decode a painted overlay and fit it onto `canvas`.
///
/// Returns `Ok(None)` for an empty input. Malformed input is an error here; callers that need
/// the recovery behavior use [`decode_overlay`].
pub fn try_decode_overlay(
    data_uri: &str,
    canvas: Canvas,
    resample: OverlayResample,
) -> PinmarkResult<Option<RgbaImage>> {
    if data_uri.trim().is_empty() {
        return Ok(None);
    }

    let payload = data_uri_payload(data_uri)
        .ok_or_else(|| PinmarkError::decode("overlay is not a data URI (no ',' separator)"))?;
    let bytes = PAYLOAD_ENGINE
        .decode(payload)
        .map_err(|e| PinmarkError::decode(format!("overlay base64 payload: {e}")))?;
    let rgba = image::load_from_memory(&bytes)
        .map_err(|e| PinmarkError::decode(format!("overlay image: {e}")))?
        .to_rgba8();

    if rgba.dimensions() == (canvas.width, canvas.height) {
        return Ok(Some(rgba));
    }

    tracing::debug!(
        from_w = rgba.width(),
        from_h = rgba.height(),
        to_w = canvas.width,
        to_h = canvas.height,
        "resampling overlay to base size"
    );
    Ok(Some(image::imageops::resize(
        &rgba,
        canvas.width,
        canvas.height,
        resample.filter(),
    )))
}

/// Decode a painted overlay, recovering to a fully transparent layer on any failure.
pub fn decode_overlay(data_uri: &str, canvas: Canvas, resample: OverlayResample) -> RgbaImage {
    match try_decode_overlay(data_uri, canvas, resample) {
        Ok(Some(overlay)) => overlay,
        Ok(None) => RgbaImage::new(canvas.width, canvas.height),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed overlay");
            RgbaImage::new(canvas.width, canvas.height)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
