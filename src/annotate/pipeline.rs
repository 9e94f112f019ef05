use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use image::{GrayImage, Rgb32FImage, RgbImage, codecs::jpeg::JpegEncoder};

use crate::{
    annotate::points::MarkerList,
    assets::{
        decode::decode_overlay,
        store::{ImageCache, ImageSource, UncachedSource},
    },
    config::AnnotatorOpts,
    effects::composite::{Mask, alpha_mask, over_premul_in_place, over_rgb},
    foundation::{
        core::Canvas,
        error::{PinmarkError, PinmarkResult},
    },
    render::markers::MarkerRenderer,
};

/// Everything one annotation pass produces. All rasters share the base image's dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationOutputs {
    /// Base + overlay + markers.
    pub combined: RgbImage,
    /// Overlay alpha as `[0, 1]`.
    pub mask: Mask,
    /// Base + overlay.
    pub overlay_only: RgbImage,
    /// Base + markers.
    pub points_only: RgbImage,
    /// Parsed points echoed back as `[{"x":..,"y":..}]`.
    pub points_json: String,
}

impl AnnotationOutputs {
    /// Zero-filled outputs of `size x size` with an empty point list.
    pub fn placeholder(size: u32) -> Self {
        Self {
            combined: RgbImage::new(size, size),
            mask: Mask::new(size, size),
            overlay_only: RgbImage::new(size, size),
            points_only: RgbImage::new(size, size),
            points_json: "[]".to_string(),
        }
    }

    /// Output dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas::of(&self.combined)
    }

    /// Mask quantized to 8 bits (`round(m * 255)`).
    pub fn mask_to_luma8(&self) -> GrayImage {
        GrayImage::from_fn(self.mask.width(), self.mask.height(), |x, y| {
            let m = self.mask.get_pixel(x, y).0[0];
            image::Luma([(m.clamp(0.0, 1.0) * 255.0).round() as u8])
        })
    }

    /// Convert an output raster into `[0, 1]` float channels.
    pub fn to_rgb32f(img: &RgbImage) -> Rgb32FImage {
        image::DynamicImage::ImageRgb8(img.clone()).to_rgb32f()
    }
}

/// Annotation compositor.
///
/// Holds the resolved marker fonts and the base image source, so one instance should serve
/// many invocations. `Annotator` is `Send + Sync`.
pub struct Annotator {
    opts: AnnotatorOpts,
    source: Arc<dyn ImageSource>,
    markers: MarkerRenderer,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("opts", &self.opts)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

impl Annotator {
    /// Validate `opts` and build an annotator with an LRU base image cache sized by
    /// `opts.cache_budget_bytes` (no cache when the budget is `0`).
    pub fn new(opts: AnnotatorOpts) -> PinmarkResult<Self> {
        let source: Arc<dyn ImageSource> = if opts.cache_budget_bytes == 0 {
            Arc::new(UncachedSource)
        } else {
            Arc::new(ImageCache::new(opts.cache_budget_bytes))
        };
        Self::with_source(opts, source)
    }

    /// Build an annotator around a caller-owned image source (e.g. a cache shared between
    /// several annotators).
    pub fn with_source(opts: AnnotatorOpts, source: Arc<dyn ImageSource>) -> PinmarkResult<Self> {
        opts.validate()?;
        let markers = MarkerRenderer::new(opts.marker.clone());
        Ok(Self {
            opts,
            source,
            markers,
        })
    }

    /// Options in use.
    pub fn opts(&self) -> &AnnotatorOpts {
        &self.opts
    }

    /// Marker renderer in use.
    pub fn markers(&self) -> &MarkerRenderer {
        &self.markers
    }

    /// Run a full annotation pass against the image at `base`.
    ///
    /// `None` (or an empty path) means no image is selected and yields
    /// [`AnnotationOutputs::placeholder`]. A path that cannot be read or decoded is an error.
    /// Malformed `points_json` and `overlay_data_uri` are recovered from, never reported.
    #[tracing::instrument(skip(self, points_json, overlay_data_uri))]
    pub fn render(
        &self,
        base: Option<&Path>,
        points_json: &str,
        overlay_data_uri: &str,
    ) -> PinmarkResult<AnnotationOutputs> {
        let Some(path) = base.filter(|p| !p.as_os_str().is_empty()) else {
            tracing::debug!("no base image selected, returning placeholder");
            return Ok(AnnotationOutputs::placeholder(self.opts.placeholder_size));
        };

        let base_img = self.source.load(path)?;
        Ok(self.render_image(&base_img, points_json, overlay_data_uri))
    }

    /// Run a full annotation pass against already decoded pixels.
    pub fn render_image(
        &self,
        base: &RgbImage,
        points_json: &str,
        overlay_data_uri: &str,
    ) -> AnnotationOutputs {
        let canvas = Canvas::of(base);
        let markers = MarkerList::parse(points_json);
        let overlay = decode_overlay(overlay_data_uri, canvas, self.opts.overlay_resample);

        let overlay_only = match over_rgb(base, &overlay) {
            Ok(img) => img,
            Err(e) => {
                // decode_overlay always fits the overlay to the base.
                tracing::warn!(error = %e, "overlay composite failed, using base");
                base.clone()
            }
        };
        let mask = alpha_mask(&overlay);

        let mut combined = overlay_only.clone();
        let mut points_only = base.clone();
        match self.markers.render_layer(canvas, &markers) {
            Ok(Some(layer)) => {
                for target in [&mut combined, &mut points_only] {
                    if let Err(e) = over_premul_in_place(target, &layer) {
                        tracing::warn!(error = %e, "marker composite failed");
                    }
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "marker rendering failed, markers skipped"),
        }

        AnnotationOutputs {
            combined,
            mask,
            overlay_only,
            points_only,
            points_json: markers.normalized_json(),
        }
    }

    /// Render the `combined` output for `base` and save it as a JPEG preview in `out_dir`.
    ///
    /// Returns the path of the written file, named `preview_<unix millis>.jpg`, or
    /// `preview_<unix millis>_<k>.jpg` when that name is already taken. Existing files are never
    /// overwritten.
    #[tracing::instrument(skip(self, points_json, overlay_data_uri))]
    pub fn save_preview(
        &self,
        base: &Path,
        points_json: &str,
        overlay_data_uri: &str,
        out_dir: &Path,
    ) -> PinmarkResult<PathBuf> {
        if !base.is_file() {
            return Err(PinmarkError::validation(format!(
                "image not found: '{}'",
                base.display()
            )));
        }
        let base_img = self.source.load(base)?;
        let outputs = self.render_image(&base_img, points_json, overlay_data_uri);

        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("create preview dir '{}'", out_dir.display()))?;
        let (out_path, file) = create_preview_file(out_dir)?;
        let mut writer = std::io::BufWriter::new(file);
        outputs
            .combined
            .write_with_encoder(JpegEncoder::new_with_quality(
                &mut writer,
                self.opts.preview_jpeg_quality,
            ))
            .map_err(|e| PinmarkError::render(format!("encode jpeg preview: {e}")))?;

        tracing::debug!(path = %out_path.display(), "preview written");
        Ok(out_path)
    }
}

const PREVIEW_NAME_ATTEMPTS: u32 = 1000;

fn create_preview_file(out_dir: &Path) -> PinmarkResult<(PathBuf, std::fs::File)> {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    for k in 0..PREVIEW_NAME_ATTEMPTS {
        let name = if k == 0 {
            format!("preview_{millis}.jpg")
        } else {
            format!("preview_{millis}_{k}.jpg")
        };
        let path = out_dir.join(name);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("create preview '{}'", path.display()))
                    .into());
            }
        }
    }
    Err(PinmarkError::render(format!(
        "no free preview name in '{}'",
        out_dir.display()
    )))
}

/// One-shot annotation pass with default options and no cache.
///
/// Fonts are loaded on every call; keep an [`Annotator`] around when rendering repeatedly.
pub fn render(
    base: Option<&Path>,
    points_json: &str,
    overlay_data_uri: &str,
) -> PinmarkResult<AnnotationOutputs> {
    let opts = AnnotatorOpts {
        cache_budget_bytes: 0,
        ..AnnotatorOpts::default()
    };
    Annotator::new(opts)?.render(base, points_json, overlay_data_uri)
}

#[cfg(test)]
#[path = "../../tests/unit/annotate/pipeline.rs"]
mod tests;
