use std::{fmt::Write as _, path::PathBuf, sync::Arc};

use image::RgbImage;
use usvg::fontdb;

use crate::{
    annotate::points::MarkerList,
    effects::composite::over_premul_in_place,
    foundation::{
        color::Rgb8,
        core::Canvas,
        error::{PinmarkError, PinmarkResult},
    },
    render::{
        bitmap_font,
        fonts::{LabelFont, build_fontdb, resolve_label_font},
    },
};

/// Visual parameters for numbered point markers.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerStyle {
    /// Fill for markers without an explicit color.
    pub default_color: Rgb8,
    /// Radius as a fraction of the shorter image side.
    pub radius_ratio: f64,
    /// Lower bound for the radius, in pixels.
    pub min_radius: u32,
    /// White outline width as a fraction of the radius.
    pub stroke_ratio: f64,
    /// Label font size as a multiple of the radius.
    pub font_scale: f64,
    /// Label font families, tried in order.
    pub font_families: Vec<String>,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` files.
    pub font_dirs: Vec<PathBuf>,
    /// Load fonts installed on the system.
    pub system_fonts: bool,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            default_color: Rgb8::RED,
            radius_ratio: 0.015,
            min_radius: 10,
            stroke_ratio: 0.15,
            font_scale: 1.2,
            font_families: ["Arial", "Helvetica", "DejaVu Sans", "Liberation Sans", "Noto Sans"]
                .into_iter()
                .map(String::from)
                .collect(),
            font_dirs: Vec::new(),
            system_fonts: true,
        }
    }
}

impl MarkerStyle {
    /// Reject ratios that would produce invisible or non-finite markers.
    pub fn validate(&self) -> PinmarkResult<()> {
        for (name, v) in [
            ("radius_ratio", self.radius_ratio),
            ("stroke_ratio", self.stroke_ratio),
            ("font_scale", self.font_scale),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(PinmarkError::validation(format!(
                    "marker {name} must be finite and > 0, got {v}"
                )));
            }
        }
        if self.min_radius == 0 {
            return Err(PinmarkError::validation("marker min_radius must be >= 1"));
        }
        Ok(())
    }

    /// Pixel metrics for markers drawn on `canvas`.
    pub fn metrics(&self, canvas: Canvas) -> MarkerMetrics {
        let scaled = (f64::from(canvas.min_side()) * self.radius_ratio).round();
        let radius = scaled.max(f64::from(self.min_radius));
        MarkerMetrics {
            radius,
            stroke: (radius * self.stroke_ratio).max(1.0),
            font_px: radius * self.font_scale,
        }
    }
}

/// Resolved marker geometry for one canvas size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerMetrics {
    /// Outer radius, outline included.
    pub radius: f64,
    /// Outline width.
    pub stroke: f64,
    /// Label font size.
    pub font_px: f64,
}

/// Draws numbered markers onto RGB rasters.
///
/// Fonts are resolved once at construction. All drawable markers of a call are rasterized into
/// a single premultiplied layer, which is then composited onto each target.
pub struct MarkerRenderer {
    style: MarkerStyle,
    fontdb: Arc<fontdb::Database>,
    font: LabelFont,
}

impl std::fmt::Debug for MarkerRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerRenderer")
            .field("style", &self.style)
            .field("font_faces", &self.fontdb.len())
            .field("font", &self.font)
            .finish()
    }
}

impl MarkerRenderer {
    /// Load fonts and pick the label font for `style`.
    pub fn new(style: MarkerStyle) -> Self {
        let fontdb = build_fontdb(&style.font_dirs, style.system_fonts);
        let font = resolve_label_font(&fontdb, &style.font_families);
        Self {
            style,
            fontdb,
            font,
        }
    }

    /// Style in use.
    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }

    /// Font chosen for labels.
    pub fn label_font(&self) -> &LabelFont {
        &self.font
    }

    /// Rasterize all in-bounds markers into a premultiplied RGBA8 layer of `canvas` size.
    ///
    /// Returns `Ok(None)` when no marker is drawable.
    pub fn render_layer(
        &self,
        canvas: Canvas,
        markers: &MarkerList,
    ) -> PinmarkResult<Option<Vec<u8>>> {
        if canvas.width == 0 || canvas.height == 0 {
            return Ok(None);
        }
        let metrics = self.style.metrics(canvas);
        let drawable: Vec<_> = markers
            .numbered()
            .filter(|(serial, m)| {
                let inside = canvas.contains(m.pos);
                if !inside {
                    tracing::debug!(serial, x = m.pos.x, y = m.pos.y, "marker out of bounds");
                }
                inside
            })
            .collect();
        if drawable.is_empty() {
            return Ok(None);
        }

        let svg_text = {
            let mut svg = String::with_capacity(256 + drawable.len() * 320);
            let _ = write!(
                svg,
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                w = canvas.width,
                h = canvas.height
            );
            for &(serial, m) in &drawable {
                let fill = m.color.unwrap_or(self.style.default_color);
                let _ = write!(
                    svg,
                    r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{fill}" stroke="{outline}" stroke-width="{sw}"/>"#,
                    cx = m.pos.x,
                    cy = m.pos.y,
                    r = metrics.radius - metrics.stroke / 2.0,
                    fill = fill.to_hex(),
                    outline = Rgb8::WHITE.to_hex(),
                    sw = metrics.stroke,
                );
                if let LabelFont::Family(family) = &self.font {
                    // Digits have no descenders; shifting the baseline by ~0.36em centers the
                    // cap height on the marker.
                    let _ = write!(
                        svg,
                        r#"<text x="{x}" y="{y}" font-family="'{family}', sans-serif" font-weight="bold" font-size="{size}" fill="{text}" text-anchor="middle">{serial}</text>"#,
                        x = m.pos.x,
                        y = m.pos.y + metrics.font_px * 0.36,
                        size = metrics.font_px,
                        text = fill.contrasting_text().to_hex(),
                    );
                }
            }
            svg.push_str("</svg>");
            svg
        };

        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(svg_text.as_bytes(), &opts)
            .map_err(|e| PinmarkError::render(format!("parse marker svg: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
            .ok_or_else(|| PinmarkError::render("failed to allocate marker pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );
        let mut layer = pixmap.take();

        if self.font == LabelFont::Bitmap {
            let scale = bitmap_font::scale_for(metrics.font_px * 0.72);
            for &(serial, m) in &drawable {
                let fill = m.color.unwrap_or(self.style.default_color);
                bitmap_font::stamp_text(
                    &mut layer,
                    canvas.width,
                    canvas.height,
                    &serial.to_string(),
                    m.pos,
                    scale,
                    fill.contrasting_text(),
                );
            }
        }

        Ok(Some(layer))
    }

    /// Return a copy of `img` with the markers drawn on top.
    pub fn draw(&self, img: &RgbImage, markers: &MarkerList) -> PinmarkResult<RgbImage> {
        let mut out = img.clone();
        if let Some(layer) = self.render_layer(Canvas::of(img), markers)? {
            over_premul_in_place(&mut out, &layer)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/markers.rs"]
mod tests;
