use crate::foundation::error::{PinmarkError, PinmarkResult};

pub use kurbo::Point;

/// Raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> PinmarkResult<Self> {
        if width == 0 || height == 0 {
            return Err(PinmarkError::validation(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Dimensions of an existing image buffer.
    pub fn of<P, C>(img: &image::ImageBuffer<P, C>) -> Self
    where
        P: image::Pixel,
        C: std::ops::Deref<Target = [P::Subpixel]>,
    {
        let (width, height) = img.dimensions();
        Self { width, height }
    }

    /// Length of the shorter side.
    pub fn min_side(self) -> u32 {
        self.width.min(self.height)
    }

    /// Number of pixels.
    pub fn area(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Return `true` when `p` lies inside the closed rectangle `[0, width] x [0, height]`.
    ///
    /// Non-finite coordinates are never contained.
    pub fn contains(self, p: Point) -> bool {
        p.x.is_finite()
            && p.y.is_finite()
            && (0.0..=f64::from(self.width)).contains(&p.x)
            && (0.0..=f64::from(self.height)).contains(&p.y)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
