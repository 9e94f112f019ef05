use image::{Luma, RgbImage, RgbaImage};
use rayon::prelude::*;

use crate::foundation::error::{PinmarkError, PinmarkResult};

/// Single-channel opacity mask with values in `[0, 1]`.
pub type Mask = image::ImageBuffer<Luma<f32>, Vec<f32>>;

/// Blend a straight-alpha RGBA overlay over an opaque RGB base.
///
/// Per channel: `out = fg * a + bg * (1 - a)` with `a = alpha / 255`, rounded to nearest. Rows
/// are blended in parallel.
pub fn over_rgb(base: &RgbImage, overlay: &RgbaImage) -> PinmarkResult<RgbImage> {
    if base.dimensions() != overlay.dimensions() {
        return Err(PinmarkError::validation(format!(
            "overlay is {}x{} but base is {}x{}",
            overlay.width(),
            overlay.height(),
            base.width(),
            base.height()
        )));
    }

    let mut out = base.clone();
    let w = base.width() as usize;
    if w == 0 || base.height() == 0 {
        return Ok(out);
    }

    let dst: &mut [u8] = &mut out;
    dst.par_chunks_mut(w * 3)
        .zip(overlay.as_raw().par_chunks(w * 4))
        .for_each(|(dst_row, src_row)| {
            for (d, s) in dst_row.chunks_exact_mut(3).zip(src_row.chunks_exact(4)) {
                match s[3] {
                    0 => {}
                    255 => d.copy_from_slice(&s[..3]),
                    a => {
                        let a = u16::from(a);
                        let inv = 255 - a;
                        for i in 0..3 {
                            d[i] = lerp_div255(u16::from(s[i]), a, u16::from(d[i]), inv);
                        }
                    }
                }
            }
        });

    Ok(out)
}

/// Composite a premultiplied RGBA8 layer (same size as `dst`) onto an opaque RGB raster.
pub fn over_premul_in_place(dst: &mut RgbImage, layer_premul: &[u8]) -> PinmarkResult<()> {
    let px = (dst.width() as usize) * (dst.height() as usize);
    if layer_premul.len() != px * 4 {
        return Err(PinmarkError::validation(
            "over_premul_in_place expects a layer with the destination's dimensions",
        ));
    }
    let w = dst.width() as usize;
    if px == 0 {
        return Ok(());
    }

    let dst: &mut [u8] = dst;
    dst.par_chunks_mut(w * 3)
        .zip(layer_premul.par_chunks(w * 4))
        .for_each(|(dst_row, src_row)| {
            for (d, s) in dst_row.chunks_exact_mut(3).zip(src_row.chunks_exact(4)) {
                let a = s[3];
                if a == 0 {
                    continue;
                }
                let inv = 255 - u16::from(a);
                for i in 0..3 {
                    d[i] = s[i].saturating_add(mul_div255(u16::from(d[i]), inv));
                }
            }
        });

    Ok(())
}

/// Extract the overlay's alpha channel as a `[0, 1]` mask (`alpha / 255`).
pub fn alpha_mask(overlay: &RgbaImage) -> Mask {
    let mut mask = Mask::new(overlay.width(), overlay.height());
    let dst: &mut [f32] = &mut mask;
    dst.par_iter_mut()
        .zip(overlay.as_raw().par_chunks_exact(4))
        .for_each(|(m, px)| *m = f32::from(px[3]) / 255.0);
    mask
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn lerp_div255(fg: u16, a: u16, bg: u16, inv: u16) -> u8 {
    ((u32::from(fg) * u32::from(a) + u32::from(bg) * u32::from(inv) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
