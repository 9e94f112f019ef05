//! Built-in 5x7 digit glyphs for marker labels on hosts without any font.

use crate::foundation::{color::Rgb8, core::Point};

const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;

// One row per byte, low five bits, MSB on the left.
const DIGITS: [[u8; 7]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];

/// Integer cell scale so that a glyph is roughly `cap_height_px` tall.
pub fn scale_for(cap_height_px: f64) -> u32 {
    if !cap_height_px.is_finite() {
        return 1;
    }
    ((cap_height_px / f64::from(GLYPH_H)).round() as u32).max(1)
}

/// Pixel size of `text` at `scale` (one blank cell between glyphs).
pub fn text_extent(text: &str, scale: u32) -> (u32, u32) {
    let n = text.chars().count() as u32;
    if n == 0 {
        return (0, 0);
    }
    let w = (n * GLYPH_W + (n - 1)) * scale;
    (w, GLYPH_H * scale)
}

/// Stamp `text` centered on `center` into a premultiplied RGBA8 buffer of `width x height`.
///
/// Characters other than ASCII digits advance without drawing. Pixels outside the buffer are
/// clipped. Returns the number of pixels written.
pub fn stamp_text(
    layer: &mut [u8],
    width: u32,
    height: u32,
    text: &str,
    center: Point,
    scale: u32,
    color: Rgb8,
) -> usize {
    if layer.len() != (width as usize) * (height as usize) * 4 {
        return 0;
    }

    let scale = scale.max(1);
    let (tw, th) = text_extent(text, scale);
    let x0 = (center.x - f64::from(tw) / 2.0).round() as i64;
    let y0 = (center.y - f64::from(th) / 2.0).round() as i64;
    let px = [color.r, color.g, color.b, 255];

    let mut written = 0;
    for (i, ch) in text.chars().enumerate() {
        let Some(glyph) = ch.to_digit(10).map(|d| &DIGITS[d as usize]) else {
            continue;
        };
        let gx = x0 + i64::from((GLYPH_W + 1) * scale) * i as i64;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                let cx = gx + i64::from(col * scale);
                let cy = y0 + i64::from(row as u32 * scale);
                for dy in 0..i64::from(scale) {
                    for dx in 0..i64::from(scale) {
                        let (x, y) = (cx + dx, cy + dy);
                        if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                            continue;
                        }
                        let idx = ((y as usize) * (width as usize) + x as usize) * 4;
                        layer[idx..idx + 4].copy_from_slice(&px);
                        written += 1;
                    }
                }
            }
        }
    }
    written
}

#[cfg(test)]
#[path = "../../tests/unit/render/bitmap_font.rs"]
mod tests;
