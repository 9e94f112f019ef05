use image::Rgb;

use super::*;
use crate::annotate::points::Marker;

fn bitmap_renderer() -> MarkerRenderer {
    MarkerRenderer::new(MarkerStyle {
        system_fonts: false,
        ..MarkerStyle::default()
    })
}

fn gray(w: u32, h: u32) -> RgbImage {
    RgbImage::from_pixel(w, h, Rgb([128, 128, 128]))
}

#[test]
fn metrics_follow_shorter_side_with_floor() {
    let style = MarkerStyle::default();
    let small = style.metrics(Canvas::new(100, 100).unwrap());
    assert_eq!(small.radius, 10.0);
    assert_eq!(small.stroke, 1.5);
    assert_eq!(small.font_px, 12.0);

    let large = style.metrics(Canvas::new(4000, 3000).unwrap());
    assert_eq!(large.radius, 45.0);
}

#[test]
fn validate_rejects_degenerate_styles() {
    assert!(MarkerStyle::default().validate().is_ok());
    for bad in [
        MarkerStyle {
            radius_ratio: 0.0,
            ..MarkerStyle::default()
        },
        MarkerStyle {
            stroke_ratio: f64::NAN,
            ..MarkerStyle::default()
        },
        MarkerStyle {
            min_radius: 0,
            ..MarkerStyle::default()
        },
    ] {
        assert!(bad.validate().is_err());
    }
}

#[test]
fn no_fonts_selects_bitmap_labels() {
    assert_eq!(bitmap_renderer().label_font(), &LabelFont::Bitmap);
}

#[test]
fn nothing_drawable_yields_no_layer() {
    let r = bitmap_renderer();
    let canvas = Canvas::new(100, 100).unwrap();
    assert!(r.render_layer(canvas, &MarkerList::default()).unwrap().is_none());

    let outside = MarkerList::from_markers([
        Marker::at(-1.0, 50.0),
        Marker::at(50.0, 100.5),
        Marker::at(250.0, 250.0),
    ]);
    assert!(r.render_layer(canvas, &outside).unwrap().is_none());
    assert_eq!(r.draw(&gray(100, 100), &outside).unwrap(), gray(100, 100));
}

#[test]
fn draws_red_disc_white_rim_and_label() {
    let r = bitmap_renderer();
    let out = r
        .draw(&gray(100, 100), &MarkerList::from_markers([Marker::at(50.0, 50.0)]))
        .unwrap();

    assert_eq!(out.dimensions(), (100, 100));
    // Inside the disc, clear of the label.
    assert_eq!(out.get_pixel(44, 50).0, [255, 0, 0]);
    assert_eq!(out.get_pixel(55, 45).0, [255, 0, 0]);
    // Stem of the "1" glyph.
    assert_eq!(out.get_pixel(50, 50).0, [255, 255, 255]);
    // Outline.
    assert!(out.get_pixel(59, 50).0.iter().all(|&c| c > 200));
    // Untouched far away.
    assert_eq!(out.get_pixel(5, 5).0, [128, 128, 128]);
    assert_eq!(out.get_pixel(50, 70).0, [128, 128, 128]);
}

#[test]
fn custom_fill_and_contrasting_label() {
    let r = bitmap_renderer();
    let markers = MarkerList::from_markers([
        Marker::at(25.0, 25.0).with_color(Rgb8::new(0, 0, 255)),
        Marker::at(75.0, 75.0).with_color(Rgb8::WHITE),
    ]);
    let out = r.draw(&gray(100, 100), &markers).unwrap();

    assert_eq!(out.get_pixel(19, 25).0, [0, 0, 255]);
    assert_eq!(out.get_pixel(69, 75).0, [255, 255, 255]);
    // Label "2" on the white disc is black; its bottom bar spans the glyph width.
    assert_eq!(out.get_pixel(75, 78).0, [0, 0, 0]);
}

#[test]
fn out_of_bounds_marker_still_consumes_a_serial() {
    let r = bitmap_renderer();
    let with_skip = MarkerList::from_markers([Marker::at(-5.0, -5.0), Marker::at(50.0, 50.0)]);
    let alone = MarkerList::from_markers([Marker::at(50.0, 50.0)]);
    let a = r.draw(&gray(100, 100), &with_skip).unwrap();
    let b = r.draw(&gray(100, 100), &alone).unwrap();
    // "2" and "1" differ in shape, so the rasters differ.
    assert_ne!(a, b);
}

#[test]
fn font_label_is_centered_inside_the_disc() {
    let r = MarkerRenderer::new(MarkerStyle::default());
    if r.label_font() == &LabelFont::Bitmap {
        // No usable font on this machine.
        return;
    }
    let out = r
        .draw(&gray(100, 100), &MarkerList::from_markers([Marker::at(50.0, 50.0)]))
        .unwrap();

    let (mut n, mut sx, mut sy) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y, p) in out.enumerate_pixels() {
        let (cx, cy) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
        let d = ((cx - 50.0).powi(2) + (cy - 50.0).powi(2)).sqrt();
        let whitish = p.0[1] > 160 && p.0[2] > 160;
        if d > 11.0 {
            assert_eq!(p.0, [128, 128, 128], "({x}, {y}) touched outside the marker");
        } else if d < 8.0 && whitish {
            n += 1.0;
            sx += cx;
            sy += cy;
        }
    }

    assert!(n >= 5.0, "only {n} label pixels");
    let (mx, my) = (sx / n, sy / n);
    assert!(
        (mx - 50.0).abs() <= 1.0 && (my - 50.0).abs() <= 1.0,
        "label centroid ({mx:.2}, {my:.2})"
    );
}
