//! Pinmark composites user annotations onto images.
//!
//! One annotation pass takes a base image, a list of numbered point markers and a transparent
//! overlay drawing, and produces four rasters plus the parsed points:
//!
//! - `combined`: base, then overlay, then markers
//! - `mask`: the overlay's alpha channel as `[0, 1]` floats
//! - `overlay_only`: base, then overlay
//! - `points_only`: base, then markers
//! - `points_json`: the valid points echoed back as `[{"x":..,"y":..}]`
//!
//! All outputs share the base image's dimensions. Malformed point or overlay input degrades to
//! "nothing drawn" instead of failing the pass.
//!
//! # Getting started
//!
//! Build an [`Annotator`] once (it resolves fonts and owns the base image cache) and call
//! [`Annotator::render`] per request. [`render`] is a one-shot shorthand with default options.
//!
//! The crate also ships small helpers used next to the compositor in generation workflows:
//! [`plan_windows`] (sliding-window sizing for long video), [`merge_prompts`], caption files
//! via [`TagFileSaver`] and prompt presets via [`PresetStore`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod annotate {
    pub mod pipeline;
    pub mod points;
}
mod assets {
    pub mod decode;
    pub mod listing;
    pub mod store;
}
mod config;
mod effects {
    pub mod composite;
}
mod foundation {
    pub mod color;
    pub mod core;
    pub mod error;
}
mod frames {
    pub mod window;
}
mod render {
    pub mod bitmap_font;
    pub mod fonts;
    pub mod markers;
}
mod text {
    pub mod merge;
    pub mod presets;
    pub mod tags;
}

pub use annotate::pipeline::{AnnotationOutputs, Annotator, render};
pub use annotate::points::{Marker, MarkerList, NormalizedPoint};
pub use assets::decode::{
    OverlayResample, data_uri_payload, decode_base_image, decode_overlay, load_base_image,
    png_data_uri, try_decode_overlay,
};
pub use assets::listing::{list_input_images, normalize_rel_path, resolve_input};
pub use assets::store::{ImageCache, ImageSource, UncachedSource};
pub use config::AnnotatorOpts;
pub use effects::composite::{Mask, alpha_mask, over_premul_in_place, over_rgb};
pub use foundation::color::Rgb8;
pub use foundation::core::{Canvas, Point};
pub use foundation::error::{PinmarkError, PinmarkResult};
pub use frames::window::{
    MAX_WINDOW_COUNT, MAX_WINDOW_FRAMES, RoundingMode, WindowPlan, WindowPlanOpts, plan_windows,
};
pub use render::fonts::{LabelFont, build_fontdb, resolve_label_font};
pub use render::markers::{MarkerMetrics, MarkerRenderer, MarkerStyle};
pub use text::merge::{MergeOpts, Separator, merge_prompts};
pub use text::presets::PresetStore;
pub use text::tags::{TagFileSaver, TagOpts, TagOutcome, list_tag_images};
