//! Resize engine.
//!
//! Pure raster-in/raster-out transforms, one per [`FitMode`]. The source
//! raster is never mutated; each call produces a new image.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use picscale_core::{FitMode, ResizeSpec};

/// Select a resampling filter based on the downscale ratio. Heavier
/// downscales tolerate cheaper filters without visible aliasing; mild ones
/// get Lanczos.
fn select_filter(orig_width: u32, orig_height: u32, new_width: u32, new_height: u32) -> FilterType {
    let width_ratio = orig_width as f32 / new_width.max(1) as f32;
    let height_ratio = orig_height as f32 / new_height.max(1) as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        FilterType::Triangle
    } else if max_ratio > 1.5 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    }
}

/// Derive the missing dimension from the aspect ratio when only one is
/// constrained. A zero target means "derive from aspect".
fn derive_dimensions(orig_width: u32, orig_height: u32, width: u32, height: u32) -> (u32, u32) {
    match (width, height) {
        (0, 0) => (orig_width, orig_height),
        (w, 0) => {
            let aspect = orig_height as f32 / orig_width as f32;
            (w, ((w as f32 * aspect).round() as u32).max(1))
        }
        (0, h) => {
            let aspect = orig_width as f32 / orig_height as f32;
            (((h as f32 * aspect).round() as u32).max(1), h)
        }
        (w, h) => (w, h),
    }
}

/// Apply a resize spec to a source raster.
pub fn apply(image: &DynamicImage, spec: &ResizeSpec) -> DynamicImage {
    let (orig_width, orig_height) = image.dimensions();

    match spec.mode {
        FitMode::Fit => {
            // Contain semantics: fit within the box, never enlarge.
            if spec.width >= orig_width && spec.height >= orig_height {
                return image.clone();
            }
            let filter = select_filter(orig_width, orig_height, spec.width, spec.height);
            image.resize(spec.width, spec.height, filter)
        }
        FitMode::Fill => {
            let filter = select_filter(orig_width, orig_height, spec.width, spec.height);
            image.resize_to_fill(spec.width, spec.height, filter)
        }
        FitMode::ByWidth => {
            let (w, h) = derive_dimensions(orig_width, orig_height, spec.width, 0);
            let filter = select_filter(orig_width, orig_height, w, h);
            image.resize_exact(w, h, filter)
        }
        FitMode::ByHeight => {
            let (w, h) = derive_dimensions(orig_width, orig_height, 0, spec.height);
            let filter = select_filter(orig_width, orig_height, w, h);
            image.resize_exact(w, h, filter)
        }
    }
}
