//! Resize specifications.
//!
//! The set of derivative sizes is fixed per deployment: every processed
//! image produces exactly these variants, in this order.

/// How a source raster is mapped onto a spec's target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Scale down to fit within the box, preserving aspect ratio. Never
    /// upscales a smaller source.
    #[default]
    Fit,
    /// Scale and center-crop to exactly width x height.
    Fill,
    /// Scale to the given width, deriving height from the aspect ratio.
    ByWidth,
    /// Scale to the given height, deriving width from the aspect ratio.
    ByHeight,
}

/// A named derivative size. The name is stable: it appears in output
/// filenames and notification payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSpec {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub mode: FitMode,
}

impl ResizeSpec {
    pub fn new(name: &str, width: u32, height: u32, mode: FitMode) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            mode,
        }
    }

    /// The fixed derivative table: a square-cropped thumbnail plus three
    /// aspect-preserving sizes.
    pub fn default_set() -> Vec<ResizeSpec> {
        vec![
            ResizeSpec::new("thumbnail", 200, 200, FitMode::Fill),
            ResizeSpec::new("small", 500, 500, FitMode::Fit),
            ResizeSpec::new("medium", 900, 900, FitMode::Fit),
            ResizeSpec::new("large", 1400, 1400, FitMode::Fit),
        ]
    }
}
