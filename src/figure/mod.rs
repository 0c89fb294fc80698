/// Figure layer: record-then-render builders over plotters.
///
/// Both builders collect series and axis state through their method calls
/// and only touch a drawing backend inside `render`, once per requested
/// output format.
pub mod grid;
pub mod marker;
pub mod scatter;

pub use grid::{AxisSpec, GridFigure};
pub use scatter::ScatterFigure;

use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Output formats
// ---------------------------------------------------------------------------

/// Supported artifact formats; one logical figure writes one file per
/// format, sharing a base name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Vector output (SVG backend).
    Svg,
    /// Raster output (bitmap backend).
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

/// Vector plus raster, the usual publication pair.
pub const DEFAULT_FORMATS: [ImageFormat; 2] = [ImageFormat::Svg, ImageFormat::Png];

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub(crate) fn draw_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Backend(err.to_string())
}

/// Number of tick labels that places a major tick every `spacing` units
/// across `range`.
pub(crate) fn tick_count(range: (f64, f64), spacing: f64) -> usize {
    let span = (range.1 - range.0).abs();
    if spacing <= 0.0 || span == 0.0 {
        return 2;
    }
    ((span / spacing).round() as usize + 1).clamp(2, 20)
}

/// Light gridlines per major cell that subdivide `major` at `minor` steps.
pub(crate) fn light_line_count(major: Option<f64>, minor: Option<f64>) -> usize {
    match (major, minor) {
        (Some(major), Some(minor)) if minor > 0.0 && major > minor => {
            ((major / minor).round() as usize).saturating_sub(1)
        }
        _ => 0,
    }
}
