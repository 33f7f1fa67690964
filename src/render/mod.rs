mod primitives;
mod recording_surface;
pub mod text_fit;

pub use primitives::{
    Color, Font, RingSector, Stroke, TextBaseline, TextHAlign, TextShadow, TextStyle,
};
pub use recording_surface::{DrawCommand, RecordingStats, RecordingSurface};

use crate::core::{Point, Rect, Viewport};
use crate::error::ChartResult;

/// Text measurement used by layout code and the text-fitting helpers.
pub trait TextMeasure {
    /// Advance width of `text` in pixels when drawn with `font`.
    fn measure_text(&self, text: &str, font: Font) -> f64;
}

/// Contract implemented by any drawing backend.
///
/// One implementation type serves both the visible surface and the offscreen
/// buffers it allocates, so buffers can be composited back onto it with
/// [`Surface::draw_surface`].
pub trait Surface: TextMeasure + Sized {
    fn viewport(&self) -> Viewport;

    /// Allocates a new, transparent offscreen surface of the same backend.
    fn create_offscreen(&self, viewport: Viewport) -> ChartResult<Self>;

    /// Reallocates the surface at a new size; previous content is discarded.
    fn resize(&mut self, viewport: Viewport) -> ChartResult<()>;

    /// Resets `rect` to transparent.
    fn clear_rect(&mut self, rect: Rect) -> ChartResult<()>;

    fn clear(&mut self) -> ChartResult<()> {
        let viewport = self.viewport();
        self.clear_rect(Rect::new(
            0.0,
            0.0,
            f64::from(viewport.width),
            f64::from(viewport.height),
        ))
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> ChartResult<()>;

    fn fill_ring_sector(&mut self, sector: RingSector, color: Color) -> ChartResult<()>;

    /// Strokes an open path through `points`.
    fn stroke_polyline(&mut self, points: &[Point], stroke: &Stroke) -> ChartResult<()>;

    fn fill_text(&mut self, text: &str, anchor: Point, style: &TextStyle) -> ChartResult<()>;

    /// Copies `source_rect` of `source` so its top-left corner lands on `dest`,
    /// multiplied by `alpha`.
    fn draw_surface(
        &mut self,
        source: &Self,
        source_rect: Rect,
        dest: Point,
        alpha: f64,
    ) -> ChartResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoSurface, CairoSurfaceStats};
