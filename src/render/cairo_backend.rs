use cairo::{Context, Format, ImageSurface, Operator};
use pango::{FontDescription, Layout, Weight};
use tracing::warn;

use crate::core::{Point, Rect, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    Color, Font, RingSector, Stroke, Surface, TextBaseline, TextHAlign, TextMeasure, TextStyle,
};

const FONT_FAMILY: &str = "Sans";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoSurfaceStats {
    pub rects_drawn: usize,
    pub sectors_drawn: usize,
    pub lines_drawn: usize,
    pub texts_drawn: usize,
    pub surfaces_drawn: usize,
}

/// Cairo image surface with Pango text, usable both as the visible surface
/// and as the offscreen buffers it allocates.
///
/// Hosts that present through GTK or another toolkit copy
/// [`CairoSurface::image`] onto their own context after each frame.
#[derive(Debug)]
pub struct CairoSurface {
    image: ImageSurface,
    viewport: Viewport,
    stats: CairoSurfaceStats,
}

impl CairoSurface {
    pub fn new(viewport: Viewport) -> ChartResult<Self> {
        Ok(Self {
            image: create_image(viewport)?,
            viewport,
            stats: CairoSurfaceStats::default(),
        })
    }

    #[must_use]
    pub fn image(&self) -> &ImageSurface {
        &self.image
    }

    #[must_use]
    pub fn stats(&self) -> CairoSurfaceStats {
        self.stats
    }

    fn context(&self) -> ChartResult<Context> {
        Context::new(&self.image)
            .map_err(|err| map_backend_error("failed to create cairo context", err))
    }
}

impl TextMeasure for CairoSurface {
    fn measure_text(&self, text: &str, font: Font) -> f64 {
        match self.context() {
            Ok(context) => {
                let (width, _) = text_layout(&context, text, font).pixel_size();
                f64::from(width)
            }
            Err(err) => {
                warn!(%err, "text measurement unavailable");
                0.0
            }
        }
    }
}

impl Surface for CairoSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn create_offscreen(&self, viewport: Viewport) -> ChartResult<Self> {
        Self::new(viewport)
    }

    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.image = create_image(viewport)?;
        self.viewport = viewport;
        Ok(())
    }

    fn clear_rect(&mut self, rect: Rect) -> ChartResult<()> {
        let context = self.context()?;
        context.set_operator(Operator::Clear);
        context.rectangle(rect.x, rect.y, rect.w, rect.h);
        context
            .fill()
            .map_err(|err| map_backend_error("failed to clear rectangle", err))
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> ChartResult<()> {
        color.validate()?;
        let context = self.context()?;
        apply_color(&context, color);
        context.rectangle(rect.x, rect.y, rect.w, rect.h);
        context
            .fill()
            .map_err(|err| map_backend_error("failed to fill rectangle", err))?;
        self.stats.rects_drawn += 1;
        Ok(())
    }

    fn fill_ring_sector(&mut self, sector: RingSector, color: Color) -> ChartResult<()> {
        sector.validate()?;
        color.validate()?;
        let context = self.context()?;
        apply_color(&context, color);
        context.new_sub_path();
        context.arc(
            sector.center_x,
            sector.center_y,
            sector.outer_radius,
            sector.start_angle,
            sector.end_angle,
        );
        context.arc_negative(
            sector.center_x,
            sector.center_y,
            sector.inner_radius,
            sector.end_angle,
            sector.start_angle,
        );
        context.close_path();
        context
            .fill()
            .map_err(|err| map_backend_error("failed to fill ring sector", err))?;
        self.stats.sectors_drawn += 1;
        Ok(())
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: &Stroke) -> ChartResult<()> {
        stroke.validate()?;
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        let context = self.context()?;
        apply_color(&context, stroke.color);
        context.set_line_width(stroke.width);
        context.set_dash(&stroke.dash, 0.0);
        context.move_to(first.x, first.y);
        for point in rest {
            context.line_to(point.x, point.y);
        }
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke polyline", err))?;
        self.stats.lines_drawn += 1;
        Ok(())
    }

    fn fill_text(&mut self, text: &str, anchor: Point, style: &TextStyle) -> ChartResult<()> {
        style.color.validate()?;
        let context = self.context()?;
        let layout = text_layout(&context, text, style.font);
        let (width, height) = layout.pixel_size();
        let x = match style.h_align {
            TextHAlign::Left => anchor.x,
            TextHAlign::Center => anchor.x - f64::from(width) * 0.5,
            TextHAlign::Right => anchor.x - f64::from(width),
        };
        let y = match style.baseline {
            TextBaseline::Alphabetic => {
                anchor.y - f64::from(layout.baseline()) / f64::from(pango::SCALE)
            }
            TextBaseline::Middle => anchor.y - f64::from(height) * 0.5,
        };

        if let Some(shadow) = style.shadow {
            apply_color(&context, shadow.color);
            context.move_to(x, y + shadow.offset_y);
            pangocairo::functions::show_layout(&context, &layout);
        }
        apply_color(&context, style.color);
        context.move_to(x, y);
        pangocairo::functions::show_layout(&context, &layout);
        self.stats.texts_drawn += 1;
        Ok(())
    }

    fn draw_surface(
        &mut self,
        source: &Self,
        source_rect: Rect,
        dest: Point,
        alpha: f64,
    ) -> ChartResult<()> {
        let context = self.context()?;
        context
            .set_source_surface(&source.image, dest.x - source_rect.x, dest.y - source_rect.y)
            .map_err(|err| map_backend_error("failed to set source surface", err))?;
        context.rectangle(dest.x, dest.y, source_rect.w, source_rect.h);
        context.clip();
        context
            .paint_with_alpha(alpha)
            .map_err(|err| map_backend_error("failed to composite surface", err))?;
        self.stats.surfaces_drawn += 1;
        Ok(())
    }
}

fn create_image(viewport: Viewport) -> ChartResult<ImageSurface> {
    let invalid = || ChartError::InvalidViewport {
        width: viewport.width,
        height: viewport.height,
    };
    if !viewport.is_valid() {
        return Err(invalid());
    }
    let width = i32::try_from(viewport.width).map_err(|_| invalid())?;
    let height = i32::try_from(viewport.height).map_err(|_| invalid())?;
    ImageSurface::create(Format::ARgb32, width, height)
        .map_err(|err| map_backend_error("failed to create cairo surface", err))
}

fn text_layout(context: &Context, text: &str, font: Font) -> Layout {
    let layout = pangocairo::functions::create_layout(context);
    let mut description = FontDescription::new();
    description.set_family(FONT_FAMILY);
    description.set_absolute_size(font.size_px * f64::from(pango::SCALE));
    description.set_weight(if font.bold { Weight::Bold } else { Weight::Normal });
    layout.set_font_description(Some(&description));
    layout.set_text(text);
    layout
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::Backend(format!("{prefix}: {err}"))
}
