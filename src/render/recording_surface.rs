use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::{Point, Rect, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    Color, Font, RingSector, Stroke, Surface, TextBaseline, TextHAlign, TextMeasure, TextStyle,
};

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Average glyph advance as a fraction of the font size.
const REGULAR_ADVANCE: f64 = 0.55;
const BOLD_ADVANCE: f64 = 0.6;
/// Share of the em box above the alphabetic baseline.
const ASCENT: f64 = 0.8;
const CLEAR_TOLERANCE: f64 = 1e-6;

/// One retained draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color,
    },
    FillRingSector {
        sector: RingSector,
        color: Color,
    },
    StrokePolyline {
        points: Vec<Point>,
        stroke: Stroke,
    },
    FillText {
        text: String,
        anchor: Point,
        style: TextStyle,
    },
    DrawSurface {
        source_id: u64,
        source_rect: Rect,
        dest: Point,
        alpha: f64,
    },
}

impl DrawCommand {
    /// Conservative pixel bounds of what this command touches.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        match self {
            Self::FillRect { rect, .. } => *rect,
            Self::FillRingSector { sector, .. } => Rect::new(
                sector.center_x - sector.outer_radius,
                sector.center_y - sector.outer_radius,
                sector.outer_radius * 2.0,
                sector.outer_radius * 2.0,
            ),
            Self::StrokePolyline { points, stroke } => {
                let half = stroke.width * 0.5;
                let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
                let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
                for point in points {
                    min_x = min_x.min(point.x);
                    min_y = min_y.min(point.y);
                    max_x = max_x.max(point.x);
                    max_y = max_y.max(point.y);
                }
                if points.is_empty() {
                    return Rect::default();
                }
                Rect::new(
                    min_x - half,
                    min_y - half,
                    max_x - min_x + half * 2.0,
                    max_y - min_y + half * 2.0,
                )
            }
            Self::FillText {
                text,
                anchor,
                style,
            } => text_bounds(text, *anchor, style),
            Self::DrawSurface {
                source_rect, dest, ..
            } => Rect::new(dest.x, dest.y, source_rect.w, source_rect.h),
        }
    }
}

/// Counters of every call a recording surface has received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordingStats {
    pub rects_filled: usize,
    pub sectors_filled: usize,
    pub polylines_stroked: usize,
    pub texts_drawn: usize,
    pub surfaces_drawn: usize,
    pub clears: usize,
}

/// Headless surface that keeps the draw calls it receives.
///
/// Clearing a rectangle drops the retained commands that lie entirely inside
/// it, so a buffer's command list reflects what would be visible after the
/// same calls on a pixel backend. Text is measured with a fixed advance model,
/// which keeps layout deterministic in tests.
#[derive(Debug)]
pub struct RecordingSurface {
    id: u64,
    viewport: Viewport,
    commands: Vec<DrawCommand>,
    stats: RecordingStats,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            id: NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed),
            viewport,
            commands: Vec::new(),
            stats: RecordingStats::default(),
        }
    }

    /// Process-unique identifier, referenced by `DrawCommand::DrawSurface`.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[must_use]
    pub fn stats(&self) -> RecordingStats {
        self.stats
    }

    /// Text of every retained `FillText` command, in draw order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

impl TextMeasure for RecordingSurface {
    fn measure_text(&self, text: &str, font: Font) -> f64 {
        advance_width(text, font)
    }
}

impl Surface for RecordingSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn create_offscreen(&self, viewport: Viewport) -> ChartResult<Self> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        Ok(Self::new(viewport))
    }

    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.viewport = viewport;
        self.commands.clear();
        Ok(())
    }

    fn clear_rect(&mut self, rect: Rect) -> ChartResult<()> {
        if !rect.is_finite() {
            return Err(ChartError::InvalidData(
                "clear rectangle must be finite".to_owned(),
            ));
        }
        let area = Rect::new(
            rect.x - CLEAR_TOLERANCE,
            rect.y - CLEAR_TOLERANCE,
            rect.w + CLEAR_TOLERANCE * 2.0,
            rect.h + CLEAR_TOLERANCE * 2.0,
        );
        self.commands
            .retain(|command| !area.contains_rect(command.bounds()));
        self.stats.clears += 1;
        Ok(())
    }

    fn clear(&mut self) -> ChartResult<()> {
        self.commands.clear();
        self.stats.clears += 1;
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> ChartResult<()> {
        if !rect.is_finite() {
            return Err(ChartError::InvalidData(
                "rectangle must be finite".to_owned(),
            ));
        }
        color.validate()?;
        self.push(DrawCommand::FillRect { rect, color });
        self.stats.rects_filled += 1;
        Ok(())
    }

    fn fill_ring_sector(&mut self, sector: RingSector, color: Color) -> ChartResult<()> {
        sector.validate()?;
        color.validate()?;
        self.push(DrawCommand::FillRingSector { sector, color });
        self.stats.sectors_filled += 1;
        Ok(())
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: &Stroke) -> ChartResult<()> {
        stroke.validate()?;
        if points
            .iter()
            .any(|point| !point.x.is_finite() || !point.y.is_finite())
        {
            return Err(ChartError::InvalidData(
                "polyline points must be finite".to_owned(),
            ));
        }
        self.push(DrawCommand::StrokePolyline {
            points: points.to_vec(),
            stroke: stroke.clone(),
        });
        self.stats.polylines_stroked += 1;
        Ok(())
    }

    fn fill_text(&mut self, text: &str, anchor: Point, style: &TextStyle) -> ChartResult<()> {
        if !anchor.x.is_finite() || !anchor.y.is_finite() {
            return Err(ChartError::InvalidData(
                "text anchor must be finite".to_owned(),
            ));
        }
        if !style.font.size_px.is_finite() || style.font.size_px < 0.0 {
            return Err(ChartError::InvalidData(
                "font size must be finite and >= 0".to_owned(),
            ));
        }
        style.color.validate()?;
        self.push(DrawCommand::FillText {
            text: text.to_owned(),
            anchor,
            style: *style,
        });
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
        if !source_rect.is_finite() || !dest.x.is_finite() || !dest.y.is_finite() {
            return Err(ChartError::InvalidData(
                "composite geometry must be finite".to_owned(),
            ));
        }
        if !alpha.is_finite() {
            return Err(ChartError::InvalidData(
                "composite alpha must be finite".to_owned(),
            ));
        }
        self.push(DrawCommand::DrawSurface {
            source_id: source.id,
            source_rect,
            dest,
            alpha: alpha.clamp(0.0, 1.0),
        });
        self.stats.surfaces_drawn += 1;
        Ok(())
    }
}

fn advance_width(text: &str, font: Font) -> f64 {
    let advance = if font.bold {
        BOLD_ADVANCE
    } else {
        REGULAR_ADVANCE
    };
    text.chars().count() as f64 * font.size_px * advance
}

fn text_bounds(text: &str, anchor: Point, style: &TextStyle) -> Rect {
    let size = style.font.size_px;
    let width = advance_width(text, style.font);
    let left = match style.h_align {
        TextHAlign::Left => anchor.x,
        TextHAlign::Center => anchor.x - width * 0.5,
        TextHAlign::Right => anchor.x - width,
    };
    let top = match style.baseline {
        TextBaseline::Alphabetic => anchor.y - size * ASCENT,
        TextBaseline::Middle => anchor.y - size * 0.5,
    };
    let shadow = style.shadow.map_or(0.0, |shadow| shadow.offset_y.max(0.0));
    Rect::new(left, top, width, size + shadow)
}
