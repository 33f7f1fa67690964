use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use tracing::debug;

use crate::api::{
    BUFFER_PADDING, BufferCache, CacheSlot, Chart, ChartModel, ChartOptions, ChartVariant,
    FrameInput, present_records,
};
use crate::core::{Easing, Point, Rect, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::HitTarget;
use crate::render::{Color, Font, Stroke, Surface, TextBaseline, TextHAlign, TextStyle};

use super::intervals::{format_interval_value, interval_count, interval_step};
use super::{FRAME_INK, HALF_PADDING, LABEL_SHADOW, blit_visible, check_positive};

const BAR_EPSILON: f64 = 0.001;
const GUIDE_EPSILON: f64 = 0.01;
/// Alpha the guideline starts from when a selection first appears.
const GUIDE_FADE_START: f64 = 0.01;

/// Caches of the row chart, built in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowCache {
    IntervalNum,
    DashLine,
    ActiveIntervalStr,
    ActiveDashLine,
    SideBorder,
    BottomBorder,
    VoteBar,
    Title,
    PercentNum,
}

/// Per-item payload of a row chart cache.
#[derive(Debug, Clone, PartialEq)]
pub enum RowRecord {
    /// Border or dash line; the rect alone describes it.
    Frame,
    Label { text: String },
    Bar {
        /// Full-length bar width in pixels.
        bar_width: f64,
        /// Distance between the bar end and the right edge of the bar area.
        right_side_spacing: f64,
    },
}

impl RowRecord {
    fn text(&self) -> &str {
        match self {
            Self::Label { text } => text,
            Self::Frame | Self::Bar { .. } => "",
        }
    }

    fn bar(&self) -> (f64, f64) {
        match self {
            Self::Bar {
                bar_width,
                right_side_spacing,
            } => (*bar_width, *right_side_spacing),
            Self::Frame | Self::Label { .. } => (0.0, 0.0),
        }
    }
}

/// Row (horizontal bar) chart configuration.
///
/// Sizes are in pixels, animation values in unit frames (about 16.7 ms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowChartConfig {
    /// Width of the host container; the chart fills it.
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_row_height")]
    pub row_height: f64,
    #[serde(default = "default_side_padding")]
    pub side_padding: f64,
    #[serde(default = "default_bottom_padding")]
    pub bottom_padding: f64,
    #[serde(default = "default_row_padding")]
    pub row_padding: f64,
    #[serde(default = "default_title_padding")]
    pub title_padding: f64,
    #[serde(default = "default_title_font_size")]
    pub title_font_size: f64,
    #[serde(default = "default_percent_num_size")]
    pub percent_num_size: f64,
    /// Gap between bar end and percentage; negative places labels inside first.
    #[serde(default = "default_percent_num_padding")]
    pub percent_num_padding: f64,
    #[serde(default = "default_side_indent_size")]
    pub side_indent_size: f64,
    #[serde(default)]
    pub disable_intervals: bool,
    #[serde(default = "default_interval_dash")]
    pub interval_dash: SmallVec<[f64; 4]>,
    #[serde(default = "default_interval_num_size")]
    pub interval_num_size: f64,
    #[serde(default = "default_interval_num_padding")]
    pub interval_num_padding: f64,
    #[serde(default = "default_desired_intervals")]
    pub desired_intervals: u32,
    /// Delay between the start of consecutive bars, in seconds of unit frames.
    #[serde(default = "default_anim_delay_interval")]
    pub anim_delay_interval: f64,
    /// Bar growth cap in pixels per unit frame.
    #[serde(default = "default_anim_linear_constant")]
    pub anim_linear_constant: f64,
    #[serde(default = "default_anim_ease")]
    pub anim_ease: f64,
    /// Unit frames the borders and axis take to fade in.
    #[serde(default = "default_intro_frames")]
    pub intro_frames: f64,
}

impl Default for RowChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            row_height: default_row_height(),
            side_padding: default_side_padding(),
            bottom_padding: default_bottom_padding(),
            row_padding: default_row_padding(),
            title_padding: default_title_padding(),
            title_font_size: default_title_font_size(),
            percent_num_size: default_percent_num_size(),
            percent_num_padding: default_percent_num_padding(),
            side_indent_size: default_side_indent_size(),
            disable_intervals: false,
            interval_dash: default_interval_dash(),
            interval_num_size: default_interval_num_size(),
            interval_num_padding: default_interval_num_padding(),
            desired_intervals: default_desired_intervals(),
            anim_delay_interval: default_anim_delay_interval(),
            anim_linear_constant: default_anim_linear_constant(),
            anim_ease: default_anim_ease(),
            intro_frames: default_intro_frames(),
        }
    }
}

impl RowChartConfig {
    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn with_row_height(mut self, row_height: f64) -> Self {
        self.row_height = row_height;
        self
    }

    #[must_use]
    pub fn with_side_padding(mut self, side_padding: f64) -> Self {
        self.side_padding = side_padding;
        self
    }

    #[must_use]
    pub fn with_intervals_disabled(mut self, disabled: bool) -> Self {
        self.disable_intervals = disabled;
        self
    }

    #[must_use]
    pub fn with_desired_intervals(mut self, desired: u32) -> Self {
        self.desired_intervals = desired;
        self
    }

    #[must_use]
    pub fn with_percent_num_padding(mut self, padding: f64) -> Self {
        self.percent_num_padding = padding;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        check_positive("width", self.width)?;
        check_positive("row_height", self.row_height)?;
        check_positive("title_font_size", self.title_font_size)?;
        check_positive("percent_num_size", self.percent_num_size)?;
        check_positive("interval_num_size", self.interval_num_size)?;
        check_positive("intro_frames", self.intro_frames)?;
        for (name, value) in [
            ("side_padding", self.side_padding),
            ("bottom_padding", self.bottom_padding),
            ("row_padding", self.row_padding),
            ("title_padding", self.title_padding),
            ("side_indent_size", self.side_indent_size),
            ("interval_num_padding", self.interval_num_padding),
            ("anim_delay_interval", self.anim_delay_interval),
            ("anim_linear_constant", self.anim_linear_constant),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if !self.percent_num_padding.is_finite() {
            return Err(ChartError::InvalidData(
                "percent_num_padding must be finite".to_owned(),
            ));
        }
        if self.width <= self.side_padding {
            return Err(ChartError::InvalidData(
                "width must be greater than side_padding".to_owned(),
            ));
        }
        if self.desired_intervals == 0 {
            return Err(ChartError::InvalidData(
                "desired_intervals must be >= 1".to_owned(),
            ));
        }
        if !self.anim_ease.is_finite() || self.anim_ease < 1.0 {
            return Err(ChartError::InvalidData(
                "anim_ease must be finite and >= 1".to_owned(),
            ));
        }
        if self
            .interval_dash
            .iter()
            .any(|segment| !segment.is_finite() || *segment < 0.0)
        {
            return Err(ChartError::InvalidData(
                "interval_dash segments must be finite and >= 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn total_row_height(&self) -> f64 {
        self.row_padding + self.title_font_size + self.title_padding + self.row_height
    }

    /// Height of the interval number strip under the rows.
    fn axis_height(&self) -> f64 {
        if self.disable_intervals {
            0.0
        } else {
            self.interval_num_size + self.interval_num_padding * 2.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisIntervals {
    count: u32,
    step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct RowLayout {
    width: f64,
    height: f64,
    total_row_height: f64,
    bar_area: f64,
    highest_votes: u64,
    rows: usize,
    intervals: Option<AxisIntervals>,
}

#[derive(Debug, Clone, PartialEq)]
struct RowAnimation {
    /// Seconds since the first frame, in unit-frame time.
    elapsed: f64,
    intro_alpha: f64,
    bar_completion: Vec<f64>,
    guide_alpha: f64,
    interval_alpha: f64,
    guide_x: f64,
    guide_visible: bool,
    selection: Option<usize>,
}

impl Default for RowAnimation {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            intro_alpha: 0.0,
            bar_completion: Vec::new(),
            guide_alpha: 0.0,
            interval_alpha: 1.0,
            guide_x: 0.0,
            guide_visible: false,
            selection: None,
        }
    }
}

/// Horizontal bar per entry, scaled to the highest vote count, with an
/// interval axis and a guideline that follows the hovered bar.
#[derive(Debug, Clone, PartialEq)]
pub struct RowChart {
    config: RowChartConfig,
    layout: RowLayout,
    anim: RowAnimation,
}

impl RowChart {
    pub fn new(config: RowChartConfig) -> ChartResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            layout: RowLayout::default(),
            anim: RowAnimation::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RowChartConfig {
        &self.config
    }

    /// Number of axis intervals, `None` when intervals are disabled or the
    /// chart has not been laid out.
    #[must_use]
    pub fn interval_count(&self) -> Option<u32> {
        self.layout.intervals.map(|intervals| intervals.count)
    }

    /// Vote count the bars are scaled against (at least 1).
    #[must_use]
    pub fn highest_votes(&self) -> u64 {
        self.layout.highest_votes
    }

    #[must_use]
    pub fn total_row_height(&self) -> f64 {
        self.layout.total_row_height
    }

    /// Grow progress of bar `index` in `[0, 1]`.
    #[must_use]
    pub fn bar_completion(&self, index: usize) -> f64 {
        self.anim.bar_completion.get(index).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn intro_alpha(&self) -> f64 {
        self.anim.intro_alpha
    }

    #[must_use]
    pub fn guideline_alpha(&self) -> f64 {
        self.anim.guide_alpha
    }

    #[must_use]
    pub fn interval_alpha(&self) -> f64 {
        self.anim.interval_alpha
    }

    #[must_use]
    pub fn guideline_x(&self) -> f64 {
        self.anim.guide_x
    }

    #[must_use]
    pub fn guideline_visible(&self) -> bool {
        self.anim.guide_visible
    }

    /// Whether the percentage label of a bar sits inside the bar.
    fn label_inside(&self, label_width: f64, bar_width: f64, right_side_spacing: f64) -> bool {
        let padding = self.config.percent_num_padding;
        if padding >= 0.0 {
            padding + label_width >= right_side_spacing
        } else {
            padding.abs() * 2.0 + label_width < bar_width
        }
    }

    fn label_x(&self, bar_end: f64, label_width: f64, inside: bool) -> f64 {
        let padding = self.config.percent_num_padding;
        match (padding >= 0.0, inside) {
            (true, true) => bar_end - padding - label_width,
            (true, false) => bar_end + padding - HALF_PADDING,
            (false, true) => bar_end + padding - label_width,
            (false, false) => bar_end - padding - HALF_PADDING,
        }
    }

    fn bar_row_y(&self, index: usize) -> f64 {
        self.layout.total_row_height * index as f64
            + self.config.row_padding * 0.5
            + self.config.title_font_size
            + self.config.title_padding
    }

    fn bar_easing(&self, bar_width: f64) -> Easing {
        let linear_rate = if bar_width > 0.0 {
            self.config.anim_linear_constant / bar_width
        } else {
            f64::INFINITY
        };
        Easing::hybrid(linear_rate, self.config.anim_ease, BAR_EPSILON)
    }
}

impl ChartVariant for RowChart {
    type Key = RowCache;
    type Record = RowRecord;

    fn name(&self) -> &'static str {
        "row"
    }

    fn layout<S: Surface>(&mut self, model: &ChartModel, _surface: &S) -> ChartResult<Viewport> {
        let config = &self.config;
        let data = model.data();
        let rows = data.len();
        let total_row_height = config.total_row_height();
        let height =
            total_row_height * rows as f64 + config.bottom_padding + config.axis_height();
        let highest_votes = data.max_votes().max(1);
        let intervals = (!config.disable_intervals).then(|| {
            let count = interval_count(highest_votes, config.desired_intervals);
            AxisIntervals {
                count,
                step: interval_step(highest_votes, count),
            }
        });

        let viewport = Viewport::from_layout_size(config.width, height);
        self.layout = RowLayout {
            width: f64::from(viewport.width),
            height: f64::from(viewport.height),
            total_row_height,
            bar_area: config.width - config.side_padding,
            highest_votes,
            rows,
            intervals,
        };
        self.anim = RowAnimation {
            bar_completion: vec![0.0; rows],
            ..RowAnimation::default()
        };
        if let Some(intervals) = intervals {
            debug!(
                count = intervals.count,
                step = intervals.step,
                highest_votes,
                "row chart intervals"
            );
        }
        Ok(viewport)
    }

    fn build_caches<S: Surface>(
        &mut self,
        caches: &mut BufferCache<RowCache, RowRecord, S>,
        surface: &S,
        model: &ChartModel,
    ) -> ChartResult<()> {
        let config = &self.config;
        let layout = self.layout;
        let rows = layout.rows;
        let axis_height = config.axis_height();
        let axis_font = Font::bold(config.interval_num_size);
        let axis_style = TextStyle::new(axis_font, FRAME_INK).centered();
        let dash_height = layout.total_row_height * rows as f64
            + config.bottom_padding
            + axis_height
            + BUFFER_PADDING;
        let frame_stroke = Stroke::solid(2.0, FRAME_INK);

        let paint_dash_line = |buffer: &mut S, slots: &[CacheSlot<RowRecord>]| -> ChartResult<()> {
            for (_, record) in present_records(slots) {
                let rect = record.rect;
                let x = rect.x + HALF_PADDING + 1.0;
                let axis_top = rect.bottom() - (axis_height + HALF_PADDING);
                buffer.stroke_polyline(
                    &[Point::new(x, rect.bottom() - HALF_PADDING), Point::new(x, axis_top)],
                    &frame_stroke,
                )?;
                buffer.stroke_polyline(
                    &[Point::new(x, axis_top), Point::new(x, rect.y + HALF_PADDING)],
                    &Stroke::dashed(2.0, FRAME_INK, &config.interval_dash),
                )?;
            }
            Ok(())
        };
        let paint_centered_labels = |buffer: &mut S, slots: &[CacheSlot<RowRecord>]| -> ChartResult<()> {
            for (_, record) in present_records(slots) {
                let rect = record.rect;
                buffer.fill_text(
                    record.data.text(),
                    Point::new(
                        (rect.x + rect.w * 0.5).round(),
                        (rect.y + rect.h * 0.5).round(),
                    ),
                    &axis_style,
                )?;
            }
            Ok(())
        };

        if let Some(intervals) = layout.intervals {
            caches.build(
                surface,
                RowCache::IntervalNum,
                intervals.count as usize + 1,
                false,
                |index, earlier, _| {
                    let text = format_interval_value(intervals.step * index as f64);
                    let offset: f64 = present_records(earlier).map(|(_, r)| r.rect.w).sum();
                    let width = surface.measure_text(&text, axis_font);
                    Ok(CacheSlot::present(
                        Rect::new(
                            HALF_PADDING + offset,
                            HALF_PADDING,
                            width + BUFFER_PADDING,
                            config.interval_num_size + BUFFER_PADDING,
                        ),
                        RowRecord::Label { text },
                    ))
                },
                |buffer, slots, _| paint_centered_labels(buffer, slots),
            )?;
            caches.build(
                surface,
                RowCache::DashLine,
                1,
                false,
                |_, _, _| Ok(dash_line_slot(dash_height)),
                |buffer, slots, _| paint_dash_line(buffer, slots),
            )?;
        }

        caches.build(
            surface,
            RowCache::ActiveIntervalStr,
            rows,
            false,
            |index, earlier, _| {
                let text = format!("{} {}", model.votes(index), model.votes_label());
                let offset: f64 = present_records(earlier).map(|(_, r)| r.rect.h).sum();
                let width = surface.measure_text(&text, axis_font);
                Ok(CacheSlot::present(
                    Rect::new(
                        HALF_PADDING,
                        HALF_PADDING + offset,
                        width + BUFFER_PADDING,
                        config.interval_num_size + BUFFER_PADDING,
                    ),
                    RowRecord::Label { text },
                ))
            },
            |buffer, slots, _| paint_centered_labels(buffer, slots),
        )?;

        caches.build(
            surface,
            RowCache::ActiveDashLine,
            1,
            false,
            |_, _, _| Ok(dash_line_slot(dash_height)),
            |buffer, slots, _| paint_dash_line(buffer, slots),
        )?;

        caches.build(
            surface,
            RowCache::SideBorder,
            1,
            false,
            |_, _, _| {
                Ok(CacheSlot::present(
                    Rect::new(
                        HALF_PADDING,
                        HALF_PADDING,
                        2.0 + config.side_indent_size + BUFFER_PADDING,
                        layout.total_row_height + BUFFER_PADDING,
                    ),
                    RowRecord::Frame,
                ))
            },
            |buffer, slots, _| {
                for (_, record) in present_records(slots) {
                    let rect = record.rect;
                    let x = rect.x + HALF_PADDING + 1.0;
                    let top = rect.y + HALF_PADDING + 1.0;
                    buffer.stroke_polyline(
                        &[
                            Point::new(x, rect.bottom() - HALF_PADDING),
                            Point::new(x, top),
                            Point::new(rect.x + HALF_PADDING + config.side_indent_size, top),
                        ],
                        &frame_stroke,
                    )?;
                }
                Ok(())
            },
        )?;

        caches.build(
            surface,
            RowCache::BottomBorder,
            1,
            false,
            |_, _, _| {
                Ok(CacheSlot::present(
                    Rect::new(
                        HALF_PADDING,
                        HALF_PADDING,
                        layout.width + BUFFER_PADDING,
                        config.bottom_padding + axis_height + BUFFER_PADDING,
                    ),
                    RowRecord::Frame,
                ))
            },
            |buffer, slots, _| {
                for (_, record) in present_records(slots) {
                    let rect = record.rect;
                    let x = rect.x + HALF_PADDING + 1.0;
                    let bottom = rect.bottom() - HALF_PADDING - 1.0;
                    buffer.stroke_polyline(
                        &[
                            Point::new(x, rect.y + HALF_PADDING),
                            Point::new(x, bottom),
                            Point::new(rect.w - HALF_PADDING, bottom),
                        ],
                        &frame_stroke,
                    )?;
                }
                Ok(())
            },
        )?;

        let completion = &self.anim.bar_completion;
        caches.build(
            surface,
            RowCache::VoteBar,
            rows,
            true,
            |index, _, _| {
                let bar_width =
                    layout.bar_area * (model.votes(index) as f64 / layout.highest_votes as f64);
                Ok(CacheSlot::present(
                    Rect::new(
                        HALF_PADDING,
                        HALF_PADDING + index as f64 * (config.row_height + BUFFER_PADDING),
                        bar_width + BUFFER_PADDING,
                        config.row_height + BUFFER_PADDING,
                    ),
                    RowRecord::Bar {
                        bar_width,
                        right_side_spacing: layout.bar_area - bar_width,
                    },
                ))
            },
            |buffer, slots, _| paint_bars(buffer, slots, completion, model),
        )?;

        let title_font = Font::bold(config.title_font_size);
        caches.build(
            surface,
            RowCache::Title,
            rows,
            false,
            |index, _, _| {
                let text = model.title(index).to_owned();
                let width = surface.measure_text(&text, title_font);
                Ok(CacheSlot::present(
                    Rect::new(
                        HALF_PADDING,
                        HALF_PADDING + index as f64 * (config.title_font_size + BUFFER_PADDING),
                        width + BUFFER_PADDING,
                        config.title_font_size + BUFFER_PADDING,
                    ),
                    RowRecord::Label { text },
                ))
            },
            |buffer, slots, _| {
                let style = TextStyle::new(title_font, Color::ink(1.0))
                    .aligned(TextHAlign::Left, TextBaseline::Alphabetic);
                for (_, record) in present_records(slots) {
                    buffer.fill_text(
                        record.data.text(),
                        Point::new(
                            record.rect.x + HALF_PADDING,
                            record.rect.y + HALF_PADDING + config.title_font_size,
                        ),
                        &style,
                    )?;
                }
                Ok(())
            },
        )?;

        let percent_font = Font::bold(config.percent_num_size);
        caches.build(
            surface,
            RowCache::PercentNum,
            rows,
            false,
            |index, _, _| {
                let text = format!("{}%", model.data().percent_rounded(index));
                let width = surface.measure_text(&text, percent_font);
                Ok(CacheSlot::present(
                    Rect::new(
                        HALF_PADDING,
                        HALF_PADDING + index as f64 * (config.percent_num_size + BUFFER_PADDING),
                        width + BUFFER_PADDING,
                        config.percent_num_size + BUFFER_PADDING,
                    ),
                    RowRecord::Label { text },
                ))
            },
            |buffer, slots, finished| {
                let bars = finished.slots(RowCache::VoteBar)?;
                for (index, record) in present_records(slots) {
                    let (bar_width, right_side_spacing) = bars
                        .get(index)
                        .and_then(CacheSlot::record)
                        .map_or((0.0, 0.0), |bar| bar.data.bar());
                    let inside = self.label_inside(
                        record.rect.w - BUFFER_PADDING,
                        bar_width,
                        right_side_spacing,
                    );
                    let color = if inside { Color::WHITE } else { model.color(index) };
                    let style = TextStyle::new(percent_font, color)
                        .centered()
                        .with_shadow(LABEL_SHADOW, 1.0);
                    buffer.fill_text(
                        record.data.text(),
                        Point::new(
                            record.rect.x + record.rect.w * 0.5,
                            record.rect.y + record.rect.h * 0.5,
                        ),
                        &style,
                    )?;
                }
                Ok(())
            },
        )?;

        Ok(())
    }

    fn animate<S: Surface>(
        &mut self,
        frame: FrameInput,
        caches: &mut BufferCache<RowCache, RowRecord, S>,
        model: &ChartModel,
    ) -> ChartResult<bool> {
        let dt = frame.time_delta;
        let mut settled = true;

        let mut bars_changed = false;
        for (index, record) in present_records(caches.slots(RowCache::VoteBar)?) {
            let (bar_width, _) = record.data.bar();
            let current = self.anim.bar_completion[index];
            if self.anim.elapsed < self.config.anim_delay_interval * index as f64 {
                settled &= current == 1.0;
                continue;
            }
            let eased = self.bar_easing(bar_width).step(current, 1.0, dt);
            self.anim.bar_completion[index] = eased.value;
            bars_changed |= eased.changed;
            settled &= eased.settled;
        }
        if bars_changed {
            let completion = &self.anim.bar_completion;
            caches.redraw(RowCache::VoteBar, |buffer, slots, _| {
                paint_bars(buffer, slots, completion, model)
            })?;
        }

        if self.anim.intro_alpha < 1.0 {
            self.anim.intro_alpha = (self.anim.intro_alpha + dt / self.config.intro_frames).min(1.0);
            settled = false;
        }

        if self.anim.intro_alpha >= 1.0 {
            settled &= self.animate_guideline(frame, caches)?;
        }

        self.anim.elapsed += dt / 60.0;
        Ok(settled)
    }

    fn composite<S: Surface>(
        &self,
        target: &mut S,
        caches: &BufferCache<RowCache, RowRecord, S>,
        _model: &ChartModel,
    ) -> ChartResult<()> {
        let config = &self.config;
        let layout = &self.layout;
        let anim = &self.anim;
        let rows = layout.rows;
        let axis_y = layout.height - config.interval_num_size - config.interval_num_padding
            - HALF_PADDING;

        blit_visible(
            caches,
            target,
            RowCache::BottomBorder,
            0,
            Point::new(
                -HALF_PADDING,
                layout.total_row_height * rows as f64 - HALF_PADDING,
            ),
            anim.intro_alpha,
        )?;

        if let Some(intervals) = layout.intervals {
            let alpha = anim.intro_alpha * anim.interval_alpha;
            let step_width = layout.bar_area / layout.highest_votes as f64 * intervals.step;
            let dash_width = record_rect(caches, RowCache::DashLine, 0)?.w;
            for (index, record) in present_records(caches.slots(RowCache::IntervalNum)?) {
                let boundary = config.side_padding + step_width * index as f64;
                if index != 0 {
                    blit_visible(
                        caches,
                        target,
                        RowCache::DashLine,
                        0,
                        Point::new((boundary - dash_width * 0.5 - 1.0).floor(), -HALF_PADDING),
                        alpha,
                    )?;
                }
                let x = if index == 0 {
                    config.side_padding - HALF_PADDING
                } else {
                    boundary - (record.rect.w - HALF_PADDING) - config.interval_num_padding - 1.0
                };
                blit_visible(
                    caches,
                    target,
                    RowCache::IntervalNum,
                    index,
                    Point::new(x.floor(), axis_y.floor()),
                    alpha,
                )?;
            }
        }

        if anim.guide_visible {
            let dash_width = record_rect(caches, RowCache::ActiveDashLine, 0)?.w;
            blit_visible(
                caches,
                target,
                RowCache::ActiveDashLine,
                0,
                Point::new(anim.guide_x - dash_width * 0.5 - 1.0, -HALF_PADDING),
                anim.guide_alpha,
            )?;
        }

        let bars = caches.slots(RowCache::VoteBar)?;
        let labels = caches.slots(RowCache::ActiveIntervalStr)?;
        let percents = caches.slots(RowCache::PercentNum)?;
        for (index, bar) in present_records(bars) {
            let row_top = layout.total_row_height * index as f64;
            let completion = anim.bar_completion[index];
            let (bar_width, right_side_spacing) = bar.data.bar();

            if anim.guide_visible && anim.selection == Some(index) {
                if let Some(label) = labels.get(index).and_then(CacheSlot::record) {
                    let label_width = label.rect.w - BUFFER_PADDING;
                    let x = if label_width > right_side_spacing {
                        anim.guide_x - config.interval_num_padding - label.rect.w + BUFFER_PADDING
                            - 1.0
                    } else {
                        anim.guide_x + config.interval_num_padding - HALF_PADDING - 1.0
                    };
                    blit_visible(
                        caches,
                        target,
                        RowCache::ActiveIntervalStr,
                        index,
                        Point::new(x.floor(), axis_y),
                        anim.guide_alpha,
                    )?;
                }
            }

            blit_visible(
                caches,
                target,
                RowCache::SideBorder,
                0,
                Point::new(-HALF_PADDING, row_top - HALF_PADDING),
                anim.intro_alpha,
            )?;
            blit_visible(
                caches,
                target,
                RowCache::Title,
                index,
                Point::new(
                    config.side_padding - HALF_PADDING,
                    row_top + config.row_padding * 0.5 - HALF_PADDING,
                ),
                completion,
            )?;
            blit_visible(
                caches,
                target,
                RowCache::VoteBar,
                index,
                Point::new(
                    config.side_padding - HALF_PADDING,
                    self.bar_row_y(index) - HALF_PADDING,
                ),
                1.0,
            )?;

            if let Some(percent) = percents.get(index).and_then(CacheSlot::record) {
                let label_width = percent.rect.w - BUFFER_PADDING;
                let bar_end = config.side_padding + bar_width * completion;
                let inside = self.label_inside(label_width, bar_width, right_side_spacing);
                blit_visible(
                    caches,
                    target,
                    RowCache::PercentNum,
                    index,
                    Point::new(
                        self.label_x(bar_end, label_width, inside),
                        self.bar_row_y(index) + (config.row_height - percent.rect.h) * 0.5,
                    ),
                    completion,
                )?;
            }
        }
        Ok(())
    }

    fn hit_test<S: Surface>(
        &self,
        target: HitTarget<RowCache>,
        pointer: Point,
        _caches: &BufferCache<RowCache, RowRecord, S>,
        _model: &ChartModel,
    ) -> bool {
        if target.key != RowCache::VoteBar || pointer.x < self.config.side_padding {
            return false;
        }
        let top = self.layout.total_row_height * target.index as f64;
        pointer.y >= top && pointer.y < top + self.layout.total_row_height
    }
}

impl RowChart {
    /// Eases the guideline toward the selected bar end and cross-fades it
    /// against the interval axis. Returns whether it has settled.
    fn animate_guideline<S: Surface>(
        &mut self,
        frame: FrameInput,
        caches: &BufferCache<RowCache, RowRecord, S>,
    ) -> ChartResult<bool> {
        let dt = frame.time_delta;
        let easing = Easing::proportional(self.config.anim_ease, GUIDE_EPSILON);
        let anim = &mut self.anim;
        anim.selection = frame.selection;

        let Some(selected) = frame.selection else {
            if anim.guide_alpha == 0.0 {
                return Ok(true);
            }
            let eased = easing.step(anim.guide_alpha, 0.0, dt);
            anim.guide_alpha = eased.value;
            anim.interval_alpha = 1.0 - eased.value;
            if eased.settled {
                anim.guide_visible = false;
            }
            return Ok(eased.settled);
        };

        let selected_x = match caches.record(RowCache::VoteBar, selected)? {
            Some(record) => self.config.side_padding + record.data.bar().0,
            None => return Ok(true),
        };

        if anim.guide_alpha == 0.0 {
            anim.guide_x = selected_x;
            anim.guide_alpha = GUIDE_FADE_START;
            anim.interval_alpha = 1.0 - GUIDE_FADE_START;
            anim.guide_visible = true;
            return Ok(false);
        }

        let position = easing.step(anim.guide_x, selected_x, dt);
        anim.guide_x = position.value;
        let alpha = easing.step(anim.guide_alpha, 1.0, dt);
        anim.guide_alpha = alpha.value;
        anim.interval_alpha = 1.0 - alpha.value;
        Ok(position.settled && alpha.settled)
    }
}

impl<S: Surface> Chart<S, RowChart> {
    /// Row chart over `data` with the given configuration.
    pub fn row_chart(
        surface: S,
        data: &Value,
        options: ChartOptions,
        config: RowChartConfig,
    ) -> ChartResult<Self> {
        Ok(Self::new(surface, data, options, RowChart::new(config)?))
    }
}

fn dash_line_slot(height: f64) -> CacheSlot<RowRecord> {
    CacheSlot::present(
        Rect::new(HALF_PADDING, HALF_PADDING, 2.0 + BUFFER_PADDING, height),
        RowRecord::Frame,
    )
}

fn paint_bars<S: Surface>(
    buffer: &mut S,
    slots: &[CacheSlot<RowRecord>],
    completion: &[f64],
    model: &ChartModel,
) -> ChartResult<()> {
    for (index, record) in present_records(slots) {
        let width = (record.rect.w - BUFFER_PADDING) * completion.get(index).copied().unwrap_or(0.0);
        if width <= 0.0 {
            continue;
        }
        buffer.fill_rect(
            Rect::new(
                record.rect.x + HALF_PADDING,
                record.rect.y + HALF_PADDING,
                width,
                record.rect.h - BUFFER_PADDING,
            ),
            model.color(index),
        )?;
    }
    Ok(())
}

fn record_rect<S: Surface>(
    caches: &BufferCache<RowCache, RowRecord, S>,
    key: RowCache,
    index: usize,
) -> ChartResult<Rect> {
    caches
        .record(key, index)?
        .map(|record| record.rect)
        .ok_or_else(|| ChartError::InvalidData(format!("{key:?} item {index} is absent")))
}

fn default_width() -> f64 {
    400.0
}

fn default_row_height() -> f64 {
    24.0
}

fn default_side_padding() -> f64 {
    20.0
}

fn default_bottom_padding() -> f64 {
    10.0
}

fn default_row_padding() -> f64 {
    16.0
}

fn default_title_padding() -> f64 {
    12.0
}

fn default_title_font_size() -> f64 {
    14.0
}

fn default_percent_num_size() -> f64 {
    16.0
}

fn default_percent_num_padding() -> f64 {
    6.0
}

fn default_side_indent_size() -> f64 {
    10.0
}

fn default_interval_dash() -> SmallVec<[f64; 4]> {
    SmallVec::from_slice(&[2.0, 8.0])
}

fn default_interval_num_size() -> f64 {
    12.0
}

fn default_interval_num_padding() -> f64 {
    6.0
}

fn default_desired_intervals() -> u32 {
    5
}

fn default_anim_delay_interval() -> f64 {
    0.1
}

fn default_anim_linear_constant() -> f64 {
    25.0
}

fn default_anim_ease() -> f64 {
    5.0
}

fn default_intro_frames() -> f64 {
    30.0
}

#[cfg(test)]
mod tests {
    use super::{RowChart, RowChartConfig};

    #[test]
    fn config_fields_default_when_missing() {
        let config: RowChartConfig =
            serde_json::from_str(r#"{"width": 640, "interval_dash": [4, 4]}"#).expect("config json");
        assert_eq!(config.width, 640.0);
        assert_eq!(config.interval_dash.as_slice(), &[4.0, 4.0]);
        assert_eq!(config.row_height, 24.0);
        assert_eq!(config.desired_intervals, 5);
        assert!(!config.disable_intervals);
    }

    #[test]
    fn validate_rejects_unusable_geometry() {
        assert!(RowChartConfig::default().validate().is_ok());
        assert!(RowChartConfig::default().with_width(10.0).validate().is_err());
        assert!(RowChartConfig::default().with_row_height(0.0).validate().is_err());
        assert!(
            RowChartConfig::default()
                .with_desired_intervals(0)
                .validate()
                .is_err()
        );
        assert!(RowChart::new(RowChartConfig::default().with_percent_num_padding(f64::NAN)).is_err());
    }

    #[test]
    fn percent_label_moves_inside_when_it_would_overflow() {
        let chart = RowChart::new(RowChartConfig::default()).expect("row chart");
        // 6 px gap + 30 px label needs more than 20 px of spare width
        assert!(chart.label_inside(30.0, 360.0, 20.0));
        assert!(!chart.label_inside(30.0, 200.0, 180.0));
    }

    #[test]
    fn negative_padding_puts_labels_inside_long_bars_only() {
        let chart = RowChart::new(RowChartConfig::default().with_percent_num_padding(-6.0))
            .expect("row chart");
        assert!(chart.label_inside(30.0, 100.0, 280.0));
        assert!(!chart.label_inside(30.0, 40.0, 340.0));
        assert_eq!(chart.label_x(100.0, 30.0, true), 64.0);
    }
}
