use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{
    BUFFER_PADDING, BufferCache, CacheSlot, Chart, ChartModel, ChartOptions, ChartVariant,
    FrameInput, present_records,
};
use crate::core::{Easing, Point, Rect, SortMode, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::HitTarget;
use crate::render::text_fit::contract_text;
use crate::render::{Color, Font, RingSector, Surface, TextBaseline, TextHAlign, TextStyle};

use super::center_text::fit_center_text;
use super::{HALF_PADDING, LABEL_SHADOW, blit_visible, check_positive};

const COMPLETION_EPSILON: f64 = 0.001;
const SELECTION_EPSILON: f64 = 0.01;
/// Overdraw at both arc ends so neighbouring arcs leave no hairline gap.
const ARC_OVERLAP: f64 = 0.004;
const MIN_THICKNESS: f64 = 10.0;
const MAX_THICKNESS: f64 = 100.0;
const LIST_DIMMED: f64 = 0.5;

/// Caches of the ring chart, built in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingCache {
    Arc,
    CenterInfo,
    PercentNum,
    VoteList,
}

/// Per-item payload of a ring chart cache.
#[derive(Debug, Clone, PartialEq)]
pub enum RingRecord {
    Arc {
        /// Angle from 12 o'clock where the arc starts, clockwise.
        rad_offset: f64,
        rad_percent: f64,
        /// Unit vector along the arc bisector; zero for a full circle.
        direction: Point,
    },
    CenterInfo {
        number: String,
        label: String,
        label_size: f64,
        number_size: f64,
    },
    Percent {
        text: String,
    },
    ListRow {
        title: String,
        percent: String,
    },
}

impl RingRecord {
    fn arc(&self) -> Option<(f64, f64, Point)> {
        match self {
            Self::Arc {
                rad_offset,
                rad_percent,
                direction,
            } => Some((*rad_offset, *rad_percent, *direction)),
            _ => None,
        }
    }
}

/// Ring (donut) chart configuration. Sizes are in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingChartConfig {
    #[serde(default = "default_diameter")]
    pub diameter: f64,
    /// Ring thickness as a percentage of the outer radius, clamped to `[10, 100]`.
    #[serde(default = "default_thickness")]
    pub thickness: f64,
    #[serde(default = "default_circle_completion_ease")]
    pub circle_completion_ease: f64,
    /// How far a selected arc moves out along its bisector.
    #[serde(default = "default_piece_offset_amount")]
    pub piece_offset_amount: f64,
    #[serde(default = "default_piece_offset_smooth")]
    pub piece_offset_smooth: f64,
    #[serde(default)]
    pub disable_percent_nums: bool,
    /// Ignored at thickness 100, where there is no hole to draw into.
    #[serde(default)]
    pub disable_center_info: bool,
    #[serde(default = "default_percent_num_font_size")]
    pub percent_num_font_size: f64,
    /// Distance of percent labels from the outer edge; negative moves them
    /// onto the ring.
    #[serde(default = "default_percent_num_offset")]
    pub percent_num_offset: f64,
    #[serde(default = "default_center_info_size_mult")]
    pub center_info_size_mult: f64,
    #[serde(default = "default_vote_list_width")]
    pub vote_list_width: f64,
    #[serde(default = "default_vote_list_padding")]
    pub vote_list_padding: f64,
    #[serde(default = "default_vote_list_font_size")]
    pub vote_list_font_size: f64,
    #[serde(default = "default_vote_list_offset")]
    pub vote_list_offset: f64,
    #[serde(default)]
    pub horizontal_padding: f64,
}

impl Default for RingChartConfig {
    fn default() -> Self {
        Self {
            diameter: default_diameter(),
            thickness: default_thickness(),
            circle_completion_ease: default_circle_completion_ease(),
            piece_offset_amount: default_piece_offset_amount(),
            piece_offset_smooth: default_piece_offset_smooth(),
            disable_percent_nums: false,
            disable_center_info: false,
            percent_num_font_size: default_percent_num_font_size(),
            percent_num_offset: default_percent_num_offset(),
            center_info_size_mult: default_center_info_size_mult(),
            vote_list_width: default_vote_list_width(),
            vote_list_padding: default_vote_list_padding(),
            vote_list_font_size: default_vote_list_font_size(),
            vote_list_offset: default_vote_list_offset(),
            horizontal_padding: 0.0,
        }
    }
}

impl RingChartConfig {
    #[must_use]
    pub fn with_diameter(mut self, diameter: f64) -> Self {
        self.diameter = diameter;
        self
    }

    #[must_use]
    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    #[must_use]
    pub fn with_percent_nums_disabled(mut self, disabled: bool) -> Self {
        self.disable_percent_nums = disabled;
        self
    }

    #[must_use]
    pub fn with_center_info_disabled(mut self, disabled: bool) -> Self {
        self.disable_center_info = disabled;
        self
    }

    #[must_use]
    pub fn with_percent_num_offset(mut self, offset: f64) -> Self {
        self.percent_num_offset = offset;
        self
    }

    #[must_use]
    pub fn with_vote_list_width(mut self, width: f64) -> Self {
        self.vote_list_width = width;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        check_positive("diameter", self.diameter)?;
        check_positive("percent_num_font_size", self.percent_num_font_size)?;
        check_positive("center_info_size_mult", self.center_info_size_mult)?;
        check_positive("vote_list_width", self.vote_list_width)?;
        check_positive("vote_list_font_size", self.vote_list_font_size)?;
        check_positive("piece_offset_amount", self.piece_offset_amount)?;
        for (name, value) in [
            ("vote_list_padding", self.vote_list_padding),
            ("vote_list_offset", self.vote_list_offset),
            ("horizontal_padding", self.horizontal_padding),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        for (name, value) in [
            ("circle_completion_ease", self.circle_completion_ease),
            ("piece_offset_smooth", self.piece_offset_smooth),
        ] {
            if !value.is_finite() || value < 1.0 {
                return Err(ChartError::InvalidData(format!(
                    "{name} must be finite and >= 1"
                )));
            }
        }
        if !self.thickness.is_finite() || !self.percent_num_offset.is_finite() {
            return Err(ChartError::InvalidData(
                "thickness and percent_num_offset must be finite".to_owned(),
            ));
        }
        Ok(())
    }

    fn outer_radius(&self) -> f64 {
        self.diameter * 0.5
    }

    fn inner_radius(&self) -> f64 {
        (1.0 - self.thickness / 100.0) * self.outer_radius()
    }

    fn center_info_enabled(&self) -> bool {
        !self.disable_center_info && self.thickness < MAX_THICKNESS
    }

    /// Percent label offset and font size, both zero when labels are off.
    fn percent_metrics(&self) -> (f64, f64) {
        if self.disable_percent_nums {
            (0.0, 0.0)
        } else {
            (self.percent_num_offset, self.percent_num_font_size)
        }
    }

    fn list_row_height(&self) -> f64 {
        self.vote_list_font_size + self.vote_list_padding * 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct RingLayout {
    width: f64,
    /// Diameter of the area the ring, its offsets and percent labels use.
    total_diameter: f64,
    list_height: f64,
    center: Point,
    entries: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct RingAnimation {
    circle_completion: f64,
    piece_offsets: Vec<f64>,
    list_alpha: Vec<f64>,
    center_offset: Point,
}

/// Donut chart with an arc per entry, a vote count in the hole and a color
/// keyed vote list underneath.
#[derive(Debug, Clone, PartialEq)]
pub struct RingChart {
    config: RingChartConfig,
    layout: RingLayout,
    anim: RingAnimation,
}

impl RingChart {
    /// Validates `config` and clamps its thickness into `[10, 100]`.
    pub fn new(mut config: RingChartConfig) -> ChartResult<Self> {
        config.validate()?;
        let clamped = config.thickness.clamp(MIN_THICKNESS, MAX_THICKNESS);
        if clamped != config.thickness {
            warn!(
                thickness = config.thickness,
                clamped, "ring thickness out of range, clamped"
            );
            config.thickness = clamped;
        }
        Ok(Self {
            config,
            layout: RingLayout::default(),
            anim: RingAnimation::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RingChartConfig {
        &self.config
    }

    #[must_use]
    pub fn outer_radius(&self) -> f64 {
        self.config.outer_radius()
    }

    #[must_use]
    pub fn inner_radius(&self) -> f64 {
        self.config.inner_radius()
    }

    /// Center of the resting ring in surface pixels.
    #[must_use]
    pub fn center(&self) -> Point {
        self.layout.center
    }

    /// Progress of the opening sweep in `[0, 1]`.
    #[must_use]
    pub fn circle_completion(&self) -> f64 {
        self.anim.circle_completion
    }

    /// Distance arc `index` currently sits away from the ring center.
    #[must_use]
    pub fn piece_offset(&self, index: usize) -> f64 {
        self.anim.piece_offsets.get(index).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn list_alpha(&self, index: usize) -> f64 {
        self.anim.list_alpha.get(index).copied().unwrap_or(0.0)
    }

    /// Shift applied to the whole ring so an offset arc stays centered.
    #[must_use]
    pub fn center_offset(&self) -> Point {
        self.anim.center_offset
    }

    fn arc_color(model: &ChartModel, index: usize) -> Color {
        if model.data().total_votes() == 0 {
            Color::NEUTRAL
        } else {
            model.color(index)
        }
    }

    /// Whether the arc of `index` has nothing to show.
    fn arc_absent(model: &ChartModel, index: usize) -> bool {
        let total = model.data().total_votes();
        if total == 0 {
            index != 0
        } else {
            model.votes(index) == 0
        }
    }

    fn list_top(&self) -> f64 {
        self.layout.total_diameter + self.config.vote_list_offset
    }

    fn list_left(&self) -> f64 {
        (self.layout.width - self.config.vote_list_width) * 0.5
    }

    fn hit_arc(&self, index: usize, pointer: Point, record: &RingRecord, model: &ChartModel) -> bool {
        let Some((rad_offset, rad_percent, _)) = record.arc() else {
            return false;
        };
        let center = self.layout.center;
        let dx = pointer.x - (center.x + self.anim.center_offset.x);
        let dy = pointer.y - (center.y + self.anim.center_offset.y);
        let angle = (-dx).atan2(dy) + PI;
        let length_sq = dx * dx + dy * dy;
        let outer = self.config.outer_radius();
        let inner = self.config.inner_radius();
        let reach = if model.votes(index) == model.data().total_votes() {
            outer
        } else {
            outer + self.piece_offset(index)
        };
        length_sq <= reach * reach
            && length_sq >= inner * inner
            && angle >= rad_offset
            && angle < rad_offset + rad_percent
    }

    fn hit_list_row(&self, index: usize, pointer: Point) -> bool {
        let left = self.list_left();
        let row_height = self.layout.list_height / self.layout.entries as f64;
        Rect::new(
            left,
            self.list_top() + row_height * index as f64,
            self.layout.width - left * 2.0,
            row_height,
        )
        .contains_point(pointer)
    }
}

impl ChartVariant for RingChart {
    type Key = RingCache;
    type Record = RingRecord;

    fn name(&self) -> &'static str {
        "ring"
    }

    fn default_sort(&self) -> SortMode {
        SortMode::Desc
    }

    fn layout<S: Surface>(&mut self, model: &ChartModel, _surface: &S) -> ChartResult<Viewport> {
        let config = &self.config;
        let entries = model.data().len();
        let (percent_offset, percent_font) = config.percent_metrics();
        let percent_band = if percent_offset < 0.0 {
            0.0
        } else {
            (percent_offset + percent_font) * 2.0
        };
        let total_diameter = config.diameter + config.piece_offset_amount + percent_band;
        let list_height = config.list_row_height() * entries as f64;
        let width = (config.vote_list_width + config.horizontal_padding * 2.0)
            .max(total_diameter + config.horizontal_padding * 2.0);
        let height = total_diameter + config.vote_list_offset + list_height;

        let viewport = Viewport::from_layout_size(width, height);
        let width = f64::from(viewport.width);
        self.layout = RingLayout {
            width,
            total_diameter,
            list_height,
            center: Point::new(width * 0.5, total_diameter * 0.5),
            entries,
        };
        self.anim = RingAnimation {
            circle_completion: 0.0,
            piece_offsets: vec![0.0; entries],
            list_alpha: (0..entries)
                .map(|index| if model.votes(index) == 0 { LIST_DIMMED } else { 1.0 })
                .collect(),
            center_offset: Point::ORIGIN,
        };
        debug!(
            total_diameter,
            outer = config.outer_radius(),
            inner = config.inner_radius(),
            "ring chart layout"
        );
        Ok(viewport)
    }

    fn build_caches<S: Surface>(
        &mut self,
        caches: &mut BufferCache<RingCache, RingRecord, S>,
        surface: &S,
        model: &ChartModel,
    ) -> ChartResult<()> {
        let config = &self.config;
        let entries = self.layout.entries;
        let total = model.data().total_votes();
        let outer = config.outer_radius();
        let inner = config.inner_radius();
        let completion = self.anim.circle_completion;

        caches.build(
            surface,
            RingCache::Arc,
            entries,
            true,
            |index, earlier, _| {
                if Self::arc_absent(model, index) {
                    return Ok(CacheSlot::Absent);
                }
                let rad_offset: f64 = present_records(earlier)
                    .filter_map(|(_, record)| record.data.arc())
                    .map(|(_, rad_percent, _)| rad_percent)
                    .sum();
                let votes = model.votes(index);
                let (rad_percent, direction) = if votes == total {
                    (TAU, Point::ORIGIN)
                } else {
                    let rad_percent = votes as f64 / total as f64 * TAU;
                    let bisector = rad_offset - FRAC_PI_2 + rad_percent * 0.5;
                    (rad_percent, Point::new(bisector.cos(), bisector.sin()))
                };
                let size = config.diameter + BUFFER_PADDING;
                Ok(CacheSlot::present(
                    Rect::new(
                        HALF_PADDING + index as f64 * size,
                        HALF_PADDING,
                        size,
                        size,
                    ),
                    RingRecord::Arc {
                        rad_offset,
                        rad_percent,
                        direction,
                    },
                ))
            },
            |buffer, slots, _| paint_arcs(buffer, slots, completion, outer, inner, model),
        )?;

        if config.center_info_enabled() {
            let box_size = inner * 2.0 * config.center_info_size_mult;
            let label = model.votes_label().to_uppercase();
            caches.build(
                surface,
                RingCache::CenterInfo,
                entries,
                false,
                |index, _, _| {
                    if Self::arc_absent(model, index) {
                        return Ok(CacheSlot::Absent);
                    }
                    let number = model.votes(index).to_string();
                    let sizes = fit_center_text(surface, &label, &number, box_size);
                    let size = box_size + BUFFER_PADDING;
                    Ok(CacheSlot::present(
                        Rect::new(
                            HALF_PADDING + index as f64 * size,
                            HALF_PADDING,
                            size,
                            size,
                        ),
                        RingRecord::CenterInfo {
                            number,
                            label: label.clone(),
                            label_size: sizes.label_size,
                            number_size: sizes.number_size,
                        },
                    ))
                },
                |buffer, slots, _| -> ChartResult<()> {
                    for (index, record) in present_records(slots) {
                        let RingRecord::CenterInfo {
                            number,
                            label,
                            label_size,
                            number_size,
                        } = &record.data
                        else {
                            continue;
                        };
                        let rect = record.rect;
                        let color = Self::arc_color(model, index);
                        let x = rect.x + rect.w * 0.5;
                        buffer.fill_text(
                            number,
                            Point::new(x, rect.y + (rect.h - label_size) * 0.5),
                            &TextStyle::new(Font::regular(*number_size), color)
                                .centered()
                                .with_shadow(LABEL_SHADOW, 1.0),
                        )?;
                        buffer.fill_text(
                            label,
                            Point::new(x, rect.y + (rect.h + number_size) * 0.5),
                            &TextStyle::new(Font::bold(*label_size), color)
                                .centered()
                                .with_shadow(LABEL_SHADOW, 1.0),
                        )?;
                    }
                    Ok(())
                },
            )?;
        }

        if !config.disable_percent_nums {
            let font = Font::bold(config.percent_num_font_size);
            caches.build(
                surface,
                RingCache::PercentNum,
                entries,
                false,
                |index, earlier, _| {
                    if Self::arc_absent(model, index) {
                        return Ok(CacheSlot::Absent);
                    }
                    let text = format!("{}%", model.data().percent_rounded(index));
                    let width = surface.measure_text(&text, font);
                    let diagonal = width.hypot(config.percent_num_font_size);
                    let offset: f64 = present_records(earlier).map(|(_, r)| r.rect.w).sum();
                    Ok(CacheSlot::present(
                        Rect::new(
                            HALF_PADDING + offset,
                            HALF_PADDING,
                            diagonal + BUFFER_PADDING,
                            diagonal + BUFFER_PADDING,
                        ),
                        RingRecord::Percent { text },
                    ))
                },
                |buffer, slots, _| -> ChartResult<()> {
                    let on_ring = config.percent_num_offset < 0.0
                        && config.percent_num_offset >= inner - outer;
                    for (index, record) in present_records(slots) {
                        let RingRecord::Percent { text } = &record.data else {
                            continue;
                        };
                        let color = if on_ring {
                            Color::WHITE
                        } else {
                            Self::arc_color(model, index)
                        };
                        buffer.fill_text(
                            text,
                            Point::new(
                                record.rect.x + record.rect.w * 0.5,
                                record.rect.y + record.rect.h * 0.5,
                            ),
                            &TextStyle::new(font, color)
                                .centered()
                                .with_shadow(LABEL_SHADOW, 1.0),
                        )?;
                    }
                    Ok(())
                },
            )?;
        }

        let font_size = config.vote_list_font_size;
        let padding = config.vote_list_padding;
        let list_font = Font::regular(font_size);
        let row_height = config.list_row_height() + BUFFER_PADDING;
        caches.build(
            surface,
            RingCache::VoteList,
            entries,
            true,
            |index, _, _| {
                let votes = model.votes(index);
                let percent = if votes == 0 {
                    "0%".to_owned()
                } else {
                    format!("{:.2}%", model.data().share(index) * 100.0)
                };
                let percent_width = surface.measure_text(&percent, list_font);
                let title = contract_text(
                    surface,
                    model.title(index),
                    list_font,
                    config.vote_list_width - (font_size + percent_width + padding * 4.0),
                );
                Ok(CacheSlot::present(
                    Rect::new(
                        HALF_PADDING,
                        HALF_PADDING + index as f64 * row_height,
                        config.vote_list_width + BUFFER_PADDING,
                        row_height,
                    ),
                    RingRecord::ListRow { title, percent },
                ))
            },
            |buffer, slots, _| -> ChartResult<()> {
                let title_style = TextStyle::new(list_font, Color::WHITE)
                    .aligned(TextHAlign::Left, TextBaseline::Middle);
                let percent_style = TextStyle::new(Font::bold(font_size), Color::WHITE)
                    .aligned(TextHAlign::Right, TextBaseline::Middle);
                for (index, record) in present_records(slots) {
                    let RingRecord::ListRow { title, percent } = &record.data else {
                        continue;
                    };
                    let rect = record.rect;
                    let swatch = padding + font_size;
                    let inner_h = rect.h - BUFFER_PADDING;
                    let background = if index % 2 == 1 {
                        Color::ink(8.0 / 15.0)
                    } else {
                        Color::ink(10.0 / 15.0)
                    };
                    buffer.fill_rect(
                        Rect::new(
                            rect.x + HALF_PADDING + swatch,
                            rect.y + HALF_PADDING,
                            rect.w - BUFFER_PADDING - swatch,
                            inner_h,
                        ),
                        background,
                    )?;
                    buffer.fill_rect(
                        Rect::new(rect.x + HALF_PADDING, rect.y + HALF_PADDING, swatch, inner_h),
                        model.color(index),
                    )?;
                    let middle = rect.y + rect.h * 0.5;
                    buffer.fill_text(
                        title,
                        Point::new(rect.x + HALF_PADDING + font_size + padding * 2.0, middle),
                        &title_style,
                    )?;
                    buffer.fill_text(
                        percent,
                        Point::new(
                            rect.x + HALF_PADDING + config.vote_list_width - padding,
                            middle,
                        ),
                        &percent_style,
                    )?;
                }
                Ok(())
            },
        )?;
        // zero-vote rows are drawn but never selectable
        caches.retain_targets(RingCache::VoteList, |index, _| model.votes(index) != 0);

        Ok(())
    }

    fn animate<S: Surface>(
        &mut self,
        frame: FrameInput,
        caches: &mut BufferCache<RingCache, RingRecord, S>,
        model: &ChartModel,
    ) -> ChartResult<bool> {
        let dt = frame.time_delta;

        if self.anim.circle_completion < 1.0 {
            let eased = Easing::proportional(self.config.circle_completion_ease, COMPLETION_EPSILON)
                .step(self.anim.circle_completion, 1.0, dt);
            self.anim.circle_completion = eased.value;
            let completion = eased.value;
            let outer = self.config.outer_radius();
            let inner = self.config.inner_radius();
            caches.redraw(RingCache::Arc, |buffer, slots, _| {
                paint_arcs(buffer, slots, completion, outer, inner, model)
            })?;
            // selection effects start on the frame after the sweep completes
            return Ok(false);
        }

        let easing = Easing::proportional(self.config.piece_offset_smooth, SELECTION_EPSILON);
        let amount = self.config.piece_offset_amount;
        let selected = frame.selection;
        let dim_others = selected.is_some_and(|index| model.votes(index) != 0);
        let arcs = caches.slots(RingCache::Arc)?;
        let mut settled = true;

        for index in 0..self.layout.entries {
            let is_selected = selected == Some(index);
            if arcs.get(index).is_some_and(CacheSlot::is_present) {
                let target = if is_selected { amount } else { 0.0 };
                let eased = easing.step(self.anim.piece_offsets[index], target, dt);
                self.anim.piece_offsets[index] = eased.value;
                settled &= eased.settled;
            }
            if model.votes(index) != 0 {
                let target = if is_selected || !dim_others {
                    1.0
                } else {
                    LIST_DIMMED
                };
                let eased = easing.step(self.anim.list_alpha[index], target, dt);
                self.anim.list_alpha[index] = eased.value;
                settled &= eased.settled;
            }
        }

        let mut min = Point::ORIGIN;
        let mut max = Point::ORIGIN;
        for (index, record) in present_records(arcs) {
            let Some((_, _, direction)) = record.data.arc() else {
                continue;
            };
            let length = self.anim.piece_offsets[index];
            let x = direction.x * length;
            let y = direction.y * length;
            min = Point::new(min.x.min(x), min.y.min(y));
            max = Point::new(max.x.max(x), max.y.max(y));
        }
        self.anim.center_offset = Point::new(-(min.x + max.x) * 0.5, -(min.y + max.y) * 0.5);

        Ok(settled)
    }

    fn composite<S: Surface>(
        &self,
        target: &mut S,
        caches: &BufferCache<RingCache, RingRecord, S>,
        model: &ChartModel,
    ) -> ChartResult<()> {
        let config = &self.config;
        let layout = &self.layout;
        let anim = &self.anim;
        let total = model.data().total_votes();
        let outer = config.outer_radius();
        let amount = config.piece_offset_amount;
        let (percent_offset, _) = config.percent_metrics();
        let relative = Point::new(
            layout.center.x + anim.center_offset.x,
            layout.center.y + anim.center_offset.y,
        );

        let arcs = caches.slots(RingCache::Arc)?;
        // disabled label caches are never built
        let centers = caches.slots(RingCache::CenterInfo).unwrap_or_default();
        let percents = caches.slots(RingCache::PercentNum).unwrap_or_default();
        let rows = caches.slots(RingCache::VoteList)?;

        for index in 0..layout.entries {
            let length = self.piece_offset(index);
            let full_circle = model.votes(index) == total;

            if let Some((arc, (rad_offset, rad_percent, direction))) = arcs
                .get(index)
                .and_then(CacheSlot::record)
                .and_then(|record| record.data.arc().map(|arc| (record, arc)))
            {
                blit_visible(
                    caches,
                    target,
                    RingCache::Arc,
                    index,
                    Point::new(
                        relative.x + direction.x * length - arc.rect.w * 0.5,
                        relative.y + direction.y * length - arc.rect.h * 0.5,
                    ),
                    1.0,
                )?;

                if let Some(info) = centers.get(index).and_then(CacheSlot::record) {
                    if length != 0.0 {
                        let side = if rad_percent < PI { 1.0 } else { -1.0 };
                        blit_visible(
                            caches,
                            target,
                            RingCache::CenterInfo,
                            index,
                            Point::new(
                                layout.center.x + anim.center_offset.x * side - info.rect.w * 0.5,
                                layout.center.y + anim.center_offset.y * side - info.rect.h * 0.5,
                            ),
                            length / amount,
                        )?;
                    }
                }

                if let Some(percent) = percents.get(index).and_then(CacheSlot::record) {
                    let bisector =
                        (rad_offset + rad_percent * 0.5) * anim.circle_completion - FRAC_PI_2;
                    let reach = outer + length + percent_offset;
                    let label_diameter = percent.rect.w - BUFFER_PADDING;
                    let arc_length = rad_percent * (outer + percent_offset);
                    let alpha = if label_diameter >= arc_length {
                        if percent_offset >= 0.0 {
                            1.0 - (amount - length) / amount
                        } else {
                            0.0
                        }
                    } else if full_circle {
                        (amount - length) / amount * anim.circle_completion
                    } else {
                        anim.circle_completion
                    };
                    let anchor = if full_circle {
                        relative
                    } else {
                        Point::new(
                            relative.x + bisector.cos() * reach,
                            relative.y + bisector.sin() * reach,
                        )
                    };
                    blit_visible(
                        caches,
                        target,
                        RingCache::PercentNum,
                        index,
                        Point::new(
                            anchor.x - percent.rect.w * 0.5,
                            anchor.y - percent.rect.h * 0.5,
                        ),
                        alpha,
                    )?;
                }
            }

            if let Some(row) = rows.get(index).and_then(CacheSlot::record) {
                blit_visible(
                    caches,
                    target,
                    RingCache::VoteList,
                    index,
                    Point::new(
                        ((layout.width - row.rect.w) * 0.5).round(),
                        (self.list_top() + (row.rect.h - BUFFER_PADDING) * index as f64
                            - HALF_PADDING)
                            .round(),
                    ),
                    self.list_alpha(index) * anim.circle_completion,
                )?;
            }
        }
        Ok(())
    }

    fn hit_test<S: Surface>(
        &self,
        target: HitTarget<RingCache>,
        pointer: Point,
        caches: &BufferCache<RingCache, RingRecord, S>,
        model: &ChartModel,
    ) -> bool {
        match target.key {
            RingCache::Arc => match caches.record(RingCache::Arc, target.index) {
                Ok(Some(record)) => self.hit_arc(target.index, pointer, &record.data, model),
                _ => false,
            },
            RingCache::VoteList => self.hit_list_row(target.index, pointer),
            RingCache::CenterInfo | RingCache::PercentNum => false,
        }
    }
}

impl<S: Surface> Chart<S, RingChart> {
    /// Ring chart over `data`; entries are sorted by descending votes unless
    /// `options.sort` says otherwise.
    pub fn ring_chart(
        surface: S,
        data: &Value,
        options: ChartOptions,
        config: RingChartConfig,
    ) -> ChartResult<Self> {
        Ok(Self::new(surface, data, options, RingChart::new(config)?))
    }
}

fn paint_arcs<S: Surface>(
    buffer: &mut S,
    slots: &[CacheSlot<RingRecord>],
    completion: f64,
    outer: f64,
    inner: f64,
    model: &ChartModel,
) -> ChartResult<()> {
    for (index, record) in present_records(slots) {
        let Some((rad_offset, rad_percent, _)) = record.data.arc() else {
            continue;
        };
        let rect = record.rect;
        buffer.fill_ring_sector(
            RingSector {
                center_x: rect.x + HALF_PADDING + outer,
                center_y: rect.y + HALF_PADDING + outer,
                inner_radius: inner,
                outer_radius: outer,
                start_angle: rad_offset * completion - FRAC_PI_2 - ARC_OVERLAP,
                end_angle: (rad_offset + rad_percent) * completion - FRAC_PI_2 + ARC_OVERLAP,
            },
            RingChart::arc_color(model, index),
        )?;
    }
    Ok(())
}

fn default_diameter() -> f64 {
    160.0
}

fn default_thickness() -> f64 {
    32.0
}

fn default_circle_completion_ease() -> f64 {
    10.0
}

fn default_piece_offset_amount() -> f64 {
    25.0
}

fn default_piece_offset_smooth() -> f64 {
    4.0
}

fn default_percent_num_font_size() -> f64 {
    16.0
}

fn default_percent_num_offset() -> f64 {
    20.0
}

fn default_center_info_size_mult() -> f64 {
    0.6
}

fn default_vote_list_width() -> f64 {
    200.0
}

fn default_vote_list_padding() -> f64 {
    8.0
}

fn default_vote_list_font_size() -> f64 {
    12.0
}

fn default_vote_list_offset() -> f64 {
    20.0
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{RingChart, RingChartConfig};

    #[test]
    fn thickness_is_clamped_into_range() {
        let thin = RingChart::new(RingChartConfig::default().with_thickness(2.0)).expect("thin");
        assert_eq!(thin.config().thickness, 10.0);
        let solid = RingChart::new(RingChartConfig::default().with_thickness(250.0)).expect("solid");
        assert_eq!(solid.config().thickness, 100.0);
        assert_eq!(solid.inner_radius(), 0.0);
        assert!(!solid.config().center_info_enabled());
    }

    #[test]
    fn radii_follow_diameter_and_thickness() {
        let chart = RingChart::new(RingChartConfig::default()).expect("default");
        assert_relative_eq!(chart.outer_radius(), 80.0);
        assert_relative_eq!(chart.inner_radius(), 54.4, epsilon = 1e-9);
    }

    #[test]
    fn rejects_non_positive_diameter() {
        assert!(RingChart::new(RingChartConfig::default().with_diameter(0.0)).is_err());
        assert!(RingChart::new(RingChartConfig::default().with_thickness(f64::NAN)).is_err());
    }

    #[test]
    fn config_fields_default_when_missing() {
        let config: RingChartConfig =
            serde_json::from_str(r#"{"diameter": 200, "disable_percent_nums": true}"#)
                .expect("config json");
        assert_eq!(config.diameter, 200.0);
        assert!(config.disable_percent_nums);
        assert_eq!(config.percent_metrics(), (0.0, 0.0));
        assert_eq!(config.vote_list_width, 200.0);
        assert_eq!(config.piece_offset_amount, 25.0);
    }
}
