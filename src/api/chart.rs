use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::core::{ColorAssignment, DataSet, Point, Viewport};
use crate::error::ChartResult;
use crate::interaction::PointerState;
use crate::render::Surface;

use super::{
    AnimationScheduler, BufferCache, ChartModel, ChartOptions, ChartVariant, Clock, FrameInput,
    FrameRequest, SchedulerState, SystemClock,
};

/// Main facade consumed by host applications.
///
/// `Chart` owns the visible surface, the normalized data, the per-key buffer
/// cache and the frame loop, and delegates layout, painting, animation and
/// hit predicates to its variant. Hosts drive it with [`Chart::start_chart`],
/// [`Chart::on_frame`] and the pointer callbacks, and keep requesting frames
/// while those return [`FrameRequest::Continue`].
pub struct Chart<S, V: ChartVariant, C = SystemClock> {
    surface: S,
    model: ChartModel,
    variant: V,
    caches: BufferCache<V::Key, V::Record, S>,
    pointer: PointerState,
    selection: Option<usize>,
    scheduler: AnimationScheduler<C>,
}

impl<S: Surface, V: ChartVariant> Chart<S, V> {
    /// Normalizes `data` (an object of title to vote count) and assigns colors.
    ///
    /// Malformed entries are skipped with a warning; nothing here fails.
    pub fn new(surface: S, data: &Value, options: ChartOptions, variant: V) -> Self {
        Self::with_clock(surface, data, options, variant, SystemClock::default())
    }
}

impl<S: Surface, V: ChartVariant, C: Clock> Chart<S, V, C> {
    /// Like [`Chart::new`] with an explicit frame clock.
    pub fn with_clock(surface: S, data: &Value, options: ChartOptions, variant: V, clock: C) -> Self {
        let sort = options.sort.unwrap_or_else(|| variant.default_sort());
        let data = DataSet::from_json(data, sort);
        Self::from_data_set(surface, data, &options, variant, clock)
    }

    /// Builds a chart from an already normalized data set; `options.sort` is
    /// not applied again.
    pub fn from_data_set(
        surface: S,
        data: DataSet,
        options: &ChartOptions,
        variant: V,
        clock: C,
    ) -> Self {
        let colors = ColorAssignment::from_palette(&data, options.palette());
        Self {
            surface,
            model: ChartModel::new(data, colors, options.votes_label.as_str()),
            variant,
            caches: BufferCache::new(),
            pointer: PointerState::default(),
            selection: None,
            scheduler: AnimationScheduler::new(clock),
        }
    }

    /// Sizes the visible surface, builds every cache and arms the frame loop.
    ///
    /// The first frame runs on the first [`Chart::on_frame`] call after
    /// `delay_ms`; pointer input is ignored until then.
    pub fn start_chart(&mut self, delay_ms: f64) -> ChartResult<FrameRequest> {
        if self.scheduler.state() != SchedulerState::Idle {
            warn!(
                variant = self.variant.name(),
                state = ?self.scheduler.state(),
                "start_chart called more than once, ignored"
            );
            return Ok(self.scheduler.request());
        }

        let viewport = self.variant.layout(&self.model, &self.surface)?;
        self.surface.resize(viewport)?;
        self.variant
            .build_caches(&mut self.caches, &self.surface, &self.model)?;
        self.scheduler.start(delay_ms);

        debug!(
            variant = self.variant.name(),
            entries = self.model.data().len(),
            total_votes = self.model.data().total_votes(),
            width = viewport.width,
            height = viewport.height,
            "chart started"
        );
        Ok(self.scheduler.request())
    }

    /// Runs one frame when one is due.
    pub fn on_frame(&mut self) -> ChartResult<FrameRequest> {
        match self.scheduler.begin_frame() {
            Some(time_delta) => self.run_frame(time_delta),
            None => Ok(self.scheduler.request()),
        }
    }

    /// Pointer moved to `(x, y)` in surface pixels.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> ChartResult<FrameRequest> {
        if !self.scheduler.accepts_input() {
            trace!(x, y, "pointer input before first frame ignored");
            return Ok(self.scheduler.request());
        }
        self.pointer.on_pointer_move(x, y);
        self.update_selection()
    }

    /// Pointer left the surface. The pointer parks at the origin and the
    /// selection clears without hit testing.
    pub fn pointer_leave(&mut self) -> ChartResult<FrameRequest> {
        if !self.scheduler.accepts_input() {
            return Ok(self.scheduler.request());
        }
        self.pointer.on_pointer_leave();
        self.update_selection()
    }

    /// Ends the frame loop for good.
    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    #[must_use]
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    #[must_use]
    pub fn pointer(&self) -> Point {
        self.pointer.position()
    }

    #[must_use]
    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Frames run since the first one.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.scheduler.frames()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    #[must_use]
    pub fn model(&self) -> &ChartModel {
        &self.model
    }

    #[must_use]
    pub fn data(&self) -> &DataSet {
        self.model.data()
    }

    #[must_use]
    pub fn colors(&self) -> &ColorAssignment {
        self.model.colors()
    }

    #[must_use]
    pub fn variant(&self) -> &V {
        &self.variant
    }

    #[must_use]
    pub fn caches(&self) -> &BufferCache<V::Key, V::Record, S> {
        &self.caches
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }

    fn run_frame(&mut self, time_delta: f64) -> ChartResult<FrameRequest> {
        let frame = FrameInput {
            time_delta,
            selection: self.selection,
        };
        let settled = self.variant.animate(frame, &mut self.caches, &self.model)?;
        self.surface.clear()?;
        self.variant
            .composite(&mut self.surface, &self.caches, &self.model)?;
        Ok(self.scheduler.end_frame(settled))
    }

    fn update_selection(&mut self) -> ChartResult<FrameRequest> {
        let hit = if self.pointer.is_inside() {
            let pointer = self.pointer.position();
            self.caches
                .registry()
                .resolve(|target| {
                    self.variant
                        .hit_test(target, pointer, &self.caches, &self.model)
                })
                .map(|target| target.index)
        } else {
            None
        };
        if hit == self.selection {
            return Ok(self.scheduler.request());
        }

        trace!(previous = ?self.selection, selection = ?hit, "selection changed");
        self.selection = hit;
        match self.scheduler.wake() {
            Some(time_delta) => self.run_frame(time_delta),
            None => Ok(self.scheduler.request()),
        }
    }
}
