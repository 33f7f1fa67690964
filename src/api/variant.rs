use std::fmt::Debug;

use crate::core::{Point, SortMode, Viewport};
use crate::error::ChartResult;
use crate::interaction::{CacheKey, HitTarget};
use crate::render::Surface;

use super::{BufferCache, ChartModel};

/// Inputs of one animate step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Elapsed unit frames since the previous frame (1.0 after start or wake).
    pub time_delta: f64,
    pub selection: Option<usize>,
}

/// Capabilities a chart variant provides to the shared engine.
///
/// The engine owns the surface, the caches and the frame loop; a variant
/// owns its configuration, layout and per-item animation state.
pub trait ChartVariant {
    /// Names of the variant's caches.
    type Key: CacheKey;
    /// Per-item payload stored next to each cached rect.
    type Record: Debug;

    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Entry ordering used when the chart options leave it unset.
    fn default_sort(&self) -> SortMode {
        SortMode::None
    }

    /// Computes the layout and returns the pixel size of the visible surface.
    fn layout<S: Surface>(&mut self, model: &ChartModel, surface: &S) -> ChartResult<Viewport>;

    /// Builds every cache, registering hit targets along the way.
    fn build_caches<S: Surface>(
        &mut self,
        caches: &mut BufferCache<Self::Key, Self::Record, S>,
        surface: &S,
        model: &ChartModel,
    ) -> ChartResult<()>;

    /// Advances every trajectory by one frame and repaints changed buffers.
    ///
    /// Returns `true` once every trajectory has settled.
    fn animate<S: Surface>(
        &mut self,
        frame: FrameInput,
        caches: &mut BufferCache<Self::Key, Self::Record, S>,
        model: &ChartModel,
    ) -> ChartResult<bool>;

    /// Draws the current state onto the (already cleared) visible surface.
    fn composite<S: Surface>(
        &self,
        target: &mut S,
        caches: &BufferCache<Self::Key, Self::Record, S>,
        model: &ChartModel,
    ) -> ChartResult<()>;

    /// Whether `pointer` hits `target`.
    fn hit_test<S: Surface>(
        &self,
        target: HitTarget<Self::Key>,
        pointer: Point,
        caches: &BufferCache<Self::Key, Self::Record, S>,
        model: &ChartModel,
    ) -> bool;
}
