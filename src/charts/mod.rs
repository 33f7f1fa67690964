//! Chart variants built on the shared buffer-cache engine.

pub mod center_text;
pub mod intervals;
pub mod ring;
pub mod row;

pub use ring::{RingCache, RingChart, RingChartConfig, RingRecord};
pub use row::{RowCache, RowChart, RowChartConfig, RowRecord};

use crate::api::{BUFFER_PADDING, BufferCache};
use crate::core::Point;
use crate::error::{ChartError, ChartResult};
use crate::interaction::CacheKey;
use crate::render::{Color, Surface};

/// Offset from a record's rect to the area actually painted.
pub(crate) const HALF_PADDING: f64 = BUFFER_PADDING * 0.5;

/// Borders, dash lines and axis numbers.
pub(crate) const FRAME_INK: Color = Color::ink(7.0 / 15.0);

/// Drop shadow under labels drawn over colored fills.
pub(crate) const LABEL_SHADOW: Color = Color::ink(8.0 / 15.0);

/// Blits one cached item unless it is fully transparent.
pub(crate) fn blit_visible<K: CacheKey, R, S: Surface>(
    caches: &BufferCache<K, R, S>,
    target: &mut S,
    key: K,
    index: usize,
    dest: Point,
    alpha: f64,
) -> ChartResult<()> {
    if alpha.is_nan() || alpha <= 0.0 {
        return Ok(());
    }
    caches.blit(target, key, index, dest, alpha.min(1.0))
}

pub(crate) fn check_positive(name: &str, value: f64) -> ChartResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ChartError::InvalidData(format!(
            "{name} must be finite and > 0"
        )));
    }
    Ok(())
}
