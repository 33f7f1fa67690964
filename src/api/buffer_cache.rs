use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::{Point, Rect, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{CacheKey, HitTestRegistry};
use crate::render::Surface;

/// Padding around every record, half of it added to the buffer extent.
pub const BUFFER_PADDING: f64 = 4.0;

/// Geometry of one cached item plus the variant payload needed to paint it.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRecord<R> {
    /// Region of the buffer owned by this item.
    pub rect: Rect,
    pub data: R,
}

impl<R> CacheRecord<R> {
    #[must_use]
    pub const fn new(rect: Rect, data: R) -> Self {
        Self { rect, data }
    }
}

/// One slot of a cache. Absent slots are never painted, cleared or hit.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheSlot<R> {
    Present(CacheRecord<R>),
    Absent,
}

impl<R> CacheSlot<R> {
    #[must_use]
    pub fn present(rect: Rect, data: R) -> Self {
        Self::Present(CacheRecord::new(rect, data))
    }

    #[must_use]
    pub fn record(&self) -> Option<&CacheRecord<R>> {
        match self {
            Self::Present(record) => Some(record),
            Self::Absent => None,
        }
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

/// Present records of a slot list with their indices.
pub fn present_records<R>(slots: &[CacheSlot<R>]) -> impl Iterator<Item = (usize, &CacheRecord<R>)> {
    slots
        .iter()
        .enumerate()
        .filter_map(|(index, slot)| slot.record().map(|record| (index, record)))
}

/// Read access to caches that are already final.
#[derive(Debug)]
pub struct CacheRecords<'a, K, R> {
    records: &'a IndexMap<K, Vec<CacheSlot<R>>>,
}

impl<K: CacheKey, R> Clone for CacheRecords<'_, K, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: CacheKey, R> Copy for CacheRecords<'_, K, R> {}

impl<'a, K: CacheKey, R> CacheRecords<'a, K, R> {
    pub fn slots(self, key: K) -> ChartResult<&'a [CacheSlot<R>]> {
        self.records
            .get(&key)
            .map(Vec::as_slice)
            .ok_or_else(|| ChartError::CacheNotBuilt(format!("{key:?}")))
    }

    pub fn record(self, key: K, index: usize) -> ChartResult<Option<&'a CacheRecord<R>>> {
        Ok(self.slots(key)?.get(index).and_then(CacheSlot::record))
    }

    #[must_use]
    pub fn is_built(self, key: K) -> bool {
        self.records.contains_key(&key)
    }
}

/// Counters of cache activity, mostly for tests and tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferCacheStats {
    pub builds: u64,
    pub redraws: u64,
}

/// Per-key geometry records and the offscreen buffer they were painted into.
///
/// Records and buffers live in separate maps so geometry and paint callbacks
/// can read every other cache while one key is being built or repainted.
#[derive(Debug)]
pub struct BufferCache<K, R, S> {
    records: IndexMap<K, Vec<CacheSlot<R>>>,
    buffers: IndexMap<K, S>,
    registry: HitTestRegistry<K>,
    stats: BufferCacheStats,
}

impl<K, R, S> Default for BufferCache<K, R, S> {
    fn default() -> Self {
        Self {
            records: IndexMap::new(),
            buffers: IndexMap::new(),
            registry: HitTestRegistry::default(),
            stats: BufferCacheStats::default(),
        }
    }
}

impl<K: CacheKey, R, S: Surface> BufferCache<K, R, S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes `count` slots for `key`, allocates its buffer and paints it once.
    ///
    /// `geometry(index, earlier_slots, finished_caches)` runs for every index
    /// before `paint(buffer, slots, finished_caches)` runs exactly once. With
    /// `hit_testable`, each present slot is registered for hit testing.
    /// Building an existing key replaces its records, buffer and targets; the
    /// new targets take the scan position the old ones had.
    pub fn build<G, P>(
        &mut self,
        surface: &S,
        key: K,
        count: usize,
        hit_testable: bool,
        mut geometry: G,
        paint: P,
    ) -> ChartResult<()>
    where
        G: FnMut(usize, &[CacheSlot<R>], CacheRecords<'_, K, R>) -> ChartResult<CacheSlot<R>>,
        P: FnOnce(&mut S, &[CacheSlot<R>], CacheRecords<'_, K, R>) -> ChartResult<()>,
    {
        let mut registry_position = None;
        if self.records.shift_remove(&key).is_some() {
            self.buffers.shift_remove(&key);
            registry_position = self.registry.forget(key);
            debug!(?key, "rebuilding cache");
        }

        let finished = CacheRecords {
            records: &self.records,
        };
        let mut slots = Vec::with_capacity(count);
        let mut targets = Vec::new();
        let mut extent_w = 0.0_f64;
        let mut extent_h = 0.0_f64;
        for index in 0..count {
            let slot = geometry(index, &slots, finished)?;
            if let CacheSlot::Present(record) = &slot {
                if !record.rect.is_finite() {
                    return Err(ChartError::InvalidData(format!(
                        "cache {key:?} item {index} has non-finite geometry"
                    )));
                }
                extent_w = extent_w.max(record.rect.right());
                extent_h = extent_h.max(record.rect.bottom());
                if hit_testable {
                    targets.push(index);
                }
            }
            slots.push(slot);
        }

        let viewport = Viewport::from_layout_size(
            extent_w + BUFFER_PADDING * 0.5,
            extent_h + BUFFER_PADDING * 0.5,
        );
        let mut buffer = surface.create_offscreen(viewport)?;
        paint(&mut buffer, &slots, finished)?;
        self.registry.register_at(registry_position, key, targets);

        trace!(
            ?key,
            slots = slots.len(),
            width = viewport.width,
            height = viewport.height,
            "cache built"
        );
        self.records.insert(key, slots);
        self.buffers.insert(key, buffer);
        self.stats.builds += 1;
        Ok(())
    }

    /// Clears every present record's rect in the buffer of `key`, then
    /// repaints it. Pixels outside record rects are left untouched.
    pub fn redraw<P>(&mut self, key: K, paint: P) -> ChartResult<()>
    where
        P: FnOnce(&mut S, &[CacheSlot<R>], CacheRecords<'_, K, R>) -> ChartResult<()>,
    {
        let slots = self
            .records
            .get(&key)
            .ok_or_else(|| ChartError::CacheNotBuilt(format!("{key:?}")))?;
        let buffer = self
            .buffers
            .get_mut(&key)
            .ok_or_else(|| ChartError::CacheNotBuilt(format!("{key:?}")))?;

        for (_, record) in present_records(slots) {
            buffer.clear_rect(record.rect)?;
        }
        paint(
            buffer,
            slots,
            CacheRecords {
                records: &self.records,
            },
        )?;
        self.stats.redraws += 1;
        Ok(())
    }

    /// Withdraws the hit targets of `key` whose record fails `keep`.
    pub fn retain_targets(&mut self, key: K, mut keep: impl FnMut(usize, &R) -> bool) {
        let Some(slots) = self.records.get(&key) else {
            return;
        };
        self.registry.retain(|target| {
            target.key != key
                || slots
                    .get(target.index)
                    .and_then(CacheSlot::record)
                    .is_some_and(|record| keep(target.index, &record.data))
        });
    }

    /// Composites item `index` of `key` onto `target` with its top-left at
    /// `dest`. Absent slots are skipped.
    pub fn blit(
        &self,
        target: &mut S,
        key: K,
        index: usize,
        dest: Point,
        alpha: f64,
    ) -> ChartResult<()> {
        let Some(record) = self.view().record(key, index)? else {
            return Ok(());
        };
        let rect = record.rect;
        let buffer = self
            .buffers
            .get(&key)
            .ok_or_else(|| ChartError::CacheNotBuilt(format!("{key:?}")))?;
        target.draw_surface(buffer, rect, dest, alpha)
    }

    #[must_use]
    pub fn view(&self) -> CacheRecords<'_, K, R> {
        CacheRecords {
            records: &self.records,
        }
    }

    pub fn slots(&self, key: K) -> ChartResult<&[CacheSlot<R>]> {
        self.view().slots(key)
    }

    pub fn record(&self, key: K, index: usize) -> ChartResult<Option<&CacheRecord<R>>> {
        self.view().record(key, index)
    }

    pub fn buffer(&self, key: K) -> ChartResult<&S> {
        self.buffers
            .get(&key)
            .ok_or_else(|| ChartError::CacheNotBuilt(format!("{key:?}")))
    }

    #[must_use]
    pub fn is_built(&self, key: K) -> bool {
        self.records.contains_key(&key)
    }

    /// Built keys in build order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.records.keys().copied()
    }

    #[must_use]
    pub fn registry(&self) -> &HitTestRegistry<K> {
        &self.registry
    }

    #[must_use]
    pub fn stats(&self) -> BufferCacheStats {
        self.stats
    }
}
