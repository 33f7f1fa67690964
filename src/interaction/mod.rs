use std::fmt::Debug;
use std::hash::Hash;

use crate::core::Point;

/// Identifier of one named group of cached visuals.
///
/// Implemented automatically for any small `Copy` key type, typically a
/// per-variant enum.
pub trait CacheKey: Copy + Eq + Hash + Debug {}

impl<T> CacheKey for T where T: Copy + Eq + Hash + Debug {}

/// One registered hit target: item `index` of the cache named `key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitTarget<K> {
    pub key: K,
    pub index: usize,
}

impl<K: CacheKey> HitTarget<K> {
    #[must_use]
    pub const fn new(key: K, index: usize) -> Self {
        Self { key, index }
    }
}

/// Append-only list of hit targets, scanned in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitTestRegistry<K> {
    targets: Vec<HitTarget<K>>,
}

impl<K> Default for HitTestRegistry<K> {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
        }
    }
}

impl<K: CacheKey> HitTestRegistry<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: K, index: usize) {
        self.targets.push(HitTarget::new(key, index));
    }

    /// Drops every target of `key` and returns where the first one stood.
    pub fn forget(&mut self, key: K) -> Option<usize> {
        let position = self.targets.iter().position(|target| target.key == key);
        self.retain(|target| target.key != key);
        position
    }

    /// Registers `indices` of `key` at `position` in scan order, or at the
    /// end when there is no position to restore.
    pub fn register_at(
        &mut self,
        position: Option<usize>,
        key: K,
        indices: impl IntoIterator<Item = usize>,
    ) {
        let at = position.map_or(self.targets.len(), |position| position.min(self.targets.len()));
        self.targets.splice(
            at..at,
            indices.into_iter().map(|index| HitTarget::new(key, index)),
        );
    }

    /// Keeps only the targets accepted by `keep`, preserving their order.
    pub fn retain(&mut self, keep: impl FnMut(&HitTarget<K>) -> bool) {
        self.targets.retain(keep);
    }

    #[must_use]
    pub fn targets(&self) -> &[HitTarget<K>] {
        &self.targets
    }

    #[must_use]
    pub fn contains(&self, key: K, index: usize) -> bool {
        self.targets.contains(&HitTarget::new(key, index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// First target accepted by `hit`. Earlier registrations win on overlap.
    pub fn resolve(&self, mut hit: impl FnMut(HitTarget<K>) -> bool) -> Option<HitTarget<K>> {
        self.targets.iter().copied().find(|target| hit(*target))
    }
}

/// Last pointer position reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    position: Point,
    inside: bool,
}

impl PointerState {
    #[must_use]
    pub fn position(self) -> Point {
        self.position
    }

    #[must_use]
    pub fn is_inside(self) -> bool {
        self.inside
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.position = Point::new(x, y);
        self.inside = true;
    }

    /// Leaving the surface parks the pointer at the origin.
    pub fn on_pointer_leave(&mut self) {
        self.position = Point::ORIGIN;
        self.inside = false;
    }
}
