//! Fixed-capacity light storage.
//!
//! Each kind owns a pre-allocated primary array plus a scratch twin of equal
//! capacity used as the radix sort's alternate buffer. Capacity never changes
//! after initialization, so slices handed to the host stay valid for the
//! session.

use crate::error::{LightError, LightResult};
use crate::lights::light_data::{PointLight, RectLight, SpotLight};

fn alloc_slots<T: Default + Clone>(capacity: usize, what: &'static str) -> LightResult<Box<[T]>> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|_| LightError::AllocationFailed {
            what,
            bytes: capacity * std::mem::size_of::<T>(),
        })?;
    slots.resize(capacity, T::default());
    Ok(slots.into_boxed_slice())
}

/// One kind's storage: primary slots, scratch twin, live count.
#[derive(Debug)]
pub struct LightArray<T> {
    items: Box<[T]>,
    scratch: Box<[T]>,
    count: usize,
}

impl<T: Default + Clone + Copy> LightArray<T> {
    pub fn new(capacity: usize, what: &'static str) -> LightResult<Self> {
        Ok(Self {
            items: alloc_slots(capacity, what)?,
            scratch: alloc_slots(capacity, what)?,
            count: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Directly set the live count for host-driven slot reuse. Out-of-range
    /// values are ignored.
    pub fn set_count(&mut self, count: usize) {
        if count <= self.capacity() {
            self.count = count;
        }
    }

    #[inline]
    pub fn live(&self) -> &[T] {
        &self.items[..self.count]
    }

    #[inline]
    pub fn live_mut(&mut self) -> &mut [T] {
        &mut self.items[..self.count]
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.live().get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.count {
            self.items.get_mut(index)
        } else {
            None
        }
    }

    /// Append a record, returning its index, or `None` at capacity.
    pub fn push(&mut self, item: T) -> Option<usize> {
        if self.count >= self.capacity() {
            return None;
        }
        let index = self.count;
        self.items[index] = item;
        self.count += 1;
        Some(index)
    }

    /// Remove by compacting shift: every later record moves down one slot.
    /// Returns false (no-op) for out-of-range indices.
    pub fn remove_shift(&mut self, index: usize) -> bool {
        if index >= self.count {
            return false;
        }
        self.items.copy_within(index + 1..self.count, index);
        self.count -= 1;
        true
    }

    /// Live slices of the primary and scratch arrays, for the sort's
    /// ping-pong passes.
    pub fn sort_pair(&mut self) -> (&mut [T], &mut [T]) {
        (
            &mut self.items[..self.count],
            &mut self.scratch[..self.count],
        )
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }
}

/// All authoritative light state plus the global bookkeeping flags.
#[derive(Debug)]
pub struct LightStore {
    pub points: LightArray<PointLight>,
    pub spots: LightArray<SpotLight>,
    pub rects: LightArray<RectLight>,
    /// True while any live light carries a non-empty animation flag set.
    pub has_animated: bool,
    /// Set by creation, removal and base-position/radius changes; consumed
    /// by the lazy sort.
    pub ordering_stale: bool,
}

impl LightStore {
    pub fn new(capacity: usize) -> LightResult<Self> {
        Ok(Self {
            points: LightArray::new(capacity, "point lights")?,
            spots: LightArray::new(capacity, "spot lights")?,
            rects: LightArray::new(capacity, "rect lights")?,
            has_animated: false,
            ordering_stale: false,
        })
    }

    /// Drop all lights without touching allocations.
    pub fn reset(&mut self) {
        self.points.clear();
        self.spots.clear();
        self.rects.clear();
        self.has_animated = false;
        self.ordering_stale = false;
    }

    /// Recompute the global animated flag by scanning all three arrays.
    pub fn rescan_animated(&mut self) {
        self.has_animated = self.points.live().iter().any(|l| l.anim.is_animated())
            || self.spots.live().iter().any(|l| l.anim.is_animated())
            || self.rects.live().iter().any(|l| l.anim.is_animated());
    }
}
