//! Elliptical brain mask and its memo cache
//!
//! The interpolator only evaluates cells inside an ellipse inscribed in the
//! grid. The shape depends on nothing but the grid size, so masks are built
//! once per size and shared through a small bounded cache.

use alloc::sync::Arc;
use alloc::vec::Vec;

/// Horizontal radius as a fraction of the grid size
pub const MASK_RADIUS_X: f32 = 0.4;

/// Vertical radius as a fraction of the grid size
pub const MASK_RADIUS_Y: f32 = 0.45;

/// Default number of grid sizes kept by [`MaskCache`]
pub const DEFAULT_MASK_CACHE_CAPACITY: usize = 4;

/// Indicator grid: `true` where the field is evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrainMask {
    size: usize,
    inside: Vec<bool>,
}

impl BrainMask {
    /// Build the ellipse `((i-cx)/rx)² + ((j-cy)/ry)² ≤ 1` with
    /// `cx = cy = N/2`, `rx = 0.4N`, `ry = 0.45N`.
    pub fn elliptical(size: usize) -> Self {
        let n = size as f32;
        let (cx, cy) = (n * 0.5, n * 0.5);
        let (rx, ry) = (n * MASK_RADIUS_X, n * MASK_RADIUS_Y);

        let mut inside = Vec::with_capacity(size * size);
        for j in 0..size {
            for i in 0..size {
                let dx = (i as f32 - cx) / rx;
                let dy = (j as f32 - cy) / ry;
                inside.push(dx * dx + dy * dy <= 1.0);
            }
        }
        Self { size, inside }
    }

    /// Cells per side.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether cell `(i, j)` (column, row) is inside the mask.
    #[inline]
    pub fn contains(&self, i: usize, j: usize) -> bool {
        i < self.size && j < self.size && self.inside[j * self.size + i]
    }

    /// Number of cells inside the mask.
    pub fn inside_count(&self) -> usize {
        self.inside.iter().filter(|&&c| c).count()
    }
}

/// Bounded memo of [`BrainMask`]es keyed by grid size.
///
/// Least-recently-used sizes are evicted once `capacity` is reached.
#[derive(Debug)]
pub struct MaskCache {
    capacity: usize,
    /// Most recently used first
    entries: Vec<(usize, Arc<BrainMask>)>,
    hits: u64,
    misses: u64,
}

impl MaskCache {
    /// Create a cache holding at most `capacity` masks (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, entries: Vec::with_capacity(capacity), hits: 0, misses: 0 }
    }

    /// Get the mask for a grid size, building it on first use.
    pub fn get(&mut self, size: usize) -> Arc<BrainMask> {
        if let Some(pos) = self.entries.iter().position(|(s, _)| *s == size) {
            self.hits += 1;
            let entry = self.entries.remove(pos);
            let mask = Arc::clone(&entry.1);
            self.entries.insert(0, entry);
            return mask;
        }

        self.misses += 1;
        let mask = Arc::new(BrainMask::elliptical(size));
        if self.entries.len() == self.capacity {
            self.entries.pop();
        }
        self.entries.insert(0, (size, Arc::clone(&mask)));
        mask
    }

    /// Number of masks currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of masks held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lookups served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that built a new mask.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl Default for MaskCache {
    fn default() -> Self {
        Self::new(DEFAULT_MASK_CACHE_CAPACITY)
    }
}
