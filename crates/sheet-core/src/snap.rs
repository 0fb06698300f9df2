#![forbid(unsafe_code)]

//! Ordered snap points and the release-time snap scans.
//!
//! # Invariants
//!
//! 1. A [`SnapSet`] is never empty.
//! 2. Sizes are sorted ascending by resolved height at construction time.
//!    The sort is stable, so sizes that resolve to the same height keep
//!    their input order.
//! 3. Scans only ever return a member of the set.

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::size::{SheetSize, ViewportMetrics, resolve};

/// Valid resting heights for a sheet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SnapSet {
    sizes: Vec<SheetSize>,
}

impl SnapSet {
    /// Build a set from caller sizes, or `None` if `sizes` is empty.
    ///
    /// Negative fixed sizes are clamped to 0 before sorting.
    #[must_use]
    pub fn new(sizes: &[SheetSize], metrics: ViewportMetrics) -> Option<Self> {
        if sizes.is_empty() {
            return None;
        }
        let mut sizes: Vec<SheetSize> = sizes.iter().map(|s| s.normalized()).collect();
        sizes.sort_by(|a, b| {
            resolve(*a, metrics)
                .partial_cmp(&resolve(*b, metrics))
                .unwrap_or(Ordering::Equal)
        });
        Some(Self { sizes })
    }

    /// Smallest snap size.
    #[must_use]
    pub fn first(&self) -> SheetSize {
        self.sizes[0]
    }

    /// Largest snap size.
    #[must_use]
    pub fn last(&self) -> SheetSize {
        self.sizes[self.sizes.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Always false; kept for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = SheetSize> + '_ {
        self.sizes.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[SheetSize] {
        &self.sizes
    }

    #[must_use]
    pub fn contains(&self, size: SheetSize) -> bool {
        self.sizes.contains(&size)
    }

    /// Resolved height of the largest snap size.
    #[must_use]
    pub fn tallest_height(&self, metrics: ViewportMetrics) -> f64 {
        resolve(self.last(), metrics)
    }

    /// Snap target after a release while moving up.
    ///
    /// Walks largest to smallest, adopting each size whose height is still
    /// above `final_height`, and stops at the first size at or below it.
    #[must_use]
    pub fn scan_upward(&self, final_height: f64, metrics: ViewportMetrics) -> SheetSize {
        let mut candidate = self.last();
        for size in self.iter().rev() {
            if final_height < resolve(size, metrics) {
                candidate = size;
            } else {
                break;
            }
        }
        candidate
    }

    /// Snap target after a release while moving down or stationary.
    ///
    /// Walks smallest to largest, adopting each size whose height is still
    /// below `final_height`, and stops at the first size at or above it.
    #[must_use]
    pub fn scan_downward(&self, final_height: f64, metrics: ViewportMetrics) -> SheetSize {
        let mut candidate = self.first();
        for size in self.iter() {
            if final_height > resolve(size, metrics) {
                candidate = size;
            } else {
                break;
            }
        }
        candidate
    }
}
