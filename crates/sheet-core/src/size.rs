#![forbid(unsafe_code)]

//! Requested sheet heights and the resolver that turns them into device units.
//!
//! A [`SheetSize`] is a closed set of height requests. [`resolve`] maps one of
//! them onto concrete [`ViewportMetrics`] supplied by the host.
//!
//! # Invariants
//!
//! 1. `resolve` is pure and total: same inputs, same output, never negative.
//! 2. `Fixed` values produced by [`SheetSize::fixed`] are never negative.
//!
//! # Failure Modes
//!
//! - A raw `SheetSize::Fixed(v)` with `v < 0` is a caller error. The engine
//!   normalizes it on configuration; the resolver itself only clamps its
//!   final result at zero.
//! - A viewport shorter than the top inset resolves `FullScreen` to 0.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Height reserved above the half-screen midpoint for the grab handle.
pub const PULL_BAR_ALLOWANCE: f64 = 24.0;

/// Smallest top inset honoured for full-screen sheets (status bar allowance).
pub const MIN_TOP_INSET: f64 = 20.0;

/// A requested sheet height.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SheetSize {
    /// An absolute height in device units.
    Fixed(f64),
    /// Half of the available height plus the grab-handle allowance.
    HalfScreen,
    /// All available height below the top inset.
    FullScreen,
}

impl SheetSize {
    /// Fixed height, clamped to be non-negative. NaN becomes 0.
    #[must_use]
    pub fn fixed(value: f64) -> Self {
        Self::Fixed(clamp_non_negative(value))
    }

    /// Same size with any negative fixed value clamped to 0.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Fixed(v) => Self::fixed(v),
            other => other,
        }
    }

    /// Resolve against the given viewport. Shorthand for [`resolve`].
    #[inline]
    #[must_use]
    pub fn resolve(self, metrics: ViewportMetrics) -> f64 {
        resolve(self, metrics)
    }
}

/// Viewport measurements the host supplies for every resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ViewportMetrics {
    /// Total height the sheet may occupy.
    pub available_height: f64,
    /// Safe-area / status-bar inset at the top of the screen.
    pub top_inset: f64,
}

impl ViewportMetrics {
    #[must_use]
    pub const fn new(available_height: f64, top_inset: f64) -> Self {
        Self {
            available_height,
            top_inset,
        }
    }

    /// Top inset with the status-bar floor applied.
    #[inline]
    #[must_use]
    pub fn effective_top_inset(&self) -> f64 {
        self.top_inset.max(MIN_TOP_INSET)
    }
}

/// Map a size request onto concrete metrics.
#[must_use]
pub fn resolve(size: SheetSize, metrics: ViewportMetrics) -> f64 {
    let height = match size {
        SheetSize::Fixed(v) => v,
        SheetSize::HalfScreen => metrics.available_height / 2.0 + PULL_BAR_ALLOWANCE,
        SheetSize::FullScreen => metrics.available_height - metrics.effective_top_inset(),
    };
    clamp_non_negative(height)
}

fn clamp_non_negative(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

/// Host-side provider of the current viewport.
///
/// The engine asks for metrics on every resolution and never caches them, so
/// rotation or keyboard changes take effect on the next sample.
pub trait ViewportSource {
    fn metrics(&self) -> ViewportMetrics;
}

impl ViewportSource for ViewportMetrics {
    fn metrics(&self) -> ViewportMetrics {
        *self
    }
}

impl<F> ViewportSource for F
where
    F: Fn() -> ViewportMetrics,
{
    fn metrics(&self) -> ViewportMetrics {
        self()
    }
}
