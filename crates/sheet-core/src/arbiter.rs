#![forbid(unsafe_code)]

//! Arbitration between sheet dragging and a nested scrollable region.
//!
//! Asked once per candidate drag, before the drag engine creates any state.
//!
//! # Decision order
//!
//! 1. No scroll region registered, or its offset is unavailable: begin.
//! 2. Vertical-dominant gesture while the child is scrolled away from its
//!    top: reject, the child owns the gesture.
//! 3. Upward gesture: begin only if the sheet has room to grow, i.e. the
//!    tallest snap height exceeds the current height and the current height
//!    is still below full screen.
//! 4. Downward (or stationary) gesture: begin.
//!
//! Rule 2 short-circuits before the directional rules.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use crate::logging::trace;
#[cfg(not(feature = "tracing"))]
use crate::trace;

use crate::size::{SheetSize, ViewportMetrics, resolve};
use crate::snap::SnapSet;

/// Nested scrollable content attached to the sheet.
pub trait ScrollOffsetProvider {
    /// Current vertical content offset, or `None` if not measurable right now.
    fn scroll_offset(&self) -> Option<f64>;
}

impl ScrollOffsetProvider for f64 {
    fn scroll_offset(&self) -> Option<f64> {
        Some(*self)
    }
}

impl<F> ScrollOffsetProvider for F
where
    F: Fn() -> Option<f64>,
{
    fn scroll_offset(&self) -> Option<f64> {
        self()
    }
}

/// 2D velocity in device units per second. Positive `y` points down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

impl Velocity {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `|y| > |x|`.
    #[inline]
    #[must_use]
    pub fn is_vertical_dominant(&self) -> bool {
        self.y.abs() > self.x.abs()
    }
}

/// Why a drag was allowed to begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BeginReason {
    NoScrollRegion,
    OffsetUnavailable,
    VelocityUnavailable,
    SheetCanGrow,
    DownwardDrag,
}

/// Why a drag was handed to the nested scroll region instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RejectReason {
    ChildScrolledAwayFromTop,
    NoRoomToGrow,
}

/// Outcome of one arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "decision", content = "reason", rename_all = "snake_case"))]
pub enum ArbitrationDecision {
    Begin(BeginReason),
    Reject(RejectReason),
}

impl ArbitrationDecision {
    #[must_use]
    pub const fn should_begin(self) -> bool {
        matches!(self, Self::Begin(_))
    }
}

/// Everything one arbitration looks at.
#[derive(Debug, Clone, Copy)]
pub struct ArbitrationInput<'a> {
    /// Initial velocity of the candidate gesture, if the recognizer has one.
    pub velocity: Option<Velocity>,
    /// Offset of the registered scroll region; `None` when no region exists.
    pub scroll_offset: Option<Option<f64>>,
    pub snaps: &'a SnapSet,
    pub current_size: SheetSize,
    pub metrics: ViewportMetrics,
}

/// Stateless decision rules; see the module docs for the ordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollArbiter;

impl ScrollArbiter {
    #[must_use]
    pub fn decide(input: &ArbitrationInput<'_>) -> ArbitrationDecision {
        let decision = Self::decide_inner(input);
        trace!(
            target: "sheet.arbiter",
            ?decision,
            velocity = ?input.velocity,
            scroll_offset = ?input.scroll_offset,
            "drag arbitration"
        );
        decision
    }

    fn decide_inner(input: &ArbitrationInput<'_>) -> ArbitrationDecision {
        let offset = match input.scroll_offset {
            None => return ArbitrationDecision::Begin(BeginReason::NoScrollRegion),
            Some(None) => return ArbitrationDecision::Begin(BeginReason::OffsetUnavailable),
            Some(Some(offset)) => offset,
        };
        let Some(velocity) = input.velocity else {
            return ArbitrationDecision::Begin(BeginReason::VelocityUnavailable);
        };

        if velocity.is_vertical_dominant() && offset != 0.0 {
            return ArbitrationDecision::Reject(RejectReason::ChildScrolledAwayFromTop);
        }

        if velocity.y < 0.0 {
            let current = resolve(input.current_size, input.metrics);
            let full = resolve(SheetSize::FullScreen, input.metrics);
            if input.snaps.tallest_height(input.metrics) > current && current < full {
                ArbitrationDecision::Begin(BeginReason::SheetCanGrow)
            } else {
                ArbitrationDecision::Reject(RejectReason::NoRoomToGrow)
            }
        } else {
            ArbitrationDecision::Begin(BeginReason::DownwardDrag)
        }
    }

    /// Boolean form of [`decide`](Self::decide).
    #[must_use]
    pub fn should_begin(input: &ArbitrationInput<'_>) -> bool {
        Self::decide(input).should_begin()
    }
}
