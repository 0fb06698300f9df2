#![forbid(unsafe_code)]

//! Declarative animation requests and a host-side frame tween.
//!
//! The engine never animates anything itself. It hands the host an
//! [`AnimationRequest`]; the host runs it with whatever primitive it has and
//! reports completion by id. [`FrameTween`] is a reference driver for hosts
//! (and tests) without an animation system of their own.
//!
//! # Invariants
//!
//! 1. [`AnimationId`]s handed out by one engine strictly increase.
//! 2. `Curve::apply` maps [0, 1] onto [0, 1] with `apply(0) == 0` and
//!    `apply(1) == 1`, and is monotonic.
//! 3. A zero-duration tween is complete before its first tick.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifies one outstanding animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AnimationId(u64);

impl AnimationId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Timing curve for a requested animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Curve {
    Linear,
    #[default]
    EaseOut,
    EaseInOut,
}

impl Curve {
    /// Eased progress for linear progress `t` (clamped to [0, 1]).
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// What the host should render: panel height plus downward translation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SheetFrame {
    /// Live height constraint of the panel.
    pub height: f64,
    /// Downward visual offset (rubber band, dismissal, appear).
    pub translation: f64,
}

impl SheetFrame {
    #[must_use]
    pub const fn new(height: f64, translation: f64) -> Self {
        Self {
            height,
            translation,
        }
    }

    /// Frame at `height` with no translation.
    #[must_use]
    pub const fn at_rest(height: f64) -> Self {
        Self::new(height, 0.0)
    }

    #[must_use]
    pub fn lerp(self, to: SheetFrame, t: f64) -> SheetFrame {
        SheetFrame {
            height: self.height + (to.height - self.height) * t,
            translation: self.translation + (to.translation - self.translation) * t,
        }
    }
}

/// Backdrop opacity change riding along with an animation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BackdropFade {
    pub from: f64,
    pub to: f64,
}

/// One animation the host must run and then report back.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnimationRequest {
    pub id: AnimationId,
    pub from: SheetFrame,
    pub to: SheetFrame,
    #[cfg_attr(feature = "serde", serde(with = "duration_secs"))]
    pub duration: Duration,
    pub curve: Curve,
    pub backdrop: Option<BackdropFade>,
}

/// Command for the host's rendering layer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "command", rename_all = "snake_case"))]
pub enum SheetCommand {
    /// Apply the frame immediately, no animation.
    Apply { frame: SheetFrame },
    /// Run the animation, then call `complete_animation(id)`.
    Animate { request: AnimationRequest },
    /// Run the animation, call `complete_animation(id)`, then tear down.
    Dismiss { request: AnimationRequest },
}

impl SheetCommand {
    /// Animation id, if this command starts one.
    #[must_use]
    pub fn animation_id(&self) -> Option<AnimationId> {
        match self {
            Self::Apply { .. } => None,
            Self::Animate { request } | Self::Dismiss { request } => Some(request.id),
        }
    }

    /// Frame the sheet ends up at once the command has run.
    #[must_use]
    pub fn final_frame(&self) -> SheetFrame {
        match self {
            Self::Apply { frame } => *frame,
            Self::Animate { request } | Self::Dismiss { request } => request.to,
        }
    }
}

/// Seconds <-> `Duration` for serialized requests and config.
#[cfg(feature = "serde")]
pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

/// Convert seconds to a `Duration`.
///
/// Negative and NaN input give zero; values past `Duration::MAX` saturate.
#[must_use]
pub fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(if value > 0.0 {
        Duration::MAX
    } else {
        Duration::ZERO
    })
}

// ---------------------------------------------------------------------------
// Host-side driver
// ---------------------------------------------------------------------------

/// A time-driven animation.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);
    /// Whether the animation reached its end.
    fn is_complete(&self) -> bool;
    /// Eased progress in [0.0, 1.0].
    fn value(&self) -> f64;
}

/// Interpolates a [`SheetFrame`] for an [`AnimationRequest`].
#[derive(Debug, Clone)]
pub struct FrameTween {
    request: AnimationRequest,
    elapsed: Duration,
}

impl FrameTween {
    #[must_use]
    pub fn new(request: AnimationRequest) -> Self {
        Self {
            request,
            elapsed: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn id(&self) -> AnimationId {
        self.request.id
    }

    /// Current interpolated frame.
    #[must_use]
    pub fn frame(&self) -> SheetFrame {
        self.request.from.lerp(self.request.to, self.value())
    }

    /// Current backdrop opacity, if this animation fades one.
    #[must_use]
    pub fn backdrop(&self) -> Option<f64> {
        self.request
            .backdrop
            .map(|fade| fade.from + (fade.to - fade.from) * self.value())
    }

    fn linear_progress(&self) -> f64 {
        if self.request.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.request.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}

impl Animation for FrameTween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.request.duration);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.request.duration
    }

    fn value(&self) -> f64 {
        self.request.curve.apply(self.linear_progress())
    }
}
