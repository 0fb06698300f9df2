#![forbid(unsafe_code)]

//! Drag engine: turns a stream of drag samples into sheet heights and
//! release decisions.
//!
//! [`DragEngine`] owns the snap set, the size the sheet rests at, and the
//! live measured height. The host feeds it [`DragSample`]s and executes the
//! [`SheetCommand`]s it hands back.
//!
//! # State Machine
//!
//! ```text
//! Idle -> Dragging -> Animating -> Idle
//!              \----> Dismissing -> Dismissed
//! ```
//!
//! - **Begin** snapshots the live height and enters `Dragging`.
//! - **Change** maps the drag delta to a height inside
//!   `[min_height, max_height]`; dragging below `min_height` becomes a
//!   downward translation instead (rubber band).
//! - **End** projects the release point with the vertical velocity and either
//!   dismisses or snaps to a configured size.
//! - **Cancel / Fail** animate back to the resting size without re-snapping.
//!
//! # Invariants
//!
//! 1. While dragging, the emitted height is within `[min_height, max_height]`.
//! 2. The emitted translation is non-zero iff the raw height is below
//!    `min_height`.
//! 3. A release either dismisses or targets the resolved height of a member
//!    of the snap set, never an arbitrary height.
//! 4. An animation completion only takes effect if its id is the latest one
//!    handed out; a newer drag or resize supersedes it.
//! 5. After dismissal every sample is a no-op.
//!
//! # Failure Modes
//!
//! - Samples arriving in the wrong phase (Change without Begin, a second
//!   Begin mid-drag) are reported as `Noop` transitions and change nothing.
//! - A stalled drag simply keeps its last frame until input resumes or the
//!   host calls [`DragEngine::force_cancel`].

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use crate::logging::{debug, warn};
#[cfg(not(feature = "tracing"))]
use crate::{debug, warn};

use crate::animation::{AnimationId, AnimationRequest, Curve, SheetCommand, SheetFrame};
use crate::arbiter::{ArbitrationDecision, ArbitrationInput, ScrollArbiter, ScrollOffsetProvider, Velocity};
use crate::config::{DragTuning, SheetConfig};
use crate::error::{Result, SheetError};
use crate::presentation::{Presentation, PresentationPhase, background_dismiss_request};
use crate::size::{SheetSize, ViewportMetrics, ViewportSource, resolve};
use crate::snap::SnapSet;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Recognizer phase of one drag sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DragPhase {
    Begin,
    Change,
    End,
    Cancel,
    Fail,
}

/// Pointer translation relative to where the drag started. Positive `y` is
/// downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DragDelta {
    pub x: f64,
    pub y: f64,
}

impl DragDelta {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One input event from the host's pan recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DragSample {
    pub phase: DragPhase,
    #[cfg_attr(feature = "serde", serde(default))]
    pub delta: DragDelta,
    #[cfg_attr(feature = "serde", serde(default))]
    pub velocity: Velocity,
    /// Panel height measured by the host's layout, if it has one handy.
    /// On Begin this refreshes the live height before it is snapshotted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub measured_height: Option<f64>,
}

impl DragSample {
    #[must_use]
    pub const fn new(phase: DragPhase, delta: DragDelta, velocity: Velocity) -> Self {
        Self {
            phase,
            delta,
            velocity,
            measured_height: None,
        }
    }

    #[must_use]
    pub const fn begin() -> Self {
        Self::new(DragPhase::Begin, DragDelta::new(0.0, 0.0), Velocity::new(0.0, 0.0))
    }

    #[must_use]
    pub const fn change(dy: f64) -> Self {
        Self::new(DragPhase::Change, DragDelta::new(0.0, dy), Velocity::new(0.0, 0.0))
    }

    #[must_use]
    pub const fn end(dy: f64, velocity_y: f64) -> Self {
        Self::new(DragPhase::End, DragDelta::new(0.0, dy), Velocity::new(0.0, velocity_y))
    }

    #[must_use]
    pub const fn cancel(dy: f64) -> Self {
        Self::new(DragPhase::Cancel, DragDelta::new(0.0, dy), Velocity::new(0.0, 0.0))
    }

    #[must_use]
    pub const fn fail(dy: f64) -> Self {
        Self::new(DragPhase::Fail, DragDelta::new(0.0, dy), Velocity::new(0.0, 0.0))
    }

    #[must_use]
    pub const fn with_measured_height(mut self, height: f64) -> Self {
        self.measured_height = Some(height);
        self
    }
}

// ---------------------------------------------------------------------------
// Pure drag math
// ---------------------------------------------------------------------------

/// Height range a drag may move the panel within.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DragBounds {
    pub min_height: f64,
    pub max_height: f64,
}

impl DragBounds {
    /// Bounds for a drag that started at `start_height`: the snap range,
    /// widened to include the start so an off-snap sheet never jumps.
    #[must_use]
    pub fn new(start_height: f64, snaps: &SnapSet, metrics: ViewportMetrics) -> Self {
        Self {
            min_height: start_height.min(resolve(snaps.first(), metrics)),
            max_height: start_height.max(resolve(snaps.last(), metrics)),
        }
    }
}

/// Result of mapping one drag position to a panel frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tracking {
    /// Unclamped height the drag asks for (never negative).
    pub raw_height: f64,
    /// Clamped height plus rubber-band translation.
    pub frame: SheetFrame,
}

impl Tracking {
    /// Rubber-band translation (0 when not overscrolling).
    #[inline]
    #[must_use]
    pub fn overscroll(&self) -> f64 {
        self.frame.translation
    }
}

/// Map a vertical drag position to a panel frame.
#[must_use]
pub fn track_height(start_height: f64, first_point_y: f64, point_y: f64, bounds: DragBounds) -> Tracking {
    let raw_height = (start_height + first_point_y - point_y).max(0.0);
    let frame = if raw_height < bounds.min_height {
        SheetFrame::new(bounds.min_height, bounds.min_height - raw_height)
    } else if raw_height > bounds.max_height {
        SheetFrame::at_rest(bounds.max_height)
    } else {
        SheetFrame::at_rest(raw_height)
    };
    Tracking { raw_height, frame }
}

/// Velocity-weighted projection of a release.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReleaseProjection {
    /// Scaled vertical release velocity (positive = downward).
    pub velocity_factor: f64,
    /// Height the sheet is projected to come to rest at.
    pub final_height: f64,
    /// Animation duration for whatever happens next.
    #[cfg_attr(feature = "serde", serde(with = "crate::animation::duration_secs"))]
    pub duration: std::time::Duration,
    /// Whether the projection falls in the dismissal zone.
    pub dismiss: bool,
}

/// Project where a release at `tracking` with `velocity_y` comes to rest.
#[must_use]
pub fn project_release(
    tracking: &Tracking,
    velocity_y: f64,
    bounds: DragBounds,
    tuning: &DragTuning,
) -> ReleaseProjection {
    let velocity_factor = tuning.velocity_scale * velocity_y;
    let mut final_height = tracking.frame.height - tracking.overscroll() - velocity_factor;
    if velocity_factor > tuning.flick_dismiss_threshold {
        final_height = -1.0;
    }
    ReleaseProjection {
        velocity_factor,
        final_height,
        duration: tuning.release_duration(velocity_factor),
        dismiss: final_height <= bounds.min_height * tuning.dismiss_fraction,
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Lifecycle phase of the sheet panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SheetPhase {
    /// At rest, no drag or animation outstanding.
    #[default]
    Idle,
    /// Following a drag.
    Dragging,
    /// Running a snap, restore, resize or appear animation.
    Animating,
    /// Running the exit animation.
    Dismissing,
    /// Gone; every further sample is ignored.
    Dismissed,
}

/// Why a sample changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DragNoopReason {
    IdleWithoutActiveDrag,
    ActiveDragAlreadyInProgress,
    SheetDismissed,
}

/// What one sample did.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "effect", rename_all = "snake_case"))]
pub enum DragEffect {
    Began {
        start_height: f64,
        frame: SheetFrame,
    },
    Moved {
        frame: SheetFrame,
    },
    Snapped {
        size: SheetSize,
        projection: ReleaseProjection,
        command: SheetCommand,
    },
    Dismissed {
        projection: ReleaseProjection,
        command: SheetCommand,
    },
    Restored {
        command: SheetCommand,
    },
    Noop {
        reason: DragNoopReason,
    },
}

impl DragEffect {
    /// Frame to render right now, if the sample produced one.
    #[must_use]
    pub fn frame(&self) -> Option<SheetFrame> {
        match self {
            Self::Began { frame, .. } | Self::Moved { frame } => Some(*frame),
            Self::Snapped { command, .. }
            | Self::Dismissed { command, .. }
            | Self::Restored { command } => match command {
                SheetCommand::Apply { frame } => Some(*frame),
                SheetCommand::Animate { request } | SheetCommand::Dismiss { request } => {
                    Some(request.from)
                }
            },
            Self::Noop { .. } => None,
        }
    }

    /// Terminal command for the host, if the sample ended the drag.
    #[must_use]
    pub fn command(&self) -> Option<SheetCommand> {
        match self {
            Self::Snapped { command, .. }
            | Self::Dismissed { command, .. }
            | Self::Restored { command } => Some(*command),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Noop { .. })
    }
}

/// One state-machine step with its diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DragTransition {
    pub sequence: u64,
    pub from: SheetPhase,
    pub to: SheetPhase,
    pub effect: DragEffect,
}

/// Notification produced when the host reports an animation finished.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "snake_case"))]
pub enum SheetEvent {
    /// The sheet came to rest at `size`.
    Settled { size: SheetSize, height: f64 },
    /// The appear animation finished.
    Presented { height: f64 },
    /// The exit animation finished; the host should tear the sheet down.
    Dismissed,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct DragState {
    first_point_y: f64,
    start_height: f64,
    last_frame: SheetFrame,
}

#[derive(Debug, Clone, Copy)]
enum PendingKind {
    Settle(SheetSize),
    Appear,
    Dismiss,
}

#[derive(Debug, Clone, Copy)]
struct PendingAnimation {
    id: AnimationId,
    kind: PendingKind,
}

/// Drag-to-resize state machine for one sheet.
pub struct DragEngine<V = ViewportMetrics> {
    viewport: V,
    config: SheetConfig,
    snaps: SnapSet,
    current_size: SheetSize,
    actual_height: f64,
    phase: SheetPhase,
    drag: Option<DragState>,
    pending: Option<PendingAnimation>,
    last_animation: AnimationId,
    presentation: Presentation,
    scroll_region: Option<Box<dyn ScrollOffsetProvider>>,
    sequence: u64,
}

impl<V> fmt::Debug for DragEngine<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragEngine")
            .field("phase", &self.phase)
            .field("current_size", &self.current_size)
            .field("actual_height", &self.actual_height)
            .field("snaps", &self.snaps.len())
            .field("scroll_region", &self.scroll_region.is_some())
            .finish()
    }
}

impl<V: ViewportSource> DragEngine<V> {
    /// Build an engine resting at the first default size.
    ///
    /// Fails if the config is invalid; an empty `default_sizes` is reported
    /// as [`SheetError::NoSnapSizes`] so a sheet can never exist without a
    /// snap point.
    pub fn new(viewport: V, config: SheetConfig) -> Result<Self> {
        if config.default_sizes.is_empty() {
            return Err(SheetError::NoSnapSizes);
        }
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(SheetError::InvalidConfig(errors));
        }
        let metrics = viewport.metrics();
        let snaps = SnapSet::new(&config.default_sizes, metrics).ok_or(SheetError::NoSnapSizes)?;
        let current_size = config.default_sizes[0].normalized();
        Ok(Self {
            actual_height: resolve(current_size, metrics),
            viewport,
            config,
            snaps,
            current_size,
            phase: SheetPhase::Idle,
            drag: None,
            pending: None,
            last_animation: AnimationId::new(0),
            presentation: Presentation::new(),
            scroll_region: None,
            sequence: 0,
        })
    }

    // -- accessors ----------------------------------------------------------

    #[must_use]
    pub fn phase(&self) -> SheetPhase {
        self.phase
    }

    #[must_use]
    pub fn presentation_phase(&self) -> PresentationPhase {
        self.presentation.phase()
    }

    /// Backdrop opacity at rest for the current presentation phase.
    #[must_use]
    pub fn backdrop(&self) -> f64 {
        self.presentation.backdrop()
    }

    /// Size the sheet is considered at rest at.
    #[must_use]
    pub fn current_size(&self) -> SheetSize {
        self.current_size
    }

    /// Last known live height of the panel.
    #[must_use]
    pub fn actual_height(&self) -> f64 {
        self.actual_height
    }

    #[must_use]
    pub fn snaps(&self) -> &SnapSet {
        &self.snaps
    }

    #[must_use]
    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    #[must_use]
    pub fn metrics(&self) -> ViewportMetrics {
        self.viewport.metrics()
    }

    /// Resolved height of the resting size under current metrics.
    #[must_use]
    pub fn current_height(&self) -> f64 {
        resolve(self.current_size, self.viewport.metrics())
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Id of the animation whose completion is still awaited.
    #[must_use]
    pub fn pending_animation(&self) -> Option<AnimationId> {
        self.pending.map(|p| p.id)
    }

    // -- configuration ------------------------------------------------------

    /// Install the host's snap sizes without animating.
    pub fn configure(&mut self, sizes: &[SheetSize]) -> Option<SheetCommand> {
        self.set_sizes(sizes, false)
    }

    /// Replace the snap set and resize to `sizes[0]`.
    ///
    /// An empty `sizes` is a no-op that keeps the current set and size, as is
    /// any call once the sheet is dismissing.
    pub fn set_sizes(&mut self, sizes: &[SheetSize], animated: bool) -> Option<SheetCommand> {
        if self.presentation.phase().is_leaving() {
            return None;
        }
        let snaps = SnapSet::new(sizes, self.viewport.metrics())?;
        self.snaps = snaps;
        self.resize(sizes[0], animated)
    }

    /// Move the sheet to `to` directly, bypassing the drag logic.
    ///
    /// Cancels an active drag and supersedes any outstanding animation.
    /// Returns `None` once the sheet is dismissing.
    pub fn resize(&mut self, to: SheetSize, animated: bool) -> Option<SheetCommand> {
        if self.presentation.phase().is_leaving() {
            return None;
        }
        let to = to.normalized();
        let from = self
            .drag
            .take()
            .map_or(SheetFrame::at_rest(self.actual_height), |d| d.last_frame);
        let height = resolve(to, self.viewport.metrics());
        self.current_size = to;
        self.actual_height = height;
        self.supersede_pending();

        let command = if animated {
            let id = self.start_animation(PendingKind::Settle(to));
            self.phase = SheetPhase::Animating;
            SheetCommand::Animate {
                request: AnimationRequest {
                    id,
                    from,
                    to: SheetFrame::at_rest(height),
                    duration: self.config.drag.resize_duration(),
                    curve: Curve::EaseOut,
                    backdrop: None,
                },
            }
        } else {
            self.phase = SheetPhase::Idle;
            SheetCommand::Apply {
                frame: SheetFrame::at_rest(height),
            }
        };
        debug!(target: "sheet.drag", size = ?to, height, animated, "resize");
        Some(command)
    }

    /// Host layout feedback: the panel's measured height.
    pub fn report_measured_height(&mut self, height: f64) {
        if height.is_finite() {
            self.actual_height = height.max(0.0);
        } else {
            warn!(target: "sheet.drag", height, "ignoring non-finite measured height");
        }
    }

    // -- scroll arbitration -------------------------------------------------

    /// Register the nested scrollable region consulted by arbitration.
    pub fn attach_scroll_region(&mut self, region: impl ScrollOffsetProvider + 'static) {
        self.scroll_region = Some(Box::new(region));
    }

    pub fn detach_scroll_region(&mut self) {
        self.scroll_region = None;
    }

    #[must_use]
    pub fn has_scroll_region(&self) -> bool {
        self.scroll_region.is_some()
    }

    /// Arbitrate a candidate drag against an explicitly supplied region.
    #[must_use]
    pub fn should_begin_drag(
        &self,
        velocity: Option<Velocity>,
        region: Option<&dyn ScrollOffsetProvider>,
    ) -> bool {
        self.decide(velocity, region.map(|r| r.scroll_offset()))
            .should_begin()
    }

    /// Arbitrate a candidate drag against the attached region, if any.
    #[must_use]
    pub fn arbitrate(&self, velocity: Option<Velocity>) -> ArbitrationDecision {
        let offset = self.scroll_region.as_ref().map(|r| r.scroll_offset());
        self.decide(velocity, offset)
    }

    fn decide(&self, velocity: Option<Velocity>, scroll_offset: Option<Option<f64>>) -> ArbitrationDecision {
        ScrollArbiter::decide(&ArbitrationInput {
            velocity,
            scroll_offset,
            snaps: &self.snaps,
            current_size: self.current_size,
            metrics: self.viewport.metrics(),
        })
    }

    // -- drag samples -------------------------------------------------------

    /// Feed one drag sample through the state machine.
    pub fn handle_drag_sample(&mut self, sample: &DragSample) -> DragTransition {
        self.sequence = self.sequence.saturating_add(1);
        let from = self.phase;
        let effect = match (self.phase, sample.phase) {
            (SheetPhase::Dismissing | SheetPhase::Dismissed, _) => DragEffect::Noop {
                reason: DragNoopReason::SheetDismissed,
            },
            (SheetPhase::Dragging, DragPhase::Begin) => DragEffect::Noop {
                reason: DragNoopReason::ActiveDragAlreadyInProgress,
            },
            (_, DragPhase::Begin) => self.on_begin(sample),
            (SheetPhase::Dragging, DragPhase::Change) => self.on_change(sample),
            (SheetPhase::Dragging, DragPhase::End) => self.on_end(sample),
            (SheetPhase::Dragging, DragPhase::Cancel | DragPhase::Fail) => self.restore(),
            (_, _) => DragEffect::Noop {
                reason: DragNoopReason::IdleWithoutActiveDrag,
            },
        };
        let transition = DragTransition {
            sequence: self.sequence,
            from,
            to: self.phase,
            effect,
        };
        debug!(
            target: "sheet.drag",
            sequence = transition.sequence,
            from = ?transition.from,
            to = ?transition.to,
            effect = ?transition.effect,
            "drag transition"
        );
        transition
    }

    /// Abort an active drag (focus loss, teardown) as if it were cancelled.
    ///
    /// Returns `None` when no drag is active.
    pub fn force_cancel(&mut self) -> Option<DragTransition> {
        if self.phase != SheetPhase::Dragging {
            return None;
        }
        self.sequence = self.sequence.saturating_add(1);
        let from = self.phase;
        let effect = self.restore();
        Some(DragTransition {
            sequence: self.sequence,
            from,
            to: self.phase,
            effect,
        })
    }

    fn on_begin(&mut self, sample: &DragSample) -> DragEffect {
        if let Some(measured) = sample.measured_height {
            self.report_measured_height(measured);
        }
        // The user may grab the sheet mid-animation; that animation's
        // completion must not touch state from here on.
        self.supersede_pending();

        let start_height = self.actual_height;
        let first_point_y = sample.delta.y;
        let metrics = self.viewport.metrics();
        let bounds = DragBounds::new(start_height, &self.snaps, metrics);
        let tracking = track_height(start_height, first_point_y, sample.delta.y, bounds);
        self.drag = Some(DragState {
            first_point_y,
            start_height,
            last_frame: tracking.frame,
        });
        self.phase = SheetPhase::Dragging;
        DragEffect::Began {
            start_height,
            frame: tracking.frame,
        }
    }

    fn track(&mut self, point_y: f64) -> Option<(Tracking, DragBounds)> {
        let metrics = self.viewport.metrics();
        let drag = self.drag.as_mut()?;
        let bounds = DragBounds::new(drag.start_height, &self.snaps, metrics);
        let tracking = track_height(drag.start_height, drag.first_point_y, point_y, bounds);
        drag.last_frame = tracking.frame;
        Some((tracking, bounds))
    }

    fn on_change(&mut self, sample: &DragSample) -> DragEffect {
        match self.track(sample.delta.y) {
            Some((tracking, _)) => DragEffect::Moved {
                frame: tracking.frame,
            },
            None => DragEffect::Noop {
                reason: DragNoopReason::IdleWithoutActiveDrag,
            },
        }
    }

    fn on_end(&mut self, sample: &DragSample) -> DragEffect {
        let Some((tracking, bounds)) = self.track(sample.delta.y) else {
            return DragEffect::Noop {
                reason: DragNoopReason::IdleWithoutActiveDrag,
            };
        };
        self.drag = None;
        let projection = project_release(&tracking, sample.velocity.y, bounds, &self.config.drag);

        self.supersede_pending();
        if projection.dismiss {
            let fade = self.presentation.begin_dismiss();
            let id = self.start_animation(PendingKind::Dismiss);
            self.phase = SheetPhase::Dismissing;
            let frame = tracking.frame;
            return DragEffect::Dismissed {
                projection,
                command: SheetCommand::Dismiss {
                    request: AnimationRequest {
                        id,
                        from: frame,
                        to: SheetFrame::new(frame.height, frame.height),
                        duration: projection.duration,
                        curve: Curve::EaseOut,
                        backdrop: fade,
                    },
                },
            };
        }

        let metrics = self.viewport.metrics();
        let size = if sample.delta.y < 0.0 {
            self.snaps.scan_upward(projection.final_height, metrics)
        } else {
            self.snaps.scan_downward(projection.final_height, metrics)
        };
        self.current_size = size;
        let id = self.start_animation(PendingKind::Settle(size));
        self.phase = SheetPhase::Animating;
        DragEffect::Snapped {
            size,
            projection,
            command: SheetCommand::Animate {
                request: AnimationRequest {
                    id,
                    from: tracking.frame,
                    to: SheetFrame::at_rest(resolve(size, metrics)),
                    duration: projection.duration,
                    curve: Curve::EaseOut,
                    backdrop: None,
                },
            },
        }
    }

    /// Drop the drag and animate back to the resting size.
    fn restore(&mut self) -> DragEffect {
        let from = self
            .drag
            .take()
            .map_or(SheetFrame::at_rest(self.actual_height), |d| d.last_frame);
        let size = self.current_size;
        let id = self.start_animation(PendingKind::Settle(size));
        self.phase = SheetPhase::Animating;
        DragEffect::Restored {
            command: SheetCommand::Animate {
                request: AnimationRequest {
                    id,
                    from,
                    to: SheetFrame::at_rest(resolve(size, self.viewport.metrics())),
                    duration: self.config.drag.cancel_duration(),
                    curve: Curve::EaseOut,
                    backdrop: None,
                },
            },
        }
    }

    // -- presentation -------------------------------------------------------

    /// Slide the sheet up from below the screen. `None` if already shown.
    pub fn present(&mut self) -> Option<SheetCommand> {
        if self.presentation.phase() != PresentationPhase::Hidden {
            return None;
        }
        let metrics = self.viewport.metrics();
        let height = resolve(self.current_size, metrics);
        let id = self.start_animation(PendingKind::Appear);
        let request = self.presentation.begin_appear(
            id,
            height,
            metrics.available_height,
            &self.config.presentation,
        )?;
        if self.phase == SheetPhase::Idle {
            self.phase = SheetPhase::Animating;
        }
        Some(SheetCommand::Animate { request })
    }

    /// The dimmed area above the sheet was tapped.
    ///
    /// Dismisses when enabled by config; otherwise `None`.
    pub fn background_tapped(&mut self) -> Option<SheetCommand> {
        if !self.config.dismiss_on_background_tap || self.presentation.phase().is_leaving() {
            return None;
        }
        self.supersede_pending();
        let fade = self.presentation.begin_dismiss()?;
        let frame = self
            .drag
            .take()
            .map_or(SheetFrame::at_rest(self.actual_height), |d| d.last_frame);
        let id = self.start_animation(PendingKind::Dismiss);
        self.phase = SheetPhase::Dismissing;
        Some(SheetCommand::Dismiss {
            request: background_dismiss_request(id, frame, fade, &self.config.presentation),
        })
    }

    // -- completion ---------------------------------------------------------

    /// The host finished running animation `id`.
    ///
    /// Stale ids (superseded by a newer drag, resize or dismissal) are
    /// ignored and return `None`.
    pub fn complete_animation(&mut self, id: AnimationId) -> Option<SheetEvent> {
        let pending = match self.pending {
            Some(p) if p.id == id => p,
            _ => {
                debug!(target: "sheet.drag", id = id.get(), "ignoring stale animation completion");
                return None;
            }
        };
        self.pending = None;
        let event = match pending.kind {
            PendingKind::Settle(size) => {
                let height = resolve(size, self.viewport.metrics());
                self.actual_height = height;
                self.phase = SheetPhase::Idle;
                SheetEvent::Settled { size, height }
            }
            PendingKind::Appear => {
                let height = resolve(self.current_size, self.viewport.metrics());
                self.actual_height = height;
                self.presentation.finish_appear(&self.config.presentation);
                self.phase = SheetPhase::Idle;
                SheetEvent::Presented { height }
            }
            PendingKind::Dismiss => {
                self.presentation.finish_dismiss();
                self.phase = SheetPhase::Dismissed;
                SheetEvent::Dismissed
            }
        };
        debug!(target: "sheet.drag", id = id.get(), event = ?event, "animation completed");
        Some(event)
    }

    /// Hand out a fresh id and make it the only completion that counts.
    fn start_animation(&mut self, kind: PendingKind) -> AnimationId {
        self.supersede_pending();
        self.last_animation = self.last_animation.next();
        self.pending = Some(PendingAnimation {
            id: self.last_animation,
            kind,
        });
        self.last_animation
    }

    fn supersede_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            if matches!(pending.kind, PendingKind::Appear) {
                self.presentation.finish_appear(&self.config.presentation);
            }
            debug!(target: "sheet.drag", id = pending.id.get(), "animation superseded");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
