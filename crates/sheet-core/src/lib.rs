// Forbid unsafe in production; deny (with targeted allows) in tests.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: drag-gesture interpretation and snap-point resolution for bottom
//! sheets.
//!
//! # Role
//! `sheet-core` is the decision layer of a draggable bottom sheet. It owns no
//! views and runs no animations; the host forwards drag samples and executes
//! the commands it gets back.
//!
//! # Primary responsibilities
//! - **SheetSize / resolve**: requested heights and their concrete values.
//! - **SnapSet**: ordered resting points and the release-time snap scans.
//! - **ScrollArbiter**: whether a drag or a nested scroll owns a gesture.
//! - **DragEngine**: the drag state machine, rubber band, release projection,
//!   dismissal and presentation lifecycle.
//!
//! # How it fits in the system
//! ```text
//! host recognizer ──samples──▶ DragEngine ──SheetCommand──▶ host animator
//!        │                         ▲                             │
//!        └─should_begin_drag?──────┘◀──complete_animation(id)────┘
//! ```

pub mod animation;
pub mod arbiter;
pub mod config;
pub mod drag;
pub mod error;
pub mod logging;
pub mod presentation;
pub mod size;
pub mod snap;

pub use animation::{AnimationId, AnimationRequest, Curve, FrameTween, SheetCommand, SheetFrame};
pub use arbiter::{ArbitrationDecision, ScrollArbiter, ScrollOffsetProvider, Velocity};
pub use config::{ConfigError, DragTuning, PresentationTuning, SheetConfig};
pub use drag::{
    DragDelta, DragEffect, DragEngine, DragPhase, DragSample, DragTransition, SheetEvent,
    SheetPhase,
};
pub use error::SheetError;
pub use presentation::PresentationPhase;
pub use size::{SheetSize, ViewportMetrics, ViewportSource, resolve};
pub use snap::SnapSet;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace, warn};
