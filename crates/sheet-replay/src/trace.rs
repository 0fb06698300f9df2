//! Trace model and the replayer that drives a [`DragEngine`] through it.
//!
//! A trace is a JSON document:
//!
//! ```json
//! {
//!   "viewport": { "available_height": 800.0, "top_inset": 20.0 },
//!   "sizes": [{ "fixed": 300.0 }, "full_screen"],
//!   "steps": [
//!     { "step": "sample", "phase": "begin" },
//!     { "step": "sample", "phase": "change", "delta": { "x": 0.0, "y": -200.0 } },
//!     { "step": "sample", "phase": "end", "delta": { "x": 0.0, "y": -200.0 } },
//!     { "step": "complete_last" }
//!   ]
//! }
//! ```
//!
//! Every step produces exactly one [`ReplayLine`].

use std::cell::Cell;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use sheet_core::{
    AnimationId, ArbitrationDecision, DragEngine, DragSample, DragTransition, PresentationPhase,
    SheetCommand, SheetConfig, SheetEvent, SheetPhase, SheetSize, Velocity, ViewportMetrics,
    ViewportSource,
};
use tracing::debug;

use crate::error::{ReplayError, Result};

/// A recorded host session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trace {
    pub viewport: ViewportMetrics,
    /// Engine configuration; defaults when absent.
    #[serde(default)]
    pub config: Option<SheetConfig>,
    /// Sizes passed to `configure` before the first step. Skipped when empty.
    #[serde(default)]
    pub sizes: Vec<SheetSize>,
    pub steps: Vec<Step>,
}

impl Trace {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReplayError::MissingTrace {
                path: path.to_path_buf(),
            });
        }
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}

/// State of the nested scroll region at arbitration time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollRegion {
    /// The sheet content has no scrollable region.
    #[default]
    None,
    /// A region exists but cannot report its offset.
    Unavailable,
    /// A region scrolled to this offset.
    Offset(f64),
}

/// One host event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// A pan recognizer sample.
    Sample(DragSample),
    /// The host lost focus mid-drag.
    ForceCancel,
    /// Ask whether a drag with this velocity should begin.
    Arbitrate {
        #[serde(default)]
        velocity: Option<Velocity>,
        #[serde(default)]
        region: ScrollRegion,
    },
    /// Layout feedback.
    Measured { height: f64 },
    /// Report a specific animation as finished.
    Complete { id: AnimationId },
    /// Report the outstanding animation as finished.
    CompleteLast,
    Resize {
        size: SheetSize,
        #[serde(default)]
        animated: bool,
    },
    SetSizes {
        sizes: Vec<SheetSize>,
        #[serde(default)]
        animated: bool,
    },
    Present,
    BackgroundTap,
    /// Rotation or keyboard change.
    Viewport { metrics: ViewportMetrics },
}

/// What a step produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Transition { transition: Option<DragTransition> },
    Command { command: Option<SheetCommand> },
    Decision { decision: ArbitrationDecision },
    Event { id: AnimationId, event: Option<SheetEvent> },
    Measured { actual_height: f64 },
    Viewport { metrics: ViewportMetrics },
}

/// One output record: the outcome plus the engine state right after it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayLine {
    pub step: usize,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub phase: SheetPhase,
    pub presentation: PresentationPhase,
    pub current_size: SheetSize,
    pub actual_height: f64,
}

/// Viewport the replayer can change between steps.
#[derive(Debug, Clone)]
pub struct SharedViewport(Rc<Cell<ViewportMetrics>>);

impl SharedViewport {
    #[must_use]
    pub fn new(metrics: ViewportMetrics) -> Self {
        Self(Rc::new(Cell::new(metrics)))
    }

    pub fn set(&self, metrics: ViewportMetrics) {
        self.0.set(metrics);
    }
}

impl ViewportSource for SharedViewport {
    fn metrics(&self) -> ViewportMetrics {
        self.0.get()
    }
}

/// Drives one engine step by step.
#[derive(Debug)]
pub struct Replayer {
    engine: DragEngine<SharedViewport>,
    viewport: SharedViewport,
    steps: usize,
}

impl Replayer {
    pub fn new(metrics: ViewportMetrics, config: SheetConfig, sizes: &[SheetSize]) -> Result<Self> {
        let viewport = SharedViewport::new(metrics);
        let mut engine = DragEngine::new(viewport.clone(), config)?;
        engine.configure(sizes);
        Ok(Self {
            engine,
            viewport,
            steps: 0,
        })
    }

    pub fn for_trace(trace: &Trace) -> Result<Self> {
        Self::new(
            trace.viewport,
            trace.config.clone().unwrap_or_default(),
            &trace.sizes,
        )
    }

    #[must_use]
    pub fn engine(&self) -> &DragEngine<SharedViewport> {
        &self.engine
    }

    /// Apply one step and describe what it did.
    pub fn apply(&mut self, step: &Step) -> Result<ReplayLine> {
        let index = self.steps;
        self.steps += 1;
        debug!(target: "sheet.replay", index, ?step, "replaying step");

        let engine = &mut self.engine;
        let outcome = match step {
            Step::Sample(sample) => Outcome::Transition {
                transition: Some(engine.handle_drag_sample(sample)),
            },
            Step::ForceCancel => Outcome::Transition {
                transition: engine.force_cancel(),
            },
            Step::Arbitrate { velocity, region } => {
                match *region {
                    ScrollRegion::None => engine.detach_scroll_region(),
                    ScrollRegion::Unavailable => engine.attach_scroll_region(|| None::<f64>),
                    ScrollRegion::Offset(offset) => engine.attach_scroll_region(offset),
                }
                Outcome::Decision {
                    decision: engine.arbitrate(*velocity),
                }
            }
            Step::Measured { height } => {
                engine.report_measured_height(*height);
                Outcome::Measured {
                    actual_height: engine.actual_height(),
                }
            }
            Step::Complete { id } => Outcome::Event {
                id: *id,
                event: engine.complete_animation(*id),
            },
            Step::CompleteLast => {
                let id = engine.pending_animation().ok_or_else(|| {
                    ReplayError::invalid(format!("step {index}: no animation is pending"))
                })?;
                Outcome::Event {
                    id,
                    event: engine.complete_animation(id),
                }
            }
            Step::Resize { size, animated } => Outcome::Command {
                command: engine.resize(*size, *animated),
            },
            Step::SetSizes { sizes, animated } => Outcome::Command {
                command: engine.set_sizes(sizes, *animated),
            },
            Step::Present => Outcome::Command {
                command: engine.present(),
            },
            Step::BackgroundTap => Outcome::Command {
                command: engine.background_tapped(),
            },
            Step::Viewport { metrics } => {
                self.viewport.set(*metrics);
                Outcome::Viewport { metrics: *metrics }
            }
        };

        Ok(ReplayLine {
            step: index,
            outcome,
            phase: self.engine.phase(),
            presentation: self.engine.presentation_phase(),
            current_size: self.engine.current_size(),
            actual_height: self.engine.actual_height(),
        })
    }
}

/// Replay every step of `trace`.
pub fn replay(trace: &Trace) -> Result<Vec<ReplayLine>> {
    let mut replayer = Replayer::for_trace(trace)?;
    trace.steps.iter().map(|step| replayer.apply(step)).collect()
}

/// Write lines as JSON Lines.
pub fn write_jsonl<W: Write>(lines: &[ReplayLine], mut out: W) -> Result<()> {
    for line in lines {
        serde_json::to_writer(&mut out, line)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE: &str = r#"{
        "viewport": { "available_height": 800.0, "top_inset": 20.0 },
        "sizes": [{ "fixed": 300.0 }, "full_screen"],
        "steps": [
            { "step": "arbitrate", "velocity": { "x": 0.0, "y": -50.0 }, "region": { "offset": 120.0 } },
            { "step": "arbitrate", "velocity": { "x": 0.0, "y": -50.0 }, "region": { "offset": 0.0 } },
            { "step": "sample", "phase": "begin" },
            { "step": "sample", "phase": "change", "delta": { "x": 0.0, "y": -200.0 } },
            { "step": "sample", "phase": "end", "delta": { "x": 0.0, "y": -200.0 } },
            { "step": "complete_last" }
        ]
    }"#;

    #[test]
    fn parses_every_step_kind() {
        let json = r#"{
            "viewport": { "available_height": 800.0, "top_inset": 20.0 },
            "steps": [
                { "step": "present" },
                { "step": "force_cancel" },
                { "step": "arbitrate" },
                { "step": "arbitrate", "region": "unavailable" },
                { "step": "measured", "height": 410.0 },
                { "step": "complete", "id": 7 },
                { "step": "complete_last" },
                { "step": "resize", "size": "half_screen", "animated": true },
                { "step": "set_sizes", "sizes": ["full_screen"] },
                { "step": "background_tap" },
                { "step": "viewport", "metrics": { "available_height": 400.0, "top_inset": 0.0 } }
            ]
        }"#;
        let trace = Trace::from_json_str(json).expect("valid trace");
        assert_eq!(trace.steps.len(), 11);
        assert_eq!(
            trace.steps[3],
            Step::Arbitrate {
                velocity: None,
                region: ScrollRegion::Unavailable
            }
        );
        assert_eq!(
            trace.steps[5],
            Step::Complete {
                id: AnimationId::new(7)
            }
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let json = r#"{ "viewport": { "available_height": 1.0, "top_inset": 0.0 }, "steps": [], "extra": 1 }"#;
        assert!(matches!(
            Trace::from_json_str(json),
            Err(ReplayError::Json(_))
        ));
    }

    #[test]
    fn replays_a_snap_up() {
        let trace = Trace::from_json_str(TRACE).expect("valid trace");
        let lines = replay(&trace).expect("replay");
        assert_eq!(lines.len(), 6);

        let Outcome::Decision { decision } = lines[0].outcome else {
            panic!("expected decision");
        };
        assert!(!decision.should_begin());
        let Outcome::Decision { decision } = lines[1].outcome else {
            panic!("expected decision");
        };
        assert!(decision.should_begin());

        assert_eq!(lines[4].phase, SheetPhase::Animating);
        assert_eq!(lines[4].current_size, SheetSize::FullScreen);
        assert_eq!(lines[5].phase, SheetPhase::Idle);
        assert_eq!(lines[5].actual_height, 780.0);
    }

    #[test]
    fn complete_last_without_pending_is_an_error() {
        let mut replayer = Replayer::new(
            ViewportMetrics::new(800.0, 20.0),
            SheetConfig::default(),
            &[],
        )
        .expect("default config");
        let err = replayer.apply(&Step::CompleteLast).expect_err("nothing pending");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn viewport_step_changes_resolution() {
        let mut replayer = Replayer::new(
            ViewportMetrics::new(800.0, 20.0),
            SheetConfig::default(),
            &[SheetSize::HalfScreen],
        )
        .expect("default config");
        assert_eq!(replayer.engine().current_height(), 424.0);
        replayer
            .apply(&Step::Viewport {
                metrics: ViewportMetrics::new(400.0, 20.0),
            })
            .expect("viewport step");
        assert_eq!(replayer.engine().current_height(), 224.0);
    }

    #[test]
    fn jsonl_has_one_object_per_line() {
        let trace = Trace::from_json_str(TRACE).expect("valid trace");
        let lines = replay(&trace).expect("replay");
        let mut buf = Vec::new();
        write_jsonl(&lines, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        let parsed: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).expect("json line"))
            .collect();
        assert_eq!(parsed.len(), 6);
        assert_eq!(parsed[0]["outcome"], "decision");
        assert_eq!(parsed[0]["decision"]["decision"], "reject");
        assert_eq!(parsed[4]["transition"]["effect"]["effect"], "snapped");
        assert_eq!(parsed[5]["event"]["event"], "settled");
    }
}
