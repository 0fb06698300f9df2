#![forbid(unsafe_code)]

//! Deterministic trace replay for the bottom-sheet drag engine.
//!
//! A trace records what a host saw (viewport, configured sizes, drag
//! samples, arbitration queries, layout feedback, animation completions).
//! Replaying it drives a fresh [`sheet_core::DragEngine`] and yields one
//! [`ReplayLine`] per step, printed as JSON Lines by the binary.

pub mod cli;
pub mod error;
pub mod trace;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{ReplayError, Result};
pub use trace::{Outcome, ReplayLine, Replayer, ScrollRegion, Step, Trace, replay, write_jsonl};
