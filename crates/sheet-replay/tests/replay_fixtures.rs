//! Replays the recorded traces under `tests/fixtures` and checks the engine's
//! decisions step by step.

use std::path::PathBuf;

use sheet_core::arbiter::{BeginReason, RejectReason};
use sheet_core::drag::DragNoopReason;
use sheet_core::{
    ArbitrationDecision, DragEffect, PresentationPhase, SheetCommand, SheetEvent, SheetFrame,
    SheetPhase, SheetSize,
};
use sheet_replay::{Outcome, ReplayLine, Trace, replay, write_jsonl};

fn fixture(name: &str) -> Vec<ReplayLine> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let trace = Trace::from_file(&path).expect("fixture parses");
    replay(&trace).expect("fixture replays")
}

fn effect(line: &ReplayLine) -> DragEffect {
    match &line.outcome {
        Outcome::Transition {
            transition: Some(t),
        } => t.effect,
        other => panic!("step {} is not a transition: {other:?}", line.step),
    }
}

fn event(line: &ReplayLine) -> Option<SheetEvent> {
    match &line.outcome {
        Outcome::Event { event, .. } => *event,
        other => panic!("step {} is not a completion: {other:?}", line.step),
    }
}

fn decision(line: &ReplayLine) -> ArbitrationDecision {
    match &line.outcome {
        Outcome::Decision { decision } => *decision,
        other => panic!("step {} is not an arbitration: {other:?}", line.step),
    }
}

#[test]
fn snap_up_lands_on_full_screen() {
    let lines = fixture("snap_up.json");
    assert_eq!(lines.len(), 5);
    assert_eq!(effect(&lines[1]).frame(), Some(SheetFrame::at_rest(400.0)));
    assert_eq!(effect(&lines[2]).frame(), Some(SheetFrame::at_rest(500.0)));

    let DragEffect::Snapped { size, command, .. } = effect(&lines[3]) else {
        panic!("release must snap");
    };
    assert_eq!(size, SheetSize::FullScreen);
    assert_eq!(command.final_frame(), SheetFrame::at_rest(780.0));

    assert_eq!(
        event(&lines[4]),
        Some(SheetEvent::Settled {
            size: SheetSize::FullScreen,
            height: 780.0
        })
    );
    assert_eq!(lines[4].phase, SheetPhase::Idle);
}

#[test]
fn flick_dismisses_and_ignores_later_input() {
    let lines = fixture("flick_dismiss.json");
    assert_eq!(lines[1].presentation, PresentationPhase::Presented);
    assert_eq!(
        effect(&lines[3]).frame(),
        Some(SheetFrame::new(300.0, 50.0))
    );

    let DragEffect::Dismissed { projection, command } = effect(&lines[4]) else {
        panic!("hard flick must dismiss");
    };
    assert_eq!(projection.final_height, -1.0);
    assert!(matches!(command, SheetCommand::Dismiss { .. }));
    assert_eq!(lines[4].phase, SheetPhase::Dismissing);

    assert_eq!(event(&lines[5]), Some(SheetEvent::Dismissed));
    assert_eq!(lines[5].presentation, PresentationPhase::Dismissed);
    assert_eq!(
        effect(&lines[6]),
        DragEffect::Noop {
            reason: DragNoopReason::SheetDismissed
        }
    );
}

#[test]
fn nested_scroll_arbitration() {
    let lines = fixture("nested_scroll.json");
    let decisions: Vec<_> = [0, 1, 2, 3, 4, 6, 7]
        .iter()
        .map(|&i| decision(&lines[i]))
        .collect();
    assert_eq!(
        decisions,
        vec![
            ArbitrationDecision::Begin(BeginReason::NoScrollRegion),
            ArbitrationDecision::Begin(BeginReason::OffsetUnavailable),
            ArbitrationDecision::Reject(RejectReason::ChildScrolledAwayFromTop),
            ArbitrationDecision::Begin(BeginReason::SheetCanGrow),
            ArbitrationDecision::Begin(BeginReason::VelocityUnavailable),
            ArbitrationDecision::Reject(RejectReason::NoRoomToGrow),
            ArbitrationDecision::Begin(BeginReason::DownwardDrag),
        ]
    );
    assert_eq!(lines[5].current_size, SheetSize::FullScreen);
}

#[test]
fn regrab_ignores_the_interrupted_snap() {
    let lines = fixture("regrab.json");
    assert_eq!(lines[2].phase, SheetPhase::Dragging);
    assert_eq!(lines[2].actual_height, 710.0);
    assert_eq!(event(&lines[3]), None);
    assert_eq!(lines[3].phase, SheetPhase::Dragging);

    let DragEffect::Snapped { size, .. } = effect(&lines[5]) else {
        panic!("release must snap");
    };
    assert_eq!(size, SheetSize::HalfScreen);
    assert_eq!(
        event(&lines[6]),
        Some(SheetEvent::Settled {
            size: SheetSize::HalfScreen,
            height: 424.0
        })
    );
}

#[test]
fn rotation_and_disabled_background_tap() {
    let lines = fixture("rotation.json");
    assert_eq!(
        event(&lines[1]),
        Some(SheetEvent::Presented { height: 424.0 })
    );

    let Outcome::Command {
        command: Some(SheetCommand::Animate { request }),
    } = lines[3].outcome
    else {
        panic!("animated resize must animate");
    };
    assert_eq!(request.from, SheetFrame::at_rest(424.0));
    assert_eq!(request.to, SheetFrame::at_rest(524.0));
    assert_eq!(
        event(&lines[4]),
        Some(SheetEvent::Settled {
            size: SheetSize::HalfScreen,
            height: 524.0
        })
    );

    assert_eq!(lines[5].outcome, Outcome::Command { command: None });
    assert_eq!(lines[5].presentation, PresentationPhase::Presented);
    assert_eq!(
        effect(&lines[6]),
        DragEffect::Noop {
            reason: DragNoopReason::IdleWithoutActiveDrag
        }
    );
    assert_eq!(lines[7].outcome, Outcome::Transition { transition: None });
}

#[test]
fn output_is_stable_json_lines() {
    let lines = fixture("snap_up.json");
    let mut first = Vec::new();
    let mut second = Vec::new();
    write_jsonl(&lines, &mut first).expect("write");
    write_jsonl(&fixture("snap_up.json"), &mut second).expect("write");
    assert_eq!(first, second, "replay must be deterministic");

    let text = String::from_utf8(first).expect("utf8");
    for (i, line) in text.lines().enumerate() {
        let value: serde_json::Value = serde_json::from_str(line).expect("json");
        assert_eq!(value["step"], i);
        assert!(value["phase"].is_string());
    }
}
