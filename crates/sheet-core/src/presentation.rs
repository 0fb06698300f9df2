#![forbid(unsafe_code)]

//! Sheet presentation lifecycle: appear, present, dismiss.
//!
//! State machine: Hidden → Appearing → Presented → Dismissing → Dismissed
//!
//! A drag may interrupt the appear animation; the sheet then counts as
//! presented. Dismissal is terminal.
//!
//! # Invariants
//!
//! - Backdrop opacity is always in [0.0, 1.0].
//! - Once `Dismissed`, no transition leaves that phase.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::animation::{AnimationId, AnimationRequest, BackdropFade, Curve, SheetFrame};
use crate::config::PresentationTuning;

/// Where the sheet is in its on-screen lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PresentationPhase {
    /// Not yet shown; the panel sits below the screen.
    #[default]
    Hidden,
    /// Sliding up with the backdrop dimming in.
    Appearing,
    /// On screen and interactive.
    Presented,
    /// Sliding away with the backdrop clearing.
    Dismissing,
    /// Torn down.
    Dismissed,
}

impl PresentationPhase {
    #[inline]
    #[must_use]
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden | Self::Dismissed)
    }

    #[inline]
    #[must_use]
    pub fn is_leaving(self) -> bool {
        matches!(self, Self::Dismissing | Self::Dismissed)
    }
}

/// Presentation phase plus the backdrop opacity the host should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation {
    phase: PresentationPhase,
    backdrop: f64,
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new()
    }
}

impl Presentation {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: PresentationPhase::Hidden,
            backdrop: 0.0,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> PresentationPhase {
        self.phase
    }

    /// Backdrop opacity at rest for the current phase.
    #[must_use]
    pub const fn backdrop(&self) -> f64 {
        self.backdrop
    }

    /// Start the slide-up. `None` unless the sheet is still hidden.
    pub fn begin_appear(
        &mut self,
        id: AnimationId,
        height: f64,
        offscreen: f64,
        tuning: &PresentationTuning,
    ) -> Option<AnimationRequest> {
        if self.phase != PresentationPhase::Hidden {
            return None;
        }
        self.phase = PresentationPhase::Appearing;
        let target = tuning.backdrop_opacity.clamp(0.0, 1.0);
        Some(AnimationRequest {
            id,
            from: SheetFrame::new(height, offscreen.max(0.0)),
            to: SheetFrame::at_rest(height),
            duration: tuning.appear_duration(),
            curve: Curve::EaseOut,
            backdrop: Some(BackdropFade {
                from: self.backdrop,
                to: target,
            }),
        })
    }

    /// Appear animation finished or was interrupted by a drag.
    pub fn finish_appear(&mut self, tuning: &PresentationTuning) {
        if matches!(
            self.phase,
            PresentationPhase::Hidden | PresentationPhase::Appearing
        ) {
            self.phase = PresentationPhase::Presented;
            self.backdrop = tuning.backdrop_opacity.clamp(0.0, 1.0);
        }
    }

    /// Enter `Dismissing`, returning the backdrop fade to pair with the exit
    /// animation. `None` if already leaving.
    pub fn begin_dismiss(&mut self) -> Option<BackdropFade> {
        if self.phase.is_leaving() {
            return None;
        }
        self.phase = PresentationPhase::Dismissing;
        Some(BackdropFade {
            from: self.backdrop,
            to: 0.0,
        })
    }

    pub fn finish_dismiss(&mut self) {
        self.phase = PresentationPhase::Dismissed;
        self.backdrop = 0.0;
    }
}

/// Exit animation for a tap on the backdrop: slide the panel away while the
/// backdrop clears.
#[must_use]
pub fn background_dismiss_request(
    id: AnimationId,
    frame: SheetFrame,
    fade: BackdropFade,
    tuning: &PresentationTuning,
) -> AnimationRequest {
    AnimationRequest {
        id,
        from: frame,
        to: SheetFrame::new(frame.height, frame.height),
        duration: tuning.background_dismiss_duration(),
        curve: Curve::EaseInOut,
        backdrop: Some(fade),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn appear_slides_up_and_dims() {
        let tuning = PresentationTuning::default();
        let mut p = Presentation::new();
        let req = p
            .begin_appear(AnimationId::new(1), 520.0, 800.0, &tuning)
            .expect("hidden sheet appears");
        assert_eq!(p.phase(), PresentationPhase::Appearing);
        assert_eq!(req.from, SheetFrame::new(520.0, 800.0));
        assert_eq!(req.to, SheetFrame::at_rest(520.0));
        assert_eq!(req.duration, Duration::from_millis(300));
        assert_eq!(req.curve, Curve::EaseOut);
        let fade = req.backdrop.expect("backdrop fade");
        assert_eq!(fade.from, 0.0);
        assert!((fade.to - 70.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn appear_only_from_hidden() {
        let tuning = PresentationTuning::default();
        let mut p = Presentation::new();
        p.finish_appear(&tuning);
        assert_eq!(p.phase(), PresentationPhase::Presented);
        assert!(p.begin_appear(AnimationId::new(2), 1.0, 1.0, &tuning).is_none());
    }

    #[test]
    fn dismiss_is_terminal() {
        let tuning = PresentationTuning::default();
        let mut p = Presentation::new();
        p.finish_appear(&tuning);
        let fade = p.begin_dismiss().expect("presented sheet dismisses");
        assert_eq!(fade.to, 0.0);
        assert!(p.begin_dismiss().is_none());
        p.finish_dismiss();
        assert_eq!(p.phase(), PresentationPhase::Dismissed);
        assert!(!p.phase().is_visible());
        p.finish_appear(&tuning);
        assert_eq!(p.phase(), PresentationPhase::Dismissed);
    }

    #[test]
    fn background_dismiss_slides_by_panel_height() {
        let tuning = PresentationTuning::default();
        let req = background_dismiss_request(
            AnimationId::new(3),
            SheetFrame::at_rest(400.0),
            BackdropFade { from: 0.3, to: 0.0 },
            &tuning,
        );
        assert_eq!(req.to, SheetFrame::new(400.0, 400.0));
        assert_eq!(req.curve, Curve::EaseInOut);
    }
}
