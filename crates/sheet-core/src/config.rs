#![forbid(unsafe_code)]

//! Policy-as-data configuration for sheet behaviour.
//!
//! Every tunable constant of the drag engine lives in [`SheetConfig`]. The
//! defaults reproduce the stock behaviour exactly, so
//! `SheetConfig::default()` needs no loading step.
//!
//! # Loading (feature `serde`)
//!
//! ```toml
//! default_sizes = [{ fixed = 320.0 }, "half_screen", "full_screen"]
//! dismiss_on_background_tap = false
//!
//! [drag]
//! flick_dismiss_threshold = 650.0
//! ```
//!
//! ```rust,ignore
//! let config = SheetConfig::from_toml_file("sheet.toml")?;
//! ```

#[cfg(feature = "serde")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::animation::secs;
use crate::size::SheetSize;

/// Top-level sheet configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetConfig {
    /// Snap sizes used until the host configures its own. Must not be empty.
    pub default_sizes: Vec<SheetSize>,
    /// Tapping the dimmed area above the sheet dismisses it.
    pub dismiss_on_background_tap: bool,
    pub drag: DragTuning,
    pub presentation: PresentationTuning,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            default_sizes: vec![SheetSize::Fixed(520.0), SheetSize::FullScreen],
            dismiss_on_background_tap: true,
            drag: DragTuning::default(),
            presentation: PresentationTuning::default(),
        }
    }
}

/// Release projection and animation timing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DragTuning {
    /// Multiplier turning release velocity into a height projection.
    pub velocity_scale: f64,
    /// Projected downward velocity above which the sheet always dismisses.
    pub flick_dismiss_threshold: f64,
    /// Floor of the release animation duration, seconds.
    pub base_duration_secs: f64,
    /// Extra release duration per unit of projected velocity, seconds.
    pub duration_per_velocity: f64,
    /// Release heights at or below `min_height * dismiss_fraction` dismiss.
    pub dismiss_fraction: f64,
    /// Duration of the return animation after a cancelled drag, seconds.
    pub cancel_duration_secs: f64,
    /// Duration of an animated programmatic resize, seconds.
    pub resize_duration_secs: f64,
}

impl Default for DragTuning {
    fn default() -> Self {
        Self {
            velocity_scale: 0.2,
            flick_dismiss_threshold: 500.0,
            base_duration_secs: 0.2,
            duration_per_velocity: 0.0002,
            dismiss_fraction: 0.5,
            cancel_duration_secs: 0.3,
            resize_duration_secs: 0.2,
        }
    }
}

impl DragTuning {
    #[must_use]
    pub fn cancel_duration(&self) -> Duration {
        secs(self.cancel_duration_secs)
    }

    #[must_use]
    pub fn resize_duration(&self) -> Duration {
        secs(self.resize_duration_secs)
    }

    /// Release animation duration for a projected velocity.
    #[must_use]
    pub fn release_duration(&self, velocity_factor: f64) -> Duration {
        secs(velocity_factor.abs() * self.duration_per_velocity + self.base_duration_secs)
    }
}

/// Appear and background-dismiss transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PresentationTuning {
    /// Slide-up duration when the sheet is first shown, seconds.
    pub appear_duration_secs: f64,
    /// Backdrop fade duration for a background-tap dismissal, seconds.
    pub background_dismiss_duration_secs: f64,
    /// Opacity of the dimmed backdrop while presented.
    pub backdrop_opacity: f64,
}

impl Default for PresentationTuning {
    fn default() -> Self {
        Self {
            appear_duration_secs: 0.3,
            background_dismiss_duration_secs: 0.3,
            backdrop_opacity: 70.0 / 255.0,
        }
    }
}

impl PresentationTuning {
    #[must_use]
    pub fn appear_duration(&self) -> Duration {
        secs(self.appear_duration_secs)
    }

    #[must_use]
    pub fn background_dismiss_duration(&self) -> Duration {
        secs(self.background_dismiss_duration_secs)
    }
}

impl SheetConfig {
    /// Load from a TOML string and validate.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk and validate.
    #[cfg(feature = "serde")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string and validate.
    #[cfg(feature = "serde")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Validate all parameters.
    ///
    /// Returns a list of problems; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.default_sizes.is_empty() {
            errors.push("default_sizes must contain at least one size".to_string());
        }
        for size in &self.default_sizes {
            if let SheetSize::Fixed(v) = size
                && !v.is_finite()
            {
                errors.push(format!("fixed size must be finite, got {v}"));
            }
        }

        let d = &self.drag;
        if !(d.velocity_scale.is_finite() && d.velocity_scale > 0.0) {
            errors.push(format!(
                "drag.velocity_scale must be > 0, got {}",
                d.velocity_scale
            ));
        }
        if !d.flick_dismiss_threshold.is_finite() {
            errors.push(format!(
                "drag.flick_dismiss_threshold must be finite, got {}",
                d.flick_dismiss_threshold
            ));
        }
        if !(d.dismiss_fraction > 0.0 && d.dismiss_fraction <= 1.0) {
            errors.push(format!(
                "drag.dismiss_fraction must be in (0, 1], got {}",
                d.dismiss_fraction
            ));
        }
        if d.duration_per_velocity < 0.0 || !d.duration_per_velocity.is_finite() {
            errors.push(format!(
                "drag.duration_per_velocity must be >= 0, got {}",
                d.duration_per_velocity
            ));
        }
        for (name, value) in [
            ("drag.base_duration_secs", d.base_duration_secs),
            ("drag.cancel_duration_secs", d.cancel_duration_secs),
            ("drag.resize_duration_secs", d.resize_duration_secs),
            (
                "presentation.appear_duration_secs",
                self.presentation.appear_duration_secs,
            ),
            (
                "presentation.background_dismiss_duration_secs",
                self.presentation.background_dismiss_duration_secs,
            ),
        ] {
            if !(value.is_finite() && value > 0.0) {
                errors.push(format!("{name} must be > 0, got {value}"));
            }
        }

        let opacity = self.presentation.backdrop_opacity;
        if !(0.0..=1.0).contains(&opacity) {
            errors.push(format!(
                "presentation.backdrop_opacity must be in [0, 1], got {opacity}"
            ));
        }

        errors
    }

    #[cfg(feature = "serde")]
    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Error loading a [`SheetConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "serde")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "serde")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "serde")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "serde")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "serde")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "serde")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
