//! # Visibility Windows
//!
//! Fades a container in while an external progress value (e.g. time of
//! day in [0, 1]) sits inside a window, and out otherwise.
//!
//! ```text
//!  alpha
//!  on  |        ______________
//!      |       /              \
//!  off |______/                \______
//!      +------|--------------|--------> progress
//!            min            max
//! ```
//!
//! The fade is an exponential approach: each frame closes
//! `min(dt / fade_time, 1)` of the remaining gap.

use backdrop_core::Container;
use serde::{Deserialize, Serialize};

use crate::config::Validate;
use crate::error::{EffectsError, EffectsResult};

/// A progress window with fade parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityWindow {
    /// Start of the visible window (inclusive).
    pub min_progress: f32,
    /// End of the visible window (inclusive).
    pub max_progress: f32,
    /// Seconds to close most of the gap to the target. Zero snaps.
    pub fade_time: f32,
    /// Alpha inside the window.
    pub on_alpha: f32,
    /// Alpha outside the window.
    pub off_alpha: f32,
}

impl Default for VisibilityWindow {
    fn default() -> Self {
        Self {
            min_progress: 0.0,
            max_progress: 1.0,
            fade_time: 0.1,
            on_alpha: 1.0,
            off_alpha: 0.0,
        }
    }
}

impl VisibilityWindow {
    /// A window over `[min_progress, max_progress]` with default fade.
    #[must_use]
    pub fn new(min_progress: f32, max_progress: f32) -> Self {
        Self {
            min_progress,
            max_progress,
            ..Self::default()
        }
    }

    /// Sets the fade time.
    #[must_use]
    pub const fn with_fade_time(mut self, fade_time: f32) -> Self {
        self.fade_time = fade_time;
        self
    }

    /// Sets the inside and outside alphas.
    #[must_use]
    pub const fn with_alphas(mut self, on_alpha: f32, off_alpha: f32) -> Self {
        self.on_alpha = on_alpha;
        self.off_alpha = off_alpha;
        self
    }

    /// Alpha a container starts from before its first step.
    pub const INITIAL_ALPHA: f32 = 0.0;

    /// Returns true when `progress` is inside the window.
    #[inline]
    #[must_use]
    pub fn contains(&self, progress: f32) -> bool {
        progress >= self.min_progress && progress <= self.max_progress
    }

    /// The alpha being approached at `progress`.
    #[inline]
    #[must_use]
    pub fn target_alpha(&self, progress: f32) -> f32 {
        if self.contains(progress) {
            self.on_alpha
        } else {
            self.off_alpha
        }
    }

    /// Moves `alpha` toward the target for `progress` over `dt` seconds.
    #[must_use]
    pub fn step(&self, alpha: f32, dt: f32, progress: f32) -> f32 {
        let mix = if self.fade_time > 0.0 {
            (dt / self.fade_time).min(1.0)
        } else {
            1.0
        };
        alpha + (self.target_alpha(progress) - alpha) * mix.max(0.0)
    }

    /// Steps a container's alpha in place.
    pub fn apply(&self, container: &mut Container, dt: f32, progress: f32) {
        container.alpha = self.step(container.alpha, dt, progress);
    }
}

impl Validate for VisibilityWindow {
    fn validate(&self) -> EffectsResult<()> {
        let values = [
            self.min_progress,
            self.max_progress,
            self.fade_time,
            self.on_alpha,
            self.off_alpha,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(EffectsError::InvalidConfig(format!(
                "visibility window {self:?} has a non-finite value"
            )));
        }
        if self.fade_time < 0.0 {
            return Err(EffectsError::InvalidConfig(format!(
                "fade_time {} must be non-negative",
                self.fade_time
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_alpha() {
        let window = VisibilityWindow::new(0.5, 1.0).with_alphas(1.0, 0.2);
        assert_eq!(window.target_alpha(0.25), 0.2);
        assert_eq!(window.target_alpha(0.5), 1.0);
        assert_eq!(window.target_alpha(1.0), 1.0);
    }

    #[test]
    fn test_fade_is_gradual() {
        let window = VisibilityWindow::new(0.0, 1.0).with_fade_time(0.5);
        let alpha = window.step(VisibilityWindow::INITIAL_ALPHA, 0.1, 0.5);
        assert!((alpha - 0.2).abs() < 1e-6);
        let alpha = window.step(alpha, 0.1, 0.5);
        assert!((alpha - 0.36).abs() < 1e-6);
    }

    #[test]
    fn test_long_frame_snaps() {
        let window = VisibilityWindow::new(0.6, 1.0).with_fade_time(0.5);
        assert_eq!(window.step(0.3, 2.0, 0.8), 1.0);
        assert_eq!(window.step(0.3, 2.0, 0.1), 0.0);
    }

    #[test]
    fn test_zero_fade_time_snaps() {
        let window = VisibilityWindow::new(0.0, 0.5).with_fade_time(0.0);
        assert_eq!(window.step(0.0, 0.0, 0.25), 1.0);
    }

    #[test]
    fn test_apply_to_container() {
        let window = VisibilityWindow::new(0.0, 1.0).with_fade_time(1.0);
        let mut container = Container::new();
        container.alpha = VisibilityWindow::INITIAL_ALPHA;
        for _ in 0..200 {
            window.apply(&mut container, 0.05, 0.5);
        }
        assert!(container.alpha > 0.99);
    }

    #[test]
    fn test_validate() {
        assert!(VisibilityWindow::default().validate().is_ok());
        assert!(VisibilityWindow::default().with_fade_time(-1.0).validate().is_err());
        assert!(VisibilityWindow::new(f32::NAN, 1.0).validate().is_err());
    }
}
