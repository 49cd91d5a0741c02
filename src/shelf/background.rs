//! Fading the shelf background in and out.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::geometry::lerp_floor;

use super::widget::{with_widget, WidgetHandle};

/// Animates the painted background alpha of the launcher widget.
pub struct BackgroundAnimator {
    widget: WidgetHandle,
    max_alpha: u8,
    duration: Duration,
    paints_background: bool,
    alpha: u8,
    /// (start alpha, start time) of a running fade.
    fade: Option<(u8, Instant)>,
}

impl BackgroundAnimator {
    pub fn new(widget: WidgetHandle, max_alpha: u8, duration: Duration) -> Self {
        Self {
            widget,
            max_alpha,
            duration,
            paints_background: false,
            alpha: 0,
            fade: None,
        }
    }

    pub fn paints_background(&self) -> bool {
        self.paints_background
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn is_animating(&self) -> bool {
        self.fade.is_some()
    }

    fn target_alpha(&self) -> u8 {
        if self.paints_background {
            self.max_alpha
        } else {
            0
        }
    }

    /// Turn the background on or off, fading from the current alpha.
    pub fn set_paints_background(&mut self, value: bool, now: Instant) {
        if self.paints_background == value {
            return;
        }
        trace!(paints = value, "shelf background");
        self.paints_background = value;
        if self.duration.is_zero() {
            self.fade = None;
            self.push(self.target_alpha());
        } else {
            self.fade = Some((self.alpha, now));
        }
    }

    /// Advance a running fade. Returns `true` when it finished on this tick.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some((start_alpha, started)) = self.fade else {
            return false;
        };
        let elapsed = now.saturating_duration_since(started);
        if elapsed >= self.duration {
            self.fade = None;
            self.push(self.target_alpha());
            return true;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let alpha = lerp_floor(i32::from(start_alpha), i32::from(self.target_alpha()), t);
        self.push(alpha.clamp(0, 255) as u8);
        false
    }

    fn push(&mut self, alpha: u8) {
        self.alpha = alpha;
        with_widget(&self.widget, |w| w.set_background_alpha(alpha));
    }
}
