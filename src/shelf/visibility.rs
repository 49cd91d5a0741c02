//! Deciding where the shelf should be from environment signals.

use std::time::{Duration, Instant};

use crate::geometry::{Point, Rect};

use super::{Alignment, AutoHideBehavior, AutoHideState, Visibility, AUTO_HIDE_SIZE};

/// Everything the decision engine looks at. The default value (no windows,
/// no cursor, nothing focused, unlocked) yields a visible shelf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilitySignals {
    pub behavior: AutoHideBehavior,
    pub screen_locked: bool,
    /// A visible window exists in the lock-screen container.
    pub lock_window_visible: bool,
    /// Some shown window is fullscreen.
    pub fullscreen_window: bool,
    /// The topmost (fullscreen) window asks to keep the shelf reachable:
    /// it gets auto-hide instead of a fully hidden shelf.
    pub suppress_fullscreen_hide: bool,
    /// Some shown window is maximized.
    pub maximized_window: bool,
    /// Last known cursor position, if any.
    pub cursor: Option<Point>,
    /// The shelf, status area or focus-cycler widget holds focus.
    pub shelf_has_focus: bool,
    /// A context menu or bubble anchored to the shelf is open.
    pub menu_open: bool,
    /// A drag is in progress over the shelf.
    pub drag_in_progress: bool,
}

/// Maps [`VisibilitySignals`] to a target visibility and auto-hide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityDecisionEngine {
    hover_thickness: i32,
}

impl Default for VisibilityDecisionEngine {
    fn default() -> Self {
        Self::new(AUTO_HIDE_SIZE)
    }
}

impl VisibilityDecisionEngine {
    pub fn new(hover_thickness: i32) -> Self {
        Self {
            hover_thickness: hover_thickness.max(1),
        }
    }

    /// Priority order, first match wins.
    pub fn target_visibility(&self, signals: &VisibilitySignals) -> Visibility {
        if signals.screen_locked && signals.lock_window_visible {
            return Visibility::Visible;
        }
        match signals.behavior {
            AutoHideBehavior::Never => return Visibility::Visible,
            AutoHideBehavior::Always => return Visibility::AutoHide,
            AutoHideBehavior::Default => {}
        }
        if signals.fullscreen_window {
            return if signals.suppress_fullscreen_hide {
                Visibility::AutoHide
            } else {
                Visibility::Hidden
            };
        }
        if signals.maximized_window {
            Visibility::AutoHide
        } else {
            Visibility::Visible
        }
    }

    /// Auto-hide sub-state, ignoring debounce.
    ///
    /// `shelf_bounds` is the area the shelf currently covers when shown;
    /// `current` decides whether the hover region is the whole shelf or
    /// just the edge strip.
    pub fn target_auto_hide_state(
        &self,
        signals: &VisibilitySignals,
        screen: Rect,
        alignment: Alignment,
        shelf_bounds: Rect,
        current: AutoHideState,
    ) -> AutoHideState {
        if signals.shelf_has_focus || signals.menu_open || signals.drag_in_progress {
            return AutoHideState::Shown;
        }
        let hover = self.hover_rect(screen, alignment, shelf_bounds, current);
        match signals.cursor {
            Some(p) if hover.contains(p) => AutoHideState::Shown,
            _ => AutoHideState::Hidden,
        }
    }

    /// Region in which the cursor keeps (or brings) the shelf up.
    pub fn hover_rect(
        &self,
        screen: Rect,
        alignment: Alignment,
        shelf_bounds: Rect,
        current: AutoHideState,
    ) -> Rect {
        if current == AutoHideState::Shown && !shelf_bounds.is_empty() {
            return shelf_bounds;
        }
        let t = self.hover_thickness;
        match alignment {
            Alignment::Bottom => Rect::new(screen.x, screen.bottom() - t, screen.width, t),
            Alignment::Left => Rect::new(screen.x, screen.y, t, screen.height),
            Alignment::Right => Rect::new(screen.right() - t, screen.y, t, screen.height),
        }
    }
}

/// Cancellable delay before an auto-hide HIDDEN transition is committed.
#[derive(Debug, Clone)]
pub struct AutoHideTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl AutoHideTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start the timer unless it is already running.
    pub fn arm(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + self.delay);
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect::new(0, 0, 1024, 768);
    const SHELF: Rect = Rect::new(0, 720, 1024, 48);

    #[test]
    fn test_no_signals_is_visible() {
        let engine = VisibilityDecisionEngine::default();
        assert_eq!(
            engine.target_visibility(&VisibilitySignals::default()),
            Visibility::Visible
        );
    }

    #[test]
    fn test_priority_order() {
        let engine = VisibilityDecisionEngine::default();
        let mut s = VisibilitySignals {
            behavior: AutoHideBehavior::Always,
            screen_locked: true,
            lock_window_visible: true,
            fullscreen_window: true,
            ..Default::default()
        };
        // Lock screen beats everything.
        assert_eq!(engine.target_visibility(&s), Visibility::Visible);

        s.lock_window_visible = false;
        assert_eq!(engine.target_visibility(&s), Visibility::AutoHide);

        s.behavior = AutoHideBehavior::Never;
        assert_eq!(engine.target_visibility(&s), Visibility::Visible);

        s.behavior = AutoHideBehavior::Default;
        assert_eq!(engine.target_visibility(&s), Visibility::Hidden);

        s.suppress_fullscreen_hide = true;
        assert_eq!(engine.target_visibility(&s), Visibility::AutoHide);

        s.fullscreen_window = false;
        s.maximized_window = true;
        assert_eq!(engine.target_visibility(&s), Visibility::AutoHide);

        s.maximized_window = false;
        assert_eq!(engine.target_visibility(&s), Visibility::Visible);
    }

    #[test]
    fn test_auto_hide_state_hover_regions() {
        let engine = VisibilityDecisionEngine::default();
        let mut s = VisibilitySignals {
            cursor: Some(Point::new(500, 740)),
            ..Default::default()
        };

        // Hidden: only the bottom strip counts.
        assert_eq!(
            engine.target_auto_hide_state(&s, SCREEN, Alignment::Bottom, SHELF, AutoHideState::Hidden),
            AutoHideState::Hidden
        );
        // Shown: the whole shelf counts.
        assert_eq!(
            engine.target_auto_hide_state(&s, SCREEN, Alignment::Bottom, SHELF, AutoHideState::Shown),
            AutoHideState::Shown
        );

        s.cursor = Some(Point::new(500, 767));
        assert_eq!(
            engine.target_auto_hide_state(&s, SCREEN, Alignment::Bottom, SHELF, AutoHideState::Hidden),
            AutoHideState::Shown
        );
    }

    #[test]
    fn test_focus_menu_drag_keep_shown() {
        let engine = VisibilityDecisionEngine::default();
        for s in [
            VisibilitySignals {
                shelf_has_focus: true,
                ..Default::default()
            },
            VisibilitySignals {
                menu_open: true,
                ..Default::default()
            },
            VisibilitySignals {
                drag_in_progress: true,
                ..Default::default()
            },
        ] {
            assert_eq!(
                engine.target_auto_hide_state(&s, SCREEN, Alignment::Left, SHELF, AutoHideState::Hidden),
                AutoHideState::Shown
            );
        }
    }

    #[test]
    fn test_hover_strip_per_alignment() {
        let engine = VisibilityDecisionEngine::new(5);
        assert_eq!(
            engine.hover_rect(SCREEN, Alignment::Left, SHELF, AutoHideState::Hidden),
            Rect::new(0, 0, 5, 768)
        );
        assert_eq!(
            engine.hover_rect(SCREEN, Alignment::Right, SHELF, AutoHideState::Hidden),
            Rect::new(1019, 0, 5, 768)
        );
    }

    #[test]
    fn test_timer_fires_once_and_cancels() {
        let start = Instant::now();
        let mut timer = AutoHideTimer::new(Duration::from_millis(200));
        timer.arm(start);
        // Re-arming does not push the deadline out.
        timer.arm(start + Duration::from_millis(100));
        assert_eq!(timer.deadline(), Some(start + Duration::from_millis(200)));

        assert!(!timer.poll(start + Duration::from_millis(199)));
        assert!(timer.poll(start + Duration::from_millis(200)));
        assert!(!timer.poll(start + Duration::from_millis(300)));

        timer.arm(start);
        timer.cancel();
        assert!(!timer.is_pending());
        assert!(!timer.poll(start + Duration::from_secs(1)));
    }
}
