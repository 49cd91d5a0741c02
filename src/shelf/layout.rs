//! The shelf layout manager: the single owner of [`ShelfState`].

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::ShelfConfig;
use crate::geometry::{Insets, Point, Rect, Size};

use super::animation::{AnimationCoordinator, AnimationPhase};
use super::background::BackgroundAnimator;
use super::bounds::{BoundsCalculator, TargetBounds};
use super::visibility::{AutoHideTimer, VisibilityDecisionEngine, VisibilitySignals};
use super::widget::{WidgetHandle, WorkAreaObserver};
use super::{Alignment, AutoHideBehavior, AutoHideState, ShelfState, Visibility};

/// How often the driver ticks while something is animating.
pub(crate) const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Owns the shelf state and turns input events into layout.
///
/// Call [`layout_shelf`](Self::layout_shelf) once the widgets exist; after
/// that every event entry point re-evaluates visibility, and
/// [`tick`](Self::tick) must be called at [`next_wakeup`](Self::next_wakeup).
pub struct ShelfLayoutManager {
    state: ShelfState,
    signals: VisibilitySignals,
    screen: Rect,
    launcher: WidgetHandle,
    status: WidgetHandle,
    launcher_size: Size,
    status_size: Size,
    engine: VisibilityDecisionEngine,
    calculator: BoundsCalculator,
    auto_hide_timer: AutoHideTimer,
    animator: AnimationCoordinator,
    background: BackgroundAnimator,
}

impl ShelfLayoutManager {
    pub fn new(
        config: &ShelfConfig,
        screen: Rect,
        launcher: WidgetHandle,
        status: WidgetHandle,
        observer: Box<dyn WorkAreaObserver>,
    ) -> Self {
        let animator = AnimationCoordinator::new(
            launcher.clone(),
            status.clone(),
            observer,
            config.animation_duration(),
        );
        let background = BackgroundAnimator::new(
            launcher.clone(),
            config.background_alpha,
            config.background_duration(),
        );
        let mut manager = Self {
            state: ShelfState {
                alignment: config.alignment,
                ..ShelfState::default()
            },
            signals: VisibilitySignals {
                behavior: config.auto_hide_behavior,
                ..VisibilitySignals::default()
            },
            screen,
            launcher,
            status,
            launcher_size: Size::default(),
            status_size: Size::default(),
            engine: VisibilityDecisionEngine::new(config.hover_thickness),
            calculator: BoundsCalculator::new(config.auto_hide_size),
            auto_hide_timer: AutoHideTimer::new(config.auto_hide_delay()),
            animator,
            background,
        };
        manager.refresh_preferred_sizes();
        manager
    }

    pub fn state(&self) -> ShelfState {
        self.state
    }

    pub fn signals(&self) -> &VisibilitySignals {
        &self.signals
    }

    pub fn screen_bounds(&self) -> Rect {
        self.screen
    }

    /// Geometry for the current logical state.
    pub fn target_bounds(&self) -> TargetBounds {
        self.bounds_for(self.state.visibility, self.state.auto_hide_state)
    }

    /// Insets last published to the work-area observer.
    pub fn work_area_insets(&self) -> Option<Insets> {
        self.animator.published_insets()
    }

    pub fn animation_phase(&self) -> AnimationPhase {
        self.animator.phase()
    }

    pub fn auto_hide_timer(&self) -> &AutoHideTimer {
        &self.auto_hide_timer
    }

    pub fn background(&self) -> &BackgroundAnimator {
        &self.background
    }

    pub fn on_mouse_moved(&mut self, position: Point, now: Instant) {
        self.signals.cursor = Some(position);
        self.update_visibility(now);
    }

    pub fn on_focus_changed(&mut self, shelf_has_focus: bool, now: Instant) {
        self.signals.shelf_has_focus = shelf_has_focus;
        self.update_visibility(now);
    }

    pub fn on_window_state_changed(
        &mut self,
        fullscreen: bool,
        maximized: bool,
        suppress_fullscreen_hide: bool,
        now: Instant,
    ) {
        self.signals.fullscreen_window = fullscreen;
        self.signals.maximized_window = maximized;
        self.signals.suppress_fullscreen_hide = suppress_fullscreen_hide;
        self.update_visibility(now);
    }

    pub fn on_lock_state_changed(&mut self, locked: bool, lock_window_visible: bool, now: Instant) {
        self.signals.screen_locked = locked;
        self.signals.lock_window_visible = lock_window_visible;
        self.update_visibility(now);
    }

    pub fn on_menu_state_changed(&mut self, open: bool, now: Instant) {
        self.signals.menu_open = open;
        self.update_visibility(now);
    }

    pub fn on_drag_state_changed(&mut self, in_progress: bool, now: Instant) {
        self.signals.drag_in_progress = in_progress;
        self.update_visibility(now);
    }

    pub fn set_auto_hide_behavior(&mut self, behavior: AutoHideBehavior, now: Instant) {
        if self.signals.behavior == behavior {
            return;
        }
        self.signals.behavior = behavior;
        self.update_visibility(now);
    }

    pub fn set_alignment(&mut self, alignment: Alignment, now: Instant) {
        if self.state.alignment == alignment {
            return;
        }
        self.state.alignment = alignment;
        self.layout_shelf(now);
        self.update_visibility(now);
    }

    pub fn set_screen_bounds(&mut self, screen: Rect, now: Instant) {
        self.screen = screen;
        self.layout_shelf(now);
    }

    /// A shelf widget changed its preferred size.
    pub fn on_preferred_size_changed(&mut self, now: Instant) {
        self.refresh_preferred_sizes();
        self.layout_shelf(now);
    }

    /// Forced synchronous layout: stops any animation and applies the
    /// current state's bounds immediately.
    pub fn layout_shelf(&mut self, now: Instant) {
        self.refresh_preferred_sizes();
        let target = self.target_bounds();
        self.animator.layout_now(target);
        self.update_background(now);
    }

    /// Re-derive the target state from the current signals.
    pub fn update_visibility(&mut self, now: Instant) {
        let visibility = self.engine.target_visibility(&self.signals);

        let auto_hide_state = if visibility == Visibility::AutoHide {
            let desired = self.desired_auto_hide_state();
            if self.state.visibility != Visibility::AutoHide {
                self.auto_hide_timer.cancel();
                desired
            } else {
                match desired {
                    AutoHideState::Shown => {
                        self.auto_hide_timer.cancel();
                        AutoHideState::Shown
                    }
                    AutoHideState::Hidden if self.state.auto_hide_state == AutoHideState::Shown => {
                        // Hold SHOWN until the cursor has settled away.
                        self.auto_hide_timer.arm(now);
                        AutoHideState::Shown
                    }
                    AutoHideState::Hidden => AutoHideState::Hidden,
                }
            }
        } else {
            self.auto_hide_timer.cancel();
            self.state.auto_hide_state
        };

        self.set_state(visibility, auto_hide_state, now);
    }

    /// Advance timers and animations.
    pub fn tick(&mut self, now: Instant) {
        if self.auto_hide_timer.poll(now) {
            self.on_auto_hide_timer_fired(now);
        }
        self.animator.tick(now);
        self.background.tick(now);
    }

    /// When [`tick`](Self::tick) next needs to run, if at all.
    pub fn next_wakeup(&self, now: Instant) -> Option<Instant> {
        let frame = (self.animator.phase() == AnimationPhase::Animating
            || self.background.is_animating())
        .then(|| now + FRAME_INTERVAL);
        match (frame, self.auto_hide_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn on_auto_hide_timer_fired(&mut self, now: Instant) {
        if self.state.visibility != Visibility::AutoHide {
            return;
        }
        if self.desired_auto_hide_state() == AutoHideState::Hidden {
            self.set_state(Visibility::AutoHide, AutoHideState::Hidden, now);
        }
    }

    fn desired_auto_hide_state(&self) -> AutoHideState {
        let shown = self.bounds_for(Visibility::Visible, AutoHideState::Shown);
        self.engine.target_auto_hide_state(
            &self.signals,
            self.screen,
            self.state.alignment,
            shown.launcher_bounds.union(&shown.status_bounds),
            self.state.auto_hide_state,
        )
    }

    fn set_state(&mut self, visibility: Visibility, auto_hide_state: AutoHideState, now: Instant) {
        if self.state.visibility == visibility && self.state.auto_hide_state == auto_hide_state {
            return;
        }
        debug!(
            from = ?self.state.visibility,
            to = ?visibility,
            auto_hide = ?auto_hide_state,
            "shelf state change"
        );
        // The logical state flips now; widgets catch up through the animator.
        self.state.visibility = visibility;
        self.state.auto_hide_state = auto_hide_state;
        let target = self.target_bounds();
        self.animator.animate_to(target, now);
        self.update_background(now);
    }

    fn update_background(&mut self, now: Instant) {
        let paints = self.state.visibility == Visibility::AutoHide || self.signals.maximized_window;
        self.background.set_paints_background(paints, now);
    }

    fn bounds_for(&self, visibility: Visibility, auto_hide_state: AutoHideState) -> TargetBounds {
        self.calculator.compute(
            self.screen,
            self.state.alignment,
            visibility,
            auto_hide_state,
            self.launcher_size,
            self.status_size,
        )
    }

    fn refresh_preferred_sizes(&mut self) {
        if let Some(w) = self.launcher.upgrade() {
            self.launcher_size = w.borrow().preferred_size();
        }
        if let Some(w) = self.status.upgrade() {
            self.status_size = w.borrow().preferred_size();
        }
        let max_height =
            BoundsCalculator::max_extent(self.state.alignment, self.launcher_size, self.status_size);
        if max_height != self.state.max_height {
            trace!(max_height, "shelf max height changed");
            self.state.max_height = max_height;
        }
    }
}
