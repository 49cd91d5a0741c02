//! Animating the shelf widgets toward their target bounds.
//!
//! One in-flight record covers both shelf widgets. Widget bounds are pushed
//! on every tick, but work-area insets go out only on commit: when an
//! animation runs to completion or when a layout is forced.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::geometry::{lerp_rect, Insets};

use super::bounds::TargetBounds;
use super::widget::{with_widget, WidgetHandle, WorkAreaObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    Idle,
    Animating,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    from: TargetBounds,
    to: TargetBounds,
    started: Instant,
}

/// Drives launcher and status widgets between [`TargetBounds`].
pub struct AnimationCoordinator {
    launcher: WidgetHandle,
    status: WidgetHandle,
    observer: Box<dyn WorkAreaObserver>,
    duration: Duration,
    /// Last bounds treated as final.
    committed: Option<TargetBounds>,
    /// Last bounds actually pushed to the widgets.
    applied: Option<TargetBounds>,
    in_flight: Option<InFlight>,
    published_insets: Option<Insets>,
}

impl AnimationCoordinator {
    pub fn new(
        launcher: WidgetHandle,
        status: WidgetHandle,
        observer: Box<dyn WorkAreaObserver>,
        duration: Duration,
    ) -> Self {
        Self {
            launcher,
            status,
            observer,
            duration,
            committed: None,
            applied: None,
            in_flight: None,
            published_insets: None,
        }
    }

    pub fn phase(&self) -> AnimationPhase {
        if self.in_flight.is_some() {
            AnimationPhase::Animating
        } else {
            AnimationPhase::Idle
        }
    }

    pub fn committed(&self) -> Option<TargetBounds> {
        self.committed
    }

    /// Bounds most recently pushed to the widgets.
    pub fn applied(&self) -> Option<TargetBounds> {
        self.applied
    }

    /// Insets most recently published to the observer.
    pub fn published_insets(&self) -> Option<Insets> {
        self.published_insets
    }

    /// Start animating toward `target`.
    ///
    /// Same target as the running animation is a no-op. A different target
    /// snaps the running animation to its end (committed without
    /// publishing) and starts over from there.
    pub fn animate_to(&mut self, target: TargetBounds, now: Instant) {
        if let Some(flight) = self.in_flight {
            if flight.to == target {
                trace!("animation already heading to target");
                return;
            }
            debug!("retargeting shelf animation");
            self.snap(flight.to);
        } else if self.committed == Some(target) {
            return;
        }

        let from = match self.applied.or(self.committed) {
            Some(from) if !self.duration.is_zero() => from,
            // Nothing on screen yet, or animations disabled.
            _ => {
                self.commit(target);
                return;
            }
        };

        self.in_flight = Some(InFlight {
            from,
            to: target,
            started: now,
        });
    }

    /// Advance the running animation. Returns `true` if it completed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(flight) = self.in_flight else {
            return false;
        };

        let elapsed = now.saturating_duration_since(flight.started);
        if elapsed >= self.duration {
            self.in_flight = None;
            self.commit(flight.to);
            return true;
        }

        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let frame = TargetBounds {
            launcher_bounds: lerp_rect(flight.from.launcher_bounds, flight.to.launcher_bounds, t),
            status_bounds: lerp_rect(flight.from.status_bounds, flight.to.status_bounds, t),
            // Insets never interpolate; they only change on commit.
            work_area_insets: flight.from.work_area_insets,
            opacity: flight.from.opacity + (flight.to.opacity - flight.from.opacity) * t as f32,
        };
        self.apply(frame);
        false
    }

    /// Stop any running animation and apply `target` synchronously,
    /// publishing its insets.
    pub fn layout_now(&mut self, target: TargetBounds) {
        if self.in_flight.take().is_some() {
            debug!("forced layout interrupted shelf animation");
        }
        self.commit(target);
    }

    fn snap(&mut self, to: TargetBounds) {
        self.in_flight = None;
        self.apply(to);
        self.committed = Some(to);
    }

    fn commit(&mut self, target: TargetBounds) {
        self.apply(target);
        self.committed = Some(target);
        trace!(insets = ?target.work_area_insets, "publishing work area insets");
        self.observer.on_work_area_insets_changed(target.work_area_insets);
        self.published_insets = Some(target.work_area_insets);
    }

    fn apply(&mut self, bounds: TargetBounds) {
        with_widget(&self.launcher, |w| {
            w.set_bounds(bounds.launcher_bounds);
            w.set_opacity(bounds.opacity);
        });
        with_widget(&self.status, |w| {
            w.set_bounds(bounds.status_bounds);
            w.set_opacity(bounds.opacity);
        });
        self.applied = Some(bounds);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::geometry::{Rect, Size};
    use crate::shelf::widget::ShelfWidget;

    #[derive(Debug, Default)]
    pub(crate) struct RecordingWidget {
        pub preferred: Size,
        pub bounds: Vec<Rect>,
        pub opacity: f32,
        pub background_alpha: u8,
    }

    impl ShelfWidget for RecordingWidget {
        fn preferred_size(&self) -> Size {
            self.preferred
        }

        fn set_bounds(&mut self, bounds: Rect) {
            self.bounds.push(bounds);
        }

        fn set_opacity(&mut self, opacity: f32) {
            self.opacity = opacity;
        }

        fn set_background_alpha(&mut self, alpha: u8) {
            self.background_alpha = alpha;
        }
    }

    /// Weak handle to a recording widget, unsized to the trait object.
    pub(crate) fn handle(widget: &Rc<RefCell<RecordingWidget>>) -> WidgetHandle {
        let widget: Rc<RefCell<dyn ShelfWidget>> = widget.clone();
        Rc::downgrade(&widget)
    }

    #[derive(Clone, Default)]
    pub(crate) struct InsetsLog(pub Rc<RefCell<Vec<Insets>>>);

    impl WorkAreaObserver for InsetsLog {
        fn on_work_area_insets_changed(&mut self, insets: Insets) {
            self.0.borrow_mut().push(insets);
        }
    }

    fn bounds(y: i32, inset: i32) -> TargetBounds {
        TargetBounds {
            launcher_bounds: Rect::new(0, y, 1024, 48),
            status_bounds: Rect::new(874, y, 150, 48),
            work_area_insets: Insets::new(0, 0, inset, 0),
            opacity: if inset > 0 { 1.0 } else { 0.0 },
        }
    }

    struct Fixture {
        coord: AnimationCoordinator,
        launcher: Rc<RefCell<RecordingWidget>>,
        _status: Rc<RefCell<RecordingWidget>>,
        log: InsetsLog,
    }

    fn setup() -> Fixture {
        let launcher = Rc::new(RefCell::new(RecordingWidget::default()));
        let status = Rc::new(RefCell::new(RecordingWidget::default()));
        let log = InsetsLog::default();
        let launcher_handle = handle(&launcher);
        let status_handle = handle(&status);
        let coord = AnimationCoordinator::new(
            launcher_handle,
            status_handle,
            Box::new(log.clone()),
            Duration::from_millis(200),
        );
        Fixture {
            coord,
            launcher,
            _status: status,
            log,
        }
    }

    #[test]
    fn test_first_target_commits_immediately() {
        let Fixture {
            mut coord,
            launcher,
            log,
            ..
        } = setup();
        coord.animate_to(bounds(720, 48), Instant::now());
        assert_eq!(coord.phase(), AnimationPhase::Idle);
        assert_eq!(launcher.borrow().bounds.last(), Some(&Rect::new(0, 720, 1024, 48)));
        assert_eq!(log.0.borrow().as_slice(), &[Insets::new(0, 0, 48, 0)]);
    }

    #[test]
    fn test_insets_publish_only_on_completion() {
        let Fixture {
            mut coord,
            launcher,
            log,
            ..
        } = setup();
        let start = Instant::now();
        coord.animate_to(bounds(720, 48), start);
        coord.animate_to(bounds(768, 0), start);
        assert_eq!(coord.phase(), AnimationPhase::Animating);

        assert!(!coord.tick(start + Duration::from_millis(100)));
        assert_eq!(launcher.borrow().bounds.last().map(|r| r.y), Some(744));
        assert_eq!(log.0.borrow().len(), 1);

        assert!(coord.tick(start + Duration::from_millis(200)));
        assert_eq!(coord.phase(), AnimationPhase::Idle);
        assert_eq!(log.0.borrow().last(), Some(&Insets::default()));
        assert_eq!(log.0.borrow().len(), 2);

        // Further ticks publish nothing.
        assert!(!coord.tick(start + Duration::from_millis(400)));
        assert_eq!(log.0.borrow().len(), 2);
    }

    #[test]
    fn test_same_target_while_animating_is_noop() {
        let mut coord = setup().coord;
        let start = Instant::now();
        coord.animate_to(bounds(720, 48), start);
        coord.animate_to(bounds(768, 0), start);
        coord.tick(start + Duration::from_millis(100));
        coord.animate_to(bounds(768, 0), start + Duration::from_millis(100));
        // Not restarted: completes on the original schedule.
        assert!(coord.tick(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_retarget_snaps_then_restarts() {
        let Fixture {
            mut coord,
            launcher,
            log,
            ..
        } = setup();
        let start = Instant::now();
        coord.animate_to(bounds(720, 48), start);
        coord.animate_to(bounds(768, 0), start);
        coord.tick(start + Duration::from_millis(50));

        let retarget = start + Duration::from_millis(60);
        coord.animate_to(bounds(765, 3), retarget);
        // Snapped to the interrupted target without publishing.
        assert_eq!(launcher.borrow().bounds.last().map(|r| r.y), Some(768));
        assert_eq!(coord.committed(), Some(bounds(768, 0)));
        assert_eq!(log.0.borrow().len(), 1);
        assert_eq!(coord.phase(), AnimationPhase::Animating);

        assert!(coord.tick(retarget + Duration::from_millis(200)));
        assert_eq!(log.0.borrow().last(), Some(&Insets::new(0, 0, 3, 0)));
    }

    #[test]
    fn test_layout_now_stops_animation() {
        let Fixture { mut coord, log, .. } = setup();
        let start = Instant::now();
        coord.animate_to(bounds(720, 48), start);
        coord.animate_to(bounds(768, 0), start);
        coord.layout_now(bounds(768, 0));
        assert_eq!(coord.phase(), AnimationPhase::Idle);
        assert_eq!(log.0.borrow().len(), 2);
        assert!(!coord.tick(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_dropped_widget_is_skipped() {
        let Fixture {
            mut coord,
            launcher,
            log,
            ..
        } = setup();
        drop(launcher);
        coord.animate_to(bounds(720, 48), Instant::now());
        assert_eq!(log.0.borrow().len(), 1);
    }
}
