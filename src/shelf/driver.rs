//! Async event loop feeding a [`ShelfLayoutManager`].
//!
//! The loop runs on the caller's task (the manager holds `Rc` widget
//! handles and is not `Send`), sleeping until either the next event or the
//! manager's next wakeup.

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::geometry::{Point, Rect};

use super::layout::ShelfLayoutManager;
use super::{Alignment, AutoHideBehavior};

/// Input events from the host environment.
#[derive(Debug, Clone, PartialEq)]
pub enum ShelfEvent {
    MouseMoved(Point),
    FocusChanged(bool),
    WindowStateChanged {
        fullscreen: bool,
        maximized: bool,
        suppress_fullscreen_hide: bool,
    },
    LockStateChanged {
        locked: bool,
        lock_window_visible: bool,
    },
    MenuStateChanged(bool),
    DragStateChanged(bool),
    ScreenResized(Rect),
    PreferredSizeChanged,
    SetAlignment(Alignment),
    SetAutoHideBehavior(AutoHideBehavior),
    /// Force a synchronous layout.
    Layout,
    Shutdown,
}

/// Current time on the tokio clock, so paused test time is honored.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Process events until [`ShelfEvent::Shutdown`] or the channel closes.
pub async fn run(manager: &mut ShelfLayoutManager, mut rx: mpsc::Receiver<ShelfEvent>) {
    loop {
        let wakeup = manager.next_wakeup(now());
        let sleep = async {
            match wakeup {
                Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    debug!("shelf event channel closed");
                    break;
                };
                if !handle_event(manager, event) {
                    break;
                }
            }
            _ = sleep => {
                trace!("shelf tick");
                manager.tick(now());
            }
        }
    }
}

/// Returns `false` on shutdown.
fn handle_event(manager: &mut ShelfLayoutManager, event: ShelfEvent) -> bool {
    let now = now();
    trace!(?event, "shelf event");
    match event {
        ShelfEvent::MouseMoved(p) => manager.on_mouse_moved(p, now),
        ShelfEvent::FocusChanged(focused) => manager.on_focus_changed(focused, now),
        ShelfEvent::WindowStateChanged {
            fullscreen,
            maximized,
            suppress_fullscreen_hide,
        } => manager.on_window_state_changed(fullscreen, maximized, suppress_fullscreen_hide, now),
        ShelfEvent::LockStateChanged {
            locked,
            lock_window_visible,
        } => manager.on_lock_state_changed(locked, lock_window_visible, now),
        ShelfEvent::MenuStateChanged(open) => manager.on_menu_state_changed(open, now),
        ShelfEvent::DragStateChanged(active) => manager.on_drag_state_changed(active, now),
        ShelfEvent::ScreenResized(screen) => manager.set_screen_bounds(screen, now),
        ShelfEvent::PreferredSizeChanged => manager.on_preferred_size_changed(now),
        ShelfEvent::SetAlignment(alignment) => manager.set_alignment(alignment, now),
        ShelfEvent::SetAutoHideBehavior(behavior) => manager.set_auto_hide_behavior(behavior, now),
        ShelfEvent::Layout => manager.layout_shelf(now),
        ShelfEvent::Shutdown => return false,
    }
    // Timers that came due while handling input fire on the next wakeup.
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use crate::config::ShelfConfig;
    use crate::geometry::{Insets, Size};
    use crate::shelf::animation::tests::{handle, InsetsLog, RecordingWidget};
    use crate::shelf::{AutoHideState, Visibility};

    fn manager(
        config: ShelfConfig,
    ) -> (
        ShelfLayoutManager,
        Rc<RefCell<RecordingWidget>>,
        Rc<RefCell<RecordingWidget>>,
        InsetsLog,
    ) {
        let launcher = Rc::new(RefCell::new(RecordingWidget {
            preferred: Size::new(500, 48),
            ..Default::default()
        }));
        let status = Rc::new(RefCell::new(RecordingWidget {
            preferred: Size::new(150, 48),
            ..Default::default()
        }));
        let log = InsetsLog::default();
        let launcher_handle = handle(&launcher);
        let status_handle = handle(&status);
        let manager = ShelfLayoutManager::new(
            &config,
            Rect::new(0, 0, 1024, 768),
            launcher_handle,
            status_handle,
            Box::new(log.clone()),
        );
        (manager, launcher, status, log)
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_commits_debounced_hide() {
        let config = ShelfConfig {
            auto_hide_behavior: AutoHideBehavior::Always,
            ..ShelfConfig::default()
        };
        let (mut manager, _launcher, _status, log) = manager(config);
        let (tx, rx) = mpsc::channel(16);

        let feed = async move {
            tx.send(ShelfEvent::FocusChanged(true)).await.unwrap();
            tx.send(ShelfEvent::Layout).await.unwrap();
            tx.send(ShelfEvent::FocusChanged(false)).await.unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
            tx.send(ShelfEvent::Shutdown).await.unwrap();
        };
        tokio::join!(run(&mut manager, rx), feed);

        assert_eq!(manager.state().visibility, Visibility::AutoHide);
        assert_eq!(manager.state().auto_hide_state, AutoHideState::Hidden);
        assert_eq!(log.0.borrow().last(), Some(&Insets::new(0, 0, 3, 0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_stops_when_channel_closes() {
        let (mut manager, launcher, _status, _log) = manager(ShelfConfig::default());
        let (tx, rx) = mpsc::channel(4);
        tx.send(ShelfEvent::Layout).await.unwrap();
        drop(tx);
        run(&mut manager, rx).await;
        assert_eq!(
            launcher.borrow().bounds.last(),
            Some(&Rect::new(0, 720, 1024, 48))
        );
    }
}
