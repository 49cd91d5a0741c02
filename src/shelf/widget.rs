//! Seams to the widget/view layer.

use std::cell::RefCell;
use std::rc::Weak;

use crate::geometry::{Insets, Rect, Size};

/// A shelf widget (launcher or status area) as seen by the layout code.
pub trait ShelfWidget {
    fn preferred_size(&self) -> Size;

    fn set_bounds(&mut self, bounds: Rect);

    fn set_opacity(&mut self, opacity: f32);

    /// Alpha of the painted shelf background, 0..=255.
    fn set_background_alpha(&mut self, _alpha: u8) {}
}

/// Non-owning handle to a widget. The widget layer owns the widget; a
/// failed upgrade means it was torn down and the update is skipped.
pub type WidgetHandle = Weak<RefCell<dyn ShelfWidget>>;

/// Receives the screen area reserved by the shelf.
pub trait WorkAreaObserver {
    fn on_work_area_insets_changed(&mut self, insets: Insets);
}

/// Apply `f` to the widget behind `handle` if it is still alive and not
/// already borrowed by the host.
///
/// Returns `false` when the update was skipped.
pub(crate) fn with_widget(handle: &WidgetHandle, f: impl FnOnce(&mut dyn ShelfWidget)) -> bool {
    let Some(widget) = handle.upgrade() else {
        tracing::trace!("shelf widget dropped, skipping update");
        return false;
    };
    let Ok(mut widget) = widget.try_borrow_mut() else {
        tracing::trace!("shelf widget busy, skipping update");
        return false;
    };
    f(&mut *widget);
    true
}
