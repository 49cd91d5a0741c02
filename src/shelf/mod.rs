//! Shelf visibility and layout.
//!
//! # Architecture
//!
//! ```text
//! ShelfLayoutManager
//! ├── state: ShelfState (committed visibility, auto-hide state, alignment)
//! ├── engine: VisibilityDecisionEngine (signals -> target state)
//! ├── auto_hide_timer: AutoHideTimer (debounces SHOWN -> HIDDEN)
//! ├── calculator: BoundsCalculator (state -> TargetBounds)
//! ├── animator: AnimationCoordinator (current bounds -> target bounds)
//! └── background: BackgroundAnimator (background alpha)
//! ```
//!
//! Input events update `VisibilitySignals`; the manager asks the engine for
//! a target state, flips the logical state immediately, and hands the new
//! geometry to the coordinator. Work-area insets are published only when
//! an animation completes or a layout is forced.

pub mod animation;
pub mod background;
pub mod bounds;
pub mod driver;
mod layout;
pub mod visibility;
mod widget;

use serde::{Deserialize, Serialize};

pub use animation::{AnimationCoordinator, AnimationPhase};
pub use background::BackgroundAnimator;
pub use bounds::{BoundsCalculator, TargetBounds};
pub use driver::ShelfEvent;
pub use layout::ShelfLayoutManager;
pub use visibility::{AutoHideTimer, VisibilityDecisionEngine, VisibilitySignals};
pub use widget::{ShelfWidget, WidgetHandle, WorkAreaObserver};

/// Thickness of the strip left on screen while auto-hidden.
pub const AUTO_HIDE_SIZE: i32 = 3;

/// Committed shelf visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Visible,
    AutoHide,
    Hidden,
}

/// Sub-state of [`Visibility::AutoHide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoHideState {
    #[default]
    Shown,
    Hidden,
}

/// Screen edge the shelf is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Bottom,
    Left,
    Right,
}

impl Alignment {
    /// Whether the shelf runs along a vertical edge.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Alignment::Left | Alignment::Right)
    }
}

/// User-selected auto-hide behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoHideBehavior {
    /// Always auto-hide.
    Always,
    /// Never auto-hide.
    Never,
    /// Auto-hide only while a window is maximized.
    #[default]
    Default,
}

/// The shelf's committed state. Owned by [`ShelfLayoutManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShelfState {
    pub visibility: Visibility,
    /// Only meaningful while `visibility == AutoHide`.
    pub auto_hide_state: AutoHideState,
    pub alignment: Alignment,
    /// Max extent of the launcher and status widgets across the aligned
    /// axis. Never negative.
    pub max_height: i32,
}

impl ShelfState {
    /// Whether the shelf currently occupies its full extent on screen.
    pub fn is_shown(&self) -> bool {
        match self.visibility {
            Visibility::Visible => true,
            Visibility::AutoHide => self.auto_hide_state == AutoHideState::Shown,
            Visibility::Hidden => false,
        }
    }
}
