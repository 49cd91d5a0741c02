//! Pure geometry for the shelf: where the launcher and status widgets go
//! and how much of the screen the shelf reserves.

use crate::geometry::{Insets, Rect, Size};

use super::{Alignment, AutoHideState, Visibility, AUTO_HIDE_SIZE};

/// Geometry the shelf is laid out (or animated) toward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetBounds {
    pub launcher_bounds: Rect,
    pub status_bounds: Rect,
    pub work_area_insets: Insets,
    pub opacity: f32,
}

/// Computes [`TargetBounds`]. Stateless apart from the strip thickness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsCalculator {
    auto_hide_size: i32,
}

impl Default for BoundsCalculator {
    fn default() -> Self {
        Self::new(AUTO_HIDE_SIZE)
    }
}

impl BoundsCalculator {
    pub fn new(auto_hide_size: i32) -> Self {
        Self {
            auto_hide_size: auto_hide_size.max(0),
        }
    }

    pub fn auto_hide_size(&self) -> i32 {
        self.auto_hide_size
    }

    /// Max of the two preferred sizes across the aligned axis.
    pub fn max_extent(alignment: Alignment, launcher: Size, status: Size) -> i32 {
        cross_axis(alignment, launcher).max(cross_axis(alignment, status))
    }

    pub fn compute(
        &self,
        screen: Rect,
        alignment: Alignment,
        visibility: Visibility,
        auto_hide_state: AutoHideState,
        launcher: Size,
        status: Size,
    ) -> TargetBounds {
        let extent = Self::max_extent(alignment, launcher, status);

        // How much of the shelf sits on screen; doubles as the inset.
        let (on_screen, opacity) = match (visibility, auto_hide_state) {
            (Visibility::Visible, _) | (Visibility::AutoHide, AutoHideState::Shown) => {
                (extent, 1.0)
            }
            (Visibility::AutoHide, AutoHideState::Hidden) => (self.auto_hide_size, 0.0),
            (Visibility::Hidden, _) => (0, 0.0),
        };

        let (launcher_bounds, status_bounds, work_area_insets) = match alignment {
            Alignment::Bottom => {
                let y = screen.bottom() - on_screen;
                let status_width = along_axis(alignment, status).min(screen.width);
                (
                    Rect::new(screen.x, y, screen.width, extent),
                    Rect::new(screen.right() - status_width, y, status_width, extent),
                    Insets::new(0, 0, on_screen, 0),
                )
            }
            Alignment::Left => {
                let x = screen.x - extent + on_screen;
                let status_height = along_axis(alignment, status).min(screen.height);
                (
                    Rect::new(x, screen.y, extent, screen.height),
                    Rect::new(x, screen.bottom() - status_height, extent, status_height),
                    Insets::new(0, on_screen, 0, 0),
                )
            }
            Alignment::Right => {
                let x = screen.right() - on_screen;
                let status_height = along_axis(alignment, status).min(screen.height);
                (
                    Rect::new(x, screen.y, extent, screen.height),
                    Rect::new(x, screen.bottom() - status_height, extent, status_height),
                    Insets::new(0, 0, 0, on_screen),
                )
            }
        };

        TargetBounds {
            launcher_bounds,
            status_bounds,
            work_area_insets,
            opacity,
        }
    }
}

fn cross_axis(alignment: Alignment, size: Size) -> i32 {
    let v = if alignment.is_vertical() {
        size.width
    } else {
        size.height
    };
    v.max(0)
}

fn along_axis(alignment: Alignment, size: Size) -> i32 {
    let v = if alignment.is_vertical() {
        size.height
    } else {
        size.width
    };
    v.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SCREEN: Rect = Rect::new(0, 0, 1024, 768);
    const LAUNCHER: Size = Size::new(500, 48);
    const STATUS: Size = Size::new(150, 48);

    fn compute(alignment: Alignment, visibility: Visibility, ahs: AutoHideState) -> TargetBounds {
        BoundsCalculator::default().compute(SCREEN, alignment, visibility, ahs, LAUNCHER, STATUS)
    }

    #[test]
    fn test_bottom_visible() {
        let b = compute(Alignment::Bottom, Visibility::Visible, AutoHideState::Shown);
        assert_eq!(b.launcher_bounds, Rect::new(0, 720, 1024, 48));
        assert_eq!(b.status_bounds, Rect::new(874, 720, 150, 48));
        assert_eq!(b.work_area_insets, Insets::new(0, 0, 48, 0));
        assert_eq!(b.opacity, 1.0);
    }

    #[test]
    fn test_bottom_hidden_is_off_screen() {
        let b = compute(Alignment::Bottom, Visibility::Hidden, AutoHideState::Shown);
        assert_eq!(b.launcher_bounds.y, 768);
        assert!(b.work_area_insets.is_empty());
        assert_eq!(b.opacity, 0.0);
    }

    #[test]
    fn test_auto_hide_hidden_leaves_strip() {
        let b = compute(Alignment::Bottom, Visibility::AutoHide, AutoHideState::Hidden);
        assert_eq!(b.launcher_bounds.y, 768 - AUTO_HIDE_SIZE);
        assert_eq!(b.work_area_insets.bottom, AUTO_HIDE_SIZE);

        let shown = compute(Alignment::Bottom, Visibility::AutoHide, AutoHideState::Shown);
        assert_eq!(shown.work_area_insets.bottom, 48);
    }

    #[test]
    fn test_left_and_right() {
        let launcher = Size::new(60, 400);
        let status = Size::new(40, 100);
        let calc = BoundsCalculator::default();

        let left = calc.compute(
            SCREEN,
            Alignment::Left,
            Visibility::Visible,
            AutoHideState::Shown,
            launcher,
            status,
        );
        assert_eq!(left.launcher_bounds, Rect::new(0, 0, 60, 768));
        assert_eq!(left.status_bounds, Rect::new(0, 668, 60, 100));
        assert_eq!(left.work_area_insets, Insets::new(0, 60, 0, 0));

        let right = calc.compute(
            SCREEN,
            Alignment::Right,
            Visibility::AutoHide,
            AutoHideState::Hidden,
            launcher,
            status,
        );
        assert_eq!(right.launcher_bounds.x, 1024 - AUTO_HIDE_SIZE);
        assert_eq!(right.work_area_insets, Insets::new(0, 0, 0, AUTO_HIDE_SIZE));

        let left_hidden = calc.compute(
            SCREEN,
            Alignment::Left,
            Visibility::Hidden,
            AutoHideState::Shown,
            launcher,
            status,
        );
        assert_eq!(left_hidden.launcher_bounds.right(), 0);
    }

    #[test]
    fn test_zero_and_negative_sizes_contribute_nothing() {
        let b = BoundsCalculator::default().compute(
            SCREEN,
            Alignment::Bottom,
            Visibility::Visible,
            AutoHideState::Shown,
            Size::new(500, 0),
            Size::new(-5, -10),
        );
        assert_eq!(b.launcher_bounds.height, 0);
        assert_eq!(b.status_bounds.width, 0);
        assert_eq!(b.status_bounds.x, 1024);
    }

    #[test]
    fn test_status_flush_with_launcher_edge() {
        for alignment in [Alignment::Bottom, Alignment::Left, Alignment::Right] {
            let b = compute(alignment, Visibility::Visible, AutoHideState::Shown);
            assert_eq!(b.status_bounds.right(), b.launcher_bounds.right());
            assert_eq!(b.status_bounds.bottom(), b.launcher_bounds.bottom());
        }
    }

    fn alignments() -> impl Strategy<Value = Alignment> {
        prop_oneof![
            Just(Alignment::Bottom),
            Just(Alignment::Left),
            Just(Alignment::Right)
        ]
    }

    fn states() -> impl Strategy<Value = (Visibility, AutoHideState)> {
        prop_oneof![
            Just((Visibility::Visible, AutoHideState::Shown)),
            Just((Visibility::Visible, AutoHideState::Hidden)),
            Just((Visibility::AutoHide, AutoHideState::Shown)),
            Just((Visibility::AutoHide, AutoHideState::Hidden)),
            Just((Visibility::Hidden, AutoHideState::Shown)),
            Just((Visibility::Hidden, AutoHideState::Hidden)),
        ]
    }

    proptest! {
        #[test]
        fn insets_are_zero_iff_hidden(
            alignment in alignments(),
            (visibility, ahs) in states(),
            lw in 1..600i32, lh in 1..120i32,
            sw in 1..300i32, sh in 1..120i32,
        ) {
            let b = BoundsCalculator::default().compute(
                SCREEN, alignment, visibility, ahs, Size::new(lw, lh), Size::new(sw, sh),
            );
            prop_assert_eq!(b.work_area_insets.is_empty(), visibility == Visibility::Hidden);
        }

        #[test]
        fn compute_is_referentially_transparent(
            alignment in alignments(),
            (visibility, ahs) in states(),
            lh in 0..120i32,
        ) {
            let calc = BoundsCalculator::default();
            let a = calc.compute(SCREEN, alignment, visibility, ahs, Size::new(300, lh), STATUS);
            let b = calc.compute(SCREEN, alignment, visibility, ahs, Size::new(300, lh), STATUS);
            prop_assert_eq!(a, b);
        }
    }
}
