//! Integer screen geometry shared by the shelf layout code.

use serde::{Deserialize, Serialize};

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair. Negative components are treated as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether `p` lies inside the rectangle (right/bottom edges exclusive).
    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Smallest rectangle containing both. An empty side is ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Space reserved along each screen edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Insets {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl Insets {
    pub const fn new(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.top == 0 && self.left == 0 && self.bottom == 0 && self.right == 0
    }
}

/// Linear interpolation between two integers, floored.
///
/// Both shelf widgets go through this with the same `t`, so adjacent edges
/// land on the same pixel.
pub(crate) fn lerp_floor(from: i32, to: i32, t: f64) -> i32 {
    let t = t.clamp(0.0, 1.0);
    (f64::from(from) + (f64::from(to) - f64::from(from)) * t).floor() as i32
}

pub(crate) fn lerp_rect(from: Rect, to: Rect, t: f64) -> Rect {
    Rect::new(
        lerp_floor(from.x, to.x, t),
        lerp_floor(from.y, to.y, t),
        lerp_floor(from.width, to.width, t),
        lerp_floor(from.height, to.height, t),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_half_open() {
        let r = Rect::new(0, 720, 1024, 48);
        assert!(r.contains(Point::new(0, 720)));
        assert!(r.contains(Point::new(1023, 767)));
        assert!(!r.contains(Point::new(1024, 767)));
        assert!(!r.contains(Point::new(10, 768)));
    }

    #[test]
    fn test_union_ignores_empty() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(a.union(&Rect::default()), a);
        assert_eq!(
            a.union(&Rect::new(20, 5, 5, 10)),
            Rect::new(0, 0, 25, 15)
        );
    }

    #[test]
    fn test_lerp_floor_endpoints() {
        assert_eq!(lerp_floor(720, 768, 0.0), 720);
        assert_eq!(lerp_floor(720, 768, 1.0), 768);
        assert_eq!(lerp_floor(768, 720, 0.5), 744);
        // Moving upward floors toward the smaller coordinate.
        assert_eq!(lerp_floor(768, 720, 0.01), 767);
    }
}
