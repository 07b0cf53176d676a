//! Page-space geometry
//!
//! All coordinates are absolute page coordinates in CSS pixels: the origin is
//! the top-left corner of the page, y grows downward, and scrolling does not
//! change them. Layout engines report rectangles in this space and pointer
//! positions are expected in it too.

use serde::{Deserialize, Serialize};

/// Rectangle (bounding box)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_ltrb(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }
}

/// Pointer position in page coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_includes_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 16.0);
        assert!(r.contains(10.0, 20.0));
        assert!(r.contains(110.0, 36.0));
        assert!(r.contains(50.0, 28.0));
        assert!(!r.contains(9.9, 28.0));
        assert!(!r.contains(50.0, 36.1));
    }

    #[test]
    fn test_from_ltrb_round_trips() {
        let r = Rect::from_ltrb(5.0, 8.0, 45.0, 24.0);
        assert_eq!(r.x, 5.0);
        assert_eq!(r.y, 8.0);
        assert_eq!(r.width, 40.0);
        assert_eq!(r.height, 16.0);
        assert_eq!(r.right(), 45.0);
        assert_eq!(r.bottom(), 24.0);
    }

    #[test]
    fn test_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_union_covers_both() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 10.0, 10.0);
        let u = a.union(&b);
        assert_eq!(u.x, 0.0);
        assert_eq!(u.y, 0.0);
        assert_eq!(u.right(), 30.0);
        assert_eq!(u.bottom(), 15.0);
    }
}
