//! Axis-aligned rectangles in screen space
//!
//! Y grows downward: `top` is the smaller y, `bottom` the larger.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of size `w`x`h` whose bottom edge is centered on `anchor`
    pub fn from_midbottom(anchor: Vec2, w: f32, h: f32) -> Self {
        Self::new(anchor.x - w / 2.0, anchor.y - h, w, h)
    }

    /// Rectangle of size `w`x`h` centered on `center`
    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.y + self.h / 2.0)
    }

    /// Strict overlap test (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Point-in-rect test, exclusive on all edges
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x > self.left() && p.x < self.right() && p.y > self.top() && p.y < self.bottom()
    }

    /// Move horizontally so the center sits at `cx`
    pub fn set_center_x(&mut self, cx: f32) {
        self.x = cx - self.w / 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        // Shared edge is not an overlap
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_midbottom_anchor() {
        let r = Rect::from_midbottom(Vec2::new(50.0, 100.0), 20.0, 30.0);
        assert_eq!(r.bottom(), 100.0);
        assert_eq!(r.center_x(), 50.0);
        assert_eq!(r.top(), 70.0);
    }

    #[test]
    fn test_contains_point() {
        let r = Rect::new(10.0, 10.0, 50.0, 50.0);
        assert!(r.contains_point(Vec2::new(30.0, 30.0)));
        assert!(!r.contains_point(Vec2::new(10.0, 30.0)));
        assert!(!r.contains_point(Vec2::new(70.0, 30.0)));
    }
}
