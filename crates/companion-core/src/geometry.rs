//! Screen geometry shared by the motion controller and the presentation sink.
//!
//! Coordinates follow the usual desktop convention: the origin is the
//! top-left corner of the virtual screen and `y` grows downward, so the
//! "top" edge of a display is `min_y` and the "bottom" edge is `max_y`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// A rectangle is usable for geometry only when it has a finite,
    /// strictly positive area.
    pub fn has_area(&self) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.x.is_finite()
            && self.y.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Inclusive containment.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// Shrink by `margin` on every side. Returns `None` when nothing is left.
    pub fn inset(&self, margin: f64) -> Option<Rect> {
        let width = self.width - 2.0 * margin;
        let height = self.height - 2.0 * margin;
        if width < 0.0 || height < 0.0 {
            return None;
        }
        Some(Rect::new(self.x + margin, self.y + margin, width, height))
    }

    /// Euclidean distance from `p` to the rectangle (zero when inside).
    pub fn distance_to(&self, p: Point) -> f64 {
        let dx = (self.min_x() - p.x).max(0.0).max(p.x - self.max_x());
        let dy = (self.min_y() - p.y).max(0.0).max(p.y - self.max_y());
        dx.hypot(dy)
    }
}

/// One physical display: its full frame and the area left visible once
/// system-reserved regions (taskbar, dock, menu bar) are removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub id: u32,
    pub frame: Rect,
    pub visible: Rect,
}

impl Display {
    pub fn new(id: u32, frame: Rect, visible: Rect) -> Self {
        Self { id, frame, visible }
    }

    /// A display without reserved regions.
    pub fn unobstructed(id: u32, frame: Rect) -> Self {
        Self {
            id,
            frame,
            visible: frame,
        }
    }

    pub fn reserved_left(&self) -> bool {
        self.visible.min_x() > self.frame.min_x()
    }

    pub fn reserved_right(&self) -> bool {
        self.visible.max_x() < self.frame.max_x()
    }

    pub fn reserved_bottom(&self) -> bool {
        self.visible.max_y() < self.frame.max_y()
    }

    pub fn is_degenerate(&self) -> bool {
        !self.frame.has_area() || !self.visible.has_area()
    }
}

/// Pick the display the agent belongs to: the one whose frame contains
/// `center`, otherwise the nearest one.
pub fn active_display(displays: &[Display], center: Point) -> Option<&Display> {
    if let Some(d) = displays.iter().find(|d| d.frame.contains(center)) {
        return Some(d);
    }
    displays.iter().min_by(|a, b| {
        a.frame
            .distance_to(center)
            .total_cmp(&b.frame.distance_to(center))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_rejects_oversized_margin() {
        let r = Rect::new(0.0, 0.0, 200.0, 100.0);
        assert!(r.inset(60.0).is_none());
        let inner = r.inset(50.0).unwrap();
        assert_eq!(inner, Rect::new(50.0, 50.0, 100.0, 0.0));
    }

    #[test]
    fn reserved_regions_follow_visible_frame() {
        let d = Display::new(
            1,
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(0.0, 25.0, 1920.0, 1000.0),
        );
        assert!(!d.reserved_left());
        assert!(!d.reserved_right());
        assert!(d.reserved_bottom());
    }

    #[test]
    fn active_display_prefers_containing_frame() {
        let displays = vec![
            Display::unobstructed(1, Rect::new(0.0, 0.0, 1000.0, 800.0)),
            Display::unobstructed(2, Rect::new(1000.0, 0.0, 1000.0, 800.0)),
        ];
        assert_eq!(active_display(&displays, Point::new(1500.0, 10.0)).unwrap().id, 2);
        // Off every frame: nearest wins.
        assert_eq!(active_display(&displays, Point::new(2100.0, 10.0)).unwrap().id, 2);
        assert_eq!(active_display(&displays, Point::new(-50.0, 10.0)).unwrap().id, 1);
        assert!(active_display(&[], Point::default()).is_none());
    }

    #[test]
    fn zero_area_is_degenerate() {
        let d = Display::unobstructed(1, Rect::new(0.0, 0.0, 0.0, 800.0));
        assert!(d.is_degenerate());
    }
}
