//! Edge geometry.
//!
//! Distances are measured from the agent center to the edges of the display
//! frame. Left, right and bottom are skipped when a system-reserved region
//! sits on that side; the top edge is always a candidate.

use super::DockEdge;
use crate::geometry::{Display, Point, Size};
use crate::storage::MotionConfig;

/// Nearest qualifying edge within `threshold`, or `DockEdge::None`.
///
/// Degenerate displays and non-finite positions never qualify.
pub fn nearest_edge(display: &Display, center: Point, threshold: f64) -> DockEdge {
    if display.is_degenerate() || !center.is_finite() {
        return DockEdge::None;
    }
    let frame = &display.frame;
    let candidates = [
        (DockEdge::Left, (center.x - frame.min_x()).abs(), display.reserved_left()),
        (DockEdge::Right, (frame.max_x() - center.x).abs(), display.reserved_right()),
        (DockEdge::Bottom, (frame.max_y() - center.y).abs(), display.reserved_bottom()),
        (DockEdge::Top, (center.y - frame.min_y()).abs(), false),
    ];
    candidates
        .into_iter()
        .filter(|(_, distance, reserved)| !reserved && *distance < threshold)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(DockEdge::None, |(edge, _, _)| edge)
}

/// Origin that leaves roughly half the agent past `edge`.
///
/// Only the coordinate across the edge changes.
pub fn snap_origin(
    display: &Display,
    edge: DockEdge,
    origin: Point,
    size: Size,
    config: &MotionConfig,
) -> Point {
    let frame = &display.frame;
    let half_w = size.width / 2.0;
    let half_h = size.height / 2.0;
    match edge {
        DockEdge::None => origin,
        DockEdge::Left => Point::new(frame.min_x() - half_w + config.side_inset, origin.y),
        DockEdge::Right => Point::new(frame.max_x() - half_w - config.side_inset, origin.y),
        DockEdge::Bottom => Point::new(origin.x, frame.max_y() - half_h - config.vertical_inset),
        DockEdge::Top => Point::new(origin.x, frame.min_y() - half_h + config.vertical_inset),
    }
}

/// Bring a center that left the visible area back inside it, `inset` units
/// from the crossed side. `None` when the center is already visible.
pub fn push_back(display: &Display, origin: Point, size: Size, inset: f64) -> Option<Point> {
    let visible = &display.visible;
    let center = Point::new(origin.x + size.width / 2.0, origin.y + size.height / 2.0);
    if !center.is_finite() || visible.contains(center) {
        return None;
    }
    // min/max rather than clamp: a sliver of visible area may be narrower
    // than two insets.
    let x = center
        .x
        .max(visible.min_x() + inset)
        .min(visible.max_x() - inset);
    let y = center
        .y
        .max(visible.min_y() + inset)
        .min(visible.max_y() - inset);
    Some(Point::new(x - size.width / 2.0, y - size.height / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn screen() -> Display {
        Display::unobstructed(1, Rect::new(0.0, 0.0, 1920.0, 1080.0))
    }

    /// Taskbar along the bottom, menu bar along the top.
    fn screen_with_bars() -> Display {
        Display::new(
            1,
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(0.0, 25.0, 1920.0, 1015.0),
        )
    }

    #[test]
    fn picks_nearest_edge_under_threshold() {
        let d = screen();
        assert_eq!(nearest_edge(&d, Point::new(30.0, 500.0), 80.0), DockEdge::Left);
        assert_eq!(nearest_edge(&d, Point::new(1900.0, 500.0), 80.0), DockEdge::Right);
        assert_eq!(nearest_edge(&d, Point::new(900.0, 10.0), 80.0), DockEdge::Top);
        assert_eq!(nearest_edge(&d, Point::new(900.0, 1050.0), 80.0), DockEdge::Bottom);
        assert_eq!(nearest_edge(&d, Point::new(900.0, 500.0), 80.0), DockEdge::None);
        assert_eq!(nearest_edge(&d, Point::new(80.0, 500.0), 80.0), DockEdge::None);
    }

    #[test]
    fn corner_prefers_closer_edge() {
        let d = screen();
        assert_eq!(nearest_edge(&d, Point::new(10.0, 40.0), 80.0), DockEdge::Left);
        assert_eq!(nearest_edge(&d, Point::new(40.0, 10.0), 80.0), DockEdge::Top);
    }

    #[test]
    fn reserved_bottom_is_skipped_but_top_never_is() {
        let d = screen_with_bars();
        assert_eq!(nearest_edge(&d, Point::new(900.0, 1060.0), 80.0), DockEdge::None);
        assert_eq!(nearest_edge(&d, Point::new(900.0, 20.0), 80.0), DockEdge::Top);
    }

    #[test]
    fn reserved_side_falls_through_to_next_edge() {
        // Dock on the left side of the screen.
        let d = Display::new(
            1,
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(70.0, 0.0, 1850.0, 1080.0),
        );
        assert_eq!(nearest_edge(&d, Point::new(20.0, 500.0), 80.0), DockEdge::None);
        assert_eq!(nearest_edge(&d, Point::new(20.0, 50.0), 80.0), DockEdge::Top);
    }

    #[test]
    fn degenerate_geometry_never_docks() {
        let d = Display::unobstructed(1, Rect::new(0.0, 0.0, 0.0, 1080.0));
        assert_eq!(nearest_edge(&d, Point::new(0.0, 0.0), 80.0), DockEdge::None);
        assert_eq!(
            nearest_edge(&screen(), Point::new(f64::NAN, 10.0), 80.0),
            DockEdge::None
        );
    }

    #[test]
    fn snap_offsets_per_edge() {
        let d = screen();
        let c = MotionConfig::default();
        let size = Size::new(120.0, 120.0);
        let o = Point::new(500.0, 400.0);
        assert_eq!(snap_origin(&d, DockEdge::Left, o, size, &c), Point::new(-40.0, 400.0));
        assert_eq!(snap_origin(&d, DockEdge::Right, o, size, &c), Point::new(1840.0, 400.0));
        assert_eq!(snap_origin(&d, DockEdge::Bottom, o, size, &c), Point::new(500.0, 990.0));
        assert_eq!(snap_origin(&d, DockEdge::Top, o, size, &c), Point::new(500.0, -30.0));
        assert_eq!(snap_origin(&d, DockEdge::None, o, size, &c), o);
    }

    #[test]
    fn snapped_agent_stays_docked() {
        let d = screen();
        let c = MotionConfig::default();
        let size = Size::new(c.agent_width, c.agent_height);
        for edge in [DockEdge::Left, DockEdge::Right, DockEdge::Bottom, DockEdge::Top] {
            let o = snap_origin(&d, edge, Point::new(900.0, 500.0), size, &c);
            let center = Point::new(o.x + size.width / 2.0, o.y + size.height / 2.0);
            assert_eq!(nearest_edge(&d, center, c.dock_threshold), edge);
        }
    }

    #[test]
    fn push_back_recovers_lost_agent() {
        let d = screen_with_bars();
        let size = Size::new(120.0, 120.0);
        assert!(push_back(&d, Point::new(500.0, 500.0), size, 10.0).is_none());

        let p = push_back(&d, Point::new(2500.0, 500.0), size, 10.0).unwrap();
        assert_eq!(p, Point::new(1910.0 - 60.0, 500.0));

        let p = push_back(&d, Point::new(-500.0, -500.0), size, 10.0).unwrap();
        assert_eq!(p, Point::new(10.0 - 60.0, 35.0 - 60.0));
    }
}
