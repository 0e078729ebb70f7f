//! Unit tests for the geometry kernel

use std::f64::consts::{FRAC_PI_2, PI};

use crate::geometry::{
    arc_contains_point, arrow_head, circle_from_three_points, circle_from_three_points_checked,
    closest_point_on_circle, normalize_angle, normalize_arc_range, ring_contains_point, segment_contains_point,
    snap_right_angle, snap_to_zero, Circle, Point, RIGHT_ANGLE_SNAP,
};

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_circle_from_three_points() {
    let circle = circle_from_three_points(
        Point::new(1.0, 0.0),
        Point::new(0.0, 1.0),
        Point::new(-1.0, 0.0),
    );
    assert!(approx_eq(circle.center.x, 0.0));
    assert!(approx_eq(circle.center.y, 0.0));
    assert!(approx_eq(circle.radius, 1.0));

    let circle = circle_from_three_points(
        Point::new(15.0, 10.0),
        Point::new(10.0, 15.0),
        Point::new(5.0, 10.0),
    );
    assert!(approx_eq(circle.center.x, 10.0));
    assert!(approx_eq(circle.center.y, 10.0));
    assert!(approx_eq(circle.radius, 5.0));
}

#[test]
fn test_collinear_points_are_degenerate() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(10.0, 0.0);
    let c = Point::new(5.0, 0.0);
    assert!(!circle_from_three_points(a, b, c).is_finite());
    assert!(circle_from_three_points_checked(a, b, c).is_none());
    assert!(circle_from_three_points_checked(a, b, Point::new(5.0, 3.0)).is_some());
}

#[test]
fn test_closest_point_on_circle() {
    let p = closest_point_on_circle(Point::new(0.0, 0.0), 30.0, Point::new(100.0, 0.0));
    assert!(approx_eq(p.x, 30.0));
    assert!(approx_eq(p.y, 0.0));

    let p = closest_point_on_circle(Point::new(10.0, 10.0), 5.0, Point::new(10.0, -50.0));
    assert!(approx_eq(p.x, 10.0));
    assert!(approx_eq(p.y, 5.0));

    // No direction: falls back to a finite boundary point
    let p = closest_point_on_circle(Point::new(10.0, 10.0), 5.0, Point::new(10.0, 10.0));
    assert!(p.x.is_finite() && p.y.is_finite());
}

#[test]
fn test_segment_hit_testing() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(100.0, 0.0);
    assert!(segment_contains_point(a, b, Point::new(50.0, 5.0), 6.0));
    assert!(segment_contains_point(a, b, Point::new(50.0, -5.0), 6.0));
    assert!(!segment_contains_point(a, b, Point::new(50.0, 7.0), 6.0));
    // Beyond the ends
    assert!(!segment_contains_point(a, b, Point::new(-1.0, 0.0), 6.0));
    assert!(!segment_contains_point(a, b, Point::new(101.0, 0.0), 6.0));
    // Zero-length segment never matches
    assert!(!segment_contains_point(a, a, a, 6.0));
}

#[test]
fn test_arc_hit_testing() {
    let circle = Circle {
        center: Point::new(0.0, 0.0),
        radius: 50.0,
    };
    // Clockwise (canvas) arc from 0 to π/2: the lower right quarter in screen space
    assert!(arc_contains_point(circle, 0.0, FRAC_PI_2, false, circle.point_at(PI / 4.0), 6.0));
    assert!(!arc_contains_point(circle, 0.0, FRAC_PI_2, false, circle.point_at(PI), 6.0));
    // Reversed arc covers the complement
    assert!(arc_contains_point(circle, 0.0, FRAC_PI_2, true, circle.point_at(PI), 6.0));
    assert!(!arc_contains_point(circle, 0.0, FRAC_PI_2, true, circle.point_at(PI / 4.0), 6.0));
    // Off the ring
    assert!(!arc_contains_point(circle, 0.0, FRAC_PI_2, false, Point::new(10.0, 10.0), 6.0));
}

#[test]
fn test_arc_range_wraps_across_pi() {
    let circle = Circle {
        center: Point::new(0.0, 0.0),
        radius: 20.0,
    };
    // Range from 3π/4 to -3π/4 passes through π
    let start = 3.0 * PI / 4.0;
    let end = -3.0 * PI / 4.0;
    let (s, e) = normalize_arc_range(start, end, false);
    assert!(e > s);
    assert!(arc_contains_point(circle, start, end, false, circle.point_at(PI), 6.0));
    assert!(arc_contains_point(circle, start, end, false, circle.point_at(-0.9 * PI), 6.0));
    assert!(!arc_contains_point(circle, start, end, false, circle.point_at(0.0), 6.0));
}

#[test]
fn test_ring_hit_testing() {
    let circle = Circle {
        center: Point::new(5.0, 5.0),
        radius: 10.0,
    };
    assert!(ring_contains_point(circle, Point::new(15.0, 5.0), 6.0));
    assert!(!ring_contains_point(circle, Point::new(5.0, 5.0), 6.0));
}

#[test]
fn test_snap_right_angle() {
    assert!(approx_eq(snap_right_angle(FRAC_PI_2 + 0.05, RIGHT_ANGLE_SNAP), FRAC_PI_2));
    assert!(approx_eq(snap_right_angle(0.3, RIGHT_ANGLE_SNAP), 0.3));
    assert!(approx_eq(snap_right_angle(-0.05, RIGHT_ANGLE_SNAP), 0.0));
    // Wrapped into (-π, π]
    assert!(approx_eq(snap_right_angle(-PI, RIGHT_ANGLE_SNAP), PI));
    assert!(approx_eq(snap_right_angle(1.5 * PI + 0.3, RIGHT_ANGLE_SNAP), -0.5 * PI + 0.3));
}

#[test]
fn test_normalize_angle() {
    assert!(approx_eq(normalize_angle(2.5 * PI), FRAC_PI_2));
    assert!(approx_eq(normalize_angle(-FRAC_PI_2), -FRAC_PI_2));
    assert!(approx_eq(normalize_angle(7.0), 7.0 - 2.0 * PI));
    assert!(normalize_angle(1e12).abs() <= PI);
}

#[test]
fn test_normalize_angle_keeps_in_range_values_exact() {
    for angle in [-0.1, -3.0, 0.0, 2.9, PI] {
        assert_eq!(normalize_angle(angle), angle);
    }
    assert_eq!(normalize_angle(-PI), PI);
}

#[test]
fn test_snap_to_zero() {
    assert_eq!(snap_to_zero(5.9, 6.0), 0.0);
    assert_eq!(snap_to_zero(-5.9, 6.0), 0.0);
    assert_eq!(snap_to_zero(6.0, 6.0), 6.0);
}

#[test]
fn test_arrow_head_points_backwards() {
    let [tip, left, right] = arrow_head(Point::new(100.0, 0.0), 0.0);
    assert_eq!(tip, Point::new(100.0, 0.0));
    assert!(approx_eq(left.x, 92.0));
    assert!(approx_eq(right.x, 92.0));
    assert!(approx_eq(left.y, -5.0));
    assert!(approx_eq(right.y, 5.0));
}
