//! Geometry Kernel
//! Pure functions for link curvature, endpoint anchoring and hit-testing

use std::f64::consts::{FRAC_PI_2, PI, TAU};

#[cfg(test)]
mod tests;

/// Below this determinant magnitude three points are treated as collinear
pub const COLLINEAR_EPSILON: f64 = 1e-9;

/// Tolerance (radians) for snapping an angle to the nearest right angle
pub const RIGHT_ANGLE_SNAP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn is_finite(&self) -> bool {
        self.center.x.is_finite() && self.center.y.is_finite() && self.radius.is_finite()
    }

    pub fn point_at(&self, angle: f64) -> Point {
        Point::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }
}

/// Geometry of a drawn link: either a straight segment or a circular arc
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EndPoints {
    Line {
        start: Point,
        end: Point,
    },
    Arc {
        start: Point,
        end: Point,
        circle: Circle,
        start_angle: f64,
        end_angle: f64,
        /// Arc is swept counter-clockwise (canvas `anticlockwise` flag)
        is_reversed: bool,
    },
}

impl EndPoints {
    pub fn start(&self) -> Point {
        match *self {
            EndPoints::Line { start, .. } | EndPoints::Arc { start, .. } => start,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            EndPoints::Line { end, .. } | EndPoints::Arc { end, .. } => end,
        }
    }
}

fn det(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64, g: f64, h: f64, i: f64) -> f64 {
    a * e * i + b * f * g + c * d * h - a * f * h - b * d * i - c * e * g
}

/// Circle through three points, solved with Cramer's rule on the general conic form.
///
/// Collinear input yields non-finite values; use [`circle_from_three_points_checked`]
/// where that must be detected.
pub fn circle_from_three_points(p1: Point, p2: Point, p3: Point) -> Circle {
    let s1 = p1.x * p1.x + p1.y * p1.y;
    let s2 = p2.x * p2.x + p2.y * p2.y;
    let s3 = p3.x * p3.x + p3.y * p3.y;

    let a = det(p1.x, p1.y, 1.0, p2.x, p2.y, 1.0, p3.x, p3.y, 1.0);
    let bx = -det(s1, p1.y, 1.0, s2, p2.y, 1.0, s3, p3.y, 1.0);
    let by = det(s1, p1.x, 1.0, s2, p2.x, 1.0, s3, p3.x, 1.0);
    let c = -det(s1, p1.x, p1.y, s2, p2.x, p2.y, s3, p3.x, p3.y);

    Circle {
        center: Point::new(-bx / (2.0 * a), -by / (2.0 * a)),
        radius: (bx * bx + by * by - 4.0 * a * c).sqrt() / (2.0 * a.abs()),
    }
}

/// Like [`circle_from_three_points`] but returns `None` for (near-)collinear points
pub fn circle_from_three_points_checked(p1: Point, p2: Point, p3: Point) -> Option<Circle> {
    let a = det(p1.x, p1.y, 1.0, p2.x, p2.y, 1.0, p3.x, p3.y, 1.0);
    if a.abs() < COLLINEAR_EPSILON {
        return None;
    }
    Some(circle_from_three_points(p1, p2, p3)).filter(Circle::is_finite)
}

/// Point on the boundary of the circle at `center` nearest the ray toward `toward`.
///
/// A `toward` equal to the center has no direction; the rightmost boundary point is used.
pub fn closest_point_on_circle(center: Point, radius: f64, toward: Point) -> Point {
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    let scale = (dx * dx + dy * dy).sqrt();
    if scale == 0.0 {
        return Point::new(center.x + radius, center.y);
    }
    Point::new(center.x + dx * radius / scale, center.y + dy * radius / scale)
}

/// Hit test against the segment `start..end` with a perpendicular tolerance
pub fn segment_contains_point(start: Point, end: Point, p: Point, padding: f64) -> bool {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return false;
    }
    let percent = (dx * (p.x - start.x) + dy * (p.y - start.y)) / (length * length);
    let distance = (dx * (p.y - start.y) - dy * (p.x - start.x)) / length;
    percent > 0.0 && percent < 1.0 && distance.abs() < padding
}

/// Hit test against a circular arc.
///
/// The angular range is normalized to `[start, start + 2π)` before containment is
/// tested; a reversed arc swaps its endpoints first so ordering flips cannot matter.
pub fn arc_contains_point(
    circle: Circle,
    start_angle: f64,
    end_angle: f64,
    is_reversed: bool,
    p: Point,
    padding: f64,
) -> bool {
    let dx = p.x - circle.center.x;
    let dy = p.y - circle.center.y;
    let distance = (dx * dx + dy * dy).sqrt() - circle.radius;
    if distance.abs() >= padding {
        return false;
    }

    let (start, end) = normalize_arc_range(start_angle, end_angle, is_reversed);
    let mut angle = dy.atan2(dx);
    if angle < start {
        angle += TAU;
    } else if angle > end {
        angle -= TAU;
    }
    angle > start && angle < end
}

/// Hit test against the ring of a full circle
pub fn ring_contains_point(circle: Circle, p: Point, padding: f64) -> bool {
    let dx = p.x - circle.center.x;
    let dy = p.y - circle.center.y;
    ((dx * dx + dy * dy).sqrt() - circle.radius).abs() < padding
}

/// Canonical clockwise angular window for an arc: `end` lies in `[start, start + 2π)`
pub fn normalize_arc_range(start_angle: f64, end_angle: f64, is_reversed: bool) -> (f64, f64) {
    let (start, mut end) = if is_reversed {
        (end_angle, start_angle)
    } else {
        (start_angle, end_angle)
    };
    if end < start {
        end += TAU;
    }
    (start, end)
}

/// Snap to the nearest multiple of π/2 within `tolerance`, then wrap into (-π, π]
pub fn snap_right_angle(angle: f64, tolerance: f64) -> f64 {
    let snap = (angle / FRAC_PI_2).round() * FRAC_PI_2;
    let angle = if (angle - snap).abs() < tolerance { snap } else { angle };
    normalize_angle(angle)
}

/// Wrap into (-π, π]; angles already in range come back bit-for-bit
pub fn normalize_angle(angle: f64) -> f64 {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Zero out values within `padding` of zero
pub fn snap_to_zero(value: f64, padding: f64) -> f64 {
    if value.abs() < padding {
        0.0
    } else {
        value
    }
}

/// Three points of a filled arrow cap at `tip`, pointing along `angle`
pub fn arrow_head(tip: Point, angle: f64) -> [Point; 3] {
    let dx = angle.cos();
    let dy = angle.sin();
    [
        tip,
        Point::new(tip.x - 8.0 * dx + 5.0 * dy, tip.y - 8.0 * dy - 5.0 * dx),
        Point::new(tip.x - 8.0 * dx - 5.0 * dy, tip.y - 8.0 * dy + 5.0 * dx),
    ]
}
