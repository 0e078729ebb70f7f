//! Link between two distinct nodes, straight or bent into a circular arc

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::config::{Config, LinkConfig};
use crate::geometry::{
    arc_contains_point, circle_from_three_points_checked, segment_contains_point, EndPoints, Point,
};
use crate::render::{draw_arrow, draw_text, RenderTarget};

use super::{Appearance, Node, Scene};

/// Bends smaller than this render as a straight line
pub const STRAIGHT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub node_a: usize,
    pub node_b: usize,
    pub text: String,
    /// Flips the label to the other side of a straight link (0 or π)
    pub line_angle_adjust: f64,
    /// Anchor projection onto A→B as a fraction of its length
    pub parallel_part: f64,
    /// Signed anchor offset from A→B in pixels; zero means straight
    pub perpendicular_part: f64,
    pub arrow_head_at_src: bool,
    pub arrow_head_at_dst: bool,
    pub appearance: Appearance,
}

impl Link {
    pub fn new(node_a: usize, node_b: usize, config: &Config) -> Self {
        Self {
            node_a,
            node_b,
            text: String::new(),
            line_angle_adjust: 0.0,
            parallel_part: 0.5,
            perpendicular_part: 0.0,
            arrow_head_at_src: config.link.arrow_head_at_src,
            arrow_head_at_dst: config.link.arrow_head_at_dst,
            appearance: Appearance::for_link(config),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Arrow at the source end, honouring whether the config lets links override it
    pub fn shows_arrow_at_src(&self, config: &LinkConfig) -> bool {
        if config.arrow_head_at_src_overridable {
            self.arrow_head_at_src
        } else {
            config.arrow_head_at_src
        }
    }

    pub fn shows_arrow_at_dst(&self, config: &LinkConfig) -> bool {
        if config.arrow_head_at_dst_overridable {
            self.arrow_head_at_dst
        } else {
            config.arrow_head_at_dst
        }
    }

    /// Returns false (and changes nothing) when the source end is not overridable
    pub fn set_arrow_head_at_src(&mut self, value: bool, config: &LinkConfig) -> bool {
        if !config.arrow_head_at_src_overridable {
            return false;
        }
        self.arrow_head_at_src = value;
        true
    }

    pub fn set_arrow_head_at_dst(&mut self, value: bool, config: &LinkConfig) -> bool {
        if !config.arrow_head_at_dst_overridable {
            return false;
        }
        self.arrow_head_at_dst = value;
        true
    }

    pub fn anchor_point(&self, a: &Node, b: &Node) -> Point {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let scale = (dx * dx + dy * dy).sqrt();
        if scale == 0.0 {
            return a.center();
        }
        Point::new(
            a.x + dx * self.parallel_part - dy * self.perpendicular_part / scale,
            a.y + dy * self.parallel_part + dx * self.perpendicular_part / scale,
        )
    }

    /// Decompose a dragged anchor into parallel/perpendicular parts, snapping
    /// to a straight line when it lies close to the segment between the nodes
    pub fn set_anchor_point(&mut self, a: &Node, b: &Node, x: f64, y: f64, snap_to_padding: f64) {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let scale = (dx * dx + dy * dy).sqrt();
        if scale == 0.0 {
            return;
        }
        self.parallel_part = (dx * (x - a.x) + dy * (y - a.y)) / (scale * scale);
        self.perpendicular_part = (dx * (y - a.y) - dy * (x - a.x)) / scale;

        if self.parallel_part > 0.0
            && self.parallel_part < 1.0
            && self.perpendicular_part.abs() < snap_to_padding
        {
            self.line_angle_adjust = if self.perpendicular_part < 0.0 { PI } else { 0.0 };
            self.perpendicular_part = 0.0;
        }
    }

    pub fn end_points(&self, a: &Node, b: &Node) -> EndPoints {
        if self.perpendicular_part.abs() >= STRAIGHT_EPSILON {
            let anchor = self.anchor_point(a, b);
            if let Some(circle) = circle_from_three_points_checked(a.center(), b.center(), anchor) {
                let is_reversed = self.perpendicular_part > 0.0;
                let reverse_scale = if is_reversed { 1.0 } else { -1.0 };
                let c = circle.center;
                let start_angle =
                    (a.y - c.y).atan2(a.x - c.x) - reverse_scale * a.radius() / circle.radius;
                let end_angle =
                    (b.y - c.y).atan2(b.x - c.x) + reverse_scale * b.radius() / circle.radius;
                return EndPoints::Arc {
                    start: circle.point_at(start_angle),
                    end: circle.point_at(end_angle),
                    circle,
                    start_angle,
                    end_angle,
                    is_reversed,
                };
            }
        }

        let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        EndPoints::Line {
            start: a.closest_point_on_circle(mid),
            end: b.closest_point_on_circle(mid),
        }
    }

    pub fn draw(&self, target: &mut dyn RenderTarget, scene: &Scene<'_>, is_selected: bool) {
        let (Some(a), Some(b)) = (scene.nodes.get(self.node_a), scene.nodes.get(self.node_b)) else {
            return;
        };
        let config = scene.config;
        self.appearance.apply(target, config, is_selected);

        let end_points = self.end_points(a, b);
        target.begin_path();
        match end_points {
            EndPoints::Arc {
                circle,
                start_angle,
                end_angle,
                is_reversed,
                ..
            } => target.arc(
                circle.center.x,
                circle.center.y,
                circle.radius,
                start_angle,
                end_angle,
                is_reversed,
            ),
            EndPoints::Line { start, end } => {
                target.move_to(start.x, start.y);
                target.line_to(end.x, end.y);
            }
        }
        target.stroke();

        let (src_angle, dst_angle) = arrow_angles(&end_points);
        if self.shows_arrow_at_dst(&config.link) {
            draw_arrow(target, end_points.end(), dst_angle);
        }
        if self.shows_arrow_at_src(&config.link) {
            draw_arrow(target, end_points.start(), src_angle);
        }

        target.style_mut().fill_style = self.appearance.text_fill(config, is_selected);
        let caret = is_selected && scene.caret_visible;
        match end_points {
            EndPoints::Arc {
                circle,
                start_angle,
                end_angle,
                is_reversed,
                ..
            } => {
                let end_angle = if end_angle < start_angle {
                    end_angle + TAU
                } else {
                    end_angle
                };
                let mut text_angle = (start_angle + end_angle) / 2.0;
                if is_reversed {
                    text_angle += PI;
                }
                let at = circle.point_at(text_angle);
                draw_text(target, &self.text, at.x, at.y, Some(text_angle), caret);
            }
            EndPoints::Line { start, end } => {
                let text_x = (start.x + end.x) / 2.0;
                let text_y = (start.y + end.y) / 2.0;
                let text_angle = (end.x - start.x).atan2(start.y - end.y);
                draw_text(
                    target,
                    &self.text,
                    text_x,
                    text_y,
                    Some(text_angle + self.line_angle_adjust),
                    caret,
                );
            }
        }
    }

    pub fn contains_point(&self, scene: &Scene<'_>, x: f64, y: f64) -> bool {
        let (Some(a), Some(b)) = (scene.nodes.get(self.node_a), scene.nodes.get(self.node_b)) else {
            return false;
        };
        let padding = scene.config.canvas.hit_target_padding;
        let p = Point::new(x, y);
        match self.end_points(a, b) {
            EndPoints::Arc {
                circle,
                start_angle,
                end_angle,
                is_reversed,
                ..
            } => arc_contains_point(circle, start_angle, end_angle, is_reversed, p, padding),
            EndPoints::Line { start, end } => segment_contains_point(start, end, p, padding),
        }
    }

    pub fn prepare_insertion(&self, nodes: &mut [Node], config: &Config) -> bool {
        config.canvas.accept_links
            && self.node_a != self.node_b
            && self.node_a < nodes.len()
            && self.node_b < nodes.len()
    }
}

/// Tangent directions of the arrow caps at (source, destination)
fn arrow_angles(end_points: &EndPoints) -> (f64, f64) {
    match *end_points {
        EndPoints::Arc {
            start_angle,
            end_angle,
            is_reversed,
            ..
        } => {
            let reverse_scale = if is_reversed { 1.0 } else { -1.0 };
            (
                start_angle + reverse_scale * FRAC_PI_2,
                end_angle - reverse_scale * FRAC_PI_2,
            )
        }
        EndPoints::Line { start, end } => (
            (start.y - end.y).atan2(start.x - end.x),
            (end.y - start.y).atan2(end.x - start.x),
        ),
    }
}
