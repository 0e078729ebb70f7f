//! Loop from a node back to itself

use std::f64::consts::PI;

use crate::config::Config;
use crate::geometry::{ring_contains_point, snap_right_angle, Circle, EndPoints, Point, RIGHT_ANGLE_SNAP};
use crate::render::{draw_arrow, draw_text, RenderTarget};

use super::{Appearance, Node, Scene};

#[derive(Debug, Clone, PartialEq)]
pub struct SelfLink {
    pub node: usize,
    pub text: String,
    /// Direction of the loop from the node centre, in (-π, π]
    pub anchor_angle: f64,
    pub mouse_offset_angle: f64,
    pub appearance: Appearance,
}

impl SelfLink {
    pub fn new(node: usize, config: &Config) -> Self {
        Self {
            node,
            text: String::new(),
            anchor_angle: 0.0,
            mouse_offset_angle: 0.0,
            appearance: Appearance::for_link(config),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn set_mouse_start(&mut self, node: &Node, x: f64, y: f64) {
        self.mouse_offset_angle = self.anchor_angle - (y - node.y).atan2(x - node.x);
    }

    pub fn set_anchor_point(&mut self, node: &Node, x: f64, y: f64) {
        let angle = (y - node.y).atan2(x - node.x) + self.mouse_offset_angle;
        self.anchor_angle = snap_right_angle(angle, RIGHT_ANGLE_SNAP);
    }

    pub fn end_points(&self, node: &Node) -> EndPoints {
        let r = node.radius();
        let circle = Circle {
            center: Point::new(
                node.x + 1.5 * r * self.anchor_angle.cos(),
                node.y + 1.5 * r * self.anchor_angle.sin(),
            ),
            radius: 0.75 * r,
        };
        let start_angle = self.anchor_angle - PI * 0.8;
        let end_angle = self.anchor_angle + PI * 0.8;
        EndPoints::Arc {
            start: circle.point_at(start_angle),
            end: circle.point_at(end_angle),
            circle,
            start_angle,
            end_angle,
            is_reversed: false,
        }
    }

    pub fn draw(&self, target: &mut dyn RenderTarget, scene: &Scene<'_>, is_selected: bool) {
        let Some(node) = scene.nodes.get(self.node) else {
            return;
        };
        let config = scene.config;
        self.appearance.apply(target, config, is_selected);

        let end_points = self.end_points(node);
        let EndPoints::Arc {
            circle,
            start_angle,
            end_angle,
            start,
            end,
            ..
        } = end_points
        else {
            return;
        };

        target.begin_path();
        target.arc(circle.center.x, circle.center.y, circle.radius, start_angle, end_angle, false);
        target.stroke();

        if config.link.arrow_head_at_dst {
            draw_arrow(target, end, end_angle + PI * 0.4);
        }
        if config.link.arrow_head_at_src {
            draw_arrow(target, start, start_angle - PI * 0.4);
        }

        target.style_mut().fill_style = self.appearance.text_fill(config, is_selected);
        let at = circle.point_at(self.anchor_angle);
        draw_text(
            target,
            &self.text,
            at.x,
            at.y,
            Some(self.anchor_angle),
            is_selected && scene.caret_visible,
        );
    }

    pub fn contains_point(&self, scene: &Scene<'_>, x: f64, y: f64) -> bool {
        let Some(node) = scene.nodes.get(self.node) else {
            return false;
        };
        match self.end_points(node) {
            EndPoints::Arc { circle, .. } => ring_contains_point(
                circle,
                Point::new(x, y),
                scene.config.canvas.hit_target_padding,
            ),
            EndPoints::Line { .. } => false,
        }
    }

    pub fn prepare_insertion(&self, nodes: &mut [Node], config: &Config) -> bool {
        config.canvas.accept_self_links && self.node < nodes.len()
    }
}
