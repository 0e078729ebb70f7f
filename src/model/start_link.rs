//! Entry arrow marking a node as the FSM's initial state

use crate::config::Config;
use crate::geometry::{segment_contains_point, snap_to_zero, EndPoints, Point};
use crate::render::{draw_arrow, draw_text, RenderTarget};

use super::{Appearance, Node, Scene};

#[derive(Debug, Clone, PartialEq)]
pub struct StartLink {
    pub node: usize,
    pub text: String,
    /// Offset of the free end from the node centre
    pub delta_x: f64,
    pub delta_y: f64,
    /// Draw with the node's colours, opacity and dash instead of our own
    pub synchronize_visual_with_node: bool,
    pub appearance: Appearance,
}

impl StartLink {
    /// The free end starts two radii to the left of the node
    pub fn new(node: usize, target: &Node, config: &Config) -> Self {
        Self {
            node,
            text: String::new(),
            delta_x: -2.0 * target.radius(),
            delta_y: 0.0,
            synchronize_visual_with_node: false,
            appearance: Appearance::for_link(config),
        }
    }

    pub fn set_anchor_point(&mut self, node: &Node, x: f64, y: f64, snap_to_padding: f64) {
        self.delta_x = snap_to_zero(x - node.x, snap_to_padding);
        self.delta_y = snap_to_zero(y - node.y, snap_to_padding);
    }

    pub fn end_points(&self, node: &Node) -> EndPoints {
        let start = Point::new(node.x + self.delta_x, node.y + self.delta_y);
        EndPoints::Line {
            start,
            end: node.closest_point_on_circle(start),
        }
    }

    /// Style actually used for drawing
    pub fn effective_appearance<'a>(&'a self, node: &'a Node) -> &'a Appearance {
        if self.synchronize_visual_with_node {
            &node.appearance
        } else {
            &self.appearance
        }
    }

    pub fn draw(&self, target: &mut dyn RenderTarget, scene: &Scene<'_>, is_selected: bool) {
        let Some(node) = scene.nodes.get(self.node) else {
            return;
        };
        let config = scene.config;
        let look = self.effective_appearance(node);
        look.apply(target, config, is_selected);

        let end_points = self.end_points(node);
        let (start, end) = (end_points.start(), end_points.end());
        target.begin_path();
        target.move_to(start.x, start.y);
        target.line_to(end.x, end.y);
        target.stroke();

        draw_arrow(target, end, (-self.delta_y).atan2(-self.delta_x));

        // Label sits at the free end, pushed away from the node
        target.style_mut().fill_style = look.text_fill(config, is_selected);
        let text_angle = (start.y - end.y).atan2(start.x - end.x);
        draw_text(
            target,
            &self.text,
            start.x,
            start.y,
            Some(text_angle),
            is_selected && scene.caret_visible,
        );
    }

    pub fn contains_point(&self, scene: &Scene<'_>, x: f64, y: f64) -> bool {
        let Some(node) = scene.nodes.get(self.node) else {
            return false;
        };
        let end_points = self.end_points(node);
        segment_contains_point(
            end_points.start(),
            end_points.end(),
            Point::new(x, y),
            scene.config.canvas.hit_target_padding,
        )
    }

    /// Refused when start links are disabled or the node is already initial;
    /// otherwise claims the node's initial marking
    pub fn prepare_insertion(&self, nodes: &mut [Node], config: &Config) -> bool {
        if !config.canvas.accept_start_links {
            return false;
        }
        match nodes.get_mut(self.node) {
            Some(node) if !node.is_initial_state() => {
                node.set_initial_state(true);
                true
            }
            _ => false,
        }
    }

    pub fn prepare_removal(&self, nodes: &mut [Node]) {
        if let Some(node) = nodes.get_mut(self.node) {
            node.set_initial_state(false);
        }
    }
}
