//! Circular diagram node

use std::f64::consts::TAU;

use crate::config::{Config, NodeConfig};
use crate::geometry::{closest_point_on_circle, Point};
use crate::render::{draw_text, RenderTarget};

use super::{Appearance, Scene};

/// A node (FSM state) drawn as a circle with a centred label
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub is_accept_state: bool,
    pub appearance: Appearance,
    /// Offset from the pointer to the centre while dragging
    pub mouse_offset_x: f64,
    pub mouse_offset_y: f64,
    radius: f64,
    is_initial_state: bool,
}

impl Node {
    pub fn new(x: f64, y: f64, config: &Config) -> Self {
        Self {
            x,
            y,
            text: String::new(),
            is_accept_state: false,
            appearance: Appearance::for_node(config),
            mouse_offset_x: 0.0,
            mouse_offset_y: 0.0,
            radius: clamp_radius(config.node.radius, &config.node),
            is_initial_state: false,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Set the radius, keeping it larger than the accept-state inner circle spacing
    pub fn set_radius(&mut self, radius: f64, config: &NodeConfig) {
        self.radius = clamp_radius(radius, config);
    }

    /// Marked initial by an inserted start link; never set directly
    pub fn is_initial_state(&self) -> bool {
        self.is_initial_state
    }

    pub(crate) fn set_initial_state(&mut self, value: bool) {
        self.is_initial_state = value;
    }

    pub fn set_mouse_start(&mut self, x: f64, y: f64) {
        self.mouse_offset_x = self.x - x;
        self.mouse_offset_y = self.y - y;
    }

    pub fn set_anchor_point(&mut self, x: f64, y: f64) {
        self.x = x + self.mouse_offset_x;
        self.y = y + self.mouse_offset_y;
    }

    pub fn closest_point_on_circle(&self, toward: Point) -> Point {
        closest_point_on_circle(self.center(), self.radius, toward)
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy < self.radius * self.radius
    }

    pub fn draw(&self, target: &mut dyn RenderTarget, scene: &Scene<'_>, is_selected: bool) {
        let look = &self.appearance;
        look.apply(target, scene.config, is_selected);

        target.begin_path();
        target.arc(self.x, self.y, self.radius, 0.0, TAU, false);
        target.style_mut().fill_style = look.background_color.clone();
        target.fill();
        target.stroke();

        target.style_mut().fill_style = look.text_fill(scene.config, is_selected);
        draw_text(
            target,
            &self.text,
            self.x,
            self.y,
            None,
            is_selected && scene.caret_visible,
        );

        if self.is_accept_state {
            let inner = self.radius - scene.config.node.accept_state_inner_circle_distance;
            target.begin_path();
            target.arc(self.x, self.y, inner, 0.0, TAU, false);
            target.stroke();
        }
    }
}

fn clamp_radius(radius: f64, config: &NodeConfig) -> f64 {
    let minimum = config.accept_state_inner_circle_distance;
    if radius.is_finite() && radius > minimum {
        radius
    } else {
        minimum + 1.0
    }
}
