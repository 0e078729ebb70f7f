//! Live canvas backend: records egui shapes for the editor surface

use std::f64::consts::{PI, TAU};

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Shape, Stroke, Vec2};

use crate::config::font_size_px;
use crate::geometry::normalize_arc_range;
use crate::text::has_visible_text;

use super::{RenderTarget, Style};

/// Arc tessellation step in radians
const ARC_STEP: f64 = PI / 32.0;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Shape(Shape),
    Text {
        pos: Pos2,
        text: String,
        color: Color32,
        size: f32,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct Transform {
    x: f64,
    y: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PainterTarget {
    style: Style,
    transform: Transform,
    saved: Vec<(Style, Transform)>,
    circles: Vec<(Pos2, f32)>,
    points: Vec<Pos2>,
    ops: Vec<PaintOp>,
}

impl PainterTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    /// Replay the recorded operations onto an egui painter, shifted by `offset`
    pub fn paint(&self, painter: &egui::Painter, offset: Vec2) {
        for op in &self.ops {
            match op {
                PaintOp::Shape(shape) => {
                    let mut shape = shape.clone();
                    shape.translate(offset);
                    painter.add(shape);
                }
                PaintOp::Text {
                    pos,
                    text,
                    color,
                    size,
                } => {
                    painter.text(
                        *pos + offset,
                        Align2::LEFT_BOTTOM,
                        text,
                        FontId::proportional(*size),
                        *color,
                    );
                }
            }
        }
    }

    fn pos(&self, x: f64, y: f64) -> Pos2 {
        Pos2::new((x + self.transform.x) as f32, (y + self.transform.y) as f32)
    }

    fn color(&self, css: &str) -> Color32 {
        parse_color(css).gamma_multiply(self.style.global_alpha.clamp(0.0, 1.0) as f32)
    }
}

impl RenderTarget for PainterTarget {
    fn style(&self) -> &Style {
        &self.style
    }

    fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    fn begin_path(&mut self) {
        self.circles.clear();
        self.points.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let pos = self.pos(x, y);
        self.points.push(pos);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.move_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64, anticlockwise: bool) {
        if (end_angle - start_angle).abs() >= TAU {
            let center = self.pos(x, y);
            self.circles.push((center, radius as f32));
            return;
        }

        let (start, end) = normalize_arc_range(start_angle, end_angle, anticlockwise);
        let steps = ((end - start) / ARC_STEP).ceil().max(1.0) as usize;
        let mut arc: Vec<Pos2> = (0..=steps)
            .map(|i| {
                let angle = start + (end - start) * i as f64 / steps as f64;
                self.pos(x + radius * angle.cos(), y + radius * angle.sin())
            })
            .collect();
        if anticlockwise {
            arc.reverse();
        }
        self.points.extend(arc);
    }

    fn stroke(&mut self) {
        let stroke = Stroke::new(self.style.line_width as f32, self.color(&self.style.stroke_style));
        for &(center, radius) in &self.circles {
            self.ops
                .push(PaintOp::Shape(Shape::circle_stroke(center, radius, stroke)));
        }
        if self.points.len() < 2 {
            return;
        }
        match self.style.line_dash.as_slice() {
            [] => self
                .ops
                .push(PaintOp::Shape(Shape::line(self.points.clone(), stroke))),
            dash => {
                let on = dash[0] as f32;
                let off = dash.get(1).copied().unwrap_or(dash[0]) as f32;
                for shape in Shape::dashed_line(&self.points, stroke, on, off) {
                    self.ops.push(PaintOp::Shape(shape));
                }
            }
        }
    }

    fn fill(&mut self) {
        let color = self.color(&self.style.fill_style);
        for &(center, radius) in &self.circles {
            self.ops
                .push(PaintOp::Shape(Shape::circle_filled(center, radius, color)));
        }
        if self.points.len() >= 3 {
            self.ops.push(PaintOp::Shape(Shape::convex_polygon(
                self.points.clone(),
                color,
                Stroke::NONE,
            )));
        }
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        if !has_visible_text(text) {
            return;
        }
        self.ops.push(PaintOp::Text {
            pos: self.pos(x, y),
            text: text.to_string(),
            color: self.color(&self.style.fill_style),
            size: font_size_px(&self.style.font) as f32,
        });
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.transform.x += x;
        self.transform.y += y;
    }

    fn save(&mut self) {
        self.saved.push((self.style.clone(), self.transform));
    }

    fn restore(&mut self) {
        if let Some((style, transform)) = self.saved.pop() {
            self.style = style;
            self.transform = transform;
        }
    }

    /// The surface is redrawn from scratch every frame
    fn clear_rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {
        self.ops.clear();
    }
}

/// CSS colour to egui colour: `#rgb`, `#rrggbb` and a handful of names.
/// Anything else renders black.
pub fn parse_color(css: &str) -> Color32 {
    let css = css.trim();
    if let Some(hex) = css.strip_prefix('#') {
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        let rgb = match hex.len() {
            3 => hex
                .get(0..1)
                .zip(hex.get(1..2))
                .zip(hex.get(2..3))
                .and_then(|((r, g), b)| Some((channel(r)? * 17, channel(g)? * 17, channel(b)? * 17))),
            6 => hex
                .get(0..2)
                .zip(hex.get(2..4))
                .zip(hex.get(4..6))
                .and_then(|((r, g), b)| Some((channel(r)?, channel(g)?, channel(b)?))),
            _ => None,
        };
        return rgb.map_or(Color32::BLACK, |(r, g, b)| Color32::from_rgb(r, g, b));
    }

    match css.to_ascii_lowercase().as_str() {
        "white" => Color32::WHITE,
        "red" => Color32::RED,
        "green" => Color32::from_rgb(0, 128, 0),
        "blue" => Color32::BLUE,
        "yellow" => Color32::YELLOW,
        "gray" | "grey" => Color32::GRAY,
        "orange" => Color32::from_rgb(255, 165, 0),
        "purple" => Color32::from_rgb(128, 0, 128),
        "transparent" => Color32::TRANSPARENT,
        _ => Color32::BLACK,
    }
}
