//! LaTeX/TikZ emitter

use std::f64::consts::TAU;
use std::fmt::Write as _;

use crate::config::font_size_px;
use crate::geometry::normalize_arc_range;
use crate::text::{fixed, has_visible_text, text_to_latex};

use super::{RenderTarget, Style};

#[derive(Debug, Clone, Copy)]
struct ArcSegment {
    x: f64,
    y: f64,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    anticlockwise: bool,
}

/// Emits `\draw`/`\fill` commands in document units (Y-up, scaled)
#[derive(Debug, Clone)]
pub struct LatexTarget {
    style: Style,
    scale: f64,
    points: Vec<(f64, f64)>,
    arcs: Vec<ArcSegment>,
    data: String,
}

impl LatexTarget {
    pub fn new(scale: f64) -> Self {
        Self {
            style: Style::default(),
            scale,
            points: Vec::new(),
            arcs: Vec::new(),
            data: String::new(),
        }
    }

    /// Commands emitted so far, without the document wrapper
    pub fn body(&self) -> &str {
        &self.data
    }

    pub fn to_latex(&self) -> String {
        format!(
            "\\documentclass[12pt]{{article}}\n\
             \\usepackage{{tikz}}\n\
             \n\
             \\begin{{document}}\n\
             \n\
             \\begin{{center}}\n\
             \\begin{{tikzpicture}}[scale=0.2]\n\
             \\tikzstyle{{every node}}+=[inner sep=0pt]\n\
             {}\
             \\end{{tikzpicture}}\n\
             \\end{{center}}\n\
             \n\
             \\end{{document}}\n",
            self.data
        )
    }

    fn options(&self, color: &str) -> String {
        let mut options = vec![tikz_color(color)];
        if !self.style.line_dash.is_empty() {
            options.push("dashed".to_string());
        }
        if self.style.global_alpha < 1.0 {
            options.push(format!("opacity={}", fixed(self.style.global_alpha, 3)));
        }
        options.join(", ")
    }

    fn flush(&mut self, command: &str, color: &str) {
        let options = self.options(color);

        for arc in &self.arcs {
            let x = arc.x * self.scale;
            let y = arc.y * self.scale;
            let radius = arc.radius * self.scale;

            if (arc.end_angle - arc.start_angle).abs() >= TAU {
                let _ = writeln!(
                    self.data,
                    "\\{} [{}] ({},{}) circle ({});",
                    command,
                    options,
                    fixed(x, 3),
                    fixed(-y, 3),
                    fixed(radius, 3)
                );
                continue;
            }

            let (mut start, mut end) =
                normalize_arc_range(arc.start_angle, arc.end_angle, arc.anticlockwise);
            // TikZ only accepts angles within [-2π, 2π]
            if start.min(end) < -TAU {
                start += TAU;
                end += TAU;
            } else if start.max(end) > TAU {
                start -= TAU;
                end -= TAU;
            }
            let (start, end) = (-start, -end);

            let _ = writeln!(
                self.data,
                "\\{} [{}] ({},{}) arc ({}:{}:{});",
                command,
                options,
                fixed(x + radius * start.cos(), 3),
                fixed(-y + radius * start.sin(), 3),
                fixed(start.to_degrees(), 5),
                fixed(end.to_degrees(), 5),
                fixed(radius, 3)
            );
        }

        if !self.points.is_empty() {
            let mut line = format!("\\{} [{}]", command, options);
            for (i, (x, y)) in self.points.iter().enumerate() {
                if i > 0 {
                    line.push_str(" --");
                }
                let _ = write!(line, " ({},{})", fixed(*x, 2), fixed(-*y, 2));
            }
            let _ = writeln!(self.data, "{};", line);
        }
    }
}

impl RenderTarget for LatexTarget {
    fn style(&self) -> &Style {
        &self.style
    }

    fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    fn begin_path(&mut self) {
        self.points.clear();
        self.arcs.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.points.push((x * self.scale, y * self.scale));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.move_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64, anticlockwise: bool) {
        self.arcs.push(ArcSegment {
            x,
            y,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        });
    }

    fn stroke(&mut self) {
        let color = self.style.stroke_style.clone();
        self.flush("draw", &color);
    }

    fn fill(&mut self) {
        let color = self.style.fill_style.clone();
        self.flush("fill", &color);
    }

    /// Only reachable through the generic placement path, which this backend bypasses
    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        if has_visible_text(text) {
            let _ = writeln!(
                self.data,
                "\\draw ({},{}) node {{${}$}};",
                fixed(x * self.scale, 2),
                fixed(-y * self.scale, 2),
                text_to_latex(text)
            );
        }
    }

    fn advanced_fill_text(
        &mut self,
        text: &str,
        original: &str,
        x: f64,
        y: f64,
        angle: Option<f64>,
    ) -> bool {
        if !has_visible_text(text) {
            return true;
        }

        let mut x = x;
        let mut y = y;
        let mut params = Vec::new();
        if let Some(angle) = angle {
            let width = self.measure_text(text);
            let half_height = font_size_px(&self.style.font) / 2.0;
            let (dy, dx) = angle.sin_cos();
            if dx.abs() > dy.abs() {
                if dx > 0.0 {
                    params.push("right".to_string());
                    x -= width / 2.0;
                } else {
                    params.push("left".to_string());
                    x += width / 2.0;
                }
            } else if dy > 0.0 {
                params.push("below".to_string());
                y -= half_height;
            } else {
                params.push("above".to_string());
                y += half_height;
            }
        }
        if !self.style.fill_style.eq_ignore_ascii_case("black") {
            params.push(format!("text={}", tikz_color_value(&self.style.fill_style)));
        }
        let params = if params.is_empty() {
            String::new()
        } else {
            format!("[{}] ", params.join(", "))
        };

        let _ = writeln!(
            self.data,
            "\\draw ({},{}) node {}{{${}$}};",
            fixed(x * self.scale, 2),
            fixed(-y * self.scale, 2),
            params,
            text_to_latex(original)
        );
        true
    }

    fn translate(&mut self, _x: f64, _y: f64) {}

    fn save(&mut self) {}

    fn restore(&mut self) {}

    fn clear_rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {}
}

/// TikZ colour option for a CSS colour
fn tikz_color(color: &str) -> String {
    let value = tikz_color_value(color);
    if value.starts_with('{') {
        format!("color={}", value)
    } else {
        value
    }
}

/// Named colours pass through; `#rgb`/`#rrggbb` become an xcolor RGB colour
fn tikz_color_value(color: &str) -> String {
    let color = color.trim();
    let Some(hex) = color.strip_prefix('#') else {
        return color.to_ascii_lowercase();
    };
    let channels: Option<Vec<u8>> = match hex.len() {
        3 => hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| (d * 17) as u8))
            .collect(),
        6 => (0..3)
            .map(|i| u8::from_str_radix(hex.get(i * 2..i * 2 + 2)?, 16).ok())
            .collect(),
        _ => None,
    };
    match channels.as_deref() {
        Some([r, g, b]) => format!("{{rgb,255:red,{};green,{};blue,{}}}", r, g, b),
        _ => "black".to_string(),
    }
}
