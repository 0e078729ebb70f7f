//! SVG emitter

use std::f64::consts::{PI, TAU};
use std::fmt::Write as _;

use crate::config::{font_family, font_size_px};
use crate::geometry::normalize_arc_range;
use crate::text::{fixed, has_visible_text, text_to_xml};

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

/// Accumulates SVG elements; state changes other than translation are not tracked
#[derive(Debug, Clone)]
pub struct SvgTarget {
    style: Style,
    width: f64,
    height: f64,
    points: Vec<(f64, f64)>,
    arcs: Vec<ArcSegment>,
    trans_x: f64,
    trans_y: f64,
    data: String,
}

impl SvgTarget {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            style: Style::default(),
            width,
            height,
            points: Vec::new(),
            arcs: Vec::new(),
            trans_x: 0.0,
            trans_y: 0.0,
            data: String::new(),
        }
    }

    /// Elements emitted so far, without the document wrapper
    pub fn body(&self) -> &str {
        &self.data
    }

    pub fn to_svg(&self) -> String {
        format!(
            "<?xml version=\"1.0\" standalone=\"no\"?>\n\
             <!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n\
             \n\
             <svg width=\"{}\" height=\"{}\" version=\"1.1\" xmlns=\"http://www.w3.org/2000/svg\">\n{}</svg>\n",
            fixed(self.width, 3),
            fixed(self.height, 3),
            self.data
        )
    }

    /// Shared presentation attributes; `paint` is either a stroke or a fill attribute set
    fn attributes(&self, paint: &str) -> String {
        let mut attrs = paint.to_string();
        if self.style.global_alpha < 1.0 {
            let _ = write!(attrs, " opacity=\"{}\"", fixed(self.style.global_alpha, 3));
        }
        if !self.style.line_dash.is_empty() {
            let dash: Vec<String> = self.style.line_dash.iter().map(|d| fixed(*d, 3)).collect();
            let _ = write!(attrs, " stroke-dasharray=\"{}\"", dash.join(","));
        }
        attrs
    }

    fn stroke_paint(&self) -> String {
        format!(
            "stroke=\"{}\" stroke-width=\"{}\" fill=\"none\"",
            text_to_xml(&self.style.stroke_style),
            fixed(self.style.line_width, 3)
        )
    }

    fn fill_paint(&self) -> String {
        format!(
            "fill=\"{}\" stroke-width=\"{}\"",
            text_to_xml(&self.style.fill_style),
            fixed(self.style.line_width, 3)
        )
    }

    fn flush(&mut self, paint: &str) {
        let attrs = self.attributes(paint);

        for arc in &self.arcs {
            if (arc.end_angle - arc.start_angle).abs() >= TAU {
                let _ = writeln!(
                    self.data,
                    "\t<ellipse {} cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\"/>",
                    attrs,
                    fixed(arc.x, 3),
                    fixed(arc.y, 3),
                    fixed(arc.radius, 3),
                    fixed(arc.radius, 3)
                );
                continue;
            }

            let (start, end) = normalize_arc_range(arc.start_angle, arc.end_angle, arc.anticlockwise);
            let start_x = arc.x + arc.radius * start.cos();
            let start_y = arc.y + arc.radius * start.sin();
            let end_x = arc.x + arc.radius * end.cos();
            let end_y = arc.y + arc.radius * end.sin();
            let large_arc = u8::from((end - start).abs() > PI);
            let _ = writeln!(
                self.data,
                "\t<path {} d=\"M {},{} A {},{} 0 {} 1 {},{}\"/>",
                attrs,
                fixed(start_x, 3),
                fixed(start_y, 3),
                fixed(arc.radius, 3),
                fixed(arc.radius, 3),
                large_arc,
                fixed(end_x, 3),
                fixed(end_y, 3)
            );
        }

        if !self.points.is_empty() {
            let points: Vec<String> = self
                .points
                .iter()
                .map(|(x, y)| format!("{},{}", fixed(*x, 3), fixed(*y, 3)))
                .collect();
            let _ = writeln!(
                self.data,
                "\t<polygon {} points=\"{}\"/>",
                attrs,
                points.join(" ")
            );
        }
    }
}

impl RenderTarget for SvgTarget {
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
        self.points.push((x + self.trans_x, y + self.trans_y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.move_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64, anticlockwise: bool) {
        self.arcs.push(ArcSegment {
            x: x + self.trans_x,
            y: y + self.trans_y,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        });
    }

    fn stroke(&mut self) {
        let paint = self.stroke_paint();
        self.flush(&paint);
    }

    fn fill(&mut self) {
        let paint = self.fill_paint();
        self.flush(&paint);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        if !has_visible_text(text) {
            return;
        }
        let size = font_size_px(&self.style.font);
        let opacity = if self.style.global_alpha < 1.0 {
            format!(" opacity=\"{}\"", fixed(self.style.global_alpha, 3))
        } else {
            String::new()
        };
        let _ = writeln!(
            self.data,
            "\t<text x=\"{}\" y=\"{}\" fill=\"{}\"{} font-family=\"{}\" font-size=\"{}\">{}</text>",
            fixed(x + self.trans_x, 3),
            fixed(y + self.trans_y, 3),
            text_to_xml(&self.style.fill_style),
            opacity,
            text_to_xml(&font_family(&self.style.font)),
            fixed(size, 3),
            text_to_xml(text)
        );
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.trans_x += x;
        self.trans_y += y;
    }

    fn save(&mut self) {}

    fn restore(&mut self) {}

    fn clear_rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {}
}
