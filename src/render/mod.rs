//! Render Target Abstraction
//! One canvas-like drawing vocabulary shared by the live surface, SVG and TikZ

use crate::config::font_size_px;
use crate::geometry::{arrow_head, Point};
use crate::model::{Document, InFlight, Selection};
use crate::text::convert_latex_shortcuts;

mod latex;
#[cfg(feature = "gui")]
mod painter;
mod svg;


pub use latex::LatexTarget;
#[cfg(feature = "gui")]
pub use painter::{parse_color, PaintOp, PainterTarget};
pub use svg::SvgTarget;

/// Mutable drawing state, mirroring the 2D canvas context fields
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill_style: String,
    pub stroke_style: String,
    pub line_width: f64,
    pub font: String,
    pub global_alpha: f64,
    pub line_dash: Vec<f64>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill_style: "black".to_string(),
            stroke_style: "black".to_string(),
            line_width: 1.0,
            font: "20px \"Times New Roman\", serif".to_string(),
            global_alpha: 1.0,
            line_dash: Vec::new(),
        }
    }
}

/// Path/arc/line/text drawing capability implemented by every backend
pub trait RenderTarget {
    fn style(&self) -> &Style;
    fn style_mut(&mut self) -> &mut Style;

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    /// Canvas semantics: angles in radians, clockwise in screen space unless `anticlockwise`
    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64, anticlockwise: bool);
    fn stroke(&mut self);
    fn fill(&mut self);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);

    fn translate(&mut self, x: f64, y: f64);
    fn save(&mut self);
    fn restore(&mut self);
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn set_line_dash(&mut self, pattern: &[f64]) {
        self.style_mut().line_dash = pattern.to_vec();
    }

    /// Approximate advance width of `text` in the current font
    fn measure_text(&self, text: &str) -> f64 {
        text.chars().count() as f64 * font_size_px(&self.style().font) * 0.5
    }

    /// Backends that place labels themselves get the centre point and label angle.
    /// Returns false when the generic placement should be used instead.
    fn advanced_fill_text(
        &mut self,
        _text: &str,
        _original: &str,
        _x: f64,
        _y: f64,
        _angle: Option<f64>,
    ) -> bool {
        false
    }
}

/// Draw a label centred at (x, y); with an angle, the label is pushed outward
/// so its nearest corner touches the anchor
pub fn draw_text(
    target: &mut dyn RenderTarget,
    original: &str,
    x: f64,
    y: f64,
    angle: Option<f64>,
    caret: bool,
) {
    let text = convert_latex_shortcuts(original);
    let width = target.measure_text(&text);
    let half_height = font_size_px(&target.style().font) / 2.0;
    let mut x = x - width / 2.0;
    let mut y = y;

    if let Some(angle) = angle {
        let (sin, cos) = angle.sin_cos();
        let corner_x = (width / 2.0 + 5.0) * if cos > 0.0 { 1.0 } else { -1.0 };
        let corner_y = (half_height + 5.0) * if sin > 0.0 { 1.0 } else { -1.0 };
        let slide = sin * sin.abs().powi(40) * corner_x - cos * cos.abs().powi(10) * corner_y;
        x += corner_x - sin * slide;
        y += corner_y + cos * slide;
    }

    if target.advanced_fill_text(&text, original, x + width / 2.0, y, angle) {
        return;
    }

    let x = x.round();
    let y = y.round();
    target.fill_text(&text, x, y + half_height * 0.6);
    if caret {
        let caret_x = x + width;
        target.begin_path();
        target.move_to(caret_x, y - half_height);
        target.line_to(caret_x, y + half_height);
        target.stroke();
    }
}

/// Filled arrow cap with its tip at `tip`
pub fn draw_arrow(target: &mut dyn RenderTarget, tip: Point, angle: f64) {
    let [p0, p1, p2] = arrow_head(tip, angle);
    target.begin_path();
    target.move_to(p0.x, p0.y);
    target.line_to(p1.x, p1.y);
    target.line_to(p2.x, p2.y);
    target.fill();
}

/// Paint the whole document: nodes first, then links, then any in-flight link
pub fn draw_document(target: &mut dyn RenderTarget, document: &Document, caret_visible: bool) {
    let config = document.config();
    let mut scene = document.scene();
    scene.caret_visible = caret_visible;

    target.clear_rect(0.0, 0.0, config.canvas.width, config.canvas.height);
    target.save();
    target.translate(0.5, 0.5);
    target.style_mut().font = config.canvas.font.clone();

    for (i, node) in document.nodes.iter().enumerate() {
        node.draw(target, &scene, document.selection == Some(Selection::Node(i)));
    }
    for (i, link) in document.links.iter().enumerate() {
        link.draw(target, &scene, document.selection == Some(Selection::Link(i)));
    }
    match document.in_flight() {
        Some(InFlight::Link(link)) => link.draw(target, &scene, false),
        Some(InFlight::Temporary(link)) => link.draw(target, config),
        None => {}
    }

    target.restore();
}

/// Standalone SVG document of the current diagram, without selection highlights
pub fn export_svg(document: &Document) -> String {
    let canvas = &document.config().canvas;
    let mut target = SvgTarget::new(canvas.width, canvas.height);
    draw_exported(&mut target, document);
    target.to_svg()
}

/// LaTeX document with a TikZ picture of the current diagram
pub fn export_latex(document: &Document) -> String {
    let mut target = LatexTarget::new(document.config().canvas.latex_scale);
    draw_exported(&mut target, document);
    target.to_latex()
}

fn draw_exported(target: &mut dyn RenderTarget, document: &Document) {
    let mut unselected = document.clone();
    unselected.selection = None;
    unselected.cancel_link_gesture();
    draw_document(target, &unselected, false);
}
