//! Rubber-band line shown while a link is being drawn

use crate::config::Config;
use crate::geometry::Point;
use crate::render::{draw_arrow, RenderTarget};

/// Never serialized and never part of the document's link list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporaryLink {
    pub from: Point,
    pub to: Point,
}

impl TemporaryLink {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    pub fn draw(&self, target: &mut dyn RenderTarget, config: &Config) {
        let style = target.style_mut();
        style.global_alpha = config.canvas.opacity;
        style.line_width = config.canvas.line_width;
        style.stroke_style = config.link.border_color.clone();
        style.fill_style = config.link.border_color.clone();
        target.set_line_dash(&[]);

        target.begin_path();
        target.move_to(self.from.x, self.from.y);
        target.line_to(self.to.x, self.to.y);
        target.stroke();

        if config.link.arrow_head_at_dst {
            let angle = (self.to.y - self.from.y).atan2(self.to.x - self.from.x);
            draw_arrow(target, self.to, angle);
        }
    }
}
