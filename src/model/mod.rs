//! Entity Model
//! Nodes and the link family, plus the document that owns them

use crate::config::{CanvasConfig, Config};
use crate::geometry::EndPoints;
use crate::render::RenderTarget;

mod document;
mod link;
mod node;
mod self_link;
mod start_link;
mod temporary_link;

#[cfg(test)]
mod tests;

pub use document::{Document, InFlight, Selection};
pub use link::Link;
pub use node::Node;
pub use self_link::SelfLink;
pub use start_link::StartLink;
pub use temporary_link::TemporaryLink;

/// Read-only view handed to entities while drawing or hit-testing
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub nodes: &'a [Node],
    pub config: &'a Config,
    /// Draw the text caret after the selected entity's label
    pub caret_visible: bool,
}

impl<'a> Scene<'a> {
    pub fn new(nodes: &'a [Node], config: &'a Config) -> Self {
        Self {
            nodes,
            config,
            caret_visible: false,
        }
    }
}

/// Visual style shared by every entity
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub opacity: f64,
    pub dashed: bool,
    pub border_color: String,
    pub background_color: String,
    pub text_color: String,
}

impl Appearance {
    pub fn for_node(config: &Config) -> Self {
        Self {
            opacity: config.canvas.opacity,
            dashed: false,
            border_color: config.node.border_color.clone(),
            background_color: config.node.background_color.clone(),
            text_color: config.node.text_color.clone(),
        }
    }

    pub fn for_link(config: &Config) -> Self {
        Self {
            opacity: config.canvas.opacity,
            dashed: false,
            border_color: config.link.border_color.clone(),
            background_color: config.link.background_color.clone(),
            text_color: config.link.text_color.clone(),
        }
    }

    /// Load alpha, dash, line width and stroke/fill colours into the target
    pub(crate) fn apply(&self, target: &mut dyn RenderTarget, config: &Config, is_selected: bool) {
        let canvas = &config.canvas;
        let ink = if is_selected {
            canvas.selection_color.clone()
        } else {
            self.border_color.clone()
        };
        let style = target.style_mut();
        style.global_alpha = self.opacity;
        style.line_width = canvas.line_width;
        style.stroke_style = ink.clone();
        style.fill_style = ink;
        target.set_line_dash(dash_pattern(self.dashed, canvas));
    }

    pub(crate) fn text_fill(&self, config: &Config, is_selected: bool) -> String {
        if is_selected {
            config.canvas.selection_color.clone()
        } else {
            self.text_color.clone()
        }
    }
}

pub(crate) fn dash_pattern(dashed: bool, canvas: &CanvasConfig) -> &[f64] {
    if dashed {
        canvas.line_dash.as_slice()
    } else {
        &[]
    }
}

/// Persistent member of the link family, dispatched on its `type` tag
#[derive(Debug, Clone, PartialEq)]
pub enum AnyLink {
    Link(Link),
    SelfLink(SelfLink),
    StartLink(StartLink),
}

impl AnyLink {
    /// Discriminator written to the interchange document
    pub fn type_name(&self) -> &'static str {
        match self {
            AnyLink::Link(_) => "Link",
            AnyLink::SelfLink(_) => "SelfLink",
            AnyLink::StartLink(_) => "StartLink",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            AnyLink::Link(l) => &l.text,
            AnyLink::SelfLink(l) => &l.text,
            AnyLink::StartLink(l) => &l.text,
        }
    }

    pub fn text_mut(&mut self) -> &mut String {
        match self {
            AnyLink::Link(l) => &mut l.text,
            AnyLink::SelfLink(l) => &mut l.text,
            AnyLink::StartLink(l) => &mut l.text,
        }
    }

    pub fn appearance(&self) -> &Appearance {
        match self {
            AnyLink::Link(l) => &l.appearance,
            AnyLink::SelfLink(l) => &l.appearance,
            AnyLink::StartLink(l) => &l.appearance,
        }
    }

    /// Node indices this link is attached to
    pub fn node_indices(&self) -> Vec<usize> {
        match self {
            AnyLink::Link(l) => vec![l.node_a, l.node_b],
            AnyLink::SelfLink(l) => vec![l.node],
            AnyLink::StartLink(l) => vec![l.node],
        }
    }

    pub fn references(&self, node: usize) -> bool {
        self.node_indices().contains(&node)
    }

    /// Shift node indices down after the node at `removed` left the document
    pub(crate) fn remap_after_removal(&mut self, removed: usize) {
        let shift = |index: &mut usize| {
            if *index > removed {
                *index -= 1;
            }
        };
        match self {
            AnyLink::Link(l) => {
                shift(&mut l.node_a);
                shift(&mut l.node_b);
            }
            AnyLink::SelfLink(l) => shift(&mut l.node),
            AnyLink::StartLink(l) => shift(&mut l.node),
        }
    }

    pub fn end_points(&self, nodes: &[Node]) -> Option<EndPoints> {
        match self {
            AnyLink::Link(l) => Some(l.end_points(nodes.get(l.node_a)?, nodes.get(l.node_b)?)),
            AnyLink::SelfLink(l) => Some(l.end_points(nodes.get(l.node)?)),
            AnyLink::StartLink(l) => Some(l.end_points(nodes.get(l.node)?)),
        }
    }

    pub fn draw(&self, target: &mut dyn RenderTarget, scene: &Scene<'_>, is_selected: bool) {
        match self {
            AnyLink::Link(l) => l.draw(target, scene, is_selected),
            AnyLink::SelfLink(l) => l.draw(target, scene, is_selected),
            AnyLink::StartLink(l) => l.draw(target, scene, is_selected),
        }
    }

    pub fn contains_point(&self, scene: &Scene<'_>, x: f64, y: f64) -> bool {
        match self {
            AnyLink::Link(l) => l.contains_point(scene, x, y),
            AnyLink::SelfLink(l) => l.contains_point(scene, x, y),
            AnyLink::StartLink(l) => l.contains_point(scene, x, y),
        }
    }

    /// Policy gate run before the link joins the document
    pub fn prepare_insertion(&self, nodes: &mut [Node], config: &Config) -> bool {
        match self {
            AnyLink::Link(l) => l.prepare_insertion(nodes, config),
            AnyLink::SelfLink(l) => l.prepare_insertion(nodes, config),
            AnyLink::StartLink(l) => l.prepare_insertion(nodes, config),
        }
    }

    /// Cleanup run before the link leaves the document
    pub fn prepare_removal(&self, nodes: &mut [Node]) {
        if let AnyLink::StartLink(l) = self {
            l.prepare_removal(nodes);
        }
    }
}

impl From<Link> for AnyLink {
    fn from(link: Link) -> Self {
        AnyLink::Link(link)
    }
}

impl From<SelfLink> for AnyLink {
    fn from(link: SelfLink) -> Self {
        AnyLink::SelfLink(link)
    }
}

impl From<StartLink> for AnyLink {
    fn from(link: StartLink) -> Self {
        AnyLink::StartLink(link)
    }
}
