//! The editing session: node and link sequences, alphabet text, selection

use log::debug;

use crate::config::Config;
use crate::geometry::Point;

use super::{AnyLink, Link, Node, Scene, SelfLink, StartLink, TemporaryLink};

/// Currently selected entity, by position in its sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Node(usize),
    Link(usize),
}

/// Link under construction during a drawing gesture
#[derive(Debug, Clone, PartialEq)]
pub enum InFlight {
    Temporary(TemporaryLink),
    Link(AnyLink),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureOrigin {
    Node(usize),
    Point(Point),
}

/// A single live document; every editing operation goes through it
#[derive(Debug, Clone)]
pub struct Document {
    /// Paint and hit-test order is insertion order
    pub nodes: Vec<Node>,
    pub links: Vec<AnyLink>,
    /// Comma list of FSM input symbols
    pub alphabet: String,
    pub selection: Option<Selection>,
    config: Config,
    origin: Option<GestureOrigin>,
    in_flight: Option<InFlight>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Document {
    pub fn new(config: Config) -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            alphabet: String::new(),
            selection: None,
            config,
            origin: None,
            in_flight: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Swap the configuration; existing entities keep their stored fields
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene::new(&self.nodes, &self.config)
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.alphabet.clear();
        self.selection = None;
        self.origin = None;
        self.in_flight = None;
    }

    pub fn add_node(&mut self, x: f64, y: f64) -> usize {
        self.push_node(Node::new(x, y, &self.config))
    }

    /// Append an already constructed node; its initial marking is reset
    pub fn push_node(&mut self, mut node: Node) -> usize {
        node.set_initial_state(false);
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Run the insertion gate and append the link when it passes
    pub fn insert_link(&mut self, link: impl Into<AnyLink>) -> Option<usize> {
        let link = link.into();
        if !link.prepare_insertion(&mut self.nodes, &self.config) {
            debug!("{} insertion refused", link.type_name());
            return None;
        }
        self.links.push(link);
        Some(self.links.len() - 1)
    }

    pub fn remove_link(&mut self, index: usize) -> Option<AnyLink> {
        if index >= self.links.len() {
            return None;
        }
        self.links[index].prepare_removal(&mut self.nodes);
        let link = self.links.remove(index);
        self.selection = match self.selection {
            Some(Selection::Link(i)) if i == index => None,
            Some(Selection::Link(i)) if i > index => Some(Selection::Link(i - 1)),
            other => other,
        };
        Some(link)
    }

    /// Delete a node and every link attached to it.
    ///
    /// Incident links run their removal hooks before the node goes away; the
    /// surviving links are then renumbered.
    pub fn remove_node(&mut self, index: usize) -> Option<Node> {
        if index >= self.nodes.len() {
            return None;
        }

        let incident: Vec<usize> = self
            .links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.references(index))
            .map(|(i, _)| i)
            .collect();
        for &i in &incident {
            self.links[i].prepare_removal(&mut self.nodes);
        }
        for &i in incident.iter().rev() {
            self.links.remove(i);
        }

        let node = self.nodes.remove(index);
        self.cancel_link_gesture();
        for link in &mut self.links {
            link.remap_after_removal(index);
        }

        self.selection = match self.selection {
            Some(Selection::Node(i)) if i == index => None,
            Some(Selection::Node(i)) if i > index => Some(Selection::Node(i - 1)),
            Some(Selection::Link(i)) if incident.contains(&i) => None,
            Some(Selection::Link(i)) => {
                let shift = incident.iter().filter(|&&removed| removed < i).count();
                Some(Selection::Link(i - shift))
            }
            other => other,
        };
        Some(node)
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selection.take() {
            Some(Selection::Node(i)) => self.remove_node(i).is_some(),
            Some(Selection::Link(i)) => self.remove_link(i).is_some(),
            None => false,
        }
    }

    /// Topmost node under the point (first in order wins)
    pub fn node_at(&self, x: f64, y: f64) -> Option<usize> {
        self.nodes.iter().position(|node| node.contains_point(x, y))
    }

    /// Nodes are tested before links
    pub fn entity_at(&self, x: f64, y: f64) -> Option<Selection> {
        if let Some(i) = self.node_at(x, y) {
            return Some(Selection::Node(i));
        }
        let scene = self.scene();
        self.links
            .iter()
            .position(|link| link.contains_point(&scene, x, y))
            .map(Selection::Link)
    }

    pub fn select_at(&mut self, x: f64, y: f64) -> Option<Selection> {
        self.selection = self.entity_at(x, y);
        self.selection
    }

    /// Label of the selected entity, for editing
    pub fn selected_text_mut(&mut self) -> Option<&mut String> {
        match self.selection? {
            Selection::Node(i) => self.nodes.get_mut(i).map(|n| &mut n.text),
            Selection::Link(i) => self.links.get_mut(i).map(AnyLink::text_mut),
        }
    }

    pub fn set_node_text(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) => {
                node.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Refused when the configuration does not allow accept states
    pub fn toggle_accept_state(&mut self, index: usize) -> bool {
        if !self.config.node.can_be_accept_state {
            return false;
        }
        match self.nodes.get_mut(index) {
            Some(node) => {
                node.is_accept_state = !node.is_accept_state;
                true
            }
            None => false,
        }
    }

    /// Remember where the pointer grabbed the selected entity
    pub fn begin_drag(&mut self, x: f64, y: f64) {
        match self.selection {
            Some(Selection::Node(i)) => {
                if let Some(node) = self.nodes.get_mut(i) {
                    node.set_mouse_start(x, y);
                }
            }
            Some(Selection::Link(i)) => {
                if let Some(AnyLink::SelfLink(link)) = self.links.get_mut(i) {
                    if let Some(node) = self.nodes.get(link.node) {
                        link.set_mouse_start(node, x, y);
                    }
                }
            }
            None => {}
        }
    }

    /// Move the selected node, or reshape the selected link
    pub fn drag_to(&mut self, x: f64, y: f64) {
        let snap = self.config.canvas.snap_to_padding;
        match self.selection {
            Some(Selection::Node(i)) => {
                if let Some(node) = self.nodes.get_mut(i) {
                    node.set_anchor_point(x, y);
                }
            }
            Some(Selection::Link(i)) => {
                let nodes = &self.nodes;
                match self.links.get_mut(i) {
                    Some(AnyLink::Link(link)) => {
                        if let (Some(a), Some(b)) = (nodes.get(link.node_a), nodes.get(link.node_b)) {
                            link.set_anchor_point(a, b, x, y, snap);
                        }
                    }
                    Some(AnyLink::SelfLink(link)) => {
                        if let Some(node) = nodes.get(link.node) {
                            link.set_anchor_point(node, x, y);
                        }
                    }
                    Some(AnyLink::StartLink(link)) => {
                        if let Some(node) = nodes.get(link.node) {
                            link.set_anchor_point(node, x, y, snap);
                        }
                    }
                    None => {}
                }
            }
            None => {}
        }
    }

    pub fn move_node(&mut self, index: usize, x: f64, y: f64) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) => {
                node.x = x;
                node.y = y;
                true
            }
            None => false,
        }
    }

    /// Start drawing a link from a node or from empty space
    pub fn begin_link_gesture(&mut self, x: f64, y: f64) {
        self.origin = Some(match self.node_at(x, y) {
            Some(i) => GestureOrigin::Node(i),
            None => GestureOrigin::Point(Point::new(x, y)),
        });
        self.update_link_gesture(x, y);
    }

    /// Recompute the in-flight link for the current pointer position
    pub fn update_link_gesture(&mut self, x: f64, y: f64) {
        let Some(origin) = self.origin else {
            return;
        };
        if matches!(origin, GestureOrigin::Node(from) if from >= self.nodes.len()) {
            self.cancel_link_gesture();
            return;
        }
        let snap = self.config.canvas.snap_to_padding;
        let mouse = Point::new(x, y);
        let target = self.node_at(x, y);

        self.in_flight = match (origin, target) {
            (GestureOrigin::Point(start), Some(node)) => {
                let mut link = StartLink::new(node, &self.nodes[node], &self.config);
                link.set_anchor_point(&self.nodes[node], start.x, start.y, snap);
                Some(InFlight::Link(link.into()))
            }
            (GestureOrigin::Point(start), None) => {
                Some(InFlight::Temporary(TemporaryLink::new(start, mouse)))
            }
            (GestureOrigin::Node(from), Some(node)) if node == from => {
                let mut link = SelfLink::new(from, &self.config);
                link.set_anchor_point(&self.nodes[from], x, y);
                Some(InFlight::Link(link.into()))
            }
            (GestureOrigin::Node(from), Some(node)) => {
                Some(InFlight::Link(Link::new(from, node, &self.config).into()))
            }
            (GestureOrigin::Node(from), None) => {
                let edge = self.nodes[from].closest_point_on_circle(mouse);
                Some(InFlight::Temporary(TemporaryLink::new(edge, mouse)))
            }
        };
    }

    /// Finish the gesture; returns the index of the inserted link, if any
    pub fn finish_link_gesture(&mut self, x: f64, y: f64) -> Option<usize> {
        self.update_link_gesture(x, y);
        self.origin = None;
        match self.in_flight.take()? {
            InFlight::Link(link) => {
                let inserted = self.insert_link(link);
                if let Some(i) = inserted {
                    self.selection = Some(Selection::Link(i));
                }
                inserted
            }
            InFlight::Temporary(_) => None,
        }
    }

    pub fn cancel_link_gesture(&mut self) {
        self.origin = None;
        self.in_flight = None;
    }
}
