//! Serialization Layer
//! JSON interchange document: export structs and validating record-by-record import

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::Config;
use crate::geometry::normalize_angle;
use crate::model::{AnyLink, Appearance, Document, Link, Node, SelfLink, StartLink};

#[cfg(test)]
mod tests;

/// Document-level failure; the document has already been cleared when this is returned
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Could not parse document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Why a single node or link record was dropped during import
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("Record is not a JSON object")]
    NotAnObject,
    #[error("Missing or invalid required field `{0}`")]
    MissingField(&'static str),
    #[error("Node reference {0} does not resolve")]
    NodeIndex(String),
    #[error("Unknown link type {0:?}")]
    UnknownType(String),
    #[error("Link endpoints are the same node")]
    IdenticalEndpoints,
    #[error("{0} insertion refused")]
    InsertionRefused(&'static str),
}

pub type RecordResult<T> = Result<T, RecordError>;

/// Counts of what a load kept and dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub nodes: usize,
    pub links: usize,
    pub dropped_nodes: usize,
    pub dropped_links: usize,
}

impl LoadReport {
    pub fn is_empty(&self) -> bool {
        self.nodes == 0 && self.links == 0
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceDoc {
    pub opacity: f64,
    pub dashed: bool,
    pub border_color: String,
    pub background_color: String,
    pub text_color: String,
}

impl From<&Appearance> for AppearanceDoc {
    fn from(look: &Appearance) -> Self {
        Self {
            opacity: look.opacity,
            dashed: look.dashed,
            border_color: look.border_color.clone(),
            background_color: look.background_color.clone(),
            text_color: look.text_color.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDoc {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub is_accept_state: bool,
    /// Informational only; re-derived from start links on import
    pub is_initial_state: bool,
    pub radius: f64,
    #[serde(flatten)]
    pub appearance: AppearanceDoc,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkFields {
    pub node_a: usize,
    pub node_b: usize,
    pub text: String,
    pub line_angle_adjust: f64,
    pub parallel_part: f64,
    pub perpendicular_part: f64,
    pub arrow_head_at_src: bool,
    pub arrow_head_at_dst: bool,
    #[serde(flatten)]
    pub appearance: AppearanceDoc,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfLinkFields {
    pub node: usize,
    pub text: String,
    pub anchor_angle: f64,
    #[serde(flatten)]
    pub appearance: AppearanceDoc,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartLinkFields {
    pub node: usize,
    pub text: String,
    pub delta_x: f64,
    pub delta_y: f64,
    pub synchronize_visual_with_node: bool,
    #[serde(flatten)]
    pub appearance: AppearanceDoc,
}

/// Link record; the `type` tag selects the variant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum LinkDoc {
    Link(LinkFields),
    SelfLink(SelfLinkFields),
    StartLink(StartLinkFields),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDoc {
    pub fsm_alphabet: String,
    pub nodes: Vec<NodeDoc>,
    pub links: Vec<LinkDoc>,
}

impl DocumentDoc {
    pub fn from_document(document: &Document) -> Self {
        Self {
            fsm_alphabet: document.alphabet.clone(),
            nodes: document.nodes.iter().map(Node::to_json).collect(),
            links: document.links.iter().map(AnyLink::to_json).collect(),
        }
    }
}

impl Node {
    pub fn to_json(&self) -> NodeDoc {
        NodeDoc {
            x: self.x,
            y: self.y,
            text: self.text.clone(),
            is_accept_state: self.is_accept_state,
            is_initial_state: self.is_initial_state(),
            radius: self.radius(),
            appearance: (&self.appearance).into(),
        }
    }
}

impl AnyLink {
    pub fn to_json(&self) -> LinkDoc {
        match self {
            AnyLink::Link(l) => LinkDoc::Link(LinkFields {
                node_a: l.node_a,
                node_b: l.node_b,
                text: l.text.clone(),
                line_angle_adjust: l.line_angle_adjust,
                parallel_part: l.parallel_part,
                perpendicular_part: l.perpendicular_part,
                arrow_head_at_src: l.arrow_head_at_src,
                arrow_head_at_dst: l.arrow_head_at_dst,
                appearance: (&l.appearance).into(),
            }),
            AnyLink::SelfLink(l) => LinkDoc::SelfLink(SelfLinkFields {
                node: l.node,
                text: l.text.clone(),
                anchor_angle: l.anchor_angle,
                appearance: (&l.appearance).into(),
            }),
            AnyLink::StartLink(l) => LinkDoc::StartLink(StartLinkFields {
                node: l.node,
                text: l.text.clone(),
                delta_x: l.delta_x,
                delta_y: l.delta_y,
                synchronize_visual_with_node: l.synchronize_visual_with_node,
                appearance: (&l.appearance).into(),
            }),
        }
    }
}

pub fn to_json_value(document: &Document) -> Result<Value, serde_json::Error> {
    serde_json::to_value(DocumentDoc::from_document(document))
}

/// Pretty-printed interchange document
pub fn to_json_string(document: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&DocumentDoc::from_document(document))
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// What a link record needs to resolve its node references
pub struct ImportContext<'a> {
    pub nodes: &'a [Node],
    /// Source array position -> document position; `None` for dropped nodes
    pub index_map: &'a [Option<usize>],
    pub config: &'a Config,
}

impl<'a> ImportContext<'a> {
    pub fn new(nodes: &'a [Node], index_map: &'a [Option<usize>], config: &'a Config) -> Self {
        Self {
            nodes,
            index_map,
            config,
        }
    }

    /// Strict lookup: a reference that does not land on a loaded node fails the record
    pub fn resolve_node(&self, value: Option<&Value>, field: &'static str) -> RecordResult<usize> {
        let value = value.ok_or(RecordError::MissingField(field))?;
        let position = value
            .as_u64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|i| usize::try_from(i).ok());
        position
            .and_then(|i| self.index_map.get(i).copied().flatten())
            .filter(|i| *i < self.nodes.len())
            .ok_or_else(|| RecordError::NodeIndex(value.to_string()))
    }
}

/// Typed, validating view over one JSON record.
/// Rejected optional fields are logged and reported as absent.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    kind: &'static str,
}

impl<'a> Fields<'a> {
    fn new(value: &'a Value, kind: &'static str) -> RecordResult<Self> {
        let map = value.as_object().ok_or(RecordError::NotAnObject)?;
        Ok(Self { map, kind })
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    fn accept<T>(&self, key: &str, parsed: Option<T>) -> Option<T> {
        if parsed.is_none() && self.map.contains_key(key) {
            debug!("{}: ignoring invalid `{}` field", self.kind, key);
        }
        parsed
    }

    fn number(&self, key: &str) -> Option<f64> {
        let parsed = self.get(key).and_then(Value::as_f64).filter(|v| v.is_finite());
        self.accept(key, parsed)
    }

    fn required_number(&self, key: &'static str) -> RecordResult<f64> {
        self.number(key).ok_or(RecordError::MissingField(key))
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        let parsed = self.get(key).and_then(Value::as_bool);
        self.accept(key, parsed)
    }

    fn string(&self, key: &str) -> Option<String> {
        let parsed = self.get(key).and_then(Value::as_str).map(str::to_string);
        self.accept(key, parsed)
    }

    fn opacity(&self, key: &str) -> Option<f64> {
        let parsed = self
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| (0.0..=1.0).contains(v));
        self.accept(key, parsed)
    }

    fn color(&self, key: &str) -> Option<String> {
        let parsed = self
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| is_safe_color(s))
            .map(str::to_string);
        self.accept(key, parsed)
    }

    /// Overlay valid style fields on top of the defaults
    fn appearance(&self, mut look: Appearance) -> Appearance {
        if let Some(v) = self.opacity("opacity") {
            look.opacity = v;
        }
        if let Some(v) = self.boolean("dashed") {
            look.dashed = v;
        }
        if let Some(v) = self.color("borderColor") {
            look.border_color = v;
        }
        if let Some(v) = self.color("backgroundColor") {
            look.background_color = v;
        }
        if let Some(v) = self.color("textColor") {
            look.text_color = v;
        }
        look
    }
}

/// Colour strings end up in SVG attributes and TikZ options; keep them to a plain charset
fn is_safe_color(s: &str) -> bool {
    !s.trim().is_empty()
        && s.len() <= 64
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "#(),.% -".contains(c))
}

impl Node {
    /// Position is required; every other field falls back to the configured default.
    /// The initial-state marking is never read.
    pub fn from_json(value: &Value, config: &Config) -> RecordResult<Node> {
        let fields = Fields::new(value, "Node")?;
        let mut node = Node::new(
            fields.required_number("x")?,
            fields.required_number("y")?,
            config,
        );
        if let Some(text) = fields.string("text") {
            node.text = text;
        }
        if let Some(accept) = fields.boolean("isAcceptState") {
            node.is_accept_state = accept && config.node.can_be_accept_state;
        }
        if let Some(radius) = fields.number("radius") {
            node.set_radius(radius, &config.node);
        }
        node.appearance = fields.appearance(node.appearance);
        Ok(node)
    }
}

impl Link {
    pub fn from_json(value: &Value, context: &ImportContext<'_>) -> RecordResult<Link> {
        let fields = Fields::new(value, "Link")?;
        let node_a = context.resolve_node(fields.get("nodeA"), "nodeA")?;
        let node_b = context.resolve_node(fields.get("nodeB"), "nodeB")?;
        if node_a == node_b {
            return Err(RecordError::IdenticalEndpoints);
        }

        let mut link = Link::new(node_a, node_b, context.config);
        if let Some(text) = fields.string("text") {
            link.text = text;
        }
        if let Some(v) = fields.number("lineAngleAdjust") {
            link.line_angle_adjust = v;
        }
        if let Some(v) = fields.number("parallelPart") {
            link.parallel_part = v;
        }
        if let Some(v) = fields.number("perpendicularPart") {
            link.perpendicular_part = v;
        }
        if let Some(v) = fields.boolean("arrowHeadAtSrc") {
            link.arrow_head_at_src = v;
        }
        if let Some(v) = fields.boolean("arrowHeadAtDst") {
            link.arrow_head_at_dst = v;
        }
        link.appearance = fields.appearance(link.appearance);
        Ok(link)
    }
}

impl SelfLink {
    pub fn from_json(value: &Value, context: &ImportContext<'_>) -> RecordResult<SelfLink> {
        let fields = Fields::new(value, "SelfLink")?;
        let node = context.resolve_node(fields.get("node"), "node")?;

        let mut link = SelfLink::new(node, context.config);
        if let Some(text) = fields.string("text") {
            link.text = text;
        }
        if let Some(angle) = fields.number("anchorAngle") {
            link.anchor_angle = normalize_angle(angle);
        }
        link.appearance = fields.appearance(link.appearance);
        Ok(link)
    }
}

impl StartLink {
    pub fn from_json(value: &Value, context: &ImportContext<'_>) -> RecordResult<StartLink> {
        let fields = Fields::new(value, "StartLink")?;
        let node = context.resolve_node(fields.get("node"), "node")?;
        let target = context
            .nodes
            .get(node)
            .ok_or_else(|| RecordError::NodeIndex(node.to_string()))?;

        let mut link = StartLink::new(node, target, context.config);
        if let Some(text) = fields.string("text") {
            link.text = text;
        }
        if let Some(v) = fields.number("deltaX") {
            link.delta_x = v;
        }
        if let Some(v) = fields.number("deltaY") {
            link.delta_y = v;
        }
        if let Some(v) = fields.boolean("synchronizeVisualWithNode") {
            link.synchronize_visual_with_node = v;
        }
        link.appearance = fields.appearance(link.appearance);
        Ok(link)
    }
}

impl AnyLink {
    /// Dispatch on the `type` tag
    pub fn from_json(value: &Value, context: &ImportContext<'_>) -> RecordResult<AnyLink> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(RecordError::MissingField("type"))?;
        match kind {
            "Link" => Link::from_json(value, context).map(AnyLink::Link),
            "SelfLink" => SelfLink::from_json(value, context).map(AnyLink::SelfLink),
            "StartLink" => StartLink::from_json(value, context).map(AnyLink::StartLink),
            other => Err(RecordError::UnknownType(other.to_string())),
        }
    }
}

/// Replace the document's contents with the records in `source`.
///
/// The document is cleared first, so a syntax error leaves it empty. Each record is
/// applied independently; bad records are dropped and counted, never fatal.
pub fn load_document(document: &mut Document, source: &str) -> Result<LoadReport, LoadError> {
    document.clear();
    let value: Value = serde_json::from_str(source)?;
    Ok(load_value(document, &value))
}

/// Same as [`load_document`] for an already parsed value
pub fn load_value(document: &mut Document, value: &Value) -> LoadReport {
    document.clear();
    let mut report = LoadReport::default();
    let Some(root) = value.as_object() else {
        warn!("Document root is not an object; nothing loaded");
        return report;
    };

    if let Some(alphabet) = root
        .get("fsmAlphabet")
        .or_else(|| root.get("alphabet"))
        .and_then(Value::as_str)
    {
        document.alphabet = alphabet.to_string();
    }

    let config = document.config().clone();
    let mut index_map = Vec::new();
    for (i, record) in records(root, "nodes").iter().enumerate() {
        match Node::from_json(record, &config) {
            Ok(node) => {
                index_map.push(Some(document.push_node(node)));
                report.nodes += 1;
            }
            Err(e) => {
                warn!("Dropping node record {}: {}", i, e);
                index_map.push(None);
                report.dropped_nodes += 1;
            }
        }
    }

    for (i, record) in records(root, "links").iter().enumerate() {
        let parsed = {
            let context = ImportContext::new(&document.nodes, &index_map, &config);
            AnyLink::from_json(record, &context)
        };
        let result = parsed.and_then(|link| {
            let kind = link.type_name();
            document
                .insert_link(link)
                .ok_or(RecordError::InsertionRefused(kind))
        });
        match result {
            Ok(_) => report.links += 1,
            Err(e) => {
                warn!("Dropping link record {}: {}", i, e);
                report.dropped_links += 1;
            }
        }
    }

    info!(
        "Loaded {} nodes and {} links ({} nodes, {} links dropped)",
        report.nodes, report.links, report.dropped_nodes, report.dropped_links
    );
    report
}

fn records<'a>(root: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    match root.get(key) {
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => {
            warn!("`{}` is not an array; ignoring it", key);
            &[]
        }
        None => &[],
    }
}
