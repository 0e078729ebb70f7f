//! Unit tests for export and validating import

use serde_json::{json, Value};

use crate::config::{Config, Preset};
use crate::model::{AnyLink, Document, Link, Node, SelfLink, StartLink};
use crate::serialization::{
    load_document, load_value, to_json_string, to_json_value, ImportContext, LoadError, RecordError,
};

fn sample_document() -> Document {
    let mut doc = Document::default();
    doc.alphabet = "a,b".to_string();
    let s0 = doc.push_node(Node::new(100.0, 100.0, doc.config()).with_text("S_0"));
    let s1 = doc.push_node(Node::new(300.0, 120.0, doc.config()).with_text("S_1"));
    doc.nodes[s1].is_accept_state = true;

    let mut link = Link::new(s0, s1, doc.config()).with_text("a");
    link.perpendicular_part = 25.0;
    link.parallel_part = 0.4;
    doc.insert_link(link);
    doc.insert_link(SelfLink::new(s1, doc.config()).with_text("b"));
    let start = StartLink::new(s0, &doc.nodes[s0], doc.config());
    doc.insert_link(start);
    doc
}

#[test]
fn test_export_shape() {
    let value = to_json_value(&sample_document()).unwrap();
    assert_eq!(value["fsmAlphabet"], "a,b");
    assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(value["nodes"][0]["text"], "S_0");
    assert_eq!(value["nodes"][0]["isInitialState"], true);
    assert_eq!(value["nodes"][1]["isAcceptState"], true);
    assert_eq!(value["nodes"][0]["borderColor"], "black");

    let links = value["links"].as_array().unwrap();
    assert_eq!(links[0]["type"], "Link");
    assert_eq!(links[0]["nodeA"], 0);
    assert_eq!(links[0]["nodeB"], 1);
    assert_eq!(links[0]["perpendicularPart"], 25.0);
    assert_eq!(links[1]["type"], "SelfLink");
    assert_eq!(links[1]["node"], 1);
    assert_eq!(links[2]["type"], "StartLink");
    assert_eq!(links[2]["deltaX"], -60.0);
}

#[test]
fn test_round_trip_preserves_fields() {
    let original = sample_document();
    let json = to_json_string(&original).unwrap();

    let mut restored = Document::default();
    let report = load_document(&mut restored, &json).unwrap();
    assert_eq!(report.nodes, 2);
    assert_eq!(report.links, 3);
    assert_eq!(report.dropped_nodes + report.dropped_links, 0);

    assert_eq!(restored.alphabet, original.alphabet);
    assert_eq!(restored.nodes, original.nodes);
    assert_eq!(restored.links, original.links);
}

#[test]
fn test_initial_state_is_rederived() {
    let source = json!({
        "nodes": [
            {"x": 0, "y": 0, "isInitialState": true},
            {"x": 100, "y": 0, "isInitialState": false}
        ],
        "links": [{"type": "StartLink", "node": 1}]
    });
    let mut doc = Document::default();
    load_value(&mut doc, &source);
    assert!(!doc.nodes[0].is_initial_state());
    assert!(doc.nodes[1].is_initial_state());
}

#[test]
fn test_out_of_range_link_is_dropped() {
    let source = json!({
        "fsmAlphabet": "a",
        "nodes": [{"x": 0, "y": 0}, {"x": 100, "y": 0}],
        "links": [
            {"type": "Link", "nodeA": 0, "nodeB": 3},
            {"type": "Link", "nodeA": 0, "nodeB": 1, "text": "a"}
        ]
    });
    let mut doc = Document::default();
    let report = load_value(&mut doc, &source);
    assert_eq!(report.nodes, 2);
    assert_eq!(report.links, 1);
    assert_eq!(report.dropped_links, 1);
    assert_eq!(doc.links[0].text(), "a");
}

#[test]
fn test_link_to_dropped_node_is_dropped() {
    let source = json!({
        "nodes": [{"x": 0, "y": 0}, {"y": 5}, {"x": 100, "y": 0}],
        "links": [
            {"type": "Link", "nodeA": 0, "nodeB": 1},
            {"type": "Link", "nodeA": 0, "nodeB": 2}
        ]
    });
    let mut doc = Document::default();
    let report = load_value(&mut doc, &source);
    assert_eq!(report.dropped_nodes, 1);
    assert_eq!(report.dropped_links, 1);
    // source index 2 now lives at document index 1
    match &doc.links[0] {
        AnyLink::Link(link) => assert_eq!((link.node_a, link.node_b), (0, 1)),
        other => panic!("unexpected link {:?}", other),
    }
}

#[test]
fn test_unknown_type_and_identical_endpoints_dropped() {
    let source = json!({
        "nodes": [{"x": 0, "y": 0}],
        "links": [
            {"type": "Curve", "node": 0},
            {"nodeA": 0, "nodeB": 0},
            {"type": "Link", "nodeA": 0, "nodeB": 0}
        ]
    });
    let mut doc = Document::default();
    let report = load_value(&mut doc, &source);
    assert_eq!(report.nodes, 1);
    assert_eq!(report.links, 0);
    assert_eq!(report.dropped_links, 3);
}

#[test]
fn test_record_errors() {
    let config = Config::default();
    let nodes = vec![Node::new(0.0, 0.0, &config)];
    let index_map = vec![Some(0)];
    let context = ImportContext::new(&nodes, &index_map, &config);

    assert_eq!(
        AnyLink::from_json(&json!({"type": "Curve"}), &context),
        Err(RecordError::UnknownType("Curve".to_string()))
    );
    assert_eq!(
        AnyLink::from_json(&json!({"type": "Link", "nodeA": 0, "nodeB": 0}), &context),
        Err(RecordError::IdenticalEndpoints)
    );
    assert_eq!(
        AnyLink::from_json(&json!({"type": "SelfLink", "node": 7}), &context),
        Err(RecordError::NodeIndex("7".to_string()))
    );
    assert_eq!(
        AnyLink::from_json(&json!({"type": "SelfLink", "node": "0"}), &context),
        Err(RecordError::NodeIndex("\"0\"".to_string()))
    );
    assert_eq!(
        AnyLink::from_json(&json!({"type": "StartLink"}), &context),
        Err(RecordError::MissingField("node"))
    );
    assert_eq!(
        Node::from_json(&json!([1, 2]), &config),
        Err(RecordError::NotAnObject)
    );
    assert_eq!(
        Node::from_json(&json!({"x": 1}), &config),
        Err(RecordError::MissingField("y"))
    );
}

#[test]
fn test_integral_float_index_accepted() {
    let config = Config::default();
    let nodes = vec![Node::new(0.0, 0.0, &config)];
    let index_map = vec![Some(0)];
    let context = ImportContext::new(&nodes, &index_map, &config);
    assert!(SelfLink::from_json(&json!({"node": 0.0}), &context).is_ok());
    assert!(SelfLink::from_json(&json!({"node": 0.5}), &context).is_err());
    assert!(SelfLink::from_json(&json!({"node": -1}), &context).is_err());
}

#[test]
fn test_invalid_fields_fall_back_to_defaults() {
    let config = Config::default();
    let node = Node::from_json(
        &json!({
            "x": 10,
            "y": 20,
            "text": 42,
            "isAcceptState": "yes",
            "radius": "big",
            "opacity": 3.5,
            "dashed": 1,
            "borderColor": "\"/><script>",
            "backgroundColor": "",
            "textColor": "#ff0000"
        }),
        &config,
    )
    .unwrap();

    assert_eq!(node.x, 10.0);
    assert_eq!(node.y, 20.0);
    assert_eq!(node.text, "");
    assert!(!node.is_accept_state);
    assert_eq!(node.radius(), 30.0);
    assert_eq!(node.appearance.opacity, 1.0);
    assert!(!node.appearance.dashed);
    assert_eq!(node.appearance.border_color, "black");
    assert_eq!(node.appearance.background_color, "white");
    assert_eq!(node.appearance.text_color, "#ff0000");
}

#[test]
fn test_radius_is_clamped_on_import() {
    let config = Config::default();
    let node = Node::from_json(&json!({"x": 0, "y": 0, "radius": 2}), &config).unwrap();
    assert_eq!(node.radius(), 7.0);
}

#[test]
fn test_accept_state_ignored_when_preset_disallows() {
    let config = Config::preset(Preset::DirectedGraph);
    let node = Node::from_json(&json!({"x": 0, "y": 0, "isAcceptState": true}), &config).unwrap();
    assert!(!node.is_accept_state);
}

#[test]
fn test_self_link_angle_wrapped() {
    let config = Config::default();
    let nodes = vec![Node::new(0.0, 0.0, &config)];
    let index_map = vec![Some(0)];
    let context = ImportContext::new(&nodes, &index_map, &config);
    let link = SelfLink::from_json(&json!({"node": 0, "anchorAngle": 7.0}), &context).unwrap();
    assert!((link.anchor_angle - (7.0 - std::f64::consts::TAU)).abs() < 1e-9);
}

#[test]
fn test_negative_self_link_angle_round_trips_exactly() {
    let mut original = Document::default();
    let node = original.push_node(Node::new(50.0, 50.0, original.config()));
    let mut link = SelfLink::new(node, original.config()).with_text("x");
    link.anchor_angle = -0.1;
    original.insert_link(link);

    let json = to_json_string(&original).unwrap();
    let mut restored = Document::default();
    load_document(&mut restored, &json).unwrap();

    assert_eq!(restored.links, original.links);
    assert!(matches!(&restored.links[0], AnyLink::SelfLink(link) if link.anchor_angle == -0.1));
}

#[test]
fn test_duplicate_start_link_refused() {
    let source = json!({
        "nodes": [{"x": 0, "y": 0}],
        "links": [
            {"type": "StartLink", "node": 0},
            {"type": "StartLink", "node": 0, "deltaY": -50}
        ]
    });
    let mut doc = Document::default();
    let report = load_value(&mut doc, &source);
    assert_eq!(report.links, 1);
    assert_eq!(report.dropped_links, 1);
    assert!(doc.nodes[0].is_initial_state());
}

#[test]
fn test_preset_gates_import() {
    let source = json!({
        "nodes": [{"x": 0, "y": 0}, {"x": 100, "y": 0}],
        "links": [
            {"type": "Link", "nodeA": 0, "nodeB": 1},
            {"type": "SelfLink", "node": 0},
            {"type": "StartLink", "node": 0}
        ]
    });
    let mut doc = Document::new(Config::preset(Preset::ArrayLike));
    let report = load_value(&mut doc, &source);
    assert_eq!(report.nodes, 2);
    assert_eq!(report.links, 0);
    assert_eq!(report.dropped_links, 3);
}

#[test]
fn test_malformed_json_clears_document() {
    let mut doc = sample_document();
    let result = load_document(&mut doc, "{\"nodes\": [");
    assert!(matches!(result, Err(LoadError::Malformed(_))));
    assert!(doc.is_empty());
    assert!(doc.alphabet.is_empty());
}

#[test]
fn test_non_object_root_is_empty_not_error() {
    let mut doc = sample_document();
    let report = load_document(&mut doc, "[1, 2, 3]").unwrap();
    assert!(report.is_empty());
    assert!(doc.is_empty());
}

#[test]
fn test_alternate_alphabet_key() {
    let mut doc = Document::default();
    load_value(&mut doc, &json!({"alphabet": "x,y"}));
    assert_eq!(doc.alphabet, "x,y");
}

#[test]
fn test_non_array_sections_ignored() {
    let mut doc = Document::default();
    let report = load_value(&mut doc, &json!({"nodes": {"x": 1}, "links": "none"}));
    assert_eq!(report, Default::default());
}

#[test]
fn test_exported_json_is_pretty() {
    let json = to_json_string(&Document::default()).unwrap();
    assert!(json.contains('\n'));
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["nodes"], json!([]));
}
