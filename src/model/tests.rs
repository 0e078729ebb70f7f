//! Unit tests for the entity model and editing session

use std::f64::consts::{FRAC_PI_2, PI};

use crate::config::{Config, Preset};
use crate::geometry::{EndPoints, Point};
use crate::model::{
    AnyLink, Document, InFlight, Link, Node, SelfLink, Selection, StartLink, TemporaryLink,
};

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Three nodes in a row, 200px apart
fn row_document(config: Config) -> Document {
    let mut doc = Document::new(config);
    doc.add_node(100.0, 100.0);
    doc.add_node(300.0, 100.0);
    doc.add_node(500.0, 100.0);
    doc
}

#[test]
fn test_node_defaults() {
    let config = Config::default();
    let node = Node::new(1.0, 2.0, &config);
    assert_eq!(node.radius(), 30.0);
    assert!(!node.is_initial_state());
    assert!(!node.is_accept_state);
    assert_eq!(node.appearance.background_color, "white");
}

#[test]
fn test_radius_clamp() {
    let config = Config::default();
    let mut node = Node::new(0.0, 0.0, &config);
    node.set_radius(3.0, &config.node);
    assert_eq!(node.radius(), 7.0);
    node.set_radius(f64::NAN, &config.node);
    assert_eq!(node.radius(), 7.0);
    node.set_radius(45.0, &config.node);
    assert_eq!(node.radius(), 45.0);
}

#[test]
fn test_node_contains_point() {
    let node = Node::new(100.0, 100.0, &Config::default());
    assert!(node.contains_point(110.0, 110.0));
    assert!(!node.contains_point(130.0, 100.0));
}

#[test]
fn test_node_drag_keeps_offset() {
    let mut node = Node::new(100.0, 100.0, &Config::default());
    node.set_mouse_start(110.0, 95.0);
    node.set_anchor_point(210.0, 195.0);
    assert_eq!(node.center(), Point::new(200.0, 200.0));
}

#[test]
fn test_straight_link_end_points() {
    let doc = row_document(Config::default());
    let link = Link::new(0, 1, doc.config());
    match link.end_points(&doc.nodes[0], &doc.nodes[1]) {
        EndPoints::Line { start, end } => {
            assert_eq!(start, Point::new(130.0, 100.0));
            assert_eq!(end, Point::new(270.0, 100.0));
        }
        other => panic!("expected a line, got {:?}", other),
    }
}

#[test]
fn test_curved_link_end_points() {
    let doc = row_document(Config::default());
    let mut link = Link::new(0, 1, doc.config());
    link.perpendicular_part = 50.0;
    match link.end_points(&doc.nodes[0], &doc.nodes[1]) {
        EndPoints::Arc {
            circle, is_reversed, ..
        } => {
            assert!(is_reversed);
            // anchor at (200, 150): circle passes through both centres and the anchor
            let anchor = link.anchor_point(&doc.nodes[0], &doc.nodes[1]);
            assert!(approx_eq(anchor.x, 200.0));
            assert!(approx_eq(anchor.y, 150.0));
            let d = ((anchor.x - circle.center.x).powi(2) + (anchor.y - circle.center.y).powi(2)).sqrt();
            assert!(approx_eq(d, circle.radius));
        }
        other => panic!("expected an arc, got {:?}", other),
    }
}

#[test]
fn test_tiny_bend_renders_straight() {
    let doc = row_document(Config::default());
    let mut link = Link::new(0, 1, doc.config());
    link.perpendicular_part = 1e-9;
    assert!(matches!(
        link.end_points(&doc.nodes[0], &doc.nodes[1]),
        EndPoints::Line { .. }
    ));
}

#[test]
fn test_link_anchor_snaps_straight() {
    let doc = row_document(Config::default());
    let (a, b) = (&doc.nodes[0], &doc.nodes[1]);
    let mut link = Link::new(0, 1, doc.config());

    link.set_anchor_point(a, b, 200.0, 60.0, 6.0);
    assert!(approx_eq(link.parallel_part, 0.5));
    assert!(approx_eq(link.perpendicular_part, -40.0));

    link.set_anchor_point(a, b, 180.0, 97.0, 6.0);
    assert_eq!(link.perpendicular_part, 0.0);
    assert_eq!(link.line_angle_adjust, PI);

    link.set_anchor_point(a, b, 180.0, 103.0, 6.0);
    assert_eq!(link.perpendicular_part, 0.0);
    assert_eq!(link.line_angle_adjust, 0.0);
}

#[test]
fn test_anchor_outside_segment_does_not_snap() {
    let doc = row_document(Config::default());
    let mut link = Link::new(0, 1, doc.config());
    link.set_anchor_point(&doc.nodes[0], &doc.nodes[1], 400.0, 103.0, 6.0);
    assert!(approx_eq(link.perpendicular_part, 3.0));
}

#[test]
fn test_link_hit_test() {
    let doc = row_document(Config::default());
    let scene = doc.scene();
    let link = Link::new(0, 1, doc.config());
    assert!(link.contains_point(&scene, 200.0, 104.0));
    assert!(!link.contains_point(&scene, 200.0, 110.0));
    assert!(!link.contains_point(&scene, 400.0, 100.0));
}

#[test]
fn test_arrow_overrides() {
    let config = Config::preset(Preset::DirectedGraph);
    let mut link = Link::new(0, 1, &config);

    assert!(!link.shows_arrow_at_src(&config.link));
    assert!(link.set_arrow_head_at_src(true, &config.link));
    assert!(link.shows_arrow_at_src(&config.link));

    // the destination end is not overridable in this preset
    assert!(!link.set_arrow_head_at_dst(false, &config.link));
    assert!(link.shows_arrow_at_dst(&config.link));
}

#[test]
fn test_stored_override_ignored_when_not_overridable() {
    let config = Config::default();
    let mut link = Link::new(0, 1, &config);
    link.arrow_head_at_dst = false;
    assert!(link.shows_arrow_at_dst(&config.link));
}

#[test]
fn test_self_link_snaps_to_right_angles() {
    let config = Config::default();
    let node = Node::new(100.0, 100.0, &config);
    let mut link = SelfLink::new(0, &config);

    link.set_anchor_point(&node, 103.0, 50.0);
    assert!(approx_eq(link.anchor_angle, -FRAC_PI_2));

    link.set_anchor_point(&node, 50.0, 99.0);
    assert!(approx_eq(link.anchor_angle, PI));

    link.set_anchor_point(&node, 150.0, 140.0);
    assert!(link.anchor_angle > 0.0 && link.anchor_angle < FRAC_PI_2);
}

#[test]
fn test_self_link_drag_uses_offset() {
    let config = Config::default();
    let node = Node::new(0.0, 0.0, &config);
    let mut link = SelfLink::new(0, &config);
    link.anchor_angle = FRAC_PI_2;
    link.set_mouse_start(&node, 10.0, 0.0);
    link.set_anchor_point(&node, 10.0, 0.0);
    assert!(approx_eq(link.anchor_angle, FRAC_PI_2));
}

#[test]
fn test_self_link_geometry_and_hit() {
    let doc = {
        let mut doc = Document::default();
        doc.add_node(100.0, 100.0);
        doc
    };
    let link = SelfLink::new(0, doc.config());
    match link.end_points(&doc.nodes[0]) {
        EndPoints::Arc { circle, .. } => {
            assert!(approx_eq(circle.center.x, 145.0));
            assert!(approx_eq(circle.radius, 22.5));
        }
        other => panic!("expected an arc, got {:?}", other),
    }
    let scene = doc.scene();
    assert!(link.contains_point(&scene, 167.5, 100.0));
    assert!(!link.contains_point(&scene, 145.0, 100.0));
}

#[test]
fn test_start_link_snapping() {
    let config = Config::default();
    let node = Node::new(100.0, 100.0, &config);
    let mut link = StartLink::new(0, &node, &config);
    assert_eq!((link.delta_x, link.delta_y), (-60.0, 0.0));

    link.set_anchor_point(&node, 40.0, 104.0, 6.0);
    assert_eq!((link.delta_x, link.delta_y), (-60.0, 0.0));
    link.set_anchor_point(&node, 97.0, 20.0, 6.0);
    assert_eq!((link.delta_x, link.delta_y), (0.0, -80.0));
}

#[test]
fn test_start_link_synchronized_style() {
    let config = Config::default();
    let mut node = Node::new(0.0, 0.0, &config);
    node.appearance.border_color = "red".to_string();
    let mut link = StartLink::new(0, &node, &config);
    assert_eq!(link.effective_appearance(&node).border_color, "black");
    link.synchronize_visual_with_node = true;
    assert_eq!(link.effective_appearance(&node).border_color, "red");
}

#[test]
fn test_insertion_policy() {
    let mut doc = row_document(Config::default());
    let first = StartLink::new(0, &doc.nodes[0], doc.config());
    let second = StartLink::new(0, &doc.nodes[0], doc.config());
    assert!(doc.insert_link(first).is_some());
    assert!(doc.nodes[0].is_initial_state());
    assert!(doc.insert_link(second).is_none());
    assert_eq!(doc.links.len(), 1);

    let same = Link::new(1, 1, doc.config());
    assert!(doc.insert_link(same).is_none());
    let dangling = Link::new(1, 9, doc.config());
    assert!(doc.insert_link(dangling).is_none());
}

#[test]
fn test_config_gates_insertion() {
    let mut doc = row_document(Config::preset(Preset::DirectedGraph));
    let start = StartLink::new(0, &doc.nodes[0], doc.config());
    assert!(doc.insert_link(start).is_none());
    assert!(!doc.nodes[0].is_initial_state());
    assert!(doc.insert_link(SelfLink::new(0, doc.config())).is_some());

    let mut doc = row_document(Config::preset(Preset::ArrayLike));
    assert!(doc.insert_link(Link::new(0, 1, doc.config())).is_none());
    assert!(doc.insert_link(SelfLink::new(0, doc.config())).is_none());
}

#[test]
fn test_remove_start_link_clears_initial() {
    let mut doc = row_document(Config::default());
    let start = StartLink::new(1, &doc.nodes[1], doc.config());
    let i = doc.insert_link(start).unwrap();
    assert!(doc.remove_link(i).is_some());
    assert!(!doc.nodes[1].is_initial_state());

    // a fresh start link is accepted again
    let again = StartLink::new(1, &doc.nodes[1], doc.config());
    assert!(doc.insert_link(again).is_some());
}

#[test]
fn test_cascade_delete_remaps_indices() {
    let mut doc = row_document(Config::default());
    doc.insert_link(Link::new(0, 1, doc.config()));
    doc.insert_link(Link::new(1, 2, doc.config()));
    doc.insert_link(Link::new(0, 2, doc.config()).with_text("keep"));
    doc.insert_link(SelfLink::new(2, doc.config()));

    assert!(doc.remove_node(1).is_some());
    assert_eq!(doc.nodes.len(), 2);
    assert_eq!(doc.links.len(), 2);
    assert_eq!(doc.links[0].text(), "keep");
    assert_eq!(doc.links[0].node_indices(), vec![0, 1]);
    assert_eq!(doc.links[1].node_indices(), vec![1]);
}

#[test]
fn test_cascade_delete_runs_removal_hooks() {
    let mut doc = row_document(Config::default());
    let start = StartLink::new(0, &doc.nodes[0], doc.config());
    doc.insert_link(start);
    doc.remove_node(0);
    assert!(doc.links.is_empty());
    assert!(doc.nodes.iter().all(|n| !n.is_initial_state()));
}

#[test]
fn test_selection_follows_removal() {
    let mut doc = row_document(Config::default());
    doc.selection = Some(Selection::Node(2));
    doc.remove_node(0);
    assert_eq!(doc.selection, Some(Selection::Node(1)));

    doc.selection = Some(Selection::Node(0));
    assert!(doc.delete_selected());
    assert_eq!(doc.selection, None);
    assert_eq!(doc.nodes.len(), 1);
}

#[test]
fn test_node_removal_keeps_surviving_link_selected() {
    let mut doc = row_document(Config::default());
    doc.insert_link(Link::new(0, 1, doc.config()));
    doc.insert_link(Link::new(1, 2, doc.config()));
    doc.insert_link(Link::new(0, 2, doc.config()).with_text("keep"));

    doc.selection = Some(Selection::Link(2));
    doc.remove_node(1);
    assert_eq!(doc.selection, Some(Selection::Link(0)));
    assert_eq!(doc.links[0].text(), "keep");

    doc.selection = Some(Selection::Link(0));
    doc.remove_node(0);
    assert_eq!(doc.selection, None);
}

#[test]
fn test_hit_testing_prefers_nodes() {
    let mut doc = row_document(Config::default());
    doc.insert_link(Link::new(0, 1, doc.config()));

    assert_eq!(doc.entity_at(105.0, 100.0), Some(Selection::Node(0)));
    assert_eq!(doc.entity_at(200.0, 100.0), Some(Selection::Link(0)));
    assert_eq!(doc.entity_at(200.0, 300.0), None);
}

#[test]
fn test_overlapping_nodes_first_wins() {
    let mut doc = Document::default();
    doc.add_node(100.0, 100.0);
    doc.add_node(110.0, 100.0);
    assert_eq!(doc.node_at(105.0, 100.0), Some(0));
}

#[test]
fn test_toggle_accept_state() {
    let mut doc = row_document(Config::default());
    assert!(doc.toggle_accept_state(0));
    assert!(doc.nodes[0].is_accept_state);

    let mut doc = row_document(Config::preset(Preset::UndirectedGraph));
    assert!(!doc.toggle_accept_state(0));
    assert!(!doc.nodes[0].is_accept_state);
}

#[test]
fn test_selected_text_editing() {
    let mut doc = row_document(Config::default());
    doc.select_at(300.0, 100.0);
    if let Some(text) = doc.selected_text_mut() {
        text.push_str("q_1");
    }
    assert_eq!(doc.nodes[1].text, "q_1");
}

#[test]
fn test_drag_selected_node() {
    let mut doc = row_document(Config::default());
    doc.select_at(105.0, 100.0);
    doc.begin_drag(105.0, 100.0);
    doc.drag_to(205.0, 250.0);
    assert_eq!(doc.nodes[0].center(), Point::new(200.0, 250.0));
}

#[test]
fn test_gesture_link_between_nodes() {
    let mut doc = row_document(Config::default());
    doc.begin_link_gesture(100.0, 100.0);
    doc.update_link_gesture(200.0, 200.0);
    assert!(matches!(doc.in_flight(), Some(InFlight::Temporary(_))));

    let i = doc.finish_link_gesture(300.0, 100.0).unwrap();
    assert!(matches!(&doc.links[i], AnyLink::Link(l) if l.node_a == 0 && l.node_b == 1));
    assert_eq!(doc.selection, Some(Selection::Link(i)));
    assert!(doc.in_flight().is_none());
}

#[test]
fn test_gesture_self_link() {
    let mut doc = row_document(Config::default());
    doc.begin_link_gesture(100.0, 100.0);
    let i = doc.finish_link_gesture(110.0, 90.0).unwrap();
    assert!(matches!(doc.links[i], AnyLink::SelfLink(_)));
}

#[test]
fn test_gesture_start_link_from_empty_space() {
    let mut doc = row_document(Config::default());
    doc.begin_link_gesture(100.0, 20.0);
    let i = doc.finish_link_gesture(100.0, 100.0).unwrap();
    match &doc.links[i] {
        AnyLink::StartLink(l) => {
            assert_eq!(l.node, 0);
            assert_eq!((l.delta_x, l.delta_y), (0.0, -80.0));
        }
        other => panic!("expected a start link, got {:?}", other),
    }
    assert!(doc.nodes[0].is_initial_state());
}

#[test]
fn test_gesture_into_empty_space_inserts_nothing() {
    let mut doc = row_document(Config::default());
    doc.begin_link_gesture(100.0, 100.0);
    assert_eq!(doc.finish_link_gesture(100.0, 400.0), None);
    assert!(doc.links.is_empty());
}

#[test]
fn test_gesture_refused_by_preset() {
    let mut doc = row_document(Config::preset(Preset::ArrayLike));
    doc.begin_link_gesture(100.0, 100.0);
    assert_eq!(doc.finish_link_gesture(300.0, 100.0), None);
    assert!(doc.links.is_empty());
}

#[test]
fn test_gesture_cancelled_when_origin_removed() {
    let mut doc = row_document(Config::default());
    doc.begin_link_gesture(500.0, 100.0);
    doc.remove_node(2);
    doc.update_link_gesture(300.0, 100.0);
    assert!(doc.in_flight().is_none());
}

#[test]
fn test_temporary_link_is_plain_data() {
    let link = TemporaryLink::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
    assert_eq!(link.to, Point::new(10.0, 0.0));
}

#[test]
fn test_clear() {
    let mut doc = row_document(Config::default());
    doc.alphabet = "a".to_string();
    doc.select_at(100.0, 100.0);
    doc.clear();
    assert!(doc.is_empty());
    assert!(doc.alphabet.is_empty());
    assert_eq!(doc.selection, None);
}
