//! Graph description ingest

use laneflow::prelude::*;

#[test]
fn test_fenced_description_parses() {
    let raw = "```json\n{\"nodes\": [{\"id\": \"a\", \"label\": \"A\"}], \"edges\": []}\n```";
    let description = parse_description(raw).unwrap();
    assert_eq!(description.nodes.len(), 1);
    assert_eq!(description.nodes[0].kind, NodeKind::Task);
    assert!(description.pools.is_empty());
}

#[test]
fn test_invalid_json_is_an_error() {
    let err = parse_description("{nodes: ").unwrap_err();
    assert!(matches!(err, FlowError::Json { .. }));
}

#[test]
fn test_missing_arrays_are_reported() {
    let err = parse_description(r#"{"nodes": {}, "edges": []}"#).unwrap_err();
    assert!(err.to_string().contains("missing nodes array"));
    let err = parse_description(r#"{"nodes": []}"#).unwrap_err();
    assert!(err.to_string().contains("missing edges array"));
}

#[test]
fn test_lane_membership_sets_parents() {
    let raw = r#"{
        "nodes": [
            {"id": "a", "type": "startEvent"},
            {"id": "b", "type": "gateway", "gatewayKind": "parallel"},
            {"id": "c", "parentId": "l2"},
            {"id": "d", "parentId": "l2"}
        ],
        "edges": [],
        "pools": [{"id": "p", "lanes": [
            {"id": "l1", "nodeIds": ["a", "b", "d"]},
            {"id": "l2", "nodeIds": ["b"]}
        ]}]
    }"#;
    let state = parse_description(raw).unwrap().into_state();

    let ids: Vec<&str> = state.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["p", "l1", "l2", "a", "b", "c", "d"]);
    assert_eq!(state.node("l1").unwrap().parent.as_deref(), Some("p"));
    // first lane wins
    assert_eq!(state.node("b").unwrap().parent.as_deref(), Some("l1"));
    assert_eq!(state.node("b").unwrap().gateway_kind, Some(GatewayKind::Parallel));
    // parentId only when no lane lists the node
    assert_eq!(state.node("c").unwrap().parent.as_deref(), Some("l2"));
    assert_eq!(state.node("d").unwrap().parent.as_deref(), Some("l1"));
}

#[test]
fn test_bad_edges_and_duplicates_are_dropped() {
    let raw = r#"{
        "nodes": [{"id": "a"}, {"id": "b"}, {"id": "a", "label": "again"}],
        "edges": [
            {"id": "ok", "source": "a", "target": "b", "label": "go"},
            {"id": "loop", "source": "a", "target": "a"},
            {"id": "dangling", "source": "a", "target": "zzz"},
            {"id": "msg", "source": "b", "target": "a", "type": "messageFlow"}
        ]
    }"#;
    let description = parse_description(raw).unwrap();
    assert_eq!(description.lane_count(), 0);
    let state = description.into_state();

    assert_eq!(state.nodes.len(), 2);
    assert_eq!(state.node("a").unwrap().label, "");
    let ids: Vec<&str> = state.connections.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["ok", "msg"]);
    assert_eq!(state.connections[0].label.as_deref(), Some("go"));
    assert_eq!(state.connections[1].kind, ConnectionKind::MessageFlow);
}

#[test]
fn test_layout_description_end_to_end() {
    let raw = r#"{
        "nodes": [{"id": "a"}, {"id": "b"}],
        "edges": [{"id": "e", "source": "a", "target": "b"}],
        "pools": [{"id": "p", "label": "P", "lanes": [{"id": "l", "label": "L", "nodeIds": ["a", "b"]}]}]
    }"#;
    let state = laneflow::layout_description(raw, Direction::LeftRight).unwrap();
    let a = state.node("a").unwrap();
    let b = state.node("b").unwrap();
    assert!(b.position.x > a.position.x);
    assert_eq!(state.connections[0].source_side, Some(Side::Right));
}
