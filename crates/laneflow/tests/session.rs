//! End-to-end editing sessions

use laneflow::prelude::*;

const ORDER_FLOW: &str = r#"```json
{
  "nodes": [
    {"id": "start", "type": "startEvent", "label": "Order received"},
    {"id": "check", "type": "task", "label": "Check stock"},
    {"id": "ship", "type": "task", "label": "Ship"},
    {"id": "end", "type": "endEvent", "label": "Done"}
  ],
  "edges": [
    {"id": "e1", "source": "start", "target": "check"},
    {"id": "e2", "source": "check", "target": "ship"},
    {"id": "e3", "source": "ship", "target": "end"}
  ],
  "pools": [
    {"id": "shop", "label": "Shop", "lanes": [
      {"id": "sales", "label": "Sales", "nodeIds": ["start", "check"]},
      {"id": "warehouse", "label": "Warehouse", "nodeIds": ["ship", "end"]}
    ]}
  ]
}
```"#;

fn loaded() -> Session {
    let mut session = Session::new();
    session.load_description(parse_description(ORDER_FLOW).unwrap());
    session
}

#[test]
fn test_load_description_lays_out_pool() {
    let session = loaded();
    assert_eq!(session.nodes().len(), 7);
    assert_eq!(session.nodes()[0].id, "shop");
    assert_eq!(session.connections().len(), 3);
    assert!(session.nodes().iter().all(|n| n.size.is_some() || !n.is_container()));
    assert!(!session.can_undo());
    assert!(!session.can_redo());
}

#[test]
fn test_connect_across_lanes() {
    let mut session = loaded();
    let id = session
        .connect("start", "end", ConnectionKind::SequenceFlow)
        .unwrap();

    let conn = session.state().connection(&id).unwrap();
    assert_eq!(conn.source_side, Some(Side::Bottom));
    assert_eq!(conn.target_side, Some(Side::Top));
    // start now has two outgoing connections
    assert!(conn.offset.is_some());
    assert!(session.can_undo());
}

#[test]
fn test_connect_rejects_invalid_endpoints() {
    let mut session = loaded();
    assert!(matches!(
        session.connect("check", "check", ConnectionKind::SequenceFlow),
        Err(FlowError::SelfLoop { .. })
    ));
    assert!(matches!(
        session.connect("check", "ghost", ConnectionKind::SequenceFlow),
        Err(FlowError::UnknownNode { .. })
    ));
    assert!(matches!(
        session.connect("check", "sales", ConnectionKind::SequenceFlow),
        Err(FlowError::ContainerEndpoint { .. })
    ));
    assert!(matches!(
        session.connect("start", "check", ConnectionKind::SequenceFlow),
        Err(FlowError::DuplicateConnection { .. })
    ));
    assert!(!session.can_undo());
}

#[test]
fn test_move_node_reassigns_sides() {
    let mut session = loaded();
    let check = session.state().node("check").unwrap().position;

    // Put start far to the right of check, same row
    session
        .move_node("start", Point::new(check.x + 600.0, check.y + 10.0))
        .unwrap();
    let e1 = session.state().connection("e1").unwrap();
    assert_eq!(e1.source_side, Some(Side::Left));
    assert_eq!(e1.target_side, Some(Side::Right));

    assert!(session.undo());
    let e1 = session.state().connection("e1").unwrap();
    assert_eq!(e1.source_side, Some(Side::Bottom));
}

#[test]
fn test_lanes_cannot_be_moved() {
    let mut session = loaded();
    let err = session.move_node("sales", Point::new(0.0, 0.0)).unwrap_err();
    assert!(matches!(err, FlowError::NotEditable { .. }));
}

#[test]
fn test_delete_node_removes_touching_connections() {
    let mut session = loaded();
    session.delete_node("check").unwrap();
    assert!(session.state().node("check").is_none());
    let ids: Vec<&str> = session.connections().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["e3"]);

    assert!(session.undo());
    assert!(session.state().node("check").is_some());
    assert_eq!(session.connections().len(), 3);
}

#[test]
fn test_undo_redo_walks_edits_in_order() {
    let mut session = loaded();
    let baseline = session.state().clone();

    session.relabel("check", "Check inventory").unwrap();
    let relabelled = session.state().clone();
    session.delete_connection("e3").unwrap();

    assert!(session.undo());
    assert_eq!(session.state(), &relabelled);
    assert!(session.undo());
    assert_eq!(session.state(), &baseline);
    assert!(!session.undo());

    assert!(session.redo());
    assert_eq!(session.state(), &relabelled);
    assert!(session.redo());
    assert!(session.state().connection("e3").is_none());
    assert!(!session.redo());
}

#[test]
fn test_new_edit_after_undo_clears_redo() {
    let mut session = loaded();
    session.delete_connection("e1").unwrap();
    assert!(session.undo());
    assert!(session.can_redo());

    session.delete_connection("e2").unwrap();
    assert!(!session.can_redo());
    assert!(session.state().connection("e1").is_some());
}

#[test]
fn test_drop_node_then_connect() {
    let mut session = loaded();
    let id = session
        .drop_node(NodeKind::Gateway, Point::new(500.0, 500.0))
        .unwrap();
    let node = session.state().node(&id).unwrap();
    assert_eq!(node.position, Point::new(475.0, 475.0));
    assert_eq!(node.label, NodeKind::Gateway.default_label());

    session.connect("end", &id, ConnectionKind::SequenceFlow).unwrap();
    assert!(session
        .drop_node(NodeKind::Lane, Point::default())
        .is_err());
}

#[test]
fn test_change_direction_resets_history() {
    let mut session = loaded();
    session.relabel("ship", "Dispatch").unwrap();
    session.change_direction(Direction::LeftRight);

    assert_eq!(session.direction(), Direction::LeftRight);
    assert!(!session.can_undo());
    assert_eq!(session.state().node("ship").unwrap().label, "Dispatch");
    let check = session.state().node("check").unwrap().position;
    let start = session.state().node("start").unwrap().position;
    assert!(check.x > start.x);
}
