//! Drag sessions driven through NavBuilder, directly and from scripts.

use rstest::rstest;
use serde_json::{json, Value};

use navtree::application::{parse_script, ApplicationError, NavBuilder};
use navtree::domain::{
    DragEvent, DragOutcome, DragPhase, FormSpec, HoverTarget, LayoutRow, Parent, PressTarget,
};
use navtree::util::testing;

fn builder(input: Value) -> NavBuilder {
    testing::init_test_setup();
    NavBuilder::from_json(FormSpec::default(), &input.to_string()).expect("load nav")
}

fn labels(builder: &NavBuilder) -> Value {
    fn strip(nodes: &Value) -> Value {
        Value::Array(
            nodes
                .as_array()
                .unwrap()
                .iter()
                .map(|n| match n.get("children") {
                    Some(children) => json!({"label": n["label"], "children": strip(children)}),
                    None => json!(n["label"]),
                })
                .collect(),
        )
    }
    strip(&serde_json::to_value(builder.serialize().unwrap()).unwrap())
}

fn replay(builder: &mut NavBuilder, script: &str) -> Vec<DragOutcome> {
    let steps = parse_script(script).expect("valid script");
    builder.replay(&steps).expect("replay")
}

fn flat() -> Value {
    json!([{"label": "Home"}, {"label": "About"}, {"label": "Blog"}])
}

#[rstest]
#[case::after_last("press 0\nstart 0\nenter node 2\nend\n", json!(["About", "Blog", "Home"]))]
#[case::hover_toggles_back("press 0\nstart 0\nenter node 2\nenter node 2\nend\n", json!(["About", "Home", "Blog"]))]
#[case::to_front("press 2\nstart 2\nenter node 0\nend\n", json!(["Blog", "Home", "About"]))]
#[case::root_container_appends("press 1\nstart 1\nenter container root\nend\n", json!(["Home", "Blog", "About"]))]
#[case::into_empty_container("press 2\nstart 2\nenter container 0\nend\n", json!([{"label": "Home", "children": ["Blog"]}, "About"]))]
fn given_flat_nav_when_drag_script_replayed_then_order_follows_drop(
    #[case] script: &str,
    #[case] expected: Value,
) {
    // Arrange
    let mut nav = builder(flat());

    // Act
    let outcomes = replay(&mut nav, script);

    // Assert
    assert!(matches!(
        outcomes.last(),
        Some(DragOutcome::Committed { moved: true, .. })
    ));
    assert_eq!(labels(&nav), expected);
    assert_eq!(nav.drag_phase(), DragPhase::Idle);
}

#[rstest]
#[case::no_hover("press 1\nstart 1\nend\n")]
#[case::hover_elsewhere("press 1\nstart 1\nenter none\nend\n")]
fn given_drag_without_placeholder_change_when_dropped_then_noop(#[case] script: &str) {
    let mut nav = builder(flat());
    let before = nav.to_json(None).unwrap();

    let outcomes = replay(&mut nav, script);

    assert!(matches!(
        outcomes.last(),
        Some(DragOutcome::Committed { moved: false, .. })
    ));
    assert_eq!(nav.to_json(None).unwrap(), before);
}

#[test]
fn given_live_drag_when_cancelled_then_tree_unchanged_and_node_restored() {
    // Arrange
    let mut nav = builder(flat());
    let before = nav.to_json(None).unwrap();
    let home = nav.resolve_path("0").unwrap();

    // Act
    let outcomes = replay(&mut nav, "press 0\nstart 0\nenter node 2\ncancel\ncancel\n");

    // Assert
    assert_eq!(
        &outcomes[outcomes.len() - 2..],
        &[
            DragOutcome::Cancelled { restored: Some(home) },
            DragOutcome::Cancelled { restored: None },
        ]
    );
    assert_eq!(nav.to_json(None).unwrap(), before);
}

#[test]
fn given_nested_nav_when_dragging_parent_over_own_child_then_hover_ignored() {
    let mut nav = builder(json!([
        {"label": "A", "children": [{"label": "A1"}, {"label": "A2"}]},
        {"label": "B"}
    ]));

    let outcomes = replay(&mut nav, "press 0\nstart 0\nenter node 0.1\nenter container 0\nend\n");

    assert_eq!(outcomes[2], DragOutcome::Unchanged);
    assert_eq!(outcomes[3], DragOutcome::Unchanged);
    assert!(matches!(outcomes[4], DragOutcome::Committed { moved: false, .. }));
}

#[test]
fn given_nested_nav_when_child_dragged_onto_root_node_then_it_lands_before_it() {
    let mut nav = builder(json!([
        {"label": "A", "children": [{"label": "A1"}]},
        {"label": "B"}
    ]));

    replay(&mut nav, "press 0.0\nstart 0.0\nenter node 1\nend\n");

    assert_eq!(labels(&nav), json!(["A", "A1", "B"]));
    let serialized = serde_json::to_value(nav.serialize().unwrap()).unwrap();
    assert!(serialized[0].get("children").is_none());
}

#[test]
fn given_no_press_when_drag_starts_then_rejected_and_idle() {
    let mut nav = builder(flat());
    let home = nav.resolve_path("0").unwrap();

    let outcome = nav.handle(DragEvent::DragStart(home));

    assert_eq!(outcome, DragOutcome::Rejected);
    assert_eq!(nav.drag_phase(), DragPhase::Idle);
}

#[test]
fn given_second_start_while_dragging_when_handled_then_single_session_survives() {
    let mut nav = builder(flat());
    let home = nav.resolve_path("0").unwrap();
    let about = nav.resolve_path("1").unwrap();
    nav.handle(DragEvent::Press(PressTarget::Handle(home)));
    nav.handle(DragEvent::DragStart(home));
    let session = nav.drag_session().unwrap().id;

    assert_eq!(nav.handle(DragEvent::DragStart(about)), DragOutcome::Rejected);
    assert_eq!(nav.drag_session().unwrap().id, session);
    assert_eq!(nav.drag_session().unwrap().dragged, home);
}

#[test]
fn given_finished_session_when_measurement_arrives_then_it_is_dropped() {
    // Arrange
    let mut nav = builder(flat());
    let home = nav.resolve_path("0").unwrap();
    nav.handle(DragEvent::Press(PressTarget::Handle(home)));
    let first = match nav.handle(DragEvent::DragStart(home)) {
        DragOutcome::Started { session, .. } => session,
        other => panic!("expected start, got {:?}", other),
    };
    assert!(nav.placeholder_measured(first, 24.0));
    nav.handle(DragEvent::DragEnd);

    // Act: a new session starts before the stale measurement lands
    nav.handle(DragEvent::Press(PressTarget::Handle(home)));
    let second = match nav.handle(DragEvent::DragStart(home)) {
        DragOutcome::Started { session, .. } => session,
        other => panic!("expected start, got {:?}", other),
    };

    // Assert
    assert_ne!(first, second);
    assert!(!nav.placeholder_measured(first, 99.0));
    assert_eq!(nav.drag_session().unwrap().placeholder.height, None);
}

#[test]
fn given_hover_on_container_when_dragging_then_placeholder_moves_there() {
    let mut nav = builder(flat());
    let about = nav.resolve_path("1").unwrap();
    nav.handle(DragEvent::Press(PressTarget::Handle(about)));
    nav.handle(DragEvent::DragStart(about));

    let outcome = nav.handle(DragEvent::DragEnter(HoverTarget::Container(Parent::Root)));

    match outcome {
        DragOutcome::PlaceholderMoved(placeholder) => {
            assert_eq!(placeholder.parent, Parent::Root);
            assert_eq!(placeholder.index, 2);
        }
        other => panic!("expected placeholder move, got {:?}", other),
    }
}

#[test]
fn given_script_with_bad_path_when_replayed_then_error_names_line() {
    let mut nav = builder(flat());
    let steps = parse_script("press 0\nstart 7\n").unwrap();

    let err = nav.replay(&steps).unwrap_err();

    assert!(matches!(err, ApplicationError::Script { line: 2, .. }), "{}", err);
}

#[test]
fn given_live_drag_when_laying_out_then_dragged_subtree_hidden_and_placeholder_shown() {
    // Arrange
    let mut nav = builder(json!([
        {"label": "A", "children": [{"label": "A1"}]},
        {"label": "B"}
    ]));
    let b = nav.resolve_path("1").unwrap();
    replay(&mut nav, "press 0\nstart 0\nmeasure 30\nenter node 1\n");

    // Act
    let rows = nav.layout();

    // Assert
    assert_eq!(
        rows,
        vec![
            LayoutRow::Node { id: b, depth: 0 },
            LayoutRow::Placeholder {
                depth: 0,
                height: Some(30.0),
            },
        ]
    );
}

#[test]
fn given_drop_slot_invalidated_mid_drag_when_dropped_then_cancelled_without_mutation() {
    // Arrange: placeholder after C, at root index 2
    let mut nav = builder(json!([{"label": "A"}, {"label": "B"}, {"label": "C"}]));
    let a = nav.resolve_path("0").unwrap();
    let b = nav.resolve_path("1").unwrap();
    replay(&mut nav, "press 0\nstart 0\nenter node 2\n");
    assert_eq!(nav.drag_session().unwrap().placeholder.index, 2);

    // Act: the slot no longer exists once B is gone
    nav.remove_node(b).unwrap();
    let outcome = nav.handle(DragEvent::DragEnd);

    // Assert
    assert_eq!(outcome, DragOutcome::Cancelled { restored: Some(a) });
    assert_eq!(nav.drag_phase(), DragPhase::Idle);
    assert_eq!(labels(&nav), json!(["A", "C"]));
}
