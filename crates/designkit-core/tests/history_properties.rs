//! Integration tests: canvas store history and selection behaviour.
//!
//! Drives `CanvasStore` through its public command API the way the editor
//! shell and render adapter do, checking the history and selection rules
//! end to end.

use designkit_core::{
    CanvasObject, CanvasStore, Command, History, ObjectPatch, ReorderDirection, ShapeKind,
    SnapshotPolicy, MAX_HISTORY_DEPTH,
};

fn rect(id: &str) -> CanvasObject {
    CanvasObject::shape(id, ShapeKind::Rectangle, 100.0, 100.0)
}

fn ids(store: &CanvasStore) -> Vec<String> {
    store.objects().iter().map(|o| o.id.clone()).collect()
}

fn store_with(ids: &[&str]) -> CanvasStore {
    let mut store = CanvasStore::new();
    store.load_design(ids.iter().map(|id| rect(id)).collect());
    store
}

#[test]
fn test_undo_stack_never_exceeds_depth() {
    let mut store = CanvasStore::new();
    for i in 0..25 {
        store.add_object(rect(&format!("o{i}")));
        assert!(store.history().undo_depth() <= MAX_HISTORY_DEPTH);
    }
    assert_eq!(store.history().undo_depth(), MAX_HISTORY_DEPTH);
}

#[test]
fn test_undo_stops_at_oldest_retained_snapshot() {
    let mut store = CanvasStore::new();
    for i in 0..15 {
        store.add_object(rect(&format!("o{i}")));
    }

    for _ in 0..MAX_HISTORY_DEPTH {
        store.undo();
    }
    // 15 adds, 10 undone: the 5 oldest adds are no longer reversible
    assert_eq!(store.len(), 5);
    assert!(!store.can_undo());

    store.undo();
    assert_eq!(store.len(), 5);
}

#[test]
fn test_configured_depth_is_respected() {
    let mut store = CanvasStore::with_options(History::with_capacity(3), SnapshotPolicy::Always);
    for i in 0..6 {
        store.add_object(rect(&i.to_string()));
    }
    assert_eq!(store.history().undo_depth(), 3);
}

#[test]
fn test_mutation_after_undo_clears_redo() {
    let mutations = [
        Command::AddObject { object: rect("z") },
        Command::UpdateObject {
            id: "a".to_string(),
            changes: ObjectPatch::position(1.0, 1.0),
        },
        Command::RemoveObject { id: "a".to_string() },
        Command::Reorder {
            id: "a".to_string(),
            direction: ReorderDirection::Forward,
        },
    ];

    for mutation in mutations {
        let mut store = store_with(&["a", "b"]);
        store.add_object(rect("c"));
        store.undo();
        assert!(store.can_redo());

        store.dispatch(mutation);
        assert!(!store.can_redo());
    }
}

#[test]
fn test_undo_redo_round_trip_is_deep_equal() {
    let mut store = store_with(&["a", "b"]);
    let before = store.objects().to_vec();

    let patch = ObjectPatch {
        fill_color: Some("#123456".to_string()),
        ..ObjectPatch::transform(5.0, 5.0, 50.0, 60.0, 90.0)
    };
    store.update_object("a", &patch);
    let after = store.objects().to_vec();
    assert_ne!(before, after);

    store.undo();
    assert_eq!(store.objects(), before.as_slice());

    store.redo();
    assert_eq!(store.objects(), after.as_slice());
}

#[test]
fn test_snapshots_are_independent_of_later_edits() {
    let mut store = store_with(&["a"]);
    store.update_object("a", &ObjectPatch::position(1.0, 1.0));
    store.update_object("a", &ObjectPatch::position(2.0, 2.0));

    store.undo();
    assert_eq!(store.object("a").unwrap().x, 1.0);
    store.undo();
    assert_eq!(store.object("a").unwrap().x, 100.0);
}

#[test]
fn test_removing_selected_object_clears_selection() {
    let mut store = store_with(&["a", "b"]);
    store.select(Some("b".to_string()));
    store.remove_object("b");
    assert_eq!(store.selection(), None);

    store.update_object("b", &ObjectPatch::position(0.0, 0.0));
    store.reorder("b", ReorderDirection::Backward);
    assert_eq!(store.selection(), None);
    assert_eq!(ids(&store), ["a"]);
}

#[test]
fn test_dangling_selection_is_not_resurrected() {
    let mut store = store_with(&["a"]);
    store.select(Some("gone".to_string()));

    store.update_object("gone", &ObjectPatch::position(0.0, 0.0));
    store.reorder("gone", ReorderDirection::Forward);

    assert!(store.object("gone").is_none());
    assert!(store.selected_object().is_none());
}

#[test]
fn test_reorder_at_boundaries_is_noop() {
    let mut store = store_with(&["a", "b", "c"]);
    store.reorder("a", ReorderDirection::Backward);
    assert_eq!(ids(&store), ["a", "b", "c"]);
    store.reorder("c", ReorderDirection::Forward);
    assert_eq!(ids(&store), ["a", "b", "c"]);
}

#[test]
fn test_reorder_sequence() {
    let mut store = store_with(&["a", "b", "c"]);
    store.reorder("b", ReorderDirection::Forward);
    assert_eq!(ids(&store), ["a", "c", "b"]);
    store.reorder("c", ReorderDirection::Backward);
    assert_eq!(ids(&store), ["c", "a", "b"]);
}

#[test]
fn test_add_then_undo_then_redo() {
    let object = CanvasObject::from_json(
        r#"{"id":"a","type":"shape","shapeType":"rectangle","x":100,"y":100}"#,
    )
    .unwrap();

    let mut store = CanvasStore::new();
    store.add_object(object.clone());

    store.undo();
    assert!(store.is_empty());

    store.redo();
    assert_eq!(store.objects(), [object].as_slice());
}

#[test]
fn test_update_unknown_id_still_snapshots() {
    let mut store = store_with(&["a"]);
    let before = store.objects().to_vec();

    store.update_object("b", &ObjectPatch::position(9.0, 9.0));

    assert_eq!(store.objects(), before.as_slice());
    assert_eq!(store.history().undo_depth(), 1);
}

#[test]
fn test_update_unknown_id_with_on_change_policy() {
    let mut store = CanvasStore::with_options(History::new(), SnapshotPolicy::OnChange);
    store.load_design(vec![rect("a")]);

    store.update_object("b", &ObjectPatch::position(9.0, 9.0));
    assert!(!store.can_undo());
}

#[test]
fn test_load_design_resets_history_and_selection() {
    let mut store = CanvasStore::new();
    for i in 0..5 {
        store.add_object(rect(&i.to_string()));
    }
    store.select(Some("2".to_string()));
    assert_eq!(store.history().undo_depth(), 5);

    store.load_design(vec![rect("x"), rect("y")]);

    assert_eq!(store.history().undo_depth(), 0);
    assert_eq!(store.history().redo_depth(), 0);
    assert_eq!(store.selection(), None);
}
