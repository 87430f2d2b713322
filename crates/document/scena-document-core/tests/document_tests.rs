use std::cell::RefCell;
use std::rc::Rc;

use scena_document_core::{
    BoundaryPolicy, ChildSlot, DocError, DocEvent, Document, FrameKey, Interpolation, Key,
    KeyframeCurve, Node, NodeId, NodeRegistry, PropertyFlags, PropertySlot, SymbolId, Value,
    ValueRef,
};

fn group_factory(id: NodeId) -> Node {
    Node::new(id, "group", "group")
        .with_property(PropertySlot::new(
            "x",
            ValueRef::Inline(Value::Float(0.0)),
            PropertyFlags::ANIMATABLE,
        ))
        .with_property(PropertySlot::new(
            "label",
            ValueRef::Inline(Value::Text(String::new())),
            PropertyFlags::NONE,
        ))
        .with_child_slot(ChildSlot::list("children", "group"))
}

fn shape_factory(id: NodeId) -> Node {
    Node::new(id, "shape", "shape")
        .with_property(PropertySlot::new(
            "paint",
            ValueRef::Inline(Value::ColorRgba([0.0, 0.0, 0.0, 1.0])),
            PropertyFlags::NONE,
        ))
        .with_child_slot(ChildSlot::single("fill", "paint"))
}

fn paint_factory(id: NodeId) -> Node {
    Node::new(id, "paint", "paint").with_property(PropertySlot::new(
        "color",
        ValueRef::Inline(Value::ColorRgba([1.0, 1.0, 1.0, 1.0])),
        PropertyFlags::ANIMATABLE,
    ))
}

fn registry() -> NodeRegistry {
    let mut r = NodeRegistry::new();
    r.register("group", group_factory);
    r.register("shape", shape_factory);
    r.register("paint", paint_factory);
    r
}

/// Document with one symbol holding a group root (silent population).
fn doc_with_root(registry: &NodeRegistry) -> (Document, SymbolId, NodeId) {
    let mut doc = Document::new();
    let sym = doc.add_symbol("main", false);
    doc.set_current_symbol(Some(sym), false).unwrap();
    let root = doc.create_node(sym, registry, "group").unwrap();
    doc.symbol_mut(sym).unwrap().set_root(root).unwrap();
    (doc, sym, root)
}

fn list_ids(doc: &Document, sym: SymbolId, parent: NodeId) -> Vec<NodeId> {
    doc.node(sym, parent)
        .and_then(|n| n.child_slot("children"))
        .map(|s| s.ids())
        .unwrap_or_default()
}

fn float_key(v: f32) -> Key {
    Key::new(ValueRef::Inline(Value::Float(v)), Interpolation::Linear)
}

/// it should undo only the latest add and restore it on redo (scenario A)
#[test]
fn list_add_undo_redo_order() {
    let r = registry();
    let (mut doc, sym, root) = doc_with_root(&r);
    let a = doc.create_node(sym, &r, "group").unwrap();
    let b = doc.create_node(sym, &r, "group").unwrap();

    doc.add_child(sym, root, "children", a, true).unwrap();
    doc.add_child(sym, root, "children", b, true).unwrap();
    assert_eq!(list_ids(&doc, sym, root), vec![a, b]);

    assert!(doc.undo());
    assert_eq!(list_ids(&doc, sym, root), vec![a]);
    assert!(doc.symbol(sym).unwrap().resolve(b).is_none());

    assert!(doc.redo());
    assert_eq!(list_ids(&doc, sym, root), vec![a, b]);
    assert!(doc.symbol(sym).unwrap().resolve(b).is_some());
}

/// it should restore the exact pre-sequence state after undoing everything
#[test]
fn undo_redo_symmetry() {
    let r = registry();
    let (mut doc, sym, root) = doc_with_root(&r);
    let a = doc.create_node(sym, &r, "group").unwrap();
    let b = doc.create_node(sym, &r, "group").unwrap();

    doc.add_child(sym, root, "children", a, true).unwrap();
    doc.add_child(sym, root, "children", b, true).unwrap();
    doc.set_property_value(sym, a, "x", ValueRef::Inline(Value::Float(5.0)), true)
        .unwrap();
    doc.set_key_at(sym, a, "x", 0, float_key(0.0), true).unwrap();
    doc.remove_child(sym, root, "children", a, true).unwrap();

    let steps = doc.history().undo_len();
    assert_eq!(steps, 5);
    for _ in 0..steps {
        assert!(doc.undo());
    }
    assert!(!doc.undo());

    assert_eq!(list_ids(&doc, sym, root), Vec::<NodeId>::new());
    let node = doc.node(sym, a).unwrap();
    assert_eq!(
        node.property("x").unwrap().direct_value(),
        &ValueRef::Inline(Value::Float(0.0))
    );
    assert!(node.property("x").unwrap().curve().map_or(true, |c| c.is_empty()));

    for _ in 0..steps {
        assert!(doc.redo());
    }
    assert_eq!(list_ids(&doc, sym, root), vec![b]);
}

/// it should undo a named transaction as exactly one step
#[test]
fn transaction_atomicity() {
    let r = registry();
    let (mut doc, sym, root) = doc_with_root(&r);
    let a = doc.create_node(sym, &r, "group").unwrap();
    let b = doc.create_node(sym, &r, "group").unwrap();
    let c = doc.create_node(sym, &r, "group").unwrap();

    doc.begin_transaction("Add Layers");
    doc.add_child(sym, root, "children", a, true).unwrap();
    doc.add_child(sym, root, "children", b, true).unwrap();
    doc.add_child(sym, root, "children", c, true).unwrap();
    doc.commit_transaction().unwrap();

    assert_eq!(doc.history().undo_len(), 1);
    assert_eq!(doc.history().undo_title(), Some("Add Layers"));
    assert!(doc.undo());
    assert_eq!(list_ids(&doc, sym, root), Vec::<NodeId>::new());
    assert!(doc.redo());
    assert_eq!(list_ids(&doc, sym, root), vec![a, b, c]);
}

/// it should fold nested transactions into the outermost step
#[test]
fn nested_transactions_fold() {
    let r = registry();
    let (mut doc, sym, root) = doc_with_root(&r);
    let a = doc.create_node(sym, &r, "group").unwrap();
    let b = doc.create_node(sym, &r, "group").unwrap();

    doc.begin_transaction("Outer");
    doc.add_child(sym, root, "children", a, true).unwrap();
    doc.begin_transaction("Inner");
    doc.add_child(sym, root, "children", b, true).unwrap();
    doc.commit_transaction().unwrap();
    // Inner commit publishes nothing on its own.
    assert_eq!(doc.history().undo_len(), 0);
    doc.commit_transaction().unwrap();

    assert_eq!(doc.history().undo_len(), 1);
    assert!(doc.undo());
    assert_eq!(list_ids(&doc, sym, root), Vec::<NodeId>::new());
}

/// it should remove all children as one step, preserving order on redo
#[test]
fn remove_all_children_is_one_step() {
    let r = registry();
    let (mut doc, sym, root) = doc_with_root(&r);
    let ids: Vec<NodeId> = (0..4)
        .map(|_| doc.create_node(sym, &r, "group").unwrap())
        .collect();
    for id in &ids {
        doc.add_child(sym, root, "children", *id, false).unwrap();
    }
    assert_eq!(doc.history().undo_len(), 0);

    doc.remove_all_children(sym, root, "children", true).unwrap();
    assert_eq!(list_ids(&doc, sym, root), Vec::<NodeId>::new());
    assert_eq!(doc.history().undo_len(), 1);

    assert!(doc.undo());
    assert_eq!(list_ids(&doc, sym, root), ids);
}

/// it should keep identifiers unique and resolvable across undo/redo churn
#[test]
fn identifier_uniqueness() {
    let r = registry();
    let (mut doc, sym, root) = doc_with_root(&r);
    for _ in 0..3 {
        let id = doc.create_node(sym, &r, "group").unwrap();
        doc.add_child(sym, root, "children", id, true).unwrap();
    }
    doc.undo();
    doc.undo();
    doc.redo();
    let extra = doc.create_node(sym, &r, "group").unwrap();
    doc.add_child(sym, root, "children", extra, true).unwrap();

    let symbol = doc.symbol(sym).unwrap();
    let mut seen = std::collections::HashSet::new();
    for id in symbol.index().ids() {
        assert!(seen.insert(id), "duplicate identifier {id:?}");
        assert_eq!(symbol.resolve(id).unwrap().id(), id);
    }
    assert_eq!(seen.len(), symbol.index().len());
}

/// it should evaluate keys through the cache and fall back to direct (scenario B)
#[test]
fn property_evaluation_and_direct_fallback() {
    let r = registry();
    let (mut doc, sym, root) = doc_with_root(&r);
    doc.set_property_value(sym, root, "x", ValueRef::Inline(Value::Float(10.0)), false)
        .unwrap();
    let mut curve = KeyframeCurve::new(BoundaryPolicy::None, BoundaryPolicy::None);
    curve.set_key(0, float_key(0.0));
    curve.set_key(10, float_key(100.0));
    doc.set_track(sym, root, "x", Some(curve), false).unwrap();

    assert_eq!(
        doc.value_at(sym, root, "x", FrameKey::Frame(5)).unwrap(),
        ValueRef::Inline(Value::Float(50.0))
    );
    // before=None leaves frame -5 undefined; the cache falls back to direct.
    assert_eq!(
        doc.value_at(sym, root, "x", FrameKey::Frame(-5)).unwrap(),
        ValueRef::Inline(Value::Float(10.0))
    );

    let mut curve = KeyframeCurve::new(BoundaryPolicy::Const, BoundaryPolicy::None);
    curve.set_key(0, float_key(0.0));
    curve.set_key(10, float_key(100.0));
    doc.set_track(sym, root, "x", Some(curve), false).unwrap();
    assert_eq!(
        doc.value_at(sym, root, "x", FrameKey::Frame(-5)).unwrap(),
        ValueRef::Inline(Value::Float(0.0))
    );
}

/// it should make direct reads see the synchronized frame's value
#[test]
fn synchronize_to_frame() {
    let r = registry();
    let (mut doc, sym, root) = doc_with_root(&r);
    doc.set_property_value(sym, root, "x", ValueRef::Inline(Value::Float(10.0)), false)
        .unwrap();
    doc.set_key_at(sym, root, "x", 0, float_key(0.0), false).unwrap();
    doc.set_key_at(sym, root, "x", 10, float_key(100.0), false)
        .unwrap();

    doc.synchronize_to(sym, root, "x", FrameKey::Frame(5)).unwrap();
    assert_eq!(
        doc.value_at(sym, root, "x", FrameKey::Direct).unwrap(),
        ValueRef::Inline(Value::Float(50.0))
    );

    // Writing the value switches reads back to direct.
    doc.set_property_value(sym, root, "x", ValueRef::Inline(Value::Float(3.0)), false)
        .unwrap();
    assert_eq!(
        doc.value_at(sym, root, "x", FrameKey::Direct).unwrap(),
        ValueRef::Inline(Value::Float(3.0))
    );
}

/// it should treat removing a missing key as a complete no-op (scenario C)
#[test]
fn remove_missing_key_is_noop() {
    let r = registry();
    let (mut doc, sym, root) = doc_with_root(&r);
    doc.set_key_at(sym, root, "x", 0, float_key(0.0), true).unwrap();
    doc.value_at(sym, root, "x", FrameKey::Frame(0)).unwrap();

    let events: Rc<RefCell<Vec<DocEvent>>> = Rc::default();
    let sink = events.clone();
    doc.subscribe(move |ev| sink.borrow_mut().push(ev.clone()));

    let steps = doc.history().undo_len();
    doc.remove_key_at(sym, root, "x", 99, true).unwrap();
    // Non-animatable slots are no-ops too.
    doc.remove_key_at(sym, root, "label", 0, true).unwrap();

    assert!(events.borrow().is_empty());
    assert_eq!(doc.history().undo_len(), steps);
    let slot = doc.node(sym, root).unwrap().property("x").unwrap();
    assert_eq!(slot.curve().unwrap().len(), 1);
    assert!(slot.cache().contains(FrameKey::Frame(0)));
}

/// it should resolve references lazily across removal and undo
#[test]
fn reference_resolution_across_undo() {
    let r = registry();
    let (mut doc, sym, root) = doc_with_root(&r);
    let target = doc.create_node(sym, &r, "group").unwrap();
    doc.add_child(sym, root, "children", target, true).unwrap();
    doc.set_property_value(sym, root, "label", ValueRef::Reference(target), false)
        .unwrap();

    let value = doc.value_at(sym, root, "label", FrameKey::Direct).unwrap();
    assert_eq!(doc.resolve_reference(sym, &value).unwrap().id(), target);

    doc.remove_child(sym, root, "children", target, true).unwrap();
    assert!(doc.resolve_reference(sym, &value).is_none());

    doc.undo();
    assert_eq!(doc.resolve_reference(sym, &value).unwrap().id(), target);
}

/// it should swap single children with detach/attach pairs that undo cleanly
#[test]
fn single_child_set_and_undo() {
    let r = registry();
    let (mut doc, sym, _root) = doc_with_root(&r);
    let shape = doc.create_node(sym, &r, "shape").unwrap();
    // Default population already built a paint child.
    let default_paint = doc
        .node(sym, shape)
        .unwrap()
        .child_slot("fill")
        .unwrap()
        .get_single()
        .unwrap();
    let replacement = doc.create_node(sym, &r, "paint").unwrap();

    doc.set_single_child(sym, shape, "fill", Some(replacement), true)
        .unwrap();
    let slot = doc.node(sym, shape).unwrap().child_slot("fill").unwrap();
    assert_eq!(slot.get_single(), Some(replacement));
    assert_eq!(doc.node(sym, default_paint).unwrap().parent(), None);

    doc.undo();
    let slot = doc.node(sym, shape).unwrap().child_slot("fill").unwrap();
    assert_eq!(slot.get_single(), Some(default_paint));
    assert_eq!(
        doc.node(sym, replacement).unwrap().parent(),
        None
    );
}

/// it should reject contract violations and no-op on underflow
#[test]
fn errors_and_underflow() {
    let r = registry();
    let (mut doc, sym, root) = doc_with_root(&r);
    let stray = doc.create_node(sym, &r, "group").unwrap();

    assert_eq!(
        doc.remove_child(sym, root, "children", stray, true),
        Err(DocError::NotAChild {
            child: stray,
            slot: "children".into()
        })
    );
    assert_eq!(
        doc.insert_child(sym, root, "children", 3, stray, true),
        Err(DocError::IndexOutOfRange { index: 3, len: 0 })
    );
    assert_eq!(
        doc.set_property_value(sym, root, "ghost", ValueRef::Inline(Value::Float(0.0)), true),
        Err(DocError::UnknownProperty("ghost".into()))
    );
    assert!(matches!(
        doc.add_child(sym, root, "ghost-slot", stray, true),
        Err(DocError::UnknownSlot(_))
    ));

    let mut fresh = Document::new();
    assert!(!fresh.undo());
    assert!(!fresh.redo());
    assert_eq!(fresh.commit_transaction(), Err(DocError::NoOpenTransaction));
}

/// it should apply but not record when history is bypassed
#[test]
fn silent_mode_records_nothing() {
    let r = registry();
    let (mut doc, sym, root) = doc_with_root(&r);
    let a = doc.create_node(sym, &r, "group").unwrap();
    doc.add_child(sym, root, "children", a, false).unwrap();
    doc.set_property_value(sym, a, "x", ValueRef::Inline(Value::Float(9.0)), false)
        .unwrap();

    assert_eq!(list_ids(&doc, sym, root), vec![a]);
    assert!(!doc.history().can_undo());
    assert!(!doc.undo());
    // State sticks because there is nothing to unwind.
    assert_eq!(list_ids(&doc, sym, root), vec![a]);
}

/// it should fire structural events with slot, index, and node payloads
#[test]
fn structural_event_payloads() {
    let r = registry();
    let (mut doc, sym, root) = doc_with_root(&r);
    let a = doc.create_node(sym, &r, "group").unwrap();

    let events: Rc<RefCell<Vec<DocEvent>>> = Rc::default();
    let sink = events.clone();
    let sub = doc.subscribe(move |ev| sink.borrow_mut().push(ev.clone()));

    doc.add_child(sym, root, "children", a, true).unwrap();
    doc.undo();
    assert_eq!(
        events.borrow().as_slice(),
        &[
            DocEvent::ChildAdded {
                symbol: sym,
                parent: root,
                slot: "children".into(),
                index: 0,
                child: a,
            },
            DocEvent::ChildRemoved {
                symbol: sym,
                parent: root,
                slot: "children".into(),
                index: 0,
                child: a,
            },
        ]
    );

    doc.unsubscribe(sub);
    doc.redo();
    assert_eq!(events.borrow().len(), 2);
}

/// it should manage symbols and the current marker as undoable edits
#[test]
fn symbol_collection_undo() {
    let mut doc = Document::new();
    let a = doc.add_symbol("a", true);
    let b = doc.add_symbol("b", true);
    doc.set_current_symbol(Some(b), true).unwrap();

    doc.remove_symbol(b, true).unwrap();
    assert!(doc.symbol(b).is_none());
    assert_eq!(doc.state().current(), None);

    assert!(doc.undo());
    assert_eq!(doc.symbol(b).unwrap().name(), "b");
    assert_eq!(doc.state().current(), Some(b));

    // Unwind everything: both symbols gone.
    while doc.undo() {}
    assert!(doc.symbol(a).is_none());
    assert!(doc.current_symbol().is_none());

    // Redo replays the whole sequence, including the removal of b.
    while doc.redo() {}
    assert!(doc.symbol(b).is_none());
    assert_eq!(doc.state().current(), None);
    assert_eq!(doc.symbol(a).unwrap().name(), "a");
}
