use scena_document_core::snapshot::{export_node, export_node_json, load_node, load_node_json};
use scena_document_core::{
    BoundaryPolicy, ChildSlot, Interpolation, Key, KeyframeCurve, Node, NodeId, NodeRegistry,
    PropertyFlags, PropertySlot, Symbol, SymbolId, Value, ValueRef,
};

fn group_factory(id: NodeId) -> Node {
    Node::new(id, "group", "group")
        .with_property(PropertySlot::new(
            "x",
            ValueRef::Inline(Value::Float(0.0)),
            PropertyFlags::ANIMATABLE,
        ))
        .with_child_slot(ChildSlot::list("children", "group"))
}

fn registry() -> NodeRegistry {
    let mut r = NodeRegistry::new();
    r.register("group", group_factory);
    r
}

/// Two-level group tree with a direct value and a two-key track on the root.
fn seed_symbol(r: &NodeRegistry) -> (Symbol, NodeId, NodeId) {
    let mut sym = Symbol::new(SymbolId(0), "main");
    let root = sym.create_node(r, "group").unwrap();
    sym.set_root(root).unwrap();
    let child = sym.create_node(r, "group").unwrap();
    sym.node_mut(child).unwrap().set_name("inner");
    sym.attach_child(root, "children", None, child).unwrap();

    let slot = sym.node_mut(root).unwrap().property_mut("x").unwrap();
    slot.set_value_silent(ValueRef::Inline(Value::Float(4.5)));
    let mut curve = KeyframeCurve::new(BoundaryPolicy::Const, BoundaryPolicy::Repeat);
    curve.set_key(
        0,
        Key::new(ValueRef::Inline(Value::Float(0.0)), Interpolation::Smooth)
            .with_tangents([1.0, 0.5, 1.0, 0.5]),
    );
    curve.set_key(
        10,
        Key::new(ValueRef::Inline(Value::Float(9.0)), Interpolation::Linear),
    );
    slot.set_track_silent(Some(curve));
    (sym, root, child)
}

/// it should reproduce structure, values, and tracks across a JSON round trip
#[test]
fn json_round_trip() {
    let r = registry();
    let (sym, root, child) = seed_symbol(&r);
    let json = export_node_json(&sym, root).unwrap();

    let mut restored = Symbol::new(SymbolId(1), "copy");
    let loaded = load_node_json(&mut restored, &r, &json).unwrap();
    restored.set_root(loaded).unwrap();

    assert_eq!(loaded, root);
    let node = restored.node(loaded).unwrap();
    assert_eq!(
        node.property("x").unwrap().direct_value(),
        &ValueRef::Inline(Value::Float(4.5))
    );
    let curve = node.property("x").unwrap().curve().unwrap();
    assert_eq!(curve.before, BoundaryPolicy::Const);
    assert_eq!(curve.after, BoundaryPolicy::Repeat);
    assert_eq!(curve.frames(), vec![0, 10]);
    assert_eq!(curve.key_at(0).unwrap().tangents, [1.0, 0.5, 1.0, 0.5]);

    let ids = node.child_slot("children").unwrap().ids();
    assert_eq!(ids, vec![child]);
    assert_eq!(restored.node(child).unwrap().name(), "inner");
    assert_eq!(restored.node(child).unwrap().parent().unwrap().node, loaded);
}

/// it should export identical snapshots from the original and the reload
#[test]
fn export_is_stable() {
    let r = registry();
    let (sym, root, _) = seed_symbol(&r);
    let first = export_node(&sym, root).unwrap();

    let mut restored = Symbol::new(SymbolId(1), "copy");
    let loaded = load_node(&mut restored, &r, &first).unwrap();
    let second = export_node(&restored, loaded).unwrap();
    assert_eq!(first, second);
}

/// it should skip unknown properties without dropping the node
#[test]
fn unknown_property_is_skipped() {
    let r = registry();
    let json = r#"{
        "id": 7,
        "name": "layer",
        "type": "group",
        "properties": [
            { "name": "ghost", "value": { "style": "inline", "text": "{\"type\":\"Float\",\"data\":1.0}" } },
            { "name": "x", "value": { "style": "inline", "text": "{\"type\":\"Float\",\"data\":2.0}" } }
        ]
    }"#;
    let mut sym = Symbol::new(SymbolId(0), "main");
    let id = load_node_json(&mut sym, &r, json).unwrap();
    let node = sym.node(id).unwrap();
    assert!(node.property("ghost").is_none());
    assert_eq!(
        node.property("x").unwrap().direct_value(),
        &ValueRef::Inline(Value::Float(2.0))
    );
}

/// it should skip child subtrees whose type has no factory
#[test]
fn unknown_child_type_is_skipped() {
    let r = registry();
    let json = r#"{
        "id": 1,
        "name": "root",
        "type": "group",
        "children": [
            { "name": "children", "nodes": [
                { "id": 2, "name": "ok", "type": "group" },
                { "id": 3, "name": "mystery", "type": "warp-field" }
            ] }
        ]
    }"#;
    let mut sym = Symbol::new(SymbolId(0), "main");
    let id = load_node_json(&mut sym, &r, json).unwrap();
    let ids = sym.node(id).unwrap().child_slot("children").unwrap().ids();
    assert_eq!(ids, vec![NodeId(2)]);
    assert!(sym.node(NodeId(3)).is_none());
}

/// it should skip unknown child groups and malformed containers
#[test]
fn malformed_pieces_are_skipped() {
    let r = registry();
    let json = r#"{
        "id": 1,
        "name": "root",
        "type": "group",
        "properties": [
            { "name": "x", "value": { "style": "inline", "text": "not json at all" } }
        ],
        "children": [
            { "name": "attachments", "nodes": [
                { "id": 2, "name": "stray", "type": "group" }
            ] }
        ]
    }"#;
    let mut sym = Symbol::new(SymbolId(0), "main");
    let id = load_node_json(&mut sym, &r, json).unwrap();
    let node = sym.node(id).unwrap();
    // Malformed container leaves the factory default in place.
    assert_eq!(
        node.property("x").unwrap().direct_value(),
        &ValueRef::Inline(Value::Float(0.0))
    );
    assert!(node.child_slot("attachments").is_none());
    assert!(node.child_slot("children").unwrap().is_empty());
}

/// it should ratchet the allocator past every loaded identifier
#[test]
fn loaded_ids_never_collide_with_fresh_ones() {
    let r = registry();
    let json = r#"{
        "id": 40,
        "name": "root",
        "type": "group",
        "children": [
            { "name": "children", "nodes": [
                { "id": 99, "name": "inner", "type": "group" }
            ] }
        ]
    }"#;
    let mut sym = Symbol::new(SymbolId(0), "main");
    load_node_json(&mut sym, &r, json).unwrap();
    let fresh = sym.create_node(&r, "group").unwrap();
    assert!(fresh.0 > 99);
}

/// it should fail loudly on unparseable snapshots and unknown root types
#[test]
fn hard_failures_are_errors() {
    let r = registry();
    let mut sym = Symbol::new(SymbolId(0), "main");
    assert!(load_node_json(&mut sym, &r, "{").is_err());
    let json = r#"{ "id": 1, "name": "n", "type": "warp-field" }"#;
    assert!(load_node_json(&mut sym, &r, json).is_err());
    assert!(export_node_json(&sym, NodeId(12345)).is_err());
}
