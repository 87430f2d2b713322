//! Structural snapshot contract: recursive node export/load.
//!
//! This is the boundary the on-disk format builds on, not the format itself.
//! Loading is forward-compatible: unknown property names, unknown child
//! groups, unresolvable type tags, and malformed containers are logged and
//! skipped, never fatal. Explicit identifiers ratchet the symbol's
//! allocator so fresh allocations cannot collide.

use serde::{Deserialize, Serialize};

use scena_api_core::{ContainerSnapshot, NodeId, ValueRef};

use crate::curve::{BoundaryPolicy, Interpolation, Key, KeyframeCurve};
use crate::registry::NodeRegistry;
use crate::symbol::Symbol;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub properties: Vec<PropertySnapshot>,
    #[serde(default)]
    pub children: Vec<ChildGroupSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySnapshot {
    pub name: String,
    pub value: ContainerSnapshot,
    #[serde(default)]
    pub track: Option<TrackSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    pub before: BoundaryPolicy,
    pub after: BoundaryPolicy,
    pub keys: Vec<KeySnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeySnapshot {
    pub frame: i32,
    pub interp: Interpolation,
    pub tangents: [f32; 4],
    pub value: ContainerSnapshot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChildGroupSnapshot {
    pub name: String,
    pub nodes: Vec<NodeSnapshot>,
}

/// Export a node and its subtree. Property order and child-group order
/// follow the node's declared slot order.
pub fn export_node(symbol: &Symbol, id: NodeId) -> Option<NodeSnapshot> {
    let node = symbol.node(id)?;
    let properties = node
        .properties()
        .iter()
        .map(|slot| PropertySnapshot {
            name: slot.name().to_string(),
            value: slot.direct_value().to_snapshot(),
            track: slot.curve().map(|curve| TrackSnapshot {
                before: curve.before,
                after: curve.after,
                keys: curve
                    .frames()
                    .into_iter()
                    .filter_map(|frame| {
                        curve.key_at(frame).map(|key| KeySnapshot {
                            frame,
                            interp: key.interp,
                            tangents: key.tangents,
                            value: key.value.to_snapshot(),
                        })
                    })
                    .collect(),
            }),
        })
        .collect();
    let children = node
        .child_slots()
        .iter()
        .map(|slot| ChildGroupSnapshot {
            name: slot.name().to_string(),
            nodes: slot
                .ids()
                .into_iter()
                .filter_map(|child| export_node(symbol, child))
                .collect(),
        })
        .collect();
    Some(NodeSnapshot {
        id: id.0,
        name: node.name().to_string(),
        type_tag: node.type_tag().to_string(),
        properties,
        children,
    })
}

/// Load a node subtree into `symbol`. Returns None when the root snapshot's
/// type tag has no registered factory. The loaded subtree is not attached
/// anywhere; the caller decides (set as root, or attach into a slot).
pub fn load_node(symbol: &mut Symbol, registry: &NodeRegistry, snap: &NodeSnapshot) -> Option<NodeId> {
    let id = NodeId(snap.id);
    let Some(mut node) = registry.create(&snap.type_tag, id) else {
        log::warn!(
            "skipping node {}: no factory for type tag '{}'",
            snap.id,
            snap.type_tag
        );
        return None;
    };
    node.set_name(&snap.name);

    for prop in &snap.properties {
        let Some(slot) = node.property_mut(&prop.name) else {
            log::warn!(
                "skipping unknown property '{}' on type '{}'",
                prop.name,
                snap.type_tag
            );
            continue;
        };
        match ValueRef::from_snapshot(&prop.value) {
            Some(value) => {
                slot.set_value_silent(value);
            }
            None => log::warn!("skipping malformed value for property '{}'", prop.name),
        }
        if let Some(track) = &prop.track {
            let mut curve = KeyframeCurve::new(track.before, track.after);
            for key in &track.keys {
                match ValueRef::from_snapshot(&key.value) {
                    Some(value) => {
                        curve.set_key(
                            key.frame,
                            Key {
                                value,
                                interp: key.interp,
                                tangents: key.tangents,
                            },
                        );
                    }
                    None => log::warn!(
                        "skipping malformed key at frame {} of '{}'",
                        key.frame,
                        prop.name
                    ),
                }
            }
            slot.set_track_silent(Some(curve));
        }
    }

    // insert_node ratchets the id allocator past the explicit identifier.
    symbol.insert_node(node);

    for group in &snap.children {
        let known = symbol
            .node(id)
            .is_some_and(|n| n.child_slot(&group.name).is_some());
        if !known {
            log::warn!(
                "skipping unknown child group '{}' on type '{}'",
                group.name,
                snap.type_tag
            );
            continue;
        }
        for child_snap in &group.nodes {
            if let Some(child) = load_node(symbol, registry, child_snap) {
                if let Err(err) = symbol.attach_child(id, &group.name, None, child) {
                    log::warn!("loaded child {child:?} not attached: {err}");
                }
            }
        }
    }

    Some(id)
}

/// Export a subtree as pretty JSON.
pub fn export_node_json(symbol: &Symbol, id: NodeId) -> Result<String, String> {
    let snap = export_node(symbol, id).ok_or_else(|| format!("unknown node {id:?}"))?;
    serde_json::to_string_pretty(&snap).map_err(|e| format!("serialize error: {e}"))
}

/// Parse and load a subtree from JSON.
pub fn load_node_json(symbol: &mut Symbol, registry: &NodeRegistry, s: &str) -> Result<NodeId, String> {
    let snap: NodeSnapshot = serde_json::from_str(s).map_err(|e| format!("parse error: {e}"))?;
    load_node(symbol, registry, &snap).ok_or_else(|| "no loadable node in snapshot".to_string())
}
