//! Value containers: the three storage styles a property's value can take.
//!
//! A `Reference` stores only a node identifier and is resolved lazily through
//! the owning Symbol's identifier index at read time. It never holds a live
//! node handle, so it survives undo/redo of structural changes that might
//! temporarily remove and restore the referenced node.

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;
use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ValueRef {
    /// Inline literal value.
    Inline(Value),
    /// Reference to another node by identifier, resolved lazily.
    Reference(NodeId),
    /// Key of an externally resolved resource/asset.
    Resource(String),
}

impl ValueRef {
    #[inline]
    pub fn as_inline(&self) -> Option<&Value> {
        match self {
            ValueRef::Inline(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_reference(&self) -> Option<NodeId> {
        match self {
            ValueRef::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// Snapshot form: `{ style, text }`.
    pub fn to_snapshot(&self) -> ContainerSnapshot {
        match self {
            ValueRef::Inline(v) => ContainerSnapshot {
                style: "inline".into(),
                // Value is a closed serde enum; serialization cannot fail.
                text: serde_json::to_string(v).unwrap_or_default(),
            },
            ValueRef::Reference(id) => ContainerSnapshot {
                style: "reference".into(),
                text: id.0.to_string(),
            },
            ValueRef::Resource(key) => ContainerSnapshot {
                style: "resource".into(),
                text: key.clone(),
            },
        }
    }

    /// Parse a snapshot back into a container. Unknown styles and malformed
    /// text are load-time inconsistencies; callers skip-and-continue.
    pub fn from_snapshot(snap: &ContainerSnapshot) -> Option<ValueRef> {
        match snap.style.as_str() {
            "inline" => serde_json::from_str(&snap.text).ok().map(ValueRef::Inline),
            "reference" => snap.text.parse::<u64>().ok().map(|n| ValueRef::Reference(NodeId(n))),
            "resource" => Some(ValueRef::Resource(snap.text.clone())),
            _ => None,
        }
    }
}

/// Serialized container form shared by property values and track keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    pub style: String,
    pub text: String,
}
