//! Nodes: tree vertices exposing declared property and child slots.
//!
//! Ownership is arena-indexed: the owning Symbol's arena holds every node by
//! value, and a node's parent is a back-index (node id + slot name), never a
//! live pointer. A node has at most one owning child slot at a time;
//! reassigning ownership goes through the Symbol's attach/detach primitives.

use hashbrown::HashMap;

use scena_api_core::NodeId;

use crate::children::ChildSlot;
use crate::property::PropertySlot;

/// Back-reference to the child slot that owns a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentLink {
    pub node: NodeId,
    pub slot: String,
}

/// Symbol-owned node storage.
pub type NodeArena = HashMap<NodeId, Node>;

#[derive(Debug)]
pub struct Node {
    id: NodeId,
    name: String,
    type_tag: String,
    parent: Option<ParentLink>,
    properties: Vec<PropertySlot>,
    children: Vec<ChildSlot>,
}

impl Node {
    pub fn new(id: NodeId, type_tag: &str, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            type_tag: type_tag.to_string(),
            parent: None,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Declare a property slot (factory/builder use; order is preserved).
    pub fn with_property(mut self, slot: PropertySlot) -> Self {
        self.properties.push(slot);
        self
    }

    /// Declare a child slot (factory/builder use; order is preserved).
    pub fn with_child_slot(mut self, slot: ChildSlot) -> Self {
        self.children.push(slot);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ParentLink>) {
        self.parent = parent;
    }

    pub fn properties(&self) -> &[PropertySlot] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertySlot> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut PropertySlot> {
        self.properties.iter_mut().find(|p| p.name() == name)
    }

    pub fn child_slots(&self) -> &[ChildSlot] {
        &self.children
    }

    pub fn child_slot(&self, name: &str) -> Option<&ChildSlot> {
        self.children.iter().find(|s| s.name() == name)
    }

    pub(crate) fn child_slot_mut(&mut self, name: &str) -> Option<&mut ChildSlot> {
        self.children.iter_mut().find(|s| s.name() == name)
    }
}
