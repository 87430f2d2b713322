//! Symbols: one independent document-tree scope with its own node arena,
//! identifier index, allocator, and selection.
//!
//! The identifier index is rebuilt by full subtree traversal on every
//! structural change. This is deliberately coarse (O(subtree) per edit) in
//! exchange for never needing incremental bookkeeping that could drift out
//! of sync. Detached nodes stay in the arena, unreachable and absent from
//! the index, so undo/redo can re-attach them with their identifiers intact.

use hashbrown::HashSet;

use scena_api_core::{IdAllocator, NodeId, SymbolId};

use crate::error::DocError;
use crate::node::{Node, NodeArena, ParentLink};
use crate::registry::NodeRegistry;

/// Reachable-identifier index: every node reachable from the root appears
/// exactly once; resolution of anything else is a miss, not an error.
#[derive(Default, Debug)]
pub struct IdIndex {
    reachable: HashSet<NodeId>,
}

impl IdIndex {
    pub fn contains(&self, id: NodeId) -> bool {
        self.reachable.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.reachable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reachable.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.reachable.iter().copied()
    }

    /// Full traversal from the root; replaces the index atomically.
    pub fn rebuild(&mut self, arena: &NodeArena, root: Option<NodeId>) {
        let mut reachable = HashSet::new();
        let mut stack: Vec<NodeId> = root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = arena.get(&id) else {
                continue;
            };
            if !reachable.insert(id) {
                continue;
            }
            for slot in node.child_slots() {
                stack.extend(slot.ids());
            }
        }
        self.reachable = reachable;
    }
}

#[derive(Debug)]
pub struct Symbol {
    id: SymbolId,
    name: String,
    arena: NodeArena,
    root: Option<NodeId>,
    index: IdIndex,
    ids: IdAllocator,
    selection: Vec<NodeId>,
}

impl Symbol {
    pub fn new(id: SymbolId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            arena: NodeArena::new(),
            root: None,
            index: IdIndex::default(),
            ids: IdAllocator::new(),
            selection: Vec::new(),
        }
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Set the root node. Setting it more than once is a usage error.
    pub fn set_root(&mut self, node: NodeId) -> Result<(), DocError> {
        if self.root.is_some() {
            return Err(DocError::RootAlreadySet);
        }
        if !self.arena.contains_key(&node) {
            return Err(DocError::UnknownNode(node));
        }
        self.root = Some(node);
        self.rebuild_index();
        Ok(())
    }

    pub fn index(&self) -> &IdIndex {
        &self.index
    }

    /// Arena access: includes detached nodes (held for undo/redo).
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(&id)
    }

    /// Resolve an identifier to a live, reachable node. Misses (detached or
    /// never-issued ids) are a normal outcome of undo/redo or deletion.
    pub fn resolve(&self, id: NodeId) -> Option<&Node> {
        if self.index.contains(id) {
            self.arena.get(&id)
        } else {
            None
        }
    }

    pub fn alloc_node_id(&mut self) -> NodeId {
        NodeId(self.ids.alloc())
    }

    /// Ratchet the allocator past explicitly loaded identifiers.
    pub fn advance_next_id(&mut self, min: u64) {
        self.ids.advance_next(min);
    }

    /// Insert a node built elsewhere (loader path). Keeps the allocator
    /// ahead of the node's explicit identifier.
    pub fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id();
        self.ids.advance_next(id.0 + 1);
        self.arena.insert(id, node);
        id
    }

    /// Construct a default node of `type_tag`, recursively default-populating
    /// single child slots whose declared type is registered. Missing
    /// providers for defaults are logged and skipped, not fatal.
    pub fn create_node(&mut self, registry: &NodeRegistry, type_tag: &str) -> Result<NodeId, DocError> {
        let id = self.alloc_node_id();
        let node = registry
            .create(type_tag, id)
            .ok_or_else(|| DocError::UnknownType(type_tag.to_string()))?;
        self.arena.insert(id, node);
        self.populate_default_children(registry, id);
        Ok(id)
    }

    fn populate_default_children(&mut self, registry: &NodeRegistry, id: NodeId) {
        let defaults: Vec<(String, String)> = self
            .arena
            .get(&id)
            .map(|node| {
                node.child_slots()
                    .iter()
                    .filter(|s| s.is_single() && s.is_empty())
                    .map(|s| (s.name().to_string(), s.child_type().to_string()))
                    .collect()
            })
            .unwrap_or_default();
        for (slot, child_type) in defaults {
            if !registry.contains(&child_type) {
                log::warn!("no factory for default child type '{child_type}' in slot '{slot}'");
                continue;
            }
            match self.create_node(registry, &child_type) {
                Ok(child) => {
                    if let Err(err) = self.attach_child(id, &slot, None, child) {
                        log::warn!("default child for slot '{slot}' not attached: {err}");
                    }
                }
                Err(err) => log::warn!("default child for slot '{slot}' not constructed: {err}"),
            }
        }
    }

    /// Structural primitive: place `child` into `parent`'s slot and set its
    /// parent back-link. Rebuilds the identifier index.
    pub fn attach_child(
        &mut self,
        parent: NodeId,
        slot: &str,
        index: Option<usize>,
        child: NodeId,
    ) -> Result<usize, DocError> {
        if !self.arena.contains_key(&child) {
            return Err(DocError::UnknownNode(child));
        }
        if self
            .arena
            .get(&child)
            .and_then(|c| c.parent())
            .is_some()
        {
            return Err(DocError::AlreadyOwned { child });
        }
        let parent_node = self
            .arena
            .get_mut(&parent)
            .ok_or(DocError::UnknownNode(parent))?;
        let slot_ref = parent_node
            .child_slot_mut(slot)
            .ok_or_else(|| DocError::UnknownSlot(slot.to_string()))?;
        let at = slot_ref.insert_id(index, child)?;
        if let Some(child_node) = self.arena.get_mut(&child) {
            child_node.set_parent(Some(ParentLink {
                node: parent,
                slot: slot.to_string(),
            }));
        }
        self.rebuild_index();
        Ok(at)
    }

    /// Structural primitive: remove `child` from `parent`'s slot, clearing
    /// its parent back-link. Returns the index it held. The node stays in
    /// the arena for undo/redo.
    pub fn detach_child(&mut self, parent: NodeId, slot: &str, child: NodeId) -> Result<usize, DocError> {
        let parent_node = self
            .arena
            .get_mut(&parent)
            .ok_or(DocError::UnknownNode(parent))?;
        let slot_ref = parent_node
            .child_slot_mut(slot)
            .ok_or_else(|| DocError::UnknownSlot(slot.to_string()))?;
        let at = slot_ref.remove_id(child)?;
        if let Some(child_node) = self.arena.get_mut(&child) {
            child_node.set_parent(None);
        }
        self.rebuild_index();
        Ok(at)
    }

    pub fn rebuild_index(&mut self) {
        self.index.rebuild(&self.arena, self.root);
    }

    /// If `base` is unused, return it; otherwise strip any trailing numeric
    /// suffix to a stem and probe `stem1, stem2, ...`.
    pub fn create_unique_name(&self, base: &str) -> String {
        let used: HashSet<&str> = self
            .index
            .ids()
            .filter_map(|id| self.arena.get(&id))
            .map(|n| n.name())
            .collect();
        if !used.contains(base) {
            return base.to_string();
        }
        let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
        let mut n: u64 = 1;
        loop {
            let candidate = format!("{stem}{n}");
            if !used.contains(candidate.as_str()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Selected node ids, filtered to currently reachable nodes.
    pub fn selection(&self) -> Vec<NodeId> {
        self.selection
            .iter()
            .copied()
            .filter(|id| self.index.contains(*id))
            .collect()
    }

    pub fn set_selection(&mut self, selection: Vec<NodeId>) {
        self.selection = selection;
    }

    pub fn select(&mut self, id: NodeId) {
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
    }

    pub fn deselect(&mut self, id: NodeId) {
        self.selection.retain(|s| *s != id);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}
