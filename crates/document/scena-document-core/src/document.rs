//! Document: owns the symbol collection, the transaction log, and the event
//! hub, and exposes every undoable operation.
//!
//! All structural or value mutations enter here, are wrapped as reversible
//! commands addressing state by identifier, and are submitted to the
//! history, which applies them and returns the change events to dispatch.
//! Passing `record = false` applies the same command once without history
//! (the silent path for initial population and headless use); callers must
//! tolerate both modes transparently.

use scena_api_core::{FrameKey, IdAllocator, NodeId, SymbolId, ValueRef};

use crate::curve::{Key, KeyframeCurve};
use crate::error::DocError;
use crate::events::{DocEvent, EventHub, Subscription};
use crate::history::{EditCommand, History};
use crate::node::Node;
use crate::property::PropertySlot;
use crate::registry::NodeRegistry;
use crate::symbol::Symbol;

/// Everything commands mutate: the symbol collection and current-symbol
/// marker. Kept separate from `History` so a command can borrow the state
/// while the history that owns it stays intact.
#[derive(Default, Debug)]
pub struct DocState {
    symbols: Vec<Symbol>,
    current: Option<SymbolId>,
    symbol_ids: IdAllocator,
}

impl DocState {
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id() == id)
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.iter_mut().find(|s| s.id() == id)
    }

    pub fn current(&self) -> Option<SymbolId> {
        self.current
    }

    fn take_symbol(&mut self, id: SymbolId) -> Option<Symbol> {
        let at = self.symbols.iter().position(|s| s.id() == id)?;
        Some(self.symbols.remove(at))
    }

    fn put_symbol(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    fn slot_mut(&mut self, sym: SymbolId, node: NodeId, prop: &str) -> Option<&mut PropertySlot> {
        self.symbol_mut(sym)?.node_mut(node)?.property_mut(prop)
    }

    fn require_slot(
        &mut self,
        sym: SymbolId,
        node: NodeId,
        prop: &str,
    ) -> Result<&mut PropertySlot, DocError> {
        let symbol = self.symbol_mut(sym).ok_or(DocError::UnknownSymbol(sym))?;
        let node_ref = symbol.node_mut(node).ok_or(DocError::UnknownNode(node))?;
        node_ref
            .property_mut(prop)
            .ok_or_else(|| DocError::UnknownProperty(prop.to_string()))
    }
}

pub struct Document {
    state: DocState,
    history: History,
    events: EventHub,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            state: DocState::default(),
            history: History::new(),
            events: EventHub::new(),
        }
    }

    pub fn state(&self) -> &DocState {
        &self.state
    }

    /// Shared subscription registry; clone it to subscribe from callbacks.
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub fn subscribe(&self, f: impl FnMut(&DocEvent) + 'static) -> Subscription {
        self.events.subscribe(f)
    }

    pub fn unsubscribe(&self, sub: Subscription) {
        self.events.unsubscribe(sub)
    }

    fn dispatch(&self, events: Vec<DocEvent>) {
        for event in &events {
            self.events.emit(event);
        }
    }

    fn run(&mut self, mut cmd: Box<dyn EditCommand>, record: bool) {
        let events = if record {
            self.history.submit(&mut self.state, cmd)
        } else {
            cmd.apply(&mut self.state)
        };
        self.dispatch(events);
    }

    // ------------------------------------------------------------------
    // History

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&mut self.state) {
            Some(events) => {
                self.dispatch(events);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&mut self.state) {
            Some(events) => {
                self.dispatch(events);
                true
            }
            None => false,
        }
    }

    pub fn begin_transaction(&mut self, title: &str) {
        self.history.begin_transaction(title);
    }

    pub fn commit_transaction(&mut self) -> Result<(), DocError> {
        self.history.commit_transaction()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // ------------------------------------------------------------------
    // Symbols

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.state.symbol(id)
    }

    /// Direct symbol access for initial population (silent path).
    pub fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.state.symbol_mut(id)
    }

    pub fn current_symbol(&self) -> Option<&Symbol> {
        self.state.current.and_then(|id| self.state.symbol(id))
    }

    pub fn add_symbol(&mut self, name: &str, record: bool) -> SymbolId {
        let id = SymbolId(self.state.symbol_ids.alloc());
        self.run(
            Box::new(AddSymbol {
                id,
                name: name.to_string(),
                parked: None,
            }),
            record,
        );
        id
    }

    pub fn remove_symbol(&mut self, id: SymbolId, record: bool) -> Result<(), DocError> {
        if self.state.symbol(id).is_none() {
            return Err(DocError::UnknownSymbol(id));
        }
        self.run(
            Box::new(RemoveSymbol {
                id,
                parked: None,
                was_current: false,
            }),
            record,
        );
        Ok(())
    }

    pub fn set_current_symbol(&mut self, id: Option<SymbolId>, record: bool) -> Result<(), DocError> {
        if let Some(id) = id {
            if self.state.symbol(id).is_none() {
                return Err(DocError::UnknownSymbol(id));
            }
        }
        if self.state.current == id {
            return Ok(());
        }
        self.run(Box::new(SetCurrentSymbol { new: id, old: None }), record);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Nodes & structure

    /// Default-construct a node (not itself undoable; attachment is).
    pub fn create_node(
        &mut self,
        sym: SymbolId,
        registry: &NodeRegistry,
        type_tag: &str,
    ) -> Result<NodeId, DocError> {
        let symbol = self
            .state
            .symbol_mut(sym)
            .ok_or(DocError::UnknownSymbol(sym))?;
        symbol.create_node(registry, type_tag)
    }

    pub fn node(&self, sym: SymbolId, id: NodeId) -> Option<&Node> {
        self.state.symbol(sym)?.node(id)
    }

    /// Append to a list slot.
    pub fn add_child(
        &mut self,
        sym: SymbolId,
        parent: NodeId,
        slot: &str,
        child: NodeId,
        record: bool,
    ) -> Result<(), DocError> {
        self.insert_child_inner(sym, parent, slot, None, child, record)
    }

    /// Insert into a list slot at `index`.
    pub fn insert_child(
        &mut self,
        sym: SymbolId,
        parent: NodeId,
        slot: &str,
        index: usize,
        child: NodeId,
        record: bool,
    ) -> Result<(), DocError> {
        self.insert_child_inner(sym, parent, slot, Some(index), child, record)
    }

    fn insert_child_inner(
        &mut self,
        sym: SymbolId,
        parent: NodeId,
        slot: &str,
        index: Option<usize>,
        child: NodeId,
        record: bool,
    ) -> Result<(), DocError> {
        let slot_ref = self.require_child_slot(sym, parent, slot)?;
        if !slot_ref.is_list() {
            return Err(DocError::SlotArity {
                slot: slot.to_string(),
            });
        }
        let len = slot_ref.len();
        if let Some(at) = index {
            if at > len {
                return Err(DocError::IndexOutOfRange { index: at, len });
            }
        }
        self.require_unowned(sym, child)?;
        self.run(
            Box::new(AttachChild {
                symbol: sym,
                parent,
                slot: slot.to_string(),
                index,
                child,
            }),
            record,
        );
        Ok(())
    }

    /// Remove a child from a list slot, locating its current index.
    pub fn remove_child(
        &mut self,
        sym: SymbolId,
        parent: NodeId,
        slot: &str,
        child: NodeId,
        record: bool,
    ) -> Result<(), DocError> {
        let slot_ref = self.require_child_slot(sym, parent, slot)?;
        if slot_ref.index_of(child).is_none() {
            return Err(DocError::NotAChild {
                child,
                slot: slot.to_string(),
            });
        }
        self.run(
            Box::new(DetachChild {
                symbol: sym,
                parent,
                slot: slot.to_string(),
                child,
                index: None,
            }),
            record,
        );
        Ok(())
    }

    pub fn remove_child_at(
        &mut self,
        sym: SymbolId,
        parent: NodeId,
        slot: &str,
        index: usize,
        record: bool,
    ) -> Result<(), DocError> {
        let slot_ref = self.require_child_slot(sym, parent, slot)?;
        let child = slot_ref.at(index).ok_or(DocError::IndexOutOfRange {
            index,
            len: slot_ref.len(),
        })?;
        self.remove_child(sym, parent, slot, child, record)
    }

    /// Remove every child as one named transaction, tail-backward so list
    /// indices stay stable during the operation.
    pub fn remove_all_children(
        &mut self,
        sym: SymbolId,
        parent: NodeId,
        slot: &str,
        record: bool,
    ) -> Result<(), DocError> {
        let children = self.require_child_slot(sym, parent, slot)?.ids();
        if record {
            self.begin_transaction("Remove All Children");
        }
        for child in children.into_iter().rev() {
            self.remove_child(sym, parent, slot, child, record)?;
        }
        if record {
            self.commit_transaction()?;
        }
        Ok(())
    }

    /// Replace the child of a single slot (detach old, attach new).
    pub fn set_single_child(
        &mut self,
        sym: SymbolId,
        parent: NodeId,
        slot: &str,
        child: Option<NodeId>,
        record: bool,
    ) -> Result<(), DocError> {
        let slot_ref = self.require_child_slot(sym, parent, slot)?;
        if !slot_ref.is_single() {
            return Err(DocError::SlotArity {
                slot: slot.to_string(),
            });
        }
        if slot_ref.get_single() == child {
            return Ok(());
        }
        if let Some(new_child) = child {
            self.require_unowned(sym, new_child)?;
        }
        self.run(
            Box::new(SetSingleChild {
                symbol: sym,
                parent,
                slot: slot.to_string(),
                new: child,
                old: None,
            }),
            record,
        );
        Ok(())
    }

    fn require_child_slot(
        &self,
        sym: SymbolId,
        parent: NodeId,
        slot: &str,
    ) -> Result<&crate::children::ChildSlot, DocError> {
        let symbol = self.state.symbol(sym).ok_or(DocError::UnknownSymbol(sym))?;
        let node = symbol.node(parent).ok_or(DocError::UnknownNode(parent))?;
        node.child_slot(slot)
            .ok_or_else(|| DocError::UnknownSlot(slot.to_string()))
    }

    fn require_unowned(&self, sym: SymbolId, child: NodeId) -> Result<(), DocError> {
        let symbol = self.state.symbol(sym).ok_or(DocError::UnknownSymbol(sym))?;
        let node = symbol.node(child).ok_or(DocError::UnknownNode(child))?;
        if node.parent().is_some() {
            return Err(DocError::AlreadyOwned { child });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Properties

    pub fn set_property_value(
        &mut self,
        sym: SymbolId,
        node: NodeId,
        prop: &str,
        value: ValueRef,
        record: bool,
    ) -> Result<(), DocError> {
        self.state.require_slot(sym, node, prop)?;
        self.run(
            Box::new(SetPropertyValue {
                symbol: sym,
                node,
                property: prop.to_string(),
                new: value,
                old: None,
            }),
            record,
        );
        Ok(())
    }

    /// Insert or overwrite a keyframe. No-op on non-animatable slots.
    pub fn set_key_at(
        &mut self,
        sym: SymbolId,
        node: NodeId,
        prop: &str,
        frame: i32,
        key: Key,
        record: bool,
    ) -> Result<(), DocError> {
        let slot = self.state.require_slot(sym, node, prop)?;
        if !slot.is_animatable() {
            return Ok(());
        }
        self.run(
            Box::new(SetTrackKey {
                symbol: sym,
                node,
                property: prop.to_string(),
                frame,
                new: key,
                old: None,
            }),
            record,
        );
        Ok(())
    }

    /// Remove a keyframe. No-op when the slot is non-animatable or no key
    /// exists at that frame (cache, curve, and event state all unchanged).
    pub fn remove_key_at(
        &mut self,
        sym: SymbolId,
        node: NodeId,
        prop: &str,
        frame: i32,
        record: bool,
    ) -> Result<(), DocError> {
        let slot = self.state.require_slot(sym, node, prop)?;
        if !slot.is_animatable() || slot.curve().and_then(|c| c.key_at(frame)).is_none() {
            return Ok(());
        }
        self.run(
            Box::new(RemoveTrackKey {
                symbol: sym,
                node,
                property: prop.to_string(),
                frame,
                old: None,
            }),
            record,
        );
        Ok(())
    }

    /// Wholesale track replacement; invalidates the slot's entire cache.
    pub fn set_track(
        &mut self,
        sym: SymbolId,
        node: NodeId,
        prop: &str,
        curve: Option<KeyframeCurve>,
        record: bool,
    ) -> Result<(), DocError> {
        self.state.require_slot(sym, node, prop)?;
        self.run(
            Box::new(SetTrack {
                symbol: sym,
                node,
                property: prop.to_string(),
                new: curve,
                old: None,
            }),
            record,
        );
        Ok(())
    }

    /// Re-point a slot's read key (scrubbing). Fires a change notification
    /// but is not recorded in history.
    pub fn synchronize_to(
        &mut self,
        sym: SymbolId,
        node: NodeId,
        prop: &str,
        key: FrameKey,
    ) -> Result<(), DocError> {
        let slot = self.state.require_slot(sym, node, prop)?;
        let (old, new) = slot.synchronize_to(key);
        self.dispatch(vec![DocEvent::PropertyChanged {
            symbol: sym,
            node,
            property: prop.to_string(),
            old,
            new,
        }]);
        Ok(())
    }

    /// Cache-backed evaluation at a frame key. For a fixed set of keys and
    /// curves, repeated calls with the same key return the identical cached
    /// result until an invalidating mutation.
    pub fn value_at(
        &mut self,
        sym: SymbolId,
        node: NodeId,
        prop: &str,
        key: FrameKey,
    ) -> Result<ValueRef, DocError> {
        let slot = self.state.require_slot(sym, node, prop)?;
        Ok(slot.entry_at(key).value.clone())
    }

    /// Resolve a reference container against a symbol's identifier index.
    /// Misses are a normal outcome, not an error.
    pub fn resolve_reference<'a>(&'a self, sym: SymbolId, value: &ValueRef) -> Option<&'a Node> {
        let id = value.as_reference()?;
        self.state.symbol(sym)?.resolve(id)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("symbols", &self.state.symbols.len())
            .field("current", &self.state.current)
            .field("history", &self.history)
            .finish()
    }
}

// ----------------------------------------------------------------------
// Commands

struct SetPropertyValue {
    symbol: SymbolId,
    node: NodeId,
    property: String,
    new: ValueRef,
    old: Option<ValueRef>,
}

impl SetPropertyValue {
    fn set(&mut self, state: &mut DocState, value: ValueRef) -> Vec<DocEvent> {
        let Some(slot) = state.slot_mut(self.symbol, self.node, &self.property) else {
            return Vec::new();
        };
        let old = slot.set_value_silent(value.clone());
        vec![DocEvent::PropertyChanged {
            symbol: self.symbol,
            node: self.node,
            property: self.property.clone(),
            old,
            new: value,
        }]
    }
}

impl EditCommand for SetPropertyValue {
    fn title(&self) -> &str {
        "Set Property"
    }

    fn apply(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        if self.old.is_none() {
            self.old = state
                .slot_mut(self.symbol, self.node, &self.property)
                .map(|slot| slot.direct_value().clone());
        }
        let new = self.new.clone();
        self.set(state, new)
    }

    fn invert(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        match self.old.clone() {
            Some(old) => self.set(state, old),
            None => Vec::new(),
        }
    }
}

struct SetTrackKey {
    symbol: SymbolId,
    node: NodeId,
    property: String,
    frame: i32,
    new: Key,
    old: Option<Option<Key>>,
}

impl EditCommand for SetTrackKey {
    fn title(&self) -> &str {
        "Set Key"
    }

    fn apply(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        let Some(slot) = state.slot_mut(self.symbol, self.node, &self.property) else {
            return Vec::new();
        };
        let old = slot.set_key_silent(self.frame, self.new.clone());
        if self.old.is_none() {
            self.old = Some(old);
        }
        vec![DocEvent::TrackKeyChanged {
            symbol: self.symbol,
            node: self.node,
            property: self.property.clone(),
            frame: self.frame,
        }]
    }

    fn invert(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        let Some(slot) = state.slot_mut(self.symbol, self.node, &self.property) else {
            return Vec::new();
        };
        match self.old.clone().flatten() {
            Some(key) => {
                slot.set_key_silent(self.frame, key);
            }
            None => {
                slot.remove_key_silent(self.frame);
            }
        }
        vec![DocEvent::TrackKeyChanged {
            symbol: self.symbol,
            node: self.node,
            property: self.property.clone(),
            frame: self.frame,
        }]
    }
}

struct RemoveTrackKey {
    symbol: SymbolId,
    node: NodeId,
    property: String,
    frame: i32,
    old: Option<Key>,
}

impl EditCommand for RemoveTrackKey {
    fn title(&self) -> &str {
        "Remove Key"
    }

    fn apply(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        let Some(slot) = state.slot_mut(self.symbol, self.node, &self.property) else {
            return Vec::new();
        };
        match slot.remove_key_silent(self.frame) {
            Some(old) => {
                self.old = Some(old);
                vec![DocEvent::TrackKeyChanged {
                    symbol: self.symbol,
                    node: self.node,
                    property: self.property.clone(),
                    frame: self.frame,
                }]
            }
            None => Vec::new(),
        }
    }

    fn invert(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        let Some(old) = self.old.clone() else {
            return Vec::new();
        };
        let Some(slot) = state.slot_mut(self.symbol, self.node, &self.property) else {
            return Vec::new();
        };
        slot.set_key_silent(self.frame, old);
        vec![DocEvent::TrackKeyChanged {
            symbol: self.symbol,
            node: self.node,
            property: self.property.clone(),
            frame: self.frame,
        }]
    }
}

struct SetTrack {
    symbol: SymbolId,
    node: NodeId,
    property: String,
    new: Option<KeyframeCurve>,
    old: Option<Option<KeyframeCurve>>,
}

impl SetTrack {
    fn replace(&self, state: &mut DocState, curve: Option<KeyframeCurve>) -> Vec<DocEvent> {
        let Some(slot) = state.slot_mut(self.symbol, self.node, &self.property) else {
            return Vec::new();
        };
        slot.set_track_silent(curve);
        vec![DocEvent::TrackReplaced {
            symbol: self.symbol,
            node: self.node,
            property: self.property.clone(),
        }]
    }
}

impl EditCommand for SetTrack {
    fn title(&self) -> &str {
        "Replace Track"
    }

    fn apply(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        if self.old.is_none() {
            self.old = state
                .slot_mut(self.symbol, self.node, &self.property)
                .map(|slot| slot.curve().cloned());
        }
        self.replace(state, self.new.clone())
    }

    fn invert(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        match self.old.clone() {
            Some(old) => self.replace(state, old),
            None => Vec::new(),
        }
    }
}

struct AttachChild {
    symbol: SymbolId,
    parent: NodeId,
    slot: String,
    index: Option<usize>,
    child: NodeId,
}

impl EditCommand for AttachChild {
    fn title(&self) -> &str {
        "Add Child"
    }

    fn apply(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        let Some(symbol) = state.symbol_mut(self.symbol) else {
            return Vec::new();
        };
        match symbol.attach_child(self.parent, &self.slot, self.index, self.child) {
            Ok(at) => {
                // Re-attachment on redo must land at the same index.
                self.index = Some(at);
                vec![DocEvent::ChildAdded {
                    symbol: self.symbol,
                    parent: self.parent,
                    slot: self.slot.clone(),
                    index: at,
                    child: self.child,
                }]
            }
            Err(_) => Vec::new(),
        }
    }

    fn invert(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        let Some(symbol) = state.symbol_mut(self.symbol) else {
            return Vec::new();
        };
        match symbol.detach_child(self.parent, &self.slot, self.child) {
            Ok(at) => vec![DocEvent::ChildRemoved {
                symbol: self.symbol,
                parent: self.parent,
                slot: self.slot.clone(),
                index: at,
                child: self.child,
            }],
            Err(_) => Vec::new(),
        }
    }
}

struct DetachChild {
    symbol: SymbolId,
    parent: NodeId,
    slot: String,
    child: NodeId,
    /// Index at detach time, captured on apply so undo restores position.
    index: Option<usize>,
}

impl EditCommand for DetachChild {
    fn title(&self) -> &str {
        "Remove Child"
    }

    fn apply(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        let Some(symbol) = state.symbol_mut(self.symbol) else {
            return Vec::new();
        };
        match symbol.detach_child(self.parent, &self.slot, self.child) {
            Ok(at) => {
                self.index = Some(at);
                vec![DocEvent::ChildRemoved {
                    symbol: self.symbol,
                    parent: self.parent,
                    slot: self.slot.clone(),
                    index: at,
                    child: self.child,
                }]
            }
            Err(_) => Vec::new(),
        }
    }

    fn invert(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        let Some(symbol) = state.symbol_mut(self.symbol) else {
            return Vec::new();
        };
        match symbol.attach_child(self.parent, &self.slot, self.index, self.child) {
            Ok(at) => vec![DocEvent::ChildAdded {
                symbol: self.symbol,
                parent: self.parent,
                slot: self.slot.clone(),
                index: at,
                child: self.child,
            }],
            Err(_) => Vec::new(),
        }
    }
}

struct SetSingleChild {
    symbol: SymbolId,
    parent: NodeId,
    slot: String,
    new: Option<NodeId>,
    old: Option<Option<NodeId>>,
}

impl SetSingleChild {
    fn transfer(&self, state: &mut DocState, target: Option<NodeId>) -> Vec<DocEvent> {
        let mut events = Vec::new();
        let Some(symbol) = state.symbol_mut(self.symbol) else {
            return events;
        };
        let current = symbol
            .node(self.parent)
            .and_then(|n| n.child_slot(&self.slot))
            .and_then(|s| s.get_single());
        if current == target {
            return events;
        }
        if let Some(old_child) = current {
            if symbol.detach_child(self.parent, &self.slot, old_child).is_ok() {
                events.push(DocEvent::ChildRemoved {
                    symbol: self.symbol,
                    parent: self.parent,
                    slot: self.slot.clone(),
                    index: 0,
                    child: old_child,
                });
            }
        }
        if let Some(new_child) = target {
            if symbol
                .attach_child(self.parent, &self.slot, None, new_child)
                .is_ok()
            {
                events.push(DocEvent::ChildAdded {
                    symbol: self.symbol,
                    parent: self.parent,
                    slot: self.slot.clone(),
                    index: 0,
                    child: new_child,
                });
            }
        }
        events
    }
}

impl EditCommand for SetSingleChild {
    fn title(&self) -> &str {
        "Set Child"
    }

    fn apply(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        if self.old.is_none() {
            self.old = state.symbol(self.symbol).map(|symbol| {
                symbol
                    .node(self.parent)
                    .and_then(|n| n.child_slot(&self.slot))
                    .and_then(|s| s.get_single())
            });
        }
        self.transfer(state, self.new)
    }

    fn invert(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        match self.old {
            Some(old) => self.transfer(state, old),
            None => Vec::new(),
        }
    }
}

struct AddSymbol {
    id: SymbolId,
    name: String,
    /// Holds the removed symbol between undo and redo.
    parked: Option<Symbol>,
}

impl EditCommand for AddSymbol {
    fn title(&self) -> &str {
        "Add Symbol"
    }

    fn apply(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        let symbol = self
            .parked
            .take()
            .unwrap_or_else(|| Symbol::new(self.id, &self.name));
        state.put_symbol(symbol);
        vec![DocEvent::SymbolAdded { symbol: self.id }]
    }

    fn invert(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        let mut events = Vec::new();
        if state.current == Some(self.id) {
            let old = state.current.take();
            events.push(DocEvent::CurrentSymbolChanged { old, new: None });
        }
        if let Some(symbol) = state.take_symbol(self.id) {
            self.parked = Some(symbol);
            events.push(DocEvent::SymbolRemoved { symbol: self.id });
        }
        events
    }
}

struct RemoveSymbol {
    id: SymbolId,
    parked: Option<Symbol>,
    was_current: bool,
}

impl EditCommand for RemoveSymbol {
    fn title(&self) -> &str {
        "Remove Symbol"
    }

    fn apply(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        let mut events = Vec::new();
        if state.current == Some(self.id) {
            self.was_current = true;
            let old = state.current.take();
            events.push(DocEvent::CurrentSymbolChanged { old, new: None });
        }
        if let Some(symbol) = state.take_symbol(self.id) {
            self.parked = Some(symbol);
            events.push(DocEvent::SymbolRemoved { symbol: self.id });
        }
        events
    }

    fn invert(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        let mut events = Vec::new();
        if let Some(symbol) = self.parked.take() {
            state.put_symbol(symbol);
            events.push(DocEvent::SymbolAdded { symbol: self.id });
        }
        if self.was_current {
            let old = state.current;
            state.current = Some(self.id);
            events.push(DocEvent::CurrentSymbolChanged {
                old,
                new: Some(self.id),
            });
        }
        events
    }
}

struct SetCurrentSymbol {
    new: Option<SymbolId>,
    old: Option<Option<SymbolId>>,
}

impl EditCommand for SetCurrentSymbol {
    fn title(&self) -> &str {
        "Set Current Symbol"
    }

    fn apply(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        if self.old.is_none() {
            self.old = Some(state.current);
        }
        let old = state.current;
        state.current = self.new;
        vec![DocEvent::CurrentSymbolChanged {
            old,
            new: self.new,
        }]
    }

    fn invert(&mut self, state: &mut DocState) -> Vec<DocEvent> {
        let Some(target) = self.old else {
            return Vec::new();
        };
        let old = state.current;
        state.current = target;
        vec![DocEvent::CurrentSymbolChanged { old, new: target }]
    }
}
