//! Change notifications and the subscription registry.
//!
//! Dispatch is synchronous and single-threaded: callbacks run re-entrantly
//! inside the mutation that fired them, on the calling thread. The listener
//! list is snapshotted before iteration so a callback may subscribe or
//! unsubscribe during dispatch. Subscriptions are explicit caller-owned
//! handles released with `unsubscribe`; there are no weak references.

use std::cell::RefCell;
use std::rc::Rc;

use scena_api_core::{NodeId, SymbolId, ValueRef};

/// Structural and value change events at node/symbol/document granularity.
#[derive(Clone, Debug, PartialEq)]
pub enum DocEvent {
    ChildAdded {
        symbol: SymbolId,
        parent: NodeId,
        slot: String,
        index: usize,
        child: NodeId,
    },
    ChildRemoved {
        symbol: SymbolId,
        parent: NodeId,
        slot: String,
        index: usize,
        child: NodeId,
    },
    PropertyChanged {
        symbol: SymbolId,
        node: NodeId,
        property: String,
        old: ValueRef,
        new: ValueRef,
    },
    TrackReplaced {
        symbol: SymbolId,
        node: NodeId,
        property: String,
    },
    TrackKeyChanged {
        symbol: SymbolId,
        node: NodeId,
        property: String,
        frame: i32,
    },
    SymbolAdded {
        symbol: SymbolId,
    },
    SymbolRemoved {
        symbol: SymbolId,
    },
    CurrentSymbolChanged {
        old: Option<SymbolId>,
        new: Option<SymbolId>,
    },
}

/// Caller-owned subscription handle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Subscription(u64);

type Listener = Rc<RefCell<dyn FnMut(&DocEvent)>>;

#[derive(Default)]
struct HubInner {
    next: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Subscription registry. Clones share the same listener list, so a callback
/// holding a clone can re-enter `subscribe`/`unsubscribe` safely.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Rc<RefCell<HubInner>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, f: impl FnMut(&DocEvent) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next;
        inner.next += 1;
        inner.listeners.push((id, Rc::new(RefCell::new(f))));
        Subscription(id)
    }

    pub fn unsubscribe(&self, sub: Subscription) {
        self.inner.borrow_mut().listeners.retain(|(id, _)| *id != sub.0);
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn emit(&self, event: &DocEvent) {
        // Snapshot before iterating: callbacks may mutate the listener list.
        let snapshot: Vec<Listener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in snapshot {
            (listener.borrow_mut())(event);
        }
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
