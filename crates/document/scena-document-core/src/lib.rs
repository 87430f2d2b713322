//! Scena Document Core (engine-agnostic)
//!
//! Mutable scene-graph document model: node trees with declared property and
//! child slots, a linear undo/redo transaction log with nested named
//! transactions, keyframe curve evaluation with boundary policies, and a
//! per-(property, frame-key) value cache with selective invalidation.
//! Rendering, UI, and the full file format live outside this crate; only the
//! data/consistency model they depend on is here.

pub mod cache;
pub mod children;
pub mod curve;
pub mod document;
pub mod error;
pub mod events;
pub mod history;
pub mod node;
pub mod property;
pub mod registry;
pub mod snapshot;
pub mod symbol;

// Re-exports for consumers (adapters)
pub use cache::{CacheEntry, ValueCache};
pub use children::{ChildSlot, ChildSlotKind};
pub use curve::{BoundaryPolicy, Interpolation, Key, KeyframeCurve};
pub use document::{DocState, Document};
pub use error::DocError;
pub use events::{DocEvent, EventHub, Subscription};
pub use history::{EditCommand, History};
pub use node::{Node, NodeArena, ParentLink};
pub use property::{PropertyFlags, PropertySlot};
pub use registry::{NodeFactory, NodeRegistry};
pub use snapshot::{
    export_node, export_node_json, load_node, load_node_json, ChildGroupSnapshot, KeySnapshot,
    NodeSnapshot, PropertySnapshot, TrackSnapshot,
};
pub use symbol::{IdIndex, Symbol};
pub use scena_api_core::{ContainerSnapshot, FrameKey, IdAllocator, NodeId, SymbolId, Value, ValueKind, ValueRef};
