//! scena-api-core: shared value/identifier API for the scena document model
//! (engine-agnostic).

pub mod container;
pub mod frame;
pub mod ids;
pub mod value;

pub use container::{ContainerSnapshot, ValueRef};
pub use frame::FrameKey;
pub use ids::{IdAllocator, NodeId, SymbolId};
pub use value::{Value, ValueKind};
