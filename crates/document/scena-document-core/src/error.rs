//! Usage/contract errors. Load-time inconsistencies are not errors (they are
//! logged and skipped), and reference-resolution misses surface as `None`.

use scena_api_core::{NodeId, SymbolId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocError {
    #[error("unknown symbol {0:?}")]
    UnknownSymbol(SymbolId),

    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("node has no property slot named '{0}'")]
    UnknownProperty(String),

    #[error("node has no child slot named '{0}'")]
    UnknownSlot(String),

    #[error("no factory registered for type tag '{0}'")]
    UnknownType(String),

    #[error("node {child:?} is not a child of slot '{slot}'")]
    NotAChild { child: NodeId, slot: String },

    #[error("node {child:?} already has an owning child slot")]
    AlreadyOwned { child: NodeId },

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("child slot '{slot}' does not support this arity")]
    SlotArity { slot: String },

    #[error("symbol root is already set")]
    RootAlreadySet,

    #[error("commit with no open transaction")]
    NoOpenTransaction,
}
