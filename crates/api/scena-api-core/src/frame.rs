//! Frame keys: the time coordinate used for animation evaluation and
//! value-cache addressing.

use serde::{Deserialize, Serialize};

/// A cache/evaluation key: either the sentinel "direct" key (the un-keyed
/// current value) or a concrete integer frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum FrameKey {
    Direct,
    Frame(i32),
}

impl FrameKey {
    #[inline]
    pub fn is_direct(&self) -> bool {
        matches!(self, FrameKey::Direct)
    }

    #[inline]
    pub fn frame(&self) -> Option<i32> {
        match self {
            FrameKey::Direct => None,
            FrameKey::Frame(f) => Some(*f),
        }
    }
}
