//! Per-(property, frame-key) value cache.
//!
//! An entry holds the resolved value container for one `FrameKey` plus an
//! open-ended map of caller-supplied derived objects ("user cache", e.g.
//! precomputed geometry) keyed by a type tag. Entries are memoized until
//! explicitly invalidated; invalidation is selective by frame span when a
//! single key changes and total when the whole curve or the direct value is
//! replaced.

use std::any::Any;

use hashbrown::HashMap;

use scena_api_core::{FrameKey, ValueRef};

pub struct CacheEntry {
    pub value: ValueRef,
    user: HashMap<String, Box<dyn Any>>,
}

impl CacheEntry {
    pub fn new(value: ValueRef) -> Self {
        Self {
            value,
            user: HashMap::new(),
        }
    }

    /// Store derived data under a type tag, replacing any previous object.
    pub fn set_user<T: Any>(&mut self, tag: &str, data: T) {
        self.user.insert(tag.to_string(), Box::new(data));
    }

    pub fn user<T: Any>(&self, tag: &str) -> Option<&T> {
        self.user.get(tag).and_then(|b| b.downcast_ref::<T>())
    }

    pub fn user_mut<T: Any>(&mut self, tag: &str) -> Option<&mut T> {
        self.user.get_mut(tag).and_then(|b| b.downcast_mut::<T>())
    }

    pub fn take_user<T: Any>(&mut self, tag: &str) -> Option<T> {
        let boxed = self.user.remove(tag)?;
        match boxed.downcast::<T>() {
            Ok(data) => Some(*data),
            Err(boxed) => {
                // Wrong type requested: put it back untouched.
                self.user.insert(tag.to_string(), boxed);
                None
            }
        }
    }
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("value", &self.value)
            .field("user_tags", &self.user.len())
            .finish()
    }
}

#[derive(Default)]
pub struct ValueCache {
    entries: HashMap<FrameKey, CacheEntry>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: FrameKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn get(&self, key: FrameKey) -> Option<&CacheEntry> {
        self.entries.get(&key)
    }

    pub fn get_mut(&mut self, key: FrameKey) -> Option<&mut CacheEntry> {
        self.entries.get_mut(&key)
    }

    pub fn insert(&mut self, key: FrameKey, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    pub fn get_or_insert_with(
        &mut self,
        key: FrameKey,
        make: impl FnOnce() -> CacheEntry,
    ) -> &mut CacheEntry {
        self.entries.entry(key).or_insert_with(make)
    }

    pub fn remove(&mut self, key: FrameKey) -> Option<CacheEntry> {
        self.entries.remove(&key)
    }

    /// Drop only the direct-value entry (direct value replaced).
    pub fn invalidate_direct(&mut self) {
        self.entries.remove(&FrameKey::Direct);
    }

    /// Drop everything (whole-curve replacement).
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    /// Drop every concrete-frame entry in the closed interval [lo, hi].
    pub fn invalidate_span(&mut self, lo: i32, hi: i32) {
        self.entries.retain(|key, _| match key {
            FrameKey::Direct => true,
            FrameKey::Frame(f) => *f < lo || *f > hi,
        });
    }

    /// Cached concrete frames, ascending (diagnostics/tests).
    pub fn cached_frames(&self) -> Vec<i32> {
        let mut frames: Vec<i32> = self
            .entries
            .keys()
            .filter_map(|k| k.frame())
            .collect();
        frames.sort_unstable();
        frames
    }
}

impl std::fmt::Debug for ValueCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}
