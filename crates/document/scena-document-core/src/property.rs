//! Property slots: a direct value plus an optional keyframe curve of the
//! same value type, read through a synchronization key and memoized in a
//! value cache.
//!
//! Exactly one of {direct value, current synchronized frame} determines the
//! "current" value at any moment; switching is explicit via
//! `synchronize_to`. The `*_silent` mutators apply without history or
//! notifications; the document-level operations wrap them as reversible
//! commands and fire events (they also enforce the animatable flag).

use scena_api_core::{FrameKey, Value, ValueRef};

use crate::cache::{CacheEntry, ValueCache};
use crate::curve::{Interpolation, Key, KeyframeCurve};

/// Property flags bitset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyFlags(u8);

impl PropertyFlags {
    pub const NONE: PropertyFlags = PropertyFlags(0);
    /// The slot may carry a keyframe curve.
    pub const ANIMATABLE: PropertyFlags = PropertyFlags(1 << 0);
    /// Hidden from generic property editors.
    pub const HIDDEN: PropertyFlags = PropertyFlags(1 << 1);

    #[inline]
    pub fn contains(&self, other: PropertyFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for PropertyFlags {
    type Output = PropertyFlags;
    fn bitor(self, rhs: PropertyFlags) -> PropertyFlags {
        PropertyFlags(self.0 | rhs.0)
    }
}

#[derive(Debug)]
pub struct PropertySlot {
    name: String,
    flags: PropertyFlags,
    value: ValueRef,
    curve: Option<KeyframeCurve>,
    sync: FrameKey,
    cache: ValueCache,
}

impl PropertySlot {
    pub fn new(name: &str, value: ValueRef, flags: PropertyFlags) -> Self {
        Self {
            name: name.to_string(),
            flags,
            value,
            curve: None,
            sync: FrameKey::Direct,
            cache: ValueCache::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> PropertyFlags {
        self.flags
    }

    pub fn is_animatable(&self) -> bool {
        self.flags.contains(PropertyFlags::ANIMATABLE)
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(PropertyFlags::HIDDEN)
    }

    /// The direct container itself, bypassing the cache and sync key.
    pub fn direct_value(&self) -> &ValueRef {
        &self.value
    }

    pub fn curve(&self) -> Option<&KeyframeCurve> {
        self.curve.as_ref()
    }

    pub fn sync_key(&self) -> FrameKey {
        self.sync
    }

    pub fn cache(&self) -> &ValueCache {
        &self.cache
    }

    /// Current container, read through the synchronization key.
    pub fn data(&mut self) -> &ValueRef {
        let key = self.sync;
        &self.entry_at(key).value
    }

    /// Current inline value, if the container is inline.
    pub fn value(&mut self) -> Option<Value> {
        self.data().as_inline().cloned()
    }

    /// Memoized cache population. Direct builds from the direct container;
    /// a concrete frame builds from the curve (exact key, interpolated span,
    /// or boundary policy) and falls back to the Direct entry when the curve
    /// leaves the frame undefined.
    pub fn entry_at(&mut self, key: FrameKey) -> &mut CacheEntry {
        let key = self.populated_key(key);
        let curve = &self.curve;
        let direct = &self.value;
        self.cache.get_or_insert_with(key, || {
            let value = match key {
                FrameKey::Direct => direct.clone(),
                FrameKey::Frame(f) => curve
                    .as_ref()
                    .and_then(|c| c.evaluate(f))
                    .unwrap_or_else(|| direct.clone()),
            };
            CacheEntry::new(value)
        })
    }

    fn populated_key(&self, key: FrameKey) -> FrameKey {
        match key {
            FrameKey::Direct => FrameKey::Direct,
            FrameKey::Frame(f) => {
                if self.cache.contains(key) {
                    return key;
                }
                let covered = self
                    .curve
                    .as_ref()
                    .is_some_and(|c| c.evaluate(f).is_some());
                if covered {
                    key
                } else {
                    FrameKey::Direct
                }
            }
        }
    }

    /// Replace the direct container. Switches reads back to Direct and drops
    /// only the Direct cache entry. Returns the old container.
    pub fn set_value_silent(&mut self, value: ValueRef) -> ValueRef {
        self.sync = FrameKey::Direct;
        self.cache.invalidate_direct();
        std::mem::replace(&mut self.value, value)
    }

    /// Re-point the current read key (playback scrubbing). Copies the
    /// target's cached resolution into the Direct cache slot so un-animated
    /// consumers transparently see the animated value. Returns (old, new)
    /// containers for the change notification.
    pub fn synchronize_to(&mut self, key: FrameKey) -> (ValueRef, ValueRef) {
        let old_key = self.sync;
        let old = self.entry_at(old_key).value.clone();
        self.sync = key;
        let new = self.entry_at(key).value.clone();
        self.cache
            .insert(FrameKey::Direct, CacheEntry::new(new.clone()));
        (old, new)
    }

    /// Insert or overwrite a keyframe; invalidates only the affected span.
    /// Returns the previous key at that frame.
    pub fn set_key_silent(&mut self, frame: i32, key: Key) -> Option<Key> {
        let curve = self.curve.get_or_insert_with(KeyframeCurve::default);
        let old = curve.set_key(frame, key);
        self.invalidate_key_span(frame, old.as_ref());
        old
    }

    /// Remove a keyframe. No-op (cache untouched) when no key exists there.
    pub fn remove_key_silent(&mut self, frame: i32) -> Option<Key> {
        let old = self.curve.as_mut()?.remove_key(frame)?;
        self.invalidate_key_span(frame, Some(&old));
        Some(old)
    }

    /// Wholesale curve replacement; drops the entire cache. Returns the old
    /// curve.
    pub fn set_track_silent(&mut self, curve: Option<KeyframeCurve>) -> Option<KeyframeCurve> {
        self.cache.invalidate_all();
        std::mem::replace(&mut self.curve, curve)
    }

    /// Span rule for a single-key change at `frame`: the affected closed
    /// interval starts at `frame`, or at prev_key+1 when the previous key
    /// interpolates; it ends at `frame`, or at next_key-1 when the edited
    /// key (old or new) interpolates. The Direct entry is dropped too when
    /// the slot is synchronized to a frame inside the interval.
    fn invalidate_key_span(&mut self, frame: i32, old: Option<&Key>) {
        let Some(curve) = self.curve.as_ref() else {
            return;
        };
        let mut lo = frame;
        let mut hi = frame;
        if let Some((pf, pk)) = curve.prev_key(frame) {
            if pk.interp != Interpolation::None {
                lo = pf + 1;
            }
        }
        let interpolates = curve
            .key_at(frame)
            .map(|k| k.interp != Interpolation::None)
            .unwrap_or(false)
            || old.map(|k| k.interp != Interpolation::None).unwrap_or(false);
        if interpolates {
            if let Some((nf, _)) = curve.next_key(frame) {
                hi = nf - 1;
            }
        }
        self.cache.invalidate_span(lo, hi);
        if let FrameKey::Frame(f) = self.sync {
            if f >= lo && f <= hi {
                self.cache.invalidate_direct();
            }
        }
    }
}
