//! Keyframe curves: timed keys with interpolation metadata and boundary
//! (extrapolation) policies.
//!
//! Model:
//! - Keys are keyed by unique integer frame; min/max frame are derived from
//!   the key set and lazily cached, invalidated on any key insert/remove.
//! - A frame that exactly matches a key returns that key's value, never an
//!   interpolated one.
//! - Between keys, the leading key's interpolation mode governs the span.
//! - Outside [min, max] the `before`/`after` policy governs: hold, repeat,
//!   reflect (ping-pong), or repeat with a cumulative per-cycle offset.
//! - Only inline numeric containers interpolate; reference/resource and
//!   step-only kinds support `Const`/`None` and exact hits.

use std::cell::Cell;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use scena_api_core::{Value, ValueRef};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interpolation {
    None,
    Const,
    Linear,
    SmoothStep,
    Smooth,
    Bezier,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryPolicy {
    None,
    Const,
    Repeat,
    Reflect,
    RepeatOffset,
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        BoundaryPolicy::Const
    }
}

/// One keyframe: value container, interpolation mode toward the next key,
/// and tangent scalars `[in_x, in_y, out_x, out_y]` for Hermite modes.
#[derive(Clone, Debug, PartialEq)]
pub struct Key {
    pub value: ValueRef,
    pub interp: Interpolation,
    pub tangents: [f32; 4],
}

impl Key {
    pub fn new(value: ValueRef, interp: Interpolation) -> Self {
        Self {
            value,
            interp,
            tangents: [0.0; 4],
        }
    }

    pub fn with_tangents(mut self, tangents: [f32; 4]) -> Self {
        self.tangents = tangents;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct KeyframeCurve {
    keys: HashMap<i32, Key>,
    pub before: BoundaryPolicy,
    pub after: BoundaryPolicy,
    /// Lazily cached (min, max) frame over the key set.
    span: Cell<Option<(i32, i32)>>,
}

impl PartialEq for KeyframeCurve {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys && self.before == other.before && self.after == other.after
    }
}

impl KeyframeCurve {
    pub fn new(before: BoundaryPolicy, after: BoundaryPolicy) -> Self {
        Self {
            keys: HashMap::new(),
            before,
            after,
            span: Cell::new(None),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key_at(&self, frame: i32) -> Option<&Key> {
        self.keys.get(&frame)
    }

    /// Insert or overwrite; returns the previous key at that frame.
    pub fn set_key(&mut self, frame: i32, key: Key) -> Option<Key> {
        self.span.set(None);
        self.keys.insert(frame, key)
    }

    pub fn remove_key(&mut self, frame: i32) -> Option<Key> {
        let old = self.keys.remove(&frame);
        if old.is_some() {
            self.span.set(None);
        }
        old
    }

    /// Key frames in ascending order.
    pub fn frames(&self) -> Vec<i32> {
        let mut frames: Vec<i32> = self.keys.keys().copied().collect();
        frames.sort_unstable();
        frames
    }

    pub fn min_frame(&self) -> Option<i32> {
        self.domain().map(|(min, _)| min)
    }

    pub fn max_frame(&self) -> Option<i32> {
        self.domain().map(|(_, max)| max)
    }

    fn domain(&self) -> Option<(i32, i32)> {
        if self.keys.is_empty() {
            return None;
        }
        if let Some(span) = self.span.get() {
            return Some(span);
        }
        let mut min = i32::MAX;
        let mut max = i32::MIN;
        for &f in self.keys.keys() {
            min = min.min(f);
            max = max.max(f);
        }
        self.span.set(Some((min, max)));
        Some((min, max))
    }

    /// Greatest key strictly before `frame`.
    pub fn prev_key(&self, frame: i32) -> Option<(i32, &Key)> {
        self.keys
            .iter()
            .filter(|(f, _)| **f < frame)
            .max_by_key(|(f, _)| **f)
            .map(|(f, k)| (*f, k))
    }

    /// Smallest key strictly after `frame`.
    pub fn next_key(&self, frame: i32) -> Option<(i32, &Key)> {
        self.keys
            .iter()
            .filter(|(f, _)| **f > frame)
            .min_by_key(|(f, _)| **f)
            .map(|(f, k)| (*f, k))
    }

    /// Evaluate the curve at `frame`. `None` means undefined (no keys, a
    /// `None` policy/interpolation span, or a non-interpolable container).
    pub fn evaluate(&self, frame: i32) -> Option<ValueRef> {
        let (min, max) = self.domain()?;
        if frame >= min && frame <= max {
            return self.eval_in_domain(frame);
        }
        let policy = if frame < min { self.before } else { self.after };
        match policy {
            BoundaryPolicy::None => None,
            BoundaryPolicy::Const => {
                let edge = if frame < min { min } else { max };
                self.keys.get(&edge).map(|k| k.value.clone())
            }
            BoundaryPolicy::Repeat | BoundaryPolicy::Reflect | BoundaryPolicy::RepeatOffset => {
                let width = max - min;
                if width == 0 {
                    return self.keys.get(&min).map(|k| k.value.clone());
                }
                let cycles = (frame - min).div_euclid(width);
                let rem = (frame - min).rem_euclid(width);
                let base = if policy == BoundaryPolicy::Reflect && cycles.rem_euclid(2) == 1 {
                    max - rem
                } else {
                    min + rem
                };
                let result = self.eval_in_domain(base)?;
                if policy == BoundaryPolicy::RepeatOffset {
                    Some(self.apply_cycle_offset(result, cycles))
                } else {
                    Some(result)
                }
            }
        }
    }

    fn eval_in_domain(&self, frame: i32) -> Option<ValueRef> {
        if let Some(key) = self.keys.get(&frame) {
            return Some(key.value.clone());
        }
        let (f0, k0) = self.prev_key(frame)?;
        let (f1, k1) = self.next_key(frame)?;
        match k0.interp {
            Interpolation::None => None,
            Interpolation::Const => Some(k0.value.clone()),
            mode => {
                let alpha = (frame - f0) as f32 / (f1 - f0) as f32;
                match interpolate(k0, k1, (f1 - f0) as f32, alpha, mode) {
                    Some(v) => Some(ValueRef::Inline(v)),
                    // Non-numeric or mismatched containers hold the left key.
                    None => Some(k0.value.clone()),
                }
            }
        }
    }

    /// Cumulative repetition: add `cycles` times the (last - first) key delta.
    fn apply_cycle_offset(&self, result: ValueRef, cycles: i32) -> ValueRef {
        let (min, max) = match self.domain() {
            Some(span) => span,
            None => return result,
        };
        let first = self.keys.get(&min).and_then(|k| k.value.as_inline());
        let last = self.keys.get(&max).and_then(|k| k.value.as_inline());
        let base = result.as_inline();
        let (first, last, base) = match (first, last, base) {
            (Some(a), Some(b), Some(c)) => (a, b, c),
            _ => return result,
        };
        let (fc, lc, bc) = match (first.components(), last.components(), base.components()) {
            (Some(a), Some(b), Some(c)) if a.len() == b.len() && b.len() == c.len() => (a, b, c),
            _ => return result,
        };
        let n = cycles as f32;
        let shifted: Vec<f32> = bc
            .iter()
            .zip(fc.iter().zip(lc.iter()))
            .map(|(v, (f, l))| v + n * (l - f))
            .collect();
        match Value::from_components(base.kind(), &shifted) {
            Some(v) => ValueRef::Inline(v),
            None => result,
        }
    }
}

/// Interpolate between two keys over a span of `span_len` frames at `alpha`
/// in [0, 1). Returns None when the containers are not inline numerics of
/// the same kind.
fn interpolate(k0: &Key, k1: &Key, span_len: f32, alpha: f32, mode: Interpolation) -> Option<Value> {
    let v0 = k0.value.as_inline()?;
    let v1 = k1.value.as_inline()?;
    if v0.kind() != v1.kind() {
        return None;
    }
    let c0 = v0.components()?;
    let c1 = v1.components()?;

    let out: Vec<f32> = match mode {
        Interpolation::Linear => lerp_all(c0, c1, alpha),
        Interpolation::SmoothStep => {
            let a = (-2.0 * alpha + 3.0) * alpha * alpha;
            lerp_all(c0, c1, a)
        }
        Interpolation::Smooth | Interpolation::Bezier => {
            // Outgoing tangent of k0, incoming tangent of k1, scaled by the
            // span length to express slopes in value-per-span units.
            let d0 = span_len * slope(k0.tangents[3], k0.tangents[2]);
            let d1 = span_len * slope(k1.tangents[1], k1.tangents[0]);
            c0.iter()
                .zip(c1.iter())
                .map(|(y0, y1)| hermite(*y0, *y1, d0, d1, alpha))
                .collect()
        }
        // None/Const never reach here.
        _ => return None,
    };
    Value::from_components(v0.kind(), &out)
}

#[inline]
fn lerp_all(c0: &[f32], c1: &[f32], alpha: f32) -> Vec<f32> {
    c0.iter()
        .zip(c1.iter())
        .map(|(a, b)| (1.0 - alpha) * a + alpha * b)
        .collect()
}

#[inline]
fn slope(tan_y: f32, tan_x: f32) -> f32 {
    if tan_x == 0.0 {
        0.0
    } else {
        tan_y / tan_x
    }
}

#[inline]
fn hermite(y0: f32, y1: f32, d0: f32, d1: f32, t: f32) -> f32 {
    let a = 2.0 * y0 - 2.0 * y1 + d0 + d1;
    let b = -3.0 * y0 + 3.0 * y1 - 2.0 * d0 - d1;
    ((a * t + b) * t + d0) * t + y0
}
