//! Value: typed animatable values. All numeric types use f32.

use serde::{Deserialize, Serialize};

/// Lightweight kind enum for pattern-matching and quick dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Float,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    ColorRgba,
    Text,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// Scalar float
    Float(f32),

    /// Boolean (step-only, no blending)
    Bool(bool),

    /// 2D vector
    Vec2([f32; 2]),

    /// 3D vector
    Vec3([f32; 3]),

    /// 4D vector
    Vec4([f32; 4]),

    /// RGBA color (linear by convention)
    ColorRgba([f32; 4]),

    /// Step-only string/text value (no blending)
    Text(String),
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::ColorRgba(_) => ValueKind::ColorRgba,
            Value::Text(_) => ValueKind::Text,
        }
    }

    /// Numeric components for interpolation, or None for step-only kinds.
    pub fn components(&self) -> Option<&[f32]> {
        match self {
            Value::Float(f) => Some(std::slice::from_ref(f)),
            Value::Vec2(a) => Some(a),
            Value::Vec3(a) => Some(a),
            Value::Vec4(a) => Some(a),
            Value::ColorRgba(a) => Some(a),
            Value::Bool(_) | Value::Text(_) => None,
        }
    }

    /// Rebuild a value of `kind` from interpolated components. Component
    /// count must match the kind; step-only kinds always return None.
    pub fn from_components(kind: ValueKind, comps: &[f32]) -> Option<Value> {
        match (kind, comps) {
            (ValueKind::Float, [x]) => Some(Value::Float(*x)),
            (ValueKind::Vec2, [x, y]) => Some(Value::Vec2([*x, *y])),
            (ValueKind::Vec3, [x, y, z]) => Some(Value::Vec3([*x, *y, *z])),
            (ValueKind::Vec4, [x, y, z, w]) => Some(Value::Vec4([*x, *y, *z, *w])),
            (ValueKind::ColorRgba, [r, g, b, a]) => Some(Value::ColorRgba([*r, *g, *b, *a])),
            _ => None,
        }
    }
}
