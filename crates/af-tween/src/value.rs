//! Animatable property values

use af_core::Rgb;

/// Value stored under a visual property key
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Opacity, position, rotation...
    Scalar(f32),
    /// Tint or panel color
    Color(Rgb),
}

impl Value {
    /// Blend toward `to` at eased progress `t`
    ///
    /// Mismatched kinds hold `self` until the end, then jump to `to`.
    pub fn lerp(&self, to: &Value, t: f32) -> Value {
        match (self, to) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(a + (b - a) * t),
            (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(b, t)),
            _ if t >= 1.0 => *to,
            _ => *self,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgb> {
        match self {
            Value::Color(c) => Some(*c),
            Value::Scalar(_) => None,
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Scalar(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(v as f32)
    }
}

impl From<Rgb> for Value {
    fn from(c: Rgb) -> Self {
        Value::Color(c)
    }
}
