//! Numeric coercion for loosely typed D-Bus payloads.
//!
//! Some MPRIS players report numeric values with the wrong wire type
//! (`u64` instead of `x`, `i32` instead of `i64`, a position wrapped in a
//! variant, ...). These helpers map all of them onto `i64`/`f64`. Anything
//! that is not a number becomes zero.

use zbus::zvariant::Value;

/// Shape of a dynamic value as far as numbers are concerned.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Numeric<'v, 'a> {
  Signed(i64),
  Unsigned(u64),
  Float(f64),
  Variant(&'v Value<'a>),
  Other,
}

impl<'v, 'a> Numeric<'v, 'a> {
  fn classify(value: &'v Value<'a>) -> Self {
    match value {
      Value::I16(v) => Numeric::Signed(i64::from(*v)),
      Value::I32(v) => Numeric::Signed(i64::from(*v)),
      Value::I64(v) => Numeric::Signed(*v),
      Value::U8(v) => Numeric::Unsigned(u64::from(*v)),
      Value::U16(v) => Numeric::Unsigned(u64::from(*v)),
      Value::U32(v) => Numeric::Unsigned(u64::from(*v)),
      Value::U64(v) => Numeric::Unsigned(*v),
      Value::F64(v) => Numeric::Float(*v),
      Value::Value(inner) => Numeric::Variant(&**inner),
      _ => Numeric::Other,
    }
  }

  fn to_i64(self) -> i64 {
    match self {
      Numeric::Signed(v) => v,
      // Values above i64::MAX wrap.
      Numeric::Unsigned(v) => v as i64,
      Numeric::Float(v) => v as i64,
      Numeric::Variant(_) | Numeric::Other => 0,
    }
  }

  fn to_f64(self) -> f64 {
    match self {
      Numeric::Signed(v) => v as f64,
      Numeric::Unsigned(v) => v as f64,
      Numeric::Float(v) => v,
      Numeric::Variant(_) | Numeric::Other => 0.0,
    }
  }

  /// Unwrap a single variant layer. A variant inside a variant stays opaque.
  fn unwrap_once(self) -> Self {
    match self {
      Numeric::Variant(inner) => match Numeric::classify(inner) {
        Numeric::Variant(_) => Numeric::Other,
        other => other,
      },
      other => other,
    }
  }
}

/// Coerce a dynamic value to `i64`.
///
/// Floats truncate toward zero. Non-numeric values give `0`.
pub fn as_i64(value: &Value<'_>) -> i64 {
  Numeric::classify(value).unwrap_once().to_i64()
}

/// Coerce a dynamic value to `f64`. Non-numeric values give `0.0`.
pub fn as_f64(value: &Value<'_>) -> f64 {
  Numeric::classify(value).unwrap_once().to_f64()
}
