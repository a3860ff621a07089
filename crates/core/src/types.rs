//! Runtime value descriptors
//!
//! Two small capabilities the pipeline combinators are parameterized over:
//! - `Tagged`: an explicit type descriptor checked by `instances_of`, passed
//!   at call time instead of relying on a runtime type hierarchy
//! - `Truthy`: the truthiness test behind `not_default`, a deliberate quirk
//!   (0, 0.0, NaN, "", `None`, `null` and `false` are all dropped), kept as
//!   documented rather than redesigned into a null-check

use serde_json::Value;

/// Runtime shape of a dynamically-typed value
///
/// Used as the type tag for `instances_of` filtering over `serde_json::Value`
/// sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// JSON null
    Null,
    /// Boolean
    Bool,
    /// Integer or float
    Number,
    /// String
    String,
    /// Array of values
    Array,
    /// String-keyed object
    Object,
}

/// Capability to report a runtime type tag
pub trait Tagged {
    /// The tag type this value discriminates on
    type Tag: PartialEq + Copy;

    /// Runtime tag of this value
    fn tag(&self) -> Self::Tag;
}

impl Tagged for Value {
    type Tag = ValueKind;

    fn tag(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

/// Capability to be tested for truthiness
///
/// Mirrors the host-language truthiness table: zero, NaN, empty strings,
/// absent values and `false` are falsy; everything else (including empty
/// arrays and objects) is truthy.
pub trait Truthy {
    /// `true` when this value is truthy
    fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

macro_rules! truthy_int {
    ($($t:ty),*) => {
        $(impl Truthy for $t {
            fn is_truthy(&self) -> bool {
                *self != 0
            }
        })*
    };
}

truthy_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Truthy for f32 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        match self {
            Some(v) => v.is_truthy(),
            None => false,
        }
    }
}

impl<T: Truthy + ?Sized> Truthy for &T {
    fn is_truthy(&self) -> bool {
        (**self).is_truthy()
    }
}

impl Truthy for Value {
    fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map(|f| f.is_truthy()).unwrap_or(false),
            Value::String(s) => !s.is_empty(),
            // Arrays and objects are truthy even when empty
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_kind_tags() {
        assert_eq!(json!(null).tag(), ValueKind::Null);
        assert_eq!(json!(true).tag(), ValueKind::Bool);
        assert_eq!(json!(1.5).tag(), ValueKind::Number);
        assert_eq!(json!("x").tag(), ValueKind::String);
        assert_eq!(json!([1]).tag(), ValueKind::Array);
        assert_eq!(json!({"a": 1}).tag(), ValueKind::Object);
    }

    #[test]
    fn test_truthy_numbers() {
        assert!(!0i64.is_truthy());
        assert!(42i64.is_truthy());
        assert!(!0.0f64.is_truthy());
        assert!(!f64::NAN.is_truthy());
        assert!((-1.5f64).is_truthy());
    }

    #[test]
    fn test_truthy_strings_and_options() {
        assert!(!"".is_truthy());
        assert!("a".is_truthy());
        assert!(!String::new().is_truthy());
        assert!(!None::<i64>.is_truthy());
        assert!(!Some(0i64).is_truthy());
        assert!(Some(1i64).is_truthy());
    }

    #[test]
    fn test_truthy_json_values() {
        assert!(!json!(null).is_truthy());
        assert!(!json!(false).is_truthy());
        assert!(!json!(0).is_truthy());
        assert!(!json!("").is_truthy());
        // Containers are truthy even when empty
        assert!(json!([]).is_truthy());
        assert!(json!({}).is_truthy());
        assert!(json!("x").is_truthy());
    }
}
