//! Scalar attribute values.

use alloc::string::{String, ToString};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// A value held by a record attribute.
///
/// Numbers compare across `Int64` and `Float64`; values of different kinds
/// order as `Null < Boolean < number < String`.
#[derive(Clone, Debug)]
pub enum Value {
    /// Absent or unknown; missing attributes read as this
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    String(String),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        if let Value::Int64(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    /// Widens either numeric kind to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int64(n) => Some(n as f64),
            Value::Float64(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Returns true if this is an Int64 or Float64.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int64(_) | Value::Float64(_))
    }

    /// Returns true if this is a Float64 holding NaN.
    #[inline]
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Float64(v) if v.is_nan())
    }

    /// Truthiness: `Null`, `false`, `0`, `0.0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(v) => *v,
            Value::Int64(v) => *v != 0,
            Value::Float64(v) => *v != 0.0 && !v.is_nan(),
            Value::String(v) => !v.is_empty(),
        }
    }

    /// Writes a JSON-style encoding of this value.
    ///
    /// Strings are quoted and escaped so that the encodings of distinct
    /// value tuples joined by a separator never collide.
    pub fn encode_into(&self, out: &mut String) {
        match self {
            Value::Null => out.push_str("null"),
            Value::Boolean(v) => out.push_str(if *v { "true" } else { "false" }),
            Value::Int64(v) => out.push_str(&v.to_string()),
            Value::Float64(v) => {
                if v.is_nan() {
                    out.push_str("NaN");
                } else if *v == 0.0 {
                    // Covers -0.0, which equals 0
                    out.push('0');
                } else {
                    out.push_str(&v.to_string());
                }
            }
            Value::String(s) => {
                out.push('"');
                for c in s.chars() {
                    match c {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\t' => out.push_str("\\t"),
                        c => out.push(c),
                    }
                }
                out.push('"');
            }
        }
    }

    /// Rank of the value kind; both numeric kinds share a rank.
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Int64(_) | Value::Float64(_) => 2,
            Value::String(_) => 3,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::Int64(a), Value::Float64(b)) => compare_i64_f64(*a, *b),
            (Value::Float64(a), Value::Int64(b)) => compare_i64_f64(*b, *a).reverse(),
            (Value::Float64(a), Value::Float64(b)) => compare_f64(*a, *b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// NaN sorts after every other number and equals itself.
fn compare_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Lower bound of the floats outside `i64`, that is 2^63.
const I64_END: f64 = 9_223_372_036_854_775_808.0;

/// Exact comparison of an integer with a float, without widening the integer.
fn compare_i64_f64(i: i64, f: f64) -> Ordering {
    if f.is_nan() || f >= I64_END {
        return Ordering::Less;
    }
    if f < -I64_END {
        return Ordering::Greater;
    }
    // In range, so the truncation is exact
    let truncated = f as i64;
    match i.cmp(&truncated) {
        Ordering::Equal => compare_f64(truncated as f64, f),
        other => other,
    }
}

/// Returns the integer equal to `f`, if there is one.
fn integral(f: f64) -> Option<i64> {
    if f >= -I64_END && f < I64_END {
        let truncated = f as i64;
        if truncated as f64 == f {
            return Some(truncated);
        }
    }
    None
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            // Int64 and Float64 compare equal across types, so hash integral
            // floats the same way as the matching integer.
            Value::Int64(i) => i.hash(state),
            Value::Float64(f) => match integral(*f) {
                Some(i) => i.hash(state),
                None if f.is_nan() => u64::MAX.hash(state),
                None => f.to_bits().hash(state),
            },
            Value::String(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.encode_into(&mut out);
        f.write_str(&out)
    }
}

macro_rules! value_from {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $body
                }
            }
        )*
    };
}

value_from! {
    bool => |b| Value::Boolean(b),
    i32 => |n| Value::Int64(i64::from(n)),
    i64 => |n| Value::Int64(n),
    u32 => |n| Value::Int64(i64::from(n)),
    f64 => |x| Value::Float64(x),
    String => |s| Value::String(s),
    &str => |s| Value::String(s.to_string()),
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_accessors() {
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Int64(100).as_i64(), Some(100));
        assert_eq!(Value::Int64(2).as_f64(), Some(2.0));
        assert_eq!(Value::Float64(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::String("hello".into()).as_str(), Some("hello"));
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_value_equality_across_numeric_types() {
        assert_eq!(Value::Int64(42), Value::Float64(42.0));
        assert_ne!(Value::Int64(42), Value::String("42".into()));
        assert_eq!(Value::Float64(f64::NAN), Value::Float64(f64::NAN));
    }

    #[test]
    fn test_cross_kind_ordering() {
        assert!(Value::Int64(1) < Value::Int64(2));
        assert!(Value::Int64(1) < Value::Float64(1.5));
        assert!(Value::String("a".into()) < Value::String("b".into()));
        assert!(Value::Null < Value::Boolean(false));
        assert!(Value::Float64(f64::NAN) > Value::Float64(1e300));
    }

    #[test]
    fn test_mixed_numeric_comparison_is_exact() {
        let two_53 = 1i64 << 53;
        assert_eq!(Value::Int64(two_53), Value::Float64(two_53 as f64));
        assert_ne!(Value::Int64(two_53 + 1), Value::Float64(two_53 as f64));
        assert!(Value::Int64(two_53 + 1) > Value::Float64(two_53 as f64));
        assert!(Value::Int64(i64::MAX) < Value::Float64(9.3e18));
        assert!(Value::Int64(i64::MIN) > Value::Float64(-1e19));
        assert!(Value::Int64(i64::MIN) == Value::Float64(-9_223_372_036_854_775_808.0));
        assert!(Value::Int64(2) < Value::Float64(2.5));
        assert!(Value::Int64(-2) > Value::Float64(-2.5));
        assert!(Value::Int64(i64::MAX) < Value::Float64(f64::NAN));
        assert_eq!(Value::Int64(0), Value::Float64(-0.0));
    }

    /// Collects the bytes fed to the hasher.
    #[derive(Default)]
    struct Bytes(alloc::vec::Vec<u8>);

    impl Hasher for Bytes {
        fn finish(&self) -> u64 {
            0
        }

        fn write(&mut self, bytes: &[u8]) {
            self.0.extend_from_slice(bytes);
        }
    }

    fn hashed(value: &Value) -> alloc::vec::Vec<u8> {
        let mut hasher = Bytes::default();
        value.hash(&mut hasher);
        hasher.0
    }

    #[test]
    fn test_equal_numbers_hash_alike() {
        assert_eq!(hashed(&Value::Int64(3)), hashed(&Value::Float64(3.0)));
        assert_eq!(hashed(&Value::Int64(0)), hashed(&Value::Float64(-0.0)));
        assert_eq!(
            hashed(&Value::Int64(1 << 53)),
            hashed(&Value::Float64((1i64 << 53) as f64))
        );
        assert_eq!(
            hashed(&Value::Float64(f64::NAN)),
            hashed(&Value::Float64(-f64::NAN))
        );
        assert_ne!(hashed(&Value::Float64(0.5)), hashed(&Value::Int64(0)));
    }

    #[test]
    fn test_negative_zero_encodes_as_zero() {
        assert_eq!(Value::Float64(-0.0).to_string(), "0");
        assert_eq!(Value::Float64(0.0).to_string(), Value::Int64(0).to_string());
        assert_eq!(Value::Float64(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Int64(0).is_truthy());
        assert!(!Value::Float64(f64::NAN).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::Int64(-1).is_truthy());
        assert!(Value::String("0".into()).is_truthy());
    }

    #[test]
    fn test_encoding_quotes_strings() {
        let mut out = String::new();
        Value::String("a\"b".into()).encode_into(&mut out);
        assert_eq!(out, "\"a\\\"b\"");
        assert_eq!(Value::Int64(7).to_string(), "7");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(7u32), Value::Int64(7));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(Some(2.5)), Value::Float64(2.5));
        assert!(Value::from(None::<i64>).is_null());
    }
}
