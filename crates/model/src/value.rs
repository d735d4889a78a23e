//! The tagged value stored against every field name in a record.

use std::fmt;

/// A field value as extracted from a structured syslog frame, or derived by
/// enrichment/aggregation.
///
/// Two variants cover everything the wire format produces (`key="value"` is
/// always a string, `int_fields` coerces to a signed integer); a third
/// variant is added for the stats path, which needs doubles (link scores,
/// KPI ratios) that the ingestion side never produces directly.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FieldValue {
    /// A string value.
    Str(String),
    /// A signed 64-bit integer value.
    Int(i64),
    /// A 64-bit floating point value, used by derived/aggregated fields.
    Float(f64),
}

impl FieldValue {
    /// Returns the value as a string, converting numeric variants.
    pub fn as_str_lossy(&self) -> String {
        match self {
            FieldValue::Str(s) => s.clone(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
        }
    }

    /// Returns the value as `i64` if this is an `Int` variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as `&str` if this is a `Str` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as `f64` for any numeric variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Single-character type sigil used by the stats-table JSON encoding
    /// (`|s`, `|n`, `|d`); lists and maps are assembled by callers and use
    /// `|a`/`|m`, which is why this only covers the three scalar variants.
    pub fn type_sigil(&self) -> &'static str {
        match self {
            FieldValue::Str(_) => "s",
            FieldValue::Int(_) => "n",
            FieldValue::Float(_) => "d",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lossy_conversion_covers_every_variant() {
        assert_eq!(FieldValue::Str("a".into()).as_str_lossy(), "a");
        assert_eq!(FieldValue::Int(42).as_str_lossy(), "42");
        assert_eq!(FieldValue::Float(1.5).as_str_lossy(), "1.5");
    }

    #[test]
    fn type_sigil_matches_variant() {
        assert_eq!(FieldValue::Str("a".into()).type_sigil(), "s");
        assert_eq!(FieldValue::Int(1).type_sigil(), "n");
        assert_eq!(FieldValue::Float(1.0).type_sigil(), "d");
    }
}
