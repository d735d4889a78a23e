//! The normalized form of one parsed structured-syslog frame.

use std::collections::HashMap;

use crate::value::FieldValue;

/// A parsed structured-syslog frame.
///
/// `fields` is populated by the parser from the `key="value"` block, then
/// grown in place by the decorator (enrichment) and consulted by the UVE
/// aggregator and table writer. `forward_buf` carries a byte-accurate,
/// possibly decorated copy of the frame for the forwarder, already prefixed
/// with its octet count (`"<L> "`).
#[derive(Debug, Clone, PartialEq)]
pub struct SyslogRecord {
    /// Microseconds since epoch, taken from the syslog header.
    pub timestamp_usec: i64,
    /// The reporting host, taken from the syslog header.
    pub hostname: String,
    /// The message type (e.g. `APPTRACK_SESSION_CLOSE`), the last token
    /// before the first `[` in the body.
    pub tag: String,
    /// Structured key/value fields extracted from, and later added to, the
    /// frame.
    pub fields: HashMap<String, FieldValue>,
    /// Byte-accurate forward copy of the frame, length-prefixed for
    /// mirroring by the forwarder.
    pub forward_buf: Vec<u8>,
}

impl SyslogRecord {
    /// Creates an empty record for the given header fields.
    pub fn new(timestamp_usec: i64, hostname: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            timestamp_usec,
            hostname: hostname.into(),
            tag: tag.into(),
            fields: HashMap::new(),
            forward_buf: Vec::new(),
        }
    }

    /// Inserts a field only if absent, or if the incoming value is
    /// non-empty while the existing one is an empty string — decoration is
    /// idempotent per spec: existing keys are replaced only when the
    /// incoming value is non-empty.
    pub fn set_field_if_non_empty(&mut self, key: &str, value: FieldValue) {
        let is_empty = matches!(&value, FieldValue::Str(s) if s.is_empty());
        if is_empty {
            return;
        }
        let _ = self.fields.insert(key.to_string(), value);
    }

    /// Returns the string value of a field, or `""` if absent or not a
    /// string.
    pub fn str_field(&self, key: &str) -> &str {
        match self.fields.get(key) {
            Some(FieldValue::Str(s)) => s.as_str(),
            _ => "",
        }
    }

    /// Returns the integer value of a field, or `default` if absent or not
    /// an integer.
    pub fn int_field(&self, key: &str, default: i64) -> i64 {
        match self.fields.get(key) {
            Some(FieldValue::Int(v)) => *v,
            _ => default,
        }
    }

    /// `T2`: the high bucket of the timestamp, `timestamp_usec >> 23`.
    pub fn t2(&self) -> i64 {
        self.timestamp_usec >> 23
    }

    /// `T1`: the intra-bucket offset, `timestamp_usec & ((1<<23) - 1)`.
    pub fn t1(&self) -> i64 {
        self.timestamp_usec & ((1 << 23) - 1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn t2_t1_roundtrip() {
        let record = SyslogRecord::new(12_345_678_901, "h", "TAG");
        assert_eq!((record.t2() << 23) | record.t1(), record.timestamp_usec);
    }

    #[test]
    fn idempotent_insert_skips_empty_replacement() {
        let mut record = SyslogRecord::new(0, "h", "TAG");
        record.fields.insert("k".into(), FieldValue::Str("v".into()));
        record.set_field_if_non_empty("k", FieldValue::Str(String::new()));
        assert_eq!(record.str_field("k"), "v");
    }
}
