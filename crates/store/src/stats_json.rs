//! The stats-table attribute document: a single sigil-suffixed JSON object,
//! with reserved tags lifted out into dedicated row columns and the
//! remaining tags bucketed into four hash groups.

use std::collections::HashMap;

use collector_model::FieldValue;
use serde_json::{Map, Value};

use crate::hash::tag_group;

/// Reserved tag carrying the stat-table row's `name` column.
pub const STATS_NAME_FIELD: &str = "name";
/// Reserved tag carrying the stat-table row's `source` column.
pub const STATS_SOURCE_FIELD: &str = "source";
/// Suffix marking a tag as the row's `key` column.
pub const STATS_KEY_SUFFIX: &str = "_KEY";
/// Suffix marking a tag as the row's `proxy` column.
pub const STATS_PROXY_SUFFIX: &str = "_PROXY";

/// Number of hash-grouped clustering columns tags are bucketed into.
pub const NUM_TAG_GROUPS: u32 = 4;

/// The reserved columns lifted out of the attribute document, plus the four
/// hash-grouped tag columns (each tags joined by `;`, empty when the group
/// has no members).
#[derive(Debug, Clone, Default)]
pub struct StatRowColumns {
    /// The resolved `name` column, if the attributes carried one.
    pub name: Option<String>,
    /// The resolved `source` column, if the attributes carried one.
    pub source: Option<String>,
    /// The resolved `key` column, if any attribute ended in `_KEY`.
    pub key: Option<String>,
    /// The resolved `proxy` column, if any attribute ended in `_PROXY`.
    pub proxy: Option<String>,
    /// The four hash-grouped tag clustering columns, `tag=value` joined by
    /// `;` within each group.
    pub tag_groups: [String; NUM_TAG_GROUPS as usize],
    /// The sigil-suffixed attribute document (everything not reserved).
    pub attributes: Value,
}

/// Splits `attrs` into reserved row columns and the remaining sigil-encoded,
/// hash-grouped attribute document.
pub fn encode_stat_row(attrs: &HashMap<String, FieldValue>) -> StatRowColumns {
    let mut columns = StatRowColumns::default();
    let mut groups: [Vec<String>; NUM_TAG_GROUPS as usize] = Default::default();
    let mut doc = Map::new();

    for (key, value) in attrs {
        if key == STATS_NAME_FIELD {
            columns.name = value.as_str().map(str::to_string);
            continue;
        }
        if key == STATS_SOURCE_FIELD {
            columns.source = value.as_str().map(str::to_string);
            continue;
        }
        if key.ends_with(STATS_KEY_SUFFIX) {
            columns.key = Some(value.as_str_lossy());
            continue;
        }
        if key.ends_with(STATS_PROXY_SUFFIX) {
            columns.proxy = Some(value.as_str_lossy());
            continue;
        }

        let group = tag_group(key, NUM_TAG_GROUPS) as usize;
        groups[group].push(format!("{key}={}", value.as_str_lossy()));

        let sigil_key = format!("{key}|{}", value.type_sigil());
        let json_value = match value {
            FieldValue::Str(s) => Value::String(s.clone()),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
        };
        let _ = doc.insert(sigil_key, json_value);
    }

    for (i, group) in groups.into_iter().enumerate() {
        columns.tag_groups[i] = group.join(";");
    }
    columns.attributes = Value::Object(doc);
    columns
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reserved_fields_are_lifted_out_of_the_document() {
        let mut attrs = HashMap::new();
        attrs.insert(STATS_NAME_FIELD.to_string(), FieldValue::Str("APPTRACK_SESSION_CLOSE".into()));
        attrs.insert(STATS_SOURCE_FIELD.to_string(), FieldValue::Str("router1".into()));
        attrs.insert("SESSION_KEY".to_string(), FieldValue::Str("abc123".into()));
        let columns = encode_stat_row(&attrs);
        assert_eq!(columns.name.as_deref(), Some("APPTRACK_SESSION_CLOSE"));
        assert_eq!(columns.source.as_deref(), Some("router1"));
        assert_eq!(columns.key.as_deref(), Some("abc123"));
        assert!(columns.attributes.as_object().unwrap().is_empty());
    }

    #[test]
    fn non_reserved_tags_get_sigil_suffixed_and_hash_grouped() {
        let mut attrs = HashMap::new();
        attrs.insert("sla-profile".to_string(), FieldValue::Str("GOLD".into()));
        attrs.insert("total_bytes".to_string(), FieldValue::Int(42));
        let columns = encode_stat_row(&attrs);
        let doc = columns.attributes.as_object().unwrap();
        assert_eq!(doc.get("sla-profile|s"), Some(&Value::String("GOLD".into())));
        assert_eq!(doc.get("total_bytes|n"), Some(&Value::from(42)));
        let total_tags: usize = columns.tag_groups.iter().map(|g| if g.is_empty() { 0 } else { g.split(';').count() }).sum();
        assert_eq!(total_tags, 2);
    }
}
