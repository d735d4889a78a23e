//! Structured `[key="value" ...]` block extraction.

use std::collections::HashSet;

use collector_model::FieldValue;

use crate::error::ParseError;

/// Parses the block between (and excluding) the outer `[` and `]`,
/// coercing any key listed in `int_fields` to [`FieldValue::Int`].
pub fn parse_structured_block(
    block: &str,
    int_fields: &HashSet<String>,
) -> Result<Vec<(String, FieldValue)>, ParseError> {
    let mut fields = Vec::new();
    let bytes = block.as_bytes();
    let mut pos = 0usize;

    while pos < bytes.len() {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        let eq = block[pos..].find('=').map(|i| pos + i).ok_or_else(|| ParseError::MalformedKeyValue {
            context: snippet(block, pos),
        })?;
        let key = block[pos..eq].trim().to_string();

        if bytes.get(eq + 1) != Some(&b'"') {
            return Err(ParseError::MalformedKeyValue {
                context: snippet(block, pos),
            });
        }
        let value_start = eq + 2;
        let value_end = block[value_start..].find('"').map(|i| value_start + i).ok_or_else(|| {
            ParseError::UnterminatedValue { key: key.clone() }
        })?;

        let raw_value = &block[value_start..value_end];
        let value = if int_fields.contains(&key) {
            let unescaped = unescape(raw_value);
            let parsed = unescaped.parse::<i64>().map_err(|_| ParseError::InvalidIntField {
                key: key.clone(),
                value: unescaped.clone(),
            })?;
            FieldValue::Int(parsed)
        } else {
            FieldValue::Str(unescape(raw_value))
        };

        fields.push((key, value));
        pos = value_end + 1;
    }

    Ok(fields)
}

fn snippet(block: &str, pos: usize) -> String {
    let end = (pos + 16).min(block.len());
    block[pos..end].to_string()
}

/// Unescapes the five control-character entities the wire format uses
/// inside quoted values. `&amp;` is matched like every other entity in a
/// single left-to-right pass, so an already-unescaped `&` never gets
/// reinterpreted as the start of another entity.
fn unescape(value: &str) -> String {
    const ENTITIES: &[(&str, char)] = &[
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&apos;", '\''),
    ];

    let mut out = String::with_capacity(value.len());
    let mut i = 0;
    while i < value.len() {
        let rest = &value[i..];
        if rest.starts_with('&') {
            if let Some((entity, ch)) = ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
                out.push(*ch);
                i += entity.len();
                continue;
            }
        }
        let ch = rest.chars().next().expect("non-empty rest");
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_plain_string_pairs() {
        let fields = parse_structured_block("k1=\"v1\" k2=\"v2\"", &HashSet::new()).unwrap();
        assert_eq!(fields, vec![
            ("k1".to_string(), FieldValue::Str("v1".to_string())),
            ("k2".to_string(), FieldValue::Str("v2".to_string())),
        ]);
    }

    #[test]
    fn coerces_int_fields() {
        let int_fields: HashSet<String> = ["total-bytes".to_string()].into_iter().collect();
        let fields = parse_structured_block("total-bytes=\"1000\"", &int_fields).unwrap();
        assert_eq!(fields, vec![("total-bytes".to_string(), FieldValue::Int(1000))]);
    }

    #[test]
    fn unescapes_entities() {
        let fields = parse_structured_block("k=\"a &amp; b &lt;c&gt; &quot;d&quot;\"", &HashSet::new()).unwrap();
        assert_eq!(fields[0].1, FieldValue::Str("a & b <c> \"d\"".to_string()));
    }

    #[test]
    fn unterminated_value_is_an_error() {
        let err = parse_structured_block("k=\"unterminated", &HashSet::new()).unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedValue { .. }));
    }

    #[test]
    fn invalid_int_field_is_an_error() {
        let int_fields: HashSet<String> = ["n".to_string()].into_iter().collect();
        let err = parse_structured_block("n=\"not-a-number\"", &int_fields).unwrap_err();
        assert!(matches!(err, ParseError::InvalidIntField { .. }));
    }
}
