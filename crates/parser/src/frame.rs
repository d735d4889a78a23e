//! Assembles a complete [`SyslogRecord`] out of one raw frame.

use collector_model::SyslogRecord;
use collector_settings::MessageTypeTable;

use crate::{error::ParseError, header, kv};

/// Parses one raw frame (as extracted by [`crate::framing::FrameExtractor`])
/// into a [`SyslogRecord`], consulting `message_types` for the `int_fields`
/// coercion set of the frame's tag.
///
/// `forward_buf` is populated with the raw, undecorated frame prefixed with
/// its length (`"<L> "`); the decorator stitches enrichment key/value pairs
/// into it in place before the forwarder mirrors it downstream.
pub fn parse_frame(raw: &[u8], message_types: &MessageTypeTable) -> Result<SyslogRecord, ParseError> {
    let text = std::str::from_utf8(raw).map_err(|_| ParseError::MissingPriority)?;
    let parsed = header::parse_header(text)?;
    let (tag, bracket) = header::extract_tag(parsed.body)?;

    let block_end = parsed.body.rfind(']').ok_or(ParseError::MissingStructuredBlock)?;
    let block = &parsed.body[bracket + 1..block_end];

    let config = message_types.get(tag);
    let fields = kv::parse_structured_block(block, &config.int_fields)?;

    let mut record = SyslogRecord::new(parsed.timestamp_usec, parsed.hostname, tag);
    for (key, value) in fields {
        let _ = record.fields.insert(key, value);
    }

    record.forward_buf = build_forward_buf(raw);
    Ok(record)
}

fn build_forward_buf(raw: &[u8]) -> Vec<u8> {
    let mut buf = format!("<{}> ", raw.len()).into_bytes();
    buf.extend_from_slice(raw);
    buf
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_full_frame_into_record() {
        let table = MessageTypeTable::new();
        let frame = b"<14>1 2023-01-01T00:00:00Z h RT_FLOW: TAG [k1=\"v1\" k2=\"v2\"]";
        let record = parse_frame(frame, &table).unwrap();
        assert_eq!(record.hostname, "h");
        assert_eq!(record.tag, "TAG");
        assert_eq!(record.str_field("k1"), "v1");
        assert_eq!(record.str_field("k2"), "v2");
        assert!(record.forward_buf.starts_with(format!("<{}> ", frame.len()).as_bytes()));
    }

    #[test]
    fn coerces_configured_int_fields() {
        let table = MessageTypeTable::new();
        table.set(
            "APPTRACK_SESSION_CLOSE".to_string(),
            collector_model::MessageTypeConfig {
                int_fields: ["total-bytes".to_string()].into_iter().collect(),
                ..collector_model::MessageTypeConfig::disabled("APPTRACK_SESSION_CLOSE")
            },
        );
        let frame = b"<14>1 2023-01-01T00:00:00Z h APPTRACK_SESSION_CLOSE [total-bytes=\"1500\"]";
        let record = parse_frame(frame, &table).unwrap();
        assert_eq!(record.int_field("total-bytes", -1), 1500);
    }
}
