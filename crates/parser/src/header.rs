//! Classical syslog prelude parsing: priority, timestamp, hostname, body.

use crate::error::ParseError;

/// The header fields every frame carries ahead of its structured block.
#[derive(Debug, PartialEq)]
pub struct Header<'a> {
    /// Microseconds since epoch.
    pub timestamp_usec: i64,
    /// Reporting hostname.
    pub hostname: &'a str,
    /// Everything after the hostname token, up to the end of the frame.
    pub body: &'a str,
}

/// Parses the `<pri>[version ]timestamp hostname body` prelude of a frame.
///
/// The optional RFC 5424 version token (a single decimal digit immediately
/// followed by a space) is skipped when present; the original source this
/// collector is modeled on emits it inconsistently across message types.
pub fn parse_header(frame: &str) -> Result<Header<'_>, ParseError> {
    let after_pri = frame.strip_prefix('<').ok_or(ParseError::MissingPriority)?;
    let gt = after_pri.find('>').ok_or(ParseError::MissingPriority)?;
    let mut rest = &after_pri[gt + 1..];

    if let Some(c) = rest.chars().next() {
        if c.is_ascii_digit() {
            if let Some(sp) = rest.find(' ') {
                if rest[..sp].chars().all(|c| c.is_ascii_digit()) {
                    rest = &rest[sp + 1..];
                }
            }
        }
    }

    let ts_end = rest.find(' ').ok_or(ParseError::TruncatedHeader)?;
    let (timestamp_tok, rest) = (&rest[..ts_end], &rest[ts_end + 1..]);
    let timestamp_usec = parse_timestamp_usec(timestamp_tok)?;

    let host_end = rest.find(' ').ok_or(ParseError::TruncatedHeader)?;
    let (hostname, body) = (&rest[..host_end], &rest[host_end + 1..]);

    Ok(Header {
        timestamp_usec,
        hostname,
        body,
    })
}

/// Parses an RFC 3339 timestamp token into microseconds since epoch.
fn parse_timestamp_usec(token: &str) -> Result<i64, ParseError> {
    chrono::DateTime::parse_from_rfc3339(token)
        .map(|dt| dt.timestamp_micros())
        .map_err(|e| ParseError::InvalidTimestamp(format!("{token}: {e}")))
}

/// Extracts the message tag: the last whitespace-delimited token before the
/// first `[` in `body`, and the byte offset of that `[`.
pub fn extract_tag(body: &str) -> Result<(&str, usize), ParseError> {
    let bracket = body.find('[').ok_or(ParseError::MissingStructuredBlock)?;
    let before = body[..bracket].trim_end();
    let tag = before.rsplit(char::is_whitespace).next().unwrap_or(before);
    Ok((tag, bracket))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_prelude_with_version_token() {
        let frame = "<14>1 2023-01-01T00:00:00Z h RT_FLOW: TAG [k1=\"v1\"]";
        let header = parse_header(frame).unwrap();
        assert_eq!(header.hostname, "h");
        assert_eq!(header.body, "RT_FLOW: TAG [k1=\"v1\"]");
    }

    #[test]
    fn parses_prelude_without_version_token() {
        let frame = "<14>2023-01-01T00:00:00Z h RT_FLOW: TAG [k1=\"v1\"]";
        let header = parse_header(frame).unwrap();
        assert_eq!(header.hostname, "h");
    }

    #[test]
    fn tag_is_last_token_before_bracket() {
        let (tag, bracket) = extract_tag("RT_FLOW: TAG [k1=\"v1\"]").unwrap();
        assert_eq!(tag, "TAG");
        assert_eq!(&"RT_FLOW: TAG [k1=\"v1\"]"[bracket..bracket + 1], "[");
    }

    #[test]
    fn missing_priority_is_rejected() {
        assert!(matches!(parse_header("no priority here"), Err(ParseError::MissingPriority)));
    }
}
