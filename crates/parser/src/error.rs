//! Per-frame parse errors.
//!
//! These never propagate past a single frame: the receiver logs them and
//! moves on to the next candidate, per the framing & parser error policy.

use thiserror::Error;

/// Reasons a single frame failed to parse.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The frame did not start with a `<priority>` token.
    #[error("missing priority prefix")]
    MissingPriority,
    /// The header ended before a timestamp, hostname and body could be
    /// split out.
    #[error("truncated header")]
    TruncatedHeader,
    /// The timestamp token could not be parsed as RFC 3339.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// The body contained no `[` to start the structured block.
    #[error("missing structured block")]
    MissingStructuredBlock,
    /// A `key="value"` pair was missing its closing quote.
    #[error("unterminated value for key `{key}`")]
    UnterminatedValue {
        /// The key whose value was never closed.
        key: String,
    },
    /// A `key=` was not immediately followed by an opening quote.
    #[error("malformed key/value pair near `{context}`")]
    MalformedKeyValue {
        /// A short snippet of the offending input.
        context: String,
    },
    /// A field listed in `int_fields` did not parse as a decimal integer.
    #[error("field `{key}` is not a valid integer: `{value}`")]
    InvalidIntField {
        /// The offending field name.
        key: String,
        /// The raw string value that failed to parse.
        value: String,
    },
}
