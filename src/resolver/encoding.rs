//! Percent-encoding helpers for the three URL dialects.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters escaped inside a single remote path segment; everything
/// outside the unreserved set.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-decode with `+`-as-space semantics.
///
/// Literal `+` means a space in the webdav dialect; an encoded plus sign
/// arrives as `%2B` and survives the replacement.
pub fn decode_plus(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Encode a query-parameter value, space as `+`.
pub fn encode_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Standard percent-encoding of one path segment, no `+` shorthand.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}
