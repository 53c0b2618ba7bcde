// Query component codec
//
// Escaping keeps the unreserved set (ALPHA / DIGIT / "-" / "_" / "." / "~"),
// turns spaces into '+' and percent-encodes everything else.

use super::QueryError;
use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes escaped in a query component. Space is left alone here and mapped to
/// '+' afterwards.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b' ');

/// Escape a string for use as a query key or value.
pub fn query_escape(s: &str) -> String {
    query_escape_bytes(s.as_bytes())
}

/// Escape raw bytes for use as a query key or value.
pub fn query_escape_bytes(bytes: &[u8]) -> String {
    percent_encode(bytes, QUERY_COMPONENT)
        .to_string()
        .replace(' ', "+")
}

/// Reverse `query_escape_bytes`. Every '%' must start a two-digit hex escape;
/// the decoded bytes may be any encoding.
pub fn query_unescape_bytes(s: &str) -> Result<Vec<u8>, QueryError> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            match escape {
                Some([h, l]) if h.is_ascii_hexdigit() && l.is_ascii_hexdigit() => i += 3,
                _ => {
                    let end = (i + 3).min(bytes.len());
                    return Err(QueryError::InvalidEscape(
                        String::from_utf8_lossy(&bytes[i..end]).into_owned(),
                    ));
                }
            }
        } else {
            i += 1;
        }
    }

    let plus_as_space = s.replace('+', " ");
    Ok(percent_decode_str(&plus_as_space).collect())
}

/// Reverse `query_escape`. Like `query_unescape_bytes`, but the decoded bytes
/// must also be UTF-8.
pub fn query_unescape(s: &str) -> Result<String, QueryError> {
    String::from_utf8(query_unescape_bytes(s)?).map_err(|_| QueryError::InvalidUtf8)
}
