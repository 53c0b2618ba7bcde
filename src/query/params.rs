// Raw query <-> ParamMap

use super::codec::{query_escape_bytes, query_unescape_bytes};
use super::QueryError;
use crate::models::ParamMap;

/// Parse a raw query string (without the leading '?') into a ParamMap.
///
/// Segments are separated by '&'. Empty segments are skipped, a segment
/// without '=' has an empty value, and a segment containing ';' is an error.
/// Unescaped bytes are kept as-is, UTF-8 or not.
pub fn parse_query(raw: &str) -> Result<ParamMap, QueryError> {
    let mut params = ParamMap::new();
    for segment in raw.split('&') {
        if segment.is_empty() {
            continue;
        }
        if segment.contains(';') {
            return Err(QueryError::Semicolon);
        }
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        let key = query_unescape_bytes(key)?;
        let value = query_unescape_bytes(value)?;
        params.entry(key).or_default().push(value);
    }
    Ok(params)
}

/// Encode a ParamMap as `key=value` pairs joined by '&', keys in name order
/// and values in list order.
pub fn encode_query(params: &ParamMap) -> String {
    let mut pairs = Vec::new();
    for (key, values) in params {
        let key = query_escape_bytes(key);
        for value in values {
            pairs.push(format!("{}={}", key, query_escape_bytes(value)));
        }
    }
    pairs.join("&")
}

/// Total number of value slots across all parameters.
pub fn value_slots(params: &ParamMap) -> usize {
    params.values().map(Vec::len).sum()
}
