// Query-String Handling
//
// - codec: escaping and strict unescaping of single query components
// - params: strict raw-query parsing into a ParamMap, and encoding back
//
// Parsing here is strict on purpose: a query that passed lenient intake
// filtering but cannot be parsed strictly is surfaced as a QueryError.

pub mod codec;
pub mod params;

pub use codec::*;
pub use params::*;

use thiserror::Error;

/// Failure to parse or unescape a raw query string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),
    #[error("invalid semicolon separator in query")]
    Semicolon,
    #[error("unescaped query component is not valid UTF-8")]
    InvalidUtf8,
}
