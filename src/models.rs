// Core data models for qsfuzz

use std::collections::BTreeMap;
use std::fmt;
use url::{Host, Url};

/// Query parameters keyed by name. A parameter may repeat, so every name maps
/// to its values in the order they appeared in the raw query.
///
/// Names and values are the unescaped raw bytes. They are not required to be
/// UTF-8 (e.g. Latin-1 `caf%E9`), so they round-trip through encoding intact.
pub type ParamMap = BTreeMap<Vec<u8>, Vec<Vec<u8>>>;

/// URL-derived values used to resolve placeholders in rule templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    pub full_url: String,
    pub hostname: String,
    /// Decoded path (e.g. "/a b" rather than "/a%20b")
    pub path: String,
}

impl TemplateContext {
    pub fn from_url(url: &Url) -> Self {
        let path = percent_encoding::percent_decode_str(url.path())
            .decode_utf8_lossy()
            .into_owned();
        Self {
            full_url: url.as_str().to_string(),
            hostname: hostname(url),
            path,
        }
    }
}

/// Bare hostname of a URL. IPv6 literals come back without brackets.
pub fn hostname(url: &Url) -> String {
    match url.host() {
        Some(Host::Ipv6(addr)) => addr.to_string(),
        Some(host) => host.to_string(),
        None => String::new(),
    }
}

/// One rewritten URL, differing from its source by exactly one parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub param: String,
    pub value_index: usize,
    pub payload: String,
    pub url: String,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// A candidate tagged with the rule and source URL it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub rule: String,
    pub source: String,
    pub candidate: Candidate,
}
