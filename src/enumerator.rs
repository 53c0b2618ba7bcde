// Injection point enumeration
//
// For one URL and an ordered rule list, produce every rewritten URL that
// replaces exactly one query value with one expanded payload. Output order is
// payloads (rule order) outer, then parameters (name order) and value indices.

use url::{Position, Url};

use crate::models::{Candidate, ParamMap, TemplateContext};
use crate::query::{encode_query, parse_query, query_unescape, value_slots, QueryError};
use crate::template::expand_template;

/// Turns a (substituted) parameter map into the query text that gets attached
/// to a candidate URL.
pub trait QueryRenderer: Send + Sync {
    fn render(&self, params: &ParamMap) -> Result<String, QueryError>;
}

/// Standard percent-encoded query.
pub struct EncodedQuery;

impl QueryRenderer for EncodedQuery {
    fn render(&self, params: &ParamMap) -> Result<String, QueryError> {
        Ok(encode_query(params))
    }
}

/// Encoded query passed back through unescaping, so payloads go out raw.
/// The result is not guaranteed to be a valid query string. Fails when the
/// unescaped query is not UTF-8 (e.g. a Latin-1 value elsewhere in the URL).
pub struct DecodedQuery;

impl QueryRenderer for DecodedQuery {
    fn render(&self, params: &ParamMap) -> Result<String, QueryError> {
        query_unescape(&encode_query(params))
    }
}

/// Which renderer to use, selected by the `--decode` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Encoded,
    Decoded,
}

impl RenderMode {
    pub fn from_decode_flag(decode: bool) -> Self {
        if decode {
            RenderMode::Decoded
        } else {
            RenderMode::Encoded
        }
    }

    pub fn renderer(&self) -> &'static dyn QueryRenderer {
        match self {
            RenderMode::Encoded => &EncodedQuery,
            RenderMode::Decoded => &DecodedQuery,
        }
    }
}

/// A single value slot overwritten with a payload. The original value is put
/// back when the guard is dropped.
struct Substitution<'a> {
    params: &'a mut ParamMap,
    name: &'a [u8],
    index: usize,
    original: Option<Vec<u8>>,
}

impl<'a> Substitution<'a> {
    fn apply(params: &'a mut ParamMap, name: &'a [u8], index: usize, payload: &str) -> Option<Self> {
        let slot = params.get_mut(name)?.get_mut(index)?;
        let original = std::mem::replace(slot, payload.as_bytes().to_vec());
        Some(Self {
            params,
            name,
            index,
            original: Some(original),
        })
    }

    fn params(&self) -> &ParamMap {
        self.params
    }
}

impl Drop for Substitution<'_> {
    fn drop(&mut self) {
        let slot = self
            .params
            .get_mut(self.name)
            .and_then(|values| values.get_mut(self.index));
        if let (Some(slot), Some(original)) = (slot, self.original.take()) {
            *slot = original;
        }
    }
}

/// Enumerate candidates for `url` using the renderer selected by `mode`.
pub fn enumerate<S: AsRef<str>>(
    url: &Url,
    rules: &[S],
    mode: RenderMode,
) -> Result<Vec<Candidate>, QueryError> {
    enumerate_with(url, rules, mode.renderer())
}

/// Enumerate candidates for `url` with an explicit renderer.
///
/// Fails only if the URL's raw query cannot be parsed. A combination whose
/// query fails to render is skipped and the rest are still produced.
pub fn enumerate_with<S: AsRef<str>>(
    url: &Url,
    rules: &[S],
    renderer: &dyn QueryRenderer,
) -> Result<Vec<Candidate>, QueryError> {
    let mut params = parse_query(url.query().unwrap_or(""))?;

    let ctx = TemplateContext::from_url(url);
    let payloads: Vec<String> = rules
        .iter()
        .map(|rule| expand_template(rule.as_ref(), &ctx))
        .collect();

    let slots: Vec<(Vec<u8>, usize)> = params
        .iter()
        .flat_map(|(name, values)| (0..values.len()).map(move |i| (name.clone(), i)))
        .collect();

    let base = &url[..Position::AfterPath];
    let fragment = &url[Position::AfterQuery..];

    let mut candidates = Vec::with_capacity(payloads.len() * value_slots(&params));
    for payload in &payloads {
        for (name, index) in &slots {
            let Some(sub) = Substitution::apply(&mut params, name, *index, payload) else {
                continue;
            };
            let param = String::from_utf8_lossy(name).into_owned();
            match renderer.render(sub.params()) {
                Ok(query) => candidates.push(Candidate {
                    param,
                    value_index: *index,
                    payload: payload.clone(),
                    url: format!("{}?{}{}", base, query, fragment),
                }),
                Err(e) => {
                    tracing::debug!(
                        "skipping {}[{}] on {}: error rendering parameters: {}",
                        param,
                        index,
                        url,
                        e
                    );
                }
            }
        }
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn one_rule_one_param() {
        let out = enumerate(&url("http://a.com/p?q=1"), &["x"], RenderMode::Encoded).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "http://a.com/p?q=x");
        assert_eq!(out[0].param, "q");
        assert_eq!(out[0].value_index, 0);
    }

    #[test]
    fn nesting_order_is_payload_then_slot() {
        let out = enumerate(&url("http://a.com/p?b=1&a=2"), &["X", "Y"], RenderMode::Encoded)
            .unwrap();
        let urls: Vec<&str> = out.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://a.com/p?a=X&b=1",
                "http://a.com/p?a=2&b=X",
                "http://a.com/p?a=Y&b=1",
                "http://a.com/p?a=2&b=Y",
            ]
        );
    }

    #[test]
    fn repeated_param_slots_in_list_order() {
        let out = enumerate(&url("http://a.com/?y=1&y=2"), &["Z"], RenderMode::Encoded).unwrap();
        let urls: Vec<&str> = out.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["http://a.com/?y=Z&y=2", "http://a.com/?y=1&y=Z"]);
    }

    #[test]
    fn encoded_vs_decoded() {
        let u = url("http://a.com/p?q=1");
        let enc = enumerate(&u, &["<b c>"], RenderMode::Encoded).unwrap();
        let dec = enumerate(&u, &["<b c>"], RenderMode::Decoded).unwrap();
        assert_eq!(enc[0].url, "http://a.com/p?q=%3Cb+c%3E");
        assert_eq!(dec[0].url, "http://a.com/p?q=<b c>");
    }

    #[test]
    fn keeps_fragment_and_port() {
        let out = enumerate(&url("http://a.com:8080/p?q=1#top"), &["x"], RenderMode::Encoded)
            .unwrap();
        assert_eq!(out[0].url, "http://a.com:8080/p?q=x#top");
    }

    #[test]
    fn payload_templates_expanded() {
        let out = enumerate(
            &url("https://example.com/a?b=1"),
            &["http://[[domain]].evil"],
            RenderMode::Decoded,
        )
        .unwrap();
        assert_eq!(out[0].payload, "http://example.com.evil");
        assert_eq!(out[0].url, "https://example.com/a?b=http://example.com.evil");
    }

    #[test]
    fn bad_raw_query_is_an_error() {
        let err = enumerate(&url("http://a.com/p?q=%zz"), &["x"], RenderMode::Encoded);
        assert!(matches!(err, Err(QueryError::InvalidEscape(_))));
    }

    #[test]
    fn no_rules_no_candidates() {
        let rules: [&str; 0] = [];
        let out = enumerate(&url("http://a.com/p?q=1"), &rules, RenderMode::Encoded).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn latin1_values_are_fuzzed_and_kept_intact() {
        let out = enumerate(&url("http://a.com/s?q=caf%E9&id=1"), &["X"], RenderMode::Encoded)
            .unwrap();
        let urls: Vec<&str> = out.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["http://a.com/s?id=X&q=caf%E9", "http://a.com/s?id=1&q=X"]);
    }

    #[test]
    fn decoded_mode_skips_non_utf8_combinations() {
        let out = enumerate(&url("http://a.com/s?q=caf%E9&id=1"), &["X"], RenderMode::Decoded)
            .unwrap();
        // Only substituting the Latin-1 slot itself yields a UTF-8 query
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "http://a.com/s?id=1&q=X");
    }

    #[test]
    fn substitution_restores_on_drop() {
        let mut params = parse_query("a=1&a=2").unwrap();
        {
            let sub = Substitution::apply(&mut params, b"a", 1, "X").unwrap();
            assert_eq!(sub.params()[b"a".as_slice()], vec![b"1".to_vec(), b"X".to_vec()]);
        }
        assert_eq!(params[b"a".as_slice()], vec![b"1".to_vec(), b"2".to_vec()]);
        assert!(Substitution::apply(&mut params, b"a", 2, "X").is_none());
        assert!(Substitution::apply(&mut params, b"b", 0, "X").is_none());
    }
}
