// URL intake and deduplication
//
// Best-effort filter over a raw URL stream: lines that don't parse and URLs
// without query parameters are dropped silently. Of the rest, only the first
// URL per host + path + parameter-name set is kept.

use std::collections::{BTreeSet, HashSet};
use std::io::BufRead;
use url::Url;

use crate::models::hostname;

/// Parse one input line, returning the URL only if it carries at least one
/// query parameter.
pub fn parse_fuzzable(line: &str) -> Option<Url> {
    let url = Url::parse(line.trim()).ok()?;
    if url.query_pairs().next().is_none() {
        return None;
    }
    Some(url)
}

/// Fingerprint used to collapse equivalent URLs: host, path and the sorted,
/// de-duplicated parameter names. Parameter values are ignored.
///
/// Example: `http://a.com/p?y=9&x=3` → `a.com/p?x&y`
pub fn dedup_key(url: &Url) -> String {
    let names: BTreeSet<String> = url
        .query_pairs()
        .map(|(name, _)| name.into_owned())
        .collect();
    let names: Vec<String> = names.into_iter().collect();
    format!("{}{}?{}", hostname(url), url.path(), names.join("&"))
}

/// Deduplicate an in-memory sequence of lines.
pub fn deduplicate_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for line in lines {
        if let Some(url) = parse_fuzzable(line.as_ref()) {
            if seen.insert(dedup_key(&url)) {
                urls.push(url.to_string());
            }
        }
    }
    urls
}

/// Deduplicate URLs read line by line from `reader`.
///
/// Only read failures are errors. Lines that are not UTF-8, don't parse, or
/// carry no query are skipped.
pub fn deduplicate<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    let mut total = 0usize;
    let mut lines = Vec::new();
    for line in reader.split(b'\n') {
        total += 1;
        match String::from_utf8(line?) {
            Ok(line) => lines.push(line),
            Err(_) => tracing::debug!("skipping input line {}: not valid UTF-8", total),
        }
    }
    let urls = deduplicate_lines(&lines);
    tracing::debug!("intake kept {} of {} input lines", urls.len(), total);
    Ok(urls)
}
