// Placeholder expansion for rule templates
//
// Supported tokens (case-sensitive):
//   [[fullurl]]  query-escaped full URL
//   [[domain]]   bare hostname
//   [[path]]     query-escaped URL path
//
// Anything else in double brackets is left as-is.

use crate::models::TemplateContext;
use crate::query::query_escape;

pub const FULL_URL_TOKEN: &str = "[[fullurl]]";
pub const DOMAIN_TOKEN: &str = "[[domain]]";
pub const PATH_TOKEN: &str = "[[path]]";

/// Expand every placeholder in `template` against `ctx`.
pub fn expand_template(template: &str, ctx: &TemplateContext) -> String {
    if !template.contains("[[") || !template.contains("]]") {
        return template.to_string();
    }

    template
        .replace(FULL_URL_TOKEN, &query_escape(&ctx.full_url))
        .replace(DOMAIN_TOKEN, &ctx.hostname)
        .replace(PATH_TOKEN, &query_escape(&ctx.path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn ctx(raw: &str) -> TemplateContext {
        TemplateContext::from_url(&Url::parse(raw).unwrap())
    }

    #[test]
    fn expands_domain() {
        let c = ctx("https://example.com/a?b=1");
        assert_eq!(expand_template("[[domain]]/x", &c), "example.com/x");
    }

    #[test]
    fn plain_template_unchanged() {
        let c = ctx("https://example.com/a?b=1");
        assert_eq!(expand_template("' OR 1=1--", &c), "' OR 1=1--");
        assert_eq!(expand_template("{{7*7}}", &c), "{{7*7}}");
    }

    #[test]
    fn expands_fullurl_escaped() {
        let c = ctx("https://example.com/a?b=1");
        assert_eq!(
            expand_template("x[[fullurl]]", &c),
            "xhttps%3A%2F%2Fexample.com%2Fa%3Fb%3D1"
        );
    }

    #[test]
    fn expands_path_escaped() {
        let c = ctx("https://example.com/a/b%20c?b=1");
        assert_eq!(expand_template("[[path]]", &c), "%2Fa%2Fb+c");
    }

    #[test]
    fn replaces_every_occurrence() {
        let c = ctx("https://example.com/a?b=1");
        assert_eq!(
            expand_template("[[domain]]-[[domain]]", &c),
            "example.com-example.com"
        );
    }

    #[test]
    fn unknown_and_wrong_case_tokens_verbatim() {
        let c = ctx("https://example.com/a?b=1");
        assert_eq!(
            expand_template("[[host]] [[Domain]] [[domain]]", &c),
            "[[host]] [[Domain]] example.com"
        );
    }
}
