//! Text sanitation for programme titles and descriptions.
//!
//! Upstream payloads mix markup fragments, HTML entities, and ragged
//! whitespace. `sanitize` reduces them to plain display text; `escape_xml`
//! is the separate, final step before embedding in the output document.
//! Composition order is always sanitize-then-escape.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Entity allow-list, decoded in order. `&amp;` stays last: decoding it
/// earlier would let a literal `&amp;ndash;` collapse into a dash.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&#160;", " "),
    ("&ldquo;", "\""),
    ("&rdquo;", "\""),
    ("&#8220;", "\""),
    ("&#8221;", "\""),
    ("&lsquo;", "'"),
    ("&rsquo;", "'"),
    ("&#8216;", "'"),
    ("&#8217;", "'"),
    ("&ndash;", "-"),
    ("&#8211;", "-"),
    ("&mdash;", "-"),
    ("&#8212;", "-"),
    ("&amp;", "&"),
    ("&#38;", "&"),
];

/// Reduce raw source text to clean display text.
///
/// Steps, in fixed order: strip markup tags, decode the entity allow-list,
/// collapse whitespace runs, trim. Returns `None` when nothing printable
/// remains, so callers can tell "no description" from "empty description".
pub fn sanitize(raw: &str) -> Option<String> {
    // 1) Strip markup tags
    let mut out = RE_TAGS.replace_all(raw, "").to_string();

    // 2) Decode the fixed entity set (ampersand last, see ENTITIES)
    for &(entity, literal) in ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, literal);
        }
    }

    // 3) Collapse whitespace
    let out = RE_WS.replace_all(&out, " ");
    let out = out.trim();

    if out.is_empty() {
        None
    } else {
        Some(out.to_string())
    }
}

/// Escape the five XML-reserved characters (`& < > " '`) as named entities.
pub fn escape_xml(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}
