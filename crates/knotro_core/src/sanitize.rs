//! Content sanitization applied before every note persist.
//!
//! # Responsibility
//! - Define the sanitizer seam used by the repository.
//! - Provide the default allowlist sanitizer.
//!
//! # Invariants
//! - Every `<` that could open markup is either part of a rebuilt
//!   allowlisted tag or HTML-escaped; text is preserved, never removed.
//! - Allowed tags keep only allowlisted attributes.
//! - Plain text and markdown pass through unchanged.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<(/?)([A-Za-z][A-Za-z0-9]*)([^<>]*)>").expect("valid tag regex")
});
static DECLARATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<[!?][^<>]*>").expect("valid declaration regex"));
static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+)"#)
        .expect("valid attribute regex")
});

const ALLOWED_TAGS: &[&str] = &[
    "a",
    "abbr",
    "acronym",
    "b",
    "blockquote",
    "code",
    "em",
    "i",
    "li",
    "ol",
    "strong",
    "ul",
];
const ALLOWED_ATTRIBUTES: &[(&str, &str)] = &[
    ("a", "href"),
    ("a", "title"),
    ("abbr", "title"),
    ("acronym", "title"),
];
const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Strips unsafe markup from note content.
pub trait ContentSanitizer {
    fn sanitize(&self, raw: &str) -> String;
}

/// Allowlist sanitizer for markdown notes with occasional inline HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupSanitizer;

impl ContentSanitizer for MarkupSanitizer {
    fn sanitize(&self, raw: &str) -> String {
        let mut cleaned = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(open) = rest.find('<') {
            cleaned.push_str(&rest[..open]);
            rest = &rest[open..];
            let consumed = if let Some(caps) = TAG_RE.captures(rest) {
                cleaned.push_str(&rebuild_tag(&caps));
                caps[0].len()
            } else if let Some(found) = DECLARATION_RE.find(rest) {
                cleaned.push_str(&escape_markup(found.as_str()));
                found.end()
            } else {
                // Unterminated or interrupted markup still opens a tag in a browser.
                cleaned.push_str(if opens_markup(rest) { "&lt;" } else { "<" });
                1
            };
            rest = &rest[consumed..];
        }
        cleaned.push_str(rest);
        cleaned
    }
}

/// Passes content through untouched. Intended for tests and trusted imports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSanitizer;

impl ContentSanitizer for NoopSanitizer {
    fn sanitize(&self, raw: &str) -> String {
        raw.to_string()
    }
}

fn rebuild_tag(caps: &Captures<'_>) -> String {
    let closing = &caps[1];
    let tag = caps[2].to_ascii_lowercase();
    if !ALLOWED_TAGS.contains(&tag.as_str()) {
        return escape_markup(&caps[0]);
    }
    if !closing.is_empty() {
        return format!("</{tag}>");
    }

    let mut rebuilt = format!("<{tag}");
    for attr in ATTRIBUTE_RE.captures_iter(&caps[3]) {
        let name = attr[1].to_ascii_lowercase();
        if !ALLOWED_ATTRIBUTES.contains(&(tag.as_str(), name.as_str())) {
            continue;
        }
        let value = unquote(&attr[2]);
        if name == "href" && !is_safe_url(value) {
            continue;
        }
        rebuilt.push_str(&format!(" {name}=\"{}\"", escape_attribute(value)));
    }
    rebuilt.push('>');
    rebuilt
}

fn opens_markup(from_lt: &str) -> bool {
    from_lt[1..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

fn unquote(value: &str) -> &str {
    let trimmed = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')));
    trimmed.unwrap_or(value)
}

fn is_safe_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    match compact.find(':') {
        None => true,
        Some(colon) => {
            // A colon after the first path/query/fragment delimiter is not a scheme.
            if compact[..colon].contains(['/', '?', '#']) {
                return true;
            }
            let scheme = compact[..colon].to_ascii_lowercase();
            ALLOWED_URL_SCHEMES.contains(&scheme.as_str())
        }
    }
}

fn escape_markup(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_markup(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::{ContentSanitizer, MarkupSanitizer, NoopSanitizer};

    fn clean(raw: &str) -> String {
        MarkupSanitizer.sanitize(raw)
    }

    #[test]
    fn script_tags_are_escaped() {
        let cleaned = clean("<script>alert(1)</script>");
        assert_eq!(cleaned, "&lt;script&gt;alert(1)&lt;/script&gt;");
        assert!(!cleaned.contains("<script"));
    }

    #[test]
    fn event_handler_attributes_are_dropped() {
        let cleaned = clean(r#"<a href="/notes/x" onclick="steal()">x</a>"#);
        assert_eq!(cleaned, r#"<a href="/notes/x">x</a>"#);
    }

    #[test]
    fn javascript_urls_are_dropped() {
        let cleaned = clean(r#"<a href="java script:alert(1)" title='t'>x</a>"#);
        assert_eq!(cleaned, r#"<a title="t">x</a>"#);
    }

    #[test]
    fn disallowed_tags_with_handlers_are_escaped() {
        let cleaned = clean("<img src=x onerror=alert(1)>");
        assert!(!cleaned.contains('<'));
    }

    #[test]
    fn allowed_formatting_survives() {
        assert_eq!(clean("<B>bold</B> and <em>em</em>"), "<b>bold</b> and <em>em</em>");
    }

    #[test]
    fn markdown_passes_through() {
        let markdown = "# Title\n\n> quote\n\n- [[link]] and [x](https://example.com) a < b";
        assert_eq!(clean(markdown), markdown);
    }

    #[test]
    fn comments_are_escaped() {
        assert_eq!(clean("<!-- hi -->"), "&lt;!-- hi --&gt;");
    }

    #[test]
    fn interrupted_disallowed_tag_cannot_swallow_allowed_tag() {
        let cleaned = clean(r#"<img src=x onerror="alert(1)" <b>x</b>"#);
        assert!(!cleaned.contains("<img"));
        assert_eq!(cleaned, r#"&lt;img src=x onerror="alert(1)" <b>x</b>"#);
    }

    #[test]
    fn unterminated_tags_are_escaped() {
        assert_eq!(clean("text <script src=//x"), "text &lt;script src=//x");
        assert_eq!(clean("<iframe"), "&lt;iframe");
        assert_eq!(clean("</"), "&lt;/");
    }

    #[test]
    fn slash_separated_handlers_are_escaped() {
        let cleaned = clean("<svg/onload=alert(1)>");
        assert_eq!(cleaned, "&lt;svg/onload=alert(1)&gt;");
    }

    #[test]
    fn nested_angle_in_attributes_is_escaped() {
        let cleaned = clean(r#"<a href="<script>alert(1)</script>">x</a>"#);
        assert!(!cleaned.contains("<script"));
        assert!(!cleaned.contains("<a href=\"<"));
    }

    #[test]
    fn lone_angle_brackets_in_text_survive() {
        assert_eq!(clean("1 < 2 and 3 <= 4"), "1 < 2 and 3 <= 4");
    }

    #[test]
    fn noop_sanitizer_keeps_input() {
        assert_eq!(NoopSanitizer.sanitize("<script>"), "<script>");
    }
}
