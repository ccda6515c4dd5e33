//! Plain-text extraction for forwarded post bodies.
//!
//! Reddit self-text is markdown with HTML entities. The submission endpoint
//! only wants short readable prose, so the text goes through four passes:
//! entity decoding, an allow-list filter, link removal and a residual markup
//! strip. The result is cut with [`trim_text`].

use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_TEXT_CHARS: usize = 255;
pub const ELLIPSIS: char = '…';

static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^A-Za-z0-9 \n/;%$#&():,'"!.+-]"#).expect("allow-list regex is valid")
});
static LINK_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\((?:https?|ftp)://[^)\s]*\)").expect("link target regex is valid")
});
static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:https?|ftp)://\S*").expect("url regex is valid"));
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s+").expect("heading regex"));
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[-+]|\d+[.)])\s+").expect("bullet regex"));
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+\s]{3,}$").expect("rule regex"));
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("spaces regex"));
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("blank lines regex"));

/// Cuts `text` to [`MAX_TEXT_CHARS`] characters, appending [`ELLIPSIS`] when
/// anything was dropped.
pub fn trim_text(text: &str) -> String {
    if text.chars().count() > MAX_TEXT_CHARS {
        let mut out: String = text.chars().take(MAX_TEXT_CHARS).collect();
        out.push(ELLIPSIS);
        out
    } else {
        text.to_string()
    }
}

/// Turns raw post markdown into trimmed plain text. Never fails; input that
/// is all markup comes out empty.
pub fn sanitize(raw: &str) -> String {
    let decoded = decode_entities(raw);
    let allowed = DISALLOWED.replace_all(&decoded, "");
    let no_targets = LINK_TARGET.replace_all(&allowed, "");
    let no_links = URL.replace_all(&no_targets, "");
    let stripped = strip_markup(&no_links);
    // stripping can glue fragments back together
    let clean = URL.replace_all(&stripped, "");
    trim_text(clean.trim())
}

fn decode_entities(s: &str) -> String {
    s.replace("&#x200B;", " ")
        .replace("&#x200b;", " ")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn strip_markup(s: &str) -> String {
    let lines: Vec<String> = s
        .lines()
        .map(|line| {
            let line = line.trim();
            if RULE.is_match(line) {
                return String::new();
            }
            let line = HEADING.replace(line, "");
            let line = BULLET.replace(&line, "");
            let line = line.replace("()", "");
            SPACES.replace_all(line.trim(), " ").into_owned()
        })
        .collect();

    BLANK_LINES
        .replace_all(lines.join("\n").trim(), "\n\n")
        .into_owned()
}
