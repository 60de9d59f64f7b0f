//! Character encoding detection and transcoding.
//!
//! Raw page bytes are decoded to UTF-8 before parsing. The encoding comes
//! from a byte-order mark, then from a charset declaration in the first
//! 1024 bytes, and falls back to UTF-8.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// Bytes examined for a charset declaration.
const SNIFF_LEN: usize = 1024;

/// Matches `<meta charset="...">` and the `charset=` parameter of
/// `<meta http-equiv="Content-Type" content="...">`.
#[allow(clippy::expect_used)]
static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+?(?:charset\s*=\s*["']?|content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*)([A-Za-z0-9_.:-]+)"#,
    )
    .expect("valid regex")
});

/// Decoded page text and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    /// UTF-8 text; malformed sequences replaced with U+FFFD.
    pub text: String,
    /// WHATWG name of the encoding used.
    pub encoding: &'static str,
    /// Whether any malformed sequence was replaced.
    pub had_errors: bool,
}

/// Charset label declared in a `<meta>` tag, if any.
fn declared_charset(head: &str) -> Option<&str> {
    META_CHARSET_RE
        .captures(head)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Detect the character encoding of HTML bytes.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(html) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&html[..html.len().min(SNIFF_LEN)]);
    declared_charset(&head)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

/// Decode HTML bytes to UTF-8, never failing.
#[must_use]
pub fn decode_html(html: &[u8]) -> DecodedHtml {
    let encoding = detect_encoding(html);
    // `decode` strips a BOM and switches encoding if one is present
    let (text, used, had_errors) = encoding.decode(html);

    DecodedHtml {
        text: text.into_owned(),
        encoding: used.name(),
        had_errors,
    }
}
