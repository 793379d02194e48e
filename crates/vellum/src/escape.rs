//! HTML escaping.

use std::borrow::Cow;

/// Escapes text for use in HTML element content and quoted attributes.
///
/// `&`, `<`, `>`, `"` and `'` are replaced with entities. Existing entities
/// are escaped again (`&amp;` becomes `&amp;amp;`).
///
/// ```rust
/// assert_eq!(vellum::esc("<a href='x'>"), "&lt;a href=&#039;x&#039;&gt;");
/// ```
pub fn esc(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes raw bytes, replacing invalid UTF-8 sequences with U+FFFD.
pub fn esc_bytes(bytes: &[u8]) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => esc(text),
        Cow::Owned(text) => esc(&text),
    }
}
