//! Text helpers shared by matching and scoring / 文本工具
//!
//! Lengths are counted in characters, not bytes: kana and kanji are
//! multi-byte in UTF-8 but one mora / one glyph each.

/// Lowercase for case-insensitive comparison / 转小写
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// ASCII-only lowercase, the folding SQLite `lower()` and `LIKE` apply
pub fn fold_ascii(text: &str) -> String {
    text.to_ascii_lowercase()
}

/// Character count / 字符数
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Escape LIKE wildcards so the text matches literally (escape char `\`)
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
