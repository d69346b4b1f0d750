use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DISALLOWED: Regex = Regex::new(r"[^a-zA-Z0-9\x{4e00}-\x{9fa5}]+").expect("valid regex");
}

/// Keep only ASCII letters, ASCII digits and CJK unified ideographs (U+4E00..=U+9FA5).
///
/// Everything else, whitespace and punctuation included, is dropped without
/// substitution, so adjacent runs join up: `"ab, cd"` becomes `"abcd"`.
pub fn normalize(text: &str) -> String {
    DISALLOWED.replace_all(text, "").into_owned()
}

pub fn is_permitted(c: char) -> bool {
    c.is_ascii_alphanumeric() || ('\u{4e00}'..='\u{9fa5}').contains(&c)
}
