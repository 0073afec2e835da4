/// Utility functions for string processing, particularly SQL identifier and keyword handling
use regex::Regex;

// Skips leading whitespace and comments, captures the first word of the statement
static LEADING_KEYWORD_REGEX: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
    Regex::new(r"^(?s:\s+|--[^\n]*(?:\n|$)|/\*.*?\*/)*(\w+)").unwrap()
});

/// Check if a character may start a placeholder name (letters and underscore, never a digit)
pub fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

/// Check if a character may continue an identifier (Firebird allows `$`, as in `RDB$RELATIONS`)
pub fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Case-insensitive keyword comparison for unquoted SQL words
pub fn is_keyword(word: &str, keyword: &str) -> bool {
    word.eq_ignore_ascii_case(keyword)
}

/// Return the first keyword of a statement, uppercased, ignoring leading whitespace and comments
pub fn leading_keyword(sql: &str) -> Option<String> {
    LEADING_KEYWORD_REGEX
        .captures(sql)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
}
