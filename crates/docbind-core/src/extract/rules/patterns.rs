//! Fixed patterns used by the local strategies.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Punctuation that splits a field name into keyword fragments
    pub static ref KEYWORD_SEPARATOR: Regex = Regex::new(r"[，,、]").unwrap();

    // "keyword: value" up to the end of the line, ASCII or full-width colon
    pub static ref KEYWORD_VALUE: Regex = Regex::new(r"[:：]\s*(.+?)(?:\n|$)").unwrap();
}
