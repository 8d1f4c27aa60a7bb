//! Text built-ins
//! CONCAT, UPPER, LOWER, TRIM, LEN

use rust_decimal::Decimal;

pub(super) fn concat(parts: Vec<String>) -> String {
    parts.join("")
}

pub(super) fn upper(text: &str) -> String {
    text.to_uppercase()
}

pub(super) fn lower(text: &str) -> String {
    text.to_lowercase()
}

pub(super) fn trim(text: &str) -> String {
    text.trim().to_string()
}

pub(super) fn len(text: &str) -> Decimal {
    Decimal::from(text.chars().count() as u64)
}
