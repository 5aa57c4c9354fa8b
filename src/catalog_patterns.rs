//! # Catalog Patterns Module
//!
//! This module contains regex patterns used to read the free-text quantity
//! and price fields of harvested catalog records.

use lazy_static::lazy_static;
use regex::Regex;

// "<number> <unit>" with optional space, comma decimals and trailing period ("500 г", "1,5 л", "10 шт.")
pub const PACKAGE_QUANTITY_PATTERN: &str = r"^\s*(\d+(?:[.,]\d+)?)\s*([^\d\s.]+)\.?\s*$";

// Leading number of a price label, digit groups may be separated by spaces ("1 299 ₽", "89,90 руб")
pub const PRICE_PATTERN: &str = r"^\s*(\d[\d \u{00A0}\u{202F}]*(?:[.,]\d+)?)";

// Lazy static regexes to avoid recompilation
lazy_static! {
    pub static ref PACKAGE_QUANTITY_REGEX: Regex =
        Regex::new(PACKAGE_QUANTITY_PATTERN).expect("Package quantity pattern should be valid");
    pub static ref PRICE_REGEX: Regex =
        Regex::new(PRICE_PATTERN).expect("Price pattern should be valid");
}
