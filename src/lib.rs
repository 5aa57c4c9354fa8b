//! # Grocery Basket Engine
//!
//! Turns a list of required ingredients into a priced shopping basket by
//! matching each ingredient against a store catalog snapshot, picking the
//! product with the lowest unit cost and computing how many packages to buy.

pub mod basket;
pub mod catalog;
pub mod catalog_patterns;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod matcher;
pub mod packs;
pub mod requirements;
pub mod units;
