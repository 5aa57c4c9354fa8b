//! # Catalog Snapshot
//!
//! This module models the store catalog the engine matches against and loads
//! it from the JSON produced by the catalog harvester:
//!
//! ```json
//! {
//!     "Бакалея": [
//!         {"name": "Соль морская", "quantity": "1 кг", "price": "50 ₽", "link": "https://..."}
//!     ]
//! }
//! ```
//!
//! Quantity strings are parsed once at load time. A quantity that is missing
//! or unreadable does not exclude the product: it gets the fallback package
//! size instead. Records without a usable name or price are skipped.
//!
//! A [`Catalog`] is immutable once built. [`CatalogStore`] hands out shared
//! snapshots and replaces them as a whole, so a computation bound to one
//! snapshot never observes a half-refreshed catalog.

use crate::catalog_patterns::{PACKAGE_QUANTITY_REGEX, PRICE_REGEX};
use crate::errors::ParseError;
use crate::units::Unit;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Base quantity assumed for products whose package size is unknown (1 kg equivalent)
pub const FALLBACK_PACKAGE_BASE: f64 = 1000.0;

/// Package size of a catalog product
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PackageSize {
    /// Size read from the product's quantity field
    Declared { amount: f64, unit: Unit },
    /// Quantity field was missing or unparseable
    Fallback,
}

/// A product offered by the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogProduct {
    pub name: String,
    pub category: String,
    pub package: PackageSize,
    pub price: f64,
    pub link: String,
}

impl CatalogProduct {
    /// Create a product with a price and no known package size
    pub fn new(name: &str, price: f64) -> Self {
        Self {
            name: name.to_string(),
            category: String::new(),
            package: PackageSize::Fallback,
            price,
            link: String::new(),
        }
    }

    /// Set the declared package size
    pub fn with_package(mut self, amount: f64, unit: Unit) -> Self {
        self.package = PackageSize::Declared { amount, unit };
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    /// Set the product link
    pub fn with_link(mut self, link: &str) -> Self {
        self.link = link.to_string();
        self
    }
}

/// Raw product record as written by the harvester
#[derive(Debug, Deserialize)]
struct RawProduct {
    name: Option<String>,
    quantity: Option<Value>,
    price: Option<Value>,
    link: Option<String>,
}

/// Immutable snapshot of the store catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    products: Vec<CatalogProduct>,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    /// Build a snapshot from already-parsed products, keeping their order
    pub fn from_products(products: Vec<CatalogProduct>) -> Self {
        Self {
            products,
            loaded_at: Utc::now(),
        }
    }

    /// An empty snapshot
    pub fn empty() -> Self {
        Self::from_products(Vec::new())
    }

    /// Parse a snapshot from harvester JSON
    ///
    /// Products keep category order, then list order, as written in the JSON.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use basket_engine::catalog::{Catalog, PackageSize};
    /// use basket_engine::units::Unit;
    ///
    /// let json = r#"{"Бакалея": [{"name": "Соль", "quantity": "500 г", "price": "20 ₽", "link": "/salt"}]}"#;
    /// let catalog = Catalog::from_json_str(json)?;
    ///
    /// assert_eq!(catalog.len(), 1);
    /// assert_eq!(catalog.products()[0].price, 20.0);
    /// assert_eq!(catalog.products()[0].package, PackageSize::Declared { amount: 500.0, unit: Unit::Gram });
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let categories: Map<String, Value> =
            serde_json::from_str(json).context("Catalog must be a JSON object of categories")?;

        let mut products = Vec::new();
        let mut skipped = 0usize;

        for (category, records) in categories {
            let Value::Array(records) = records else {
                warn!("Skipping category '{}': expected a list of products", category);
                continue;
            };

            for (index, record) in records.into_iter().enumerate() {
                match product_from_record(&category, record) {
                    Some(product) => products.push(product),
                    None => {
                        warn!("Skipping malformed product #{} in category '{}'", index, category);
                        skipped += 1;
                    }
                }
            }
        }

        info!(
            "Loaded catalog snapshot with {} products ({} malformed records skipped)",
            products.len(),
            skipped
        );

        Ok(Self::from_products(products))
    }

    /// Load a snapshot from a harvester JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading catalog from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse catalog file {}", path.display()))
    }

    /// Products in scan order
    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// When this snapshot was built
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

fn product_from_record(category: &str, record: Value) -> Option<CatalogProduct> {
    let raw: RawProduct = match serde_json::from_value(record) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("Product record is not an object: {}", e);
            return None;
        }
    };

    let name = raw.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;

    let price = match raw.price.as_ref().map(parse_price_value) {
        Some(Ok(price)) => price,
        Some(Err(e)) => {
            debug!("Unreadable price for '{}': {}", name, e);
            return None;
        }
        None => {
            debug!("Missing price for '{}'", name);
            return None;
        }
    };

    let package = match raw.quantity.as_ref().map(parse_quantity_value) {
        Some(Ok((amount, unit))) => PackageSize::Declared { amount, unit },
        Some(Err(e)) => {
            debug!("Using fallback package size for '{}': {}", name, e);
            PackageSize::Fallback
        }
        None => {
            debug!("Using fallback package size for '{}': no quantity", name);
            PackageSize::Fallback
        }
    };

    Some(CatalogProduct {
        name,
        category: category.to_string(),
        package,
        price,
        link: raw.link.unwrap_or_default(),
    })
}

/// Parse a `"<number> <unit>"` package quantity
///
/// # Examples
///
/// ```rust
/// use basket_engine::catalog::parse_package_quantity;
/// use basket_engine::units::Unit;
///
/// assert_eq!(parse_package_quantity("1,5 л"), Ok((1.5, Unit::Liter)));
/// assert_eq!(parse_package_quantity("900г"), Ok((900.0, Unit::Gram)));
/// assert!(parse_package_quantity("упаковка").is_err());
/// ```
pub fn parse_package_quantity(text: &str) -> Result<(f64, Unit), ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let captures = PACKAGE_QUANTITY_REGEX
        .captures(text)
        .ok_or_else(|| ParseError::MalformedQuantity(text.to_string()))?;

    let amount = parse_decimal(&captures[1])?;
    let unit: Unit = captures[2].parse()?;

    Ok((amount, unit))
}

/// Parse the leading number of a price label such as `"129 ₽"` or `"1 299,50 руб"`
pub fn parse_price(text: &str) -> Result<f64, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let captures = PRICE_REGEX
        .captures(text)
        .ok_or_else(|| ParseError::InvalidNumber(text.to_string()))?;

    let digits: String = captures[1].chars().filter(|c| !c.is_whitespace()).collect();
    parse_decimal(&digits)
}

fn parse_price_value(value: &Value) -> Result<f64, ParseError> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| ParseError::InvalidNumber(number.to_string())),
        Value::String(text) => parse_price(text),
        other => Err(ParseError::InvalidNumber(other.to_string())),
    }
}

fn parse_quantity_value(value: &Value) -> Result<(f64, Unit), ParseError> {
    match value {
        Value::String(text) => parse_package_quantity(text),
        other => Err(ParseError::MalformedQuantity(other.to_string())),
    }
}

fn parse_decimal(text: &str) -> Result<f64, ParseError> {
    text.replace(',', ".")
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber(text.to_string()))
}

/// Holder of the current catalog snapshot
///
/// Readers take an `Arc` to the snapshot and keep it for the whole basket
/// computation. A refresh builds a complete new [`Catalog`] and swaps it in
/// with one write, so in-flight computations keep their old snapshot.
#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// The snapshot currently in place
    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }

    /// Swap in a fully built snapshot, returning the one it replaces
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        info!(
            "Replacing catalog snapshot ({} products) with snapshot loaded at {} ({} products)",
            guard.len(),
            next.loaded_at(),
            next.len()
        );
        std::mem::replace(&mut *guard, next)
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new(Catalog::empty())
    }
}
