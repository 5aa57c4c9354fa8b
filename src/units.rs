//! # Unit Normalizer
//!
//! Converts a (quantity, unit) pair into a quantity of the base unit of its
//! measurement class. Three classes are recognized:
//!
//! - **Mass**: gram (base), kilogram
//! - **Volume**: milliliter (base), liter
//! - **Count**: piece (base)
//!
//! Quantities never convert across classes. Comparing a mass against a volume
//! is "not comparable", which callers treat as a non-match rather than a
//! numeric error.
//!
//! ## Usage
//!
//! ```rust
//! use basket_engine::units::{convert, MeasurementClass};
//!
//! let one_kilo = convert(1.0, "kg").unwrap();
//! assert_eq!(one_kilo.amount, 1000.0);
//! assert_eq!(one_kilo.class, MeasurementClass::Mass);
//! assert!(convert(1.0, "cup").is_err());
//! ```

use crate::errors::UnitError;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Measurement class of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementClass {
    Mass,
    Volume,
    Count,
}

/// Recognized measurement units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Grams
    Gram,
    /// Kilograms
    Kilogram,
    /// Milliliters
    Milliliter,
    /// Liters
    Liter,
    /// Individual pieces
    Piece,
}

/// A quantity expressed in the base unit of its measurement class
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaseQuantity {
    pub amount: f64,
    pub class: MeasurementClass,
}

/// Unit tokens and their variations, English and the store's Russian abbreviations
static UNIT_ALIASES: LazyLock<HashMap<&'static str, Unit>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Mass
    map.insert("g", Unit::Gram);
    map.insert("gr", Unit::Gram);
    map.insert("gram", Unit::Gram);
    map.insert("grams", Unit::Gram);
    map.insert("gramme", Unit::Gram);
    map.insert("grammes", Unit::Gram);
    map.insert("kg", Unit::Kilogram);
    map.insert("kilogram", Unit::Kilogram);
    map.insert("kilograms", Unit::Kilogram);

    // Volume
    map.insert("ml", Unit::Milliliter);
    map.insert("milliliter", Unit::Milliliter);
    map.insert("milliliters", Unit::Milliliter);
    map.insert("millilitre", Unit::Milliliter);
    map.insert("millilitres", Unit::Milliliter);
    map.insert("l", Unit::Liter);
    map.insert("liter", Unit::Liter);
    map.insert("liters", Unit::Liter);
    map.insert("litre", Unit::Liter);
    map.insert("litres", Unit::Liter);

    // Count
    map.insert("pc", Unit::Piece);
    map.insert("pcs", Unit::Piece);
    map.insert("piece", Unit::Piece);
    map.insert("pieces", Unit::Piece);

    // Russian
    map.insert("г", Unit::Gram);
    map.insert("гр", Unit::Gram);
    map.insert("кг", Unit::Kilogram);
    map.insert("мл", Unit::Milliliter);
    map.insert("л", Unit::Liter);
    map.insert("шт", Unit::Piece);

    map
});

impl Unit {
    /// Measurement class this unit belongs to
    pub fn class(self) -> MeasurementClass {
        match self {
            Unit::Gram | Unit::Kilogram => MeasurementClass::Mass,
            Unit::Milliliter | Unit::Liter => MeasurementClass::Volume,
            Unit::Piece => MeasurementClass::Count,
        }
    }

    /// Factor converting this unit into the base unit of its class
    pub fn multiplier(self) -> f64 {
        match self {
            Unit::Gram | Unit::Milliliter | Unit::Piece => 1.0,
            Unit::Kilogram | Unit::Liter => 1000.0,
        }
    }

    /// Short symbol used when rendering quantities
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Milliliter => "ml",
            Unit::Liter => "l",
            Unit::Piece => "pcs",
        }
    }

    /// Convert an amount of this unit into its base quantity
    pub fn to_base(self, quantity: f64) -> BaseQuantity {
        BaseQuantity {
            amount: quantity * self.multiplier(),
            class: self.class(),
        }
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let normalized = token.trim().trim_end_matches('.').to_lowercase();
        UNIT_ALIASES
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| UnitError::Unrecognized(token.to_string()))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Convert `quantity` of the unit named by `unit` into its base quantity
///
/// Fails with [`UnitError`] if the token is not a recognized unit.
pub fn convert(quantity: f64, unit: &str) -> Result<BaseQuantity, UnitError> {
    let unit: Unit = unit.parse()?;
    let base = unit.to_base(quantity);
    trace!("Converted {} {} -> {} ({:?})", quantity, unit, base.amount, base.class);
    Ok(base)
}
