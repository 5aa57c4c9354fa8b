//! # Ingredient Requirements
//!
//! The list of ingredients a user needs, as produced by the extraction
//! collaborator. The JSON contract is an object mapping ingredient name to a
//! `[quantity, unit]` pair:
//!
//! ```json
//! {"соль": [70, "г"], "вода": [7000, "мл"], "лавровый лист": [14, "шт"]}
//! ```
//!
//! Key order is the requirement order and is kept as written.

use crate::errors::{BasketError, UnitError};
use crate::units::{self, BaseQuantity};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One named ingredient with a target quantity
///
/// The unit is kept as the raw token so that an unrecognized unit makes the
/// requirement unmatchable instead of failing the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl Requirement {
    pub fn new(name: &str, quantity: f64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
        }
    }

    /// Required quantity in the base unit of its class
    pub fn base_quantity(&self) -> Result<BaseQuantity, UnitError> {
        units::convert(self.quantity, &self.unit)
    }

    /// Check the structural validity the engine depends on
    pub fn validate(&self) -> Result<(), BasketError> {
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(BasketError::InvalidQuantity {
                name: self.name.clone(),
                quantity: self.quantity,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.quantity, self.unit, self.name)
    }
}

/// Accepted encodings of a single requirement value
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRequirement {
    Pair(f64, String),
    Object { quantity: f64, unit: String },
}

/// Ordered list of requirements
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequirementList {
    requirements: Vec<Requirement>,
}

impl RequirementList {
    pub fn new(requirements: Vec<Requirement>) -> Self {
        Self { requirements }
    }

    /// Parse the extraction collaborator's JSON mapping
    ///
    /// A `null` document is a missing list and fails with
    /// [`BasketError::MissingRequirements`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use basket_engine::requirements::RequirementList;
    ///
    /// let list = RequirementList::from_json_str(r#"{"морковь": [700, "г"], "соль": [70, "г"]}"#)?;
    /// assert_eq!(list.len(), 2);
    /// assert_eq!(list.as_slice()[0].name, "морковь");
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: Value =
            serde_json::from_str(json).context("Requirement list is not valid JSON")?;
        Self::from_value(document)
    }

    /// Build the list from an already parsed JSON document
    pub fn from_value(document: Value) -> Result<Self> {
        let entries: Map<String, Value> = match document {
            Value::Null => return Err(BasketError::MissingRequirements.into()),
            Value::Object(entries) => entries,
            other => anyhow::bail!("Requirement list must be a JSON object, got: {}", other),
        };

        let requirements = entries
            .into_iter()
            .map(|(name, value)| {
                let raw: RawRequirement = serde_json::from_value(value)
                    .with_context(|| format!("Invalid quantity/unit for requirement '{}'", name))?;
                let (quantity, unit) = match raw {
                    RawRequirement::Pair(quantity, unit) => (quantity, unit),
                    RawRequirement::Object { quantity, unit } => (quantity, unit),
                };
                Ok(Requirement { name, quantity, unit })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { requirements })
    }

    pub fn as_slice(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Requirement> {
        self.requirements.iter()
    }
}

impl From<Vec<Requirement>> for RequirementList {
    fn from(requirements: Vec<Requirement>) -> Self {
        Self::new(requirements)
    }
}

impl<'a> IntoIterator for &'a RequirementList {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
