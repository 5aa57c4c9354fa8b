//! # Matcher
//!
//! Decides whether a catalog product can satisfy a requirement and, if so,
//! prices it.
//!
//! ## Name compatibility
//!
//! Both names are case-folded and split on whitespace. A product is a
//! candidate when every requirement token appears among the product's tokens
//! (in any order) and the two token counts differ by at most the configured
//! slack. The slack rejects over-generic matches, such as a one-word
//! requirement against a six-word product name, while tolerating a few
//! modifiers ("salt" vs "sea salt"). Tokens are compared exactly; there is no
//! stemming or edit distance.
//!
//! ## Quantity compatibility
//!
//! The requirement and the product package are normalized to base units. An
//! unrecognized unit or a measurement class mismatch rejects the product.
//! Products without a known package size are priced as if they held
//! [`FALLBACK_PACKAGE_BASE`] base units of the requirement's class, which keeps
//! them in the ranking at the cost of an approximate unit cost.

use crate::catalog::{CatalogProduct, PackageSize, FALLBACK_PACKAGE_BASE};
use crate::errors::{PackError, UnitError};
use crate::packs::packs_needed;
use crate::requirements::Requirement;
use crate::units::{BaseQuantity, MeasurementClass};
use log::trace;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Default bound on the token count difference between product and requirement names
pub const DEFAULT_TOKEN_SLACK: usize = 3;

/// Tunable matching policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchPolicy {
    /// Maximum allowed token count difference; `None` disables the bound
    pub max_token_slack: Option<usize>,
}

impl MatchPolicy {
    /// Policy without a token count bound
    pub fn unbounded() -> Self {
        Self {
            max_token_slack: None,
        }
    }

    /// Policy with the given token count bound
    pub fn with_slack(slack: usize) -> Self {
        Self {
            max_token_slack: Some(slack),
        }
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self::with_slack(DEFAULT_TOKEN_SLACK)
    }
}

/// A product judged able to satisfy a requirement, with its pricing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate<'a> {
    pub product: &'a CatalogProduct,
    pub packs_needed: u32,
    pub total_price: f64,
    pub unit_cost: f64,
    /// Package size in base units used for the computation
    pub package_base: f64,
}

/// Why a product was not a candidate for a requirement
#[derive(Debug, Clone, PartialEq)]
pub enum MatchRejection {
    /// Names are not token-compatible
    NameMismatch,
    /// The requirement's unit is not recognized
    Unit(UnitError),
    /// Requirement and package measure different things
    ClassMismatch {
        required: MeasurementClass,
        package: MeasurementClass,
    },
    /// Package count could not be computed
    Pack(PackError),
    /// The product's price is negative or not a number
    InvalidPrice(f64),
}

impl fmt::Display for MatchRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRejection::NameMismatch => write!(f, "name mismatch"),
            MatchRejection::Unit(e) => write!(f, "{e}"),
            MatchRejection::ClassMismatch { required, package } => {
                write!(f, "class mismatch: required {required:?}, package {package:?}")
            }
            MatchRejection::Pack(e) => write!(f, "{e}"),
            MatchRejection::InvalidPrice(price) => write!(f, "invalid price {price}"),
        }
    }
}

fn tokenize(name: &str) -> Vec<String> {
    name.split_whitespace().map(str::to_lowercase).collect()
}

/// Check whether `product_name` is token-compatible with `requirement_name`
///
/// # Examples
///
/// ```rust
/// use basket_engine::matcher::{names_compatible, MatchPolicy};
///
/// let policy = MatchPolicy::default();
/// assert!(names_compatible("salt", "Sea Salt", &policy));
/// assert!(names_compatible("лук репчатый", "Репчатый лук молодой", &policy));
/// assert!(!names_compatible("salt", "salted caramel", &policy));
/// assert!(!names_compatible("salt", "salt and pepper grinder set deluxe", &policy));
/// ```
pub fn names_compatible(requirement_name: &str, product_name: &str, policy: &MatchPolicy) -> bool {
    let required = tokenize(requirement_name);
    if required.is_empty() {
        return false;
    }
    let offered = tokenize(product_name);

    if let Some(slack) = policy.max_token_slack {
        if offered.len().abs_diff(required.len()) > slack {
            return false;
        }
    }

    let offered: HashSet<&str> = offered.iter().map(String::as_str).collect();
    required.iter().all(|token| offered.contains(token.as_str()))
}

fn package_base(product: &CatalogProduct, required: &BaseQuantity) -> BaseQuantity {
    match product.package {
        PackageSize::Declared { amount, unit } => unit.to_base(amount),
        PackageSize::Fallback => BaseQuantity {
            amount: FALLBACK_PACKAGE_BASE,
            class: required.class,
        },
    }
}

/// Try to turn `product` into a priced candidate for `requirement`
pub fn try_match<'a>(
    requirement: &Requirement,
    product: &'a CatalogProduct,
    policy: &MatchPolicy,
) -> Result<MatchCandidate<'a>, MatchRejection> {
    if !names_compatible(&requirement.name, &product.name, policy) {
        return Err(MatchRejection::NameMismatch);
    }

    if !product.price.is_finite() || product.price < 0.0 {
        return Err(MatchRejection::InvalidPrice(product.price));
    }

    let required = requirement.base_quantity().map_err(MatchRejection::Unit)?;
    let package = package_base(product, &required);

    if required.class != package.class {
        return Err(MatchRejection::ClassMismatch {
            required: required.class,
            package: package.class,
        });
    }

    let packs = packs_needed(required.amount, package.amount).map_err(MatchRejection::Pack)?;

    let candidate = MatchCandidate {
        product,
        packs_needed: packs,
        total_price: product.price * f64::from(packs),
        unit_cost: product.price / package.amount,
        package_base: package.amount,
    };

    trace!(
        "Candidate '{}' for '{}': {} pack(s), total {}, unit cost {}",
        product.name,
        requirement.name,
        candidate.packs_needed,
        candidate.total_price,
        candidate.unit_cost
    );

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Unit;

    #[test]
    fn test_token_containment_is_order_independent() {
        let policy = MatchPolicy::default();
        assert!(names_compatible("black pepper", "pepper black ground", &policy));
        assert!(names_compatible("SALT", "salt", &policy));
        assert!(!names_compatible("black pepper", "pepper", &policy));
    }

    #[test]
    fn test_exact_token_comparison() {
        let policy = MatchPolicy::default();
        assert!(!names_compatible("tomato", "tomatoes canned", &policy));
        assert!(!names_compatible("картофель", "картофельное пюре", &policy));
    }

    #[test]
    fn test_slack_bound() {
        let policy = MatchPolicy::with_slack(3);
        assert!(names_compatible("salt", "fine iodized sea salt", &policy));
        assert!(!names_compatible("salt", "fine iodized sea salt extra", &policy));
        assert!(names_compatible(
            "salt",
            "fine iodized sea salt extra",
            &MatchPolicy::unbounded()
        ));
    }

    #[test]
    fn test_empty_requirement_name_never_matches() {
        assert!(!names_compatible("   ", "anything", &MatchPolicy::unbounded()));
    }

    #[test]
    fn test_candidate_pricing() {
        let product = CatalogProduct::new("table salt", 20.0).with_package(500.0, Unit::Gram);
        let requirement = Requirement::new("salt", 70.0, "g");

        let candidate = try_match(&requirement, &product, &MatchPolicy::default()).unwrap();
        assert_eq!(candidate.packs_needed, 1);
        assert_eq!(candidate.total_price, 20.0);
        assert_eq!(candidate.unit_cost, 0.04);
        assert_eq!(candidate.package_base, 500.0);
    }

    #[test]
    fn test_multiple_packs() {
        let product = CatalogProduct::new("молоко", 90.0).with_package(0.9, Unit::Liter);
        let requirement = Requirement::new("молоко", 2.0, "л");

        let candidate = try_match(&requirement, &product, &MatchPolicy::default()).unwrap();
        assert_eq!(candidate.packs_needed, 3);
        assert_eq!(candidate.total_price, 270.0);
    }

    #[test]
    fn test_class_mismatch_is_rejected() {
        let product = CatalogProduct::new("milk powder", 100.0).with_package(400.0, Unit::Gram);
        let requirement = Requirement::new("milk", 1.0, "l");

        assert_eq!(
            try_match(&requirement, &product, &MatchPolicy::default()),
            Err(MatchRejection::ClassMismatch {
                required: MeasurementClass::Volume,
                package: MeasurementClass::Mass,
            })
        );
    }

    #[test]
    fn test_unknown_requirement_unit_is_rejected() {
        let product = CatalogProduct::new("flour", 60.0).with_package(1.0, Unit::Kilogram);
        let requirement = Requirement::new("flour", 2.0, "cups");

        assert!(matches!(
            try_match(&requirement, &product, &MatchPolicy::default()),
            Err(MatchRejection::Unit(_))
        ));
    }

    #[test]
    fn test_fallback_package_takes_requirement_class() {
        let product = CatalogProduct::new("вода питьевая", 50.0);
        let requirement = Requirement::new("вода", 2500.0, "мл");

        let candidate = try_match(&requirement, &product, &MatchPolicy::default()).unwrap();
        assert_eq!(candidate.package_base, FALLBACK_PACKAGE_BASE);
        assert_eq!(candidate.packs_needed, 3);
        assert_eq!(candidate.unit_cost, 0.05);
    }

    #[test]
    fn test_zero_quantity_is_a_pack_error() {
        let product = CatalogProduct::new("salt", 20.0).with_package(500.0, Unit::Gram);
        let requirement = Requirement::new("salt", 0.0, "g");

        assert!(matches!(
            try_match(&requirement, &product, &MatchPolicy::default()),
            Err(MatchRejection::Pack(PackError::NonPositiveRequired(_)))
        ));
    }

    #[test]
    fn test_invalid_price_is_rejected() {
        let product = CatalogProduct::new("salt", -1.0).with_package(500.0, Unit::Gram);
        let requirement = Requirement::new("salt", 10.0, "g");

        assert_eq!(
            try_match(&requirement, &product, &MatchPolicy::default()),
            Err(MatchRejection::InvalidPrice(-1.0))
        );
    }
}
