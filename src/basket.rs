//! # Basket Optimizer
//!
//! Builds a priced shopping basket from a requirement list and a catalog
//! snapshot.
//!
//! Each requirement is resolved on its own, in input order. The whole catalog
//! is scanned once per requirement and the candidate with the lowest unit
//! cost (price per base unit) is kept; a later candidate replaces it only
//! when strictly cheaper per unit, so the first one found wins ties. Ranking
//! by unit cost rather than shelf price keeps large packages from winning
//! just because they are large.
//!
//! A requirement with no candidate becomes an unresolved item. Problems with
//! individual products only remove that product from consideration; the
//! returned basket always has one item per requirement.
//!
//! ## Usage
//!
//! ```rust
//! use basket_engine::basket::build_basket;
//! use basket_engine::catalog::{Catalog, CatalogProduct};
//! use basket_engine::matcher::MatchPolicy;
//! use basket_engine::requirements::Requirement;
//! use basket_engine::units::Unit;
//!
//! let catalog = Catalog::from_products(vec![
//!     CatalogProduct::new("sea salt", 50.0).with_package(1.0, Unit::Kilogram),
//!     CatalogProduct::new("table salt", 20.0).with_package(500.0, Unit::Gram),
//! ]);
//! let requirements = vec![Requirement::new("salt", 70.0, "gram")];
//!
//! let basket = build_basket(&requirements, &catalog, &MatchPolicy::default()).unwrap();
//! let chosen = basket.items()[0].candidate().unwrap();
//! assert_eq!(chosen.product.name, "table salt");
//! assert_eq!(chosen.packs_needed, 1);
//! assert_eq!(basket.total_price(), 20.0);
//! ```

use crate::catalog::Catalog;
use crate::errors::BasketError;
use crate::matcher::{try_match, MatchCandidate, MatchPolicy, MatchRejection};
use crate::requirements::Requirement;
use log::{debug, info, trace};
use serde::Serialize;
use std::fmt;

/// Outcome for a single requirement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Resolution<'a> {
    /// The cheapest compatible product per unit
    Resolved(MatchCandidate<'a>),
    /// No compatible product exists in the catalog
    Unresolved,
}

/// One basket line, named after its requirement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasketItem<'a> {
    pub name: String,
    pub resolution: Resolution<'a>,
}

impl<'a> BasketItem<'a> {
    pub fn is_resolved(&self) -> bool {
        matches!(self.resolution, Resolution::Resolved(_))
    }

    /// The selected candidate, if any
    pub fn candidate(&self) -> Option<&MatchCandidate<'a>> {
        match &self.resolution {
            Resolution::Resolved(candidate) => Some(candidate),
            Resolution::Unresolved => None,
        }
    }

    /// Total price of this line, zero when unresolved
    pub fn total_price(&self) -> f64 {
        self.candidate().map_or(0.0, |c| c.total_price)
    }
}

/// Ordered basket, one item per requirement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Basket<'a> {
    items: Vec<BasketItem<'a>>,
}

impl<'a> Basket<'a> {
    /// Items in requirement order
    pub fn items(&self) -> &[BasketItem<'a>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the resolved items' total prices
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(BasketItem::total_price).sum()
    }

    pub fn resolved_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_resolved()).count()
    }

    /// Names of the requirements no product could satisfy
    pub fn unresolved_names(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| !item.is_resolved())
            .map(|item| item.name.as_str())
            .collect()
    }
}

/// Pick the minimum unit cost candidate for one requirement
fn resolve_requirement<'a>(
    requirement: &Requirement,
    catalog: &'a Catalog,
    policy: &MatchPolicy,
) -> Option<MatchCandidate<'a>> {
    let mut best: Option<MatchCandidate<'a>> = None;

    for product in catalog.products() {
        let candidate = match try_match(requirement, product, policy) {
            Ok(candidate) => candidate,
            Err(MatchRejection::NameMismatch) => continue,
            Err(rejection) => {
                debug!(
                    "Discarding '{}' for '{}': {}",
                    product.name, requirement.name, rejection
                );
                continue;
            }
        };

        let improves = best
            .as_ref()
            .map_or(true, |current| candidate.unit_cost < current.unit_cost);
        if improves {
            trace!(
                "New best for '{}': '{}' at unit cost {}",
                requirement.name,
                product.name,
                candidate.unit_cost
            );
            best = Some(candidate);
        }
    }

    best
}

/// Build the basket for `requirements` against one catalog snapshot
///
/// Fails only on structurally invalid input (a negative or non-finite
/// required quantity). Everything else yields a full-length basket.
pub fn build_basket<'a>(
    requirements: &[Requirement],
    catalog: &'a Catalog,
    policy: &MatchPolicy,
) -> Result<Basket<'a>, BasketError> {
    for requirement in requirements {
        requirement.validate()?;
    }

    info!(
        "Building basket for {} requirements against {} catalog products",
        requirements.len(),
        catalog.len()
    );

    let items: Vec<BasketItem<'a>> = requirements
        .iter()
        .map(|requirement| {
            let resolution = match resolve_requirement(requirement, catalog, policy) {
                Some(candidate) => {
                    debug!(
                        "Resolved '{}' -> '{}' x{} = {}",
                        requirement.name,
                        candidate.product.name,
                        candidate.packs_needed,
                        candidate.total_price
                    );
                    Resolution::Resolved(candidate)
                }
                None => {
                    debug!("No compatible product for '{}'", requirement.name);
                    Resolution::Unresolved
                }
            };
            BasketItem {
                name: requirement.name.clone(),
                resolution,
            }
        })
        .collect();

    let basket = Basket { items };

    info!(
        "Basket ready: {}/{} resolved, total {:.2}",
        basket.resolved_count(),
        basket.len(),
        basket.total_price()
    );

    Ok(basket)
}

impl fmt::Display for Basket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            match item.candidate() {
                Some(candidate) => writeln!(
                    f,
                    "{}. {} -> {} x{} = {}",
                    i + 1,
                    item.name,
                    candidate.product.name,
                    candidate.packs_needed,
                    candidate.total_price
                )?,
                None => writeln!(f, "{}. {} -> not found", i + 1, item.name)?,
            }
        }
        write!(f, "Total: {}", self.total_price())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogProduct;
    use crate::units::Unit;

    fn salt_catalog() -> Catalog {
        Catalog::from_products(vec![
            CatalogProduct::new("sea salt", 50.0)
                .with_package(1.0, Unit::Kilogram)
                .with_link("/sea-salt"),
            CatalogProduct::new("table salt", 20.0)
                .with_package(500.0, Unit::Gram)
                .with_link("/table-salt"),
        ])
    }

    #[test]
    fn test_lowest_unit_cost_wins() {
        let catalog = salt_catalog();
        let requirements = vec![Requirement::new("salt", 70.0, "gram")];

        let basket = build_basket(&requirements, &catalog, &MatchPolicy::default()).unwrap();
        let candidate = basket.items()[0].candidate().unwrap();

        assert_eq!(candidate.product.name, "table salt");
        assert_eq!(candidate.product.link, "/table-salt");
        assert_eq!(candidate.packs_needed, 1);
        assert_eq!(candidate.total_price, 20.0);
        assert_eq!(basket.total_price(), 20.0);
    }

    #[test]
    fn test_unit_cost_beats_shelf_price() {
        // 5 kg sack is cheaper per gram although it costs more on the shelf
        let catalog = Catalog::from_products(vec![
            CatalogProduct::new("flour", 60.0).with_package(1.0, Unit::Kilogram),
            CatalogProduct::new("flour sack", 200.0).with_package(5.0, Unit::Kilogram),
        ]);
        let requirements = vec![Requirement::new("flour", 800.0, "g")];

        let basket = build_basket(&requirements, &catalog, &MatchPolicy::default()).unwrap();
        let candidate = basket.items()[0].candidate().unwrap();
        assert_eq!(candidate.product.name, "flour sack");
        assert_eq!(candidate.total_price, 200.0);
    }

    #[test]
    fn test_first_found_wins_ties() {
        let catalog = Catalog::from_products(vec![
            CatalogProduct::new("sugar white", 40.0).with_package(500.0, Unit::Gram),
            CatalogProduct::new("sugar cane", 80.0).with_package(1.0, Unit::Kilogram),
        ]);
        let requirements = vec![Requirement::new("sugar", 70.0, "g")];

        let basket = build_basket(&requirements, &catalog, &MatchPolicy::default()).unwrap();
        assert_eq!(basket.items()[0].candidate().unwrap().product.name, "sugar white");
    }

    #[test]
    fn test_unresolved_items_keep_their_place() {
        let catalog = salt_catalog();
        let requirements = vec![
            Requirement::new("pepper", 10.0, "g"),
            Requirement::new("salt", 70.0, "g"),
            Requirement::new("salt", 1.0, "l"),
        ];

        let basket = build_basket(&requirements, &catalog, &MatchPolicy::default()).unwrap();
        assert_eq!(basket.len(), 3);
        assert!(!basket.items()[0].is_resolved());
        assert!(basket.items()[1].is_resolved());
        assert!(!basket.items()[2].is_resolved());
        assert_eq!(basket.unresolved_names(), vec!["pepper", "salt"]);
        assert_eq!(basket.resolved_count(), 1);
        assert_eq!(basket.total_price(), 20.0);
    }

    #[test]
    fn test_same_product_serves_several_requirements() {
        let catalog = salt_catalog();
        let requirements = vec![
            Requirement::new("salt", 400.0, "g"),
            Requirement::new("salt", 700.0, "g"),
        ];

        let basket = build_basket(&requirements, &catalog, &MatchPolicy::default()).unwrap();
        assert_eq!(basket.items()[0].candidate().unwrap().product.name, "table salt");
        assert_eq!(basket.items()[1].candidate().unwrap().product.name, "table salt");
        assert_eq!(basket.items()[1].candidate().unwrap().packs_needed, 2);
        assert_eq!(basket.total_price(), 60.0);
    }

    #[test]
    fn test_negative_quantity_aborts() {
        let catalog = salt_catalog();
        let requirements = vec![
            Requirement::new("salt", 70.0, "g"),
            Requirement::new("sugar", -5.0, "g"),
        ];

        assert_eq!(
            build_basket(&requirements, &catalog, &MatchPolicy::default()),
            Err(BasketError::InvalidQuantity {
                name: "sugar".to_string(),
                quantity: -5.0
            })
        );
    }

    #[test]
    fn test_display() {
        let catalog = salt_catalog();
        let requirements = vec![
            Requirement::new("salt", 70.0, "g"),
            Requirement::new("pepper", 10.0, "g"),
        ];

        let basket = build_basket(&requirements, &catalog, &MatchPolicy::default()).unwrap();
        let display = basket.to_string();
        assert!(display.contains("1. salt -> table salt x1 = 20"));
        assert!(display.contains("2. pepper -> not found"));
        assert!(display.ends_with("Total: 20"));
    }
}
