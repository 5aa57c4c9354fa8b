//! # Basket Engine Demo
//!
//! Builds a basket for a small borscht recipe. The catalog is read from
//! `BASKET_CATALOG_PATH` when set, otherwise a built-in sample is used.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example basket_demo
//! ```

use anyhow::Result;
use basket_engine::basket::build_basket;
use basket_engine::catalog::{Catalog, CatalogStore};
use basket_engine::config::EngineConfig;
use basket_engine::requirements::RequirementList;
use log::info;

const SAMPLE_CATALOG: &str = r#"{
    "Бакалея": [
        {"name": "Соль морская", "quantity": "1 кг", "price": "50 ₽", "link": "https://example.org/salt-sea"},
        {"name": "Соль поваренная", "quantity": "500 г", "price": "20 ₽", "link": "https://example.org/salt-table"},
        {"name": "Томатная паста", "quantity": "270 г", "price": "85 ₽", "link": "https://example.org/tomato-paste"}
    ],
    "Овощи": [
        {"name": "Свекла", "quantity": "1 кг", "price": "55 ₽", "link": "https://example.org/beet"},
        {"name": "Морковь", "quantity": "1 кг", "price": "70 ₽", "link": "https://example.org/carrot"},
        {"name": "Лук репчатый", "quantity": "1 кг", "price": "45 ₽", "link": "https://example.org/onion"}
    ],
    "Мясо": [
        {"name": "Говядина лопатка", "quantity": "0,8 кг", "price": "640 ₽", "link": "https://example.org/beef"}
    ]
}"#;

const SAMPLE_REQUIREMENTS: &str = r#"{
    "свекла": [2100, "г"],
    "морковь": [700, "г"],
    "лук репчатый": [700, "г"],
    "томатная паста": [420, "г"],
    "говядина": [2100, "г"],
    "соль": [70, "г"],
    "уксус": [70, "мл"]
}"#;

fn main() -> Result<()> {
    env_logger::init();

    let config = EngineConfig::from_env();

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => {
            info!("BASKET_CATALOG_PATH not set, using the built-in sample catalog");
            Catalog::from_json_str(SAMPLE_CATALOG)?
        }
    };
    let store = CatalogStore::new(catalog);

    let requirements = RequirementList::from_json_str(SAMPLE_REQUIREMENTS)?;
    let snapshot = store.snapshot();
    let basket = build_basket(requirements.as_slice(), &snapshot, &config.match_policy)?;

    println!("Basket for {} ingredients:", basket.len());
    for (i, item) in basket.items().iter().enumerate() {
        match item.candidate() {
            Some(candidate) => println!(
                "{}. {} - {} x{}, {} ({})",
                i + 1,
                item.name,
                candidate.product.name,
                candidate.packs_needed,
                candidate.total_price,
                candidate.product.link
            ),
            None => println!("{}. {} - not found", i + 1, item.name),
        }
    }
    println!("\nTotal: {}", basket.total_price());

    Ok(())
}
