//! Searchable catalog of common foods with per-serving nutrition.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::FoodSubmission;

/// One catalog food, described for its default serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub name: String,
    /// Serving the nutrition values refer to, e.g. "1 medium"
    pub default_quantity: String,
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

impl CatalogItem {
    fn new(name: &str, default_quantity: &str, calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            name: name.to_string(),
            default_quantity: default_quantity.to_string(),
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// A submission for one default serving, ready for
    /// [`normalize`](crate::entry::normalize) or [`LogStore::add`](crate::store::LogStore::add).
    pub fn submission(&self) -> FoodSubmission {
        FoodSubmission::new(&self.name, &self.default_quantity, self.calories).with_macros(
            self.protein,
            self.carbs,
            self.fat,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoodCatalog {
    items: Vec<CatalogItem>,
}

impl FoodCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    /// Parse a JSON array of items (`name`, `defaultQuantity`, `calories`,
    /// optional `protein`, `carbs`, `fat`).
    pub fn from_json(raw: &str) -> Result<Self> {
        let items = serde_json::from_str::<Vec<CatalogItem>>(raw).context("parsing food catalog")?;
        Ok(Self::new(items))
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Items whose name contains `term`, ignoring case. An empty term
    /// matches everything. Catalog order is kept.
    pub fn search(&self, term: &str) -> Vec<&CatalogItem> {
        let needle = term.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .collect()
    }
}

impl Default for FoodCatalog {
    fn default() -> Self {
        Self::new(vec![
            CatalogItem::new("Apple", "1 medium", 95.0, 0.5, 25.0, 0.3),
            CatalogItem::new("Banana", "1 medium", 105.0, 1.3, 27.0, 0.4),
            CatalogItem::new("Boiled Egg", "1 large", 78.0, 6.3, 0.6, 5.3),
            CatalogItem::new("Oatmeal", "1 cup cooked", 158.0, 6.0, 27.0, 3.2),
            CatalogItem::new("Chicken Breast", "100 g", 165.0, 31.0, 0.0, 3.6),
            CatalogItem::new("White Rice", "1 cup cooked", 205.0, 4.3, 45.0, 0.4),
            CatalogItem::new("Brown Rice", "1 cup cooked", 216.0, 5.0, 45.0, 1.8),
            CatalogItem::new("Greek Yogurt", "170 g", 100.0, 17.0, 6.0, 0.7),
            CatalogItem::new("Whole Wheat Bread", "1 slice", 81.0, 4.0, 14.0, 1.1),
            CatalogItem::new("Almonds", "28 g", 164.0, 6.0, 6.0, 14.0),
        ])
    }
}
