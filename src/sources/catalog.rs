//! Каталог продуктов: себестоимость единицы

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub trait ProductCatalog: Send + Sync {
    fn unit_cost(&self, product_id: &str) -> Option<f64>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub unit_cost: f64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Каталог из JSON файла вида {"prod_1": {"unit_cost": 2.0}}
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl JsonCatalog {
    pub fn from_entries(entries: HashMap<String, CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Отсутствующий или битый файл дает пустой каталог
    pub fn load(path: &Path) -> Self {
        let entries = match std::fs::read(path) {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_else(|e| {
                tracing::warn!("Invalid product catalog {}: {}", path.display(), e);
                HashMap::new()
            }),
            Err(_) => {
                tracing::info!("No product catalog at {}, unit costs default to 0", path.display());
                HashMap::new()
            }
        };
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProductCatalog for JsonCatalog {
    fn unit_cost(&self, product_id: &str) -> Option<f64> {
        self.entries
            .get(product_id)
            .map(|e| e.unit_cost)
            .filter(|c| c.is_finite() && *c >= 0.0)
    }
}
