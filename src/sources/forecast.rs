//! Базовый прогноз спроса (количество на первый день)

use std::collections::HashMap;
use std::path::Path;

pub trait DemandForecaster: Send + Sync {
    fn first_day_quantity(&self, product_id: &str) -> Option<f64>;
}

/// Таблица прогнозов по продуктам с общим значением по умолчанию
#[derive(Debug, Clone, Default)]
pub struct BaselineForecaster {
    table: HashMap<String, f64>,
    default: Option<f64>,
}

impl BaselineForecaster {
    pub fn new(table: HashMap<String, f64>, default: Option<f64>) -> Self {
        Self { table, default }
    }

    pub fn load(path: &Path, default: Option<f64>) -> Self {
        let table = std::fs::read(path)
            .ok()
            .and_then(|raw| match serde_json::from_slice::<HashMap<String, f64>>(&raw) {
                Ok(table) => Some(table),
                Err(e) => {
                    tracing::warn!("Invalid demand baseline file {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or_default();
        Self::new(table, default)
    }
}

impl DemandForecaster for BaselineForecaster {
    fn first_day_quantity(&self, product_id: &str) -> Option<f64> {
        self.table
            .get(product_id)
            .copied()
            .or(self.default)
            .map(|q| q.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_then_default() {
        let mut table = HashMap::new();
        table.insert("prod_1".to_string(), 4.0);
        table.insert("prod_neg".to_string(), -3.0);
        let forecaster = BaselineForecaster::new(table, Some(10.0));
        assert_eq!(forecaster.first_day_quantity("prod_1"), Some(4.0));
        assert_eq!(forecaster.first_day_quantity("prod_neg"), Some(0.0));
        assert_eq!(forecaster.first_day_quantity("other"), Some(10.0));
        assert_eq!(BaselineForecaster::default().first_day_quantity("other"), None);
    }
}
