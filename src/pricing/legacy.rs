//! Устаревший расчет цены (base, competitor, demand index, stock)

use std::sync::Arc;

use crate::config::PricingConfig;
use crate::models::ModelCache;
use crate::types::{round2, LegacyPricingRequest, LegacyPricingResponse};

/// Эвристика без модели: скидка растет со спросом, при малом складе вдвое меньше
pub fn legacy_heuristic_price(base_price: f64, demand_index: f64, stock_level: u32) -> f64 {
    let stock_factor = if stock_level > 50 { 1.0 } else { 0.5 };
    let discount = (0.05 + demand_index * 0.1) * stock_factor;
    (base_price * (1.0 + demand_index) * (1.0 - discount)).max(0.1)
}

pub struct LegacyPricer {
    config: PricingConfig,
    cache: Arc<ModelCache>,
}

impl LegacyPricer {
    pub fn new(config: PricingConfig, cache: Arc<ModelCache>) -> Self {
        Self { config, cache }
    }

    pub fn recommend(&self, req: &LegacyPricingRequest) -> LegacyPricingResponse {
        let heuristic = || legacy_heuristic_price(req.base_price, req.demand_index, req.stock_level);

        let mut price = match self.cache.legacy() {
            Some(model) => {
                let features = [
                    req.base_price,
                    req.competitor_price,
                    req.demand_index,
                    req.stock_level as f64,
                ];
                model.predict_price(&features).unwrap_or_else(|e| {
                    tracing::warn!("Legacy model inference failed: {}", e);
                    heuristic()
                })
            }
            None => heuristic(),
        };

        let min_price = (req.base_price * (1.0 - self.config.max_discount)).max(0.1);
        price = price.max(min_price);

        if self.config.ab_enabled && req.ab_bucket.trim().eq_ignore_ascii_case("B") {
            price *= 0.98;
        }

        LegacyPricingResponse {
            recommended_price: round2(price),
            bucket: req.ab_bucket.clone(),
        }
    }
}
