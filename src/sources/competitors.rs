//! Цена конкурента: HTTP фид -> локальный файл -> доля от базовой цены
//!
//! Любая ошибка на шаге (таймаут, обрыв, кривой ответ) ведет к следующему шагу,
//! вызывающий код всегда получает цену не ниже 0.1.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use serde_json::Value;

use crate::config::ServiceConfig;

const MIN_COMPETITOR_PRICE: f64 = 0.1;

pub struct CompetitorPriceSource {
    client: reqwest::Client,
    api_url: Option<String>,
    file_path: PathBuf,
    factor: f64,
    file_prices: OnceLock<HashMap<String, f64>>,
}

impl CompetitorPriceSource {
    pub fn new(api_url: Option<String>, file_path: PathBuf, factor: f64, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build competitor HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            api_url,
            file_path,
            factor,
            file_prices: OnceLock::new(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            config.competitor_api_url.clone(),
            config.competitor_price_path.clone(),
            config.competitor_price_factor,
            Duration::from_millis(config.competitor_timeout_ms),
        )
    }

    pub async fn price_for(&self, product_id: &str, base_price: f64) -> f64 {
        if let Some(price) = self.fetch_http(product_id).await {
            return price.max(MIN_COMPETITOR_PRICE);
        }
        if let Some(price) = self.from_file(product_id) {
            return price.max(MIN_COMPETITOR_PRICE);
        }
        (base_price * self.factor).max(MIN_COMPETITOR_PRICE)
    }

    async fn fetch_http(&self, product_id: &str) -> Option<f64> {
        let url = self.api_url.as_deref()?;

        let response = match self
            .client
            .get(url)
            .query(&[("product_id", product_id)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Competitor feed request failed for {}: {}", product_id, e);
                return None;
            }
        };

        match response.json::<Value>().await {
            Ok(body) => {
                let price = parse_price(&body);
                if price.is_none() {
                    tracing::warn!("Malformed competitor feed response for {}: {}", product_id, body);
                }
                price
            }
            Err(e) => {
                tracing::warn!("Competitor feed body unreadable for {}: {}", product_id, e);
                None
            }
        }
    }

    fn from_file(&self, product_id: &str) -> Option<f64> {
        self.file_prices
            .get_or_init(|| load_price_file(&self.file_path))
            .get(product_id)
            .copied()
    }
}

/// Ответ фида: {"price": x} или просто число
fn parse_price(body: &Value) -> Option<f64> {
    let price = match body {
        Value::Object(map) => value_as_f64(map.get("price")?),
        other => other.as_f64(),
    }?;
    price.is_finite().then_some(price)
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

fn load_price_file(path: &Path) -> HashMap<String, f64> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(_) => return HashMap::new(),
    };

    match serde_json::from_slice::<Value>(&raw) {
        Ok(Value::Object(map)) => map
            .iter()
            .filter_map(|(id, v)| value_as_f64(v).filter(|p| p.is_finite()).map(|p| (id.clone(), p)))
            .collect(),
        Ok(_) => HashMap::new(),
        Err(e) => {
            tracing::warn!("Invalid competitor price file {}: {}", path.display(), e);
            HashMap::new()
        }
    }
}
