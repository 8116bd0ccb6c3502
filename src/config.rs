//! Конфигурация из переменных окружения

use std::path::PathBuf;
use std::str::FromStr;

/// Ограничения ценообразования и переключатель A/B теста.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingConfig {
    pub min_margin: f64,
    pub max_discount: f64,
    pub ab_enabled: bool,
}

impl PricingConfig {
    pub fn from_env() -> Self {
        Self {
            min_margin: env_or("PRICING_MIN_MARGIN", 0.15),
            max_discount: env_or("PRICING_MAX_DISCOUNT", 0.30),
            ab_enabled: env_flag("PRICING_AB_ENABLED", true),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            min_margin: 0.15,
            max_discount: 0.30,
            ab_enabled: true,
        }
    }
}

/// Настройки сервиса, источников данных и воркера переобучения.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub pricing: PricingConfig,
    pub model_dir: PathBuf,
    pub bind_addr: String,
    pub competitor_api_url: Option<String>,
    pub competitor_price_path: PathBuf,
    pub competitor_price_factor: f64,
    pub competitor_timeout_ms: u64,
    pub catalog_path: PathBuf,
    pub demand_baseline_path: PathBuf,
    pub demand_baseline_default: f64,
    pub self_training: bool,
    pub retrain_interval_days: u64,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let competitor_api_url = std::env::var("COMPETITOR_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        Self {
            pricing: PricingConfig::from_env(),
            model_dir: env_path("MODEL_DIR", "ml/models"),
            bind_addr: std::env::var("ML_API_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            competitor_api_url,
            competitor_price_path: env_path(
                "COMPETITOR_PRICE_PATH",
                "ml/data/synthetic/competitors.json",
            ),
            competitor_price_factor: env_or("COMPETITOR_PRICE_FACTOR", 0.98),
            competitor_timeout_ms: env_or("COMPETITOR_TIMEOUT_MS", 3000),
            catalog_path: env_path("PRODUCT_CATALOG_PATH", "ml/data/catalog.json"),
            demand_baseline_path: env_path("DEMAND_BASELINE_PATH", "ml/data/demand_baseline.json"),
            demand_baseline_default: env_or("DEMAND_BASELINE_DEFAULT", 10.0),
            self_training: env_flag("ENABLE_SELF_TRAINING", true),
            retrain_interval_days: env_or("RETRAIN_INTERVAL_DAYS", 7),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn env_path(key: &str, default: &str) -> PathBuf {
    PathBuf::from(std::env::var(key).unwrap_or_else(|_| default.to_string()))
}
