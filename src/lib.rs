//! Agro Pricing ML - движок динамического ценообразования
//!
//! Базовая цена по себестоимости и классу качества, выбор цены обученной
//! моделью или перебором по награде, поправка на конкурента и A/B сегмент.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod preprocessing;
pub mod pricing;
pub mod sources;
pub mod training;
pub mod types;

pub use config::{PricingConfig, ServiceConfig};
pub use error::{ModelError, PricingError, TrainingError};
pub use models::ModelCache;
pub use pricing::{LegacyPricer, PricingEngine};
pub use types::*;
