/// Обученные модели ценообразования и их кэш

pub mod cache;
pub mod gbt;
pub mod linear;
pub mod policy;
pub mod tree;

pub use cache::{LoadedModels, ModelCache};
pub use gbt::{BoostingParams, GradientBoostedRegressor};
pub use linear::LegacyLinearModel;
pub use policy::{QNetwork, POLICY_ACTIONS};

use crate::error::ModelError;

/// Регрессор, предсказывающий цену по вектору признаков
pub trait PricePredictor: Send + Sync {
    fn predict_price(&self, features: &[f64]) -> Result<f64, ModelError>;
}

/// Сеть ценности действий: состояние -> оценка каждой из 5 корректировок
pub trait PolicyNetwork: Send + Sync {
    fn action_values(&self, state: &[f64]) -> Result<[f64; 5], ModelError>;
}
