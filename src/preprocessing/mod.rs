/// Модуль предобработки данных

pub mod feature_engineering;
pub mod normalization;

pub use feature_engineering::{FeatureEngineer, LegacyRow, RegressorRow};
pub use normalization::DataNormalizer;
