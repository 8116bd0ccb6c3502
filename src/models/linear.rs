//! Устаревшая линейная модель цены (base, competitor, demand index, stock)

#![allow(non_snake_case)]

use std::path::Path;

use linfa::traits::Fit;
use linfa::Dataset;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, TrainingError};
use crate::models::PricePredictor;
use crate::preprocessing::feature_engineering::LEGACY_FEATURES;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyLinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LegacyLinearModel {
    pub fn fit(X: &Array2<f64>, y: &Array1<f64>) -> Result<Self, TrainingError> {
        if X.nrows() == 0 {
            return Err(ModelError::EmptyDataset.into());
        }

        let dataset = Dataset::new(X.clone(), y.clone());
        let fitted = LinearRegression::default()
            .fit(&dataset)
            .map_err(|e| TrainingError::Linear(e.to_string()))?;

        Ok(Self {
            coefficients: fitted.params().to_vec(),
            intercept: fitted.intercept(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read(path)?;
        let model: LegacyLinearModel = serde_json::from_slice(&raw)?;
        if model.coefficients.len() != LEGACY_FEATURES {
            return Err(ModelError::ShapeMismatch {
                expected: LEGACY_FEATURES,
                actual: model.coefficients.len(),
            });
        }
        Ok(model)
    }
}

impl PricePredictor for LegacyLinearModel {
    fn predict_price(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.coefficients.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }
        let price = self.intercept
            + features
                .iter()
                .zip(self.coefficients.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>();
        if price.is_finite() {
            Ok(price)
        } else {
            Err(ModelError::NonFinite)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_linear_relationship() {
        let X = Array2::from_shape_fn((40, 4), |(i, j)| ((i * (j + 2)) % 17) as f64 + j as f64);
        let y = X.rows().into_iter().map(|r| 0.5 * r[0] + 0.2 * r[1] - 0.1 * r[2] + 0.01 * r[3] + 3.0).collect::<Array1<f64>>();
        let model = LegacyLinearModel::fit(&X, &y).unwrap();
        assert!((model.intercept - 3.0).abs() < 1e-6);
        assert!((model.coefficients[0] - 0.5).abs() < 1e-6);
        let pred = model.predict_price(&[10.0, 10.0, 10.0, 10.0]).unwrap();
        assert!((pred - (5.0 + 2.0 - 1.0 + 0.1 + 3.0)).abs() < 1e-6);
    }

    #[test]
    fn load_checks_coefficient_count() {
        let model = LegacyLinearModel {
            coefficients: vec![1.0, 2.0],
            intercept: 0.0,
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linear.json");
        model.save(&path).unwrap();
        assert!(matches!(
            LegacyLinearModel::load(&path),
            Err(ModelError::ShapeMismatch { expected: 4, actual: 2 })
        ));
    }
}
