//! Градиентный бустинг деревьев регрессии (squared error)

#![allow(non_snake_case)]

use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::models::tree::RegressionTree;
use crate::models::PricePredictor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub subsample: f64,
    pub seed: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            learning_rate: 0.1,
            max_depth: 6,
            min_samples_split: 4,
            subsample: 0.9,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    params: BoostingParams,
    n_features: usize,
    base_score: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedRegressor {
    pub fn fit(X: &Array2<f64>, y: &Array1<f64>, params: BoostingParams) -> Result<Self, ModelError> {
        let n_samples = X.nrows();
        if n_samples == 0 || X.ncols() == 0 {
            return Err(ModelError::EmptyDataset);
        }
        if y.len() != n_samples {
            return Err(ModelError::ShapeMismatch {
                expected: n_samples,
                actual: y.len(),
            });
        }

        let base_score = y.mean().unwrap_or(0.0);
        let mut predictions = Array1::from_elem(n_samples, base_score);
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_estimators);

        for _ in 0..params.n_estimators {
            // Для MSE антиградиент - это остатки
            let residuals = y - &predictions;

            let mut rows: Vec<usize> = (0..n_samples)
                .filter(|_| params.subsample >= 1.0 || rng.gen::<f64>() < params.subsample)
                .collect();
            if rows.is_empty() {
                rows = (0..n_samples).collect();
            }

            let mut tree = RegressionTree::new(params.max_depth, params.min_samples_split);
            tree.fit(X, &residuals, rows)?;

            for (i, row) in X.rows().into_iter().enumerate() {
                predictions[i] += params.learning_rate * tree.predict_row(row)?;
            }
            trees.push(tree);
        }

        Ok(Self {
            params,
            n_features: X.ncols(),
            base_score,
            trees,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn predict_row(&self, sample: ArrayView1<f64>) -> Result<f64, ModelError> {
        if sample.len() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                actual: sample.len(),
            });
        }

        let mut value = self.base_score;
        for tree in &self.trees {
            value += self.params.learning_rate * tree.predict_row(sample)?;
        }
        Ok(value)
    }

    pub fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        X.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_vec(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read(path)?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

impl PricePredictor for GradientBoostedRegressor {
    fn predict_price(&self, features: &[f64]) -> Result<f64, ModelError> {
        let price = self.predict_row(ArrayView1::from(features))?;
        if price.is_finite() {
            Ok(price)
        } else {
            Err(ModelError::NonFinite)
        }
    }
}
