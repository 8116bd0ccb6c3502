//! Стандартизация признаков (z-score)

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Хранится внутри артефакта модели, чтобы инференс видел те же mean/std, что и обучение
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataNormalizer {
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
}

impl DataNormalizer {
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some() && self.std.is_some()
    }

    pub fn n_features(&self) -> Option<usize> {
        self.mean.as_ref().map(|m| m.len())
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> Result<(), ModelError> {
        if X.nrows() == 0 {
            return Err(ModelError::EmptyDataset);
        }

        let mean = X.mean_axis(Axis(0)).ok_or(ModelError::EmptyDataset)?;
        // Постоянный признак не должен давать деление на ноль
        let std = X
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s < 1e-10 { 1.0 } else { s });

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        let (mean, std) = self.stats()?;
        if X.ncols() != mean.len() {
            return Err(ModelError::ShapeMismatch {
                expected: mean.len(),
                actual: X.ncols(),
            });
        }

        let mut normalized = X.clone();
        for mut row in normalized.rows_mut() {
            row -= mean;
            row /= std;
        }
        Ok(normalized)
    }

    pub fn transform_row(&self, x: ArrayView1<f64>) -> Result<Array1<f64>, ModelError> {
        let (mean, std) = self.stats()?;
        if x.len() != mean.len() {
            return Err(ModelError::ShapeMismatch {
                expected: mean.len(),
                actual: x.len(),
            });
        }
        Ok((&x - mean) / std)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        self.fit(X)?;
        self.transform(X)
    }

    fn stats(&self) -> Result<(&Array1<f64>, &Array1<f64>), ModelError> {
        match (&self.mean, &self.std) {
            (Some(mean), Some(std)) => Ok((mean, std)),
            _ => Err(ModelError::NotTrained),
        }
    }
}

impl Default for DataNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
