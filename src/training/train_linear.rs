//! Обучение устаревшей линейной модели через linfa

#![allow(non_snake_case)]

use serde::{Deserialize, Serialize};

use crate::error::TrainingError;
use crate::models::LegacyLinearModel;
use crate::preprocessing::{FeatureEngineer, LegacyRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTrainingReport {
    pub n_samples: usize,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

pub fn train_linear(rows: &[LegacyRow]) -> Result<(LegacyLinearModel, LinearTrainingReport), TrainingError> {
    let (X, y) = FeatureEngineer::legacy_matrix(rows);
    let model = LegacyLinearModel::fit(&X, &y)?;

    tracing::info!(
        "Legacy pricing model trained on {} rows: coef={:?} intercept={:.4}",
        rows.len(),
        model.coefficients,
        model.intercept
    );

    let report = LinearTrainingReport {
        n_samples: rows.len(),
        coefficients: model.coefficients.clone(),
        intercept: model.intercept,
    };
    Ok((model, report))
}
