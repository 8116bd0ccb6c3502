//! Обучение бустинга на оптимумах перебора по награде

#![allow(non_snake_case)]

use ndarray::s;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, TrainingError};
use crate::models::{BoostingParams, GradientBoostedRegressor};
use crate::preprocessing::{FeatureEngineer, RegressorRow};
use crate::training::synthetic::PricingSample;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbtTrainingReport {
    pub n_samples: usize,
    pub n_trees: usize,
    pub holdout_mae: Option<f64>,
}

pub fn train_gbt(
    samples: &[PricingSample],
    params: BoostingParams,
) -> Result<(GradientBoostedRegressor, GbtTrainingReport), TrainingError> {
    if samples.is_empty() {
        return Err(ModelError::EmptyDataset.into());
    }

    let rows: Vec<RegressorRow> = samples.iter().map(PricingSample::to_regressor_row).collect();
    let (X, y) = FeatureEngineer::regressor_matrix(&rows);

    // Разделение на train/test (80/20), без перемешивания: выборка уже случайная
    let split_idx = ((X.nrows() as f64 * 0.8) as usize).max(1);
    let X_train = X.slice(s![..split_idx, ..]).to_owned();
    let y_train = y.slice(s![..split_idx]).to_owned();
    let X_test = X.slice(s![split_idx.., ..]).to_owned();
    let y_test = y.slice(s![split_idx..]).to_owned();

    let model = GradientBoostedRegressor::fit(&X_train, &y_train, params)?;

    let holdout_mae = if X_test.nrows() > 0 {
        let predictions = model.predict(&X_test)?;
        (predictions - &y_test).mapv(f64::abs).mean()
    } else {
        None
    };

    match holdout_mae {
        Some(mae) => tracing::info!("Pricing regressor trained on {} rows. Holdout MAE: {:.4}", split_idx, mae),
        None => tracing::info!("Pricing regressor trained on {} rows", split_idx),
    }

    let report = GbtTrainingReport {
        n_samples: samples.len(),
        n_trees: model.n_trees(),
        holdout_mae,
    };
    Ok((model, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PricingConfig;
    use crate::training::synthetic::generate_pricing_samples;

    #[test]
    fn learns_reward_optimum_closely() {
        let samples = generate_pricing_samples(200, 42, &PricingConfig::default());
        let params = BoostingParams {
            n_estimators: 60,
            ..BoostingParams::default()
        };
        let (model, report) = train_gbt(&samples, params).unwrap();
        assert_eq!(report.n_samples, 200);
        assert_eq!(report.n_trees, 60);
        let mae = report.holdout_mae.unwrap();
        // цены порядка 1.5..9, ошибка должна быть заметно меньше разброса
        assert!(mae < 0.5, "holdout MAE {mae}");
        assert_eq!(model.n_features(), 5);
    }

    #[test]
    fn empty_samples_rejected() {
        assert!(train_gbt(&[], BoostingParams::default()).is_err());
    }
}
