/// Пайплайны обучения моделей ценообразования

pub mod simulator;
pub mod synthetic;
pub mod train_gbt;
pub mod train_linear;
pub mod train_policy;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::error::TrainingError;
use crate::models::cache::{GBT_ARTIFACT, LEGACY_ARTIFACT, POLICY_ARTIFACT};
use crate::models::BoostingParams;

pub use train_gbt::{train_gbt, GbtTrainingReport};
pub use train_linear::{train_linear, LinearTrainingReport};
pub use train_policy::{train_policy, PolicyTrainingParams, PolicyTrainingReport};

const SYNTHETIC_SEED: u64 = 42;
const PRICING_SAMPLES: usize = 2000;
const LEGACY_SAMPLES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingStatus {
    Trained,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelReport {
    pub name: String,
    pub status: TrainingStatus,
    pub artifact: PathBuf,
    pub n_samples: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metrics: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub trained_at: DateTime<Utc>,
    pub models: Vec<ModelReport>,
}

impl TrainingSummary {
    pub fn all_trained(&self) -> bool {
        self.models.iter().all(|m| m.status == TrainingStatus::Trained)
    }
}

/// Собирает отчет по одной модели, ошибка не прерывает остальные пайплайны
fn report<M: Serialize>(
    name: &str,
    artifact: PathBuf,
    n_samples: usize,
    result: Result<M, TrainingError>,
) -> ModelReport {
    match result {
        Ok(metrics) => ModelReport {
            name: name.to_string(),
            status: TrainingStatus::Trained,
            artifact,
            n_samples,
            error: None,
            metrics: serde_json::to_value(metrics).unwrap_or(serde_json::Value::Null),
        },
        Err(e) => {
            tracing::error!("Training {} failed: {}", name, e);
            ModelReport {
                name: name.to_string(),
                status: TrainingStatus::Failed,
                artifact,
                n_samples,
                error: Some(e.to_string()),
                metrics: serde_json::Value::Null,
            }
        }
    }
}

/// Обучение и сохранение всех трех моделей в `model_dir`
pub fn train_all(model_dir: &Path, config: &PricingConfig) -> TrainingSummary {
    tracing::info!("Training pricing models into {}", model_dir.display());

    let samples = synthetic::generate_pricing_samples(PRICING_SAMPLES, SYNTHETIC_SEED, config);
    let gbt_path = model_dir.join(GBT_ARTIFACT);
    let gbt = train_gbt(&samples, BoostingParams::default()).and_then(|(model, metrics)| {
        model.save(&gbt_path)?;
        Ok(metrics)
    });

    let policy_params = PolicyTrainingParams::default();
    let policy_path = model_dir.join(POLICY_ARTIFACT);
    let policy = train_policy(&policy_params, *config).and_then(|(network, metrics)| {
        network.save(&policy_path)?;
        Ok(metrics)
    });

    let legacy_rows = synthetic::generate_legacy_rows(LEGACY_SAMPLES, SYNTHETIC_SEED);
    let legacy_path = model_dir.join(LEGACY_ARTIFACT);
    let legacy = train_linear(&legacy_rows).and_then(|(model, metrics)| {
        model.save(&legacy_path)?;
        Ok(metrics)
    });

    let summary = TrainingSummary {
        trained_at: Utc::now(),
        models: vec![
            report("dynamic_pricing_gbt", gbt_path, samples.len(), gbt),
            report("dynamic_pricing_policy", policy_path, policy_params.episodes, policy),
            report("dynamic_pricing_linear", legacy_path, legacy_rows.len(), legacy),
        ],
    };

    tracing::info!(
        "Training finished: {}/{} models trained",
        summary
            .models
            .iter()
            .filter(|m| m.status == TrainingStatus::Trained)
            .count(),
        summary.models.len()
    );
    summary
}
