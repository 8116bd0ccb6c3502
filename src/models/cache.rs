//! Кэш обученных моделей на время жизни процесса
//!
//! Модель загружается при первом обращении и дальше не меняется.
//! Отсутствие файла - нормальная ситуация: стратегия просто пропускается,
//! а при следующем запросе файл проверяется снова.
//! Гонка двух запросов за загрузку дает лишнюю загрузку, но не порчу:
//! в слот попадает только первое значение.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::models::{
    GradientBoostedRegressor, LegacyLinearModel, PolicyNetwork, PricePredictor, QNetwork,
};

pub const GBT_ARTIFACT: &str = "dynamic_pricing_gbt.json";
pub const POLICY_ARTIFACT: &str = "dynamic_pricing_policy.json";
pub const LEGACY_ARTIFACT: &str = "dynamic_pricing_linear.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedModels {
    pub regressor: bool,
    pub policy: bool,
    pub legacy: bool,
}

pub struct ModelCache {
    model_dir: PathBuf,
    regressor: OnceLock<Arc<dyn PricePredictor>>,
    policy: OnceLock<Arc<dyn PolicyNetwork>>,
    legacy: OnceLock<Arc<dyn PricePredictor>>,
}

impl ModelCache {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            regressor: OnceLock::new(),
            policy: OnceLock::new(),
            legacy: OnceLock::new(),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Готовый регрессор (для тестов и явного прогрева)
    pub fn with_regressor(self, model: Arc<dyn PricePredictor>) -> Self {
        let _ = self.regressor.set(model);
        self
    }

    pub fn with_policy(self, model: Arc<dyn PolicyNetwork>) -> Self {
        let _ = self.policy.set(model);
        self
    }

    pub fn with_legacy(self, model: Arc<dyn PricePredictor>) -> Self {
        let _ = self.legacy.set(model);
        self
    }

    pub fn regressor(&self) -> Option<Arc<dyn PricePredictor>> {
        load_once(&self.regressor, &self.model_dir.join(GBT_ARTIFACT), |path| {
            let model: Arc<dyn PricePredictor> = Arc::new(GradientBoostedRegressor::load(path)?);
            Ok(model)
        })
    }

    pub fn policy(&self) -> Option<Arc<dyn PolicyNetwork>> {
        load_once(&self.policy, &self.model_dir.join(POLICY_ARTIFACT), |path| {
            let model: Arc<dyn PolicyNetwork> = Arc::new(QNetwork::load(path)?);
            Ok(model)
        })
    }

    pub fn legacy(&self) -> Option<Arc<dyn PricePredictor>> {
        load_once(&self.legacy, &self.model_dir.join(LEGACY_ARTIFACT), |path| {
            let model: Arc<dyn PricePredictor> = Arc::new(LegacyLinearModel::load(path)?);
            Ok(model)
        })
    }

    /// Прогрев при старте сервиса
    pub fn warm_up(&self) -> LoadedModels {
        let loaded = LoadedModels {
            regressor: self.regressor().is_some(),
            policy: self.policy().is_some(),
            legacy: self.legacy().is_some(),
        };
        tracing::info!(
            "Model cache warm-up: regressor={}, policy={}, legacy={}",
            loaded.regressor,
            loaded.policy,
            loaded.legacy
        );
        loaded
    }

    /// Что уже загружено, без попыток чтения с диска
    pub fn loaded(&self) -> LoadedModels {
        LoadedModels {
            regressor: self.regressor.get().is_some(),
            policy: self.policy.get().is_some(),
            legacy: self.legacy.get().is_some(),
        }
    }
}

fn load_once<T: ?Sized>(
    slot: &OnceLock<Arc<T>>,
    path: &Path,
    loader: impl FnOnce(&Path) -> Result<Arc<T>, ModelError>,
) -> Option<Arc<T>> {
    if let Some(model) = slot.get() {
        return Some(Arc::clone(model));
    }
    if !path.exists() {
        return None;
    }

    match loader(path) {
        Ok(model) => {
            tracing::info!("Loaded model artifact {}", path.display());
            let _ = slot.set(model);
            slot.get().cloned()
        }
        Err(e) => {
            tracing::warn!("Failed to load model artifact {}: {}", path.display(), e);
            None
        }
    }
}
