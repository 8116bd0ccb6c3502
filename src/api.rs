//! HTTP API сервиса ценообразования

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::config::{PricingConfig, ServiceConfig};
use crate::models::ModelCache;
use crate::pricing::engine::base_price;
use crate::pricing::{LegacyPricer, PricingEngine};
use crate::sources::{
    BaselineForecaster, CompetitorPriceSource, DemandForecaster, JsonCatalog, ProductCatalog,
};
use crate::training::{train_all, TrainingSummary};
use crate::types::{
    LegacyPricingRequest, LegacyPricingResponse, PricingContext, PricingRequest, PricingResponse,
};

type ApiError = (StatusCode, Json<Value>);

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PricingEngine>,
    pub legacy: Arc<LegacyPricer>,
    pub models: Arc<ModelCache>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub forecaster: Arc<dyn DemandForecaster>,
    pub competitors: Arc<CompetitorPriceSource>,
    pub pricing: PricingConfig,
    pub model_dir: PathBuf,
}

impl AppState {
    pub fn new(
        pricing: PricingConfig,
        models: Arc<ModelCache>,
        catalog: Arc<dyn ProductCatalog>,
        forecaster: Arc<dyn DemandForecaster>,
        competitors: Arc<CompetitorPriceSource>,
    ) -> Self {
        Self {
            engine: Arc::new(PricingEngine::with_model_cache(pricing, Arc::clone(&models))),
            legacy: Arc::new(LegacyPricer::new(pricing, Arc::clone(&models))),
            model_dir: models.model_dir().to_path_buf(),
            models,
            catalog,
            forecaster,
            competitors,
            pricing,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        let models = Arc::new(ModelCache::new(config.model_dir.clone()));
        let catalog = Arc::new(JsonCatalog::load(&config.catalog_path));
        let forecaster = Arc::new(BaselineForecaster::load(
            &config.demand_baseline_path,
            Some(config.demand_baseline_default),
        ));
        let competitors = Arc::new(CompetitorPriceSource::from_config(config));
        Self::new(config.pricing, models, catalog, forecaster, competitors)
    }
}

pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/pricing/v1", post(recommend_price))
        .route("/api/pricing/legacy", post(recommend_legacy_price))
        .route("/api/models/retrain", post(retrain))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Agro Pricing ML API (Rust)",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "models": state.models.loaded()
    }))
}

async fn recommend_price(
    State(state): State<AppState>,
    Json(req): Json<PricingRequest>,
) -> Result<Json<PricingResponse>, ApiError> {
    tracing::info!(
        "Pricing request: product={} inventory={} grade={} expiry={}h",
        req.product_id,
        req.current_inventory,
        req.quality_grade.as_str(),
        req.time_to_expiry_hours
    );

    let unit_cost = state.catalog.unit_cost(&req.product_id).unwrap_or(0.0);
    let base = base_price(unit_cost, req.quality_grade, state.pricing.min_margin);
    let competitor_price = state.competitors.price_for(&req.product_id, base).await;
    let baseline = state
        .forecaster
        .first_day_quantity(&req.product_id)
        .unwrap_or(0.0);

    let ctx = PricingContext {
        product_id: req.product_id,
        unit_cost,
        quality_grade: req.quality_grade,
        current_inventory: req.current_inventory,
        time_to_expiry_hours: f64::from(req.time_to_expiry_hours),
        competitor_price,
        expected_demand_baseline: baseline,
    };

    match state.engine.recommend(&ctx) {
        Ok(decision) => Ok(Json(PricingResponse::from(&decision))),
        Err(e) => {
            tracing::error!("Pricing failed for {}: {}", ctx.product_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            ))
        }
    }
}

async fn recommend_legacy_price(
    State(state): State<AppState>,
    Json(req): Json<LegacyPricingRequest>,
) -> Json<LegacyPricingResponse> {
    tracing::info!(
        "Legacy pricing request: base={} demand_index={} stock={} bucket={}",
        req.base_price,
        req.demand_index,
        req.stock_level,
        req.ab_bucket
    );
    Json(state.legacy.recommend(&req))
}

async fn retrain(State(state): State<AppState>) -> Result<Json<TrainingSummary>, ApiError> {
    let model_dir = state.model_dir.clone();
    let pricing = state.pricing;

    // Обучение тяжелое, уводим с async рантайма
    match tokio::task::spawn_blocking(move || train_all(&model_dir, &pricing)).await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            tracing::error!("Retraining task failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "retraining failed" })),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn state(model_dir: &std::path::Path) -> AppState {
        AppState::new(
            PricingConfig::default(),
            Arc::new(ModelCache::new(model_dir)),
            Arc::new(JsonCatalog::default()),
            Arc::new(BaselineForecaster::new(HashMap::new(), Some(10.0))),
            Arc::new(CompetitorPriceSource::new(
                None,
                model_dir.join("competitors.json"),
                0.98,
                Duration::from_millis(200),
            )),
        )
    }

    #[tokio::test]
    async fn root_reports_version() {
        let dir = tempfile::tempdir().unwrap();
        let res = build_app(state(dir.path()))
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), 1024).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn pricing_response_is_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let req = Request::post("/api/pricing/v1")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"productId":"prod_0","currentInventory":20,"qualityGrade":"B","timeToExpiryHours":30}"#,
            ))
            .unwrap();
        let res = build_app(state(dir.path())).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), 4096).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        for key in ["recommendedPrice", "priceAdjustmentReason", "expectedDemand", "revenueImpact", "abBucket"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let res = build_app(state(dir.path()))
            .oneshot(Request::get("/api/pricing/v2").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
