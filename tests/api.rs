use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use agro_pricing::api::{build_app, AppState};
use agro_pricing::models::ModelCache;
use agro_pricing::pricing::engine::base_price;
use agro_pricing::sources::{BaselineForecaster, CatalogEntry, CompetitorPriceSource, JsonCatalog};
use agro_pricing::{PricingConfig, PricingContext, PricingEngine, PricingResponse, QualityGrade};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
    _model_dir: tempfile::TempDir,
}

impl TestServer {
    async fn spawn() -> Self {
        let model_dir = tempfile::tempdir().unwrap();
        let models = Arc::new(ModelCache::new(model_dir.path()));

        let mut entries = HashMap::new();
        entries.insert(
            "tomato-1".to_string(),
            CatalogEntry { unit_cost: 2.0, name: Some("Tomato".to_string()) },
        );
        let catalog = Arc::new(JsonCatalog::from_entries(entries));

        let mut baselines = HashMap::new();
        baselines.insert("tomato-1".to_string(), 10.0);
        let forecaster = Arc::new(BaselineForecaster::new(baselines, None));

        // Ни HTTP фида, ни файла: цена конкурента = 0.98 от базы
        let competitors = Arc::new(CompetitorPriceSource::new(
            None,
            model_dir.path().join("missing-competitors.json"),
            0.98,
            Duration::from_secs(1),
        ));

        let state = AppState::new(PricingConfig::default(), models, catalog, forecaster, competitors);
        let app = build_app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            handle,
            _model_dir: model_dir,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_reports_no_models_loaded() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["models"]["regressor"], false);
    assert_eq!(body["models"]["policy"], false);
    assert_eq!(body["models"]["legacy"], false);

    let res = client.get(format!("{}/", server.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn pricing_matches_engine_with_resolved_collaborators() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/pricing/v1", server.base_url))
        .json(&json!({
            "productId": "tomato-1",
            "currentInventory": 100,
            "qualityGrade": "A",
            "timeToExpiryHours": 72
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();

    let base = base_price(2.0, QualityGrade::A, 0.15);
    let dir = tempfile::tempdir().unwrap();
    let engine = PricingEngine::with_model_cache(PricingConfig::default(), Arc::new(ModelCache::new(dir.path())));
    let decision = engine
        .recommend(&PricingContext {
            product_id: "tomato-1".to_string(),
            unit_cost: 2.0,
            quality_grade: QualityGrade::A,
            current_inventory: 100,
            time_to_expiry_hours: 72.0,
            competitor_price: base * 0.98,
            expected_demand_baseline: 10.0,
        })
        .unwrap();
    let expected = serde_json::to_value(PricingResponse::from(&decision)).unwrap();

    assert_eq!(body, expected);
    assert!(body["recommendedPrice"].as_f64().unwrap() >= 2.0 * 1.15);
    assert!(matches!(body["abBucket"].as_str(), Some("A") | Some("B")));
}

#[tokio::test]
async fn unknown_product_still_gets_a_floor_respecting_price() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/pricing/v1", server.base_url))
        .json(&json!({
            "productId": "no-such-product",
            "currentInventory": 5,
            "qualityGrade": "Z",
            "timeToExpiryHours": 12
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    // без себестоимости база 1.0: цена между полом 0.7 и потолком 1.1
    let price = body["recommendedPrice"].as_f64().unwrap();
    assert!((0.7..=1.1).contains(&price), "price {price}");
}

#[tokio::test]
async fn malformed_pricing_request_is_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/pricing/v1", server.base_url))
        .json(&json!({ "productId": "tomato-1", "currentInventory": -3 }))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_client_error());
}

#[tokio::test]
async fn legacy_pricing_uses_heuristic_without_model() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/pricing/legacy", server.base_url))
        .json(&json!({
            "basePrice": 10.0,
            "competitorPrice": 9.5,
            "demandIndex": 0.2,
            "stockLevel": 100
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    // 10 * 1.2 * (1 - 0.07)
    assert_eq!(body["recommended_price"], 11.16);
    assert_eq!(body["bucket"], "A");

    let res = client
        .post(format!("{}/api/pricing/legacy", server.base_url))
        .json(&json!({
            "basePrice": 10.0,
            "competitorPrice": 9.5,
            "demandIndex": 0.2,
            "stockLevel": 100,
            "abBucket": "B"
        }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["recommended_price"], 10.94);
    assert_eq!(body["bucket"], "B");
}
