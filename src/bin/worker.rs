/// Воркер периодического переобучения моделей ценообразования

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use agro_pricing::training::train_all;
use agro_pricing::ServiceConfig;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServiceConfig::from_env();
    if !config.self_training {
        tracing::info!("Self-training disabled (ENABLE_SELF_TRAINING=false), worker exits");
        return Ok(());
    }

    let period = Duration::from_secs(config.retrain_interval_days.max(1) * SECONDS_PER_DAY);
    tracing::info!(
        "Retraining worker started: every {} day(s), models in {}",
        config.retrain_interval_days.max(1),
        config.model_dir.display()
    );

    // Первый тик срабатывает сразу
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;

        let model_dir = config.model_dir.clone();
        let pricing = config.pricing;
        let summary = tokio::task::spawn_blocking(move || train_all(&model_dir, &pricing)).await?;

        tracing::info!(
            "Retraining run at {}: {}",
            summary.trained_at,
            serde_json::to_string(&summary.models)?
        );
    }
}
