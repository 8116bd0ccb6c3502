//! Ошибки моделей, обучения и ценообразования

use thiserror::Error;

/// Ошибки загрузки и инференса обученных моделей.
///
/// Наружу (в HTTP ответ) не выходят: стратегия превращает их в "нет результата".
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("artifact io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model produced non-finite output")]
    NonFinite,

    #[error("model not trained")]
    NotTrained,

    #[error("empty dataset")]
    EmptyDataset,
}

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("linear fit failed: {0}")]
    Linear(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Единственная ошибка, которую движок отдает вызывающему коду:
/// нарушение инварианта пола цены означает дефект в расчете ограничений.
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("pricing invariant violated: {0}")]
    InvariantViolation(String),
}
