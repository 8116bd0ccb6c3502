/// Движок динамического ценообразования

pub mod ab;
pub mod candidates;
pub mod competitor;
pub mod engine;
pub mod grade;
pub mod legacy;
pub mod reward;
pub mod selector;

pub use engine::PricingEngine;
pub use legacy::LegacyPricer;
pub use selector::{ModelSelector, PricingStrategy};
