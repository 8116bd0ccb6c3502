/// Внешние источники данных для ценообразования

pub mod catalog;
pub mod competitors;
pub mod forecast;

pub use catalog::{CatalogEntry, JsonCatalog, ProductCatalog};
pub use competitors::CompetitorPriceSource;
pub use forecast::{BaselineForecaster, DemandForecaster};
