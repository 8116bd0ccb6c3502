/// Типы данных для движка ценообразования и API

use std::fmt;

use serde::{Deserialize, Serialize};

/// Сорт продукции. Неизвестный сорт трактуется как "B".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QualityGrade {
    A,
    B,
    C,
}

impl QualityGrade {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => QualityGrade::A,
            "C" => QualityGrade::C,
            _ => QualityGrade::B,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::A => "A",
            QualityGrade::B => "B",
            QualityGrade::C => "C",
        }
    }
}

impl From<String> for QualityGrade {
    fn from(raw: String) -> Self {
        QualityGrade::parse(&raw)
    }
}

impl From<QualityGrade> for String {
    fn from(grade: QualityGrade) -> Self {
        grade.as_str().to_string()
    }
}

/// Входные данные одного решения о цене. Создается на запрос, не хранится.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingContext {
    pub product_id: String,
    pub unit_cost: f64,
    pub quality_grade: QualityGrade,
    pub current_inventory: u32,
    pub time_to_expiry_hours: f64,
    pub competitor_price: f64,
    pub expected_demand_baseline: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbBucket {
    A,
    B,
}

impl AbBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbBucket::A => "A",
            AbBucket::B => "B",
        }
    }
}

/// Какая стратегия выбрала цену
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    GradientBoosted,
    Policy,
    RewardSearch,
}

impl StrategyKind {
    pub fn is_learned(&self) -> bool {
        !matches!(self, StrategyKind::RewardSearch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceReason {
    /// `learned`: цену до поправки выбрала обученная модель
    CompetitorAdjusted { learned: bool },
    ModelDriven,
    ExpiryDiscount,
    DemandMarkup,
}

impl fmt::Display for PriceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PriceReason::CompetitorAdjusted { learned: true } => "Competitor-adjusted model price",
            PriceReason::CompetitorAdjusted { learned: false } => "Competitor-adjusted heuristic price",
            PriceReason::ModelDriven => "Model-driven price",
            PriceReason::ExpiryDiscount => "Expiry-driven discount",
            PriceReason::DemandMarkup => "Demand/margin-driven markup",
        };
        f.write_str(text)
    }
}

/// Итоговое решение движка
#[derive(Debug, Clone, PartialEq)]
pub struct PricingDecision {
    pub recommended_price: f64,
    pub reason: PriceReason,
    pub expected_demand: f64,
    pub revenue_impact: f64,
    pub bucket: AbBucket,
    pub strategy: StrategyKind,
    pub competitor_adjusted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    pub product_id: String,
    pub current_inventory: u32,
    pub quality_grade: QualityGrade,
    pub time_to_expiry_hours: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResponse {
    pub recommended_price: f64,
    pub price_adjustment_reason: String,
    pub expected_demand: f64,
    pub revenue_impact: f64,
    pub ab_bucket: AbBucket,
}

impl From<&PricingDecision> for PricingResponse {
    fn from(decision: &PricingDecision) -> Self {
        Self {
            recommended_price: round2(decision.recommended_price),
            price_adjustment_reason: decision.reason.to_string(),
            expected_demand: round2(decision.expected_demand),
            revenue_impact: round2(decision.revenue_impact),
            ab_bucket: decision.bucket,
        }
    }
}

/// Поля в camelCase, старые snake_case имена принимаются как алиасы
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPricingRequest {
    #[serde(alias = "base_price")]
    pub base_price: f64,
    #[serde(alias = "competitor_price")]
    pub competitor_price: f64,
    #[serde(alias = "demand_index")]
    pub demand_index: f64,
    #[serde(alias = "stock_level")]
    pub stock_level: u32,
    #[serde(default = "default_bucket", alias = "ab_bucket")]
    pub ab_bucket: String,
}

fn default_bucket() -> String {
    "A".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyPricingResponse {
    pub recommended_price: f64,
    pub bucket: String,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_grade_parses_as_b() {
        assert_eq!(QualityGrade::parse("a"), QualityGrade::A);
        assert_eq!(QualityGrade::parse(" C "), QualityGrade::C);
        assert_eq!(QualityGrade::parse("premium"), QualityGrade::B);
    }

    #[test]
    fn request_uses_camel_case() {
        let raw = r#"{"productId":"tomato-1","currentInventory":40,"qualityGrade":"A","timeToExpiryHours":36}"#;
        let req: PricingRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.product_id, "tomato-1");
        assert_eq!(req.quality_grade, QualityGrade::A);
        assert_eq!(req.time_to_expiry_hours, 36);
    }

    #[test]
    fn response_rounds_to_two_decimals() {
        let decision = PricingDecision {
            recommended_price: 4.126,
            reason: PriceReason::DemandMarkup,
            expected_demand: 7.0049,
            revenue_impact: -1.555,
            bucket: AbBucket::A,
            strategy: StrategyKind::RewardSearch,
            competitor_adjusted: false,
        };
        let resp = PricingResponse::from(&decision);
        assert_eq!(resp.recommended_price, 4.13);
        assert_eq!(resp.expected_demand, 7.0);
        assert_eq!(resp.price_adjustment_reason, "Demand/margin-driven markup");
    }

    #[test]
    fn legacy_request_accepts_camel_case_and_snake_case() {
        let camel = r#"{"basePrice":10.0,"competitorPrice":9.5,"demandIndex":0.2,"stockLevel":100,"abBucket":"B"}"#;
        let req: LegacyPricingRequest = serde_json::from_str(camel).unwrap();
        assert_eq!(req.base_price, 10.0);
        assert_eq!(req.stock_level, 100);
        assert_eq!(req.ab_bucket, "B");

        let snake = r#"{"base_price":10.0,"competitor_price":9.5,"demand_index":0.2,"stock_level":100}"#;
        let req: LegacyPricingRequest = serde_json::from_str(snake).unwrap();
        assert_eq!(req.competitor_price, 9.5);
        assert_eq!(req.ab_bucket, "A");

        let resp = serde_json::to_value(LegacyPricingResponse {
            recommended_price: 11.16,
            bucket: "A".to_string(),
        })
        .unwrap();
        assert_eq!(resp["recommended_price"], 11.16);
    }

    #[test]
    fn competitor_reason_names_strategy_family() {
        assert_eq!(
            PriceReason::CompetitorAdjusted { learned: true }.to_string(),
            "Competitor-adjusted model price"
        );
        assert_eq!(
            PriceReason::CompetitorAdjusted { learned: false }.to_string(),
            "Competitor-adjusted heuristic price"
        );
    }
}
