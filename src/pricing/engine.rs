//! Оркестратор: от контекста продукта до итоговой рекомендации

use std::sync::Arc;

use crate::config::PricingConfig;
use crate::error::PricingError;
use crate::models::ModelCache;
use crate::pricing::ab::{apply_bucket, assign_bucket};
use crate::pricing::candidates::{generate_candidates, max_candidate_price, price_floor};
use crate::pricing::competitor::adjust_for_competitor;
use crate::pricing::grade::{expiry_demand_factor, GradeFactors};
use crate::pricing::reward::elasticity;
use crate::pricing::selector::{ModelSelector, StrategyInput};
use crate::types::{round2, PriceReason, PricingContext, PricingDecision, QualityGrade};

/// Без себестоимости (нет в каталоге) базовая цена условная
const UNKNOWN_COST_BASE_PRICE: f64 = 1.0;

/// Себестоимость с наценкой сорта, но не ниже минимальной маржи
pub fn base_price(unit_cost: f64, grade: QualityGrade, min_margin: f64) -> f64 {
    if unit_cost <= 0.0 {
        return UNKNOWN_COST_BASE_PRICE;
    }
    let markup = GradeFactors::for_grade(grade).markup;
    (unit_cost * markup).max(unit_cost * (1.0 + min_margin))
}

pub fn expected_demand(baseline: f64, grade: QualityGrade, expiry_hours: f64) -> f64 {
    baseline * GradeFactors::for_grade(grade).demand_quality * expiry_demand_factor(expiry_hours)
}

/// Спрос, пересчитанный по эластичности для итоговой цены
pub fn demand_at_price(expected_demand: f64, competitor_price: f64, price: f64, base_price: f64) -> f64 {
    (expected_demand * (1.0 + elasticity(competitor_price, price, base_price))).max(0.0)
}

/// Выручка по базовой цене без эластичности
pub fn baseline_revenue(inventory: f64, expected_demand: f64, base_price: f64) -> f64 {
    inventory.min(expected_demand) * base_price
}

pub struct PricingEngine {
    config: PricingConfig,
    selector: ModelSelector,
}

impl PricingEngine {
    pub fn new(config: PricingConfig, selector: ModelSelector) -> Self {
        Self { config, selector }
    }

    pub fn with_model_cache(config: PricingConfig, cache: Arc<ModelCache>) -> Self {
        Self::new(config, ModelSelector::with_model_cache(cache))
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn recommend(&self, ctx: &PricingContext) -> Result<PricingDecision, PricingError> {
        let factors = GradeFactors::for_grade(ctx.quality_grade);
        let base = base_price(ctx.unit_cost, ctx.quality_grade, self.config.min_margin);
        let demand = expected_demand(
            ctx.expected_demand_baseline,
            ctx.quality_grade,
            ctx.time_to_expiry_hours,
        );
        let floor = price_floor(base, ctx.unit_cost, self.config.min_margin, self.config.max_discount);

        let candidates = generate_candidates(base, ctx.unit_cost, self.config.min_margin, self.config.max_discount);
        let ceiling = max_candidate_price(&candidates)
            .ok_or_else(|| PricingError::InvariantViolation("empty candidate list".to_string()))?;

        let input = StrategyInput {
            context: ctx,
            base_price: base,
            expected_demand: demand,
            quality_factor: factors.demand_quality,
            floor,
            candidates: &candidates,
        };
        let selection = self.selector.select(&input)?;

        let adjustment = adjust_for_competitor(
            selection.price,
            ctx.competitor_price,
            ctx.current_inventory,
            ctx.time_to_expiry_hours,
            floor,
            ceiling,
        );

        let bucket = assign_bucket(&ctx.product_id, self.config.ab_enabled);
        // A/B скидка не должна пробивать пол
        let price = apply_bucket(adjustment.price, bucket).max(floor);

        if !price.is_finite() || price < floor {
            tracing::error!(
                "Pricing invariant violated for {}: price={} floor={}",
                ctx.product_id,
                price,
                floor
            );
            return Err(PricingError::InvariantViolation(format!(
                "price {price} below floor {floor} for {}",
                ctx.product_id
            )));
        }

        // Причина и спрос считаются по цене, которую увидит клиент
        let published = round2(price);
        let learned = selection.strategy.is_learned();
        let reason = if adjustment.adjusted {
            PriceReason::CompetitorAdjusted { learned }
        } else if learned {
            PriceReason::ModelDriven
        } else if published < base {
            PriceReason::ExpiryDiscount
        } else {
            PriceReason::DemandMarkup
        };

        let revenue_impact = selection.evaluation.reward
            - baseline_revenue(ctx.current_inventory as f64, demand, base);

        tracing::debug!(
            "Priced {}: base={:.2} selected={:.2} ({:?}) final={:.2} bucket={}",
            ctx.product_id,
            base,
            selection.price,
            selection.strategy,
            price,
            bucket.as_str()
        );

        Ok(PricingDecision {
            recommended_price: price,
            reason,
            expected_demand: demand_at_price(demand, ctx.competitor_price, published, base),
            revenue_impact,
            bucket,
            strategy: selection.strategy,
            competitor_adjusted: adjustment.adjusted,
        })
    }
}
