//! Выбор цены: обученные модели по приоритету, затем перебор кандидатов по награде
//!
//! Каждая стратегия возвращает Option: None значит "перейти к следующей".
//! Перебор по награде - последняя стратегия, которая всегда дает ответ.

use std::sync::Arc;

use crate::error::PricingError;
use crate::models::policy::argmax;
use crate::models::{ModelCache, POLICY_ACTIONS};
use crate::preprocessing::FeatureEngineer;
use crate::pricing::candidates::{max_candidate_price, PriceCandidate};
use crate::pricing::reward::{self, RewardEvaluation, RewardInputs};
use crate::types::{PricingContext, StrategyKind};

/// Все, что нужно стратегии для одного решения
#[derive(Debug, Clone)]
pub struct StrategyInput<'a> {
    pub context: &'a PricingContext,
    pub base_price: f64,
    pub expected_demand: f64,
    pub quality_factor: f64,
    pub floor: f64,
    pub candidates: &'a [PriceCandidate],
}

impl StrategyInput<'_> {
    pub fn reward_inputs(&self) -> RewardInputs {
        RewardInputs {
            competitor_price: self.context.competitor_price,
            base_price: self.base_price,
            expected_demand: self.expected_demand,
            inventory: self.context.current_inventory as f64,
            unit_cost: self.context.unit_cost,
            expiry_hours: self.context.time_to_expiry_hours,
        }
    }

    /// Цена модели не выше самого дорогого кандидата и не ниже пола
    pub fn clamp_model_price(&self, price: f64) -> Option<f64> {
        let ceiling = max_candidate_price(self.candidates)?;
        Some(ceiling.min(price.max(self.floor)))
    }
}

pub trait PricingStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn propose(&self, input: &StrategyInput<'_>) -> Option<f64>;
}

/// Градиентный бустинг над [base, grade, inventory, demand, competitor]
pub struct GradientBoostedStrategy {
    cache: Arc<ModelCache>,
}

impl GradientBoostedStrategy {
    pub fn new(cache: Arc<ModelCache>) -> Self {
        Self { cache }
    }
}

impl PricingStrategy for GradientBoostedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::GradientBoosted
    }

    fn propose(&self, input: &StrategyInput<'_>) -> Option<f64> {
        let model = self.cache.regressor()?;
        let features = FeatureEngineer::regressor_features(
            input.base_price,
            input.context.quality_grade,
            input.context.current_inventory as f64,
            input.expected_demand,
            input.context.competitor_price,
        );

        match model.predict_price(&features) {
            Ok(price) => input.clamp_model_price(price),
            Err(e) => {
                tracing::warn!("Regressor inference failed for {}: {}", input.context.product_id, e);
                None
            }
        }
    }
}

/// Q-сеть: argmax по 5 корректировкам базовой цены
pub struct PolicyStrategy {
    cache: Arc<ModelCache>,
}

impl PolicyStrategy {
    pub fn new(cache: Arc<ModelCache>) -> Self {
        Self { cache }
    }
}

impl PricingStrategy for PolicyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Policy
    }

    fn propose(&self, input: &StrategyInput<'_>) -> Option<f64> {
        let network = self.cache.policy()?;
        let state = FeatureEngineer::policy_state(
            input.context.current_inventory as f64,
            input.expected_demand,
            input.quality_factor,
            input.context.competitor_price,
            input.base_price,
            input.context.time_to_expiry_hours,
        );

        let values = match network.action_values(&state) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!("Policy inference failed for {}: {}", input.context.product_id, e);
                return None;
            }
        };

        let action = POLICY_ACTIONS[argmax(&values)?];
        input.clamp_model_price(input.base_price * (1.0 + action))
    }
}

/// Лучший кандидат по награде. Строго больший выигрывает, при равенстве остается первый.
pub fn reward_search(candidates: &[PriceCandidate], inputs: &RewardInputs) -> Option<RewardEvaluation> {
    let mut best: Option<RewardEvaluation> = None;
    for candidate in candidates {
        let evaluation = reward::evaluate(candidate.price, inputs);
        match best {
            Some(current) if evaluation.reward <= current.reward => {}
            _ => best = Some(evaluation),
        }
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub price: f64,
    pub strategy: StrategyKind,
    pub evaluation: RewardEvaluation,
}

pub struct ModelSelector {
    strategies: Vec<Box<dyn PricingStrategy>>,
}

impl ModelSelector {
    pub fn new(strategies: Vec<Box<dyn PricingStrategy>>) -> Self {
        Self { strategies }
    }

    /// Стандартный порядок: бустинг, затем политика
    pub fn with_model_cache(cache: Arc<ModelCache>) -> Self {
        Self::new(vec![
            Box::new(GradientBoostedStrategy::new(Arc::clone(&cache))),
            Box::new(PolicyStrategy::new(cache)),
        ])
    }

    /// Только перебор по награде
    pub fn reward_search_only() -> Self {
        Self::new(Vec::new())
    }

    pub fn select(&self, input: &StrategyInput<'_>) -> Result<Selection, PricingError> {
        let reward_inputs = input.reward_inputs();

        for strategy in &self.strategies {
            if let Some(price) = strategy.propose(input) {
                return Ok(Selection {
                    price,
                    strategy: strategy.kind(),
                    evaluation: reward::evaluate(price, &reward_inputs),
                });
            }
            tracing::debug!("Strategy {:?} produced no price, falling through", strategy.kind());
        }

        let best = reward_search(input.candidates, &reward_inputs).ok_or_else(|| {
            PricingError::InvariantViolation("empty candidate list".to_string())
        })?;

        Ok(Selection {
            price: best.price,
            strategy: StrategyKind::RewardSearch,
            evaluation: best,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::models::{PolicyNetwork, PricePredictor};
    use crate::pricing::candidates::generate_candidates;
    use crate::types::QualityGrade;

    struct FixedPrice(f64);

    impl PricePredictor for FixedPrice {
        fn predict_price(&self, _features: &[f64]) -> Result<f64, ModelError> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl PricePredictor for Broken {
        fn predict_price(&self, features: &[f64]) -> Result<f64, ModelError> {
            Err(ModelError::ShapeMismatch { expected: 7, actual: features.len() })
        }
    }

    struct FixedValues([f64; 5]);

    impl PolicyNetwork for FixedValues {
        fn action_values(&self, _state: &[f64]) -> Result<[f64; 5], ModelError> {
            Ok(self.0)
        }
    }

    fn context() -> PricingContext {
        PricingContext {
            product_id: "tomato-1".to_string(),
            unit_cost: 2.0,
            quality_grade: QualityGrade::A,
            current_inventory: 100,
            time_to_expiry_hours: 72.0,
            competitor_price: 4.1,
            expected_demand_baseline: 10.0,
        }
    }

    fn with_input<T>(f: impl FnOnce(&StrategyInput<'_>) -> T) -> T {
        let ctx = context();
        let candidates = generate_candidates(4.0, 2.0, 0.15, 0.30);
        let input = StrategyInput {
            context: &ctx,
            base_price: 4.0,
            expected_demand: 10.0,
            quality_factor: 1.0,
            floor: 2.8,
            candidates: &candidates,
        };
        f(&input)
    }

    fn empty_cache() -> (tempfile::TempDir, ModelCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = ModelCache::new(dir.path());
        (dir, cache)
    }

    #[test]
    fn falls_back_to_reward_search_without_models() {
        let (_dir, cache) = empty_cache();
        let selector = ModelSelector::with_model_cache(Arc::new(cache));
        let selection = with_input(|input| selector.select(input)).unwrap();
        assert_eq!(selection.strategy, StrategyKind::RewardSearch);
        let expected = with_input(|input| reward_search(input.candidates, &input.reward_inputs())).unwrap();
        assert_eq!(selection.price, expected.price);
    }

    #[test]
    fn regressor_output_is_clamped_to_candidate_range() {
        let (_dir, cache) = empty_cache();
        let cache = Arc::new(cache.with_regressor(Arc::new(FixedPrice(100.0))));
        let selector = ModelSelector::with_model_cache(cache);
        let selection = with_input(|input| selector.select(input)).unwrap();
        assert_eq!(selection.strategy, StrategyKind::GradientBoosted);
        assert!((selection.price - 4.4).abs() < 1e-9);

        let (_dir, cache) = empty_cache();
        let cache = Arc::new(cache.with_regressor(Arc::new(FixedPrice(-3.0))));
        let selector = ModelSelector::with_model_cache(cache);
        let selection = with_input(|input| selector.select(input)).unwrap();
        assert_eq!(selection.price, 2.8);
    }

    #[test]
    fn broken_regressor_demotes_to_policy() {
        let (_dir, cache) = empty_cache();
        let cache = cache
            .with_regressor(Arc::new(Broken))
            .with_policy(Arc::new(FixedValues([0.0, 9.0, 1.0, 9.0, 2.0])));
        let selector = ModelSelector::with_model_cache(Arc::new(cache));
        let selection = with_input(|input| selector.select(input)).unwrap();
        assert_eq!(selection.strategy, StrategyKind::Policy);
        // первый максимум: индекс 1 -> -5%
        assert!((selection.price - 3.8).abs() < 1e-9);
    }

    #[test]
    fn non_finite_policy_output_falls_through() {
        struct NanPolicy;
        impl PolicyNetwork for NanPolicy {
            fn action_values(&self, _state: &[f64]) -> Result<[f64; 5], ModelError> {
                Err(ModelError::NonFinite)
            }
        }
        let (_dir, cache) = empty_cache();
        let selector = ModelSelector::with_model_cache(Arc::new(cache.with_policy(Arc::new(NanPolicy))));
        let selection = with_input(|input| selector.select(input)).unwrap();
        assert_eq!(selection.strategy, StrategyKind::RewardSearch);
    }

    #[test]
    fn reward_search_keeps_first_of_equal_rewards() {
        // нет спроса и нет себестоимости: награда 0 при любой цене
        let inputs = RewardInputs {
            competitor_price: 2.0,
            base_price: 4.0,
            expected_demand: 0.0,
            inventory: 20.0,
            unit_cost: 0.0,
            expiry_hours: 30.0,
        };
        let distinct = [
            PriceCandidate { price: 3.0, step: -0.1 },
            PriceCandidate { price: 3.5, step: -0.05 },
        ];
        assert_eq!(reward::evaluate(3.0, &inputs).reward, reward::evaluate(3.5, &inputs).reward);
        let best = reward_search(&distinct, &inputs).unwrap();
        assert_eq!(best.price, 3.0);

        let candidates = generate_candidates(4.0, 0.0, 0.15, 0.30);
        let best = reward_search(&candidates, &inputs).unwrap();
        assert_eq!(best.price, candidates[0].price);
        assert!(candidates[0].price < candidates[4].price);
    }

    #[test]
    fn strictly_better_later_candidate_wins() {
        let inputs = RewardInputs {
            competitor_price: 4.0,
            base_price: 4.0,
            expected_demand: 10.0,
            inventory: 10.0,
            unit_cost: 0.0,
            expiry_hours: 72.0,
        };
        let candidates = [
            PriceCandidate { price: 3.0, step: -0.1 },
            PriceCandidate { price: 3.5, step: -0.05 },
        ];
        assert_eq!(reward_search(&candidates, &inputs).unwrap().price, 3.5);
    }

    #[test]
    fn empty_candidates_is_an_invariant_violation() {
        let selector = ModelSelector::reward_search_only();
        let ctx = context();
        let input = StrategyInput {
            context: &ctx,
            base_price: 4.0,
            expected_demand: 10.0,
            quality_factor: 1.0,
            floor: 2.8,
            candidates: &[],
        };
        assert!(matches!(selector.select(&input), Err(PricingError::InvariantViolation(_))));
    }
}
