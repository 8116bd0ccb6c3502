//! Синтетические данные для обучения моделей цены

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::preprocessing::{LegacyRow, RegressorRow};
use crate::pricing::candidates::generate_candidates;
use crate::pricing::engine::base_price;
use crate::pricing::legacy::legacy_heuristic_price;
use crate::pricing::reward::RewardInputs;
use crate::pricing::selector::reward_search;
use crate::types::{round2, QualityGrade};

const GRADES: [QualityGrade; 3] = [QualityGrade::A, QualityGrade::B, QualityGrade::C];

/// Строка для регрессора: целевая цена - оптимум перебора по награде
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSample {
    pub unit_cost: f64,
    pub quality_grade: QualityGrade,
    pub base_price: f64,
    pub demand: f64,
    pub stock_level: u32,
    pub competitor_avg: f64,
    pub expiry_hours: f64,
    pub optimal_price: f64,
}

impl PricingSample {
    pub fn to_regressor_row(&self) -> RegressorRow {
        RegressorRow {
            base_price: self.base_price,
            grade: self.quality_grade,
            inventory: self.stock_level as f64,
            expected_demand: self.demand,
            competitor_price: self.competitor_avg,
            target_price: self.optimal_price,
        }
    }
}

pub fn generate_pricing_samples(n: usize, seed: u64, config: &PricingConfig) -> Vec<PricingSample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut samples = Vec::with_capacity(n);

    for _ in 0..n {
        let unit_cost = rng.gen_range(0.8..4.5);
        let grade = *GRADES.choose(&mut rng).unwrap_or(&QualityGrade::B);
        let base = base_price(unit_cost, grade, config.min_margin);
        let demand = rng.gen_range(2.0..12.0);
        let stock_level: u32 = rng.gen_range(10..250);
        let competitor_avg = base * rng.gen_range(0.92..1.08);
        let expiry_hours = rng.gen_range(8..96) as f64;

        let candidates = generate_candidates(base, unit_cost, config.min_margin, config.max_discount);
        let inputs = RewardInputs {
            competitor_price: competitor_avg,
            base_price: base,
            expected_demand: demand,
            inventory: stock_level as f64,
            unit_cost,
            expiry_hours,
        };
        let optimal_price = reward_search(&candidates, &inputs)
            .map(|best| best.price)
            .unwrap_or(base);

        samples.push(PricingSample {
            unit_cost,
            quality_grade: grade,
            base_price: base,
            demand,
            stock_level,
            competitor_avg,
            expiry_hours,
            optimal_price,
        });
    }

    samples
}

/// Заказы для устаревшей линейной модели, цена по эвристике
pub fn generate_legacy_rows(n: usize, seed: u64) -> Vec<LegacyRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let demand_index = rng.gen_range(0..100) as f64 / 100.0;
            let base_price = rng.gen_range(100..=2500) as f64 / 100.0;
            let competitor_price = round2(base_price * (0.9 + rng.gen_range(0..10) as f64 / 100.0));
            let stock_level: u32 = rng.gen_range(0..=200);
            LegacyRow {
                base_price,
                competitor_price,
                demand_index,
                stock_level: stock_level as f64,
                target_price: round2(legacy_heuristic_price(base_price, demand_index, stock_level)),
            }
        })
        .collect()
}
