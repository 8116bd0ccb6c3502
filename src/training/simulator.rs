//! Симулятор рынка для обучения Q-сети
//!
//! Эпизод из одного шага: выставили цену, получили награду от той же модели
//! вознаграждения, что и онлайн перебор.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::PricingConfig;
use crate::models::POLICY_ACTIONS;
use crate::pricing::candidates::price_floor;
use crate::pricing::grade::expiry_demand_factor;
use crate::pricing::reward::{self, RewardInputs};

pub const QUALITY_FACTORS: [f64; 3] = [1.0, 0.85, 0.7];

/// [inventory, demand, quality, competitor/base, expiry]
pub type SimState = [f64; 5];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub next_state: SimState,
    pub price: f64,
    pub reward: f64,
    pub done: bool,
}

pub struct PricingEnv {
    rng: StdRng,
    config: PricingConfig,
    state: Option<SimState>,
}

impl PricingEnv {
    pub fn new(seed: u64, config: PricingConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
            state: None,
        }
    }

    pub fn reset(&mut self) -> SimState {
        let state = [
            self.rng.gen_range(10.0..250.0),
            self.rng.gen_range(2.0..12.0),
            *QUALITY_FACTORS.choose(&mut self.rng).unwrap_or(&1.0),
            self.rng.gen_range(0.9..1.1),
            self.rng.gen_range(8.0..96.0),
        ];
        self.state = Some(state);
        state
    }

    pub fn step(&mut self, action: usize, base_price: f64, unit_cost: f64) -> StepOutcome {
        let state = match self.state {
            Some(state) => state,
            None => self.reset(),
        };
        let [inventory, demand, quality, competitor_ratio, expiry_hours] = state;

        let adjustment = POLICY_ACTIONS.get(action).copied().unwrap_or(0.0);
        let floor = price_floor(base_price, unit_cost, self.config.min_margin, self.config.max_discount);
        let price = (base_price * (1.0 + adjustment)).max(floor);

        let inputs = RewardInputs {
            competitor_price: base_price * competitor_ratio,
            base_price,
            expected_demand: (demand * quality * expiry_demand_factor(expiry_hours)).max(0.0),
            inventory,
            unit_cost,
            expiry_hours,
        };
        let evaluation = reward::evaluate(price, &inputs);

        StepOutcome {
            next_state: self.reset(),
            price,
            reward: evaluation.reward,
            done: true,
        }
    }
}
