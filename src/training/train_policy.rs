//! Обучение Q-сети на симуляторе (epsilon-greedy + experience replay)

use std::collections::VecDeque;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::error::TrainingError;
use crate::models::policy::{argmax, QTarget, STATE_DIM};
use crate::models::{QNetwork, POLICY_ACTIONS};
use crate::preprocessing::DataNormalizer;
use crate::training::simulator::{PricingEnv, SimState};

const GRADE_MARKUPS: [f64; 3] = [2.0, 1.6, 1.3];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyTrainingParams {
    pub episodes: usize,
    pub learning_rate: f64,
    pub gamma: f64,
    pub replay: bool,
    pub memory_size: usize,
    pub batch_size: usize,
    pub reward_scale: f64,
    pub seed: u64,
}

impl Default for PolicyTrainingParams {
    fn default() -> Self {
        Self {
            episodes: 1000,
            learning_rate: 1e-3,
            gamma: 0.95,
            replay: true,
            memory_size: 5000,
            batch_size: 64,
            reward_scale: 100.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyTrainingReport {
    pub episodes: usize,
    pub steps: usize,
    pub final_loss: f64,
    pub mean_reward: f64,
}

#[derive(Debug, Clone)]
struct Transition {
    state: SimState,
    action: usize,
    reward: f64,
    next_state: SimState,
    done: bool,
}

/// Нормализатор состояния по выборке стартовых состояний симулятора
fn fit_state_scaler(seed: u64, config: PricingConfig, samples: usize) -> Result<DataNormalizer, TrainingError> {
    let mut env = PricingEnv::new(seed, config);
    let mut states = Array2::zeros((samples, STATE_DIM));
    for mut row in states.rows_mut() {
        let s = env.reset();
        for (slot, value) in row.iter_mut().zip(s.iter()) {
            *slot = *value;
        }
    }
    let mut scaler = DataNormalizer::new();
    scaler.fit(&states)?;
    Ok(scaler)
}

pub fn train_policy(
    params: &PolicyTrainingParams,
    config: PricingConfig,
) -> Result<(QNetwork, PolicyTrainingReport), TrainingError> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let scaler = fit_state_scaler(params.seed.wrapping_add(1), config, 1000)?;
    let mut network = QNetwork::new(scaler, params.reward_scale, &mut rng);
    let mut env = PricingEnv::new(params.seed.wrapping_add(2), config);

    let mut memory: VecDeque<Transition> = VecDeque::with_capacity(params.memory_size);
    let mut steps = 0;
    let mut final_loss = 0.0;
    let mut reward_sum = 0.0;

    for episode in 0..params.episodes {
        let state = env.reset();

        let unit_cost = rng.gen_range(0.8..4.5);
        let markup = *GRADE_MARKUPS.choose(&mut rng).unwrap_or(&1.6);
        let base_price = unit_cost * markup;

        let epsilon = (1.0 - episode as f64 / params.episodes as f64).max(0.05);
        let action = if rng.gen::<f64>() < epsilon {
            rng.gen_range(0..POLICY_ACTIONS.len())
        } else {
            let q = network.q_values(&state)?;
            argmax(q.as_slice().unwrap_or(&[])).unwrap_or(2)
        };

        let outcome = env.step(action, base_price, unit_cost);
        reward_sum += outcome.reward;

        memory.push_back(Transition {
            state,
            action,
            reward: outcome.reward,
            next_state: outcome.next_state,
            done: outcome.done,
        });
        if memory.len() > params.memory_size {
            memory.pop_front();
        }

        let batch: Vec<&Transition> = if params.replay {
            let k = params.batch_size.min(memory.len());
            index::sample(&mut rng, memory.len(), k)
                .into_iter()
                .filter_map(|i| memory.get(i))
                .collect()
        } else {
            memory.iter().collect()
        };

        let mut targets = Vec::with_capacity(batch.len());
        for t in batch {
            let bootstrap = if t.done {
                0.0
            } else {
                network
                    .q_values(&t.next_state)?
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max)
            };
            targets.push(QTarget {
                state: t.state,
                action: t.action,
                target: t.reward + params.gamma * bootstrap,
            });
        }

        final_loss = network.train_batch(&targets, params.learning_rate)?;
        steps += 1;
    }

    let mean_reward = if params.episodes > 0 {
        reward_sum / params.episodes as f64
    } else {
        0.0
    };
    tracing::info!(
        "Pricing policy trained: {} episodes, final loss {:.4}, mean reward {:.2}",
        params.episodes,
        final_loss,
        mean_reward
    );

    Ok((
        network,
        PolicyTrainingReport {
            episodes: params.episodes,
            steps,
            final_loss,
            mean_reward,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PolicyNetwork;

    fn quick_params() -> PolicyTrainingParams {
        PolicyTrainingParams {
            episodes: 40,
            batch_size: 8,
            ..PolicyTrainingParams::default()
        }
    }

    #[test]
    fn short_training_produces_valid_network() {
        let (network, report) = train_policy(&quick_params(), PricingConfig::default()).unwrap();
        assert_eq!(report.episodes, 40);
        assert_eq!(report.steps, 40);
        assert!(report.final_loss.is_finite());
        network.validate().unwrap();
        let values = network.action_values(&[120.0, 6.0, 0.85, 1.0, 40.0]).unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn training_is_reproducible() {
        let (a, ra) = train_policy(&quick_params(), PricingConfig::default()).unwrap();
        let (b, rb) = train_policy(&quick_params(), PricingConfig::default()).unwrap();
        assert_eq!(ra, rb);
        assert_eq!(a, b);
    }

    #[test]
    fn without_replay_trains_on_whole_memory() {
        let params = PolicyTrainingParams {
            replay: false,
            episodes: 10,
            ..PolicyTrainingParams::default()
        };
        let (_, report) = train_policy(&params, PricingConfig::default()).unwrap();
        assert_eq!(report.steps, 10);
    }
}
