//! Q-сеть политики ценообразования: 5 признаков состояния -> 5 действий
//!
//! Полносвязная сеть 5 -> 64 -> 64 -> 5 с ReLU между слоями.
//! Вход стандартизируется нормализатором, сохраненным вместе с весами.

use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::models::PolicyNetwork;
use crate::preprocessing::DataNormalizer;

/// Дискретные корректировки цены, индекс совпадает с выходом сети
pub const POLICY_ACTIONS: [f64; 5] = [-0.10, -0.05, 0.0, 0.05, 0.10];

pub const STATE_DIM: usize = 5;
pub const HIDDEN_DIM: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DenseLayer {
    /// (out, in)
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl DenseLayer {
    fn random<R: Rng>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        // He uniform для ReLU
        let limit = (6.0 / inputs as f64).sqrt();
        Self {
            weights: Array2::from_shape_fn((outputs, inputs), |_| rng.gen_range(-limit..limit)),
            bias: Array1::zeros(outputs),
        }
    }

    fn forward(&self, x: ArrayView1<f64>) -> Array1<f64> {
        self.weights.dot(&x) + &self.bias
    }
}

/// Один переход для обучения: состояние, индекс действия, целевое значение Q
#[derive(Debug, Clone, PartialEq)]
pub struct QTarget {
    pub state: [f64; STATE_DIM],
    pub action: usize,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QNetwork {
    layers: Vec<DenseLayer>,
    scaler: DataNormalizer,
    /// Награды делятся на этот масштаб при обучении, выход сети умножается обратно
    reward_scale: f64,
}

impl QNetwork {
    pub fn new<R: Rng>(scaler: DataNormalizer, reward_scale: f64, rng: &mut R) -> Self {
        let dims = [STATE_DIM, HIDDEN_DIM, HIDDEN_DIM, POLICY_ACTIONS.len()];
        let layers = dims
            .windows(2)
            .map(|w| DenseLayer::random(w[0], w[1], &mut *rng))
            .collect();
        Self {
            layers,
            scaler,
            reward_scale: if reward_scale > 0.0 { reward_scale } else { 1.0 },
        }
    }

    /// Проверка архитектуры загруженного артефакта
    pub fn validate(&self) -> Result<(), ModelError> {
        let first = self.layers.first().ok_or(ModelError::NotTrained)?;
        if first.weights.ncols() != STATE_DIM {
            return Err(ModelError::ShapeMismatch {
                expected: STATE_DIM,
                actual: first.weights.ncols(),
            });
        }
        for pair in self.layers.windows(2) {
            if pair[1].weights.ncols() != pair[0].weights.nrows() {
                return Err(ModelError::ShapeMismatch {
                    expected: pair[0].weights.nrows(),
                    actual: pair[1].weights.ncols(),
                });
            }
        }
        for layer in &self.layers {
            if layer.bias.len() != layer.weights.nrows() {
                return Err(ModelError::ShapeMismatch {
                    expected: layer.weights.nrows(),
                    actual: layer.bias.len(),
                });
            }
        }
        let outputs = self.layers.last().map(|l| l.weights.nrows()).unwrap_or(0);
        if outputs != POLICY_ACTIONS.len() {
            return Err(ModelError::ShapeMismatch {
                expected: POLICY_ACTIONS.len(),
                actual: outputs,
            });
        }
        if self.scaler.n_features() != Some(STATE_DIM) {
            return Err(ModelError::ShapeMismatch {
                expected: STATE_DIM,
                actual: self.scaler.n_features().unwrap_or(0),
            });
        }
        Ok(())
    }

    /// Прямой проход с сохранением пре-активаций и активаций для backprop
    fn forward_trace(&self, state: &[f64]) -> Result<(Vec<Array1<f64>>, Vec<Array1<f64>>), ModelError> {
        let input = self.scaler.transform_row(ArrayView1::from(state))?;
        let mut activations = vec![input];
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        let last = self.layers.len() - 1;

        for (i, layer) in self.layers.iter().enumerate() {
            let z = layer.forward(activations[i].view());
            let a = if i == last { z.clone() } else { z.mapv(|v| v.max(0.0)) };
            pre_activations.push(z);
            activations.push(a);
        }

        Ok((pre_activations, activations))
    }

    /// Выход сети в масштабе наград
    pub fn q_values(&self, state: &[f64]) -> Result<Array1<f64>, ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::NotTrained);
        }
        let (_, activations) = self.forward_trace(state)?;
        let output = activations.last().ok_or(ModelError::NotTrained)?;
        Ok(output * self.reward_scale)
    }

    /// Один шаг SGD по MSE для выбранных действий. Возвращает средний loss (в масштабе сети).
    pub fn train_batch(&mut self, batch: &[QTarget], learning_rate: f64) -> Result<f64, ModelError> {
        if batch.is_empty() {
            return Ok(0.0);
        }
        if self.layers.is_empty() {
            return Err(ModelError::NotTrained);
        }

        let n = batch.len() as f64;
        let mut grad_w: Vec<Array2<f64>> = self.layers.iter().map(|l| Array2::zeros(l.weights.raw_dim())).collect();
        let mut grad_b: Vec<Array1<f64>> = self.layers.iter().map(|l| Array1::zeros(l.bias.len())).collect();
        let mut loss = 0.0;

        for sample in batch {
            if sample.action >= POLICY_ACTIONS.len() {
                return Err(ModelError::ShapeMismatch {
                    expected: POLICY_ACTIONS.len(),
                    actual: sample.action + 1,
                });
            }
            let (pre_activations, activations) = self.forward_trace(&sample.state)?;
            let output = &activations[activations.len() - 1];
            let error = output[sample.action] - sample.target / self.reward_scale;
            loss += error * error;

            let mut delta = Array1::zeros(output.len());
            delta[sample.action] = 2.0 * error / n;

            for i in (0..self.layers.len()).rev() {
                let input = &activations[i];
                grad_w[i] += &delta
                    .view()
                    .insert_axis(Axis(1))
                    .dot(&input.view().insert_axis(Axis(0)));
                grad_b[i] += &delta;

                if i > 0 {
                    let back = self.layers[i].weights.t().dot(&delta);
                    let relu_grad = pre_activations[i - 1].mapv(|z| if z > 0.0 { 1.0 } else { 0.0 });
                    delta = back * relu_grad;
                }
            }
        }

        for (layer, (gw, gb)) in self.layers.iter_mut().zip(grad_w.iter().zip(grad_b.iter())) {
            layer.weights.scaled_add(-learning_rate, gw);
            layer.bias.scaled_add(-learning_rate, gb);
        }

        Ok(loss / n)
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_vec(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read(path)?;
        let network: QNetwork = serde_json::from_slice(&raw)?;
        network.validate()?;
        Ok(network)
    }
}

impl PolicyNetwork for QNetwork {
    fn action_values(&self, state: &[f64]) -> Result<[f64; 5], ModelError> {
        let q = self.q_values(state)?;
        if q.len() != POLICY_ACTIONS.len() {
            return Err(ModelError::ShapeMismatch {
                expected: POLICY_ACTIONS.len(),
                actual: q.len(),
            });
        }
        let mut values = [0.0; 5];
        for (slot, value) in values.iter_mut().zip(q.iter()) {
            if !value.is_finite() {
                return Err(ModelError::NonFinite);
            }
            *slot = *value;
        }
        Ok(values)
    }
}

/// Индекс максимума, при равенстве побеждает первый
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, current)) if v <= current => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
