//! Дерево регрессии (MSE), базовый learner для бустинга

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Сколько порогов перебирать на признак
const MAX_THRESHOLDS: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    max_depth: usize,
    min_samples_split: usize,
    root: Option<TreeNode>,
}

impl RegressionTree {
    pub fn new(max_depth: usize, min_samples_split: usize) -> Self {
        Self {
            max_depth,
            min_samples_split: min_samples_split.max(2),
            root: None,
        }
    }

    /// Обучение на подмножестве строк `indices`
    pub fn fit(
        &mut self,
        X: &Array2<f64>,
        y: &Array1<f64>,
        indices: Vec<usize>,
    ) -> Result<(), ModelError> {
        if X.nrows() == 0 || indices.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        self.root = Some(self.build_tree(X, y, 0, indices));
        Ok(())
    }

    fn build_tree(&self, X: &Array2<f64>, y: &Array1<f64>, depth: usize, indices: Vec<usize>) -> TreeNode {
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;

        if depth >= self.max_depth || indices.len() < self.min_samples_split {
            return TreeNode::Leaf { value: mean };
        }

        let Some((feature, threshold)) = self.best_split(X, y, &indices) else {
            return TreeNode::Leaf { value: mean };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| X[[i, feature]] < threshold);

        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(self.build_tree(X, y, depth + 1, left_indices)),
            right: Box::new(self.build_tree(X, y, depth + 1, right_indices)),
        }
    }

    /// Перебор порогов по серединам между уникальными значениями признака.
    /// Минимизируем сумму квадратов отклонений в обеих половинах.
    fn best_split(&self, X: &Array2<f64>, y: &Array1<f64>, indices: &[usize]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        let mut best_score = f64::INFINITY;

        for feature in 0..X.ncols() {
            let mut values: Vec<f64> = indices.iter().map(|&i| X[[i, feature]]).collect();
            values.sort_by(|a, b| a.total_cmp(b));
            values.dedup();

            if values.len() < 2 {
                continue;
            }

            let step = ((values.len() - 1) as f64 / MAX_THRESHOLDS as f64).max(1.0);
            let mut k = 0.0;
            while (k as usize) < values.len() - 1 {
                let idx = k as usize;
                let threshold = 0.5 * (values[idx] + values[idx + 1]);
                k += step;

                let (mut left_n, mut left_sum, mut left_sq) = (0.0, 0.0, 0.0);
                let (mut right_n, mut right_sum, mut right_sq) = (0.0, 0.0, 0.0);
                for &i in indices {
                    let target = y[i];
                    if X[[i, feature]] < threshold {
                        left_n += 1.0;
                        left_sum += target;
                        left_sq += target * target;
                    } else {
                        right_n += 1.0;
                        right_sum += target;
                        right_sq += target * target;
                    }
                }

                if left_n == 0.0 || right_n == 0.0 {
                    continue;
                }

                let score = (left_sq - left_sum * left_sum / left_n)
                    + (right_sq - right_sum * right_sum / right_n);

                if score < best_score {
                    best_score = score;
                    best = Some((feature, threshold));
                }
            }
        }

        best
    }

    pub fn predict_row(&self, sample: ArrayView1<f64>) -> Result<f64, ModelError> {
        let root = self.root.as_ref().ok_or(ModelError::NotTrained)?;
        Self::predict_single(root, sample)
    }

    fn predict_single(node: &TreeNode, sample: ArrayView1<f64>) -> Result<f64, ModelError> {
        match node {
            TreeNode::Leaf { value } => Ok(*value),
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                let value = *sample.get(*feature).ok_or(ModelError::ShapeMismatch {
                    expected: feature + 1,
                    actual: sample.len(),
                })?;
                if value < *threshold {
                    Self::predict_single(left, sample)
                } else {
                    Self::predict_single(right, sample)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn learns_step_function() {
        let X = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![5.0, 5.0, 5.0, 9.0, 9.0, 9.0];
        let mut tree = RegressionTree::new(3, 2);
        tree.fit(&X, &y, (0..6).collect()).unwrap();
        assert_eq!(tree.predict_row(array![2.5].view()).unwrap(), 5.0);
        assert_eq!(tree.predict_row(array![11.5].view()).unwrap(), 9.0);
    }

    #[test]
    fn depth_zero_is_mean_leaf() {
        let X = array![[1.0], [2.0]];
        let y = array![2.0, 4.0];
        let mut tree = RegressionTree::new(0, 2);
        tree.fit(&X, &y, vec![0, 1]).unwrap();
        assert_eq!(tree.predict_row(array![100.0].view()).unwrap(), 3.0);
    }

    #[test]
    fn unfitted_tree_errors() {
        let tree = RegressionTree::new(3, 2);
        assert!(matches!(tree.predict_row(array![1.0].view()), Err(ModelError::NotTrained)));
    }

    #[test]
    fn short_sample_is_shape_mismatch() {
        let X = array![[0.0, 1.0], [0.0, 2.0], [0.0, 8.0], [0.0, 9.0]];
        let y = array![1.0, 1.0, 4.0, 4.0];
        let mut tree = RegressionTree::new(2, 2);
        tree.fit(&X, &y, (0..4).collect()).unwrap();
        let err = tree.predict_row(array![0.0].view()).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { .. }));
    }
}
