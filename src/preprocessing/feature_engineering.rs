//! Feature engineering для моделей ценообразования

use ndarray::{Array1, Array2};

use crate::pricing::grade::grade_ordinal;
use crate::types::QualityGrade;

pub const REGRESSOR_FEATURES: usize = 5;
pub const POLICY_STATE_FEATURES: usize = 5;
pub const LEGACY_FEATURES: usize = 4;

/// Одна строка обучающей выборки для регрессора
#[derive(Debug, Clone, PartialEq)]
pub struct RegressorRow {
    pub base_price: f64,
    pub grade: QualityGrade,
    pub inventory: f64,
    pub expected_demand: f64,
    pub competitor_price: f64,
    pub target_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyRow {
    pub base_price: f64,
    pub competitor_price: f64,
    pub demand_index: f64,
    pub stock_level: f64,
    pub target_price: f64,
}

pub struct FeatureEngineer;

impl FeatureEngineer {
    /// [basePrice, gradeOrdinal, inventory, expectedDemand, competitorPrice]
    pub fn regressor_features(
        base_price: f64,
        grade: QualityGrade,
        inventory: f64,
        expected_demand: f64,
        competitor_price: f64,
    ) -> [f64; REGRESSOR_FEATURES] {
        [
            base_price,
            grade_ordinal(grade),
            inventory,
            expected_demand,
            competitor_price,
        ]
    }

    /// [inventory, expectedDemand, qualityFactor, competitor/base, expiryHours]
    pub fn policy_state(
        inventory: f64,
        expected_demand: f64,
        quality_factor: f64,
        competitor_price: f64,
        base_price: f64,
        expiry_hours: f64,
    ) -> [f64; POLICY_STATE_FEATURES] {
        let competitor_ratio = if base_price > 0.0 {
            competitor_price / base_price
        } else {
            1.0
        };
        [
            inventory,
            expected_demand,
            quality_factor,
            competitor_ratio,
            expiry_hours,
        ]
    }

    pub fn regressor_matrix(rows: &[RegressorRow]) -> (Array2<f64>, Array1<f64>) {
        let mut features = Array2::zeros((rows.len(), REGRESSOR_FEATURES));
        let mut targets = Array1::zeros(rows.len());

        for (i, row) in rows.iter().enumerate() {
            let x = Self::regressor_features(
                row.base_price,
                row.grade,
                row.inventory,
                row.expected_demand,
                row.competitor_price,
            );
            for (j, value) in x.iter().enumerate() {
                features[[i, j]] = *value;
            }
            targets[i] = row.target_price;
        }

        (features, targets)
    }

    pub fn legacy_matrix(rows: &[LegacyRow]) -> (Array2<f64>, Array1<f64>) {
        let mut features = Array2::zeros((rows.len(), LEGACY_FEATURES));
        let mut targets = Array1::zeros(rows.len());

        for (i, row) in rows.iter().enumerate() {
            features[[i, 0]] = row.base_price;
            features[[i, 1]] = row.competitor_price;
            features[[i, 2]] = row.demand_index;
            features[[i, 3]] = row.stock_level;
            targets[i] = row.target_price;
        }

        (features, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_state_guards_zero_base_price() {
        let state = FeatureEngineer::policy_state(10.0, 5.0, 0.85, 3.0, 0.0, 30.0);
        assert_eq!(state[3], 1.0);
        let state = FeatureEngineer::policy_state(10.0, 5.0, 0.85, 3.0, 2.0, 30.0);
        assert_eq!(state[3], 1.5);
    }

    #[test]
    fn regressor_matrix_layout() {
        let rows = vec![RegressorRow {
            base_price: 4.0,
            grade: QualityGrade::C,
            inventory: 12.0,
            expected_demand: 6.0,
            competitor_price: 3.9,
            target_price: 3.8,
        }];
        let (x, y) = FeatureEngineer::regressor_matrix(&rows);
        assert_eq!(x.row(0).to_vec(), vec![4.0, 0.0, 12.0, 6.0, 3.9]);
        assert_eq!(y[0], 3.8);
    }
}
