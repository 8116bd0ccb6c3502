//! Коэффициенты сортов: наценка и влияние на спрос

use crate::types::QualityGrade;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeFactors {
    pub markup: f64,
    pub demand_quality: f64,
}

impl GradeFactors {
    pub fn for_grade(grade: QualityGrade) -> Self {
        match grade {
            QualityGrade::A => Self { markup: 2.0, demand_quality: 1.0 },
            QualityGrade::B => Self { markup: 1.6, demand_quality: 0.85 },
            QualityGrade::C => Self { markup: 1.3, demand_quality: 0.7 },
        }
    }
}

/// Порядковый номер сорта для признаков регрессора (A=2, B=1, C=0)
pub fn grade_ordinal(grade: QualityGrade) -> f64 {
    match grade {
        QualityGrade::A => 2.0,
        QualityGrade::B => 1.0,
        QualityGrade::C => 0.0,
    }
}

/// Множитель спроса по сроку годности
pub fn expiry_demand_factor(expiry_hours: f64) -> f64 {
    if expiry_hours > 48.0 {
        1.0
    } else if expiry_hours > 24.0 {
        0.7
    } else {
        0.5
    }
}
