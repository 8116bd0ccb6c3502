//! Генерация кандидатов цены вокруг базовой

/// Относительные шаги в фиксированном порядке
pub const PRICE_STEPS: [f64; 5] = [-0.10, -0.05, 0.0, 0.05, 0.10];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceCandidate {
    pub price: f64,
    pub step: f64,
}

/// Нижняя граница цены: максимальная скидка, минимальная маржа и абсолютный минимум 0.1
pub fn price_floor(base_price: f64, unit_cost: f64, min_margin: f64, max_discount: f64) -> f64 {
    (base_price * (1.0 - max_discount))
        .max(unit_cost * (1.0 + min_margin))
        .max(0.1)
}

/// Пять кандидатов, каждый поднят до пола. Дубликаты не удаляются.
pub fn generate_candidates(
    base_price: f64,
    unit_cost: f64,
    min_margin: f64,
    max_discount: f64,
) -> Vec<PriceCandidate> {
    let floor = price_floor(base_price, unit_cost, min_margin, max_discount);
    PRICE_STEPS
        .iter()
        .map(|&step| PriceCandidate {
            price: (base_price * (1.0 + step)).max(floor),
            step,
        })
        .collect()
}

pub fn max_candidate_price(candidates: &[PriceCandidate]) -> Option<f64> {
    candidates.iter().map(|c| c.price).reduce(f64::max)
}
