//! Модель вознаграждения: насколько хороша цена
//!
//! Одна и та же функция используется онлайн (перебор кандидатов)
//! и офлайн (симулятор для обучения политики).

/// Рыночная ситуация, в которой оценивается цена
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardInputs {
    pub competitor_price: f64,
    pub base_price: f64,
    pub expected_demand: f64,
    pub inventory: f64,
    pub unit_cost: f64,
    pub expiry_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardEvaluation {
    pub price: f64,
    pub expected_sold: f64,
    pub revenue: f64,
    pub waste_cost: f64,
    pub satisfaction_bonus: f64,
    pub reward: f64,
}

pub fn waste_penalty_factor(expiry_hours: f64) -> f64 {
    if expiry_hours > 48.0 {
        0.2
    } else if expiry_hours > 24.0 {
        0.5
    } else {
        0.8
    }
}

/// Относительное изменение спроса от разницы с конкурентом.
/// Без положительной базовой цены эластичность не определена и считается нулевой.
pub fn elasticity(competitor_price: f64, price: f64, base_price: f64) -> f64 {
    if base_price > 0.0 {
        0.1 * (competitor_price - price) / base_price
    } else {
        0.0
    }
}

pub fn evaluate(price: f64, inputs: &RewardInputs) -> RewardEvaluation {
    let shift = elasticity(inputs.competitor_price, price, inputs.base_price);
    let demand_adjusted = (inputs.expected_demand * (1.0 + shift)).max(0.0);
    let sold = inputs.inventory.min(demand_adjusted);
    let revenue = sold * price;

    let waste_cost =
        (inputs.inventory - sold).max(0.0) * inputs.unit_cost * waste_penalty_factor(inputs.expiry_hours);

    // Бонус за цену почти как у конкурента (в пределах 3% базовой)
    let near_competitor =
        inputs.base_price > 0.0 && (price - inputs.competitor_price).abs() / inputs.base_price < 0.03;
    let satisfaction_bonus = if near_competitor {
        0.05 * revenue
    } else {
        0.0
    };

    RewardEvaluation {
        price,
        expected_sold: sold,
        revenue,
        waste_cost,
        satisfaction_bonus,
        reward: revenue - waste_cost + satisfaction_bonus,
    }
}
