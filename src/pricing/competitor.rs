//! Поправка цены относительно конкурента

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompetitorAdjustment {
    pub price: f64,
    pub adjusted: bool,
}

/// Сдвигает цену к цене конкурента:
/// вниз, если мы заметно дороже и есть давление склада или срока;
/// вверх, если заметно дешевле при дефиците.
/// Результат зажимается в [floor, ceiling].
pub fn adjust_for_competitor(
    price: f64,
    competitor_price: f64,
    inventory: u32,
    expiry_hours: f64,
    floor: f64,
    ceiling: f64,
) -> CompetitorAdjustment {
    if competitor_price <= 0.0 {
        return CompetitorAdjustment { price, adjusted: false };
    }

    let ratio = price / competitor_price;
    let pull = if ratio > 1.05 && (inventory > 30 || expiry_hours <= 24.0) {
        0.3
    } else if ratio < 0.95 && inventory < 10 {
        0.2
    } else {
        return CompetitorAdjustment { price, adjusted: false };
    };

    let nudged = price + pull * (competitor_price - price);
    CompetitorAdjustment {
        price: nudged.max(floor).min(ceiling),
        adjusted: true,
    }
}
