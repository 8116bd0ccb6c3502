//! Детерминированное A/B распределение продуктов

use crate::types::AbBucket;

pub const BUCKET_B_MULTIPLIER: f64 = 0.98;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a 64 по байтам UTF-8: стабилен между процессами и платформами
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Четный хеш -> A, нечетный -> B. При выключенном тесте всегда A.
pub fn assign_bucket(product_id: &str, enabled: bool) -> AbBucket {
    if !enabled {
        return AbBucket::A;
    }
    if fnv1a_64(product_id.as_bytes()) % 2 == 0 {
        AbBucket::A
    } else {
        AbBucket::B
    }
}

pub fn apply_bucket(price: f64, bucket: AbBucket) -> f64 {
    match bucket {
        AbBucket::A => price,
        AbBucket::B => price * BUCKET_B_MULTIPLIER,
    }
}
