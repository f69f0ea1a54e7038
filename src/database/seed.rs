//! Seed fixtures.
//!
//! The rows a fresh database starts with, embedded as YAML so the fixture
//! reads like data rather than construction code.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Coupon, CouponDiscount};

const SEED_YAML: &str = include_str!("seed.yaml");

/// Error raised when the embedded seed fixture cannot be parsed.
#[derive(Debug, Error)]
#[error("malformed seed fixture")]
pub struct SeedError(#[from] serde_norway::Error);

#[derive(Debug, Deserialize)]
struct SeedFile {
    coupons: Vec<SeedCoupon>,
}

#[derive(Debug, Deserialize)]
struct SeedCoupon {
    code: String,
    percent_off: f64,
    #[serde(default)]
    max_discount: Option<u64>,
    #[serde(default)]
    min_purchase: u64,
    #[serde(default)]
    max_uses: Option<u32>,
    valid_from: Timestamp,
    #[serde(default)]
    valid_until: Option<Timestamp>,
    description: String,
}

impl From<SeedCoupon> for Coupon {
    fn from(seed: SeedCoupon) -> Self {
        Coupon {
            code: seed.code,
            discount: CouponDiscount::Percent(Percentage::from(seed.percent_off)),
            min_purchase: seed.min_purchase,
            max_discount: seed.max_discount,
            max_uses: seed.max_uses,
            current_uses: 0,
            valid_from: seed.valid_from,
            valid_until: seed.valid_until,
            applicable_categories: Vec::new(),
            excluded_products: Vec::new(),
            description: seed.description,
        }
    }
}

/// Parse the embedded coupon fixtures.
///
/// # Errors
///
/// Returns a [`SeedError`] if the embedded YAML is malformed.
pub(crate) fn seed_coupons() -> Result<Vec<Coupon>, SeedError> {
    let file: SeedFile = serde_norway::from_str(SEED_YAML)?;

    Ok(file.coupons.into_iter().map(Coupon::from).collect())
}
