//! Discount coupons.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::models::{category::ProductCategory, product::ProductUuid};

/// How a coupon reduces a subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CouponDiscount {
    /// A fraction of the subtotal.
    Percent(Percentage),
    /// A flat amount in minor units.
    Fixed(u64),
}

/// A discount coupon, keyed by its code.
#[derive(Debug, Clone)]
pub struct Coupon {
    pub code: String,
    pub discount: CouponDiscount,
    /// Minimum qualifying subtotal in minor units.
    pub min_purchase: u64,
    /// Upper bound on the discount, in minor units.
    pub max_discount: Option<u64>,
    pub max_uses: Option<u32>,
    pub current_uses: u32,
    pub valid_from: Timestamp,
    pub valid_until: Option<Timestamp>,
    pub applicable_categories: Vec<ProductCategory>,
    pub excluded_products: Vec<ProductUuid>,
    pub description: String,
}

impl Coupon {
    /// Whether the coupon applies to a purchase of the given subtotal at
    /// the given moment.
    #[must_use]
    pub fn is_valid(&self, subtotal: u64, now: Timestamp) -> bool {
        if now < self.valid_from {
            return false;
        }

        if self.valid_until.is_some_and(|until| now > until) {
            return false;
        }

        if self
            .max_uses
            .is_some_and(|limit| self.current_uses >= limit)
        {
            return false;
        }

        subtotal >= self.min_purchase
    }

    /// The discount this coupon takes off the subtotal, in minor units.
    /// Zero when the coupon does not apply; never more than the subtotal
    /// or the coupon's cap.
    #[must_use]
    pub fn discount_amount(&self, subtotal: u64, now: Timestamp) -> u64 {
        if !self.is_valid(subtotal, now) {
            return 0;
        }

        let raw = match self.discount {
            CouponDiscount::Percent(rate) => (rate * Decimal::from(subtotal))
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_u64()
                .unwrap_or(0),
            CouponDiscount::Fixed(amount) => amount,
        };

        let capped = match self.max_discount {
            Some(cap) => raw.min(cap),
            None => raw,
        };

        capped.min(subtotal)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn founders(now: Timestamp) -> Coupon {
        Coupon {
            code: "FOUNDERS50".to_owned(),
            discount: CouponDiscount::Percent(Percentage::from(0.50)),
            min_purchase: 0,
            max_discount: Some(10_000),
            max_uses: None,
            current_uses: 0,
            valid_from: now,
            valid_until: None,
            applicable_categories: Vec::new(),
            excluded_products: Vec::new(),
            description: "Founding team discount".to_owned(),
        }
    }

    #[test]
    fn percent_discount_is_capped() -> TestResult {
        let now: Timestamp = "2024-06-01T00:00:00Z".parse()?;
        let coupon = founders(now);

        // Half of $500 would be $250, capped at $100.
        assert_eq!(coupon.discount_amount(50_000, now), 10_000);
        // Half of $30 is under the cap.
        assert_eq!(coupon.discount_amount(3_000, now), 1_500);

        Ok(())
    }

    #[test]
    fn expired_coupon_gives_nothing() -> TestResult {
        let now: Timestamp = "2024-06-01T00:00:00Z".parse()?;

        let mut coupon = founders(now);
        coupon.valid_until = Some("2024-05-01T00:00:00Z".parse()?);

        assert!(!coupon.is_valid(5_000, now));
        assert_eq!(coupon.discount_amount(5_000, now), 0);

        Ok(())
    }

    #[test]
    fn use_limit_is_enforced() -> TestResult {
        let now: Timestamp = "2024-06-01T00:00:00Z".parse()?;

        let mut coupon = founders(now);
        coupon.max_uses = Some(2);
        coupon.current_uses = 2;

        assert!(!coupon.is_valid(5_000, now));

        Ok(())
    }

    #[test]
    fn minimum_purchase_gates_the_coupon() -> TestResult {
        let now: Timestamp = "2024-06-01T00:00:00Z".parse()?;

        let mut coupon = founders(now);
        coupon.min_purchase = 2_500;

        assert!(!coupon.is_valid(2_499, now));
        assert!(coupon.is_valid(2_500, now));

        Ok(())
    }

    #[test]
    fn fixed_discount_never_exceeds_the_subtotal() -> TestResult {
        let now: Timestamp = "2024-06-01T00:00:00Z".parse()?;

        let mut coupon = founders(now);
        coupon.discount = CouponDiscount::Fixed(5_000);

        assert_eq!(coupon.discount_amount(3_000, now), 3_000);

        Ok(())
    }
}
