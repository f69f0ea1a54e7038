//! Customers service.

use std::rc::Rc;

use jiff::Timestamp;
use smallvec::smallvec;
use thiserror::Error;
use tracing::info;

use crate::{
    database::{Database, DatabaseError},
    models::{Customer, CustomerUuid, LoyaltyTier},
};

/// Crossing a multiple of this many points lifts a customer into the next
/// loyalty tier.
pub const ASCENSION_THRESHOLD: u64 = 10_000;

/// Minimum order total (minor units) for the founders discount at 30k+
/// points.
const FOUNDERS_MIN_TOTAL: u64 = 10_000;

/// Minimum order total (minor units) for the founders discount at 50k+
/// points.
const FOUNDERS_MIN_TOTAL_TOP: u64 = 5_000;

/// Cap on the founders discount, in minor units.
const FOUNDERS_CAP: u64 = 10_000;

/// Errors from customer operations.
#[derive(Debug, Error)]
pub enum CustomersServiceError {
    /// The email is already registered.
    #[error("email already registered")]
    EmailTaken,

    /// No such customer.
    #[error("customer not found")]
    NotFound,

    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Underlying storage failure.
    #[error("storage error")]
    Db(#[source] DatabaseError),
}

impl From<DatabaseError> for CustomersServiceError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(_) => Self::NotFound,
            DatabaseError::DuplicateKey(_) => Self::EmailTaken,
            other => Self::Db(other),
        }
    }
}

/// Data for a new account.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// Breakdown of the combined loyalty and founders discount on an order
/// total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundersDiscount {
    /// Tier discount in minor units.
    pub loyalty_discount: u64,
    /// Founders discount in minor units; zero unless the special applied.
    pub founders_discount: u64,
    /// Sum of both parts.
    pub total_discount: u64,
    /// Whether the founders special kicked in.
    pub special_applied: bool,
}

/// Service for account operations.
#[derive(Debug, Clone)]
pub struct CustomersService {
    db: Rc<Database>,
}

impl CustomersService {
    /// Create the service over a shared database handle.
    #[must_use]
    pub fn new(db: Rc<Database>) -> Self {
        Self { db }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`CustomersServiceError::EmailTaken`] if the email is
    /// already registered.
    pub fn register(&self, new: NewCustomer) -> Result<Customer, CustomersServiceError> {
        let customer = Customer {
            uuid: CustomerUuid::new(),
            password_hash: Customer::hash_password(&new.password),
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: new.phone,
            loyalty_tier: LoyaltyTier::Bronze,
            loyalty_points: 0,
            addresses: smallvec![],
            is_verified: false,
            is_active: true,
            last_login: None,
        };

        self.db.create_customer(customer.clone())?;

        Ok(customer)
    }

    /// Check credentials and stamp the login time.
    ///
    /// # Errors
    ///
    /// Returns [`CustomersServiceError::InvalidCredentials`] for an unknown
    /// email or a wrong password; unknown emails are indistinguishable from
    /// bad passwords on purpose.
    pub fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Customer, CustomersServiceError> {
        let customer = match self.db.get_customer_by_email(email) {
            Ok(customer) => customer,
            Err(DatabaseError::NotFound(_)) => {
                return Err(CustomersServiceError::InvalidCredentials);
            }
            Err(other) => return Err(other.into()),
        };

        if !customer.verify_password(password) {
            return Err(CustomersServiceError::InvalidCredentials);
        }

        let now = Timestamp::now();
        self.db
            .update_customer(customer.uuid, |stored| stored.last_login = Some(now))?;

        self.get_customer(customer.uuid)
    }

    /// Fetch a customer by UUID.
    ///
    /// # Errors
    ///
    /// Returns [`CustomersServiceError::NotFound`] for an unknown UUID.
    pub fn get_customer(&self, uuid: CustomerUuid) -> Result<Customer, CustomersServiceError> {
        Ok(self.db.get_customer(uuid)?)
    }

    /// The tier a points balance earns. Thresholds are multiples of
    /// [`ASCENSION_THRESHOLD`].
    #[must_use]
    pub fn tier_for_points(points: u64) -> LoyaltyTier {
        match points {
            p if p >= ASCENSION_THRESHOLD * 5 => LoyaltyTier::Obsidian,
            p if p >= ASCENSION_THRESHOLD * 3 => LoyaltyTier::Platinum,
            p if p >= ASCENSION_THRESHOLD * 2 => LoyaltyTier::Gold,
            p if p >= ASCENSION_THRESHOLD => LoyaltyTier::Silver,
            _ => LoyaltyTier::Bronze,
        }
    }

    /// Credit points for a purchase and re-evaluate the tier, returning the
    /// customer as stored afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`CustomersServiceError::NotFound`] for an unknown UUID.
    pub fn award_points(
        &self,
        uuid: CustomerUuid,
        purchase: u64,
    ) -> Result<Customer, CustomersServiceError> {
        let mut ascended_to = None;

        self.db.update_customer(uuid, |stored| {
            stored.earn_points(purchase);

            let earned_tier = Self::tier_for_points(stored.loyalty_points);
            if earned_tier != stored.loyalty_tier {
                stored.loyalty_tier = earned_tier;
                ascended_to = Some(earned_tier);
            }
        })?;

        if let Some(tier) = ascended_to {
            info!("customer {uuid} ascended to {}", tier.name());
        }

        self.get_customer(uuid)
    }

    /// Combined loyalty-tier and founders discount for an order total, in
    /// minor units.
    ///
    /// The founders special mirrors the FOUNDERS50 coupon: half the order
    /// total, capped at $100, for long-standing high-points customers.
    ///
    /// # Errors
    ///
    /// Returns [`CustomersServiceError::NotFound`] for an unknown UUID.
    pub fn founders_discount(
        &self,
        uuid: CustomerUuid,
        order_total: u64,
    ) -> Result<FoundersDiscount, CustomersServiceError> {
        let customer = self.get_customer(uuid)?;

        let loyalty_discount = customer.loyalty_discount(order_total);

        let qualifies = (customer.loyalty_points >= ASCENSION_THRESHOLD * 3
            && order_total >= FOUNDERS_MIN_TOTAL)
            || (customer.loyalty_points >= ASCENSION_THRESHOLD * 5
                && order_total >= FOUNDERS_MIN_TOTAL_TOP);

        let founders_discount = if qualifies {
            (order_total / 2).min(FOUNDERS_CAP)
        } else {
            0
        };

        Ok(FoundersDiscount {
            loyalty_discount,
            founders_discount,
            total_discount: loyalty_discount.saturating_add(founders_discount),
            special_applied: qualifies,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn service() -> Result<CustomersService, crate::database::SeedError> {
        Ok(CustomersService::new(Rc::new(Database::new()?)))
    }

    fn ada() -> NewCustomer {
        NewCustomer {
            email: "ada@example.com".to_owned(),
            password: "correct horse".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            phone: None,
        }
    }

    #[test]
    fn registration_rejects_duplicate_emails() -> TestResult {
        let service = service()?;
        service.register(ada())?;

        let result = service.register(ada());

        assert!(matches!(result, Err(CustomersServiceError::EmailTaken)));

        Ok(())
    }

    #[test]
    fn authentication_accepts_the_right_password_only() -> TestResult {
        let service = service()?;
        service.register(ada())?;

        let customer = service.authenticate("ada@example.com", "correct horse")?;

        assert!(customer.last_login.is_some());
        assert!(matches!(
            service.authenticate("ada@example.com", "wrong"),
            Err(CustomersServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            service.authenticate("nobody@example.com", "correct horse"),
            Err(CustomersServiceError::InvalidCredentials)
        ));

        Ok(())
    }

    #[test]
    fn tier_ladder_follows_the_ascension_threshold() {
        assert_eq!(CustomersService::tier_for_points(0), LoyaltyTier::Bronze);
        assert_eq!(
            CustomersService::tier_for_points(10_000),
            LoyaltyTier::Silver
        );
        assert_eq!(CustomersService::tier_for_points(20_000), LoyaltyTier::Gold);
        assert_eq!(
            CustomersService::tier_for_points(30_000),
            LoyaltyTier::Platinum
        );
        assert_eq!(
            CustomersService::tier_for_points(50_000),
            LoyaltyTier::Obsidian
        );
    }

    #[test]
    fn awarding_points_can_ascend_a_tier() -> TestResult {
        let service = service()?;
        let customer = service.register(ada())?;

        // $1,000.00 earns 10,000 points: exactly the silver threshold.
        let updated = service.award_points(customer.uuid, 100_000)?;

        assert_eq!(updated.loyalty_points, 10_000);
        assert_eq!(updated.loyalty_tier, LoyaltyTier::Silver);

        Ok(())
    }

    #[test]
    fn founders_discount_requires_points_and_spend() -> TestResult {
        let service = service()?;
        let customer = service.register(ada())?;

        // A $300,000 spend leaves the balance far past 30,000 points.
        service.award_points(customer.uuid, 30_000_000)?;

        let breakdown = service.founders_discount(customer.uuid, 50_000)?;

        assert!(breakdown.special_applied);
        assert_eq!(breakdown.founders_discount, 10_000, "capped at $100");

        let small_order = service.founders_discount(customer.uuid, 4_000)?;

        assert!(!small_order.special_applied);

        Ok(())
    }
}
