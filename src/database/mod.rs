//! In-memory database layer.
//!
//! Typed, insertion-ordered tables with soft deletion, behind a pretend
//! connection pool. Single-threaded by design: interior mutability is a
//! [`RefCell`], not a lock.

use std::cell::RefCell;

use jiff::Timestamp;
use rustc_hash::FxHashMap;

pub mod errors;
pub mod pool;
pub mod query;
mod seed;
pub mod store;

pub use errors::DatabaseError;
pub use pool::{ConnectionPool, POOL_LIMIT, PoolStats};
pub use query::{Page, Paged};
pub use seed::SeedError;
pub use store::{Stored, TOMBSTONE_RETENTION, Table};

use crate::models::{
    Coupon, Customer, CustomerUuid, Order, OrderUuid, Product, ProductCategory, ProductUuid,
    Review, ReviewUuid,
};

/// Row counts per table, as reported by [`Database::stats`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    pub pool: PoolStats,
    /// `(table name, live row count)` pairs.
    pub collections: Vec<(&'static str, usize)>,
}

/// Tombstones purged per table by [`Database::run_maintenance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub products: usize,
    pub customers: usize,
    pub orders: usize,
    pub reviews: usize,
}

#[derive(Debug)]
struct Tables {
    products: Table<ProductUuid, Product>,
    customers: Table<CustomerUuid, Customer>,
    customers_by_email: FxHashMap<String, CustomerUuid>,
    orders: Table<OrderUuid, Order>,
    reviews: Table<ReviewUuid, Review>,
    coupons: Table<String, Coupon>,
}

/// The in-memory database.
#[derive(Debug)]
pub struct Database {
    pool: ConnectionPool,
    tables: RefCell<Tables>,
}

impl Database {
    /// Create a seeded database with the default pool limit.
    ///
    /// # Errors
    ///
    /// Returns a [`SeedError`] if the embedded seed fixture is malformed.
    pub fn new() -> Result<Self, SeedError> {
        Self::with_pool_limit(POOL_LIMIT)
    }

    /// Create a seeded database with a specific pool limit.
    ///
    /// # Errors
    ///
    /// Returns a [`SeedError`] if the embedded seed fixture is malformed.
    pub fn with_pool_limit(limit: usize) -> Result<Self, SeedError> {
        let mut coupons = Table::new("coupons");

        for coupon in seed::seed_coupons()? {
            let inserted = coupons.insert(coupon.code.clone(), coupon);

            debug_assert!(inserted.is_ok(), "seed coupon codes are unique");
        }

        Ok(Self {
            pool: ConnectionPool::new(limit),
            tables: RefCell::new(Tables {
                products: Table::new("products"),
                customers: Table::new("customers"),
                customers_by_email: FxHashMap::default(),
                orders: Table::new("orders"),
                reviews: Table::new("reviews"),
                coupons,
            }),
        })
    }

    // Product operations

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::DuplicateKey`] for an existing UUID, or
    /// [`DatabaseError::PoolExhausted`].
    pub fn create_product(&self, product: Product) -> Result<(), DatabaseError> {
        let _conn = self.pool.acquire()?;

        self.tables
            .borrow_mut()
            .products
            .insert(product.uuid, product)
    }

    /// Fetch a product by UUID.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] or [`DatabaseError::PoolExhausted`].
    pub fn get_product(&self, uuid: ProductUuid) -> Result<Product, DatabaseError> {
        let _conn = self.pool.acquire()?;

        self.tables
            .borrow()
            .products
            .get(&uuid)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("products/{uuid}")))
    }

    /// List products, optionally narrowed to a category.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::PoolExhausted`].
    pub fn list_products(
        &self,
        category: Option<ProductCategory>,
        page: Page,
    ) -> Result<Paged<Product>, DatabaseError> {
        let _conn = self.pool.acquire()?;

        Ok(self.tables.borrow().products.find(
            |product| category.is_none_or(|wanted| product.category == wanted),
            page,
        ))
    }

    /// Apply a mutation to a product.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] or [`DatabaseError::PoolExhausted`].
    pub fn update_product(
        &self,
        uuid: ProductUuid,
        apply: impl FnOnce(&mut Product),
    ) -> Result<(), DatabaseError> {
        let _conn = self.pool.acquire()?;

        self.tables.borrow_mut().products.update(&uuid, apply)
    }

    /// Soft-delete a product.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] or [`DatabaseError::PoolExhausted`].
    pub fn delete_product(&self, uuid: ProductUuid) -> Result<(), DatabaseError> {
        let _conn = self.pool.acquire()?;

        self.tables.borrow_mut().products.soft_delete(&uuid)
    }

    // Customer operations

    /// Insert a customer and index their email.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::DuplicateKey`] if the UUID or email is
    /// already in use, or [`DatabaseError::PoolExhausted`].
    pub fn create_customer(&self, customer: Customer) -> Result<(), DatabaseError> {
        let _conn = self.pool.acquire()?;
        let mut tables = self.tables.borrow_mut();

        if tables.customers_by_email.contains_key(&customer.email) {
            return Err(DatabaseError::DuplicateKey(format!(
                "customers/{}",
                customer.email
            )));
        }

        let uuid = customer.uuid;
        let email = customer.email.clone();

        tables.customers.insert(uuid, customer)?;
        tables.customers_by_email.insert(email, uuid);

        Ok(())
    }

    /// Fetch a customer by UUID.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] or [`DatabaseError::PoolExhausted`].
    pub fn get_customer(&self, uuid: CustomerUuid) -> Result<Customer, DatabaseError> {
        let _conn = self.pool.acquire()?;

        self.tables
            .borrow()
            .customers
            .get(&uuid)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("customers/{uuid}")))
    }

    /// Fetch a customer through the email index.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] or [`DatabaseError::PoolExhausted`].
    pub fn get_customer_by_email(&self, email: &str) -> Result<Customer, DatabaseError> {
        let _conn = self.pool.acquire()?;
        let tables = self.tables.borrow();

        tables
            .customers_by_email
            .get(email)
            .and_then(|uuid| tables.customers.get(uuid))
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("customers/{email}")))
    }

    /// Apply a mutation to a customer, keeping the email index in sync.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] or [`DatabaseError::PoolExhausted`].
    pub fn update_customer(
        &self,
        uuid: CustomerUuid,
        apply: impl FnOnce(&mut Customer),
    ) -> Result<(), DatabaseError> {
        let _conn = self.pool.acquire()?;
        let mut tables = self.tables.borrow_mut();

        let old_email = tables
            .customers
            .get(&uuid)
            .map(|customer| customer.email.clone());

        tables.customers.update(&uuid, apply)?;

        let new_email = tables
            .customers
            .get(&uuid)
            .map(|customer| customer.email.clone());

        if let (Some(old), Some(new)) = (old_email, new_email) {
            if old != new {
                tables.customers_by_email.remove(&old);
                tables.customers_by_email.insert(new, uuid);
            }
        }

        Ok(())
    }

    // Order operations

    /// Insert an order.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::DuplicateKey`] or [`DatabaseError::PoolExhausted`].
    pub fn create_order(&self, order: Order) -> Result<(), DatabaseError> {
        let _conn = self.pool.acquire()?;

        self.tables.borrow_mut().orders.insert(order.uuid, order)
    }

    /// Fetch an order by UUID.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] or [`DatabaseError::PoolExhausted`].
    pub fn get_order(&self, uuid: OrderUuid) -> Result<Order, DatabaseError> {
        let _conn = self.pool.acquire()?;

        self.tables
            .borrow()
            .orders
            .get(&uuid)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("orders/{uuid}")))
    }

    /// List a customer's orders.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::PoolExhausted`].
    pub fn list_customer_orders(
        &self,
        customer: CustomerUuid,
        page: Page,
    ) -> Result<Paged<Order>, DatabaseError> {
        let _conn = self.pool.acquire()?;

        Ok(self
            .tables
            .borrow()
            .orders
            .find(|order| order.customer == customer, page))
    }

    /// Apply a mutation to an order.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] or [`DatabaseError::PoolExhausted`].
    pub fn update_order(
        &self,
        uuid: OrderUuid,
        apply: impl FnOnce(&mut Order),
    ) -> Result<(), DatabaseError> {
        let _conn = self.pool.acquire()?;

        self.tables.borrow_mut().orders.update(&uuid, apply)
    }

    // Review operations

    /// Insert a review.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::DuplicateKey`] or [`DatabaseError::PoolExhausted`].
    pub fn create_review(&self, review: Review) -> Result<(), DatabaseError> {
        let _conn = self.pool.acquire()?;

        self.tables.borrow_mut().reviews.insert(review.uuid, review)
    }

    /// Fetch a review by UUID.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] or [`DatabaseError::PoolExhausted`].
    pub fn get_review(&self, uuid: ReviewUuid) -> Result<Review, DatabaseError> {
        let _conn = self.pool.acquire()?;

        self.tables
            .borrow()
            .reviews
            .get(&uuid)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("reviews/{uuid}")))
    }

    /// List a product's reviews.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::PoolExhausted`].
    pub fn list_product_reviews(
        &self,
        product: ProductUuid,
        page: Page,
    ) -> Result<Paged<Review>, DatabaseError> {
        let _conn = self.pool.acquire()?;

        Ok(self
            .tables
            .borrow()
            .reviews
            .find(|review| review.product == product, page))
    }

    /// Apply a mutation to a review.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] or [`DatabaseError::PoolExhausted`].
    pub fn update_review(
        &self,
        uuid: ReviewUuid,
        apply: impl FnOnce(&mut Review),
    ) -> Result<(), DatabaseError> {
        let _conn = self.pool.acquire()?;

        self.tables.borrow_mut().reviews.update(&uuid, apply)
    }

    // Coupon operations

    /// Fetch a coupon by code.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] or [`DatabaseError::PoolExhausted`].
    pub fn get_coupon(&self, code: &str) -> Result<Coupon, DatabaseError> {
        let _conn = self.pool.acquire()?;

        self.tables
            .borrow()
            .coupons
            .get(&code.to_owned())
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("coupons/{code}")))
    }

    /// Bump a coupon's use counter.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] or [`DatabaseError::PoolExhausted`].
    pub fn increment_coupon_usage(&self, code: &str) -> Result<(), DatabaseError> {
        let _conn = self.pool.acquire()?;

        self.tables
            .borrow_mut()
            .coupons
            .update(&code.to_owned(), |coupon| {
                coupon.current_uses = coupon.current_uses.saturating_add(1);
            })
    }

    // Maintenance operations

    /// Purge expired tombstones from every soft-deleting table.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::PoolExhausted`].
    pub fn run_maintenance(&self, now: Timestamp) -> Result<MaintenanceReport, DatabaseError> {
        let _conn = self.pool.acquire()?;
        let mut tables = self.tables.borrow_mut();

        Ok(MaintenanceReport {
            products: tables.products.purge_tombstones(now),
            customers: tables.customers.purge_tombstones(now),
            orders: tables.orders.purge_tombstones(now),
            reviews: tables.reviews.purge_tombstones(now),
        })
    }

    /// Pool usage and live row counts.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::PoolExhausted`].
    pub fn stats(&self) -> Result<DatabaseStats, DatabaseError> {
        let _conn = self.pool.acquire()?;
        let tables = self.tables.borrow();

        Ok(DatabaseStats {
            pool: self.pool.stats(),
            collections: vec![
                (tables.products.name(), tables.products.live_len()),
                (tables.customers.name(), tables.customers.live_len()),
                (tables.orders.name(), tables.orders.live_len()),
                (tables.reviews.name(), tables.reviews.live_len()),
                (tables.coupons.name(), tables.coupons.live_len()),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::models::{Dimensions, ProductCategory};

    use super::*;

    fn sample_product(name: &str, category: ProductCategory) -> Product {
        Product {
            uuid: ProductUuid::new(),
            name: name.to_owned(),
            description: String::new(),
            price: 1000,
            category,
            stock_quantity: 3,
            sku: name.to_uppercase(),
            weight_kg: Decimal::ONE,
            dimensions: Dimensions::default(),
            is_active: true,
            is_featured: false,
            tags: Vec::new(),
            images: Vec::new(),
        }
    }

    #[test]
    fn seeded_database_knows_the_founders_coupon() -> TestResult {
        let db = Database::new()?;

        let coupon = db.get_coupon("FOUNDERS50")?;

        assert_eq!(coupon.max_discount, Some(10_000));

        Ok(())
    }

    #[test]
    fn duplicate_emails_are_rejected() -> TestResult {
        let db = Database::new()?;

        let mut first = crate::models::Customer {
            uuid: CustomerUuid::new(),
            email: "ada@example.com".to_owned(),
            password_hash: String::new(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            phone: None,
            loyalty_tier: crate::models::LoyaltyTier::Bronze,
            loyalty_points: 0,
            addresses: smallvec::smallvec![],
            is_verified: false,
            is_active: true,
            last_login: None,
        };

        db.create_customer(first.clone())?;

        first.uuid = CustomerUuid::new();
        let result = db.create_customer(first);

        assert_eq!(
            result,
            Err(DatabaseError::DuplicateKey(
                "customers/ada@example.com".to_owned()
            ))
        );

        Ok(())
    }

    #[test]
    fn category_filter_narrows_product_listings() -> TestResult {
        let db = Database::new()?;

        db.create_product(sample_product("radio", ProductCategory::Electronics))?;
        db.create_product(sample_product("novel", ProductCategory::Books))?;

        let all = db.list_products(None, Page::default())?;
        let books = db.list_products(Some(ProductCategory::Books), Page::default())?;

        assert_eq!(all.total, 2);
        assert_eq!(books.total, 1);
        assert_eq!(
            books.data.first().map(|p| p.name.as_str()),
            Some("novel")
        );

        Ok(())
    }

    #[test]
    fn coupon_usage_counter_increments() -> TestResult {
        let db = Database::new()?;

        db.increment_coupon_usage("FOUNDERS50")?;
        db.increment_coupon_usage("FOUNDERS50")?;

        assert_eq!(db.get_coupon("FOUNDERS50")?.current_uses, 2);

        Ok(())
    }

    #[test]
    fn stats_counts_live_rows() -> TestResult {
        let db = Database::new()?;
        let product = sample_product("radio", ProductCategory::Electronics);
        let uuid = product.uuid;

        db.create_product(product)?;
        db.delete_product(uuid)?;

        let stats = db.stats()?;

        assert!(stats.collections.contains(&("products", 0)));
        assert!(stats.collections.contains(&("coupons", 1)));

        Ok(())
    }
}
