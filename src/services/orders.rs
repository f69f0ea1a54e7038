//! Orders service.

use std::rc::Rc;

use decimal_percentage::Percentage;
use jiff::{SignedDuration, Timestamp};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    database::{Database, DatabaseError},
    models::{
        Address, CustomerUuid, Order, OrderLine, OrderStatus, OrderUuid, PaymentMethod,
        PaymentStatus, ProductUuid, order::FREE_SHIPPING_THRESHOLD,
    },
    services::{
        customers::CustomersService,
        products::{ProductsService, ProductsServiceError},
        shipping::ShippingService,
    },
};

/// Products carrying this tag bump the whole order to express handling.
pub const PRIORITY_TAG: &str = "FLASH";

/// Default sales tax rate applied to order subtotals.
pub const DEFAULT_TAX_RATE: f64 = 0.08;

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrdersServiceError {
    /// The ordering customer does not exist.
    #[error("customer not found")]
    CustomerNotFound,

    /// A line references a product that does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// No such order.
    #[error("order not found")]
    NotFound,

    /// A line asks for zero units.
    #[error("line quantity must be positive")]
    InvalidQuantity,

    /// A line asks for more units than are in stock.
    #[error("insufficient stock for {name}")]
    InsufficientStock {
        /// The product short on stock.
        name: String,
    },

    /// The order has already shipped, been delivered or been refunded.
    #[error("order can no longer be cancelled")]
    NotCancellable,

    /// Underlying storage failure.
    #[error("storage error")]
    Db(#[source] DatabaseError),
}

impl From<DatabaseError> for OrdersServiceError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(_) => Self::NotFound,
            other => Self::Db(other),
        }
    }
}

/// One requested line of a new order.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product: ProductUuid,
    pub quantity: u32,
    pub gift_wrap: bool,
    pub gift_message: Option<String>,
}

/// Data for a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer: CustomerUuid,
    pub lines: Vec<NewOrderLine>,
    pub shipping_address: Address,
    /// Defaults to the shipping address when absent.
    pub billing_address: Option<Address>,
    pub coupon_code: Option<String>,
    pub notes: Option<String>,
}

/// Service for the order lifecycle.
#[derive(Debug, Clone)]
pub struct OrdersService {
    db: Rc<Database>,
    products: ProductsService,
    customers: CustomersService,
    shipping: ShippingService,
    tax_rate: Percentage,
}

impl OrdersService {
    /// Create the service with the default tax rate.
    #[must_use]
    pub fn new(db: Rc<Database>) -> Self {
        Self::with_tax_rate(db, Percentage::from(DEFAULT_TAX_RATE))
    }

    /// Create the service with an explicit tax rate.
    #[must_use]
    pub fn with_tax_rate(db: Rc<Database>, tax_rate: Percentage) -> Self {
        Self {
            products: ProductsService::new(Rc::clone(&db)),
            customers: CustomersService::new(Rc::clone(&db)),
            shipping: ShippingService,
            db,
            tax_rate,
        }
    }

    /// Place an order: price the lines, quote shipping, apply discounts,
    /// reserve stock and persist.
    ///
    /// Lines tagged [`PRIORITY_TAG`] upgrade the whole shipment to express
    /// handling; subtotals at or above the free-shipping threshold zero the
    /// shipping cost.
    ///
    /// # Errors
    ///
    /// Returns an [`OrdersServiceError`] when the customer or a product is
    /// unknown, a quantity is zero, or stock is insufficient.
    pub fn create_order(&self, new: NewOrder) -> Result<Order, OrdersServiceError> {
        let customer = self
            .customers
            .get_customer(new.customer)
            .map_err(|_| OrdersServiceError::CustomerNotFound)?;

        let mut lines: SmallVec<[OrderLine; 4]> = SmallVec::new();
        let mut total_weight = Decimal::ZERO;
        let mut is_priority = false;

        for requested in &new.lines {
            if requested.quantity == 0 {
                return Err(OrdersServiceError::InvalidQuantity);
            }

            let product = self
                .products
                .get_product(requested.product)
                .map_err(|_| OrdersServiceError::ProductNotFound)?;

            if product.stock_quantity < requested.quantity {
                return Err(OrdersServiceError::InsufficientStock { name: product.name });
            }

            total_weight += product.shipping_weight_kg() * Decimal::from(requested.quantity);
            is_priority |= product.has_tag(PRIORITY_TAG);

            lines.push(OrderLine {
                product: requested.product,
                unit_price: product.bulk_unit_price(requested.quantity),
                quantity: requested.quantity,
                gift_wrap: requested.gift_wrap,
                gift_message: requested.gift_message.clone(),
            });
        }

        let subtotal = lines
            .iter()
            .fold(0_u64, |acc, line| acc.saturating_add(line.subtotal()));

        let quote = self.shipping.quote(total_weight, is_priority);
        let mut shipping_cost = quote.cost;

        let uuid = OrderUuid::new();

        if subtotal >= FREE_SHIPPING_THRESHOLD {
            shipping_cost = 0;
            info!("order {uuid} qualifies for free luxury shipping");
        }

        let placed_at = Timestamp::now();

        let mut discount = customer.loyalty_discount(subtotal);

        if let Some(code) = new.coupon_code.as_deref() {
            discount = discount.saturating_add(self.coupon_discount(code, subtotal, placed_at)?);
        }

        let tax = self.tax_on(subtotal);
        let total = subtotal
            .saturating_add(tax)
            .saturating_add(shipping_cost)
            .saturating_sub(discount);

        let order = Order {
            uuid,
            customer: customer.uuid,
            lines,
            billing_address: new.billing_address.unwrap_or_else(|| new.shipping_address.clone()),
            shipping_address: new.shipping_address,
            status: OrderStatus::Pending,
            subtotal,
            tax,
            shipping_cost,
            discount,
            total,
            payment_method: PaymentMethod::CreditCard,
            payment_status: PaymentStatus::Pending,
            transaction_id: None,
            carrier: Some(quote.carrier.to_owned()),
            tracking_number: None,
            estimated_delivery: placed_at
                .checked_add(SignedDuration::from_hours(24 * i64::from(quote.estimated_days)))
                .ok(),
            is_priority,
            notes: new.notes,
            cancellation_reason: None,
            placed_at,
        };

        // Reserve stock only once every line has passed validation.
        for line in &order.lines {
            self.reserve_stock(line)?;
        }

        self.db.create_order(order.clone())?;

        let earned = self.customers.award_points(customer.uuid, total);
        if let Ok(after) = earned {
            debug!(
                "order {uuid} left customer {} with {} points",
                after.uuid, after.loyalty_points
            );
        }

        Ok(order)
    }

    /// Move an order into processing, flagging priority shipments.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersServiceError::NotFound`] for an unknown order.
    pub fn process_order(&self, uuid: OrderUuid) -> Result<Order, OrdersServiceError> {
        let order = self.db.get_order(uuid)?;

        if order.is_priority {
            info!("order {uuid} has {PRIORITY_TAG} items, priority processing");
        }

        self.db
            .update_order(uuid, |stored| stored.status = OrderStatus::Processing)?;

        Ok(self.db.get_order(uuid)?)
    }

    /// Cancel an order and put its stock back.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersServiceError::NotCancellable`] once the order has
    /// shipped, or [`OrdersServiceError::NotFound`] for an unknown order.
    pub fn cancel_order(&self, uuid: OrderUuid, reason: &str) -> Result<Order, OrdersServiceError> {
        let order = self.db.get_order(uuid)?;

        if !order.can_cancel() {
            return Err(OrdersServiceError::NotCancellable);
        }

        for line in &order.lines {
            self.products
                .update_stock(line.product, i64::from(line.quantity))
                .map_err(|_| OrdersServiceError::ProductNotFound)?;
        }

        self.db.update_order(uuid, |stored| {
            stored.status = OrderStatus::Cancelled;
            stored.cancellation_reason = Some(reason.to_owned());
        })?;

        Ok(self.db.get_order(uuid)?)
    }

    fn reserve_stock(&self, line: &OrderLine) -> Result<(), OrdersServiceError> {
        match self
            .products
            .update_stock(line.product, -i64::from(line.quantity))
        {
            Ok(_) => Ok(()),
            Err(ProductsServiceError::InsufficientStock { .. }) => {
                Err(OrdersServiceError::InsufficientStock {
                    name: line.product.to_string(),
                })
            }
            Err(_) => Err(OrdersServiceError::ProductNotFound),
        }
    }

    fn coupon_discount(
        &self,
        code: &str,
        subtotal: u64,
        now: Timestamp,
    ) -> Result<u64, OrdersServiceError> {
        let coupon = match self.db.get_coupon(code) {
            Ok(coupon) => coupon,
            // An unknown code is simply worth nothing.
            Err(DatabaseError::NotFound(_)) => return Ok(0),
            Err(other) => return Err(other.into()),
        };

        let amount = coupon.discount_amount(subtotal, now);

        if amount > 0 {
            self.db.increment_coupon_usage(code)?;
        }

        Ok(amount)
    }

    fn tax_on(&self, subtotal: u64) -> u64 {
        (self.tax_rate * Decimal::from(subtotal))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        models::{Dimensions, ProductCategory},
        services::{customers::NewCustomer, products::NewProduct},
    };

    use super::*;

    struct Fixture {
        orders: OrdersService,
        products: ProductsService,
        customers: CustomersService,
    }

    fn fixture() -> Result<Fixture, crate::database::SeedError> {
        let db = Rc::new(Database::new()?);

        Ok(Fixture {
            orders: OrdersService::new(Rc::clone(&db)),
            products: ProductsService::new(Rc::clone(&db)),
            customers: CustomersService::new(db),
        })
    }

    fn catalog_product(name: &str, price: u64, stock: u32, tags: &[&str]) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            description: String::new(),
            price,
            category: ProductCategory::Electronics,
            stock_quantity: stock,
            sku: name.to_uppercase(),
            weight_kg: Decimal::ONE,
            dimensions: Dimensions::default(),
            is_featured: false,
            tags: tags.iter().map(|&t| t.to_owned()).collect(),
            images: Vec::new(),
        }
    }

    fn shopper(email: &str) -> NewCustomer {
        NewCustomer {
            email: email.to_owned(),
            password: "hunter2hunter2".to_owned(),
            first_name: "Grace".to_owned(),
            last_name: "Hopper".to_owned(),
            phone: None,
        }
    }

    fn order_for(
        customer: CustomerUuid,
        product: ProductUuid,
        quantity: u32,
        coupon: Option<&str>,
    ) -> NewOrder {
        NewOrder {
            customer,
            lines: vec![NewOrderLine {
                product,
                quantity,
                gift_wrap: false,
                gift_message: None,
            }],
            shipping_address: Address::new("12 Elm St", "Springfield", "IL", "62704", "US"),
            billing_address: None,
            coupon_code: coupon.map(str::to_owned),
            notes: None,
        }
    }

    #[test]
    fn order_totals_add_up() -> TestResult {
        let fx = fixture()?;
        let product = fx.products.create_product(catalog_product("radio", 2500, 5, &[]))?;
        let customer = fx.customers.register(shopper("grace@example.com"))?;

        let order = fx
            .orders
            .create_order(order_for(customer.uuid, product.uuid, 2, None))?;

        // Two radios at $25, bronze loyalty 5%, 8% tax, 2kg ground shipping.
        assert_eq!(order.subtotal, 5000);
        assert_eq!(order.tax, 400);
        assert_eq!(order.shipping_cost, 599 + 100);
        assert_eq!(order.discount, 250);
        assert_eq!(order.total, 5000 + 400 + 699 - 250);
        assert_eq!(order.carrier.as_deref(), Some("Standard Ground"));

        Ok(())
    }

    #[test]
    fn ordering_reserves_stock_and_cancelling_restores_it() -> TestResult {
        let fx = fixture()?;
        let product = fx.products.create_product(catalog_product("radio", 2500, 5, &[]))?;
        let customer = fx.customers.register(shopper("grace@example.com"))?;

        let order = fx
            .orders
            .create_order(order_for(customer.uuid, product.uuid, 3, None))?;

        assert_eq!(fx.products.get_product(product.uuid)?.stock_quantity, 2);

        let cancelled = fx.orders.cancel_order(order.uuid, "changed my mind")?;

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(
            cancelled.cancellation_reason.as_deref(),
            Some("changed my mind")
        );
        assert_eq!(fx.products.get_product(product.uuid)?.stock_quantity, 5);

        Ok(())
    }

    #[test]
    fn overselling_is_rejected_up_front() -> TestResult {
        let fx = fixture()?;
        let product = fx.products.create_product(catalog_product("radio", 2500, 1, &[]))?;
        let customer = fx.customers.register(shopper("grace@example.com"))?;

        let result = fx
            .orders
            .create_order(order_for(customer.uuid, product.uuid, 2, None));

        assert!(matches!(
            result,
            Err(OrdersServiceError::InsufficientStock { .. })
        ));
        assert_eq!(fx.products.get_product(product.uuid)?.stock_quantity, 1);

        Ok(())
    }

    #[test]
    fn zero_quantity_lines_are_rejected() -> TestResult {
        let fx = fixture()?;
        let product = fx.products.create_product(catalog_product("radio", 2500, 5, &[]))?;
        let customer = fx.customers.register(shopper("grace@example.com"))?;

        let result = fx
            .orders
            .create_order(order_for(customer.uuid, product.uuid, 0, None));

        assert!(matches!(result, Err(OrdersServiceError::InvalidQuantity)));

        Ok(())
    }

    #[test]
    fn flash_tagged_lines_ship_express() -> TestResult {
        let fx = fixture()?;
        let product = fx
            .products
            .create_product(catalog_product("drop lamp", 2500, 5, &[PRIORITY_TAG]))?;
        let customer = fx.customers.register(shopper("grace@example.com"))?;

        let order = fx
            .orders
            .create_order(order_for(customer.uuid, product.uuid, 1, None))?;

        assert!(order.is_priority);
        assert_eq!(order.carrier.as_deref(), Some("Express Air"));

        let processed = fx.orders.process_order(order.uuid)?;

        assert_eq!(processed.status, OrderStatus::Processing);

        Ok(())
    }

    #[test]
    fn big_subtotals_ship_free() -> TestResult {
        let fx = fixture()?;
        let product = fx
            .products
            .create_product(catalog_product("amplifier", 60_000, 5, &[]))?;
        let customer = fx.customers.register(shopper("grace@example.com"))?;

        let order = fx
            .orders
            .create_order(order_for(customer.uuid, product.uuid, 1, None))?;

        assert_eq!(order.shipping_cost, 0);

        Ok(())
    }

    #[test]
    fn founders_coupon_is_applied_and_counted() -> TestResult {
        let fx = fixture()?;
        let product = fx
            .products
            .create_product(catalog_product("amplifier", 40_000, 5, &[]))?;
        let customer = fx.customers.register(shopper("grace@example.com"))?;

        let order = fx.orders.create_order(order_for(
            customer.uuid,
            product.uuid,
            1,
            Some("FOUNDERS50"),
        ))?;

        // Bronze 5% of $400 plus 50% capped at $100.
        assert_eq!(order.discount, 2000 + 10_000);

        Ok(())
    }

    #[test]
    fn unknown_coupon_is_worth_nothing() -> TestResult {
        let fx = fixture()?;
        let product = fx.products.create_product(catalog_product("radio", 2500, 5, &[]))?;
        let customer = fx.customers.register(shopper("grace@example.com"))?;

        let order = fx.orders.create_order(order_for(
            customer.uuid,
            product.uuid,
            1,
            Some("NOSUCHCODE"),
        ))?;

        // Only the bronze loyalty discount applies.
        assert_eq!(order.discount, 125);

        Ok(())
    }

    #[test]
    fn shipped_orders_cannot_be_cancelled() -> TestResult {
        let fx = fixture()?;
        let product = fx.products.create_product(catalog_product("radio", 2500, 5, &[]))?;
        let customer = fx.customers.register(shopper("grace@example.com"))?;

        let order = fx
            .orders
            .create_order(order_for(customer.uuid, product.uuid, 1, None))?;

        fx.orders
            .db
            .update_order(order.uuid, |stored| stored.status = OrderStatus::Shipped)?;

        let result = fx.orders.cancel_order(order.uuid, "too late");

        assert!(matches!(result, Err(OrdersServiceError::NotCancellable)));

        Ok(())
    }
}
