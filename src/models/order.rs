//! Orders and order lines.

use jiff::{Timestamp, tz::TimeZone};
use smallvec::SmallVec;

use crate::{
    ids::TypedUuid,
    models::{address::Address, customer::CustomerUuid, product::ProductUuid},
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Gift wrapping cost per unit, in minor units.
pub const GIFT_WRAP_COST: u64 = 599;

/// Orders with a subtotal at or above this ship free.
pub const FREE_SHIPPING_THRESHOLD: u64 = 50_000;

/// Order lifecycle statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// The lowercase status name used in API payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }
}

/// How an order is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    GiftCard,
}

/// Where payment stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Captured,
    Failed,
}

/// A single line on an order.
///
/// The unit price is captured at order time, after quantity breaks, so
/// later catalog edits do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product: ProductUuid,
    /// Unit price in minor units, as charged.
    pub unit_price: u64,
    pub quantity: u32,
    pub gift_wrap: bool,
    pub gift_message: Option<String>,
}

impl OrderLine {
    /// Line subtotal: price times quantity, plus per-unit gift wrapping.
    #[must_use]
    pub fn subtotal(&self) -> u64 {
        let quantity = u64::from(self.quantity);
        let goods = self.unit_price.saturating_mul(quantity);

        if self.gift_wrap {
            goods.saturating_add(GIFT_WRAP_COST.saturating_mul(quantity))
        } else {
            goods
        }
    }
}

/// A customer order.
#[derive(Debug, Clone)]
pub struct Order {
    pub uuid: OrderUuid,
    pub customer: CustomerUuid,
    pub lines: SmallVec<[OrderLine; 4]>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub status: OrderStatus,

    /// Monetary breakdown, all in minor units.
    pub subtotal: u64,
    pub tax: u64,
    pub shipping_cost: u64,
    pub discount: u64,
    pub total: u64,

    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,

    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<Timestamp>,
    pub is_priority: bool,

    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub placed_at: Timestamp,
}

impl Order {
    /// Whether the order may still be cancelled. Shipped, delivered and
    /// refunded orders may not.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        !matches!(
            self.status,
            OrderStatus::Shipped | OrderStatus::Delivered | OrderStatus::Refunded
        )
    }

    /// Human-facing invoice number: `INV-{date}-{uuid prefix}`.
    #[must_use]
    pub fn invoice_number(&self) -> String {
        let date = self.placed_at.to_zoned(TimeZone::UTC).date();

        format!(
            "INV-{:04}{:02}{:02}-{}",
            date.year(),
            date.month(),
            date.day(),
            self.uuid.short_code()
        )
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;
    use testresult::TestResult;

    use super::*;

    fn order() -> Order {
        Order {
            uuid: OrderUuid::new(),
            customer: CustomerUuid::new(),
            lines: smallvec![],
            shipping_address: Address::new("12 Elm St", "Springfield", "IL", "62704", "US"),
            billing_address: Address::new("12 Elm St", "Springfield", "IL", "62704", "US"),
            status: OrderStatus::Pending,
            subtotal: 0,
            tax: 0,
            shipping_cost: 0,
            discount: 0,
            total: 0,
            payment_method: PaymentMethod::CreditCard,
            payment_status: PaymentStatus::Pending,
            transaction_id: None,
            carrier: None,
            tracking_number: None,
            estimated_delivery: None,
            is_priority: false,
            notes: None,
            cancellation_reason: None,
            placed_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn gift_wrap_charges_per_unit() {
        let line = OrderLine {
            product: ProductUuid::new(),
            unit_price: 1000,
            quantity: 3,
            gift_wrap: true,
            gift_message: Some("Happy birthday".to_owned()),
        };

        assert_eq!(line.subtotal(), 3 * 1000 + 3 * GIFT_WRAP_COST);
    }

    #[test]
    fn shipped_orders_cannot_be_cancelled() {
        let mut order = order();

        assert!(order.can_cancel());

        order.status = OrderStatus::Shipped;

        assert!(!order.can_cancel());
    }

    #[test]
    fn invoice_number_embeds_the_order_date() -> TestResult {
        let mut order = order();
        order.placed_at = "2024-03-09T12:00:00Z".parse()?;

        let invoice = order.invoice_number();

        assert!(invoice.starts_with("INV-20240309-"), "got {invoice}");
        assert_eq!(invoice.len(), "INV-20240309-".len() + 8);

        Ok(())
    }
}
