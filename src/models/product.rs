//! Product model.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{ids::TypedUuid, models::category::ProductCategory};

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Divisor applied to `l*w*h` to obtain dimensional weight in kilograms.
const DIMENSIONAL_WEIGHT_DIVISOR: u32 = 5000;

/// Physical product dimensions in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub length_cm: Decimal,
    pub width_cm: Decimal,
    pub height_cm: Decimal,
}

/// A product in the catalog.
#[derive(Debug, Clone)]
pub struct Product {
    pub uuid: ProductUuid,
    pub name: String,
    pub description: String,
    /// Unit price in minor units.
    pub price: u64,
    pub category: ProductCategory,
    pub stock_quantity: u32,
    pub sku: String,
    pub weight_kg: Decimal,
    pub dimensions: Dimensions,
    pub is_active: bool,
    pub is_featured: bool,
    pub tags: Vec<String>,
    pub images: Vec<String>,
}

impl Product {
    /// Whether the product can currently be bought.
    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0 && self.is_active
    }

    /// Billable shipping weight: the greater of the actual weight and the
    /// dimensional weight (`l*w*h / 5000`).
    #[must_use]
    pub fn shipping_weight_kg(&self) -> Decimal {
        let Dimensions {
            length_cm,
            width_cm,
            height_cm,
        } = self.dimensions;

        let dimensional = length_cm * width_cm * height_cm / Decimal::from(DIMENSIONAL_WEIGHT_DIVISOR);

        self.weight_kg.max(dimensional)
    }

    /// Unit price after quantity breaks, in minor units.
    ///
    /// 10+ units take 5% off, 25+ take 10% off, 100+ take 15% off.
    #[must_use]
    pub fn bulk_unit_price(&self, quantity: u32) -> u64 {
        let rate = match quantity {
            100.. => Decimal::new(85, 2),
            25.. => Decimal::new(90, 2),
            10.. => Decimal::new(95, 2),
            _ => return self.price,
        };

        (Decimal::from(self.price) * rate)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .unwrap_or(self.price)
    }

    /// Whether the product carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
