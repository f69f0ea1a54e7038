//! Shipping quotes.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// Service tiers the storefront can quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingTier {
    Standard,
    Express,
    Overnight,
}

impl ShippingTier {
    /// The lowercase tier name used in API payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
            Self::Overnight => "overnight",
        }
    }

    /// Whether this tier is an expedited one.
    #[must_use]
    pub fn is_express(self) -> bool {
        matches!(self, Self::Express | Self::Overnight)
    }
}

/// One carrier's rate card. Costs are minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarrierRate {
    pub tier: ShippingTier,
    pub carrier: &'static str,
    pub base_cost: u64,
    pub per_kg: u64,
    pub estimated_days: u8,
}

const STANDARD: CarrierRate = CarrierRate {
    tier: ShippingTier::Standard,
    carrier: "Standard Ground",
    base_cost: 599,
    per_kg: 50,
    estimated_days: 5,
};

const EXPRESS: CarrierRate = CarrierRate {
    tier: ShippingTier::Express,
    carrier: "Express Air",
    base_cost: 1599,
    per_kg: 150,
    estimated_days: 2,
};

const OVERNIGHT: CarrierRate = CarrierRate {
    tier: ShippingTier::Overnight,
    carrier: "Overnight Priority",
    base_cost: 2999,
    per_kg: 250,
    estimated_days: 1,
};

/// Every rate card, cheapest tier first.
pub const CARRIERS: [CarrierRate; 3] = [STANDARD, EXPRESS, OVERNIGHT];

/// A priced shipping option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingQuote {
    pub carrier: &'static str,
    pub tier: ShippingTier,
    /// Cost in minor units.
    pub cost: u64,
    pub estimated_days: u8,
}

/// Stateless quoting over the static rate cards.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShippingService;

impl ShippingService {
    /// Quote a shipment of the given billable weight. Express shipments
    /// use the air card; everything else goes ground.
    #[must_use]
    pub fn quote(&self, total_weight_kg: Decimal, express: bool) -> ShippingQuote {
        let rate = if express { EXPRESS } else { STANDARD };

        Self::price(rate, total_weight_kg)
    }

    /// Quotes for every tier, cheapest first.
    #[must_use]
    pub fn all_quotes(&self, total_weight_kg: Decimal) -> Vec<ShippingQuote> {
        CARRIERS
            .iter()
            .map(|rate| Self::price(*rate, total_weight_kg))
            .collect()
    }

    fn price(rate: CarrierRate, total_weight_kg: Decimal) -> ShippingQuote {
        let weight_cost = (Decimal::from(rate.per_kg) * total_weight_kg)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .unwrap_or(0);

        ShippingQuote {
            carrier: rate.carrier,
            tier: rate.tier,
            cost: rate.base_cost.saturating_add(weight_cost),
            estimated_days: rate.estimated_days,
        }
    }
}
