//! Product categories.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Error returned when a category code does not match any category.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown category code {0:?}")]
pub struct UnknownCategory(pub String);

/// Product categories, each with an internal catalog code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductCategory {
    /// `ELEC-001`
    Electronics,
    /// `CLTH-002`
    Clothing,
    /// `HOME-003`
    HomeGarden,
    /// `SPRT-004`
    Sports,
    /// `BOOK-005`
    Books,
    /// `TOYS-006`
    Toys,
    /// `FOOD-007`
    Food,
    /// `BEAU-008`
    Beauty,
}

impl ProductCategory {
    /// Every category, in catalog-code order.
    pub const ALL: [Self; 8] = [
        Self::Electronics,
        Self::Clothing,
        Self::HomeGarden,
        Self::Sports,
        Self::Books,
        Self::Toys,
        Self::Food,
        Self::Beauty,
    ];

    /// The internal catalog code for this category.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Electronics => "ELEC-001",
            Self::Clothing => "CLTH-002",
            Self::HomeGarden => "HOME-003",
            Self::Sports => "SPRT-004",
            Self::Books => "BOOK-005",
            Self::Toys => "TOYS-006",
            Self::Food => "FOOD-007",
            Self::Beauty => "BEAU-008",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ProductCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.code() == s)
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}
