//! Products service.

use std::rc::Rc;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    database::{Database, DatabaseError, Page},
    models::{Dimensions, Product, ProductCategory, ProductUuid},
};

/// Errors from product operations.
#[derive(Debug, Error)]
pub enum ProductsServiceError {
    /// A product with this UUID already exists.
    #[error("product already exists")]
    AlreadyExists,

    /// No such product.
    #[error("product not found")]
    NotFound,

    /// A stock adjustment would leave the level negative.
    #[error("insufficient stock: available {available}, requested {requested}")]
    InsufficientStock {
        available: u32,
        requested: u32,
    },

    /// A stock adjustment overflowed the stock counter.
    #[error("stock adjustment out of range")]
    StockOutOfRange,

    /// Underlying storage failure.
    #[error("storage error")]
    Db(#[source] DatabaseError),
}

impl From<DatabaseError> for ProductsServiceError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(_) => Self::NotFound,
            DatabaseError::DuplicateKey(_) => Self::AlreadyExists,
            other => Self::Db(other),
        }
    }
}

/// Data for a new catalog product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    /// Unit price in minor units.
    pub price: u64,
    pub category: ProductCategory,
    pub stock_quantity: u32,
    pub sku: String,
    pub weight_kg: Decimal,
    pub dimensions: Dimensions,
    pub is_featured: bool,
    pub tags: Vec<String>,
    pub images: Vec<String>,
}

/// Catalog search filters.
#[derive(Debug, Clone)]
pub struct ProductSearch {
    /// Case-insensitive needle matched against name and description.
    pub query: Option<String>,
    pub category: Option<ProductCategory>,
    /// Lower price bound in minor units, inclusive.
    pub min_price: Option<u64>,
    /// Upper price bound in minor units, inclusive.
    pub max_price: Option<u64>,
    pub in_stock_only: bool,
    pub page: Page,
}

impl Default for ProductSearch {
    fn default() -> Self {
        Self {
            query: None,
            category: None,
            min_price: None,
            max_price: None,
            in_stock_only: true,
            page: Page::default(),
        }
    }
}

/// Service for catalog operations.
#[derive(Debug, Clone)]
pub struct ProductsService {
    db: Rc<Database>,
}

impl ProductsService {
    /// Create the service over a shared database handle.
    #[must_use]
    pub fn new(db: Rc<Database>) -> Self {
        Self { db }
    }

    /// Add a product to the catalog, assigning it a fresh UUID.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductsServiceError`] if storage rejects the insert.
    pub fn create_product(&self, new: NewProduct) -> Result<Product, ProductsServiceError> {
        let product = Product {
            uuid: ProductUuid::new(),
            name: new.name,
            description: new.description,
            price: new.price,
            category: new.category,
            stock_quantity: new.stock_quantity,
            sku: new.sku,
            weight_kg: new.weight_kg,
            dimensions: new.dimensions,
            is_active: true,
            is_featured: new.is_featured,
            tags: new.tags,
            images: new.images,
        };

        self.db.create_product(product.clone())?;

        Ok(product)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ProductsServiceError::NotFound`] for an unknown UUID.
    pub fn get_product(&self, uuid: ProductUuid) -> Result<Product, ProductsServiceError> {
        Ok(self.db.get_product(uuid)?)
    }

    /// Search the catalog.
    ///
    /// The category narrows the stored listing; the remaining filters are
    /// applied to the fetched page.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductsServiceError`] if the listing fails.
    pub fn search_products(
        &self,
        search: &ProductSearch,
    ) -> Result<Vec<Product>, ProductsServiceError> {
        let listed = self.db.list_products(search.category, search.page)?;

        let needle = search.query.as_deref().map(str::to_lowercase);

        Ok(listed
            .data
            .into_iter()
            .filter(|product| {
                needle.as_deref().is_none_or(|q| {
                    product.name.to_lowercase().contains(q)
                        || product.description.to_lowercase().contains(q)
                })
            })
            .filter(|product| search.min_price.is_none_or(|min| product.price >= min))
            .filter(|product| search.max_price.is_none_or(|max| product.price <= max))
            .filter(|product| !search.in_stock_only || product.is_in_stock())
            .collect())
    }

    /// Adjust a product's stock level by a signed delta, returning the new
    /// level.
    ///
    /// # Errors
    ///
    /// Returns [`ProductsServiceError::InsufficientStock`] when the delta
    /// would take the level below zero, or
    /// [`ProductsServiceError::NotFound`] for an unknown UUID.
    pub fn update_stock(
        &self,
        uuid: ProductUuid,
        change: i64,
    ) -> Result<u32, ProductsServiceError> {
        let product = self.get_product(uuid)?;

        let current = i64::from(product.stock_quantity);
        let updated = current
            .checked_add(change)
            .ok_or(ProductsServiceError::StockOutOfRange)?;

        if updated < 0 {
            return Err(ProductsServiceError::InsufficientStock {
                available: product.stock_quantity,
                requested: u32::try_from(change.unsigned_abs())
                    .map_err(|_| ProductsServiceError::StockOutOfRange)?,
            });
        }

        let new_stock =
            u32::try_from(updated).map_err(|_| ProductsServiceError::StockOutOfRange)?;

        self.db
            .update_product(uuid, |stored| stored.stock_quantity = new_stock)?;

        Ok(new_stock)
    }

    /// In-stock featured products for the storefront page.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductsServiceError`] if the listing fails.
    pub fn featured_products(&self, limit: usize) -> Result<Vec<Product>, ProductsServiceError> {
        let listed = self.db.list_products(None, Page::new(1, 100))?;

        Ok(listed
            .data
            .into_iter()
            .filter(|product| product.is_featured && product.is_in_stock())
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn service() -> Result<ProductsService, crate::database::SeedError> {
        Ok(ProductsService::new(Rc::new(Database::new()?)))
    }

    fn new_product(name: &str, price: u64, stock: u32) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            description: format!("{name} for testing"),
            price,
            category: ProductCategory::Electronics,
            stock_quantity: stock,
            sku: name.to_uppercase(),
            weight_kg: Decimal::ONE,
            dimensions: Dimensions::default(),
            is_featured: false,
            tags: Vec::new(),
            images: Vec::new(),
        }
    }

    #[test]
    fn created_products_can_be_fetched() -> TestResult {
        let service = service()?;

        let created = service.create_product(new_product("radio", 2500, 4))?;
        let fetched = service.get_product(created.uuid)?;

        assert_eq!(fetched.name, "radio");
        assert_eq!(fetched.price, 2500);

        Ok(())
    }

    #[test]
    fn stock_cannot_go_negative() -> TestResult {
        let service = service()?;
        let product = service.create_product(new_product("radio", 2500, 2))?;

        let result = service.update_stock(product.uuid, -3);

        assert!(matches!(
            result,
            Err(ProductsServiceError::InsufficientStock {
                available: 2,
                requested: 3
            })
        ));
        assert_eq!(service.get_product(product.uuid)?.stock_quantity, 2);

        Ok(())
    }

    #[test]
    fn stock_adjustments_apply() -> TestResult {
        let service = service()?;
        let product = service.create_product(new_product("radio", 2500, 2))?;

        assert_eq!(service.update_stock(product.uuid, 5)?, 7);
        assert_eq!(service.update_stock(product.uuid, -7)?, 0);

        Ok(())
    }

    #[test]
    fn search_filters_compose() -> TestResult {
        let service = service()?;
        service.create_product(new_product("pocket radio", 2500, 4))?;
        service.create_product(new_product("radio tower kit", 9900, 0))?;
        service.create_product(new_product("novel", 1500, 3))?;

        let search = ProductSearch {
            query: Some("RADIO".to_owned()),
            ..ProductSearch::default()
        };

        let found = service.search_products(&search)?;

        assert_eq!(found.len(), 1, "out-of-stock radio kit is filtered");
        assert_eq!(
            found.first().map(|p| p.name.as_str()),
            Some("pocket radio")
        );

        Ok(())
    }

    #[test]
    fn featured_listing_respects_the_limit() -> TestResult {
        let service = service()?;

        for n in 0..3 {
            let mut new = new_product(&format!("gadget {n}"), 1000, 1);
            new.is_featured = true;
            service.create_product(new)?;
        }

        assert_eq!(service.featured_products(2)?.len(), 2);

        Ok(())
    }
}
