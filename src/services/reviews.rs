//! Reviews service.

use std::rc::Rc;

use thiserror::Error;
use tracing::info;

use crate::{
    database::{Database, DatabaseError, Page, Paged},
    models::{CustomerUuid, ProductUuid, Review, ReviewUuid, review::TOP_REVIEW_THRESHOLD},
};

/// How far back the verified-purchase check looks in a customer's order
/// history.
const PURCHASE_LOOKBACK: Page = Page {
    number: 1,
    size: 100,
};

/// Errors from review operations.
#[derive(Debug, Error)]
pub enum ReviewsServiceError {
    /// Ratings run 1 to 5.
    #[error("rating must be between 1 and 5")]
    InvalidRating,

    /// No such review.
    #[error("review not found")]
    NotFound,

    /// Underlying storage failure.
    #[error("storage error")]
    Db(#[source] DatabaseError),
}

impl From<DatabaseError> for ReviewsServiceError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(_) => Self::NotFound,
            other => Self::Db(other),
        }
    }
}

/// Data for a new review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub product: ProductUuid,
    pub customer: CustomerUuid,
    pub rating: u8,
    pub title: String,
    pub content: String,
}

/// Service for review operations.
#[derive(Debug, Clone)]
pub struct ReviewsService {
    db: Rc<Database>,
}

impl ReviewsService {
    /// Create the service over a shared database handle.
    #[must_use]
    pub fn new(db: Rc<Database>) -> Self {
        Self { db }
    }

    /// Post a review, marking it verified when the customer's order
    /// history contains the product.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewsServiceError::InvalidRating`] for a rating outside
    /// 1 to 5.
    pub fn create_review(&self, new: NewReview) -> Result<Review, ReviewsServiceError> {
        if !(1..=5).contains(&new.rating) {
            return Err(ReviewsServiceError::InvalidRating);
        }

        let orders = self.db.list_customer_orders(new.customer, PURCHASE_LOOKBACK)?;

        let is_verified_purchase = orders
            .data
            .iter()
            .flat_map(|order| order.lines.iter())
            .any(|line| line.product == new.product);

        let review = Review {
            uuid: ReviewUuid::new(),
            product: new.product,
            customer: new.customer,
            rating: new.rating,
            title: new.title,
            content: new.content,
            is_verified_purchase,
            helpful_votes: 0,
        };

        self.db.create_review(review.clone())?;

        Ok(review)
    }

    /// Count a helpful vote, returning the new tally.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewsServiceError::NotFound`] for an unknown review.
    pub fn mark_helpful(&self, uuid: ReviewUuid) -> Result<u32, ReviewsServiceError> {
        self.db.update_review(uuid, |stored| {
            stored.helpful_votes = stored.helpful_votes.saturating_add(1);
        })?;

        let review = self.db.get_review(uuid)?;

        if review.helpful_votes == TOP_REVIEW_THRESHOLD {
            info!("review {uuid} earned the top-review badge");
        }

        Ok(review.helpful_votes)
    }

    /// A product's reviews, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns a [`ReviewsServiceError`] if the listing fails.
    pub fn product_reviews(
        &self,
        product: ProductUuid,
        page: Page,
    ) -> Result<Paged<Review>, ReviewsServiceError> {
        Ok(self.db.list_product_reviews(product, page)?)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn service() -> Result<ReviewsService, crate::database::SeedError> {
        Ok(ReviewsService::new(Rc::new(Database::new()?)))
    }

    fn review_of(product: ProductUuid, rating: u8) -> NewReview {
        NewReview {
            product,
            customer: CustomerUuid::new(),
            rating,
            title: "Solid".to_owned(),
            content: "Does what the tin says.".to_owned(),
        }
    }

    #[test]
    fn out_of_range_ratings_are_rejected() -> TestResult {
        let service = service()?;
        let product = ProductUuid::new();

        assert!(matches!(
            service.create_review(review_of(product, 0)),
            Err(ReviewsServiceError::InvalidRating)
        ));
        assert!(matches!(
            service.create_review(review_of(product, 6)),
            Err(ReviewsServiceError::InvalidRating)
        ));

        Ok(())
    }

    #[test]
    fn reviews_without_a_purchase_are_unverified() -> TestResult {
        let service = service()?;

        let review = service.create_review(review_of(ProductUuid::new(), 5))?;

        assert!(!review.is_verified_purchase);

        Ok(())
    }

    #[test]
    fn helpful_votes_accumulate() -> TestResult {
        let service = service()?;
        let review = service.create_review(review_of(ProductUuid::new(), 4))?;

        assert_eq!(service.mark_helpful(review.uuid)?, 1);
        assert_eq!(service.mark_helpful(review.uuid)?, 2);

        Ok(())
    }

    #[test]
    fn product_reviews_are_paged() -> TestResult {
        let service = service()?;
        let product = ProductUuid::new();

        for rating in 1..=3 {
            service.create_review(review_of(product, rating))?;
        }

        let page = service.product_reviews(product, Page::new(1, 2))?;

        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total, 3);
        assert!(page.has_next());

        Ok(())
    }
}
