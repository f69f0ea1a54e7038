//! Business logic services.
//!
//! Each service owns a handle to the shared [`Database`](crate::database::Database)
//! and composes model and database calls with basic validation. Everything
//! is synchronous and single-threaded.

pub mod customers;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod shipping;

pub use customers::{CustomersService, CustomersServiceError, FoundersDiscount, NewCustomer};
pub use orders::{NewOrder, NewOrderLine, OrdersService, OrdersServiceError};
pub use products::{NewProduct, ProductSearch, ProductsService, ProductsServiceError};
pub use reviews::{NewReview, ReviewsService, ReviewsServiceError};
pub use shipping::{CarrierRate, ShippingQuote, ShippingService, ShippingTier};
