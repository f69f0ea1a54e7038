//! Shared helpers: validation, sanitisation, formatting, hashing, rate
//! limiting and pagination parsing.

pub mod format;
pub mod hashing;
pub mod pagination;
pub mod rate_limit;
pub mod sanitize;
pub mod validation;

pub use format::{
    DateFormatError, DateStyle, format_currency, format_date, format_file_size, slugify,
};
pub use hashing::{MAGIC_SALT, request_id, salted_hash, token};
pub use pagination::parse_pagination;
pub use rate_limit::{Clock, RateLimiter, SystemClock};
pub use sanitize::{sanitize_filename, sanitize_identifier, sanitize_input};
pub use validation::{
    CardBrand, CardCheck, PasswordReport, PasswordStrength, validate_credit_card, validate_email,
    validate_password_strength, validate_phone, validate_postal_code,
};
