//! Request-shaped route handlers.
//!
//! The surface is shaped like a REST API but bound to no server: the
//! [`Router`] dispatches in-process [`Request`] values to plain handler
//! functions, through a logging / rate-limiting / auth middleware chain.

pub mod admin;
pub mod customers;
pub mod orders;
pub mod products;
pub mod request;
pub mod reviews;
mod router;

pub use request::{Method, PathParams, Request, Response};
pub use router::{ADMIN_TOKEN, ADMIN_TOKEN_HEADER, AppState, BURST_LIMIT, Router};

use rusty_money::iso;
use uuid::Uuid;

use crate::utils::format::format_currency;

/// Format minor units for an API payload.
pub(crate) fn money(minor: u64) -> String {
    format_currency(i64::try_from(minor).unwrap_or(i64::MAX), iso::USD)
}

/// Pull a UUID out of the captured path parameters.
pub(crate) fn path_uuid(params: &PathParams, name: &str) -> Result<Uuid, Response> {
    params
        .get(name)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| Response::bad_request("Invalid identifier"))
}
