//! Storefront
//!
//! An in-memory mock e-commerce platform: plain domain models, a
//! soft-deleting in-memory database behind a pretend connection pool,
//! synchronous services, and request-shaped route handlers bound to no
//! server. Ships with a deliberately defective shopping cart fixture used
//! for bug-hunting walkthroughs.

pub mod cart;
pub mod config;
pub mod database;
pub mod ids;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;
