//! End-to-end walk through the storefront API.
//!
//! Stocks a catalog through the services, then drives the router like a
//! client would: register, log in, browse, order with the FOUNDERS50
//! coupon, review, and read the admin stats.

use std::rc::Rc;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use storefront::{
    config::AppConfig,
    database::Database,
    models::{Dimensions, ProductCategory},
    routes::{ADMIN_TOKEN, ADMIN_TOKEN_HEADER, AppState, Request, Response, Router},
    services::NewProduct,
};

#[expect(clippy::print_stdout, reason = "demo binary")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;

    let db = Rc::new(Database::with_pool_limit(config.pool_limit)?);
    let state = AppState::with_config(Rc::clone(&db), &config);

    stock_catalog(&state)?;

    let router = Router::storefront(state);

    let register = show(
        &router,
        "register",
        Request::post("/api/v1/customers/register").with_body(json!({
            "email": "ada@example.com",
            "password": "correct horse battery",
            "first_name": "Ada",
            "last_name": "Lovelace",
        })),
    );

    let customer_id = field(&register, &["data", "id"]).context("registration returned no id")?;

    let login = show(
        &router,
        "login",
        Request::post("/api/v1/customers/login").with_body(json!({
            "email": "ada@example.com",
            "password": "correct horse battery",
        })),
    );

    let token = field(&login, &["token"]).context("login returned no token")?;

    let listing = show(&router, "browse", Request::get("/api/v1/products"));
    let product_id =
        field(&listing, &["data", "0", "id"]).context("catalog listing was empty")?;

    let order = show(
        &router,
        "order",
        Request::post("/api/v1/orders")
            .with_header("Authorization", format!("Bearer {token}"))
            .with_body(json!({
                "customer_id": customer_id,
                "items": [{ "product_id": product_id, "quantity": 2 }],
                "shipping_address": {
                    "street": "12 Elm St",
                    "city": "Springfield",
                    "state": "IL",
                    "postal_code": "62704",
                    "country": "US",
                },
                "coupon_code": "FOUNDERS50",
            })),
    );

    let order_id = field(&order, &["data", "id"]).context("order returned no id")?;

    show(
        &router,
        "order details",
        Request::get(format!("/api/v1/orders/{order_id}"))
            .with_header("Authorization", format!("Bearer {token}")),
    );

    show(
        &router,
        "review",
        Request::post(format!("/api/v1/products/{product_id}/reviews")).with_body(json!({
            "customer_id": customer_id,
            "rating": 5,
            "title": "Exactly as described",
            "content": "Arrived fast and the FLASH delivery lived up to its tag.",
        })),
    );

    show(
        &router,
        "admin stats",
        Request::get("/api/v1/admin/stats").with_header(ADMIN_TOKEN_HEADER, ADMIN_TOKEN),
    );

    Ok(())
}

/// Stock a few products directly through the service layer.
fn stock_catalog(state: &AppState) -> Result<()> {
    let catalog = [
        NewProduct {
            name: "Laptop".to_owned(),
            description: "Thin, light, loud fans".to_owned(),
            price: 99_999,
            category: ProductCategory::Electronics,
            stock_quantity: 10,
            sku: "LAPTOP-13".to_owned(),
            weight_kg: Decimal::new(14, 1),
            dimensions: Dimensions {
                length_cm: Decimal::from(30),
                width_cm: Decimal::from(21),
                height_cm: Decimal::from(2),
            },
            is_featured: true,
            tags: vec!["FLASH".to_owned()],
            images: Vec::new(),
        },
        NewProduct {
            name: "Mouse".to_owned(),
            description: "Two buttons, one wheel".to_owned(),
            price: 2_999,
            category: ProductCategory::Electronics,
            stock_quantity: 50,
            sku: "MOUSE-2B".to_owned(),
            weight_kg: Decimal::new(1, 1),
            dimensions: Dimensions::default(),
            is_featured: false,
            tags: Vec::new(),
            images: Vec::new(),
        },
        NewProduct {
            name: "Keyboard".to_owned(),
            description: "Clacky".to_owned(),
            price: 7_999,
            category: ProductCategory::Electronics,
            stock_quantity: 25,
            sku: "KEYB-87".to_owned(),
            weight_kg: Decimal::new(8, 1),
            dimensions: Dimensions::default(),
            is_featured: false,
            tags: Vec::new(),
            images: Vec::new(),
        },
    ];

    for product in catalog {
        state.products.create_product(product)?;
    }

    Ok(())
}

/// Dispatch a request, print the response, and hand it back.
#[expect(clippy::print_stdout, reason = "demo binary")]
fn show(router: &Router, label: &str, request: Request) -> Response {
    let response = router.dispatch(&request);

    println!("== {label} ({})\n{}\n", response.status, response.to_json());

    response
}

/// Walk a JSON path of object keys and array indexes, returning a string.
fn field(response: &Response, path: &[&str]) -> Option<String> {
    let mut value = &response.body;

    for step in path {
        value = match step.parse::<usize>() {
            Ok(index) => value.as_array()?.get(index)?,
            Err(_) => value.as_object()?.get(*step)?,
        };
    }

    value.as_str().map(str::to_owned)
}
