//! Product handlers.

use serde_json::{Value, json};
use tracing::error;

use crate::{
    models::Product,
    services::{ProductSearch, ProductsServiceError},
    utils::pagination::parse_pagination,
};

use super::{AppState, PathParams, Request, Response, money, path_uuid};

/// `GET /api/v1/products` — list products with optional filters.
///
/// Query parameters: `q`, `category` (catalog code), `min_price` and
/// `max_price` (minor units), `page`, `page_size`.
pub(crate) fn list(state: &AppState, request: &Request, _params: &PathParams) -> Response {
    let page = parse_pagination(&request.query);

    let category = match request.query.get("category") {
        Some(raw) => match raw.parse() {
            Ok(category) => Some(category),
            Err(_) => return Response::bad_request(format!("Invalid category: {raw}")),
        },
        None => None,
    };

    let min_price = match request.query.get("min_price").map(|raw| raw.parse::<u64>()) {
        Some(Ok(value)) => Some(value),
        Some(Err(_)) => return Response::bad_request("Invalid min_price"),
        None => None,
    };

    let max_price = match request.query.get("max_price").map(|raw| raw.parse::<u64>()) {
        Some(Ok(value)) => Some(value),
        Some(Err(_)) => return Response::bad_request("Invalid max_price"),
        None => None,
    };

    let search = ProductSearch {
        query: request.query.get("q").cloned(),
        category,
        min_price,
        max_price,
        page,
        ..ProductSearch::default()
    };

    match state.products.search_products(&search) {
        Ok(products) => Response::ok(json!({
            "data": products.iter().map(product_json).collect::<Vec<_>>(),
            "count": products.len(),
        })),
        Err(error) => into_response(&error),
    }
}

/// `GET /api/v1/products/{id}` — a single product.
pub(crate) fn get(state: &AppState, _request: &Request, params: &PathParams) -> Response {
    let uuid = match path_uuid(params, "id") {
        Ok(uuid) => uuid,
        Err(response) => return response,
    };

    match state.products.get_product(uuid.into()) {
        Ok(product) => Response::ok(json!({ "data": product_json(&product) })),
        Err(error) => into_response(&error),
    }
}

/// `GET /api/v1/products/featured` — in-stock featured products.
pub(crate) fn featured(state: &AppState, request: &Request, _params: &PathParams) -> Response {
    let limit = request
        .query
        .get("limit")
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(10);

    match state.products.featured_products(limit) {
        Ok(products) => Response::ok(json!({
            "data": products.iter().map(product_json).collect::<Vec<_>>(),
            "count": products.len(),
        })),
        Err(error) => into_response(&error),
    }
}

/// Shape a product for an API payload.
pub(crate) fn product_json(product: &Product) -> Value {
    json!({
        "id": product.uuid.to_string(),
        "name": product.name,
        "description": product.description,
        "price": money(product.price),
        "price_minor": product.price,
        "category": product.category.code(),
        "sku": product.sku,
        "stock_quantity": product.stock_quantity,
        "is_in_stock": product.is_in_stock(),
        "is_featured": product.is_featured,
        "tags": product.tags,
    })
}

/// Map a products-service failure onto a status code.
pub(crate) fn into_response(error: &ProductsServiceError) -> Response {
    match error {
        ProductsServiceError::NotFound => Response::not_found("Product not found"),
        ProductsServiceError::AlreadyExists => Response::conflict("Product already exists"),
        ProductsServiceError::InsufficientStock { .. } => {
            Response::conflict(error.to_string())
        }
        ProductsServiceError::StockOutOfRange => Response::bad_request(error.to_string()),
        ProductsServiceError::Db(source) => {
            error!("products route failed: {source}");

            Response::internal_error()
        }
    }
}
