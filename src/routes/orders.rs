//! Order handlers.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;
use uuid::Uuid;

use crate::{
    models::{Address, Order},
    services::{NewOrder, NewOrderLine, OrdersServiceError},
};

use super::{AppState, PathParams, Request, Response, money, path_uuid};

#[derive(Debug, Deserialize)]
struct CreateOrderRequest {
    customer_id: Uuid,
    items: Vec<OrderItemRequest>,
    shipping_address: AddressRequest,
    #[serde(default)]
    coupon_code: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderItemRequest {
    product_id: Uuid,
    quantity: u32,
    #[serde(default)]
    gift_wrap: bool,
    #[serde(default)]
    gift_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddressRequest {
    #[serde(default)]
    street: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    postal_code: String,
    #[serde(default)]
    country: String,
}

impl From<AddressRequest> for Address {
    fn from(request: AddressRequest) -> Self {
        Address::new(
            request.street,
            request.city,
            request.state,
            request.postal_code,
            request.country,
        )
    }
}

/// `POST /api/v1/orders` — place an order.
pub(crate) fn create(state: &AppState, request: &Request, _params: &PathParams) -> Response {
    let Some(body) = request.body.clone() else {
        return Response::bad_request("Missing required fields");
    };

    let Ok(payload) = serde_json::from_value::<CreateOrderRequest>(body) else {
        return Response::bad_request("Missing required fields");
    };

    if payload.items.is_empty() {
        return Response::bad_request("Missing required fields");
    }

    let new = NewOrder {
        customer: payload.customer_id.into(),
        lines: payload
            .items
            .into_iter()
            .map(|item| NewOrderLine {
                product: item.product_id.into(),
                quantity: item.quantity,
                gift_wrap: item.gift_wrap,
                gift_message: item.gift_message,
            })
            .collect(),
        shipping_address: payload.shipping_address.into(),
        billing_address: None,
        coupon_code: payload.coupon_code,
        notes: payload.notes,
    };

    match state.orders.create_order(new) {
        Ok(order) => Response::created(json!({
            "data": order_json(&order),
            "message": "Order created successfully",
        })),
        Err(error) => into_response(&error),
    }
}

/// `GET /api/v1/orders/{id}` — order details.
pub(crate) fn get(state: &AppState, _request: &Request, params: &PathParams) -> Response {
    let uuid = match path_uuid(params, "id") {
        Ok(uuid) => uuid,
        Err(response) => return response,
    };

    match state.db.get_order(uuid.into()) {
        Ok(order) => Response::ok(json!({ "data": order_json(&order) })),
        Err(_) => Response::not_found(format!("Order not found: {uuid}")),
    }
}

/// `POST /api/v1/orders/{id}/cancel` — cancel an order.
pub(crate) fn cancel(state: &AppState, request: &Request, params: &PathParams) -> Response {
    let uuid = match path_uuid(params, "id") {
        Ok(uuid) => uuid,
        Err(response) => return response,
    };

    let reason = request
        .body
        .as_ref()
        .and_then(|body| body.get("reason"))
        .and_then(Value::as_str)
        .unwrap_or("Customer requested cancellation")
        .to_owned();

    match state.orders.cancel_order(uuid.into(), &reason) {
        Ok(order) => Response::ok(json!({
            "data": order_json(&order),
            "message": "Order cancelled successfully",
        })),
        Err(error) => into_response(&error),
    }
}

/// Shape an order for an API payload.
pub(crate) fn order_json(order: &Order) -> Value {
    json!({
        "id": order.uuid.to_string(),
        "status": order.status.as_str(),
        "subtotal": money(order.subtotal),
        "tax": money(order.tax),
        "shipping": money(order.shipping_cost),
        "discount": money(order.discount),
        "total": money(order.total),
        "invoice_number": order.invoice_number(),
        "carrier": order.carrier,
        "is_priority": order.is_priority,
    })
}

/// Map an orders-service failure onto a status code.
pub(crate) fn into_response(error: &OrdersServiceError) -> Response {
    match error {
        OrdersServiceError::CustomerNotFound => Response::not_found("Customer not found"),
        OrdersServiceError::ProductNotFound => Response::bad_request("Product not found"),
        OrdersServiceError::NotFound => Response::not_found("Order not found"),
        OrdersServiceError::InvalidQuantity | OrdersServiceError::NotCancellable => {
            Response::bad_request(error.to_string())
        }
        OrdersServiceError::InsufficientStock { .. } => Response::conflict(error.to_string()),
        OrdersServiceError::Db(source) => {
            error!("orders route failed: {source}");

            Response::internal_error()
        }
    }
}
