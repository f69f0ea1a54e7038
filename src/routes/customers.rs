//! Customer handlers.

use jiff::Timestamp;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;
use uuid::Uuid;

use crate::{
    models::Customer,
    services::{CustomersServiceError, NewCustomer},
    utils::{sanitize::sanitize_input, validation::validate_email},
};

use super::{AppState, PathParams, Request, Response};

/// Shortest password accepted at registration.
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// `POST /api/v1/customers/register` — create an account.
pub(crate) fn register(state: &AppState, request: &Request, _params: &PathParams) -> Response {
    let Some(body) = request.body.clone() else {
        return Response::bad_request("Missing required fields");
    };

    let Ok(payload) = serde_json::from_value::<RegisterRequest>(body) else {
        return Response::bad_request("Missing required fields");
    };

    if !validate_email(&payload.email) {
        return Response::bad_request("Invalid email format");
    }

    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Response::bad_request("Password must be at least 8 characters");
    }

    let new = NewCustomer {
        email: payload.email,
        password: payload.password,
        first_name: sanitize_input(&payload.first_name),
        last_name: sanitize_input(&payload.last_name),
        phone: payload.phone,
    };

    match state.customers.register(new) {
        Ok(customer) => Response::created(json!({
            "data": customer_json(&customer),
            "message": "Registration successful",
        })),
        Err(error) => into_response(&error),
    }
}

/// `POST /api/v1/customers/login` — authenticate and mint a bearer token.
pub(crate) fn login(state: &AppState, request: &Request, _params: &PathParams) -> Response {
    let Some(body) = request.body.clone() else {
        return Response::bad_request("Email and password required");
    };

    let Ok(payload) = serde_json::from_value::<LoginRequest>(body) else {
        return Response::bad_request("Email and password required");
    };

    match state.customers.authenticate(&payload.email, &payload.password) {
        Ok(customer) => {
            let token = mint_token(&customer);

            Response::ok(json!({
                "data": customer_json(&customer),
                "token": token,
            }))
        }
        Err(CustomersServiceError::InvalidCredentials) => {
            Response::unauthorized("Invalid credentials")
        }
        Err(error) => into_response(&error),
    }
}

/// `GET /api/v1/customers/me` — the profile behind the bearer token.
pub(crate) fn profile(state: &AppState, request: &Request, _params: &PathParams) -> Response {
    let Some(uuid) = token_customer(request) else {
        return Response::unauthorized("Invalid token");
    };

    match state.customers.get_customer(uuid.into()) {
        Ok(customer) => Response::ok(json!({ "data": customer_json(&customer) })),
        Err(CustomersServiceError::NotFound) => Response::not_found("Customer not found"),
        Err(error) => into_response(&error),
    }
}

/// Bearer tokens look like `token_{customer uuid}_{millis}`.
fn mint_token(customer: &Customer) -> String {
    format!(
        "token_{}_{}",
        customer.uuid,
        Timestamp::now().as_millisecond()
    )
}

/// Recover the customer UUID from the Authorization header.
fn token_customer(request: &Request) -> Option<Uuid> {
    request
        .header("Authorization")?
        .strip_prefix("Bearer token_")?
        .split('_')
        .next()
        .and_then(|raw| Uuid::parse_str(raw).ok())
}

/// Shape a customer for an API payload. The password hash stays private.
pub(crate) fn customer_json(customer: &Customer) -> Value {
    json!({
        "id": customer.uuid.to_string(),
        "email": customer.email,
        "name": customer.full_name(),
        "loyalty_tier": customer.loyalty_tier.name(),
        "loyalty_points": customer.loyalty_points,
        "discount_percentage": customer.loyalty_tier.discount_percent(),
    })
}

/// Map a customers-service failure onto a status code.
pub(crate) fn into_response(error: &CustomersServiceError) -> Response {
    match error {
        CustomersServiceError::EmailTaken => Response::conflict("Email already registered"),
        CustomersServiceError::NotFound => Response::not_found("Customer not found"),
        CustomersServiceError::InvalidCredentials => {
            Response::unauthorized("Invalid credentials")
        }
        CustomersServiceError::Db(source) => {
            error!("customers route failed: {source}");

            Response::internal_error()
        }
    }
}
