//! Admin handlers. Both require the admin token header.

use jiff::Timestamp;
use serde_json::{Value, json};
use tracing::error;

use crate::database::DatabaseError;

use super::{ADMIN_TOKEN, ADMIN_TOKEN_HEADER, AppState, PathParams, Request, Response};

/// `GET /api/v1/admin/stats` — pool usage and row counts.
pub(crate) fn stats(state: &AppState, request: &Request, _params: &PathParams) -> Response {
    if let Some(response) = require_admin(request) {
        return response;
    }

    match state.db.stats() {
        Ok(stats) => {
            let collections: Value = stats
                .collections
                .iter()
                .map(|&(name, count)| (name.to_owned(), json!(count)))
                .collect::<serde_json::Map<_, _>>()
                .into();

            Response::ok(json!({
                "data": {
                    "connection_pool": {
                        "max_connections": stats.pool.max,
                        "active_connections": stats.pool.active,
                        "available_connections": stats.pool.available,
                    },
                    "collections": collections,
                },
            }))
        }
        Err(source) => db_failure(&source),
    }
}

/// `POST /api/v1/admin/maintenance` — purge expired tombstones.
pub(crate) fn maintenance(state: &AppState, request: &Request, _params: &PathParams) -> Response {
    if let Some(response) = require_admin(request) {
        return response;
    }

    match state.db.run_maintenance(Timestamp::now()) {
        Ok(report) => Response::ok(json!({
            "data": {
                "products": report.products,
                "customers": report.customers,
                "orders": report.orders,
                "reviews": report.reviews,
            },
            "message": "Maintenance completed",
        })),
        Err(source) => db_failure(&source),
    }
}

fn require_admin(request: &Request) -> Option<Response> {
    if request.header(ADMIN_TOKEN_HEADER) == Some(ADMIN_TOKEN) {
        None
    } else {
        Some(Response::forbidden("Admin access required"))
    }
}

fn db_failure(source: &DatabaseError) -> Response {
    error!("admin route failed: {source}");

    Response::internal_error()
}
