//! Review handlers.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;
use uuid::Uuid;

use crate::{
    models::Review,
    services::{NewReview, ReviewsServiceError},
    utils::{pagination::parse_pagination, sanitize::sanitize_input},
};

use super::{AppState, PathParams, Request, Response, path_uuid};

#[derive(Debug, Deserialize)]
struct CreateReviewRequest {
    customer_id: Uuid,
    rating: u8,
    title: String,
    content: String,
}

/// `POST /api/v1/products/{product_id}/reviews` — post a review.
pub(crate) fn create(state: &AppState, request: &Request, params: &PathParams) -> Response {
    let product = match path_uuid(params, "product_id") {
        Ok(uuid) => uuid,
        Err(response) => return response,
    };

    let Some(body) = request.body.clone() else {
        return Response::bad_request("Missing required fields");
    };

    let Ok(payload) = serde_json::from_value::<CreateReviewRequest>(body) else {
        return Response::bad_request("Missing required fields");
    };

    let new = NewReview {
        product: product.into(),
        customer: payload.customer_id.into(),
        rating: payload.rating,
        title: sanitize_input(&payload.title),
        content: sanitize_input(&payload.content),
    };

    match state.reviews.create_review(new) {
        Ok(review) => Response::created(json!({
            "data": review_json(&review),
            "message": "Review created successfully",
        })),
        Err(error) => into_response(&error),
    }
}

/// `GET /api/v1/products/{product_id}/reviews` — a product's reviews.
pub(crate) fn list(state: &AppState, request: &Request, params: &PathParams) -> Response {
    let product = match path_uuid(params, "product_id") {
        Ok(uuid) => uuid,
        Err(response) => return response,
    };

    let page = parse_pagination(&request.query);

    match state.reviews.product_reviews(product.into(), page) {
        Ok(reviews) => Response::ok(json!({
            "data": reviews.data.iter().map(review_json).collect::<Vec<_>>(),
            "count": reviews.data.len(),
        })),
        Err(error) => into_response(&error),
    }
}

/// `POST /api/v1/reviews/{review_id}/helpful` — count a helpful vote.
pub(crate) fn mark_helpful(state: &AppState, _request: &Request, params: &PathParams) -> Response {
    let review = match path_uuid(params, "review_id") {
        Ok(uuid) => uuid,
        Err(response) => return response,
    };

    match state.reviews.mark_helpful(review.into()) {
        Ok(votes) => Response::ok(json!({
            "helpful_votes": votes,
            "is_top_review": votes >= crate::models::review::TOP_REVIEW_THRESHOLD,
        })),
        Err(error) => into_response(&error),
    }
}

/// Shape a review for an API payload.
pub(crate) fn review_json(review: &Review) -> Value {
    json!({
        "id": review.uuid.to_string(),
        "rating": review.rating,
        "title": review.title,
        "content": review.content,
        "is_verified_purchase": review.is_verified_purchase,
        "helpful_votes": review.helpful_votes,
        "is_top_review": review.is_top_review(),
    })
}

/// Map a reviews-service failure onto a status code.
pub(crate) fn into_response(error: &ReviewsServiceError) -> Response {
    match error {
        ReviewsServiceError::InvalidRating => Response::bad_request(error.to_string()),
        ReviewsServiceError::NotFound => Response::not_found("Review not found"),
        ReviewsServiceError::Db(source) => {
            error!("reviews route failed: {source}");

            Response::internal_error()
        }
    }
}
