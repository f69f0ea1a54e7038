//! The router: path patterns, middleware and dispatch.

use std::{fmt, rc::Rc};

use decimal_percentage::Percentage;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    database::Database,
    routes::request::{Method, PathParams, Request, Response},
    services::{CustomersService, OrdersService, ProductsService, ReviewsService},
    utils::rate_limit::RateLimiter,
};

/// Requests allowed per client per minute.
pub const BURST_LIMIT: u32 = 100;

/// Header value that admits callers to admin endpoints and past the rate
/// limiter.
pub const ADMIN_TOKEN: &str = "ADMIN_SECRET_2024";

/// Header carrying the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Route prefixes that require a bearer token.
const PROTECTED_PREFIXES: [&str; 2] = ["/api/v1/orders", "/api/v1/customers/me"];

/// Services and storage shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Rc<Database>,
    pub products: ProductsService,
    pub customers: CustomersService,
    pub orders: OrdersService,
    pub reviews: ReviewsService,
    pub rate_limiter: Rc<RateLimiter>,
}

impl AppState {
    /// Wire every service over one shared database handle.
    #[must_use]
    pub fn new(db: Rc<Database>) -> Self {
        Self {
            products: ProductsService::new(Rc::clone(&db)),
            customers: CustomersService::new(Rc::clone(&db)),
            orders: OrdersService::new(Rc::clone(&db)),
            reviews: ReviewsService::new(Rc::clone(&db)),
            rate_limiter: Rc::new(RateLimiter::new(BURST_LIMIT)),
            db,
        }
    }

    /// Wire the services with limits and rates taken from configuration.
    #[must_use]
    pub fn with_config(db: Rc<Database>, config: &AppConfig) -> Self {
        Self {
            products: ProductsService::new(Rc::clone(&db)),
            customers: CustomersService::new(Rc::clone(&db)),
            orders: OrdersService::with_tax_rate(
                Rc::clone(&db),
                Percentage::from(config.tax_rate),
            ),
            reviews: ReviewsService::new(Rc::clone(&db)),
            rate_limiter: Rc::new(RateLimiter::new(config.rate_limit)),
            db,
        }
    }
}

type Handler = Box<dyn Fn(&AppState, &Request, &PathParams) -> Response>;
type Middleware = Box<dyn Fn(&AppState, &Request) -> Option<Response>>;

/// A compiled path pattern such as `/api/v1/products/{id}`.
struct PathPattern {
    regex: Regex,
}

impl PathPattern {
    /// Compile a pattern, turning `{name}` segments into named captures.
    fn compile(path: &str) -> Option<Self> {
        let pattern = path
            .split('/')
            .map(|segment| {
                segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                    .map_or_else(
                        || regex::escape(segment),
                        |name| format!("(?P<{name}>[^/]+)"),
                    )
            })
            .collect::<Vec<_>>()
            .join("/");

        Regex::new(&format!("^{pattern}$")).ok().map(|regex| Self { regex })
    }

    /// Match a concrete path, returning the captured parameters.
    fn captures(&self, path: &str) -> Option<PathParams> {
        let captures = self.regex.captures(path)?;

        Some(
            self.regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|value| (name.to_owned(), value.as_str().to_owned()))
                })
                .collect(),
        )
    }
}

/// Routes requests to handlers through a middleware chain.
pub struct Router {
    state: AppState,
    routes: Vec<(Method, PathPattern, Handler)>,
    middleware: Vec<Middleware>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.len())
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

impl Router {
    /// An empty router over the given state.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            routes: Vec::new(),
            middleware: Vec::new(),
        }
    }

    /// The full storefront API: default middleware plus every route.
    #[must_use]
    pub fn storefront(state: AppState) -> Self {
        let mut router = Self::new(state);

        router.add_middleware(logging_middleware);
        router.add_middleware(rate_limit_middleware);
        router.add_middleware(auth_middleware);

        // Products. The fixed /featured path has to land before the {id}
        // pattern, which would otherwise swallow it.
        router.add_route(Method::Get, "/api/v1/products", super::products::list);
        router.add_route(
            Method::Get,
            "/api/v1/products/featured",
            super::products::featured,
        );
        router.add_route(Method::Get, "/api/v1/products/{id}", super::products::get);
        router.add_route(
            Method::Get,
            "/api/v1/products/{product_id}/reviews",
            super::reviews::list,
        );
        router.add_route(
            Method::Post,
            "/api/v1/products/{product_id}/reviews",
            super::reviews::create,
        );

        // Customers.
        router.add_route(
            Method::Post,
            "/api/v1/customers/register",
            super::customers::register,
        );
        router.add_route(
            Method::Post,
            "/api/v1/customers/login",
            super::customers::login,
        );
        router.add_route(
            Method::Get,
            "/api/v1/customers/me",
            super::customers::profile,
        );

        // Orders.
        router.add_route(Method::Post, "/api/v1/orders", super::orders::create);
        router.add_route(Method::Get, "/api/v1/orders/{id}", super::orders::get);
        router.add_route(
            Method::Post,
            "/api/v1/orders/{id}/cancel",
            super::orders::cancel,
        );

        // Reviews.
        router.add_route(
            Method::Post,
            "/api/v1/reviews/{review_id}/helpful",
            super::reviews::mark_helpful,
        );

        // Admin.
        router.add_route(Method::Get, "/api/v1/admin/stats", super::admin::stats);
        router.add_route(
            Method::Post,
            "/api/v1/admin/maintenance",
            super::admin::maintenance,
        );

        router
    }

    /// Register a route. Patterns that fail to compile are dropped with a
    /// warning rather than poisoning the router.
    pub fn add_route(
        &mut self,
        method: Method,
        path: &str,
        handler: impl Fn(&AppState, &Request, &PathParams) -> Response + 'static,
    ) {
        match PathPattern::compile(path) {
            Some(pattern) => self.routes.push((method, pattern, Box::new(handler))),
            None => warn!("dropping route with uncompilable pattern: {path}"),
        }
    }

    /// Append a middleware to the chain. A middleware that returns a
    /// response short-circuits dispatch.
    pub fn add_middleware(
        &mut self,
        middleware: impl Fn(&AppState, &Request) -> Option<Response> + 'static,
    ) {
        self.middleware.push(Box::new(middleware));
    }

    /// Route a request to its handler.
    #[must_use]
    pub fn dispatch(&self, request: &Request) -> Response {
        for middleware in &self.middleware {
            if let Some(response) = middleware(&self.state, request) {
                return response;
            }
        }

        for (method, pattern, handler) in &self.routes {
            if *method != request.method {
                continue;
            }

            if let Some(params) = pattern.captures(&request.path) {
                return handler(&self.state, request, &params);
            }
        }

        Response::not_found("Not found")
    }

    /// The shared state handlers run against.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Log every request with its trace id.
fn logging_middleware(_state: &AppState, request: &Request) -> Option<Response> {
    info!(
        "{} {} - {}",
        request.method.as_str(),
        request.path,
        request.request_id
    );

    None
}

/// Sliding-window rate limiting keyed by forwarded client address. The
/// admin token bypasses the limiter entirely.
fn rate_limit_middleware(state: &AppState, request: &Request) -> Option<Response> {
    if request.header(ADMIN_TOKEN_HEADER) == Some(ADMIN_TOKEN) {
        return None;
    }

    let client = request.header("X-Forwarded-For").unwrap_or("unknown");

    if state.rate_limiter.is_allowed(client) {
        None
    } else {
        Some(Response::too_many_requests(serde_json::json!({
            "error": "Rate limit exceeded",
            "retry_after": 60,
            "limit": BURST_LIMIT,
        })))
    }
}

/// Require a bearer token on protected prefixes.
fn auth_middleware(_state: &AppState, request: &Request) -> Option<Response> {
    let protected = PROTECTED_PREFIXES
        .iter()
        .any(|prefix| request.path.starts_with(prefix));

    if !protected {
        return None;
    }

    match request.header("Authorization") {
        Some(header) if header.starts_with("Bearer ") => None,
        _ => Some(Response::unauthorized("Authentication required")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn state() -> Result<AppState, crate::database::SeedError> {
        Ok(AppState::new(Rc::new(Database::new()?)))
    }

    #[test]
    fn patterns_capture_named_segments() -> TestResult {
        let pattern =
            PathPattern::compile("/api/v1/products/{id}").ok_or("pattern failed to compile")?;

        let params = pattern
            .captures("/api/v1/products/abc-123")
            .ok_or("expected a match")?;

        assert_eq!(params.get("id").map(String::as_str), Some("abc-123"));
        assert!(pattern.captures("/api/v1/products/a/b").is_none());

        Ok(())
    }

    #[test]
    fn unmatched_paths_fall_through_to_404() -> TestResult {
        let router = Router::storefront(state()?);

        let response = router.dispatch(&Request::get("/api/v1/nothing-here"));

        assert_eq!(response.status, 404);

        Ok(())
    }

    #[test]
    fn handlers_receive_path_params() -> TestResult {
        let mut router = Router::new(state()?);

        router.add_route(Method::Get, "/widgets/{name}", |_, _, params| {
            Response::ok(json!({ "name": params.get("name") }))
        });

        let response = router.dispatch(&Request::get("/widgets/sprocket"));

        assert_eq!(response.body, json!({ "name": "sprocket" }));

        Ok(())
    }

    #[test]
    fn middleware_can_short_circuit() -> TestResult {
        let mut router = Router::new(state()?);

        router.add_middleware(|_, _| Some(Response::forbidden("closed for maintenance")));
        router.add_route(Method::Get, "/open", |_, _, _| Response::ok(json!({})));

        let response = router.dispatch(&Request::get("/open"));

        assert_eq!(response.status, 403);

        Ok(())
    }

    #[test]
    fn protected_prefixes_need_a_bearer_token() -> TestResult {
        let router = Router::storefront(state()?);

        let bare = router.dispatch(&Request::get("/api/v1/customers/me"));

        assert_eq!(bare.status, 401);

        Ok(())
    }

    #[test]
    fn rate_limiter_kicks_in_after_the_burst() -> TestResult {
        let router = Router::storefront(state()?);

        let mut last = 0;
        for _ in 0..=BURST_LIMIT {
            last = router
                .dispatch(&Request::get("/api/v1/products"))
                .status;
        }

        assert_eq!(last, 429);

        Ok(())
    }

    #[test]
    fn admin_token_bypasses_the_rate_limiter() -> TestResult {
        let router = Router::storefront(state()?);

        let mut last = 0;
        for _ in 0..=BURST_LIMIT {
            last = router
                .dispatch(
                    &Request::get("/api/v1/products").with_header(ADMIN_TOKEN_HEADER, ADMIN_TOKEN),
                )
                .status;
        }

        assert_eq!(last, 200);

        Ok(())
    }
}
