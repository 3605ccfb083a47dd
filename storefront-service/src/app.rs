use std::sync::Arc;

use axum::http::{header::{ACCEPT, CONTENT_TYPE}, HeaderName, HeaderValue, Method, StatusCode};
use axum::routing::{delete, get, patch, post};
use axum::{middleware, Router};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::error;

use common_auth::{AuthError, TokenService};
use common_http_errors::ApiError;

use crate::catalog_handlers::{
    add_cart_item, create_product, create_review, delete_product, get_product, list_cart,
    list_products, list_reviews, list_testimonials, remove_cart_item, update_product,
};
use crate::gateway::{GatewayError, PaymentGateway};
use crate::order_handlers::{
    create_payment_intent, get_order, list_orders, record_order, update_order_status,
};
use crate::user_handlers::{
    admin_status, delete_user, issue_session, list_users, promote_user, register_user,
};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
static HTTP_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let v = IntCounterVec::new(
        Opts::new("http_errors_total", "Count of HTTP error responses emitted (status >= 400)"),
        &["service", "code", "status"],
    ).unwrap();
    REGISTRY.register(Box::new(v.clone())).ok();
    v
});

/// Counts every error response by the code the error types stamp into the
/// `X-Error-Code` header; bodies are never parsed.
pub async fn http_error_metrics(req: axum::http::Request<axum::body::Body>, next: axum::middleware::Next) -> axum::response::Response {
    let resp = next.run(req).await;
    let status = resp.status();
    if status.as_u16() >= 400 {
        let code = resp.headers().get("X-Error-Code").and_then(|v| v.to_str().ok()).unwrap_or("unknown");
        HTTP_ERRORS_TOTAL.with_label_values(&["storefront-service", code, status.as_str()]).inc();
    }
    resp
}

pub async fn health() -> &'static str { "ok" }

async fn banner() -> &'static str { "storefront backend is running" }

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: Arc<TokenService>,
    /// Trait object so tests and local runs can swap in the stub gateway.
    pub gateway: Arc<dyn PaymentGateway>,
}

impl axum::extract::FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self { state.tokens.clone() }
}

/// Log the store failure, hand the client an opaque 500.
pub(crate) fn store_error(err: sqlx::Error) -> ApiError {
    error!(error = %err, "data store operation failed");
    ApiError::Internal
}

/// Log the gateway failure; only user-actionable decline text goes out.
pub(crate) fn gateway_error(err: GatewayError) -> ApiError {
    error!(error = %err, "payment gateway call failed");
    ApiError::gateway(err.client_message())
}

pub(crate) fn token_error(err: AuthError) -> ApiError {
    error!(error = %err, "token issuance failed");
    ApiError::Internal
}

pub fn build_router(state: AppState) -> Router {
    let allowed_origins = [
        "http://localhost:3000",
        "http://localhost:5173",
    ];
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            allowed_origins.iter().filter_map(|o| o.parse::<HeaderValue>().ok()).collect::<Vec<_>>(),
        ))
        .allow_methods([
            Method::GET, Method::POST, Method::PATCH, Method::PUT, Method::DELETE, Method::OPTIONS,
        ])
        .allow_headers([
            ACCEPT, CONTENT_TYPE, HeaderName::from_static("authorization"),
        ]);

    async fn metrics(axum::extract::State(_state): axum::extract::State<AppState>) -> (StatusCode, String) {
        let encoder = TextEncoder::new();
        let families = REGISTRY.gather();
        let mut buf = Vec::new();
        if let Err(e) = encoder.encode(&families, &mut buf) {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
        }
        (StatusCode::OK, String::from_utf8_lossy(&buf).to_string())
    }

    Router::new()
        .route("/", get(banner))
        .route("/healthz", get(health))
        .route("/users", get(list_users).post(register_user))
        // One registration per path: the id-shaped PATCH and DELETE and the
        // email-shaped GET share the `/users/:id` segment.
        .route(
            "/users/:id",
            patch(promote_user).get(admin_status).delete(delete_user),
        )
        .route("/session", post(issue_session))
        .route("/payment", post(record_order).get(list_orders))
        .route("/payment/:tnx_id", patch(update_order_status).get(get_order))
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/product", get(list_products).post(create_product))
        .route(
            "/product/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/review", get(list_testimonials))
        .route("/reviews", get(list_reviews).post(create_review))
        .route("/carts", get(list_cart).post(add_cart_item))
        .route("/carts/:id", delete(remove_cart_item))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(http_error_metrics))
}
