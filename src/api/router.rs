//! API router.
//!
//! Returns a composable `Router` with every endpoint nested under `/api/`.
//! Layers (outermost → innermost): CORS → access log → handler.

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/analyze", post(endpoints::analyze::analyze))
        .route(
            "/medications",
            get(endpoints::medications::list).post(endpoints::medications::create),
        )
        .route(
            "/medications/analyze",
            post(endpoints::medications::analyze_stored),
        )
        .route(
            "/medications/:id",
            get(endpoints::medications::detail)
                .put(endpoints::medications::update)
                .delete(endpoints::medications::remove),
        )
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(cors_layer())
}
