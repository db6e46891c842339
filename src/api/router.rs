//! HTTP router. Every route is nested under `/api/`.

use axum::http::Uri;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;

/// Build the API router around a ready [`ApiContext`].
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/ai/analyze", post(endpoints::ai::analyze))
        .route("/reports/generate", post(endpoints::reports::generate))
        .route("/readings", post(endpoints::readings::create))
        .route("/staff/thresholds", get(endpoints::thresholds::list))
        .route("/staff/thresholds/update", post(endpoints::thresholds::update))
        .route("/staff/assign", post(endpoints::specialist::assign))
        .route("/specialist/alerts", get(endpoints::specialist::alerts))
        .route(
            "/recommendations",
            get(endpoints::recommendations::list).post(endpoints::recommendations::create),
        )
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .fallback(not_found)
        .layer(CorsLayer::permissive())
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
