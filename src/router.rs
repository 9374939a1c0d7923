use std::time::Duration;

use anyhow::anyhow;
use axum::http::{HeaderValue, Method, Uri};
use axum::{Router, middleware, routing::get};
use roster_core::{ApiResponse, AppError};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::modules::students::init_students_router;
use crate::state::AppState;

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = crate::docs::MessageEnvelope)),
    tag = "Health"
)]
pub async fn health() -> ApiResponse<()> {
    ApiResponse::ok("ok")
}

async fn fallback(uri: Uri) -> AppError {
    AppError::not_found(anyhow!("No route for {}", uri.path()))
}

pub fn init_router(state: AppState) -> Router {
    let cors = {
        let allowed_origins: Vec<HeaderValue> = state
            .config
            .cors
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .max_age(Duration::from_secs(state.config.cors.max_age_secs))
    };

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .merge(init_students_router())
        .fallback(fallback)
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
}
