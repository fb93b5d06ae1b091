pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::ServerConfig;
use crate::services::storage::ObjectStore;
use axum::{
    Router,
    middleware::from_fn,
    routing::get,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::objects::upload_object,
        api::handlers::objects::list_objects,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::UploadReceipt,
            models::PublicObject,
            models::PublicOwner,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "objects", description = "Object upload and listing"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Shared state of the upload service.
#[derive(Clone)]
pub struct UploadState {
    pub store: Arc<dyn ObjectStore>,
    pub config: ServerConfig,
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any)
}

/// Upload service: `POST /` stores an image, `GET /` lists the bucket.
pub fn create_upload_app(state: UploadState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route(
            "/",
            get(api::handlers::objects::list_objects).post(api::handlers::objects::upload_object),
        )
        .route("/health", get(api::handlers::health::health_check))
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(cors_layer())
        .layer(axum::extract::DefaultBodyLimit::max(state.config.body_limit()))
        .with_state(state)
}

/// Skeleton API service: welcome and status routes, JSON 404 for everything else.
pub fn create_api_app() -> Router {
    Router::new()
        .route(
            "/",
            get(api::handlers::status::welcome).fallback(api::handlers::status::not_found),
        )
        .route(
            "/status",
            get(api::handlers::status::status).fallback(api::handlers::status::not_found),
        )
        .fallback(api::handlers::status::not_found)
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(cors_layer())
}

/// Wrap a service router in the HTTP trace layer. The request-id layer sits
/// outermost so the trace span sees the id even when the server assigns it.
pub fn with_http_tracing(app: Router) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            let request_id = request
                .headers()
                .get(&api::middleware::request_id::REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    app.layer(trace_layer)
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
}
