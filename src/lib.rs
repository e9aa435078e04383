pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::ingest::UploadIngestor;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ingestor: Arc<UploadIngestor>,
}

/// Headroom on top of the file byte cap for multipart framing, so the wire
/// body limit never trips before the ingestor's exact cap does.
const MULTIPART_OVERHEAD: usize = 8 * 1024;

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let upload_body_limit =
        state.config.storage.max_upload_bytes as usize + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(handlers::blog::list_blogs))
        .route("/createBlog", post(handlers::blog::create_blog))
        .route(
            "/upload",
            post(handlers::upload::upload_file).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
