use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{AppError, Result};
use crate::models::{sample_blogs, BlogRecord};
use crate::services::validator;
use crate::AppState;

/// List the seeded blog records
/// GET /
pub async fn list_blogs() -> Result<Response> {
    let blogs = sample_blogs();

    // Serialize explicitly so an encoding failure reaches the 500 path
    // instead of being absorbed by the Json responder.
    let body = serde_json::to_string(&blogs)?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Validate and echo a posted blog record
/// POST /createBlog
pub async fn create_blog(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BlogRecord>, JsonRejection>,
) -> Result<Json<BlogRecord>> {
    // A body that fails to decode is a distinct failure from a record that
    // decodes but violates its constraints.
    let Json(record) = payload.map_err(|e| AppError::Decode(e.body_text()))?;

    validator::validate(&record.field_specs(&state.config.validation))?;

    Ok(Json(record))
}
