use axum::extract::{Multipart, State};

use crate::error::Result;
use crate::services::ingest::IngestError;
use crate::AppState;

/// Accept a bounded file upload
/// POST /upload (multipart, field name "file")
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<&'static str> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| IngestError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let mut sink = state.ingestor.begin(&filename).await?;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| IngestError::BadRequest(format!("failed to read upload: {e}")))?
        {
            sink.write_chunk(&chunk).await?;
        }

        let stored = sink.finish().await?;
        tracing::debug!("Upload complete: {:?}", stored);

        return Ok("Upload successful");
    }

    Err(IngestError::BadRequest("missing multipart field \"file\"".to_string()).into())
}
