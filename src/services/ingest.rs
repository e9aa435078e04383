use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Failure modes of a single ingestion.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("The uploaded file is too big. Please choose a file that's less than {0} bytes in size")]
    TooLarge(u64),

    #[error("Bad upload request: {0}")]
    BadRequest(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] std::io::Error),
}

/// Transfers uploaded byte streams to durable storage under generated names.
///
/// Stateless apart from its configuration; safe to share across concurrent
/// requests. The destination directory is created on demand and may be
/// created concurrently by several in-flight ingestions.
pub struct UploadIngestor {
    dest_dir: PathBuf,
    max_bytes: u64,
}

impl UploadIngestor {
    pub fn new(dest_dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Open a sink for one upload.
    ///
    /// Only a sanitized extension of `declared_filename` reaches the
    /// destination path; the base name is a process-unique timestamp.
    pub async fn begin(&self, declared_filename: &str) -> Result<IngestSink, IngestError> {
        fs::create_dir_all(&self.dest_dir)
            .await
            .map_err(IngestError::StorageUnavailable)?;

        let name = format!("{}{}", next_stamp(), sanitized_extension(declared_filename));
        let path = self.dest_dir.join(name);

        let file = fs::File::create(&path)
            .await
            .map_err(IngestError::StorageUnavailable)?;

        Ok(IngestSink {
            file,
            path,
            written: 0,
            max_bytes: self.max_bytes,
        })
    }

    /// Drain a whole byte stream into storage and return the stored path.
    ///
    /// The size cap is enforced while streaming, so at most `max_bytes` of
    /// an oversized upload ever reach memory or disk.
    pub async fn ingest<S, E>(
        &self,
        mut stream: S,
        declared_filename: &str,
    ) -> Result<PathBuf, IngestError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: fmt::Display,
    {
        let mut sink = self.begin(declared_filename).await?;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| IngestError::BadRequest(format!("failed to read upload: {e}")))?;
            sink.write_chunk(&chunk).await?;
        }
        sink.finish().await
    }
}

/// In-progress transfer of one upload to its destination file.
pub struct IngestSink {
    file: fs::File,
    path: PathBuf,
    written: u64,
    max_bytes: u64,
}

impl IngestSink {
    /// Append one chunk, enforcing the cumulative size cap.
    ///
    /// A chunk that would cross the cap is not written at all; the partial
    /// destination file is removed before reporting `TooLarge`.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), IngestError> {
        if self.written + chunk.len() as u64 > self.max_bytes {
            let _ = fs::remove_file(&self.path).await;
            return Err(IngestError::TooLarge(self.max_bytes));
        }

        self.file
            .write_all(chunk)
            .await
            .map_err(IngestError::StorageUnavailable)?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush and hand the destination file over to the filesystem.
    pub async fn finish(mut self) -> Result<PathBuf, IngestError> {
        self.file
            .flush()
            .await
            .map_err(IngestError::StorageUnavailable)?;

        tracing::debug!("Stored upload at {:?} ({} bytes)", self.path, self.written);
        Ok(self.path)
    }
}

/// Nanosecond timestamp guaranteed to be distinct and increasing across the
/// process, even when the clock reports the same instant twice.
fn next_stamp() -> i64 {
    static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

    let now = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let mut last = LAST_STAMP.load(Ordering::SeqCst);
    loop {
        let candidate = now.max(last + 1);
        match LAST_STAMP.compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

/// Extract a trailing extension from a client-declared filename.
///
/// Nothing else of the name is trusted: traversal segments are discarded by
/// taking only the final component's extension, and the extension itself is
/// kept only if it is purely ASCII alphanumeric.
fn sanitized_extension(declared_filename: &str) -> String {
    Path::new(declared_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::collections::HashSet;
    use std::convert::Infallible;
    use std::sync::Arc;

    fn chunks(data: &[&[u8]]) -> impl Stream<Item = Result<Bytes, Infallible>> + Unpin {
        stream::iter(
            data.iter()
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn extension_is_sanitized() {
        assert_eq!(sanitized_extension("photo.png"), ".png");
        assert_eq!(sanitized_extension("archive.tar.gz"), ".gz");
        assert_eq!(sanitized_extension("no_extension"), "");
        assert_eq!(sanitized_extension("../../etc/passwd"), "");
        assert_eq!(sanitized_extension("trailing."), "");
        assert_eq!(sanitized_extension("bad.e|t"), "");
        assert_eq!(sanitized_extension(""), "");
    }

    #[test]
    fn stamps_are_strictly_increasing() {
        let mut prev = next_stamp();
        for _ in 0..1000 {
            let stamp = next_stamp();
            assert!(stamp > prev);
            prev = stamp;
        }
    }

    #[tokio::test]
    async fn round_trips_upload_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let ingestor = UploadIngestor::new(dir.path(), 1024 * 1024);

        let payload = b"hello upload";
        let stored = ingestor
            .ingest(chunks(&[&payload[..6], &payload[6..]]), "note.txt")
            .await
            .unwrap();

        assert_eq!(stored.extension().unwrap(), "txt");
        assert_eq!(tokio::fs::read(&stored).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn creates_missing_destination_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let ingestor = UploadIngestor::new(&nested, 1024);

        let stored = ingestor.ingest(chunks(&[b"x"]), "f.bin").await.unwrap();
        assert!(stored.starts_with(&nested));
    }

    #[tokio::test]
    async fn rejects_oversized_stream_without_leaving_file() {
        let dir = tempfile::tempdir().unwrap();
        let ingestor = UploadIngestor::new(dir.path(), 8);

        let err = ingestor
            .ingest(chunks(&[b"12345", b"6789"]), "big.bin")
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::TooLarge(8)));

        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn accepts_stream_exactly_at_cap() {
        let dir = tempfile::tempdir().unwrap();
        let ingestor = UploadIngestor::new(dir.path(), 8);

        let stored = ingestor
            .ingest(chunks(&[b"1234", b"5678"]), "fits.bin")
            .await
            .unwrap();
        assert_eq!(tokio::fs::read(&stored).await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn reports_stream_errors_as_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let ingestor = UploadIngestor::new(dir.path(), 1024);

        let broken =
            stream::iter(vec![Ok(Bytes::from_static(b"ok")), Err("connection reset")]);
        let err = ingestor.ingest(broken, "f.bin").await.unwrap_err();
        assert!(matches!(err, IngestError::BadRequest(_)));
    }

    #[tokio::test]
    async fn concurrent_ingestions_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let ingestor = Arc::new(UploadIngestor::new(dir.path(), 1024));

        let mut handles = Vec::new();
        for i in 0..32 {
            let ingestor = Arc::clone(&ingestor);
            handles.push(tokio::spawn(async move {
                let body = format!("payload {i}").into_bytes();
                ingestor
                    .ingest(
                        stream::iter(vec![Ok::<_, Infallible>(Bytes::from(body))]),
                        "same.txt",
                    )
                    .await
                    .unwrap()
            }));
        }

        let mut paths = HashSet::new();
        for handle in handles {
            paths.insert(handle.await.unwrap());
        }
        assert_eq!(paths.len(), 32);
    }
}
