//! Upload storage: persist a validated upload to the configured upload
//! directory before it is enqueued for processing. Grounded on
//! `original_source/cv-intake-service/services/file_service.py`'s
//! `save_uploaded_file` (job-id-named file in a single durable directory;
//! this port skips the original's separate temp-then-copy step and its
//! optional S3 mirror, neither of which the adapter layer implements).

use crate::env_check::InfraResult;
use resumariner_adapters::validation::validate_upload;
use resumariner_config::IngestLimits;
use resumariner_domain::JobId;
use resumariner_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::path::Path;

/// Validate `bytes` as an upload of `file_name` against `limits`, then
/// write it to `upload_dir/{job_id}{extension}`. Returns the path a
/// worker can later read the file back from.
pub async fn save_uploaded_file(
    upload_dir: &Path,
    job_id: JobId,
    file_name: &str,
    bytes: &[u8],
    limits: IngestLimits,
) -> InfraResult<String> {
    validate_upload(file_name, bytes, &limits)?;

    let extension = Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(ErrorEnvelope::from)?;

    let destination = upload_dir.join(format!("{job_id}{extension}"));
    tokio::fs::write(&destination, bytes)
        .await
        .map_err(ErrorEnvelope::from)?;

    destination.to_str().map(ToString::to_string).ok_or_else(|| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("infra", "non_utf8_upload_path"),
            "uploaded file path is not valid UTF-8",
            ErrorClass::NonRetriable,
        )
    })
}
