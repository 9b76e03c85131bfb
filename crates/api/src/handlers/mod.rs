pub mod actor;
pub mod genre;
pub mod movie;

use filmoteca_core::storage::validate_image_upload;

use crate::error::AppResult;
use crate::form::Upload;
use crate::state::AppState;

/// Reject an image upload the store should not accept (type, size).
pub(crate) fn check_upload(state: &AppState, upload: &Upload) -> AppResult<()> {
    validate_image_upload(
        &upload.content_type,
        upload.bytes.len(),
        state.config.max_upload_bytes,
    )?;
    Ok(())
}

/// Best-effort removal of a blob whose owning row was never saved.
pub(crate) async fn discard_blob(state: &AppState, reference: &str, container: &str) {
    match state.files.delete(reference, container).await {
        Ok(()) => tracing::warn!(reference, container, "Discarded blob after failed save"),
        Err(e) => tracing::error!(error = %e, reference, container, "Failed to discard orphaned blob"),
    }
}

/// Best-effort removal of a blob that a committed save has superseded.
pub(crate) async fn retire_blob(state: &AppState, reference: &str, container: &str) {
    match state.files.delete(reference, container).await {
        Ok(()) => tracing::debug!(reference, container, "Removed superseded blob"),
        Err(e) => tracing::error!(error = %e, reference, container, "Failed to remove superseded blob"),
    }
}
