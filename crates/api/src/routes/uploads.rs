use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extract::AuthUser,
    response::Envelope,
    state::AppState,
};

const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;
const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/resume", post(upload_resume_handler))
        // Multipart framing overhead on top of the document itself.
        .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES + 64 * 1024))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPayload {
    pub path: String,
    pub size_bytes: usize,
}

fn resume_extension(file_name: &str) -> ApiResult<&'static str> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .ok_or_else(|| {
            ApiError::validation_code("UNSUPPORTED_FILE_TYPE", "file has no extension")
        })?;
    ALLOWED_EXTENSIONS
        .iter()
        .find(|allowed| **allowed == ext)
        .copied()
        .ok_or_else(|| {
            ApiError::validation_code(
                "UNSUPPORTED_FILE_TYPE",
                "resume must be a pdf, doc, or docx file",
            )
        })
}

async fn upload_resume_handler(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Envelope<UploadPayload>>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::validation(format!("malformed multipart body: {err}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::validation("file field is missing a filename"))?;
        let ext = resume_extension(&file_name)?;
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::validation(format!("failed to read upload: {err}")))?;
        if bytes.is_empty() {
            return Err(ApiError::validation("uploaded file is empty"));
        }
        if bytes.len() > MAX_RESUME_BYTES {
            return Err(ApiError::validation_code(
                "FILE_TOO_LARGE",
                "resume may not exceed 5 MB",
            ));
        }

        let relative = format!("resumes/{}.{ext}", Uuid::new_v4());
        let target = state.settings.upload_dir.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(anyhow::Error::new)?;
        }
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(anyhow::Error::new)?;
        info!(user_id = %current.user_id, path = %relative, size = bytes.len(), "resume stored");

        return Ok((
            StatusCode::CREATED,
            Envelope::ok(
                "resume uploaded",
                UploadPayload {
                    path: relative,
                    size_bytes: bytes.len(),
                },
            ),
        ));
    }
    Err(ApiError::validation("multipart body must include a file field"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_allow_list() {
        assert_eq!(resume_extension("cv.pdf").unwrap(), "pdf");
        assert_eq!(resume_extension("cv.DOCX").unwrap(), "docx");
        assert!(resume_extension("cv.exe").is_err());
        assert!(resume_extension("resume").is_err());
    }
}
