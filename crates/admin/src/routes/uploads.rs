//! File upload endpoint.
//!
//! The browser posts a multipart form with a `file` part and a `folder`
//! text part; the file is checked and forwarded to the file host.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::RequireAdminSession;
use crate::services::uploads::{MAX_UPLOAD_BYTES, UploadError, UploadFile, UploadFolder};
use crate::state::AppState;

/// Headroom over the file limit for multipart framing and the folder field.
const BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

/// Build the uploads router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/uploads", post(upload))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /api/uploads
async fn upload(
    RequireAdminSession(admin): RequireAdminSession,
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let (file, folder) = read_form(multipart, declared_length(&headers)).await?;

    let url = state.file_host().upload(folder, file).await?;
    tracing::info!(admin = %admin.identity.admin_name, folder = %folder, url = %url, "File uploaded");

    Ok(Json(UploadResponse { url }))
}

/// Collect the `file` and `folder` parts of an upload form.
async fn read_form(
    mut multipart: Multipart,
    declared: Option<usize>,
) -> Result<(UploadFile, UploadFolder), AppError> {
    let mut file = None;
    let mut folder = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, declared))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(&e, declared))?;
                file = Some(UploadFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("folder") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(&e, declared))?;
                folder = Some(text.trim().parse::<UploadFolder>()?);
            }
            _ => {}
        }
    }

    let file = file.ok_or(UploadError::MissingFile)?;
    let folder = folder.ok_or_else(|| UploadError::UnknownFolder(String::new()))?;
    Ok((file, folder))
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Body-limit rejections read as an oversized file; anything else is a malformed form.
fn multipart_error(err: &MultipartError, declared: Option<usize>) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge {
            size: declared.unwrap_or(BODY_LIMIT),
        }
        .into()
    } else {
        AppError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "studyspace-form";

    async fn echo(headers: HeaderMap, multipart: Multipart) -> Result<String, AppError> {
        let (file, folder) = read_form(multipart, declared_length(&headers)).await?;
        Ok(format!("{folder}:{}", file.bytes.len()))
    }

    fn form(file_bytes: usize) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"folder\"\r\n\r\n\
             syllabus\r\n\
             --{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"os.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n"
        )
        .into_bytes();
        body.extend(std::iter::repeat_n(b'%', file_bytes));
        body.extend(format!("\r\n--{BOUNDARY}--\r\n").into_bytes());
        body
    }

    async fn post(limit: usize, body: Vec<u8>) -> (StatusCode, String) {
        let app = Router::new()
            .route("/", axum::routing::post(echo))
            .layer(DefaultBodyLimit::max(limit));
        let request = Request::post("/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_form_within_limit_is_read() {
        let (status, body) = post(8 * 1024, form(2048)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "syllabus:2048");
    }

    #[tokio::test]
    async fn test_body_over_limit_is_reported_as_too_large() {
        let body = form(16 * 1024);
        let size = body.len();
        let (status, body) = post(8 * 1024, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            value["error"],
            format!("File is too large ({size} bytes). Maximum size is 10MB.")
        );
    }

    #[tokio::test]
    async fn test_missing_folder_is_rejected() {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"a.pdf\"\r\n\r\n\
             %PDF\r\n\
             --{BOUNDARY}--\r\n"
        );
        let (status, _) = post(8 * 1024, body.into_bytes()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
