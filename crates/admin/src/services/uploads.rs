//! File host uploads for notice attachments, syllabus PDFs and teacher resources.
//!
//! Uploads are a single multipart POST with no retry. The host answers with a
//! permanent `secure_url`, which is what the relay later stores.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

use crate::config::FileHostConfig;

/// Largest accepted upload (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const RANDOM_SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Errors that can occur while validating or forwarding an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file provided")]
    MissingFile,

    #[error("Unknown upload folder: {0}")]
    UnknownFolder(String),

    #[error("File is too large ({size} bytes). Maximum size is 10MB.")]
    TooLarge { size: usize },

    #[error("Invalid file type. Allowed for {folder}: {allowed}")]
    UnsupportedType {
        folder: UploadFolder,
        allowed: &'static str,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The file host rejected the upload.
    #[error("File host error: {status} - {message}")]
    Host { status: u16, message: String },

    /// Failed to parse the host response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl UploadError {
    /// Whether the error stems from the submitted file rather than the host.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingFile
                | Self::UnknownFolder(_)
                | Self::TooLarge { .. }
                | Self::UnsupportedType { .. }
        )
    }
}

/// Destination subfolder on the file host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFolder {
    Notices,
    Syllabus,
    TeacherResources,
}

impl UploadFolder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Notices => "notices",
            Self::Syllabus => "syllabus",
            Self::TeacherResources => "teacher-resources",
        }
    }

    /// Whether files of `kind` may be stored in this folder.
    #[must_use]
    pub const fn accepts(self, kind: FileKind) -> bool {
        match self {
            Self::Notices | Self::Syllabus => matches!(kind, FileKind::Pdf),
            Self::TeacherResources => true,
        }
    }

    const fn allowed(self) -> &'static str {
        match self {
            Self::Notices | Self::Syllabus => "PDF",
            Self::TeacherResources => "PDF, DOC, DOCX",
        }
    }
}

impl fmt::Display for UploadFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadFolder {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notices" => Ok(Self::Notices),
            "syllabus" => Ok(Self::Syllabus),
            "teacher-resources" => Ok(Self::TeacherResources),
            _ => Err(UploadError::UnknownFolder(s.to_owned())),
        }
    }
}

/// Document formats the admin tools accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Doc,
    Docx,
}

impl FileKind {
    /// Classify by MIME type, falling back to the extension when the browser
    /// sent a generic type.
    #[must_use]
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Option<Self> {
        let by_mime = match content_type.map(str::to_ascii_lowercase).as_deref() {
            Some("application/pdf") => Some(Self::Pdf),
            Some("application/msword") => Some(Self::Doc),
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document") => {
                Some(Self::Docx)
            }
            Some("application/octet-stream") | None => None,
            Some(_) => return None,
        };

        by_mime.or_else(|| {
            let (_, ext) = file_name.rsplit_once('.')?;
            match ext.to_ascii_lowercase().as_str() {
                "pdf" => Some(Self::Pdf),
                "doc" => Some(Self::Doc),
                "docx" => Some(Self::Docx),
                _ => None,
            }
        })
    }
}

/// A file received from the admin UI.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Check size and type for `folder`.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::MissingFile` for an empty file,
    /// `UploadError::TooLarge` above [`MAX_UPLOAD_BYTES`] and
    /// `UploadError::UnsupportedType` for formats the folder does not take.
    pub fn validate(&self, folder: UploadFolder) -> Result<FileKind, UploadError> {
        if self.bytes.is_empty() {
            return Err(UploadError::MissingFile);
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge {
                size: self.bytes.len(),
            });
        }

        FileKind::detect(self.content_type.as_deref(), &self.file_name)
            .filter(|kind| folder.accepts(*kind))
            .ok_or(UploadError::UnsupportedType {
                folder,
                allowed: folder.allowed(),
            })
    }
}

/// Unique host-side identifier: `<sanitized stem>_<epoch ms>_<9 base36 chars>`.
#[must_use]
pub fn public_id<R: Rng + ?Sized>(file_name: &str, now: DateTime<Utc>, rng: &mut R) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem,
        _ => file_name,
    };
    let sanitized: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();

    format!("{sanitized}_{}_{suffix}", now.timestamp_millis())
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// File host API client.
#[derive(Clone)]
pub struct FileHostClient {
    inner: Arc<FileHostClientInner>,
}

struct FileHostClientInner {
    client: reqwest::Client,
    config: FileHostConfig,
}

impl FileHostClient {
    /// Create a new file host client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: FileHostConfig) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            inner: Arc::new(FileHostClientInner { client, config }),
        })
    }

    /// Validate `file` and upload it into `folder`, returning its permanent URL.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`UploadFile::validate`], or
    /// `Http`/`Host`/`Parse` if the host call fails.
    pub async fn upload(&self, folder: UploadFolder, file: UploadFile) -> Result<String, UploadError> {
        file.validate(folder)?;
        let config = &self.inner.config;

        let public_id = public_id(&file.file_name, Utc::now(), &mut rand::rng());
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("upload_preset", config.upload_preset.clone())
            .text("folder", format!("{}/{}", config.folder, folder))
            .text("public_id", public_id.clone());

        let response = self
            .inner
            .client
            .post(config.upload_url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::Host {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Parse(format!("Failed to parse upload response: {e}")))?;

        tracing::info!(%folder, %public_id, "File uploaded");
        Ok(body.secure_url)
    }
}
