use crate::constants::{ALLOWED_MIME_TYPES, MAX_UPLOAD_SIZE};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported file type: {0}. Allowed: {}", ALLOWED_MIME_TYPES.join(", "))]
    UnsupportedType(String),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("Backend URL is not configured")]
    ConfigMissing,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Server error: {status}. {body}")]
    ServerError { status: u16, body: String },

    #[error("Preview error: {0}")]
    Preview(String),

    #[error("Request superseded by a newer submission")]
    Superseded,

    #[error("No compressed result available")]
    NoResult,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Size-limit rejection reported by the server rather than detected locally.
    pub fn server_size_limit() -> Self {
        UploadError::FileTooLarge(0, MAX_UPLOAD_SIZE)
    }

    /// One-line notification suitable for showing to the person who picked the file.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::UnsupportedType(mime) => format!(
                "Unsupported file type ({}). Please choose a JPEG, PNG, GIF or WebP image.",
                mime
            ),
            UploadError::FileTooLarge(_, limit) => format!(
                "Upload failed: The image is too large (max {}MB).",
                limit / (1024 * 1024)
            ),
            UploadError::ConfigMissing => {
                "Configuration error: Cannot connect to the backend service.".to_string()
            }
            UploadError::NetworkError(_) => {
                "Could not connect to the compression service. Please check your internet connection."
                    .to_string()
            }
            UploadError::ServerError { status, body } => {
                let detail = if body.trim().is_empty() {
                    "Failed to compress image."
                } else {
                    body.trim()
                };
                format!("Compression failed: Server Error: {}. {}", status, detail)
            }
            UploadError::Preview(_) | UploadError::Io(_) => {
                "Compression failed. Please try again later.".to_string()
            }
            UploadError::Superseded => "A newer upload replaced this one.".to_string(),
            UploadError::NoResult => "Nothing to download yet.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;
