use crate::constants::MAX_UPLOAD_SIZE;
use crate::error::{Result, UploadError};
use crate::formats::ImageMime;
use crate::source::SourceFile;
use std::str::FromStr;

/// Checks a picked file against the type allow-list and the upload size limit.
///
/// Runs before anything is allocated, so a rejection leaves no trace.
pub fn validate_source(file: &SourceFile) -> Result<ImageMime> {
    validate_declared(&file.mime_type, file.size())
}

/// Same checks from a declared type and size alone; the type wins when both fail.
pub fn validate_declared(mime_type: &str, size: u64) -> Result<ImageMime> {
    let mime = ImageMime::from_str(mime_type)?;

    if size > MAX_UPLOAD_SIZE {
        return Err(UploadError::FileTooLarge(size, MAX_UPLOAD_SIZE));
    }

    Ok(mime)
}

/// Whether a server-side failure is really the size limit talking
pub fn is_size_limit_rejection(status: u16, body: &str) -> bool {
    status == 413
        || body
            .to_lowercase()
            .contains(crate::constants::SIZE_LIMIT_MARKER)
}
