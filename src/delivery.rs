use crate::constants::{DOWNLOAD_PREFIX, FALLBACK_BASE_NAME};
use crate::error::{Result, UploadError};
use bytes::Bytes;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A compressed result ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Save/download boundary.
pub trait DownloadSink: Send + Sync {
    fn deliver(&self, download: &Download) -> Result<()>;
}

impl<T: DownloadSink + ?Sized> DownloadSink for Arc<T> {
    fn deliver(&self, download: &Download) -> Result<()> {
        (**self).deliver(download)
    }
}

/// Name the compressed file is offered under.
///
/// `photo.png` becomes `compressed-photo.png`; a name with no `.` is kept
/// whole, so `scan` becomes `compressed-scan`. A leading dot alone does not
/// start an extension, and an empty base falls back to `image`.
pub fn download_file_name(original: &str) -> String {
    let (base, extension) = match original.rfind('.') {
        Some(idx) if idx > 0 => (&original[..idx], &original[idx + 1..]),
        _ => (original, ""),
    };
    let base = if base.is_empty() { FALLBACK_BASE_NAME } else { base };

    if extension.is_empty() {
        format!("{}{}", DOWNLOAD_PREFIX, base)
    } else {
        format!("{}{}.{}", DOWNLOAD_PREFIX, base, extension)
    }
}

/// Writes downloads into a directory, the way a browser drops them in ~/Downloads.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn target_path(&self, download: &Download) -> PathBuf {
        // Names come from user input, keep only the final component
        let file_name = Path::new(&download.file_name)
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| FALLBACK_BASE_NAME.into());
        self.dir.join(file_name)
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, download: &Download) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let target = self.target_path(download);
        fs::write(&target, &download.bytes)?;
        crate::verbose!("Saved {} bytes to {:?}", download.bytes.len(), target);
        Ok(())
    }
}

/// Remembers every download instead of saving it.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Download>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.delivered
            .lock()
            .map(|delivered| delivered.clone())
            .unwrap_or_default()
    }
}

impl DownloadSink for RecordingSink {
    fn deliver(&self, download: &Download) -> Result<()> {
        self.delivered
            .lock()
            .map_err(|_| UploadError::Io(std::io::Error::other("download log poisoned")))?
            .push(download.clone());
        Ok(())
    }
}
