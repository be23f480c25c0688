//! Preview handles: revocable references to image bytes kept around for display.
//!
//! A [`PreviewHandle`] is not `Clone` and [`PreviewStore::release`] consumes
//! it, so each handle goes back to its store at most once.

use crate::error::{Result, UploadError};
use crate::formats::ImageMime;
use bytes::Bytes;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    id: u64,
    uri: String,
}

impl PreviewHandle {
    pub fn new(id: u64, uri: impl Into<String>) -> Self {
        Self { id, uri: uri.into() }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Where a viewer can load the preview from
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

pub trait PreviewStore: Send + Sync {
    fn create(&self, bytes: &[u8], mime: ImageMime) -> Result<PreviewHandle>;
    fn release(&self, handle: PreviewHandle);
}

impl<T: PreviewStore + ?Sized> PreviewStore for Arc<T> {
    fn create(&self, bytes: &[u8], mime: ImageMime) -> Result<PreviewHandle> {
        (**self).create(bytes, mime)
    }

    fn release(&self, handle: PreviewHandle) {
        (**self).release(handle)
    }
}

/// Keeps previews as files in a private temporary directory.
///
/// The directory and anything still in it go away when the store is dropped.
pub struct TempFilePreviewStore {
    dir: TempDir,
    next_id: AtomicU64,
}

impl TempFilePreviewStore {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("compress-quick-preview-")
            .tempdir()
            .map_err(|e| UploadError::Preview(format!("Failed to create preview directory: {}", e)))?;

        Ok(Self {
            dir,
            next_id: AtomicU64::new(1),
        })
    }

    fn path_for(&self, id: u64, mime: ImageMime) -> PathBuf {
        self.dir
            .path()
            .join(format!("preview-{}.{}", id, mime.extension()))
    }
}

impl PreviewStore for TempFilePreviewStore {
    fn create(&self, bytes: &[u8], mime: ImageMime) -> Result<PreviewHandle> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let path = self.path_for(id, mime);
        fs::write(&path, bytes)
            .map_err(|e| UploadError::Preview(format!("Failed to write {:?}: {}", path, e)))?;

        Ok(PreviewHandle::new(id, format!("file://{}", path.display())))
    }

    fn release(&self, handle: PreviewHandle) {
        let path = handle.uri.trim_start_matches("file://");
        if let Err(e) = fs::remove_file(path) {
            crate::warn!("Failed to remove preview {}: {}", path, e);
        }
    }
}

/// In-memory previews, addressed by `memory://<id>` URIs.
#[derive(Default)]
pub struct MemoryPreviewStore {
    entries: Mutex<HashMap<u64, Bytes>>,
    next_id: AtomicU64,
    created: AtomicUsize,
    released: AtomicUsize,
}

impl MemoryPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: &PreviewHandle) -> Option<Bytes> {
        self.lock().get(&handle.id).cloned()
    }

    pub fn live(&self) -> usize {
        self.lock().len()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Bytes>> {
        // A panic elsewhere can't leave the map half-updated
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PreviewStore for MemoryPreviewStore {
    fn create(&self, bytes: &[u8], _mime: ImageMime) -> Result<PreviewHandle> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().insert(id, Bytes::copy_from_slice(bytes));
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(PreviewHandle::new(id, format!("memory://{}", id)))
    }

    fn release(&self, handle: PreviewHandle) {
        if self.lock().remove(&handle.id).is_some() {
            self.released.fetch_add(1, Ordering::SeqCst);
        } else {
            crate::warn!("Release of unknown preview {}", handle.uri);
        }
    }
}
