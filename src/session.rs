use crate::delivery::Download;
use crate::error::Result;
use crate::formats::ImageMime;
use crate::preview::{PreviewHandle, PreviewStore};
use crate::source::SourceFile;
use crate::utils::savings_percent;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Uploading,
    Succeeded,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Validating => "validating",
            Phase::Uploading => "uploading",
            Phase::Succeeded => "succeeded",
            Phase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// One file's journey from pick to download.
///
/// Holds at most one source preview and one result preview. Every mutation
/// that drops a handle hands it back to the store it came from.
#[derive(Debug, Default)]
pub struct UploadSession {
    source_name: Option<String>,
    source_preview: Option<PreviewHandle>,
    source_size: u64,
    result_preview: Option<PreviewHandle>,
    result_size: u64,
    download: Option<Download>,
    phase: Phase,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn source_size(&self) -> u64 {
        self.source_size
    }

    pub fn result_size(&self) -> u64 {
        self.result_size
    }

    pub fn source_preview(&self) -> Option<&PreviewHandle> {
        self.source_preview.as_ref()
    }

    pub fn result_preview(&self) -> Option<&PreviewHandle> {
        self.result_preview.as_ref()
    }

    pub fn download(&self) -> Option<&Download> {
        self.download.as_ref()
    }

    pub fn savings_percent(&self) -> f64 {
        savings_percent(self.source_size, self.result_size)
    }

    /// Swaps in a new source file and moves to `Uploading`.
    ///
    /// Previous handles are released first. If the new preview can't be
    /// created the session is left empty at `Idle`.
    pub fn stage(&mut self, store: &dyn PreviewStore, file: &SourceFile, mime: ImageMime) -> Result<()> {
        self.release_all(store);

        let handle = store.create(&file.bytes, mime)?;
        self.source_name = Some(file.name.clone());
        self.source_preview = Some(handle);
        self.source_size = file.size();
        self.phase = Phase::Uploading;
        Ok(())
    }

    /// Records the compressed result and moves to `Succeeded`.
    pub fn succeed(&mut self, store: &dyn PreviewStore, download: Download, mime: ImageMime) -> Result<()> {
        release_slot(store, &mut self.result_preview);

        let handle = store.create(&download.bytes, mime)?;
        self.result_preview = Some(handle);
        self.result_size = download.bytes.len() as u64;
        self.download = Some(download);
        self.phase = Phase::Succeeded;
        Ok(())
    }

    pub fn mark_failed(&mut self) {
        self.phase = Phase::Failed;
    }

    /// Back to the pre-upload state: nothing held, nothing sized.
    pub fn release_all(&mut self, store: &dyn PreviewStore) {
        release_slot(store, &mut self.source_preview);
        release_slot(store, &mut self.result_preview);
        self.source_name = None;
        self.source_size = 0;
        self.result_size = 0;
        self.download = None;
        self.phase = Phase::Idle;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            source_name: self.source_name.clone(),
            source_size: self.source_size,
            result_size: self.result_size,
            source_preview_uri: self.source_preview.as_ref().map(|h| h.uri().to_string()),
            result_preview_uri: self.result_preview.as_ref().map(|h| h.uri().to_string()),
            savings_percent: self.savings_percent(),
        }
    }
}

fn release_slot(store: &dyn PreviewStore, slot: &mut Option<PreviewHandle>) {
    if let Some(handle) = slot.take() {
        store.release(handle);
    }
}

/// Read-only copy of the session for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub source_name: Option<String>,
    pub source_size: u64,
    pub result_size: u64,
    pub source_preview_uri: Option<String>,
    pub result_preview_uri: Option<String>,
    pub savings_percent: f64,
}
