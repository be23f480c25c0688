use crate::config::BackendConfig;
use crate::constants::PHASE_CHANNEL_CAPACITY;
use crate::delivery::{download_file_name, Download, DownloadSink};
use crate::error::{Result, UploadError};
use crate::formats::ImageMime;
use crate::preview::PreviewStore;
use crate::session::{Phase, SessionSnapshot, UploadSession};
use crate::source::SourceFile;
use crate::transport::{CompressionEndpoint, EndpointResponse};
use crate::validation::{is_size_limit_rejection, validate_source};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;

/// What a successful submit produced
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionOutcome {
    pub download_file_name: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub savings_percent: f64,
    /// False when the download sink failed; the result is still held for `redownload`
    pub delivered: bool,
}

/// Drives one file at a time through validate → upload → result → download.
///
/// The session lock is never held across the network call. Each staging
/// bumps a generation counter; a response that comes back after a newer
/// `submit`, `cancel` or `reset` is stale and is dropped with
/// [`UploadError::Superseded`].
pub struct UploadWorkflow<E: CompressionEndpoint, P: PreviewStore, D: DownloadSink> {
    config: BackendConfig,
    endpoint: E,
    previews: P,
    sink: D,
    session: Mutex<UploadSession>,
    generation: AtomicU64,
    phase_tx: broadcast::Sender<Phase>,
}

impl<E: CompressionEndpoint, P: PreviewStore, D: DownloadSink> UploadWorkflow<E, P, D> {
    pub fn new(config: BackendConfig, endpoint: E, previews: P, sink: D) -> Self {
        let (phase_tx, _) = broadcast::channel(PHASE_CHANNEL_CAPACITY);
        Self {
            config,
            endpoint,
            previews,
            sink,
            session: Mutex::new(UploadSession::new()),
            generation: AtomicU64::new(0),
            phase_tx,
        }
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Every phase change from now on, including the transient ones.
    pub fn subscribe(&self) -> broadcast::Receiver<Phase> {
        self.phase_tx.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.lock_session().phase()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock_session().snapshot()
    }

    pub fn savings_percent(&self) -> f64 {
        self.lock_session().savings_percent()
    }

    /// Uploads `file` for compression and delivers the result.
    ///
    /// Validation and configuration errors are returned before anything is
    /// allocated or sent. Failures after staging roll the session back to
    /// `Idle` with every preview released.
    pub async fn submit(&self, file: SourceFile) -> Result<CompressionOutcome> {
        let (generation, url, mime) = self.begin(&file)?;

        crate::verbose!("POST {} ({} bytes, {})", url, file.size(), file.mime_type);
        let response = self.endpoint.compress(&url, &file).await;

        self.finish(generation, &file, mime, response)
    }

    /// Hands the held result to the sink again. No network, no state change.
    pub fn redownload(&self) -> Result<Download> {
        let download = self
            .lock_session()
            .download()
            .cloned()
            .ok_or(UploadError::NoResult)?;

        self.sink.deliver(&download)?;
        Ok(download)
    }

    /// Abandons an in-flight upload. Returns whether there was one.
    pub fn cancel(&self) -> bool {
        let mut session = self.lock_session();
        if session.phase() != Phase::Uploading {
            return false;
        }

        self.generation.fetch_add(1, Ordering::SeqCst);
        crate::verbose!("Upload cancelled");
        session.release_all(&self.previews);
        self.publish(Phase::Idle);
        true
    }

    /// Ends the session: releases every preview and returns to `Idle`.
    pub fn reset(&self) {
        let mut session = self.lock_session();
        self.generation.fetch_add(1, Ordering::SeqCst);
        session.release_all(&self.previews);
        self.publish(Phase::Idle);
    }

    fn begin(&self, file: &SourceFile) -> Result<(u64, String, ImageMime)> {
        let mut session = self.lock_session();
        let resting = session.phase();
        self.publish(Phase::Validating);

        let checked = validate_source(file)
            .and_then(|mime| self.config.compress_url().map(|url| (mime, url)));
        let (mime, url) = match checked {
            Ok(checked) => checked,
            Err(e) => {
                crate::warn!("Rejected {}: {}", file.name, e);
                self.publish(resting);
                return Err(e);
            }
        };

        // Any request still in flight is stale from here on
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Err(e) = session.stage(&self.previews, file, mime) {
            self.publish(Phase::Idle);
            return Err(e);
        }

        self.publish(Phase::Uploading);
        Ok((generation, url, mime))
    }

    fn finish(
        &self,
        generation: u64,
        file: &SourceFile,
        mime: ImageMime,
        response: Result<EndpointResponse>,
    ) -> Result<CompressionOutcome> {
        let mut session = self.lock_session();
        if self.generation.load(Ordering::SeqCst) != generation {
            crate::verbose!("Discarding stale response for {}", file.name);
            return Err(UploadError::Superseded);
        }

        let response = match response.and_then(interpret_response) {
            Ok(response) => response,
            Err(e) => return Err(self.fail(&mut session, e)),
        };

        let result_mime = result_mime(&response, mime);
        let download = Download {
            file_name: download_file_name(&file.name),
            bytes: response.body,
        };
        if let Err(e) = session.succeed(&self.previews, download.clone(), result_mime) {
            return Err(self.fail(&mut session, e));
        }
        self.publish(Phase::Succeeded);

        let outcome = CompressionOutcome {
            download_file_name: download.file_name.clone(),
            original_size: session.source_size(),
            compressed_size: session.result_size(),
            savings_percent: session.savings_percent(),
            delivered: false,
        };
        drop(session);

        let delivered = match self.sink.deliver(&download) {
            Ok(()) => true,
            Err(e) => {
                crate::warn!("Download of {} failed: {}", download.file_name, e);
                false
            }
        };

        Ok(CompressionOutcome { delivered, ..outcome })
    }

    fn fail(&self, session: &mut UploadSession, error: UploadError) -> UploadError {
        session.mark_failed();
        self.publish(Phase::Failed);
        crate::verbose!("Rolling back: {}", error);

        session.release_all(&self.previews);
        self.publish(Phase::Idle);
        error
    }

    fn publish(&self, phase: Phase) {
        crate::verbose!("Phase: {}", phase);
        // Nobody listening is fine
        let _ = self.phase_tx.send(phase);
    }

    fn lock_session(&self) -> MutexGuard<'_, UploadSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<E: CompressionEndpoint, P: PreviewStore, D: DownloadSink> Drop for UploadWorkflow<E, P, D> {
    fn drop(&mut self) {
        let session = match self.session.get_mut() {
            Ok(session) => session,
            Err(poisoned) => poisoned.into_inner(),
        };
        session.release_all(&self.previews);
    }
}

/// Turns a raw response into the compressed body, or the error it stands for.
fn interpret_response(response: EndpointResponse) -> Result<EndpointResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let body = response.body_text();
    if is_size_limit_rejection(response.status, &body) {
        return Err(UploadError::server_size_limit());
    }

    Err(UploadError::ServerError {
        status: response.status,
        body,
    })
}

fn result_mime(response: &EndpointResponse, fallback: ImageMime) -> ImageMime {
    match response.content_type.as_deref() {
        Some(content_type) => ImageMime::from_str(content_type).unwrap_or_else(|_| {
            crate::warn!(
                "Unexpected content type {} from compression service, assuming {}",
                content_type,
                fallback
            );
            fallback
        }),
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn response(status: u16, body: &'static [u8]) -> EndpointResponse {
        EndpointResponse {
            status,
            content_type: None,
            body: Bytes::from_static(body),
        }
    }

    #[test]
    fn test_interpret_success_passes_body_through() {
        let ok = interpret_response(response(200, b"compressed")).unwrap();
        assert_eq!(ok.body, Bytes::from_static(b"compressed"));
    }

    #[test]
    fn test_interpret_server_error() {
        let err = interpret_response(response(500, b"internal error")).unwrap_err();
        assert!(matches!(
            err,
            UploadError::ServerError { status: 500, ref body } if body == "internal error"
        ));
    }

    #[test]
    fn test_interpret_size_limit_as_file_too_large() {
        let err = interpret_response(response(400, b"File size limit exceeded")).unwrap_err();
        assert!(matches!(err, UploadError::FileTooLarge(_, _)));

        let err = interpret_response(response(413, b"")).unwrap_err();
        assert!(matches!(err, UploadError::FileTooLarge(_, _)));
    }

    #[test]
    fn test_result_mime_follows_content_type() {
        let mut webp = response(200, b"");
        webp.content_type = Some("image/webp".to_string());
        assert_eq!(result_mime(&webp, ImageMime::Png), ImageMime::WebP);

        let mut octets = response(200, b"");
        octets.content_type = Some("application/octet-stream".to_string());
        assert_eq!(result_mime(&octets, ImageMime::Png), ImageMime::Png);

        assert_eq!(result_mime(&response(200, b""), ImageMime::Gif), ImageMime::Gif);
    }
}
