#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use compress_quick::{
    BackendConfig, CompressionEndpoint, EndpointResponse, ImageMime, MemoryPreviewStore, Phase,
    PreviewHandle, PreviewStore, RecordingSink, SourceFile, UploadError, UploadWorkflow,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, oneshot};

pub const BACKEND: &str = "http://compress.test";

/// One prepared answer for the scripted endpoint
pub enum Reply {
    Respond(EndpointResponse),
    Unreachable,
    /// Waits until the test sends the response
    Gated(oneshot::Receiver<EndpointResponse>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub url: String,
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
}

/// Compression endpoint double that replays a script and records calls
#[derive(Default)]
pub struct ScriptedEndpoint {
    script: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedEndpoint {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompressionEndpoint for ScriptedEndpoint {
    async fn compress(&self, url: &str, file: &SourceFile) -> compress_quick::Result<EndpointResponse> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            file_name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size(),
        });

        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("endpoint called more often than scripted");

        match reply {
            Reply::Respond(response) => Ok(response),
            Reply::Unreachable => Err(UploadError::NetworkError(
                "Connection failed: connection refused".to_string(),
            )),
            Reply::Gated(rx) => rx
                .await
                .map_err(|_| UploadError::NetworkError("gate dropped".to_string())),
        }
    }
}

/// Preview store that refuses to create anything
#[derive(Default)]
pub struct BrokenPreviewStore;

impl PreviewStore for BrokenPreviewStore {
    fn create(&self, _bytes: &[u8], _mime: ImageMime) -> compress_quick::Result<PreviewHandle> {
        Err(UploadError::Preview("disk full".to_string()))
    }

    fn release(&self, _handle: PreviewHandle) {
        panic!("nothing was ever created");
    }
}

pub type TestWorkflow =
    UploadWorkflow<ScriptedEndpoint, Arc<MemoryPreviewStore>, Arc<RecordingSink>>;

pub struct Harness {
    pub workflow: TestWorkflow,
    pub previews: Arc<MemoryPreviewStore>,
    pub sink: Arc<RecordingSink>,
}

pub fn harness(replies: Vec<Reply>) -> Harness {
    harness_with_config(BackendConfig::new(Some(BACKEND.to_string())), replies)
}

pub fn harness_with_config(config: BackendConfig, replies: Vec<Reply>) -> Harness {
    let previews = Arc::new(MemoryPreviewStore::new());
    let sink = Arc::new(RecordingSink::new());
    let workflow = UploadWorkflow::new(
        config,
        ScriptedEndpoint::new(replies),
        Arc::clone(&previews),
        Arc::clone(&sink),
    );

    Harness {
        workflow,
        previews,
        sink,
    }
}

pub fn ok_image(size: usize, content_type: &str) -> EndpointResponse {
    EndpointResponse {
        status: 200,
        content_type: Some(content_type.to_string()),
        body: Bytes::from(vec![0xABu8; size]),
    }
}

pub fn error_response(status: u16, body: &str) -> EndpointResponse {
    EndpointResponse {
        status,
        content_type: Some("text/plain".to_string()),
        body: Bytes::from(body.to_string()),
    }
}

pub fn image_file(name: &str, mime: &str, size: usize) -> SourceFile {
    SourceFile::new(name, mime, vec![0x42u8; size])
}

/// Phase changes received so far, in order
pub fn drain_phases(phases: &mut broadcast::Receiver<Phase>) -> Vec<Phase> {
    let mut seen = Vec::new();
    while let Ok(phase) = phases.try_recv() {
        seen.push(phase);
    }
    seen
}
