use crate::constants::{IMAGE_FIELD_NAME, MAX_RESPONSE_SIZE};
use crate::error::{Result, UploadError};
use crate::source::SourceFile;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{multipart, Client, Response};
use std::time::Duration;

/// What came back from the compression service, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl EndpointResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text for error reporting; invalid UTF-8 is replaced, not rejected.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The external compression service.
///
/// Implementations return `Err(UploadError::NetworkError)` only when no
/// response was received; any HTTP status comes back as `Ok`.
#[async_trait]
pub trait CompressionEndpoint: Send + Sync {
    async fn compress(&self, url: &str, file: &SourceFile) -> Result<EndpointResponse>;
}

pub struct HttpEndpoint {
    client: Client,
    max_response_size: u64,
}

impl HttpEndpoint {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            max_response_size: MAX_RESPONSE_SIZE,
        }
    }

    /// Client with an overall request deadline
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// Caps how much of a response body is buffered
    pub fn with_max_response_size(mut self, limit: u64) -> Self {
        self.max_response_size = limit;
        self
    }
}

impl Default for HttpEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompressionEndpoint for HttpEndpoint {
    async fn compress(&self, url: &str, file: &SourceFile) -> Result<EndpointResponse> {
        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| UploadError::UnsupportedType(format!("{} ({})", file.mime_type, e)))?;
        let form = multipart::Form::new().part(IMAGE_FIELD_NAME, part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = if response.status().is_success() {
            read_body(response, self.max_response_size).await?
        } else {
            // Error bodies are best-effort
            read_body(response, self.max_response_size)
                .await
                .unwrap_or_default()
        };

        Ok(EndpointResponse {
            status,
            content_type,
            body,
        })
    }
}

async fn read_body(mut response: Response, limit: u64) -> Result<Bytes> {
    let status = response.status().as_u16();
    let too_large = || UploadError::ServerError {
        status,
        body: format!("Response body exceeds {} bytes", limit),
    };

    if response.content_length().is_some_and(|len| len > limit) {
        return Err(too_large());
    }

    let mut body = BytesMut::new();
    while let Some(chunk) = response.chunk().await.map_err(classify_transport_error)? {
        if (body.len() + chunk.len()) as u64 > limit {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}

fn classify_transport_error(error: reqwest::Error) -> UploadError {
    if error.is_timeout() {
        UploadError::NetworkError("Request timeout".to_string())
    } else if error.is_connect() {
        UploadError::NetworkError(format!("Connection failed: {}", error))
    } else {
        UploadError::NetworkError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_response_is_success() {
        let ok = EndpointResponse {
            status: 204,
            content_type: None,
            body: Bytes::new(),
        };
        assert!(ok.is_success());

        let err = EndpointResponse {
            status: 500,
            content_type: Some("text/plain".to_string()),
            body: Bytes::from_static(b"internal error"),
        };
        assert!(!err.is_success());
        assert_eq!(err.body_text(), "internal error");
    }

    #[test]
    fn test_body_text_is_lossy() {
        let response = EndpointResponse {
            status: 400,
            content_type: None,
            body: Bytes::from_static(&[b'b', b'a', b'd', 0xFF]),
        };
        assert!(response.body_text().starts_with("bad"));
    }
}
