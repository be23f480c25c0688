use crate::constants::{BACKEND_URL_ENV, COMPRESS_PATH};
use crate::error::{Result, UploadError};

/// Where the compression service lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: Option<String>,
}

impl BackendConfig {
    /// Explicit value wins; blank strings count as unset.
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(BACKEND_URL_ENV).ok())
    }

    /// CLI override with environment fallback
    pub fn resolve(override_url: Option<String>) -> Self {
        let explicit = Self::new(override_url);
        if explicit.is_configured() {
            explicit
        } else {
            Self::from_env()
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Full URL of the compress endpoint, or `ConfigMissing`.
    pub fn compress_url(&self) -> Result<String> {
        let base = self.base_url.as_deref().ok_or(UploadError::ConfigMissing)?;
        Ok(format!("{}{}", base.trim_end_matches('/'), COMPRESS_PATH))
    }
}
