use crate::error::{Result, UploadError};
use crate::source::SourceHeader;
use crate::utils::format_file_size;
use crate::validation::validate_declared;
use image::ImageReader;
use std::path::Path;

/// What a local pre-flight check found out about a file.
#[derive(Debug)]
pub struct SourceReport {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub dimensions: Option<(u32, u32)>,
    pub verdict: Result<()>,
}

impl SourceReport {
    pub fn is_acceptable(&self) -> bool {
        self.verdict.is_ok()
    }
}

/// Validates a file without touching the network or loading it whole.
pub fn inspect_source(input_path: &Path) -> Result<SourceReport> {
    let header = SourceHeader::read(input_path)?;
    let verdict = validate_declared(&header.mime_type, header.size).map(|_| ());

    Ok(SourceReport {
        dimensions: read_dimensions(input_path),
        name: header.name,
        mime_type: header.mime_type,
        size: header.size,
        verdict,
    })
}

/// Decodes only the image header
fn read_dimensions(path: &Path) -> Option<(u32, u32)> {
    ImageReader::open(path)
        .ok()?
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

pub fn print_source_report(report: &SourceReport) {
    crate::info!("📋 File: {}", report.name);
    crate::info!("  🎭 Declared type: {}", report.mime_type);
    crate::info!(
        "  📦 File size: {} bytes ({})",
        report.size,
        format_file_size(report.size)
    );
    match report.dimensions {
        Some((width, height)) => {
            crate::info!("  📏 Dimensions: {}x{} pixels", width, height);
        }
        None => {
            crate::info!("  📏 Dimensions: unknown");
        }
    }

    match &report.verdict {
        Ok(()) => {
            crate::success!("Ready to upload");
        }
        Err(e @ (UploadError::UnsupportedType(_) | UploadError::FileTooLarge(..))) => {
            crate::error!("{}", e.user_message());
        }
        Err(e) => {
            crate::error!("{}", e);
        }
    }
}
