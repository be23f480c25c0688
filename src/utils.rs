/// Utility functions for common operations
///
/// Size formatting and savings arithmetic shared by the workflow and the CLI.
use crate::constants::{
    COMPRESSED_PREVIEW_PREFIX, COMPRESSED_SIZE_PREFIX, ORIGINAL_PREVIEW_PREFIX,
    ORIGINAL_SIZE_PREFIX, PROGRESS_SPINNER_TEMPLATE, SAVINGS_PREFIX, SPINNER_TICK_MS,
};
use crate::session::SessionSnapshot;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a progress spinner with consistent styling
///
/// # Arguments
/// * `message` - Initial message to display
///
/// # Returns
/// * Configured `ProgressBar` instance, already ticking
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    pb
}

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Relative size reduction, rounded to one decimal place.
///
/// Zero unless both sizes are known; never negative, so a result that grew
/// reports 0.
pub fn savings_percent(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 || compressed_size == 0 {
        return 0.0;
    }
    let raw = 100.0 - (compressed_size as f64 / original_size as f64) * 100.0;
    (raw.max(0.0) * 10.0).round() / 10.0
}

/// Print before/after sizes with formatted output
pub fn print_compression_result(original_size: u64, compressed_size: u64) {
    let savings = savings_percent(original_size, compressed_size);

    crate::info!(
        "{} {} ({})",
        ORIGINAL_SIZE_PREFIX,
        original_size,
        format_file_size(original_size)
    );
    crate::info!(
        "{} {} ({})",
        COMPRESSED_SIZE_PREFIX,
        compressed_size,
        format_file_size(compressed_size)
    );
    crate::info!("{} {:.1}%", SAVINGS_PREFIX, savings);

    if savings == 0.0 && compressed_size >= original_size {
        crate::warn!("The compressed file is not smaller than the original");
    }
}

/// Where the before/after previews can be opened while the session lives
pub fn print_preview_locations(snapshot: &SessionSnapshot) {
    if let Some(uri) = &snapshot.source_preview_uri {
        crate::info!("{} {}", ORIGINAL_PREVIEW_PREFIX, uri);
    }
    if let Some(uri) = &snapshot.result_preview_uri {
        crate::info!("{} {}", COMPRESSED_PREVIEW_PREFIX, uri);
    }
}
