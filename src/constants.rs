/// Largest file accepted for upload (10 MiB)
pub const MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Bytes read from the head of a file to sniff its type
pub const SNIFF_LEN: u64 = 64;

/// Largest compressed body accepted back from the service
pub const MAX_RESPONSE_SIZE: u64 = 4 * MAX_UPLOAD_SIZE;

pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

pub const COMPRESS_PATH: &str = "/compress";
pub const IMAGE_FIELD_NAME: &str = "image";

pub const BACKEND_URL_ENV: &str = "COMPRESS_QUICK_BACKEND_URL";

pub const DOWNLOAD_PREFIX: &str = "compressed-";
pub const FALLBACK_BASE_NAME: &str = "image";

/// Phase changes buffered per subscriber
pub const PHASE_CHANNEL_CAPACITY: usize = 16;

/// Marker the compression service puts in its body when it rejects an upload by size
pub const SIZE_LIMIT_MARKER: &str = "file size limit exceeded";

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
pub const SPINNER_TICK_MS: u64 = 100;

// Common output message prefixes
pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const SAVINGS_PREFIX: &str = "🎯 Savings:";
pub const ORIGINAL_PREVIEW_PREFIX: &str = "🖼️  Original preview:";
pub const COMPRESSED_PREVIEW_PREFIX: &str = "🖼️  Compressed preview:";
pub const SUCCESS_PREFIX: &str = "✅";
