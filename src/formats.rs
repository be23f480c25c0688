/// Image type handling for the upload allow-list
///
/// Replaces string MIME comparisons with a small enum so the rest of the
/// crate can only ever hold an accepted type.
use crate::error::{Result, UploadError};
use image::ImageFormat;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Image types the compression service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMime {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl ImageMime {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Gif => "image/gif",
            ImageMime::WebP => "image/webp",
        }
    }

    /// Returns the canonical file extension for this type
    pub fn extension(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "jpg",
            ImageMime::Png => "png",
            ImageMime::Gif => "gif",
            ImageMime::WebP => "webp",
        }
    }

    pub fn all() -> [ImageMime; 4] {
        [ImageMime::Jpeg, ImageMime::Png, ImageMime::Gif, ImageMime::WebP]
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageMime::Jpeg),
            "png" => Some(ImageMime::Png),
            "gif" => Some(ImageMime::Gif),
            "webp" => Some(ImageMime::WebP),
            _ => None,
        }
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(ImageMime::Jpeg),
            ImageFormat::Png => Some(ImageMime::Png),
            ImageFormat::Gif => Some(ImageMime::Gif),
            ImageFormat::WebP => Some(ImageMime::WebP),
            _ => None,
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}

impl FromStr for ImageMime {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self> {
        // Parameters such as "; charset=binary" don't change the type
        let essence = s.split(';').next().unwrap_or_default().trim().to_lowercase();
        match essence.as_str() {
            "image/jpeg" => Ok(ImageMime::Jpeg),
            "image/png" => Ok(ImageMime::Png),
            "image/gif" => Ok(ImageMime::Gif),
            "image/webp" => Ok(ImageMime::WebP),
            _ => Err(UploadError::UnsupportedType(s.to_string())),
        }
    }
}

/// Works out the MIME type a file picker would declare for `path`.
///
/// The extension decides first, like a browser does. Files without a known
/// extension fall back to sniffing the leading bytes. Anything else is
/// reported as `application/octet-stream` so validation can reject it.
pub fn declared_mime_type(path: &Path, leading_bytes: &[u8]) -> String {
    let by_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageMime::from_extension);

    if let Some(mime) = by_extension {
        return mime.mime_type().to_string();
    }

    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        if let Some(known) = non_image_mime(ext) {
            return known.to_string();
        }
    }

    image::guess_format(leading_bytes)
        .ok()
        .and_then(ImageMime::from_image_format)
        .map(|mime| mime.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

fn non_image_mime(extension: &str) -> Option<&'static str> {
    match extension.to_lowercase().as_str() {
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "avif" => Some("image/avif"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
