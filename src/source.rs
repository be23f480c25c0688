use crate::constants::{MAX_UPLOAD_SIZE, SNIFF_LEN};
use crate::error::Result;
use crate::formats::declared_mime_type;
use crate::validation::validate_declared;
use bytes::Bytes;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Name, declared type and on-disk size of a file, read without loading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHeader {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl SourceHeader {
    pub fn read(path: &Path) -> Result<Self> {
        let size = fs::metadata(path)?.len();
        let mut head = Vec::with_capacity(SNIFF_LEN as usize);
        File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;

        Ok(Self {
            name: file_name(path),
            mime_type: declared_mime_type(path, &head),
            size,
        })
    }
}

/// A file the user picked: bytes plus the name and MIME type it was declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk the way a file picker hands it over.
    ///
    /// Files over the upload limit are rejected from their metadata and never
    /// loaded; the type check still comes first.
    pub fn from_path(path: &Path) -> Result<Self> {
        let header = SourceHeader::read(path)?;
        if header.size > MAX_UPLOAD_SIZE {
            validate_declared(&header.mime_type, header.size)?;
        }

        let bytes = fs::read(path)?;
        Ok(Self::new(header.name, header.mime_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
