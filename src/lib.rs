pub mod cli;
pub mod config;
pub mod constants;
pub mod delivery;
pub mod error;
pub mod formats;
pub mod info;
pub mod logger;
pub mod preview;
pub mod session;
pub mod source;
pub mod transport;
pub mod utils;
pub mod validation;
pub mod workflow;

pub use config::BackendConfig;
pub use delivery::{download_file_name, DirectorySink, Download, DownloadSink, RecordingSink};
pub use error::{Result, UploadError};
pub use formats::ImageMime;
pub use info::{inspect_source, print_source_report, SourceReport};
pub use preview::{MemoryPreviewStore, PreviewHandle, PreviewStore, TempFilePreviewStore};
pub use session::{Phase, SessionSnapshot, UploadSession};
pub use source::{SourceFile, SourceHeader};
pub use transport::{CompressionEndpoint, EndpointResponse, HttpEndpoint};
pub use utils::{format_file_size, savings_percent};
pub use validation::{validate_declared, validate_source};
pub use workflow::{CompressionOutcome, UploadWorkflow};
