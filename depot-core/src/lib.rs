#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod error;
pub mod format;
pub mod input;
pub mod listing;
pub mod progress;
pub mod session;
pub mod store;
pub mod store_http;
pub mod upload;
pub mod view;

// Re-exports: stable API surface
pub use config::{ClientConfig, SessionTiming};
pub use format::{format_bytes_compact, format_file_size};
pub use session::{DeleteOutcome, UploadReport, UploadSession};
pub use store::FileStore;
pub use store_http::HttpFileStore;
pub use view::{MemoryView, SessionView};
