use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server error: HTTP {status}: {body}")]
    Server { status: u16, body: String },

    #[error("file too large: {0}")]
    Oversize(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("{failed} of {total} uploads failed")]
    UploadsFailed { failed: usize, total: usize },

    #[error("delete failed: {0}")]
    DeleteFailed(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, DepotError>;
