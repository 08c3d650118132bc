// depot_core/src/store.rs
use reqwest::Url;

use crate::domain::{DeleteResponse, LocalFile, UploadResponse};
use crate::error::Result;
use crate::progress::ProgressSender;

/// The remote file store the session talks to.
///
/// Implementations report HTTP answers as values; only transport-level
/// failures come back as `Err`.
#[allow(async_fn_in_trait)]
pub trait FileStore {
    /// URL of the directory listing page; listing links resolve against it.
    fn listing_url(&self) -> &Url;

    async fn upload(&self, file: &LocalFile, progress: ProgressSender) -> Result<UploadResponse>;

    async fn delete(&self, name: &str) -> Result<DeleteResponse>;

    async fn fetch_listing(&self) -> Result<String>;

    /// `Ok(None)` when the store answers without a usable length.
    async fn probe_size(&self, name: &str) -> Result<Option<u64>>;
}
