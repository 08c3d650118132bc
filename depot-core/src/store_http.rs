use std::path::Path;

use futures_util::StreamExt;
use futures_util::stream;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Url, redirect};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use crate::config::ClientConfig;
use crate::domain::{DeleteResponse, LocalFile, UploadResponse};
use crate::error::{DepotError, Result};
use crate::progress::{ProgressSender, TransferProgress};
use crate::store::FileStore;

const READ_CHUNK: usize = 64 * 1024;

pub struct HttpFileStore {
    client: Client,
    upload_url: Url,
    delete_url: Url,
    listing_url: Url,
}

impl HttpFileStore {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        // a 303 after upload counts as success, so it must not be followed
        let client = Client::builder().redirect(redirect::Policy::none()).build()?;
        Ok(Self {
            client,
            upload_url: cfg.endpoint(&cfg.upload_path)?,
            delete_url: cfg.endpoint(&cfg.delete_path)?,
            listing_url: cfg.endpoint(&cfg.listing_path)?,
        })
    }

    pub fn file_url(&self, name: &str) -> Result<Url> {
        self.listing_url
            .join(&urlencoding::encode(name))
            .map_err(|e| DepotError::Parse(format!("file URL for {name}: {e}")))
    }

    /// Streams a stored file to `out`. Returns the number of bytes written.
    pub async fn download(&self, name: &str, out: &Path) -> Result<u64> {
        let resp = self.client.get(self.file_url(name)?).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DepotError::Server {
                status: status.as_u16(),
                body,
            });
        }
        let mut file = File::create(out).await?;
        let mut body = resp.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

// File contents as a body stream that reports every chunk handed to the transport.
fn progress_body(file: File, total: u64, progress: ProgressSender) -> Body {
    let chunks = stream::unfold((file, progress, 0u64), move |(mut file, tx, sent)| async move {
        let mut buf = vec![0u8; READ_CHUNK];
        match file.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                let sent = sent + n as u64;
                let _ = tx.send(TransferProgress {
                    loaded: sent,
                    total: Some(total),
                });
                Some((Ok::<_, std::io::Error>(buf), (file, tx, sent)))
            }
            Err(e) => Some((Err(e), (file, tx, sent))),
        }
    });
    Body::wrap_stream(chunks)
}

impl FileStore for HttpFileStore {
    fn listing_url(&self) -> &Url {
        &self.listing_url
    }

    async fn upload(&self, file: &LocalFile, progress: ProgressSender) -> Result<UploadResponse> {
        let handle = File::open(&file.path).await?;
        let part = Part::stream_with_length(progress_body(handle, file.size, progress), file.size)
            .file_name(file.name.clone())
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("file", part);
        let resp = self
            .client
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await?;
        let status = resp.status().as_u16();
        // an unreadable body is reported as empty
        let body = resp.text().await.unwrap_or_default();
        Ok(UploadResponse { status, body })
    }

    async fn delete(&self, name: &str) -> Result<DeleteResponse> {
        let resp = self
            .client
            .post(self.delete_url.clone())
            .form(&[("filename", name)])
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Ok(DeleteResponse { status, body })
    }

    async fn fetch_listing(&self) -> Result<String> {
        let resp = self.client.get(self.listing_url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DepotError::Server {
                status: status.as_u16(),
                body,
            });
        }
        if let Some(ct) = resp.headers().get(CONTENT_TYPE) {
            let ct = ct.to_str().unwrap_or_default();
            if !ct.starts_with("text/html") {
                return Err(DepotError::Parse(format!("listing is not HTML: {ct}")));
            }
        }
        Ok(resp.text().await?)
    }

    async fn probe_size(&self, name: &str) -> Result<Option<u64>> {
        let resp = self.client.head(self.file_url(name)?).send().await?;
        if !resp.status().is_success() {
            debug!(name, status = resp.status().as_u16(), "size probe rejected");
            return Ok(None);
        }
        let size = resp
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        Ok(size)
    }
}
