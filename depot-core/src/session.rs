use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

use crate::config::SessionTiming;
use crate::domain::{FileSize, LocalFile, RemoteFileEntry, TaskId, UploadStatus};
use crate::error::Result;
use crate::listing::{FileListing, file_links};
use crate::progress::progress_channel;
use crate::store::FileStore;
use crate::upload::{UploadOutcome, UploadTask};
use crate::view::SessionView;

/// Final state of one upload, as returned to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadReport {
    pub id: TaskId,
    pub name: String,
    pub status: UploadStatus,
    pub detail: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation; nothing was sent.
    Cancelled,
    /// The row was kept; `detail` is what the user was shown.
    Failed { detail: String },
}

/// Upload controller plus listing synchronizer over one store and one view.
pub struct UploadSession<S, V> {
    store: S,
    view: V,
    timing: SessionTiming,
    listing: Mutex<FileListing>,
    next_id: AtomicU64,
}

impl<S: FileStore, V: SessionView> UploadSession<S, V> {
    pub fn new(store: S, view: V, timing: SessionTiming) -> Self {
        Self {
            store,
            view,
            timing,
            listing: Mutex::new(FileListing::default()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn listing(&self) -> FileListing {
        self.listing.lock().clone()
    }

    /// Starts every upload at once and waits for all of them, including the
    /// dismissal of completed rows.
    pub async fn upload_files(&self, files: Vec<LocalFile>) -> Vec<UploadReport> {
        join_all(files.into_iter().map(|f| self.upload_one(f))).await
    }

    async fn upload_one(&self, file: LocalFile) -> UploadReport {
        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut task = UploadTask::new(id, &file, Instant::now(), self.timing.speed_sample);
        self.view.task_added(&task);

        let (tx, mut rx) = progress_channel();
        let send = self.store.upload(&file, tx);
        tokio::pin!(send);
        let result = loop {
            tokio::select! {
                res = &mut send => break res,
                Some(event) = rx.recv() => {
                    if task.on_progress(event, Instant::now()) {
                        self.view.task_updated(&task);
                    }
                }
            }
        };
        while let Ok(event) = rx.try_recv() {
            if task.on_progress(event, Instant::now()) {
                self.view.task_updated(&task);
            }
        }

        let outcome = match result {
            Ok(resp) => UploadOutcome::from_response(&resp),
            Err(e) => UploadOutcome::Failed {
                reason: e.to_string(),
            },
        };
        task.finish(&outcome);
        self.view.task_updated(&task);

        let detail = match &outcome {
            UploadOutcome::Complete => {
                info!(task = %id, name = %file.name, "upload complete");
                // the dismissal clock starts at completion, not after the refresh
                tokio::join!(
                    async {
                        if let Err(e) = self.refresh().await {
                            debug!("refresh after upload failed: {e}");
                        }
                    },
                    async {
                        sleep(self.timing.dismiss_after).await;
                        self.view.task_fading(id);
                        sleep(self.timing.fade).await;
                        self.view.task_removed(id);
                    }
                );
                None
            }
            UploadOutcome::TooLarge { detail } => {
                error!(task = %id, name = %file.name, "upload failed: file too large");
                self.view.alert(detail);
                Some(detail.clone())
            }
            UploadOutcome::Failed { reason } => {
                error!(task = %id, name = %file.name, "upload failed: {reason}");
                Some(reason.clone())
            }
        };

        UploadReport {
            id,
            name: file.name.clone(),
            status: task.status(),
            detail,
        }
    }

    /// Clears the list, then rebuilds it from the store's listing page.
    /// Returns the number of file rows.
    pub async fn refresh(&self) -> Result<usize> {
        {
            let mut listing = self.listing.lock();
            listing.clear();
            self.view.listing_changed(&listing);
        }

        let html = match self.store.fetch_listing().await {
            Ok(html) => html,
            Err(e) => {
                error!("error fetching files: {e}");
                return Err(e);
            }
        };
        let links = file_links(&html, self.store.listing_url());
        let probes = links.iter().map(|link| async move {
            let size = match self.store.probe_size(&link.text).await {
                Ok(Some(n)) => FileSize::Known(n),
                Ok(None) => FileSize::Unknown,
                Err(e) => {
                    debug!(name = %link.text, "size probe failed: {e}");
                    FileSize::Unknown
                }
            };
            RemoteFileEntry {
                name: link.text.clone(),
                size,
                url: link.url.clone(),
            }
        });
        let entries = join_all(probes).await;
        let count = entries.len();

        let mut listing = self.listing.lock();
        *listing = FileListing::from_entries(entries);
        self.view.listing_changed(&listing);
        Ok(count)
    }

    /// Confirmed delete of one listed file; on success only that row goes away.
    pub async fn delete(&self, name: &str) -> DeleteOutcome {
        if !self
            .view
            .confirm(&format!("Are you sure you want to delete {name}?"))
        {
            return DeleteOutcome::Cancelled;
        }
        info!("attempting to delete file: {name}");

        match self.store.delete(name).await {
            Ok(resp) if resp.is_success() => {
                info!("file deleted successfully: {name}");
                let mut listing = self.listing.lock();
                listing.remove(name);
                self.view.listing_changed(&listing);
                DeleteOutcome::Deleted
            }
            Ok(resp) => {
                let text = resp.body.trim();
                error!(status = resp.status, "delete failed: {text}");
                let detail = format!("Failed to delete file: {text}");
                self.view.alert(&detail);
                DeleteOutcome::Failed { detail }
            }
            Err(e) => {
                warn!("error deleting file: {e}");
                let detail = "Error deleting file".to_string();
                self.view.alert(&detail);
                DeleteOutcome::Failed { detail }
            }
        }
    }
}
