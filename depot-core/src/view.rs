use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::domain::{TaskId, UploadStatus};
use crate::listing::FileListing;
use crate::upload::UploadTask;

/// Presentation side of a session: upload rows, the file list, and user prompts.
pub trait SessionView {
    fn task_added(&self, task: &UploadTask);

    fn task_updated(&self, task: &UploadTask);

    /// The row starts fading out; `task_removed` follows once the fade ends.
    fn task_fading(&self, id: TaskId);

    fn task_removed(&self, id: TaskId);

    fn listing_changed(&self, listing: &FileListing);

    /// Blocking notification.
    fn alert(&self, message: &str);

    fn confirm(&self, message: &str) -> bool;
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaskRow {
    pub title: String,
    pub status: UploadStatus,
    pub percent: f64,
    pub status_label: String,
    pub speed_label: String,
    pub fading: bool,
}

impl From<&UploadTask> for TaskRow {
    fn from(t: &UploadTask) -> Self {
        Self {
            title: t.title(),
            status: t.status(),
            percent: t.percent(),
            status_label: t.status_label().to_string(),
            speed_label: t.speed_label().to_string(),
            fading: false,
        }
    }
}

#[derive(Default)]
struct MemoryState {
    tasks: BTreeMap<TaskId, TaskRow>,
    history: Vec<(TaskId, TaskRow)>,
    listing: FileListing,
    listing_renders: usize,
    alerts: Vec<String>,
    prompts: Vec<String>,
}

/// A view that keeps everything in memory, for embedding and tests.
pub struct MemoryView {
    answer: bool,
    state: Mutex<MemoryState>,
}

impl MemoryView {
    /// `answer` is returned from every `confirm`.
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            state: Mutex::new(MemoryState::default()),
        }
    }

    pub fn visible_tasks(&self) -> BTreeMap<TaskId, TaskRow> {
        self.state.lock().tasks.clone()
    }

    /// Every state a task row went through, in order.
    pub fn history(&self, id: TaskId) -> Vec<TaskRow> {
        self.state
            .lock()
            .history
            .iter()
            .filter(|(i, _)| *i == id)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn listing(&self) -> FileListing {
        self.state.lock().listing.clone()
    }

    pub fn listing_renders(&self) -> usize {
        self.state.lock().listing_renders
    }

    pub fn alerts(&self) -> Vec<String> {
        self.state.lock().alerts.clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.state.lock().prompts.clone()
    }

    fn put(&self, task: &UploadTask) {
        let row = TaskRow::from(task);
        let mut st = self.state.lock();
        st.history.push((task.id(), row.clone()));
        st.tasks.insert(task.id(), row);
    }
}

impl SessionView for MemoryView {
    fn task_added(&self, task: &UploadTask) {
        self.put(task);
    }

    fn task_updated(&self, task: &UploadTask) {
        self.put(task);
    }

    fn task_fading(&self, id: TaskId) {
        if let Some(row) = self.state.lock().tasks.get_mut(&id) {
            row.fading = true;
        }
    }

    fn task_removed(&self, id: TaskId) {
        self.state.lock().tasks.remove(&id);
    }

    fn listing_changed(&self, listing: &FileListing) {
        let mut st = self.state.lock();
        st.listing = listing.clone();
        st.listing_renders += 1;
    }

    fn alert(&self, message: &str) {
        self.state.lock().alerts.push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.state.lock().prompts.push(message.to_string());
        self.answer
    }
}
