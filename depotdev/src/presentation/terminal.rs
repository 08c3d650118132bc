use std::collections::HashMap;
use std::io::{BufRead, Write};

use depot_core::domain::TaskId;
use depot_core::listing::FileListing;
use depot_core::upload::UploadTask;
use depot_core::view::SessionView;
use parking_lot::Mutex;
use tracing::debug;

/// Line-oriented view: one line per visible change of an upload row.
pub struct TerminalView {
    assume_yes: bool,
    show_listing: bool,
    last_label: Mutex<HashMap<TaskId, String>>,
}

impl TerminalView {
    pub fn new(assume_yes: bool, show_listing: bool) -> Self {
        Self {
            assume_yes,
            show_listing,
            last_label: Mutex::new(HashMap::new()),
        }
    }

    fn line(task: &UploadTask) -> String {
        let speed = task.speed_label();
        if speed.is_empty() {
            format!("{}  {}", task.title(), task.status_label())
        } else {
            format!("{}  {}  {}", task.title(), task.status_label(), speed)
        }
    }
}

impl SessionView for TerminalView {
    fn task_added(&self, task: &UploadTask) {
        self.last_label
            .lock()
            .insert(task.id(), task.status_label().to_string());
        eprintln!("{}", Self::line(task));
    }

    fn task_updated(&self, task: &UploadTask) {
        let mut last = self.last_label.lock();
        if last.get(&task.id()).map(String::as_str) == Some(task.status_label()) {
            return;
        }
        last.insert(task.id(), task.status_label().to_string());
        eprintln!("{}", Self::line(task));
    }

    fn task_fading(&self, _id: TaskId) {}

    fn task_removed(&self, id: TaskId) {
        self.last_label.lock().remove(&id);
        debug!(task = %id, "upload row dismissed");
    }

    fn listing_changed(&self, listing: &FileListing) {
        if !self.show_listing || listing.is_empty() {
            return;
        }
        let mut out = std::io::stdout().lock();
        for row in listing.rows() {
            let _ = writeln!(out, "{}", row.label());
        }
    }

    fn alert(&self, message: &str) {
        eprintln!("error: {message}");
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{message} [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
