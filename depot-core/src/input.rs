use std::io::BufRead;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::domain::LocalFile;
use crate::error::{DepotError, Result};

pub fn local_file(path: &Path) -> Result<LocalFile> {
    let md = std::fs::metadata(path)?;
    if !md.is_file() {
        return Err(DepotError::Config(format!("not a file: {}", path.display())));
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| DepotError::Config(format!("no file name: {}", path.display())))?;
    Ok(LocalFile {
        path: path.to_path_buf(),
        name,
        size: md.len(),
    })
}

/// Expands the given paths into files to upload.
///
/// Directories contribute their direct children, or their whole subtree with
/// `recursive`. Entries that cannot be read are skipped with a warning.
pub fn collect_files(inputs: &[PathBuf], recursive: bool) -> Result<Vec<LocalFile>> {
    let mut out = Vec::new();
    for input in inputs {
        let md = std::fs::metadata(input)?;
        if md.is_file() {
            out.push(local_file(input)?);
            continue;
        }
        let walker = WalkDir::new(input)
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("skipping unreadable entry: {e}");
                    continue;
                }
            };
            if entry.file_type().is_file() {
                match local_file(entry.path()) {
                    Ok(f) => out.push(f),
                    Err(e) => warn!(path = %entry.path().display(), "skipping: {e}"),
                }
            }
        }
    }
    Ok(out)
}

/// Newline-separated paths, blank lines ignored.
pub fn read_path_list<R: BufRead>(reader: R) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            out.push(PathBuf::from(line));
        }
    }
    Ok(out)
}
