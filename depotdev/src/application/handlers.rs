use std::path::{Path, PathBuf};

use depot_core::domain::UploadStatus;
use depot_core::error::{DepotError, Result};
use depot_core::input::{collect_files, read_path_list};
use depot_core::{ClientConfig, DeleteOutcome, HttpFileStore, UploadReport, UploadSession};

use crate::presentation::terminal::TerminalView;

fn session(cfg: &ClientConfig, view: TerminalView) -> Result<UploadSession<HttpFileStore, TerminalView>> {
    let store = HttpFileStore::new(cfg)?;
    Ok(UploadSession::new(store, view, cfg.session_timing()))
}

fn expand_inputs(paths: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    if paths.len() == 1 && paths[0] == Path::new("-") {
        return read_path_list(std::io::stdin().lock());
    }
    Ok(paths)
}

fn upload_result(reports: &[UploadReport]) -> Result<()> {
    let failed: Vec<_> = reports
        .iter()
        .filter(|r| r.status != UploadStatus::Complete)
        .collect();
    match failed.as_slice() {
        [] => Ok(()),
        [one] if one.status == UploadStatus::TooLarge => Err(DepotError::Oversize(
            one.detail.clone().unwrap_or_else(|| one.name.clone()),
        )),
        _ => Err(DepotError::UploadsFailed {
            failed: failed.len(),
            total: reports.len(),
        }),
    }
}

pub async fn handle_upload(cfg: ClientConfig, paths: Vec<PathBuf>, recursive: bool) -> Result<()> {
    let inputs = expand_inputs(paths)?;
    let files = collect_files(&inputs, recursive)?;
    if files.is_empty() {
        eprintln!("upload: nothing to upload");
        return Ok(());
    }
    let session = session(&cfg, TerminalView::new(false, true))?;
    let reports = session.upload_files(files).await;
    upload_result(&reports)
}

pub async fn handle_ls(cfg: ClientConfig) -> Result<()> {
    let session = session(&cfg, TerminalView::new(false, true))?;
    session.refresh().await?;
    Ok(())
}

pub async fn handle_rm(cfg: ClientConfig, name: String, yes: bool) -> Result<()> {
    let session = session(&cfg, TerminalView::new(yes, false))?;
    session.refresh().await?;
    if !session.listing().contains(&name) {
        return Err(DepotError::DeleteFailed(format!("{name} is not listed")));
    }
    match session.delete(&name).await {
        DeleteOutcome::Deleted => {
            eprintln!("rm: deleted {name}");
            Ok(())
        }
        DeleteOutcome::Cancelled => {
            eprintln!("rm: cancelled");
            Ok(())
        }
        DeleteOutcome::Failed { detail } => Err(DepotError::DeleteFailed(detail)),
    }
}

pub async fn handle_get(cfg: ClientConfig, name: String, out: Option<PathBuf>) -> Result<()> {
    let store = HttpFileStore::new(&cfg)?;
    let out = out.unwrap_or_else(|| PathBuf::from(&name));
    let written = store.download(&name, &out).await?;
    eprintln!("get: {} bytes -> {}", written, out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::domain::TaskId;

    fn report(id: u64, status: UploadStatus, detail: Option<&str>) -> UploadReport {
        UploadReport {
            id: TaskId(id),
            name: format!("f{id}"),
            status,
            detail: detail.map(str::to_string),
        }
    }

    #[test]
    fn all_complete_is_ok() {
        let r = [report(1, UploadStatus::Complete, None)];
        assert!(upload_result(&r).is_ok());
    }

    #[test]
    fn single_oversize_carries_detail() {
        let r = [
            report(1, UploadStatus::Complete, None),
            report(2, UploadStatus::TooLarge, Some("Maximum size is 1.0 MB")),
        ];
        match upload_result(&r) {
            Err(DepotError::Oversize(d)) => assert_eq!(d, "Maximum size is 1.0 MB"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn mixed_failures_are_counted() {
        let r = [
            report(1, UploadStatus::Failed, Some("HTTP 500")),
            report(2, UploadStatus::TooLarge, None),
            report(3, UploadStatus::Complete, None),
        ];
        assert!(matches!(
            upload_result(&r),
            Err(DepotError::UploadsFailed { failed: 2, total: 3 })
        ));
    }

    #[test]
    fn dash_is_kept_when_mixed_with_paths() {
        let paths = vec![PathBuf::from("-"), PathBuf::from("a.txt")];
        assert_eq!(expand_inputs(paths.clone()).unwrap(), paths);
    }
}
