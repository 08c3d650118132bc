use std::sync::Arc;

use axum::body::Body;
use axum::extract::multipart::{Field, Multipart};
use axum::extract::{DefaultBodyLimit, Form, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use depot_core::format_bytes_compact;
use futures_util::stream;
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::index::{base_name, render_listing, stored_files};

type Shared = Arc<ServerConfig>;
type Reply = (StatusCode, String);

const READ_CHUNK: usize = 64 * 1024;

pub fn router(cfg: ServerConfig) -> Router {
    Router::new()
        .route("/", get(|| async { "depot ok" }))
        .route("/upload", post(upload))
        .route("/delete", post(delete))
        .route("/uploads/", get(listing))
        .route("/uploads/{name}", get(serve_file).head(head_file))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(cfg))
}

const MIN_DRAIN: u64 = 1 << 20;

/// How much of an oversized upload is read before giving up on the body.
fn drain_limit(max_file_size: u64) -> u64 {
    max_file_size.saturating_mul(4).max(MIN_DRAIN)
}

fn reply(status: StatusCode, msg: &str) -> Reply {
    (status, msg.to_string())
}

fn too_large(cfg: &ServerConfig) -> Reply {
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        format!(
            "File too large. Maximum size is {}",
            format_bytes_compact(cfg.max_file_size)
        ),
    )
}

async fn upload(State(cfg): State<Shared>, mut multipart: Multipart) -> Reply {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => return reply(StatusCode::BAD_REQUEST, "Error retrieving file"),
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => return too_large(&cfg),
            Err(e) => {
                warn!("bad multipart body: {e}");
                return reply(StatusCode::BAD_REQUEST, "Error retrieving file");
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        let Some(name) = field.file_name().and_then(base_name) else {
            return reply(StatusCode::BAD_REQUEST, "Error retrieving file");
        };
        return store_field(&cfg, field, &name).await;
    }
}

async fn store_field(cfg: &ServerConfig, mut field: Field<'_>, name: &str) -> Reply {
    let path = cfg.upload_dir.join(name);
    let mut dst = match File::create(&path).await {
        Ok(f) => f,
        Err(e) => {
            error!("create {}: {e}", path.display());
            return reply(StatusCode::INTERNAL_SERVER_ERROR, "Error saving file");
        }
    };
    let mut written = 0u64;
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                written += chunk.len() as u64;
                if cfg.max_file_size > 0 && written > cfg.max_file_size {
                    drop(dst);
                    let _ = tokio::fs::remove_file(&path).await;
                    // read the rest so the client gets to see the status, up to a cap;
                    // past it the connection is dropped with the unread body
                    let cap = drain_limit(cfg.max_file_size);
                    let mut seen = written;
                    while seen <= cap {
                        match field.chunk().await {
                            Ok(Some(chunk)) => seen += chunk.len() as u64,
                            _ => break,
                        }
                    }
                    if seen > cap {
                        warn!("File too large: {name}, stopped reading after {seen} bytes");
                    } else {
                        warn!("File too large: {name}");
                    }
                    return too_large(cfg);
                }
                if let Err(e) = dst.write_all(&chunk).await {
                    error!("write {}: {e}", path.display());
                    drop(dst);
                    let _ = tokio::fs::remove_file(&path).await;
                    return reply(StatusCode::INTERNAL_SERVER_ERROR, "Error saving file");
                }
            }
            Ok(None) => break,
            Err(e) => {
                drop(dst);
                let _ = tokio::fs::remove_file(&path).await;
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    return too_large(cfg);
                }
                warn!("upload of {name} interrupted: {e}");
                return reply(StatusCode::BAD_REQUEST, "Error retrieving file");
            }
        }
    }
    if let Err(e) = dst.flush().await {
        error!("flush {}: {e}", path.display());
        return reply(StatusCode::INTERNAL_SERVER_ERROR, "Error saving file");
    }
    info!("Stored {name} ({written} bytes)");
    (StatusCode::OK, String::new())
}

#[derive(Deserialize)]
struct DeleteForm {
    #[serde(default)]
    filename: String,
}

async fn delete(State(cfg): State<Shared>, Form(form): Form<DeleteForm>) -> Reply {
    if form.filename.is_empty() {
        return reply(StatusCode::BAD_REQUEST, "Filename is required");
    }
    let Some(name) = base_name(&form.filename) else {
        return reply(StatusCode::BAD_REQUEST, "Not a file");
    };
    let path = cfg.upload_dir.join(&name);
    info!("Attempting to delete file: {}", path.display());

    let md = match tokio::fs::metadata(&path).await {
        Ok(md) => md,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("File not found: {}", path.display());
            return reply(StatusCode::NOT_FOUND, "File not found");
        }
        Err(e) => {
            error!("Error accessing file: {e}");
            return reply(StatusCode::INTERNAL_SERVER_ERROR, "Error accessing file");
        }
    };
    if md.is_dir() {
        warn!("Not a file: {}", path.display());
        return reply(StatusCode::BAD_REQUEST, "Not a file");
    }
    if let Err(e) = tokio::fs::remove_file(&path).await {
        error!("Error deleting file: {e}");
        return reply(StatusCode::INTERNAL_SERVER_ERROR, "Error deleting file");
    }
    info!("Successfully deleted file: {name}");
    (StatusCode::OK, String::new())
}

async fn listing(State(cfg): State<Shared>) -> Response {
    match stored_files(&cfg.upload_dir).await {
        Ok(names) => Html(render_listing(&names)).into_response(),
        Err(e) => {
            error!("read {}: {e}", cfg.upload_dir.display());
            reply(StatusCode::INTERNAL_SERVER_ERROR, "Error reading directory").into_response()
        }
    }
}

async fn open_stored(cfg: &ServerConfig, name: &str) -> Option<(File, u64)> {
    let name = base_name(name)?;
    let file = File::open(cfg.upload_dir.join(name)).await.ok()?;
    let md = file.metadata().await.ok()?;
    md.is_file().then(|| (file, md.len()))
}

async fn serve_file(State(cfg): State<Shared>, Path(name): Path<String>) -> Response {
    let Some((file, len)) = open_stored(&cfg, &name).await else {
        return reply(StatusCode::NOT_FOUND, "404 page not found").into_response();
    };
    let chunks = stream::unfold(file, |mut file| async move {
        let mut buf = vec![0u8; READ_CHUNK];
        match file.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                Some((Ok::<_, std::io::Error>(buf), file))
            }
            Err(e) => Some((Err(e), file)),
        }
    });
    (
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_LENGTH, len.to_string()),
        ],
        Body::from_stream(chunks),
    )
        .into_response()
}

async fn head_file(State(cfg): State<Shared>, Path(name): Path<String>) -> Response {
    match open_stored(&cfg, &name).await {
        Some((_, len)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (header::CONTENT_LENGTH, len.to_string()),
            ],
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
