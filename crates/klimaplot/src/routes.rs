// crates/klimaplot/src/routes.rs
//
// Thin serving layer around the core pipeline: multipart upload in, batch
// summary and artifact links out. No algorithmic content lives here.

use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Multipart, Path as UrlPath, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use klimaplot_core::config::{LayoutMode, PipelineConfig};
use klimaplot_core::pipeline::{run_batch, BatchReport};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const ARCHIVE_NAME: &str = "plots.zip";
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

struct AppState {
    serve_dir: PathBuf,
    cleanup_secs: u64,
}

pub async fn serve(addr: SocketAddr, serve_dir: PathBuf, cleanup_secs: u64) -> Result<()> {
    std::fs::create_dir_all(&serve_dir)
        .with_context(|| format!("failed to create serve dir {}", serve_dir.display()))?;

    let state = Arc::new(AppState {
        serve_dir,
        cleanup_secs,
    });
    let app = Router::new()
        .route("/upload", post(upload))
        .route("/artifacts/{name}", get(artifact))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "klimaplot API listening");
    axum::serve(listener, app).await.context("server error")
}

async fn upload(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    match handle_upload(state, multipart).await {
        Ok(response) => response,
        Err(err) => {
            error!("upload failed: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

async fn handle_upload(state: Arc<AppState>, mut multipart: Multipart) -> Result<Response> {
    let mut config = PipelineConfig::default();
    let staging = tempfile::tempdir().context("failed to create staging dir")?;
    let mut uploads: Vec<PathBuf> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await?;
                let path = staging.path().join(sanitize_file_name(&file_name));
                tokio::fs::write(&path, &data)
                    .await
                    .with_context(|| format!("failed to stage {}", path.display()))?;
                uploads.push(path);
            }
            "plot_option" => {
                let value = field.text().await?;
                config.plot.layout = match value.trim() {
                    "combined" => LayoutMode::Combined,
                    "individual" => LayoutMode::Individual,
                    other => return Ok(bad_request(&format!("unknown plot_option '{other}'"))),
                };
            }
            "dpi" => match field.text().await?.trim().parse() {
                Ok(value) => config.plot.dpi = value,
                Err(_) => return Ok(bad_request("dpi must be a positive integer")),
            },
            "timestamp_count" => match field.text().await?.trim().parse() {
                Ok(value) => config.plot.timestamp_count = value,
                Err(_) => return Ok(bad_request("timestamp_count must be a positive integer")),
            },
            "temp_range" => match crate::parse_range(&field.text().await?) {
                Ok(range) => config.plot.temp_range = range,
                Err(err) => return Ok(bad_request(&err.to_string())),
            },
            "relh_range" => match crate::parse_range(&field.text().await?) {
                Ok(range) => config.plot.relh_range = range,
                Err(err) => return Ok(bad_request(&err.to_string())),
            },
            _ => warn!(field = %name, "ignoring unknown form field"),
        }
    }

    if uploads.is_empty() {
        return Ok(bad_request("no files uploaded"));
    }
    if config.plot.layout == LayoutMode::Combined && uploads.len() == 1 {
        return Ok(bad_request(
            "the combined option requires more than one file",
        ));
    }
    if let Err(err) = config.validate() {
        return Ok(bad_request(&err.to_string()));
    }

    let out_dir = state.serve_dir.clone();
    let report = tokio::task::spawn_blocking(move || run_batch(&uploads, &config, &out_dir))
        .await
        .context("pipeline task panicked")??;

    drop(staging);

    if report.is_all_failed() {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "no usable charts were produced",
                "reports": report.reports,
            })),
        )
            .into_response());
    }

    let download = package_artifacts(&state.serve_dir, &report)?;
    schedule_cleanup(&state, &report, download.as_deref());

    Ok(Json(json!({
        "rendered": report.rendered_count(),
        "skipped": report.skipped_count(),
        "reports": report.reports,
        "download": download.map(|name| format!("/artifacts/{name}")),
    }))
    .into_response())
}

async fn artifact(State(state): State<Arc<AppState>>, UrlPath(name): UrlPath<String>) -> Response {
    if name.contains('/') || name.contains("..") {
        return StatusCode::NOT_FOUND.into_response();
    }
    let path = state.serve_dir.join(&name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let content_type = if name.ends_with(".zip") {
                "application/zip"
            } else {
                "image/png"
            };
            ([(header::CONTENT_TYPE, content_type)], bytes).into_response()
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Single artifacts are linked directly; multiple individual artifacts are
/// packaged into one archive for transport.
fn package_artifacts(serve_dir: &Path, report: &BatchReport) -> Result<Option<String>> {
    match report.artifacts.as_slice() {
        [] => Ok(None),
        [single] => Ok(single
            .file_name()
            .and_then(|name| name.to_str())
            .map(String::from)),
        many => {
            let archive_path = serve_dir.join(ARCHIVE_NAME);
            let file = std::fs::File::create(&archive_path)
                .with_context(|| format!("failed to create {}", archive_path.display()))?;
            let mut archive = ZipWriter::new(file);
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

            for path in many {
                let name = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .context("artifact has no file name")?;
                archive
                    .start_file(name, options)
                    .with_context(|| format!("failed to start {name} in archive"))?;
                let bytes = std::fs::read(path)
                    .with_context(|| format!("failed to read artifact {}", path.display()))?;
                archive.write_all(&bytes)?;
            }
            archive.finish().context("failed to finalize archive")?;
            Ok(Some(ARCHIVE_NAME.to_string()))
        }
    }
}

// The core never deletes artifacts it produced; this layer does, after the
// configured delay.
fn schedule_cleanup(state: &Arc<AppState>, report: &BatchReport, archive: Option<&str>) {
    if state.cleanup_secs == 0 {
        return;
    }
    let delay = Duration::from_secs(state.cleanup_secs);
    let mut targets = report.artifacts.clone();
    if let Some(name) = archive {
        targets.push(state.serve_dir.join(name));
    }
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        for target in targets {
            if let Err(err) = tokio::fs::remove_file(&target).await {
                warn!(file = %target.display(), "cleanup failed: {err}");
            }
        }
    });
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn sanitize_file_name(raw: &str) -> String {
    Path::new(raw)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload")
        .to_string()
}
