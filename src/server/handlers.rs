use super::AppState;
use crate::archive::archive_name_for;
use crate::cloner::{clone_single_page, CloneOptions};
use crate::crawler::clone_site;
use crate::CloneError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

/// Body of `POST /api/clone`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub embed_images: Option<bool>,
}

/// Successful answer of `POST /api/clone`
#[derive(Debug, Serialize, Deserialize)]
pub struct CloneResponse {
    pub success: bool,
    pub html: String,
    pub title: String,
    pub size: usize,
    pub url: String,
}

/// Body of `POST /api/clone-site`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteCloneRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub max_pages: Option<usize>,
    #[serde(default)]
    pub max_depth: Option<u32>,
    #[serde(default)]
    pub embed_images: Option<bool>,
}

pub async fn clone_page(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CloneRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return bad_request(rejection),
    };

    let options = CloneOptions::new(request.url.unwrap_or_default())
        .with_embed_images(request.embed_images.unwrap_or(true));

    let outcome = run_isolated(state, move |state| async move {
        clone_single_page(&options, state.fetcher.as_ref(), &state.config.fetcher).await
    })
    .await;

    match outcome {
        Ok(result) => Json(CloneResponse {
            success: true,
            size: result.byte_size,
            html: result.html,
            title: result.title,
            url: result.source_url,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn clone_site_archive(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SiteCloneRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return bad_request(rejection),
    };

    let (max_pages, max_depth) = match state
        .config
        .crawl
        .request_limits(request.max_pages, request.max_depth)
    {
        Ok(limits) => limits,
        Err(e) => return error_response(e),
    };
    let options = CloneOptions::new(request.url.unwrap_or_default())
        .with_embed_images(request.embed_images.unwrap_or(true))
        .with_limits(max_pages, max_depth);

    let outcome = run_isolated(state, move |state| async move {
        let result = clone_site(&options, state.fetcher.as_ref(), &state.config).await?;
        let file_name = archive_name_for(&options.target_url);
        Ok((result, file_name))
    })
    .await;

    match outcome {
        Ok((result, file_name)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/zip".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file_name),
                ),
            ],
            result.archive,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Runs a clone on a blocking thread
///
/// The document tree is not `Send`, so a clone future cannot be polled by an
/// axum handler directly. It is driven to completion on the blocking pool
/// instead, using the current runtime for its I/O.
async fn run_isolated<F, Fut, T>(state: Arc<AppState>, job: F) -> Result<T, CloneError>
where
    F: FnOnce(Arc<AppState>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, CloneError>>,
    T: Send + 'static,
{
    let handle = tokio::runtime::Handle::current();
    tokio::task::spawn_blocking(move || handle.block_on(job(state)))
        .await
        .map_err(|e| {
            CloneError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("clone task failed: {}", e),
            ))
        })?
}

fn error_response(error: CloneError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!("Clone failed: {}", error);
    }
    (
        status,
        Json(serde_json::json!({ "error": error.user_message() })),
    )
        .into_response()
}

fn bad_request(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": rejection.body_text() })),
    )
        .into_response()
}
