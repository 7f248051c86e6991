use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};

use super::{pages, ApiError, AppState};
use crate::api::{
    ApiCatalog, Deleted, Envelope, Health, ResultList, ScanCreated, ScanRequest, Statistics,
};
use crate::error::Error;
use crate::scan::{self, ScanScope};
use crate::store::{record, Record, RecordDigest, DEFAULT_NAME};

type ApiResult<T> = Result<T, ApiError>;

/// Run synchronous store or probe work off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Task(e.to_string()))?
}

pub async fn index() -> Html<&'static str> {
    Html(pages::INDEX_PAGE)
}

/// Browser view of one stored record. Errors render as html too.
pub async fn result_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let store = state.store.clone();
    match blocking(move || store.resolve(&id)).await {
        Ok(record) => Html(pages::record_page(&record)).into_response(),
        Err(err) => {
            let err = ApiError(err);
            let status = err.status();
            (status, Html(pages::error_page(&err.0))).into_response()
        }
    }
}

// the body is optional; an empty body means a full scan with the default name
pub async fn create_scan(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<Envelope<ScanCreated>>> {
    let request: ScanRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ScanRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| Error::Validation(format!("invalid scan request: {e}")))?
    };

    let scope: ScanScope = request.scan_type.as_deref().unwrap_or("full").parse()?;
    let name = request
        .test_name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_NAME.to_string());
    record::validate_name(&name)?;

    info!(%name, ?scope, "remote scan requested");

    let source = state.source.clone();
    let store = state.store.clone();
    let saved = blocking(move || {
        let result = source.scan(scope);
        for diagnostic in &result.diagnostics {
            debug!(%diagnostic, "scan diagnostic");
        }
        store.save(result.into_payload(), &name)
    })
    .await?;

    Ok(Json(Envelope::Success(ScanCreated {
        message: "scan completed".to_string(),
        test_id: saved.id,
        filename: saved.storage_key,
    })))
}

pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Record>> {
    let store = state.store.clone();
    let record = blocking(move || store.resolve(&id)).await?;
    Ok(Json(record))
}

// limit stays a string so a bad value still gets a json answer; anything
// that is not a non-negative integer lists everything
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    limit: Option<String>,
}

impl ListQuery {
    fn limit(&self) -> Option<usize> {
        self.limit.as_deref().and_then(|raw| raw.trim().parse().ok())
    }
}

pub async fn list_results(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Envelope<ResultList>>> {
    let limit = query.limit();
    if limit.is_none() && query.limit.is_some() {
        debug!(raw = ?query.limit, "ignoring unparsable limit");
    }

    let store = state.store.clone();
    let results = blocking(move || store.list(limit)).await?;
    Ok(Json(Envelope::Success(ResultList {
        count: results.len(),
        results,
    })))
}

pub async fn get_digest(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<RecordDigest>>> {
    let store = state.store.clone();
    let digest = blocking(move || store.summarize(&id)).await?;
    Ok(Json(Envelope::Success(digest)))
}

pub async fn delete_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Deleted>>> {
    let store = state.store.clone();
    let removed = blocking(move || store.delete(&id)).await?;
    Ok(Json(Envelope::Success(Deleted {
        message: format!("result {} deleted", removed.id),
    })))
}

pub async fn statistics(State(state): State<AppState>) -> ApiResult<Json<Envelope<Statistics>>> {
    let store = state.store.clone();
    let stats = blocking(move || store.stats()).await?;
    Ok(Json(Envelope::Success(stats.into())))
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "healthy".to_string(),
        timestamp: record::now(),
        port: state.port,
    })
}

pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let store = state.store.clone();
    let record = blocking(move || store.resolve(&id)).await?;
    let body = serde_json::to_string_pretty(&record).map_err(Error::Encode)?;
    let disposition = format!("attachment; filename=\"{}\"", record.storage_key);

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub async fn list_apis() -> Json<Envelope<ApiCatalog>> {
    Json(Envelope::Success(ApiCatalog {
        apis: scan::catalog(),
    }))
}
