//! `POST /api/v1/parse`: upload a show list, stream resolved shows back as
//! server-sent events.

use std::convert::Infallible;
use std::path::Path;
use std::time::Duration;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Extension,
};
use futures::stream::{Stream, StreamExt};
use showcount_core::{extract_text, UnsupportedFormat};
use showcount_resolver::Pipeline;

use super::{ApiError, AppState};
use crate::middleware::RequestId;

pub(super) const SHOW_EVENT: &str = "show";
pub(super) const DONE_EVENT: &str = "done";
pub(super) const ERROR_EVENT: &str = "error";

const KEEP_ALIVE_SECS: u64 = 15;

/// The multipart fields this endpoint reads.
#[derive(Debug, Default)]
struct Upload {
    file_name: Option<String>,
    bytes: Option<Vec<u8>>,
    prompt: String,
}

pub(super) async fn parse_shows(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    multipart: Multipart,
) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(err) => {
            tracing::warn!(request_id = %req_id.0, error = %err, "failed to read multipart upload");
            return ApiError::upload(req_id.0, err.status(), err.body_text()).into_response();
        }
    };

    let Some(bytes) = upload.bytes else {
        return ApiError::validation(req_id.0, "missing multipart field 'file'").into_response();
    };

    let extension = file_extension(upload.file_name.as_deref());
    let decoded = extract_text(&bytes, extension);

    tracing::info!(
        request_id = %req_id.0,
        file_name = upload.file_name.as_deref().unwrap_or(""),
        bytes = bytes.len(),
        has_prompt = !upload.prompt.is_empty(),
        "parse request received"
    );

    Sse::new(show_events(state.pipeline, decoded, upload.prompt, req_id.0))
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(KEEP_ALIVE_SECS))
                .text("keep-alive"),
        )
        .into_response()
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, MultipartError> {
    let mut upload = Upload::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                upload.file_name = field.file_name().map(ToOwned::to_owned);
                upload.bytes = Some(field.bytes().await?.to_vec());
            }
            Some("prompt") => {
                upload.prompt = field.text().await?.trim().to_string();
            }
            _ => {}
        }
    }

    Ok(upload)
}

fn file_extension(file_name: Option<&str>) -> &str {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

/// One `show` event per resolved record, then `done`. An unreadable upload
/// or a fatal pipeline failure ends the stream with a single `error` event.
fn show_events(
    pipeline: Pipeline,
    decoded: Result<String, UnsupportedFormat>,
    prompt: String,
    request_id: String,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        let content = match decoded {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(request_id = %request_id, error = %err, "rejected upload");
                yield Ok(error_event(&err.to_string()));
                return;
            }
        };

        let mut emitted = 0usize;
        let mut results = std::pin::pin!(pipeline.process_shows(content, prompt));

        while let Some(result) = results.next().await {
            match result {
                Ok(show) => match Event::default().event(SHOW_EVENT).json_data(&show) {
                    Ok(event) => {
                        emitted += 1;
                        yield Ok(event);
                    }
                    Err(err) => {
                        tracing::warn!(request_id = %request_id, order = show.order, error = %err, "failed to serialize show");
                    }
                },
                Err(err) => {
                    tracing::error!(request_id = %request_id, emitted, error = %err, "pipeline failed");
                    yield Ok(error_event(&err.to_string()));
                    return;
                }
            }
        }

        tracing::info!(request_id = %request_id, emitted, "parse stream complete");
        yield Ok(Event::default().event(DONE_EVENT).data("{}"));
    }
}

fn error_event(message: &str) -> Event {
    Event::default()
        .event(ERROR_EVENT)
        .data(serde_json::json!({ "message": message }).to_string())
}
