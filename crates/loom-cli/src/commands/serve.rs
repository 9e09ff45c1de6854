//! `loom serve`: the artifact fetch endpoint and the manual retry endpoint.
//!
//! - `GET /artifacts/{id}.js` returns the compiled module with long-lived
//!   caching headers and a content `ETag`
//! - `POST /api/lesson/retry` with `{"lessonId": "..."}` resets a failed
//!   lesson and queues a retry run on the in-process job runner

use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use loom_db::LessonDb;
use loom_pipeline::{EventSink, JobQueue, JobRunner, PipelineError, request_retry};
use loom_store::{ArtifactStore, CACHE_CONTROL, CONTENT_TYPE, StoreError, content_version};
use serde::Deserialize;
use serde_json::json;
use tiny_http::{Header, Method, Request, Response, Server};

use crate::cli::{GlobalFlags, ServeArgs};
use crate::context::AppContext;

/// How long a blocking `recv` waits before the loop checks for shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

const ARTIFACT_PREFIX: &str = "/artifacts/";
const RETRY_PATH: &str = "/api/lesson/retry";

/// Queued retry events not yet picked up by the runner.
const QUEUE_CAPACITY: usize = 16;

type HttpResponse = Response<Cursor<Vec<u8>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Artifact(String),
    Retry,
    MethodNotAllowed,
    NotFound,
}

#[derive(Debug, Deserialize)]
struct RetryBody {
    #[serde(default, alias = "lesson_id", rename = "lessonId")]
    lesson_id: Option<String>,
}

/// Handle `loom serve`.
pub async fn handle(args: &ServeArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let bind = args
        .bind
        .clone()
        .unwrap_or_else(|| ctx.config.server.bind.clone());
    let server = Arc::new(
        Server::http(bind.as_str()).map_err(|e| anyhow::anyhow!("failed to bind {bind}: {e}"))?,
    );

    let (queue, worker) = match ctx.orchestrator() {
        Ok(orchestrator) => {
            let (queue, runner) = JobRunner::new(orchestrator, QUEUE_CAPACITY);
            (Some(queue), Some(tokio::spawn(runner.run())))
        }
        Err(error) => {
            tracing::warn!(%error, "model not configured; retry endpoint disabled");
            (None, None)
        }
    };

    tracing::info!(%bind, "artifact server listening");
    if !flags.quiet {
        eprintln!("loom serving on http://{bind}");
    }

    loop {
        let listener = Arc::clone(&server);
        let next = tokio::task::spawn_blocking(move || listener.recv_timeout(POLL_INTERVAL));
        let request = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            received = next => received
                .context("request listener panicked")?
                .context("failed to receive request")?,
        };
        if let Some(request) = request {
            serve_request(request, &ctx.db, &ctx.store, queue.as_ref()).await;
        }
    }

    tracing::info!("shutting down; draining queued runs");
    drop(queue);
    if let Some(worker) = worker {
        let outcomes = worker.await.context("job runner panicked")?;
        tracing::info!(runs = outcomes.len(), "job runner drained");
    }
    Ok(())
}

async fn serve_request(
    mut request: Request,
    db: &LessonDb,
    store: &ArtifactStore,
    queue: Option<&JobQueue>,
) {
    let route = route(request.method(), request.url());
    tracing::debug!(method = %request.method(), url = request.url(), ?route, "request");

    let response = match route {
        Route::Artifact(id) => artifact_response(store, &id).await,
        Route::Retry => {
            let mut body = String::new();
            if let Err(error) = request.as_reader().read_to_string(&mut body) {
                tracing::warn!(%error, "failed to read retry request body");
            }
            match queue {
                Some(queue) => retry_response(db, queue, &body).await,
                None => json_response(503, &json!({"error": "Generation is not configured"})),
            }
        }
        Route::MethodNotAllowed => json_response(405, &json!({"error": "Method not allowed"})),
        Route::NotFound => json_response(404, &json!({"error": "Not found"})),
    };

    if let Err(error) = request.respond(response) {
        tracing::warn!(%error, "failed to write response");
    }
}

fn route(method: &Method, url: &str) -> Route {
    let path = url.split(['?', '#']).next().unwrap_or_default();

    if path == RETRY_PATH {
        return if *method == Method::Post {
            Route::Retry
        } else {
            Route::MethodNotAllowed
        };
    }

    if let Some(rest) = path.strip_prefix(ARTIFACT_PREFIX) {
        // Addresses may carry the store's key prefix (`lessons/lsn-....js`).
        let file = rest.rsplit('/').next().unwrap_or_default();
        return match file.strip_suffix(".js") {
            Some(id) if !id.is_empty() && *method == Method::Get => Route::Artifact(id.to_string()),
            Some(id) if !id.is_empty() => Route::MethodNotAllowed,
            _ => Route::NotFound,
        };
    }
    Route::NotFound
}

async fn artifact_response(store: &ArtifactStore, lesson_id: &str) -> HttpResponse {
    match store.get(lesson_id).await {
        Ok(code) => {
            let etag = format!("\"{}\"", content_version(&code));
            with_headers(
                Response::from_string(code),
                &[
                    ("Content-Type", CONTENT_TYPE),
                    ("Cache-Control", CACHE_CONTROL),
                    ("ETag", etag.as_str()),
                    ("Access-Control-Allow-Origin", "*"),
                ],
            )
        }
        Err(StoreError::NotFound { .. }) => {
            json_response(404, &json!({"error": "Artifact not found"}))
        }
        Err(error) => {
            tracing::error!(lesson_id, %error, "artifact read failed");
            json_response(500, &json!({"error": "Failed to read artifact"}))
        }
    }
}

async fn retry_response<S: EventSink>(db: &LessonDb, sink: &S, body: &str) -> HttpResponse {
    let lesson_id = serde_json::from_str::<RetryBody>(body)
        .ok()
        .and_then(|b| b.lesson_id)
        .filter(|id| !id.trim().is_empty());
    let Some(lesson_id) = lesson_id else {
        return json_response(400, &json!({"error": "Lesson ID is required"}));
    };

    match request_retry(db, sink, &lesson_id).await {
        Ok(_) => json_response(
            200,
            &json!({
                "success": true,
                "message": "Lesson generation retry triggered",
                "lessonId": lesson_id,
            }),
        ),
        Err(PipelineError::LessonNotFound(_)) => {
            json_response(404, &json!({"error": "Lesson not found"}))
        }
        Err(PipelineError::RetryRejected(reason)) => json_response(409, &json!({"error": reason})),
        Err(error) => {
            tracing::error!(lesson_id, %error, "retry failed");
            json_response(500, &json!({"error": error.to_string()}))
        }
    }
}

fn json_response(status: u16, body: &serde_json::Value) -> HttpResponse {
    with_headers(
        Response::from_string(body.to_string()).with_status_code(status),
        &[("Content-Type", "application/json")],
    )
}

fn with_headers(mut response: HttpResponse, headers: &[(&str, &str)]) -> HttpResponse {
    for (name, value) in headers {
        match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => response = response.with_header(header),
            Err(()) => tracing::warn!(name, "skipping invalid response header"),
        }
    }
    response
}
