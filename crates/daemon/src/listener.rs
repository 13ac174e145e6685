// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP listener: webhook intake and the loopback control API.
//!
//! One process-wide listener bound to 127.0.0.1. Webhook paths are
//! namespaced by source id; control paths are JSON-in/JSON-out RPC with the
//! built-ins (`module/load-project`, `module/unload`, `status`, `shutdown`)
//! plus any runtime-registered handlers.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use ol_adapters::{WebhookError, WebhookRequest};
use ol_config::load_module_config;
use ol_engine::Runtime;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Upper bound for one control request.
const CONTROL_TIMEOUT: Duration = Duration::from_secs(30);

/// A runtime-registered control handler.
pub type ControlHandler = Arc<
    dyn Fn(Value) -> Pin<Box<dyn Future<Output = Result<Value, String>> + Send>> + Send + Sync,
>;

/// Shared daemon context for all request handlers.
pub struct ListenCtx {
    pub runtime: Arc<Runtime>,
    pub shutdown: Arc<Notify>,
    handlers: Mutex<HashMap<String, ControlHandler>>,
}

impl ListenCtx {
    pub fn new(runtime: Arc<Runtime>, shutdown: Arc<Notify>) -> Self {
        Self {
            runtime,
            shutdown,
            handlers: Mutex::new(HashMap::new()),
        }
    }

    /// Register a control handler for a path beyond the built-ins
    /// (e.g. `module/poll`).
    pub fn register_control<F, Fut>(&self, path: &str, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, String>> + Send + 'static,
    {
        let handler: ControlHandler = Arc::new(move |body| Box::pin(handler(body)));
        self.handlers.lock().insert(path.to_string(), handler);
    }

    fn handler(&self, path: &str) -> Option<ControlHandler> {
        self.handlers.lock().get(path).cloned()
    }
}

/// Build the process-wide router.
pub fn router(ctx: Arc<ListenCtx>) -> Router {
    Router::new()
        .route("/webhook/:source_id", post(handle_webhook))
        .route("/control/*path", post(handle_control))
        .with_state(ctx)
}

/// Serve until the shutdown notify fires.
pub async fn serve(listener: TcpListener, ctx: Arc<ListenCtx>) -> std::io::Result<()> {
    let shutdown = Arc::clone(&ctx.shutdown);
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(async move { shutdown.notified().await })
        .await
}

// =============================================================================
// Webhook intake
// =============================================================================

async fn handle_webhook(
    State(ctx): State<Arc<ListenCtx>>,
    Path(source_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = WebhookRequest {
        headers: headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_lowercase(), v.to_string()))
            })
            .collect(),
        body: body.to_vec(),
    };

    match ctx.runtime.handle_webhook(&source_id, &request).await {
        Ok(ids) => {
            debug!(source = %source_id, events = ids.len(), "webhook accepted");
            let event_id = ids.first().map(|id| id.to_string());
            (
                StatusCode::OK,
                Json(json!({"ok": true, "event_id": event_id})),
            )
                .into_response()
        }
        Err(e) => {
            let status = match &e {
                WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
                WebhookError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                WebhookError::Unsupported => StatusCode::NOT_FOUND,
            };
            warn!(source = %source_id, status = %status, error = %e, "webhook rejected");
            (
                status,
                Json(json!({"ok": false, "error": e.to_string()})),
            )
                .into_response()
        }
    }
}

// =============================================================================
// Control API
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadProjectParams {
    config_path: PathBuf,
    #[serde(default)]
    project_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
struct UnloadParams {
    name: String,
}

async fn handle_control(
    State(ctx): State<Arc<ListenCtx>>,
    Path(path): Path<String>,
    body: Bytes,
) -> Response {
    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("invalid JSON body: {e}"),
                )
            }
        }
    };

    match tokio::time::timeout(CONTROL_TIMEOUT, dispatch_control(&ctx, &path, body)).await {
        Ok(response) => response,
        Err(_) => error_response(
            StatusCode::REQUEST_TIMEOUT,
            format!("control request '{path}' timed out"),
        ),
    }
}

async fn dispatch_control(ctx: &Arc<ListenCtx>, path: &str, body: Value) -> Response {
    info!(path = %path, "control request");
    match path {
        "module/load-project" => control_load_project(ctx, body).await,
        "module/unload" => control_unload(ctx, body).await,
        "status" => (StatusCode::OK, Json(json!(ctx.runtime.status()))).into_response(),
        "shutdown" => {
            // Both the main loop and the server's graceful-shutdown future
            // wait on this
            ctx.shutdown.notify_waiters();
            (StatusCode::OK, Json(json!({"ok": true}))).into_response()
        }
        other => match ctx.handler(other) {
            Some(handler) => match handler(body).await {
                Ok(value) => (StatusCode::OK, Json(value)).into_response(),
                Err(message) => error_response(StatusCode::BAD_REQUEST, message),
            },
            None => error_response(
                StatusCode::NOT_FOUND,
                format!("unknown control path '{other}'"),
            ),
        },
    }
}

async fn control_load_project(ctx: &Arc<ListenCtx>, body: Value) -> Response {
    let params: LoadProjectParams = match serde_json::from_value(body) {
        Ok(params) => params,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let mut config = match load_module_config(&params.config_path) {
        Ok(config) => config,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    if let Some(dir) = params.project_dir {
        config.module_path = Some(dir);
    }

    match ctx.runtime.load_module(config).await {
        Ok(summary) => (StatusCode::OK, Json(json!(summary))).into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

async fn control_unload(ctx: &Arc<ListenCtx>, body: Value) -> Response {
    let params: UnloadParams = match serde_json::from_value(body) {
        Ok(params) => params,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match ctx.runtime.unload_module(&params.name).await {
        Ok(()) => (StatusCode::OK, Json(json!({"ok": true}))).into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({"ok": false, "error": message}))).into_response()
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
