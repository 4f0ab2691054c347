use std::convert::Infallible;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use eyre::{Result, WrapErr};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use super::state::{ServerState, SharedOrchestrator};
use super::ServerConfig;
use crate::chat::{Event, StreamingOrchestrator};

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime: String,
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    query: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn event_line(event: &Event) -> Bytes {
    let mut line = serde_json::to_string(event).unwrap_or_else(|e| {
        json!({ "type": "error", "content": format!("failed to encode event: {}", e) }).to_string()
    });
    line.push('\n');
    Bytes::from(line)
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

/// Streams the answer to `{query}` as newline-delimited JSON events.
async fn chat(
    State(orchestrator): State<SharedOrchestrator>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let query = match payload {
        Ok(Json(request)) => request.query.unwrap_or_default(),
        Err(rejection) => {
            warn!("Rejected chat request: {}", rejection.body_text());
            return bad_request(rejection.body_text());
        }
    };

    let events = match orchestrator.respond(&query) {
        Ok(events) => events,
        Err(e) => {
            warn!("Rejected chat request: {}", e);
            return bad_request(e.to_string());
        }
    };

    let body = Body::from_stream(events.map(|event| Ok::<_, Infallible>(event_line(&event))));
    ([(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)], body).into_response()
}

pub fn make_app(orchestrator: StreamingOrchestrator) -> Router {
    let state = ServerState::new(orchestrator);

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(orchestrator: StreamingOrchestrator, config: ServerConfig) -> Result<()> {
    let app = make_app(orchestrator);

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", address))?;

    info!("Listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutting down");
            }
        })
        .await
        .wrap_err("Server error")
}
