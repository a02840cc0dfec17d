use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures::Stream;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::chat;
use crate::llm::ChatModelClient;
use crate::logging::ConversationLogger;
use crate::models::{ChatRequest, ChatResponse, ChunkKind};

pub const SERVICE_NAME: &str = "AI Coding Agent Backend";

/// Application state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn ChatModelClient>,
    pub logger: Arc<Mutex<ConversationLogger>>,
    pub model: String,
}

/// Create router with all routes
pub fn create_router(api_prefix: &str, state: AppState) -> Router {
    let api = Router::new()
        .route("/chat", post(chat))
        .route("/chat/stream", post(chat_stream))
        .route("/health", get(health));

    Router::new()
        .route("/", get(root))
        .nest(api_prefix, api)
        .with_state(state)
}

/// POST {prefix}/chat - non-streaming chat endpoint
async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<ChatResponse>, AppError> {
    let request: ChatRequest = serde_json::from_value(payload)?;
    let request_id = Uuid::new_v4();

    state
        .logger
        .lock()
        .await
        .log(request_id, "user", &request.message, None)
        .await;

    let message = chat::collect_response(
        state.client.clone(),
        request.message,
        request.conversation_history,
    )
    .await;

    state
        .logger
        .lock()
        .await
        .log(request_id, "assistant", &message, Some(&state.model))
        .await;

    Ok(Json(ChatResponse { message }))
}

/// POST {prefix}/chat/stream - streaming chat endpoint using Server-Sent Events
async fn chat_stream(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let request: ChatRequest = serde_json::from_value(payload)?;
    let request_id = Uuid::new_v4();

    state
        .logger
        .lock()
        .await
        .log(request_id, "user", &request.message, None)
        .await;

    let mut chunks = Box::pin(chat::stream_chat_events(
        state.client.clone(),
        request.message,
        request.conversation_history,
    ));

    // Relay chunks as SSE events while accumulating the assistant
    // transcript, logged once the terminal chunk passes through.
    let events = async_stream::stream! {
        let mut transcript = String::new();
        while let Some(chunk) = chunks.next().await {
            match chunk.kind {
                ChunkKind::Content => transcript.push_str(&chunk.data),
                ChunkKind::End => {
                    state
                        .logger
                        .lock()
                        .await
                        .log(request_id, "assistant", &transcript, Some(&state.model))
                        .await;
                }
                ChunkKind::Code => {}
            }
            yield Event::default().json_data(&chunk);
        }
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// GET {prefix}/health - Health check endpoint
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
    }))
}

/// GET / - Service banner
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Error response for malformed request bodies
#[derive(Debug)]
pub enum AppError {
    SerdeJson(serde_json::Error),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerdeJson(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::SerdeJson(err) => (StatusCode::BAD_REQUEST, err.to_string()),
        };

        let body = Json(serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
