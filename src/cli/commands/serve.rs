//! HTTP API server - the front-end boundary.
//!
//! Provides REST endpoints for answering questions and for the
//! conversation/feedback analytics an interactive UI renders. Error detail
//! stays in the logs; callers get a generic failure message.

use crate::cli::Output;
use crate::config::Settings;
use crate::rag::AnswerPipeline;
use crate::search::SearchMode;
use crate::store::{ConversationStore, SqliteStore};
use crate::SvarError;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
struct AppState {
    pipeline: AnswerPipeline,
    store: Arc<dyn ConversationStore>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let pipeline = AnswerPipeline::from_settings(&settings)?;
    let store: Arc<dyn ConversationStore> = Arc::new(SqliteStore::new(&settings.sqlite_path())?);

    let state = Arc::new(AppState { pipeline, store });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/answer", post(answer))
        .route("/feedback", post(feedback))
        .route("/conversations", get(conversations))
        .route("/stats", get(stats))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Svar API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Answer", "POST /answer");
    Output::kv("Feedback", "POST /feedback");
    Output::kv("Conversations", "GET  /conversations");
    Output::kv("Stats", "GET  /stats");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AnswerRequest {
    question: String,
    collection: String,
    #[serde(default = "default_mode")]
    mode: String,
}

fn default_mode() -> String {
    "lexical".to_string()
}

#[derive(Serialize)]
struct AnswerResponse {
    conversation_id: String,
    answer: String,
    relevance: String,
    relevance_explanation: String,
    response_time_seconds: f64,
    estimated_cost_usd: f64,
}

#[derive(Deserialize)]
struct FeedbackRequest {
    conversation_id: String,
    /// +1 or -1
    feedback: i32,
}

#[derive(Deserialize)]
struct ConversationsQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    relevance: Option<String>,
}

fn default_limit() -> usize {
    5
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn generic_failure() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Something went wrong. Please try again later.".to_string(),
        }),
    )
}

fn bad_request(msg: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn answer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnswerRequest>,
) -> impl IntoResponse {
    if req.question.trim().is_empty() {
        return bad_request("Question must not be empty").into_response();
    }

    let mode = match SearchMode::from_str(&req.mode) {
        Ok(m) => m,
        Err(_) => return bad_request("Unsupported search mode").into_response(),
    };

    let result = match state.pipeline.answer(&req.question, &req.collection, mode).await {
        Ok(r) => r,
        Err(e) => {
            error!("Answer pipeline failed: {}", e);
            return generic_failure().into_response();
        }
    };

    // Persist only after the run completed; no partial result is ever stored
    let conversation_id = uuid::Uuid::new_v4().to_string();
    if let Err(e) = state
        .store
        .save_conversation(&conversation_id, &req.question, &result, &req.collection)
        .await
    {
        error!("Failed to save conversation: {}", e);
        return generic_failure().into_response();
    }

    Json(AnswerResponse {
        conversation_id,
        answer: result.answer,
        relevance: result.relevance.to_string(),
        relevance_explanation: result.relevance_explanation,
        response_time_seconds: result.response_time_seconds,
        estimated_cost_usd: result.estimated_cost_usd,
    })
    .into_response()
}

async fn feedback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FeedbackRequest>,
) -> impl IntoResponse {
    if req.feedback != 1 && req.feedback != -1 {
        return bad_request("Feedback must be +1 or -1").into_response();
    }

    match state
        .store
        .save_feedback(&req.conversation_id, req.feedback, None)
        .await
    {
        Ok(()) => Json(serde_json::json!({ "saved": true })).into_response(),
        Err(SvarError::Integrity(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Unknown conversation".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to save feedback: {}", e);
            generic_failure().into_response()
        }
    }
}

async fn conversations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConversationsQuery>,
) -> impl IntoResponse {
    let relevance = match query.relevance.as_deref() {
        Some(s) => match s.parse() {
            Ok(label) => Some(label),
            Err(_) => return bad_request("Unknown relevance label").into_response(),
        },
        None => None,
    };

    match state.store.recent_conversations(query.limit, relevance).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            error!("Failed to read conversations: {}", e);
            generic_failure().into_response()
        }
    }
}

async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.feedback_stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!("Failed to read feedback stats: {}", e);
            generic_failure().into_response()
        }
    }
}
