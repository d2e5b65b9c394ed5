//! REST API handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use crate::db::{self, DdlAction, QueryOutcome};
use crate::error::BridgeError;
use crate::prompt::ERROR_PREFIX;
use crate::schema::{self, Schema};

/// Error response, `{detail}` as the UI expects
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    fn new(msg: impl Into<String>) -> Self {
        Self { detail: msg.into() }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(msg: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(msg)))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub ollama_url: String,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.generator.model().to_string(),
        ollama_url: state.config.llm.url.clone(),
    })
}

/// Current schema; an empty list if introspection failed
pub async fn get_schema(State(state): State<AppState>) -> Json<Schema> {
    Json(schema::current_schema(&state.config.database).await)
}

/// DDL success response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

/// Apply a schema-editing action
pub async fn apply_ddl(
    State(state): State<AppState>,
    Json(action): Json<DdlAction>,
) -> Result<Json<StatusResponse>, ApiError> {
    match db::apply_ddl(&state.config.database, &action).await {
        Ok(()) => Ok(Json(StatusResponse {
            status: "success".to_string(),
            message: action.describe(),
        })),
        Err(e @ BridgeError::InvalidInput(_)) => {
            tracing::warn!("Rejected DDL action: {}", e);
            Err(bad_request(e.to_string()))
        }
        Err(e) => {
            tracing::error!("DDL action failed: {}", e);
            Err(bad_request(e.to_string()))
        }
    }
}

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Human-readable summary of what happened
    pub response: String,
    pub sql: String,
    /// Row set, when the statement returned one
    pub data: Option<QueryOutcome>,
}

/// Turn a question into SQL and run it
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let question = req.message.trim();
    if question.is_empty() {
        return Err(bad_request("message must not be empty"));
    }

    let schema = schema::current_schema(&state.config.database).await;
    let sql = state.generator.generate_sql(&schema, question).await;

    if sql.starts_with(ERROR_PREFIX) {
        return Ok(Json(ChatResponse {
            response: sql.trim_start_matches("--").trim().to_string(),
            sql,
            data: None,
        }));
    }

    let outcome = db::execute_query(&state.config.database, &sql).await;
    if let QueryOutcome::Error { error } = &outcome {
        tracing::warn!("Generated SQL failed: {}", error);
    }

    Ok(Json(ChatResponse {
        response: outcome.summary(),
        sql,
        data: matches!(outcome, QueryOutcome::Rows(_)).then_some(outcome),
    }))
}

/// Raw query request
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub sql: String,
}

/// Execute raw SQL
pub async fn run_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Json<QueryOutcome> {
    Json(db::execute_query(&state.config.database, &req.sql).await)
}
