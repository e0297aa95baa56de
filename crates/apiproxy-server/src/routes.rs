//! Route handlers of the demo API.

use crate::auth::{AuthError, CurrentUser};
use crate::state::AppState;
use crate::todos::{Todo, TodoUpdate};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A handler failure rendered as `{message}` with a status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    /// Response status
    pub status: StatusCode,
    /// Human-readable message
    pub message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn todo_not_found(id: u64) -> Self {
        tracing::debug!(id, "todo not found");
        Self::new(StatusCode::NOT_FOUND, "Todo not found")
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

/// Login request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Fixed confirmation text
    pub message: &'static str,
    /// Signed session token
    pub token: String,
}

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginResponse>, AuthError> {
    let token = state
        .tokens
        .issue_token(&credentials.username, &credentials.password)?;
    tracing::info!(username = %credentials.username, "user logged in");
    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
    }))
}

/// `GET /api/echomsg/:msg`
pub async fn echo_message(Path(msg): Path<String>, CurrentUser(user): CurrentUser) -> Json<Value> {
    let mut body = json!({ "received": msg, "echoed": msg });
    if let Some(user) = user {
        body["user"] = json!(user);
    }
    Json(body)
}

/// `POST /api/reversemsg`
///
/// Reads `message` from the body; anything else reverses to an empty string.
pub async fn reverse_message(CurrentUser(user): CurrentUser, Json(body): Json<Value>) -> Json<Value> {
    let message = body.get("message").and_then(Value::as_str).unwrap_or_default();
    let reversed: String = message.chars().rev().collect();
    let mut response = json!({ "original": message, "reversed": reversed });
    if let Some(user) = user {
        response["user"] = json!(user);
    }
    Json(response)
}

/// `GET /api/todos/fetch`
pub async fn fetch_todos(State(state): State<AppState>) -> Json<Vec<Todo>> {
    Json(state.todos.get_all())
}

/// `POST /api/todos/create`
///
/// # Errors
///
/// `400` when `text` is missing or blank.
pub async fn create_todo(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Todo>), ApiFailure> {
    let text = body
        .get("text")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ApiFailure::new(StatusCode::BAD_REQUEST, "Text is required"))?;
    let todo = state.todos.create(text);
    tracing::debug!(id = todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Body of the update route.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    /// Todo to change
    pub id: u64,
    /// New text
    pub text: Option<String>,
    /// New completion flag
    pub completed: Option<bool>,
}

/// `POST /api/todos/update`
///
/// # Errors
///
/// `404` for an unknown id.
pub async fn update_todo(
    State(state): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<Todo>, ApiFailure> {
    let update = TodoUpdate {
        text: request.text,
        completed: request.completed,
    };
    state
        .todos
        .update(request.id, update)
        .map(Json)
        .ok_or_else(|| ApiFailure::todo_not_found(request.id))
}

/// Body of the delete route.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRequest {
    /// Todo to remove
    pub id: u64,
}

/// `POST /api/todos/delete`
///
/// # Errors
///
/// `404` for an unknown id.
pub async fn delete_todo(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<StatusCode, ApiFailure> {
    if state.todos.remove(request.id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiFailure::todo_not_found(request.id))
    }
}
