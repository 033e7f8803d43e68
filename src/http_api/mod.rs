use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;

use crate::{
    Client, GroupedVacation, Quote, QuoteError, QuoteItem, QuoteSettings, QuoteSummary,
    VacationEntry, VacationLine, calculate_line,
};

#[derive(Clone)]
pub struct AppState {
    quote: Arc<RwLock<Quote>>,
}

impl AppState {
    pub fn new(quote: Quote) -> Self {
        Self {
            quote: Arc::new(RwLock::new(quote)),
        }
    }

    pub fn with_shared(quote: Arc<RwLock<Quote>>) -> Self {
        Self { quote }
    }

    fn quote(&self) -> Arc<RwLock<Quote>> {
        self.quote.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<QuoteError> for ApiError {
    fn from(value: QuoteError) -> Self {
        match value {
            QuoteError::VacationNotFound(_) | QuoteError::ItemNotFound(_) => {
                ApiError::NotFound(value.to_string())
            }
            _ => ApiError::Invalid(value.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        if status.is_server_error() {
            tracing::error!(%message, "request failed");
        } else {
            tracing::debug!(%status, %message, "request rejected");
        }
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/client", get(get_client).put(update_client))
        .route("/vacations", get(list_vacations).post(create_vacation))
        .route("/vacations/grouped", get(grouped_vacations))
        .route(
            "/vacations/:id",
            get(get_vacation).put(update_vacation).delete(delete_vacation),
        )
        .route("/calculate", post(calculate))
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", axum::routing::delete(delete_item))
        .route("/summary", get(summary))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, quote: Quote) -> std::io::Result<()> {
    let state = AppState::new(quote);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_settings(State(state): State<AppState>) -> Json<QuoteSettings> {
    let quote = state.quote();
    let settings = quote.read().settings().clone();
    Json(settings)
}

async fn update_settings(
    State(state): State<AppState>,
    Json(settings): Json<QuoteSettings>,
) -> Result<Json<QuoteSettings>, ApiError> {
    let quote = state.quote();
    let mut guard = quote.write();
    guard.set_settings(settings)?;
    Ok(Json(guard.settings().clone()))
}

async fn get_client(State(state): State<AppState>) -> Json<Client> {
    let quote = state.quote();
    let client = quote.read().client().clone();
    Json(client)
}

async fn update_client(
    State(state): State<AppState>,
    Json(client): Json<Client>,
) -> Result<Json<Client>, ApiError> {
    if client.is_empty() {
        return Err(ApiError::invalid("client name must not be empty"));
    }
    let quote = state.quote();
    quote.write().set_client(client.clone());
    Ok(Json(client))
}

async fn list_vacations(State(state): State<AppState>) -> Result<Json<Vec<VacationLine>>, ApiError> {
    let quote = state.quote();
    let lines = quote.read().vacation_lines()?;
    Ok(Json(lines))
}

async fn grouped_vacations(
    State(state): State<AppState>,
) -> Result<Json<Vec<GroupedVacation>>, ApiError> {
    let quote = state.quote();
    let groups = quote.read().grouped_vacations()?;
    Ok(Json(groups))
}

async fn get_vacation(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<VacationLine>, ApiError> {
    let quote = state.quote();
    let line = quote.read().vacation_line(id)?;
    Ok(Json(line))
}

async fn create_vacation(
    State(state): State<AppState>,
    Json(entry): Json<VacationEntry>,
) -> Result<(StatusCode, Json<VacationLine>), ApiError> {
    let quote = state.quote();
    let mut guard = quote.write();
    let id = guard.add_vacation(entry)?;
    let created = guard
        .vacation_line(id)
        .map_err(|_| ApiError::internal("vacation not found after creation"))?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_vacation(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(mut entry): Json<VacationEntry>,
) -> Result<Json<VacationLine>, ApiError> {
    if entry.id != 0 && entry.id != id {
        return Err(ApiError::invalid(
            "vacation id in payload does not match path parameter",
        ));
    }
    entry.id = id;
    let quote = state.quote();
    let mut guard = quote.write();
    if guard.find_vacation(id).is_none() {
        return Err(ApiError::not_found(format!("vacation {id} not found")));
    }
    guard.upsert_vacation(entry)?;
    Ok(Json(guard.vacation_line(id)?))
}

async fn delete_vacation(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    let quote = state.quote();
    let removed = quote.write().delete_vacation(id);
    if !removed {
        return Err(ApiError::not_found(format!("vacation {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Stateless calculation against the current settings; nothing is stored.
async fn calculate(
    State(state): State<AppState>,
    Json(entry): Json<VacationEntry>,
) -> Result<Json<VacationLine>, ApiError> {
    let quote = state.quote();
    let settings = quote.read().settings().clone();
    let line = calculate_line(&entry, &settings).map_err(|err| ApiError::invalid(err.to_string()))?;
    Ok(Json(line))
}

async fn list_items(State(state): State<AppState>) -> Json<Vec<QuoteItem>> {
    let quote = state.quote();
    let items = quote.read().items().to_vec();
    Json(items)
}

async fn create_item(
    State(state): State<AppState>,
    Json(item): Json<QuoteItem>,
) -> Result<(StatusCode, Json<QuoteItem>), ApiError> {
    let quote = state.quote();
    let mut guard = quote.write();
    let id = guard.add_item(item)?;
    let created = guard
        .items()
        .iter()
        .find(|item| item.id == id)
        .cloned()
        .ok_or_else(|| ApiError::internal("item not found after creation"))?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    let quote = state.quote();
    quote.write().delete_item(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn summary(State(state): State<AppState>) -> Result<Json<QuoteSummary>, ApiError> {
    let quote = state.quote();
    let summary = quote.read().refresh()?;
    Ok(Json(summary))
}
