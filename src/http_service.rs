//! HTTP API for the barter app
//!
//! JSON over axum, every route under `/api`. Errors are returned as
//! `{"detail": "<message>"}` with the status from [`AppError::status_code`].

use crate::error::AppError;
use crate::models::{
    Item, ItemCreate, ItemUpdate, PersonalInfoUpdate, SyncSummary, Trade, TradeCreate,
    Transaction, TransactionCreate, User, UserCreate, UserLogin,
};
use crate::services::{AnalyzeDepositRequest, DepositAnalysis};
use crate::valuation::{self, Valuation, ValuationRequest};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;
use uuid::Uuid;

type ApiResult<T> = Result<Json<T>, AppError>;

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Store and config internals stay in the logs
        let detail = if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.detail()
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// `Json` body extractor whose rejections go through [`AppError`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
struct ApiJson<T>(T);

fn parse_uuid(s: &str, field_name: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|_| AppError::Validation(format!("Invalid {}: {}", field_name, s)))
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Build the router with all routes
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(health))
        // Users
        .route("/users/register", post(register_user))
        .route("/users/login", post(login_user))
        .route("/users/by-username/:username", get(get_user_by_username))
        .route("/users/:user_id", get(get_user))
        .route("/users/:user_id/personal-info", put(update_personal_info))
        // Items
        .route("/items", post(create_item))
        .route("/items/analyze-deposit", post(analyze_deposit))
        .route("/items/user/:user_id", get(list_user_items))
        .route(
            "/items/:item_id",
            get(get_item).put(update_item).delete(delete_item),
        )
        // Valuation
        .route("/valuations/mock", post(mock_valuation))
        // Trades
        .route("/trades", post(create_trade))
        .route("/trades/sync", post(sync_trades))
        .route("/trades/user/:user_id", get(list_user_trades))
        .route("/trades/:trade_id", get(get_trade))
        // Transactions
        .route("/transactions", post(create_transaction))
        .route("/transactions/user/:user_id", get(list_user_transactions))
        .route("/transactions/:transaction_id", get(get_transaction));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ Users ============

async fn register_user(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<UserCreate>,
) -> ApiResult<User> {
    Ok(Json(state.users.register(req).await?))
}

async fn login_user(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<UserLogin>,
) -> ApiResult<User> {
    Ok(Json(state.users.login(req).await?))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<User> {
    let user_id = parse_uuid(&user_id, "user_id")?;
    Ok(Json(state.users.get_user(user_id).await?))
}

async fn get_user_by_username(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<User> {
    Ok(Json(state.users.get_user_by_username(&username).await?))
}

async fn update_personal_info(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    ApiJson(update): ApiJson<PersonalInfoUpdate>,
) -> ApiResult<User> {
    let user_id = parse_uuid(&user_id, "user_id")?;
    Ok(Json(state.users.update_personal_info(user_id, update).await?))
}

// ============ Items ============

async fn create_item(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ItemCreate>,
) -> ApiResult<Item> {
    Ok(Json(state.items.create_item(req).await?))
}

async fn analyze_deposit(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AnalyzeDepositRequest>,
) -> ApiResult<DepositAnalysis> {
    Ok(Json(state.deposit_analysis.analyze(req).await?))
}

async fn list_user_items(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<Item>> {
    let user_id = parse_uuid(&user_id, "user_id")?;
    Ok(Json(state.items.list_items_for_owner(user_id).await?))
}

async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> ApiResult<Item> {
    let item_id = parse_uuid(&item_id, "item_id")?;
    Ok(Json(state.items.get_item(item_id).await?))
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
    ApiJson(update): ApiJson<ItemUpdate>,
) -> ApiResult<Item> {
    let item_id = parse_uuid(&item_id, "item_id")?;
    Ok(Json(state.items.update_item(item_id, update).await?))
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> ApiResult<MessageResponse> {
    let item_id = parse_uuid(&item_id, "item_id")?;
    state.items.delete_item(item_id).await?;
    Ok(Json(MessageResponse {
        message: "Item deleted successfully".to_string(),
    }))
}

// ============ Valuation ============

async fn mock_valuation(ApiJson(req): ApiJson<ValuationRequest>) -> Json<Valuation> {
    Json(valuation::estimate(&req))
}

// ============ Trades ============

async fn create_trade(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<TradeCreate>,
) -> ApiResult<Trade> {
    Ok(Json(state.settlement.settle_trade(req).await?))
}

/// Entries are decoded one by one so a malformed trade fails alone
async fn sync_trades(
    State(state): State<Arc<AppState>>,
    ApiJson(submissions): ApiJson<Vec<serde_json::Value>>,
) -> Json<SyncSummary> {
    Json(state.settlement.sync_offline_trades(submissions).await)
}

async fn list_user_trades(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<Trade>> {
    let user_id = parse_uuid(&user_id, "user_id")?;
    Ok(Json(state.settlement.list_trades_for_user(user_id).await?))
}

async fn get_trade(
    State(state): State<Arc<AppState>>,
    Path(trade_id): Path<String>,
) -> ApiResult<Trade> {
    let trade_id = parse_uuid(&trade_id, "trade_id")?;
    Ok(Json(state.settlement.get_trade(trade_id).await?))
}

// ============ Transactions ============

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<TransactionCreate>,
) -> ApiResult<Transaction> {
    Ok(Json(state.transactions.create_transaction(req).await?))
}

async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<String>,
) -> ApiResult<Transaction> {
    Ok(Json(state.transactions.get_transaction(&transaction_id).await?))
}

async fn list_user_transactions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<Transaction>> {
    let user_id = parse_uuid(&user_id, "user_id")?;
    Ok(Json(state.transactions.transaction_feed(user_id).await?))
}
