//! In-memory stand-in for the LendingClub investor API.

pub mod fixtures;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_API_KEY: &str = "mock-api-key";
/// A key the server knows but refuses with 403.
pub const REVOKED_API_KEY: &str = "revoked-api-key";
/// The only account id the server knows; every other id is a 404.
pub const ACCOUNT_ID: u64 = 1234;

const API_VERSION: &str = "v1";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub portfolio_id: u64,
    pub portfolio_name: String,
    pub portfolio_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolio {
    pub actor_id: u64,
    pub portfolio_name: String,
    pub portfolio_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub loan_id: u64,
    pub requested_amount: f64,
    pub portfolio_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitOrders {
    pub aid: u64,
    pub orders: Vec<OrderRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    #[serde(rename = "showAll")]
    pub show_all: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub portfolios: Vec<Portfolio>,
    pub next_order_instruct_id: u64,
}

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    store: Arc<RwLock<Store>>,
}

pub fn app() -> Router {
    app_with_key(DEFAULT_API_KEY)
}

pub fn app_with_key(api_key: &str) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        store: Arc::new(RwLock::new(Store {
            portfolios: vec![
                Portfolio {
                    portfolio_id: 11111,
                    portfolio_name: "Portfolio1".to_string(),
                    portfolio_description: Some("Sample Portfolio Description".to_string()),
                },
                Portfolio {
                    portfolio_id: 22222,
                    portfolio_name: "Portfolio2".to_string(),
                    portfolio_description: None,
                },
            ],
            next_order_instruct_id: 1,
        })),
    };

    Router::new()
        .route("/api/investor/{version}/loans/listing", get(listed_loans))
        .route("/api/investor/{version}/accounts/{id}/summary", get(account_summary))
        .route("/api/investor/{version}/accounts/{id}/availablecash", get(available_cash))
        .route("/api/investor/{version}/accounts/{id}/funds/pending", get(pending_transfers))
        .route("/api/investor/{version}/accounts/{id}/notes", get(notes))
        .route("/api/investor/{version}/accounts/{id}/detailednotes", get(detailed_notes))
        .route(
            "/api/investor/{version}/accounts/{id}/portfolios",
            get(list_portfolios).post(create_portfolio),
        )
        .route("/api/investor/{version}/accounts/{id}/orders", post(submit_orders))
        .route("/api/investor/{version}/echo/headers", get(echo_headers).post(echo_headers))
        .route("/api/investor/{version}/status/{code}", get(status_code).post(status_code))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_key(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_key(api_key)).await
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    match key.as_deref() {
        Some(key) if key == &*state.api_key => next.run(request).await,
        Some(REVOKED_API_KEY) => (StatusCode::FORBIDDEN, "api key revoked").into_response(),
        _ => (StatusCode::UNAUTHORIZED, "invalid api key").into_response(),
    }
}

/// Resolves the account for an account-scoped route, or the 404 to return.
fn account(version: &str, id: u64) -> Result<u64, StatusCode> {
    if version != API_VERSION || id != ACCOUNT_ID {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(id)
}

fn validation_error(field: &str, code: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "errors": [{ "field": field, "code": code, "message": message }]
        })),
    )
        .into_response()
}

async fn listed_loans(
    Path(version): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Value>, StatusCode> {
    if version != API_VERSION {
        return Err(StatusCode::NOT_FOUND);
    }
    let show_all = query.show_all.as_deref() == Some("true");
    Ok(Json(fixtures::loan_listing(show_all)))
}

async fn account_summary(
    Path((version, id)): Path<(String, u64)>,
) -> Result<Json<Value>, StatusCode> {
    let id = account(&version, id)?;
    Ok(Json(fixtures::account_summary(id)))
}

async fn available_cash(Path((version, id)): Path<(String, u64)>) -> Result<Json<Value>, StatusCode> {
    let id = account(&version, id)?;
    Ok(Json(fixtures::available_cash(id)))
}

async fn pending_transfers(
    Path((version, id)): Path<(String, u64)>,
) -> Result<Json<Value>, StatusCode> {
    account(&version, id)?;
    Ok(Json(fixtures::pending_transfers()))
}

async fn notes(Path((version, id)): Path<(String, u64)>) -> Result<Json<Value>, StatusCode> {
    account(&version, id)?;
    Ok(Json(fixtures::owned_notes(false)))
}

async fn detailed_notes(Path((version, id)): Path<(String, u64)>) -> Result<Json<Value>, StatusCode> {
    account(&version, id)?;
    Ok(Json(fixtures::owned_notes(true)))
}

async fn list_portfolios(
    State(state): State<AppState>,
    Path((version, id)): Path<(String, u64)>,
) -> Result<Json<Value>, StatusCode> {
    account(&version, id)?;
    let store = state.store.read().await;
    Ok(Json(json!({ "myPortfolios": store.portfolios })))
}

async fn create_portfolio(
    State(state): State<AppState>,
    Path((version, id)): Path<(String, u64)>,
    Json(input): Json<CreatePortfolio>,
) -> Response {
    if let Err(status) = account(&version, id) {
        return status.into_response();
    }
    if input.actor_id != id {
        return validation_error("actorId", "actor-mismatch", "actorId must match the account");
    }

    let mut store = state.store.write().await;
    if store
        .portfolios
        .iter()
        .any(|p| p.portfolio_name == input.portfolio_name)
    {
        return validation_error(
            "portfolioName",
            "portfolio-name-exists",
            "A portfolio with this name already exists",
        );
    }

    let portfolio = Portfolio {
        portfolio_id: store.portfolios.iter().map(|p| p.portfolio_id).max().unwrap_or(0) + 1,
        portfolio_name: input.portfolio_name,
        portfolio_description: input.portfolio_description,
    };
    store.portfolios.push(portfolio.clone());
    Json(portfolio).into_response()
}

async fn submit_orders(
    State(state): State<AppState>,
    Path((version, id)): Path<(String, u64)>,
    Json(input): Json<SubmitOrders>,
) -> Response {
    if let Err(status) = account(&version, id) {
        return status.into_response();
    }
    if input.aid != id {
        return validation_error("aid", "actor-mismatch", "aid must match the account");
    }

    let mut store = state.store.write().await;
    let order_instruct_id = store.next_order_instruct_id;
    store.next_order_instruct_id += 1;

    let confirmations: Vec<Value> = input
        .orders
        .iter()
        .map(|order| {
            let whole_note = order.requested_amount > 0.0 && order.requested_amount % 25.0 == 0.0;
            let (invested, status) = if whole_note {
                (order.requested_amount, "ORDER_FULFILLED")
            } else {
                (0.0, "NOT_AN_INCREMENT_OF_25")
            };
            json!({
                "loanId": order.loan_id,
                "requestedAmount": order.requested_amount,
                "investedAmount": invested,
                "executionStatus": [status]
            })
        })
        .collect();

    Json(json!({
        "orderInstructId": order_instruct_id,
        "orderConfirmations": confirmations
    }))
    .into_response()
}

/// Reports back the request headers a client sent, minus the credential.
async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    let value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "accept": value(header::ACCEPT),
        "userAgent": value(header::USER_AGENT),
        "contentType": value(header::CONTENT_TYPE),
    }))
}

/// Answers with whatever status the path asks for.
async fn status_code(Path((_version, code)): Path<(String, u16)>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "status": code }))).into_response()
}
