//! HTTP boundary for checkout

use axum::{extract::{rejection::JsonRejection, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::checkout::{CheckoutReceipt, CheckoutRequest, OrderService};
use crate::store::TransactionRunner;
use crate::CheckoutError;

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";
/// Set by the authenticating gateway in front of this service.
pub const CUSTOMER_ID_HEADER: &str = "x-customer-id";

pub fn router<R>(service: Arc<OrderService<R>>) -> Router
where
    R: TransactionRunner + 'static,
{
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "roastery-checkout"})) }))
        .route("/api/v1/checkout", post(checkout::<R>))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(service)
}

pub fn status_for(err: &CheckoutError) -> StatusCode {
    match err {
        CheckoutError::Conflict => StatusCode::CONFLICT,
        CheckoutError::ItemsEmpty | CheckoutError::CartItemUnavailable { .. } | CheckoutError::Validation(_) => StatusCode::BAD_REQUEST,
        CheckoutError::QuantityIssue { .. } | CheckoutError::QuantityIssueAtCommit { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CheckoutError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        CheckoutError::CustomerNotFound(_) | CheckoutError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: CheckoutError) -> (StatusCode, String) {
    let status = status_for(&err);
    if status.is_server_error() && status != StatusCode::GATEWAY_TIMEOUT {
        return (status, "Internal error".to_string());
    }
    (status, err.to_string())
}

fn header<'h>(headers: &'h HeaderMap, name: &str) -> Result<&'h str, (StatusCode, String)> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim).filter(|v| !v.is_empty())
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("Missing {name} header")))
}

async fn checkout<R: TransactionRunner + 'static>(
    State(service): State<Arc<OrderService<R>>>,
    headers: HeaderMap,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckoutReceipt>), (StatusCode, String)> {
    let Json(request) = body.map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e.body_text())))?;
    let idempotency_key = header(&headers, IDEMPOTENCY_KEY_HEADER)?.to_string();
    let customer_id = header(&headers, CUSTOMER_ID_HEADER)?.parse::<i64>()
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid {CUSTOMER_ID_HEADER} header")))?;
    let receipt = service.checkout(&idempotency_key, request, customer_id).await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
