//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use checkout_types::{
    AppError, CheckoutRepository, CreateGatewayRequest, CreatePaymentMethodRequest,
    CreateTransactionRequest, GatewayId, SetGatewayStatusRequest, UpdateGatewayRequest,
};

use crate::CheckoutService;

/// Application state shared across handlers.
pub struct AppState<R: CheckoutRepository> {
    pub service: CheckoutService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Duplicate(detail) => {
                tracing::warn!(error = %detail, "Duplicate rejected by store");
                (StatusCode::CONFLICT, "Resource already exists".to_string())
            }
            AppError::StoreUnavailable(detail) => {
                // Store errors are logged, never echoed.
                tracing::error!(error = %detail, "Store operation failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_gateway_id(id: &str) -> Result<GatewayId, ApiError> {
    id.parse()
        .map_err(|_| ApiError(AppError::BadRequest("Invalid gateway ID".into())))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment methods
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn list_payment_methods<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    Json(state.service.list_active_payment_methods().await)
}

#[tracing::instrument(skip(state), fields(name = %req.name))]
pub async fn create_payment_method<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreatePaymentMethodRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let method = state.service.create_payment_method(req).await?;
    Ok((StatusCode::CREATED, Json(method)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateways
// ─────────────────────────────────────────────────────────────────────────────

/// List all gateways. Never fails.
#[tracing::instrument(skip(state))]
pub async fn list_gateways<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    Json(state.service.list_gateways().await)
}

/// Sub-method rows for a checkout tile.
#[tracing::instrument(skip(state))]
pub async fn gateway_choices<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(option): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let choices = state.service.gateway_choices(&option).await?;
    Ok(Json(choices))
}

#[tracing::instrument(skip(state), fields(gateway_id = %id))]
pub async fn get_gateway<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let gateway = state.service.get_gateway(parse_gateway_id(&id)?).await?;
    Ok(Json(gateway))
}

#[tracing::instrument(skip(state), fields(name = %req.name, identifier = %req.identifier))]
pub async fn create_gateway<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateGatewayRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let gateway = state.service.create_gateway(req).await?;
    Ok((StatusCode::CREATED, Json(gateway)))
}

#[tracing::instrument(skip(state, patch), fields(gateway_id = %id))]
pub async fn update_gateway<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateGatewayRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let gateway = state
        .service
        .update_gateway(parse_gateway_id(&id)?, patch)
        .await?;
    Ok(Json(gateway))
}

#[tracing::instrument(skip(state), fields(gateway_id = %id, status = req.status))]
pub async fn set_gateway_status<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<SetGatewayStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let gateway = state
        .service
        .set_gateway_status(parse_gateway_id(&id)?, req.status)
        .await?;
    Ok(Json(gateway))
}

#[tracing::instrument(skip(state), fields(gateway_id = %id))]
pub async fn delete_gateway<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.delete_gateway(parse_gateway_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Transactions
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn list_transactions<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let transactions = state.service.list_transactions().await?;
    Ok(Json(transactions))
}

#[tracing::instrument(skip(state), fields(method = %req.method, amount = %req.amount))]
pub async fn create_transaction<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tx = state.service.create_transaction(req).await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Admin console
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn list_customers<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    Json(state.service.list_customers().await)
}

pub async fn list_invoices<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    Json(state.service.list_invoices())
}

pub async fn list_payment_links<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    Json(state.service.list_payment_links())
}

pub async fn list_sms_data<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    Json(state.service.list_sms_data())
}

// ─────────────────────────────────────────────────────────────────────────────
// Bootstrap
// ─────────────────────────────────────────────────────────────────────────────

/// Bootstrap endpoint - creates the first admin API key.
///
/// This endpoint only works when there are NO existing API keys in the system.
/// It returns the raw API key (only shown once) that should be saved securely.
#[derive(Debug, serde::Deserialize, utoipa::ToSchema)]
pub struct BootstrapRequest {
    /// Name for the API key
    #[schema(example = "admin-console")]
    pub name: String,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapResponse {
    /// The generated API key (shown only once)
    #[schema(example = "sk_abc123xyz...")]
    pub api_key: String,
    /// Informational message
    pub message: String,
}

#[tracing::instrument(skip(state), fields(key_name = %req.name))]
pub async fn bootstrap<R: CheckoutRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<BootstrapRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let raw_key = state.service.bootstrap(&req.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(BootstrapResponse {
            api_key: raw_key,
            message: "Admin API key created. Save this key securely - it won't be shown again!"
                .into(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_duplicate_hides_store_message() {
        let (status, json) = body_of(AppError::Duplicate(
            "UNIQUE constraint failed: users.email".into(),
        ))
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "Resource already exists");
        assert_eq!(json["code"], 409);
    }

    #[tokio::test]
    async fn test_store_failure_hides_detail() {
        let (status, json) = body_of(AppError::StoreUnavailable("pool timed out".into())).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "Service temporarily unavailable");
    }
}
