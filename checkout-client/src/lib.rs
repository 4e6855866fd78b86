//! # Checkout Client SDK
//!
//! A typed Rust client for the Checkout API.

use checkout_types::checkout::GatewayChoice;
use checkout_types::{
    CreateGatewayRequest, CreatePaymentMethodRequest, CreateTransactionRequest, CustomersResponse,
    Gateway, GatewayId, InvoicesResponse, PaymentLinksResponse, PaymentMethod,
    SetGatewayStatusRequest, SmsDataResponse, Transaction, TransactionWithUser,
    UpdateGatewayRequest,
};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct BootstrapResponse {
    api_key: String,
}

/// Checkout API client.
pub struct CheckoutClient {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl CheckoutClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            http: Client::new(),
        }
    }

    /// Sets the admin API key sent as a bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Creates the first admin key. Returns the raw key.
    pub async fn bootstrap(&self, name: &str) -> Result<String, ClientError> {
        let resp: BootstrapResponse = self
            .send(
                Method::POST,
                "/api/bootstrap",
                Some(&serde_json::json!({ "name": name })),
            )
            .await?;
        Ok(resp.api_key)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payment methods
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, ClientError> {
        self.get("/api/payment-methods").await
    }

    /// Payment methods for the checkout page. Any failure yields the
    /// built-in list, so the page always has something to render.
    pub async fn payment_methods_or_fallback(&self) -> Vec<PaymentMethod> {
        match self.list_payment_methods().await {
            Ok(methods) if !methods.is_empty() => methods,
            _ => PaymentMethod::fallback(),
        }
    }

    pub async fn create_payment_method(
        &self,
        req: &CreatePaymentMethodRequest,
    ) -> Result<PaymentMethod, ClientError> {
        self.send(Method::POST, "/api/payment-methods", Some(req))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Gateways
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_gateways(&self) -> Result<Vec<Gateway>, ClientError> {
        self.get("/api/gateways").await
    }

    /// Sub-method rows for a checkout tile such as `bkash`.
    pub async fn gateway_choices(&self, option: &str) -> Result<Vec<GatewayChoice>, ClientError> {
        self.get(&format!("/api/checkout/{}/gateways", option)).await
    }

    pub async fn get_gateway(&self, id: GatewayId) -> Result<Gateway, ClientError> {
        self.get(&format!("/api/gateways/{}", id)).await
    }

    pub async fn create_gateway(&self, req: &CreateGatewayRequest) -> Result<Gateway, ClientError> {
        self.send(Method::POST, "/api/gateways", Some(req)).await
    }

    pub async fn update_gateway(
        &self,
        id: GatewayId,
        patch: &UpdateGatewayRequest,
    ) -> Result<Gateway, ClientError> {
        self.send(Method::PUT, &format!("/api/gateways/{}", id), Some(patch))
            .await
    }

    pub async fn set_gateway_status(
        &self,
        id: GatewayId,
        status: bool,
    ) -> Result<Gateway, ClientError> {
        self.send(
            Method::PATCH,
            &format!("/api/gateways/{}/status", id),
            Some(&SetGatewayStatusRequest { status }),
        )
        .await
    }

    pub async fn delete_gateway(&self, id: GatewayId) -> Result<(), ClientError> {
        let resp = self
            .request(Method::DELETE, &format!("/api/gateways/{}", id))
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(ClientError::Api {
                status: status.as_u16(),
                message: error_message(body),
            })
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_transactions(&self) -> Result<Vec<TransactionWithUser>, ClientError> {
        self.get("/api/transactions").await
    }

    /// Submits a checkout. The recorded transaction is `PENDING`.
    pub async fn create_transaction(
        &self,
        req: &CreateTransactionRequest,
    ) -> Result<Transaction, ClientError> {
        self.send(Method::POST, "/api/transactions", Some(req))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Admin console
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn customers(&self) -> Result<CustomersResponse, ClientError> {
        self.get("/api/admin/customers").await
    }

    pub async fn invoices(&self) -> Result<InvoicesResponse, ClientError> {
        self.get("/api/admin/invoices").await
    }

    pub async fn payment_links(&self) -> Result<PaymentLinksResponse, ClientError> {
        self.get("/api/admin/payment-links").await
    }

    pub async fn sms_data(&self) -> Result<SmsDataResponse, ClientError> {
        self.get("/api/admin/sms-data").await
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send::<T, ()>(Method::GET, path, None).await
    }

    async fn send<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let mut req = self.request(method, path);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(ClientError::Api {
                status: status.as_u16(),
                message: error_message(body),
            })
        }
    }
}

/// The `error` field of an error body, or the raw body.
fn error_message(body: String) -> String {
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CheckoutClient::new("http://localhost:3201");
        assert_eq!(client.base_url, "http://localhost:3201");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = CheckoutClient::new("http://localhost:3201/");
        assert_eq!(client.base_url, "http://localhost:3201");
    }

    #[test]
    fn test_client_with_api_key() {
        let client = CheckoutClient::new("http://localhost:3201").with_api_key("test-key");
        assert_eq!(client.api_key, Some("test-key".to_string()));
    }

    #[test]
    fn test_error_message_prefers_error_field() {
        let body = r#"{"error":"Invalid API key","code":401}"#.to_string();
        assert_eq!(error_message(body), "Invalid API key");
        assert_eq!(error_message("Bad Gateway".into()), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_unreachable_server_falls_back() {
        // Port 9 (discard) is never an HTTP server in test environments.
        let client = CheckoutClient::new("http://127.0.0.1:9");
        let methods = client.payment_methods_or_fallback().await;
        assert_eq!(methods, PaymentMethod::fallback());
    }
}
