//! Checkout Application Service
//!
//! Orchestrates domain operations through the repository port.
//! Contains NO infrastructure logic - pure business orchestration.
//!
//! Listing endpoints the checkout page depends on degrade to fixed
//! fallbacks instead of failing, so a store outage never blanks the page.

use checkout_types::checkout::{GatewayChoice, Grid, relevant_gateways};
use checkout_types::{
    AppError, CheckoutRepository, CreateGatewayRequest, CreatePaymentMethodRequest,
    CreateTransactionRequest, CustomersResponse, Gateway, GatewayId, InvoicesResponse,
    PaymentLinksResponse, PaymentMethod, SmsDataResponse, Transaction, TransactionWithUser,
    UpdateGatewayRequest,
};

/// Application service for checkout operations.
///
/// Generic over `R: CheckoutRepository` - the adapter is injected at compile time.
pub struct CheckoutService<R: CheckoutRepository> {
    repo: R,
}

impl<R: CheckoutRepository> CheckoutService<R> {
    /// Creates a new checkout service with the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Gateways
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists all gateways, newest first. A store failure yields an empty list.
    pub async fn list_gateways(&self) -> Vec<Gateway> {
        match self.repo.list_gateways().await {
            Ok(gateways) => gateways,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list gateways, serving empty list");
                Vec::new()
            }
        }
    }

    /// Gets a gateway by ID.
    pub async fn get_gateway(&self, id: GatewayId) -> Result<Gateway, AppError> {
        self.repo
            .get_gateway(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Gateway {}", id))))
    }

    /// Creates a gateway from an admin draft.
    pub async fn create_gateway(&self, req: CreateGatewayRequest) -> Result<Gateway, AppError> {
        let gateway = self.repo.create_gateway(req).await?;
        tracing::info!(gateway_id = %gateway.id, identifier = %gateway.identifier, "Gateway created");
        Ok(gateway)
    }

    /// Applies a partial update to a gateway.
    pub async fn update_gateway(
        &self,
        id: GatewayId,
        patch: UpdateGatewayRequest,
    ) -> Result<Gateway, AppError> {
        self.repo
            .update_gateway(id, patch)
            .await
            .map_err(|e| not_found_as(e, "Gateway", id))
    }

    /// Enables or disables a gateway.
    pub async fn set_gateway_status(&self, id: GatewayId, status: bool) -> Result<Gateway, AppError> {
        let gateway = self
            .repo
            .set_gateway_status(id, status)
            .await
            .map_err(|e| not_found_as(e, "Gateway", id))?;
        tracing::info!(gateway_id = %id, status, "Gateway status changed");
        Ok(gateway)
    }

    /// Deletes a gateway permanently.
    pub async fn delete_gateway(&self, id: GatewayId) -> Result<(), AppError> {
        self.repo
            .delete_gateway(id)
            .await
            .map_err(|e| not_found_as(e, "Gateway", id))?;
        tracing::info!(gateway_id = %id, "Gateway deleted");
        Ok(())
    }

    /// Gateways offered for a checkout tile, never empty.
    pub async fn gateway_choices(&self, option_id: &str) -> Result<Vec<GatewayChoice>, AppError> {
        let option = Grid::find_option(option_id).ok_or_else(|| {
            AppError::NotFound(format!("Payment option {}", option_id))
        })?;
        let gateways = self.list_gateways().await;
        Ok(relevant_gateways(&gateways, &option))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment methods
    // ─────────────────────────────────────────────────────────────────────────────

    /// Active payment methods, or the built-in list when the store fails or is empty.
    pub async fn list_active_payment_methods(&self) -> Vec<PaymentMethod> {
        match self.repo.list_active_payment_methods().await {
            Ok(methods) if !methods.is_empty() => methods,
            Ok(_) => {
                tracing::debug!("No payment methods stored, serving defaults");
                PaymentMethod::fallback()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list payment methods, serving defaults");
                PaymentMethod::fallback()
            }
        }
    }

    /// Creates or replaces (by name) a payment method.
    pub async fn create_payment_method(
        &self,
        req: CreatePaymentMethodRequest,
    ) -> Result<PaymentMethod, AppError> {
        if req.name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Payment method name cannot be empty".into(),
            ));
        }
        if req.icon.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Payment method icon cannot be empty".into(),
            ));
        }

        self.repo.upsert_payment_method(req).await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────────

    /// Records a checkout submission. The transaction always starts `PENDING`.
    pub async fn create_transaction(
        &self,
        req: CreateTransactionRequest,
    ) -> Result<Transaction, AppError> {
        if req.amount.is_zero() {
            return Err(AppError::BadRequest("Amount must be positive".into()));
        }
        if req.user_id.as_str().trim().is_empty() {
            return Err(AppError::BadRequest("User id cannot be empty".into()));
        }

        let tx = self.repo.create_transaction(req).await?;
        tracing::info!(transaction_id = %tx.id, method = %tx.method, amount = %tx.amount, "Transaction recorded");
        Ok(tx)
    }

    /// Lists all transactions with their owner, newest first.
    pub async fn list_transactions(&self) -> Result<Vec<TransactionWithUser>, AppError> {
        self.repo.list_transactions().await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Admin console
    // ─────────────────────────────────────────────────────────────────────────────

    /// Customers for the admin console. A store failure yields an empty page.
    pub async fn list_customers(&self) -> CustomersResponse {
        match self.repo.list_customers().await {
            Ok(customers) => CustomersResponse::new(customers),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list customers, serving empty list");
                CustomersResponse::default()
            }
        }
    }

    /// Invoices are not stored yet.
    pub fn list_invoices(&self) -> InvoicesResponse {
        InvoicesResponse::default()
    }

    /// Payment links are not stored yet.
    pub fn list_payment_links(&self) -> PaymentLinksResponse {
        PaymentLinksResponse::default()
    }

    /// SMS records are not stored yet.
    pub fn list_sms_data(&self) -> SmsDataResponse {
        SmsDataResponse::default()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Admin keys
    // ─────────────────────────────────────────────────────────────────────────────

    /// Issues the first admin key. Refused once any key exists.
    pub async fn bootstrap(&self, name: &str) -> Result<String, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Key name cannot be empty".into()));
        }

        let key_count = self.repo.count_api_keys().await?;
        if key_count > 0 {
            return Err(AppError::Conflict(
                "Bootstrap not allowed: API keys already exist".into(),
            ));
        }

        let (api_key, raw_key) = self.repo.create_api_key(name).await?;
        tracing::info!(key_id = %api_key.id, "Bootstrap API key issued");
        Ok(raw_key)
    }

    /// Whether `raw_key` belongs to an active admin key.
    pub async fn is_admin(&self, raw_key: &str) -> Result<bool, AppError> {
        let key_hash = checkout_repo::security::hash_api_key(raw_key);
        let key = self.repo.verify_api_key_hash(&key_hash).await?;
        Ok(key.is_some())
    }
}

fn not_found_as(err: checkout_types::RepoError, what: &str, id: GatewayId) -> AppError {
    match err {
        checkout_types::RepoError::NotFound => AppError::NotFound(format!("{} {}", what, id)),
        other => other.into(),
    }
}
