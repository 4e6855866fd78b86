//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, in-memory mocks) implement this trait.

use crate::domain::{
    ApiKey, Gateway, GatewayId, PaymentMethod, Role, Transaction, TransactionWithUser, User,
};
use crate::dto::{
    CreateGatewayRequest, CreatePaymentMethodRequest, CreateTransactionRequest, CreateUserRequest,
    UpdateGatewayRequest,
};
use crate::error::RepoError;

/// The storage port for the checkout service.
///
/// Each call stands alone; only `update_gateway` spans a read and a write
/// and must do both inside one database transaction.
#[async_trait::async_trait]
pub trait CheckoutRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Gateways
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates a gateway from a draft, applying create-time defaults.
    async fn create_gateway(&self, req: CreateGatewayRequest) -> Result<Gateway, RepoError>;

    /// Gets a gateway by ID.
    async fn get_gateway(&self, id: GatewayId) -> Result<Option<Gateway>, RepoError>;

    /// Lists all gateways, newest first.
    async fn list_gateways(&self) -> Result<Vec<Gateway>, RepoError>;

    /// Applies a partial update. Returns `NotFound` for an unknown ID.
    async fn update_gateway(
        &self,
        id: GatewayId,
        patch: UpdateGatewayRequest,
    ) -> Result<Gateway, RepoError>;

    /// Flips only the status column. Returns `NotFound` for an unknown ID.
    async fn set_gateway_status(&self, id: GatewayId, status: bool) -> Result<Gateway, RepoError>;

    /// Deletes a gateway. Returns `NotFound` for an unknown ID.
    async fn delete_gateway(&self, id: GatewayId) -> Result<(), RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment methods
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists payment methods with `active = true`.
    async fn list_active_payment_methods(&self) -> Result<Vec<PaymentMethod>, RepoError>;

    /// Inserts a payment method, or replaces the one with the same name.
    async fn upsert_payment_method(
        &self,
        req: CreatePaymentMethodRequest,
    ) -> Result<PaymentMethod, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────────

    /// Records a checkout submission as `PENDING`.
    async fn create_transaction(
        &self,
        req: CreateTransactionRequest,
    ) -> Result<Transaction, RepoError>;

    /// Lists all transactions with their owner's display fields, newest first.
    async fn list_transactions(&self) -> Result<Vec<TransactionWithUser>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates a user with the `user` role.
    async fn create_user(&self, req: CreateUserRequest) -> Result<User, RepoError>;

    /// Lists users with the `user` role, newest first.
    async fn list_customers(&self) -> Result<Vec<User>, RepoError>;

    /// Changes a user's role, looked up by email.
    async fn set_user_role(&self, email: &str, role: Role) -> Result<User, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Admin API keys
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates an API key, returning the stored record and the raw key.
    async fn create_api_key(&self, name: &str) -> Result<(ApiKey, String), RepoError>;

    /// Counts active API keys.
    async fn count_api_keys(&self) -> Result<i64, RepoError>;

    /// Looks up an active key by hash and stamps its last use.
    async fn verify_api_key_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, RepoError>;
}
