//! Domain models for the checkout service.

pub mod api_key;
pub mod gateway;
pub mod money;
pub mod payment_method;
pub mod provider;
pub mod transaction;
pub mod user;

pub use api_key::{ApiKey, ApiKeyId};
pub use gateway::{BankConfig, Gateway, GatewayConfig, GatewayId, WalletConfig};
pub use money::{Amount, Currency};
pub use payment_method::PaymentMethod;
pub use provider::{GatewayKind, Provider, SubType};
pub use transaction::{
    Transaction, TransactionId, TransactionStatus, TransactionUser, TransactionWithUser,
};
pub use user::{Role, User, UserId};
