//! # Checkout Types
//!
//! Domain types and port traits for the mobile-money checkout service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Gateways, payment methods, transactions, users
//! - `checkout/` - The checkout page selection state machine
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod checkout;
pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Amount, ApiKey, ApiKeyId, BankConfig, Currency, Gateway, GatewayConfig, GatewayId,
    GatewayKind, PaymentMethod, Provider, Role, SubType, Transaction, TransactionId,
    TransactionStatus, TransactionUser, TransactionWithUser, User, UserId, WalletConfig,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::CheckoutRepository;
