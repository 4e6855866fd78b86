//! Database row types shared by the SQLite and PostgreSQL adapters.
//!
//! Both schemas store ids and enums as TEXT, money as integer minor units and
//! gateway config as a JSON string, so one set of rows decodes from either.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use checkout_types::{
    Amount, ApiKey, ApiKeyId, Currency, Gateway, GatewayConfig, GatewayId, GatewayKind,
    PaymentMethod, Provider, RepoError, Role, SubType, Transaction, TransactionId,
    TransactionStatus, TransactionUser, TransactionWithUser, User, UserId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

pub const GATEWAY_COLUMNS: &str = "id, name, display_name, kind, identifier, sub_type, status, \
     currency, min_amount, max_amount, fixed_charge, percent_charge, fixed_discount, \
     percent_discount, config, qr_code, instructions, logo, created_at, updated_at";

/// Gateway row from database.
#[derive(FromRow)]
pub struct DbGateway {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub kind: String,
    pub identifier: String,
    pub sub_type: String,
    pub status: bool,
    pub currency: String,
    pub min_amount: i64,
    pub max_amount: i64,
    pub fixed_charge: i64,
    pub percent_charge: i64,
    pub fixed_discount: i64,
    pub percent_discount: i64,
    pub config: String,
    pub qr_code: Option<String>,
    pub instructions: Option<String>,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment method row from database.
#[derive(FromRow)]
pub struct DbPaymentMethod {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub active: bool,
    pub config: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Transaction row left-joined with its owner.
#[derive(FromRow)]
pub struct DbTransactionWithUser {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub method: String,
    pub user_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

/// User row from database.
#[derive(FromRow)]
pub struct DbUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// API key row from database.
#[derive(FromRow)]
pub struct DbApiKey {
    pub id: String,
    pub name: String,
    pub key_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

fn db_err(e: impl std::fmt::Display) -> RepoError {
    RepoError::Database(e.to_string())
}

/// Maps a failed write; unique-key violations become `Conflict`.
pub fn write_err(e: sqlx::Error) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(db.message().to_string())
        }
        _ => RepoError::Database(e.to_string()),
    }
}

pub fn parse_uuid(s: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(s).map_err(db_err)
}

fn parse_column<T>(s: &str) -> Result<T, RepoError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    s.parse::<T>().map_err(db_err)
}

fn parse_json(s: &str) -> Result<serde_json::Value, RepoError> {
    serde_json::from_str(s).map_err(db_err)
}

fn amount(units: i64) -> Result<Amount, RepoError> {
    Amount::from_minor_units(units).map_err(RepoError::Domain)
}

/// Minor units for an amount column.
pub fn minor_units(value: Amount) -> Result<i64, RepoError> {
    value.to_minor_units().map_err(RepoError::Domain)
}

/// Encoded money and config columns of a gateway.
pub struct GatewayColumns {
    pub min_amount: i64,
    pub max_amount: i64,
    pub fixed_charge: i64,
    pub percent_charge: i64,
    pub fixed_discount: i64,
    pub percent_discount: i64,
    pub config: String,
}

impl GatewayColumns {
    pub fn from_domain(g: &Gateway) -> Result<Self, RepoError> {
        Ok(Self {
            min_amount: minor_units(g.min_amount)?,
            max_amount: minor_units(g.max_amount)?,
            fixed_charge: minor_units(g.fixed_charge)?,
            percent_charge: minor_units(g.percent_charge)?,
            fixed_discount: minor_units(g.fixed_discount)?,
            percent_discount: minor_units(g.percent_discount)?,
            config: g.config.to_value().to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

impl DbGateway {
    /// Convert database row to domain Gateway.
    pub fn into_domain(self) -> Result<Gateway, RepoError> {
        let identifier: Provider = parse_column(&self.identifier)?;
        let config = GatewayConfig::parse(identifier, parse_json(&self.config)?)?;

        Ok(Gateway {
            id: GatewayId::from_uuid(parse_uuid(&self.id)?),
            name: self.name,
            display_name: self.display_name,
            kind: parse_column::<GatewayKind>(&self.kind)?,
            identifier,
            sub_type: parse_column::<SubType>(&self.sub_type)?,
            status: self.status,
            currency: parse_column::<Currency>(&self.currency)?,
            min_amount: amount(self.min_amount)?,
            max_amount: amount(self.max_amount)?,
            fixed_charge: amount(self.fixed_charge)?,
            percent_charge: amount(self.percent_charge)?,
            fixed_discount: amount(self.fixed_discount)?,
            percent_discount: amount(self.percent_discount)?,
            config,
            qr_code: self.qr_code,
            instructions: self.instructions,
            logo: self.logo,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl DbPaymentMethod {
    pub fn into_domain(self) -> Result<PaymentMethod, RepoError> {
        Ok(PaymentMethod {
            id: Some(parse_uuid(&self.id)?),
            name: self.name,
            icon: self.icon,
            active: self.active,
            config: parse_json(&self.config)?,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

impl DbTransactionWithUser {
    pub fn into_domain(self) -> Result<TransactionWithUser, RepoError> {
        let transaction = Transaction {
            id: TransactionId::from_uuid(parse_uuid(&self.id)?),
            amount: amount(self.amount)?,
            currency: parse_column::<Currency>(&self.currency)?,
            method: parse_column::<Provider>(&self.method)?,
            user_id: UserId::new(self.user_id),
            status: parse_column::<TransactionStatus>(&self.status)?,
            created_at: self.created_at,
        };

        let user = match (self.user_name, self.user_email) {
            (Some(name), Some(email)) => Some(TransactionUser { name, email }),
            _ => None,
        };

        Ok(TransactionWithUser { transaction, user })
    }
}

impl DbUser {
    pub fn into_domain(self) -> Result<User, RepoError> {
        Ok(User {
            id: UserId::new(self.id),
            name: self.name,
            email: self.email,
            role: parse_column::<Role>(&self.role)?,
            created_at: self.created_at,
        })
    }
}

impl DbApiKey {
    /// Convert database row to domain ApiKey.
    pub fn into_domain(self) -> Result<ApiKey, RepoError> {
        Ok(ApiKey {
            id: ApiKeyId::from_uuid(parse_uuid(&self.id)?),
            name: self.name,
            key_hash: self.key_hash,
            is_active: self.is_active,
            created_at: self.created_at,
            last_used_at: self.last_used_at,
        })
    }
}
