//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use uuid::Uuid;

use checkout_types::{
    ApiKey, ApiKeyId, CheckoutRepository, CreateGatewayRequest, CreatePaymentMethodRequest,
    CreateTransactionRequest, CreateUserRequest, Gateway, GatewayId, PaymentMethod, RepoError,
    Role, Transaction, TransactionWithUser, UpdateGatewayRequest, User,
};

use crate::types::{
    DbApiKey, DbGateway, DbPaymentMethod, DbTransactionWithUser, DbUser, GATEWAY_COLUMNS,
    GatewayColumns, minor_units, write_err,
};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:");

        // Ensure on-disk SQLite target directory exists.
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if !in_memory {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every in-memory connection is its own database; keep exactly one alive.
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_tables.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(())
    }

    async fn insert_gateway(&self, gateway: &Gateway) -> Result<(), RepoError> {
        let cols = GatewayColumns::from_domain(gateway)?;
        let sql = format!(
            "INSERT INTO gateways ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            GATEWAY_COLUMNS
        );

        sqlx::query(&sql)
            .bind(gateway.id.to_string())
            .bind(&gateway.name)
            .bind(&gateway.display_name)
            .bind(gateway.kind.as_str())
            .bind(gateway.identifier.key())
            .bind(gateway.sub_type.as_str())
            .bind(gateway.status)
            .bind(gateway.currency.to_string())
            .bind(cols.min_amount)
            .bind(cols.max_amount)
            .bind(cols.fixed_charge)
            .bind(cols.percent_charge)
            .bind(cols.fixed_discount)
            .bind(cols.percent_discount)
            .bind(&cols.config)
            .bind(&gateway.qr_code)
            .bind(&gateway.instructions)
            .bind(&gateway.logo)
            .bind(gateway.created_at)
            .bind(gateway.updated_at)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;

        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> = sqlx::query_as(
            r#"SELECT id, name, email, role, created_at FROM users WHERE email = ?"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbUser::into_domain).transpose()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CheckoutRepository for SqliteRepo {
    async fn create_gateway(&self, req: CreateGatewayRequest) -> Result<Gateway, RepoError> {
        let gateway = Gateway::new(req)?;
        self.insert_gateway(&gateway).await?;
        Ok(gateway)
    }

    async fn get_gateway(&self, id: GatewayId) -> Result<Option<Gateway>, RepoError> {
        let sql = format!("SELECT {} FROM gateways WHERE id = ?", GATEWAY_COLUMNS);

        let row: Option<DbGateway> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbGateway::into_domain).transpose()
    }

    async fn list_gateways(&self) -> Result<Vec<Gateway>, RepoError> {
        let sql = format!(
            "SELECT {} FROM gateways ORDER BY created_at DESC",
            GATEWAY_COLUMNS
        );

        let rows: Vec<DbGateway> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbGateway::into_domain).collect()
    }

    async fn update_gateway(
        &self,
        id: GatewayId,
        patch: UpdateGatewayRequest,
    ) -> Result<Gateway, RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let sql = format!("SELECT {} FROM gateways WHERE id = ?", GATEWAY_COLUMNS);
        let row: Option<DbGateway> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let mut gateway = row.ok_or(RepoError::NotFound)?.into_domain()?;
        gateway.apply(patch)?;
        let cols = GatewayColumns::from_domain(&gateway)?;

        sqlx::query(
            r#"UPDATE gateways SET name = ?, display_name = ?, kind = ?, identifier = ?, sub_type = ?,
                   status = ?, currency = ?, min_amount = ?, max_amount = ?, fixed_charge = ?,
                   percent_charge = ?, fixed_discount = ?, percent_discount = ?, config = ?,
                   qr_code = ?, instructions = ?, logo = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&gateway.name)
        .bind(&gateway.display_name)
        .bind(gateway.kind.as_str())
        .bind(gateway.identifier.key())
        .bind(gateway.sub_type.as_str())
        .bind(gateway.status)
        .bind(gateway.currency.to_string())
        .bind(cols.min_amount)
        .bind(cols.max_amount)
        .bind(cols.fixed_charge)
        .bind(cols.percent_charge)
        .bind(cols.fixed_discount)
        .bind(cols.percent_discount)
        .bind(&cols.config)
        .bind(&gateway.qr_code)
        .bind(&gateway.instructions)
        .bind(&gateway.logo)
        .bind(gateway.updated_at)
        .bind(id.to_string())
        .execute(&mut *db_tx)
        .await
        .map_err(write_err)?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(gateway)
    }

    async fn set_gateway_status(&self, id: GatewayId, status: bool) -> Result<Gateway, RepoError> {
        let result = sqlx::query(r#"UPDATE gateways SET status = ?, updated_at = ? WHERE id = ?"#)
            .bind(status)
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        self.get_gateway(id).await?.ok_or(RepoError::NotFound)
    }

    async fn delete_gateway(&self, id: GatewayId) -> Result<(), RepoError> {
        let result = sqlx::query(r#"DELETE FROM gateways WHERE id = ?"#)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_active_payment_methods(&self) -> Result<Vec<PaymentMethod>, RepoError> {
        let rows: Vec<DbPaymentMethod> = sqlx::query_as(
            r#"SELECT id, name, icon, active, config, created_at, updated_at
               FROM payment_methods WHERE active = 1 ORDER BY created_at ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbPaymentMethod::into_domain).collect()
    }

    async fn upsert_payment_method(
        &self,
        req: CreatePaymentMethodRequest,
    ) -> Result<PaymentMethod, RepoError> {
        let now = Utc::now();

        sqlx::query(
            r#"INSERT INTO payment_methods (id, name, icon, active, config, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(name) DO UPDATE SET
                   icon = excluded.icon,
                   active = excluded.active,
                   config = excluded.config,
                   updated_at = excluded.updated_at"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&req.name)
        .bind(&req.icon)
        .bind(req.active)
        .bind(req.config.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        let row: DbPaymentMethod = sqlx::query_as(
            r#"SELECT id, name, icon, active, config, created_at, updated_at
               FROM payment_methods WHERE name = ?"#,
        )
        .bind(&req.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.into_domain()
    }

    async fn create_transaction(
        &self,
        req: CreateTransactionRequest,
    ) -> Result<Transaction, RepoError> {
        let tx = Transaction::pending(req.amount, req.currency, req.method, req.user_id);

        sqlx::query(
            r#"INSERT INTO transactions (id, amount, currency, method, user_id, status, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(tx.id.to_string())
        .bind(minor_units(tx.amount)?)
        .bind(tx.currency.to_string())
        .bind(tx.method.key())
        .bind(tx.user_id.as_str())
        .bind(tx.status.as_ref())
        .bind(tx.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(tx)
    }

    async fn list_transactions(&self) -> Result<Vec<TransactionWithUser>, RepoError> {
        let rows: Vec<DbTransactionWithUser> = sqlx::query_as(
            r#"SELECT t.id, t.amount, t.currency, t.method, t.user_id, t.status, t.created_at,
                      u.name AS user_name, u.email AS user_email
               FROM transactions t
               LEFT JOIN users u ON u.id = t.user_id
               ORDER BY t.created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter()
            .map(DbTransactionWithUser::into_domain)
            .collect()
    }

    async fn create_user(&self, req: CreateUserRequest) -> Result<User, RepoError> {
        let user = User::new(req.id, req.name, req.email)?;

        sqlx::query(
            r#"INSERT INTO users (id, name, email, role, created_at) VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(user.id.as_str())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(user)
    }

    async fn list_customers(&self) -> Result<Vec<User>, RepoError> {
        let rows: Vec<DbUser> = sqlx::query_as(
            r#"SELECT id, name, email, role, created_at FROM users
               WHERE role = ? ORDER BY created_at DESC"#,
        )
        .bind(Role::User.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbUser::into_domain).collect()
    }

    async fn set_user_role(&self, email: &str, role: Role) -> Result<User, RepoError> {
        let email = email.trim().to_lowercase();

        let result = sqlx::query(r#"UPDATE users SET role = ? WHERE email = ?"#)
            .bind(role.as_str())
            .bind(&email)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        self.find_user_by_email(&email)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn create_api_key(&self, name: &str) -> Result<(ApiKey, String), RepoError> {
        let raw_key = crate::security::generate_api_key();
        let key_hash = crate::security::hash_api_key(&raw_key);
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"INSERT INTO api_keys (id, name, key_hash, is_active, created_at) VALUES (?, ?, ?, 1, ?)"#,
        )
        .bind(id.to_string())
        .bind(name)
        .bind(&key_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        let api_key = ApiKey {
            id: ApiKeyId::from_uuid(id),
            name: name.to_string(),
            key_hash,
            is_active: true,
            created_at: now,
            last_used_at: None,
        };

        Ok((api_key, raw_key))
    }

    async fn count_api_keys(&self) -> Result<i64, RepoError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM api_keys WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(row.0)
    }

    async fn verify_api_key_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, RepoError> {
        let now = Utc::now();

        let result =
            sqlx::query(r#"UPDATE api_keys SET last_used_at = ? WHERE key_hash = ? AND is_active = 1"#)
                .bind(now)
                .bind(key_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let row: Option<DbApiKey> = sqlx::query_as(
            r#"SELECT id, name, key_hash, is_active, created_at, last_used_at
               FROM api_keys WHERE key_hash = ?"#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbApiKey::into_domain).transpose()
    }
}
