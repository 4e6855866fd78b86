//! User domain model.
//!
//! Users are issued by the external auth library; ids are opaque strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

/// Opaque user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::ValidationError(format!(
                "Unknown role: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a customer account record.
    ///
    /// # Validation
    /// - Name cannot be empty
    /// - Email must contain `@`
    pub fn new(id: UserId, name: String, email: String) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "User name cannot be empty".into(),
            ));
        }
        if !email.contains('@') {
            return Err(DomainError::ValidationError(format!(
                "Invalid email: {}",
                email
            )));
        }
        Ok(Self {
            id,
            name,
            email: email.trim().to_lowercase(),
            role: Role::User,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_a_customer() {
        let user = User::new(UserId::new("u1"), "Rahim".into(), "Rahim@Example.com".into()).unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.email, "rahim@example.com");
    }

    #[test]
    fn test_invalid_email_fails() {
        let result = User::new(UserId::new("u1"), "Rahim".into(), "nope".into());
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }
}
