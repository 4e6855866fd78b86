//! Legacy payment-method listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A mobile-banking brand offered on the checkout page.
///
/// `id` and timestamps are absent on the built-in fallback entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub icon: String,
    pub active: bool,
    #[schema(value_type = Object)]
    pub config: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PaymentMethod {
    fn builtin(name: &str, icon: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            icon: icon.to_string(),
            active: true,
            config: serde_json::json!({}),
            created_at: None,
            updated_at: None,
        }
    }

    /// The list served when the store is unreachable or empty.
    pub fn fallback() -> Vec<PaymentMethod> {
        vec![
            Self::builtin("bKash", "bkash.png"),
            Self::builtin("Nagad", "nagad.png"),
            Self::builtin("Rocket", "rocket.png"),
            Self::builtin("Upay", "upay.png"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_the_four_mfs_brands_in_order() {
        let names: Vec<_> = PaymentMethod::fallback()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["bKash", "Nagad", "Rocket", "Upay"]);
    }

    #[test]
    fn test_fallback_entries_are_active() {
        assert!(PaymentMethod::fallback().iter().all(|m| m.active));
    }
}
