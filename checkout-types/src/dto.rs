//! Data Transfer Objects (DTOs) for requests and responses.
//!
//! Bodies are camelCase on the wire to match the checkout frontend.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Amount, Currency, GatewayKind, Provider, SubType, User, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Gateway DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a gateway. Everything but `name` and `identifier`
/// falls back to the admin console's create-time defaults.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGatewayRequest {
    #[schema(example = "Nagad Personal")]
    pub name: String,
    /// Defaults to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: GatewayKind,
    pub identifier: Provider,
    #[serde(default)]
    pub sub_type: SubType,
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub min_amount: Amount,
    #[serde(default)]
    pub max_amount: Amount,
    #[serde(default)]
    pub fixed_charge: Amount,
    #[serde(default)]
    pub percent_charge: Amount,
    #[serde(default)]
    pub fixed_discount: Amount,
    #[serde(default)]
    pub percent_discount: Amount,
    /// Shape depends on `identifier`: `{walletNumber}` or bank fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub config: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl CreateGatewayRequest {
    /// A draft with every default applied.
    pub fn draft(name: impl Into<String>, identifier: Provider, sub_type: SubType) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            // Only the bKash checkout API is driven by an API; bank presets stay manual.
            kind: if sub_type == SubType::Api && identifier == Provider::Bkash {
                GatewayKind::Api
            } else {
                GatewayKind::Manual
            },
            identifier,
            sub_type,
            status: false,
            currency: Currency::BDT,
            min_amount: Amount::ZERO,
            max_amount: Amount::ZERO,
            fixed_charge: Amount::ZERO,
            percent_charge: Amount::ZERO,
            fixed_discount: Amount::ZERO,
            percent_discount: Amount::ZERO,
            config: None,
            qr_code: None,
            instructions: None,
            logo: None,
        }
    }
}

/// Partial gateway update. Absent fields are left unchanged; an empty string
/// clears `qrCode`, `instructions` or `logo`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGatewayRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<GatewayKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Provider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<SubType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_charge: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_charge: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_discount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_discount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub config: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Body of the enable/disable toggle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct SetGatewayStatusRequest {
    pub status: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Transaction DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Checkout submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    #[schema(example = 2200)]
    pub amount: Amount,
    #[serde(default)]
    pub currency: Currency,
    pub method: Provider,
    #[schema(value_type = String, example = "u1")]
    pub user_id: UserId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment method DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Creates or replaces (by name) a payment method.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentMethodRequest {
    #[schema(example = "bKash")]
    pub name: String,
    #[schema(example = "bkash.png")]
    pub icon: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub config: serde_json::Value,
}

fn default_active() -> bool {
    true
}

fn empty_object() -> serde_json::Value {
    serde_json::json!({})
}

// ─────────────────────────────────────────────────────────────────────────────
// User DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Registers a customer record. Used by the operator tooling; the auth
/// library owns sign-up in production.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(value_type = String)]
    pub id: UserId,
    pub name: String,
    pub email: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Admin console DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CustomersResponse {
    pub customers: Vec<User>,
    pub total: usize,
}

impl CustomersResponse {
    pub fn new(customers: Vec<User>) -> Self {
        Self {
            total: customers.len(),
            customers,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct InvoicesResponse {
    #[schema(value_type = Vec<Object>)]
    pub invoices: Vec<serde_json::Value>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PaymentLinksResponse {
    #[schema(value_type = Vec<Object>)]
    pub links: Vec<serde_json::Value>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmsDataResponse {
    #[schema(value_type = Vec<Object>)]
    pub sms_data: Vec<serde_json::Value>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_gateway_minimal_body_gets_defaults() {
        let req: CreateGatewayRequest =
            serde_json::from_str(r#"{"name":"Nagad Personal","identifier":"nagad"}"#).unwrap();
        assert_eq!(req.kind, GatewayKind::Manual);
        assert_eq!(req.sub_type, SubType::Personal);
        assert!(!req.status);
        assert_eq!(req.currency, Currency::BDT);
        assert!(req.max_amount.is_zero());
    }

    #[test]
    fn test_create_gateway_accepts_admin_console_body() {
        let body = r#"{
            "name": "Bkash Agent", "displayName": "Bkash Agent", "type": "manual",
            "identifier": "bkash", "subType": "agent", "status": false, "currency": "BDT",
            "minAmount": 0, "maxAmount": 0, "fixedCharge": 0, "percentCharge": 0,
            "fixedDiscount": 0, "percentDiscount": 0, "config": {}
        }"#;
        let req: CreateGatewayRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.sub_type, SubType::Agent);
        assert_eq!(req.identifier, Provider::Bkash);
    }

    #[test]
    fn test_draft_for_api_sub_type_is_api_kind() {
        let req = CreateGatewayRequest::draft("bKash API", Provider::Bkash, SubType::Api);
        assert_eq!(req.kind, GatewayKind::Api);
    }

    #[test]
    fn test_bank_api_draft_stays_manual() {
        let req = CreateGatewayRequest::draft("Islamic Bank (IBBL)", Provider::Ibbl, SubType::Api);
        assert_eq!(req.kind, GatewayKind::Manual);
    }

    #[test]
    fn test_sms_data_uses_camel_case() {
        let json = serde_json::to_value(SmsDataResponse::default()).unwrap();
        assert!(json.get("smsData").is_some());
    }
}
