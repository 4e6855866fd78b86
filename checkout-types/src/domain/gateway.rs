//! Gateway domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::money::{Amount, Currency};
use super::provider::{GatewayKind, Provider, SubType};
use crate::dto::{CreateGatewayRequest, UpdateGatewayRequest};
use crate::error::DomainError;

/// Unique identifier for a Gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct GatewayId(Uuid);

impl GatewayId {
    /// Creates a new random GatewayId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a GatewayId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for GatewayId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GatewayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GatewayId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Receiving wallet for mobile financial services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WalletConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_number: Option<String>,
}

/// Receiving account for bank transfers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BankConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_code: Option<String>,
    /// Contact number; the admin form writes it for every provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_number: Option<String>,
}

/// Provider-specific gateway settings. The variant is decided by the
/// gateway's identifier, so it serializes as a plain object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum GatewayConfig {
    Wallet(WalletConfig),
    Bank(BankConfig),
}

impl GatewayConfig {
    /// Empty settings of the right shape for `provider`.
    pub fn empty_for(provider: Provider) -> Self {
        if provider.is_mfs() {
            GatewayConfig::Wallet(WalletConfig::default())
        } else {
            GatewayConfig::Bank(BankConfig::default())
        }
    }

    /// Parses a JSON object into the shape `provider` expects.
    /// `null` yields the empty shape.
    pub fn parse(provider: Provider, value: serde_json::Value) -> Result<Self, DomainError> {
        if value.is_null() {
            return Ok(Self::empty_for(provider));
        }
        let mismatch = |e: serde_json::Error| DomainError::ConfigMismatch {
            provider,
            reason: e.to_string(),
        };
        if provider.is_mfs() {
            serde_json::from_value(value)
                .map(GatewayConfig::Wallet)
                .map_err(mismatch)
        } else {
            serde_json::from_value(value)
                .map(GatewayConfig::Bank)
                .map_err(mismatch)
        }
    }

    /// Whether these settings have the shape `provider` expects.
    pub fn fits(&self, provider: Provider) -> bool {
        matches!(
            (self, provider.is_mfs()),
            (GatewayConfig::Wallet(_), true) | (GatewayConfig::Bank(_), false)
        )
    }

    pub fn to_value(&self) -> serde_json::Value {
        // Both variants are plain structs of optional strings.
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}

/// A configured payment channel, e.g. "Nagad Personal".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", try_from = "GatewayWire")]
pub struct Gateway {
    pub id: GatewayId,
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: GatewayKind,
    pub identifier: Provider,
    pub sub_type: SubType,
    /// Active gateways are offered at checkout.
    pub status: bool,
    pub currency: Currency,
    pub min_amount: Amount,
    /// Zero means no upper limit.
    pub max_amount: Amount,
    pub fixed_charge: Amount,
    pub percent_charge: Amount,
    pub fixed_discount: Amount,
    pub percent_discount: Amount,
    #[schema(value_type = Object)]
    pub config: GatewayConfig,
    pub qr_code: Option<String>,
    pub instructions: Option<String>,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire form used to decode a gateway; `config` is resolved against `identifier`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayWire {
    id: GatewayId,
    name: String,
    display_name: String,
    #[serde(rename = "type")]
    kind: GatewayKind,
    identifier: Provider,
    sub_type: SubType,
    status: bool,
    currency: Currency,
    min_amount: Amount,
    max_amount: Amount,
    fixed_charge: Amount,
    percent_charge: Amount,
    fixed_discount: Amount,
    percent_discount: Amount,
    #[serde(default)]
    config: serde_json::Value,
    qr_code: Option<String>,
    instructions: Option<String>,
    logo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<GatewayWire> for Gateway {
    type Error = DomainError;

    fn try_from(w: GatewayWire) -> Result<Self, Self::Error> {
        let config = GatewayConfig::parse(w.identifier, w.config)?;
        Ok(Gateway {
            id: w.id,
            name: w.name,
            display_name: w.display_name,
            kind: w.kind,
            identifier: w.identifier,
            sub_type: w.sub_type,
            status: w.status,
            currency: w.currency,
            min_amount: w.min_amount,
            max_amount: w.max_amount,
            fixed_charge: w.fixed_charge,
            percent_charge: w.percent_charge,
            fixed_discount: w.fixed_discount,
            percent_discount: w.percent_discount,
            config,
            qr_code: w.qr_code,
            instructions: w.instructions,
            logo: w.logo,
            created_at: w.created_at,
            updated_at: w.updated_at,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl Gateway {
    /// Creates a gateway from an admin draft, filling the create-time defaults.
    ///
    /// # Validation
    /// - Name cannot be empty
    /// - Config must match the identifier's shape
    /// - Limits and percentages must be consistent
    pub fn new(req: CreateGatewayRequest) -> Result<Self, DomainError> {
        if req.name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Gateway name cannot be empty".into(),
            ));
        }

        let config = GatewayConfig::parse(req.identifier, req.config.unwrap_or_default())?;
        let now = Utc::now();
        let display_name = non_blank(req.display_name).unwrap_or_else(|| req.name.clone());

        let gateway = Self {
            id: GatewayId::new(),
            name: req.name,
            display_name,
            kind: req.kind,
            identifier: req.identifier,
            sub_type: req.sub_type,
            status: req.status,
            currency: req.currency,
            min_amount: req.min_amount,
            max_amount: req.max_amount,
            fixed_charge: req.fixed_charge,
            percent_charge: req.percent_charge,
            fixed_discount: req.fixed_discount,
            percent_discount: req.percent_discount,
            config,
            qr_code: non_blank(req.qr_code),
            instructions: non_blank(req.instructions),
            logo: non_blank(req.logo),
            created_at: now,
            updated_at: now,
        };
        gateway.validate()?;
        Ok(gateway)
    }

    /// Applies a partial update. Fields absent from the patch are kept.
    ///
    /// Changing the identifier without a new config resets the config to the
    /// new provider's empty shape when the old shape no longer fits.
    pub fn apply(&mut self, patch: UpdateGatewayRequest) -> Result<(), DomainError> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::ValidationError(
                    "Gateway name cannot be empty".into(),
                ));
            }
            self.name = name;
        }
        if let Some(display_name) = patch.display_name {
            self.display_name = display_name;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(identifier) = patch.identifier {
            self.identifier = identifier;
        }
        if let Some(sub_type) = patch.sub_type {
            self.sub_type = sub_type;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(v) = patch.min_amount {
            self.min_amount = v;
        }
        if let Some(v) = patch.max_amount {
            self.max_amount = v;
        }
        if let Some(v) = patch.fixed_charge {
            self.fixed_charge = v;
        }
        if let Some(v) = patch.percent_charge {
            self.percent_charge = v;
        }
        if let Some(v) = patch.fixed_discount {
            self.fixed_discount = v;
        }
        if let Some(v) = patch.percent_discount {
            self.percent_discount = v;
        }

        match patch.config {
            Some(value) => self.config = GatewayConfig::parse(self.identifier, value)?,
            None if !self.config.fits(self.identifier) => {
                self.config = GatewayConfig::empty_for(self.identifier)
            }
            None => {}
        }

        // Empty text clears the field.
        if let Some(qr_code) = patch.qr_code {
            self.qr_code = non_blank(Some(qr_code));
        }
        if let Some(instructions) = patch.instructions {
            self.instructions = non_blank(Some(instructions));
        }
        if let Some(logo) = patch.logo {
            self.logo = non_blank(Some(logo));
        }

        self.validate()?;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn validate(&self) -> Result<(), DomainError> {
        if !self.max_amount.is_zero() && self.min_amount > self.max_amount {
            return Err(DomainError::ValidationError(format!(
                "Minimum amount {} exceeds maximum amount {}",
                self.min_amount, self.max_amount
            )));
        }
        let hundred = Amount::whole(100);
        if self.percent_charge > hundred || self.percent_discount > hundred {
            return Err(DomainError::ValidationError(
                "Percentages cannot exceed 100".into(),
            ));
        }
        Ok(())
    }
}
