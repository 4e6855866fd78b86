//! Payment providers and gateway account categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;

/// Provider brand a gateway belongs to. Serialized as its lowercase key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Bkash,
    Nagad,
    Rocket,
    Upay,
    Cellfin,
    /// Islami Bank Bangladesh
    Ibbl,
}

impl Provider {
    pub const ALL: [Provider; 6] = [
        Provider::Bkash,
        Provider::Nagad,
        Provider::Rocket,
        Provider::Upay,
        Provider::Cellfin,
        Provider::Ibbl,
    ];

    /// The provider key used in routes, configs and the `identifier` column.
    pub fn key(&self) -> &'static str {
        match self {
            Provider::Bkash => "bkash",
            Provider::Nagad => "nagad",
            Provider::Rocket => "rocket",
            Provider::Upay => "upay",
            Provider::Cellfin => "cellfin",
            Provider::Ibbl => "ibbl",
        }
    }

    /// Mobile financial services are wallet based; everything else is a bank.
    pub fn is_mfs(&self) -> bool {
        !matches!(self, Provider::Ibbl)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Provider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.key() == key)
            .ok_or_else(|| DomainError::UnknownProvider(s.to_string()))
    }
}

/// Account category of a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubType {
    #[default]
    Personal,
    Agent,
    Merchant,
    Api,
}

impl SubType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubType::Personal => "personal",
            SubType::Agent => "agent",
            SubType::Merchant => "merchant",
            SubType::Api => "api",
        }
    }
}

impl fmt::Display for SubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal" => Ok(SubType::Personal),
            "agent" => Ok(SubType::Agent),
            "merchant" => Ok(SubType::Merchant),
            "api" => Ok(SubType::Api),
            other => Err(DomainError::ValidationError(format!(
                "Unknown gateway sub-type: {}",
                other
            ))),
        }
    }
}

/// How a gateway collects money: manually verified transfers or a provider API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    #[default]
    Manual,
    Api,
}

impl GatewayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayKind::Manual => "manual",
            GatewayKind::Api => "api",
        }
    }
}

impl fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GatewayKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(GatewayKind::Manual),
            "api" => Ok(GatewayKind::Api),
            other => Err(DomainError::ValidationError(format!(
                "Unknown gateway type: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_keys_parse_back() {
        for provider in Provider::ALL {
            assert_eq!(provider.key().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_unknown_provider() {
        let result = "visa".parse::<Provider>();
        assert!(matches!(result, Err(DomainError::UnknownProvider(_))));
    }

    #[test]
    fn test_only_ibbl_is_a_bank() {
        assert!(Provider::Nagad.is_mfs());
        assert!(!Provider::Ibbl.is_mfs());
    }

    #[test]
    fn test_sub_type_serde_is_lowercase() {
        let json = serde_json::to_string(&SubType::Merchant).unwrap();
        assert_eq!(json, "\"merchant\"");
    }
}
