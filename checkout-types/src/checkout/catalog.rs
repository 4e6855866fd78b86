//! Payment options shown on the checkout grids and the gateways behind them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Gateway, GatewayId, SubType};

/// A tile on one of the checkout grids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOption {
    /// Provider key, e.g. `nagad`
    pub id: String,
    pub name: String,
    pub img: String,
}

impl PaymentOption {
    fn new(id: &str, name: &str, img: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            img: img.to_string(),
        }
    }
}

/// The grids rendered under the mobile banking, cards and net banking tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grid {
    MobileBanking,
    Cards,
    NetBanking,
}

impl Grid {
    pub const ALL: [Grid; 3] = [Grid::MobileBanking, Grid::Cards, Grid::NetBanking];

    /// Looks a tile up by id across every grid.
    pub fn find_option(id: &str) -> Option<PaymentOption> {
        Grid::ALL
            .iter()
            .flat_map(|grid| grid.options())
            .find(|option| option.id == id)
    }

    pub fn options(&self) -> Vec<PaymentOption> {
        match self {
            Grid::MobileBanking => vec![
                PaymentOption::new("bkash", "bKash", "/assets/bkash.png"),
                PaymentOption::new("nagad", "Nagad", "/assets/nagad.png"),
                PaymentOption::new("rocket", "Rocket", "/assets/rocket.png"),
                PaymentOption::new("upay", "Upay", "/assets/upay.png"),
                PaymentOption::new("cellfin", "Cellfin", "/assets/cellfin.png"),
            ],
            Grid::Cards => vec![
                PaymentOption::new("visa", "Visa", "/assets/cards.png"),
                PaymentOption::new("mastercard", "Mastercard", "/assets/cards.png"),
            ],
            Grid::NetBanking => vec![PaymentOption::new("ibbl", "Islami Bank", "/assets/ibbl.png")],
        }
    }
}

/// One row of the sub-method list in the selection modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewayChoice {
    /// `None` for the built-in default entry
    pub gateway_id: Option<GatewayId>,
    pub display_name: String,
    pub sub_type: SubType,
}

impl GatewayChoice {
    /// Entry shown when no active gateway is configured for the option.
    pub fn default_for(option: &PaymentOption) -> Self {
        Self {
            gateway_id: None,
            display_name: format!("{} Personal", option.name),
            sub_type: SubType::Personal,
        }
    }
}

impl From<&Gateway> for GatewayChoice {
    fn from(g: &Gateway) -> Self {
        Self {
            gateway_id: Some(g.id),
            display_name: g.display_name.clone(),
            sub_type: g.sub_type,
        }
    }
}

/// Active gateways grouped under `option`'s provider, by identifier.
/// Never empty: falls back to a single default entry.
pub fn relevant_gateways(gateways: &[Gateway], option: &PaymentOption) -> Vec<GatewayChoice> {
    let choices: Vec<GatewayChoice> = gateways
        .iter()
        .filter(|g| g.status && g.identifier.key() == option.id)
        .map(GatewayChoice::from)
        .collect();

    if choices.is_empty() {
        vec![GatewayChoice::default_for(option)]
    } else {
        choices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Gateway, Provider};
    use crate::dto::{CreateGatewayRequest, UpdateGatewayRequest};

    fn nagad() -> PaymentOption {
        Grid::MobileBanking
            .options()
            .into_iter()
            .find(|o| o.id == "nagad")
            .unwrap()
    }

    fn gateway(name: &str, provider: Provider, sub_type: SubType, status: bool) -> Gateway {
        let mut req = CreateGatewayRequest::draft(name, provider, sub_type);
        req.status = status;
        Gateway::new(req).unwrap()
    }

    #[test]
    fn test_mobile_grid_order() {
        let ids: Vec<_> = Grid::MobileBanking
            .options()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, ["bkash", "nagad", "rocket", "upay", "cellfin"]);
    }

    #[test]
    fn test_only_active_gateways_of_the_provider_are_relevant() {
        let gateways = vec![
            gateway("Nagad Personal", Provider::Nagad, SubType::Personal, true),
            gateway("Nagad Agent", Provider::Nagad, SubType::Agent, false),
            gateway("Bkash Personal", Provider::Bkash, SubType::Personal, true),
        ];

        let choices = relevant_gateways(&gateways, &nagad());

        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].display_name, "Nagad Personal");
        assert_eq!(choices[0].gateway_id, Some(gateways[0].id));
    }

    #[test]
    fn test_find_option_searches_every_grid() {
        assert_eq!(Grid::find_option("ibbl").unwrap().name, "Islami Bank");
        assert_eq!(Grid::find_option("visa").unwrap().img, "/assets/cards.png");
        assert!(Grid::find_option("paypal").is_none());
    }

    #[test]
    fn test_no_gateways_falls_back_to_default_entry() {
        let choices = relevant_gateways(&[], &nagad());
        assert_eq!(choices, vec![GatewayChoice::default_for(&nagad())]);
        assert!(choices[0].gateway_id.is_none());
    }

    #[test]
    fn test_enabling_a_gateway_makes_it_eligible() {
        let mut g = gateway("Nagad Personal", Provider::Nagad, SubType::Personal, false);
        assert!(relevant_gateways(std::slice::from_ref(&g), &nagad())[0]
            .gateway_id
            .is_none());

        g.apply(UpdateGatewayRequest {
            status: Some(true),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            relevant_gateways(std::slice::from_ref(&g), &nagad())[0].gateway_id,
            Some(g.id)
        );
    }
}
