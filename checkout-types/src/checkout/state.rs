//! Checkout page state and its reducer.

use serde::{Deserialize, Serialize};

use super::catalog::PaymentOption;

/// Placeholder order hash carried in checkout routes until orders exist.
pub const SAMPLE_ORDER_HASH: &str = "bac303ad226facb3bbea00fcc5e2a078b1cd8284";

/// Checkout type segment used for personal-account payments.
pub const PERSONAL_CHECKOUT_TYPE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    MobileBanking,
    NetBanking,
    Cards,
    Support,
    Faq,
    Transactions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Dashboard,
    PaymentDetails,
    NagadMfs,
    BkashMfs,
    RocketMfs,
    CellfinMfs,
    UpayMfs,
    IbblBanking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalPhase {
    #[default]
    Selection,
    Details,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubMethod {
    Personal,
    /// Not wired to anything yet.
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Bangla,
    English,
}

/// Pages the checkout flow can send the customer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    MfsCheckout {
        provider: String,
        checkout_type: u8,
        hash: String,
    },
    IbblCheckout,
}

impl Route {
    /// Personal-account checkout page for a provider key.
    pub fn mfs_personal(provider: &str) -> Self {
        Route::MfsCheckout {
            provider: provider.to_string(),
            checkout_type: PERSONAL_CHECKOUT_TYPE,
            hash: SAMPLE_ORDER_HASH.to_string(),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::MfsCheckout {
                provider,
                checkout_type,
                hash,
            } => format!("/checkout/mfs/{}/{}/{}", provider, checkout_type, hash),
            Route::IbblCheckout => "/checkout/ibbl".to_string(),
        }
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Navigate(Route),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetActiveTab(Tab),
    SetView(View),
    OpenModal(PaymentOption),
    CloseModal,
    SetModalPhase(ModalPhase),
    SelectSubMethod(SubMethod),
    SetLanguage(Language),
}

/// Everything the checkout page renders from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutState {
    pub active_tab: Tab,
    pub view: View,
    pub is_modal_open: bool,
    pub modal_phase: ModalPhase,
    pub selected_payment_method: Option<PaymentOption>,
    pub selected_sub_method: Option<SubMethod>,
    pub language: Language,
}

impl CheckoutState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one action, returning the next state and any navigation.
    pub fn reduce(self, action: Action) -> (Self, Option<Effect>) {
        match action {
            Action::SetActiveTab(tab) => (
                Self {
                    active_tab: tab,
                    ..self
                },
                None,
            ),
            Action::SetView(view) => (Self { view, ..self }, None),
            Action::OpenModal(method) => (
                Self {
                    is_modal_open: true,
                    selected_payment_method: Some(method),
                    modal_phase: ModalPhase::Selection,
                    selected_sub_method: None,
                    ..self
                },
                None,
            ),
            Action::CloseModal => (self.closed(), None),
            Action::SetModalPhase(phase) => (
                Self {
                    modal_phase: phase,
                    ..self
                },
                None,
            ),
            Action::SelectSubMethod(sub) => self.select_sub_method(sub),
            Action::SetLanguage(language) => (Self { language, ..self }, None),
        }
    }

    fn closed(self) -> Self {
        Self {
            is_modal_open: false,
            selected_payment_method: None,
            modal_phase: ModalPhase::Selection,
            selected_sub_method: None,
            ..self
        }
    }

    fn select_sub_method(self, sub: SubMethod) -> (Self, Option<Effect>) {
        let next = Self {
            selected_sub_method: Some(sub),
            ..self
        };
        match (sub, next.selected_payment_method.as_ref()) {
            (SubMethod::Personal, Some(method)) => {
                let route = Route::mfs_personal(&method.id);
                (next.closed(), Some(Effect::Navigate(route)))
            }
            // Live stays in the modal; a sub-method without a method has nowhere to go.
            _ => (next, None),
        }
    }

    /// Handles a click on a payment grid tile.
    ///
    /// Islami Bank has its own page, bKash and Nagad open the sub-method
    /// modal, every other option goes straight to its checkout page.
    pub fn choose(self, option: PaymentOption) -> (Self, Option<Effect>) {
        match option.id.as_str() {
            "ibbl" => (self, Some(Effect::Navigate(Route::IbblCheckout))),
            "bkash" | "nagad" => self.reduce(Action::OpenModal(option)),
            other => {
                let route = Route::mfs_personal(other);
                (self, Some(Effect::Navigate(route)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::catalog::{Grid, PaymentOption};

    fn option(id: &str) -> PaymentOption {
        Grid::ALL
            .into_iter()
            .flat_map(|g| g.options())
            .find(|o| o.id == id)
            .unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = CheckoutState::new();
        assert_eq!(state.active_tab, Tab::MobileBanking);
        assert_eq!(state.view, View::Dashboard);
        assert!(!state.is_modal_open);
        assert_eq!(state.modal_phase, ModalPhase::Selection);
        assert!(state.selected_payment_method.is_none());
        assert_eq!(state.language, Language::Bangla);
    }

    #[test]
    fn test_open_modal_selects_method() {
        let (state, effect) = CheckoutState::new().reduce(Action::OpenModal(option("nagad")));
        assert!(effect.is_none());
        assert!(state.is_modal_open);
        assert_eq!(state.modal_phase, ModalPhase::Selection);
        assert_eq!(state.selected_payment_method.unwrap().id, "nagad");
    }

    #[test]
    fn test_close_modal_resets_from_any_phase() {
        for phase in [ModalPhase::Selection, ModalPhase::Details, ModalPhase::Success] {
            let (state, _) = CheckoutState::new().reduce(Action::OpenModal(option("bkash")));
            let (state, _) = state.reduce(Action::SetModalPhase(phase));
            let (state, _) = state.reduce(Action::SelectSubMethod(SubMethod::Live));
            let (state, effect) = state.reduce(Action::CloseModal);

            assert!(effect.is_none());
            assert!(!state.is_modal_open);
            assert!(state.selected_payment_method.is_none());
            assert!(state.selected_sub_method.is_none());
            assert_eq!(state.modal_phase, ModalPhase::Selection);
        }
    }

    #[test]
    fn test_personal_navigates_and_closes() {
        let (state, _) = CheckoutState::new().reduce(Action::OpenModal(option("bkash")));
        let (state, effect) = state.reduce(Action::SelectSubMethod(SubMethod::Personal));

        assert_eq!(
            effect,
            Some(Effect::Navigate(Route::mfs_personal("bkash")))
        );
        assert!(!state.is_modal_open);
        assert!(state.selected_payment_method.is_none());
    }

    #[test]
    fn test_live_stays_in_modal() {
        let (state, _) = CheckoutState::new().reduce(Action::OpenModal(option("nagad")));
        let (state, effect) = state.reduce(Action::SelectSubMethod(SubMethod::Live));

        assert!(effect.is_none());
        assert!(state.is_modal_open);
        assert_eq!(state.selected_sub_method, Some(SubMethod::Live));
    }

    #[test]
    fn test_tab_is_independent_of_modal() {
        let (state, _) = CheckoutState::new().reduce(Action::OpenModal(option("nagad")));
        let (state, _) = state.reduce(Action::SetActiveTab(Tab::Faq));
        assert!(state.is_modal_open);
        let (state, _) = state.reduce(Action::CloseModal);
        assert_eq!(state.active_tab, Tab::Faq);
    }

    #[test]
    fn test_grid_click_routes() {
        let (state, effect) = CheckoutState::new().choose(option("ibbl"));
        assert_eq!(effect, Some(Effect::Navigate(Route::IbblCheckout)));
        assert!(!state.is_modal_open);

        let (state, effect) = CheckoutState::new().choose(option("nagad"));
        assert!(effect.is_none());
        assert!(state.is_modal_open);

        let (_, effect) = CheckoutState::new().choose(option("rocket"));
        assert_eq!(
            effect,
            Some(Effect::Navigate(Route::mfs_personal("rocket")))
        );
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(
            Route::mfs_personal("upay").path(),
            format!("/checkout/mfs/upay/1/{}", SAMPLE_ORDER_HASH)
        );
        assert_eq!(Route::IbblCheckout.path(), "/checkout/ibbl");
    }
}
