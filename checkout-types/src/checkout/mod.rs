//! Checkout page selection flow.
//!
//! Pure state: tabs, the payment-method modal and its phases, and the
//! mapping from grid tiles to gateways. Transitions go through
//! [`CheckoutState::reduce`], which returns navigation as an [`Effect`]
//! instead of performing it.

pub mod catalog;
pub mod state;

pub use catalog::{Grid, GatewayChoice, PaymentOption, relevant_gateways};
pub use state::{
    Action, CheckoutState, Effect, Language, ModalPhase, Route, SubMethod, Tab, View,
};
