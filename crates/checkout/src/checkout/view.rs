//! Published checkout state

use std::fmt;
use std::sync::Arc;

use checkout_common::cart::{AddressRef, CartSnapshot, ShippingChoice, ShippingOption};
use checkout_common::customer::{CustomerInfo, PaymentMethodInfo, ShippingAddress};
use serde::{Deserialize, Serialize};

use crate::pricing::{self, Totals};
use crate::{CheckoutStep, ValidationError};

/// What the customer picked. Owned by the orchestrator for one checkout session.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Shipping address
    pub address: Option<AddressRef>,
    /// Shipping option
    pub shipping: Option<ShippingChoice>,
    /// Payment method
    pub payment_method_id: Option<String>,
    /// Promo code being typed
    pub promo_code_input: String,
    /// Card security code
    pub cvv: String,
}

impl fmt::Debug for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionState")
            .field("address", &self.address)
            .field("shipping", &self.shipping)
            .field("payment_method_id", &self.payment_method_id)
            .field("promo_code_input", &self.promo_code_input)
            .field("cvv", &if self.cvv.is_empty() { "" } else { "<redacted>" })
            .finish()
    }
}

/// Where the host application should send the customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Redirect {
    /// Authentication is missing or expired. Come back to `return_to` after login.
    Login {
        /// Step to resume at
        return_to: CheckoutStep,
    },
    /// Nothing left to buy, back to the store
    Store,
    /// Order placed
    OrderSuccess {
        /// Placed order
        order_id: String,
    },
}

/// User visible messages. Every failure path sets one of these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notices {
    /// Field level validation error
    pub field_error: Option<ValidationError>,
    /// Promo code rejected
    pub promo_error: Option<String>,
    /// Promo code accepted
    pub promo_success: Option<String>,
    /// Message from the last mutating call
    pub response_message: Option<String>,
    /// Reads that failed during entry
    pub load_errors: Vec<String>,
}

/// Immutable snapshot of the checkout, replaced wholesale on every change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutView {
    /// Last applied cart
    pub cart: Option<Arc<CartSnapshot>>,
    /// Currency of the cart
    pub currency: String,
    /// Logged in customer
    pub customer: Option<CustomerInfo>,
    /// Saved shipping addresses
    pub addresses: Vec<ShippingAddress>,
    /// Saved credit cards
    pub payment_methods: Vec<PaymentMethodInfo>,
    /// Shipping options for the cart
    pub shipping_options: Vec<ShippingOption>,
    /// Customer selection
    pub selection: SelectionState,
    /// Payment attached to the cart, keyed by the card security code on place
    pub payment_id: Option<String>,
    /// A cart mutation and its refreshes are in flight
    pub loading: bool,
    /// Messages
    pub notices: Notices,
    /// Pending navigation out of the checkout
    pub redirect: Option<Redirect>,
    /// Sequence number of the applied cart response
    pub cart_generation: u64,
    /// Sequence number of the applied shipping options response
    pub options_generation: u64,
}

impl CheckoutView {
    /// Shipping option matching the selection
    pub fn selected_shipping_option(&self) -> Option<&ShippingOption> {
        let choice = self.selection.shipping.as_ref()?;
        self.shipping_options
            .iter()
            .find(|option| option.choice() == *choice)
    }

    /// Saved address matching the selection
    pub fn selected_address(&self) -> Option<&ShippingAddress> {
        let selected = self.selection.address.as_ref()?;
        self.addresses
            .iter()
            .find(|address| address.address_ref() == *selected)
    }

    /// Saved card matching the selection
    pub fn selected_payment_method(&self) -> Option<&PaymentMethodInfo> {
        let selected = self.selection.payment_method_id.as_deref()?;
        self.payment_methods
            .iter()
            .find(|method| method.payment_method_id == selected)
    }

    /// Totals for the current cart and shipping selection
    pub fn totals(&self) -> Totals {
        match self.cart.as_deref() {
            Some(cart) => pricing::totals(cart, self.selected_shipping_option()),
            None => Totals::default(),
        }
    }

    /// Promo codes applied to the cart
    pub fn applied_promo_codes(&self) -> Vec<String> {
        self.cart
            .as_deref()
            .map(pricing::applied_promo_codes)
            .unwrap_or_default()
    }

    /// Order id of the cart
    pub fn order_id(&self) -> Option<&str> {
        self.cart.as_deref().and_then(CartSnapshot::order_id)
    }
}
