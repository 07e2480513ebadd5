//! Storefront checkout engine
//!
//! Drives a multi-step purchase (address, shipping, billing, review, placement)
//! against a server-authoritative cart. The [`Checkout`] orchestrator owns the
//! customer's selection, sequences calls through a [`CartConnector`], keeps the
//! current step in a [`Navigator`] and publishes every change as a fresh
//! [`CheckoutView`].
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod cart_connector;
pub mod checkout;
pub mod navigator;
pub mod pricing;
pub mod validation;

#[cfg(test)]
mod test_utils;

/// Re-export common types
#[doc(hidden)]
pub use checkout_common::{
    cart, customer, ensure_checkout,
    error::{self, Error, ValidationError},
    session, step, store_url, util, CheckoutStep, Decimal, Session, SessionCredential, StoreUrl,
};

pub use self::cart_connector::{CartConnector, HttpClient};
pub use self::checkout::{
    Checkout, CheckoutConfig, CheckoutView, Notices, PlaceOrderOutcome, Redirect, SelectionState,
};
pub use self::navigator::{FragmentRepresentation, Location, MemoryLocation, Navigator};
pub use self::pricing::Totals;
