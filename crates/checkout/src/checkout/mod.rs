//! Checkout orchestrator
//!
//! [`Checkout`] is the stateful glue of one checkout session. It owns the
//! customer's [`SelectionState`] and the cached cart, enforces the step
//! preconditions, sequences calls through the [`CartConnector`] and drives the
//! [`Navigator`]. Every change is published as a new [`CheckoutView`] on a
//! `watch` channel.
//!
//! Responses are tagged with a session-local sequence number. A cart or
//! shipping-options response older than the one already applied is dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use checkout_common::cart::{AddressRef, CartSnapshot, ShippingChoice, ShippingOption};
use checkout_common::customer::ShippingAddress;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::instrument;

use self::compensation::CompensationContext;
use crate::cart_connector::CartConnector;
use crate::navigator::Navigator;
use crate::pricing;
use crate::{CheckoutStep, Error, Session, ValidationError};

mod compensation;
mod items;
mod place_order;
mod promo;
mod steps;
mod view;

pub use self::place_order::PlaceOrderOutcome;
pub use self::view::{CheckoutView, Notices, Redirect, SelectionState};

/// Shipping method preselected when the customer has not chosen one
pub const DEFAULT_PREFERRED_SHIPPING: &str = "Ground Parcel";
/// Currency used until the cart reports one
pub const DEFAULT_CURRENCY: &str = "USD";
/// Shown for failures that may go away when the customer tries again
pub const TRY_AGAIN_MESSAGE: &str = "The store could not be reached, please try again";

/// Checkout settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Description of the shipping option to preselect
    pub preferred_shipping_description: Option<String>,
    /// Currency used until the cart reports one
    pub default_currency: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            preferred_shipping_description: Some(DEFAULT_PREFERRED_SHIPPING.to_string()),
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Clears the loading flag when dropped
struct LoadingGuard<'a> {
    view: &'a watch::Sender<CheckoutView>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.view.send_modify(|view| view.loading = false);
    }
}

/// Checkout session
#[derive(Debug)]
pub struct Checkout {
    client: Arc<dyn CartConnector>,
    session: Session,
    navigator: Navigator,
    config: CheckoutConfig,
    view: watch::Sender<CheckoutView>,
    placing: AtomicBool,
    sequence: AtomicU64,
}

impl Checkout {
    /// Create new [`Checkout`]
    pub fn new(
        client: Arc<dyn CartConnector>,
        session: Session,
        navigator: Navigator,
        config: CheckoutConfig,
    ) -> Self {
        let (view, _) = watch::channel(CheckoutView {
            currency: config.default_currency.clone(),
            ..Default::default()
        });

        Self {
            client,
            session,
            navigator,
            config,
            view,
            placing: AtomicBool::new(false),
            sequence: AtomicU64::new(0),
        }
    }

    /// Listen for view changes
    pub fn subscribe(&self) -> watch::Receiver<CheckoutView> {
        self.view.subscribe()
    }

    /// Copy of the current view
    pub fn view(&self) -> CheckoutView {
        self.view.borrow().clone()
    }

    /// Step navigator
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Session credential handle
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current step
    pub fn current_step(&self) -> CheckoutStep {
        self.navigator.current()
    }

    /// Forward an external location change (back/forward) to the navigator
    pub fn on_location_changed(&self) -> CheckoutStep {
        self.navigator.on_location_changed()
    }

    /// Enter the checkout.
    ///
    /// Without an api key the customer is sent to login and the current step
    /// is remembered. Otherwise customer info, shipping options, saved
    /// addresses and saved cards load concurrently; once all of them settled
    /// the cart is loaded and drives preselection. A failed list is reported
    /// and treated as empty.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> Result<(), Error> {
        if !self.session.is_authenticated().await {
            tracing::info!("Checkout entered without an api key");
            self.redirect_to_login().await;
            return Err(Error::AuthExpired);
        }

        let _loading = self.start_loading();
        self.view.send_modify(|view| {
            view.redirect = None;
            view.notices.load_errors.clear();
        });

        let (customer, options, addresses, methods) = tokio::join!(
            self.client.get_customer_info(),
            self.load_shipping_options(),
            self.client.get_shipping_addresses(),
            self.client.get_payment_methods(),
        );

        let mut load_errors = Vec::new();
        let mut auth_expired = false;
        let customer = settle("customer info", customer, &mut load_errors, &mut auth_expired);
        settle("shipping options", options, &mut load_errors, &mut auth_expired);
        let addresses = settle("addresses", addresses, &mut load_errors, &mut auth_expired);
        let methods = settle("payment methods", methods, &mut load_errors, &mut auth_expired);

        self.view.send_modify(|view| {
            view.customer = customer;
            view.addresses = addresses.unwrap_or_default();
            view.payment_methods = methods.unwrap_or_default();
            view.notices.load_errors = load_errors;
        });

        if auth_expired {
            self.redirect_to_login().await;
            return Err(Error::AuthExpired);
        }

        if let Err(err) = self.load_cart().await {
            self.surface(&err).await;
            return Err(err);
        }

        Ok(())
    }

    /// Complete a login started by a [`Redirect::Login`]: install the new
    /// credential, return to the remembered step and enter the checkout again.
    #[instrument(skip_all)]
    pub async fn resume_after_login(
        &self,
        api_key: String,
        session_token: Option<String>,
    ) -> Result<CheckoutStep, Error> {
        self.session.authenticate(api_key, session_token).await;
        self.view.send_modify(|view| view.redirect = None);

        if let Some(step) = self.session.take_destination().await {
            self.navigator.advance_to(step);
        }

        self.bootstrap().await?;
        Ok(self.navigator.current())
    }

    /// Select the shipping address
    pub fn select_address(&self, address: AddressRef) {
        self.update_selection(|selection| selection.address = Some(address));
    }

    /// Select the shipping option
    pub fn select_shipping(&self, choice: ShippingChoice) {
        self.update_selection(|selection| selection.shipping = Some(choice));
    }

    /// Select the payment method
    pub fn select_payment_method(&self, payment_method_id: impl Into<String>) {
        let payment_method_id = payment_method_id.into();
        self.update_selection(|selection| selection.payment_method_id = Some(payment_method_id));
    }

    /// Promo code as typed
    pub fn set_promo_code_input(&self, code: impl Into<String>) {
        let code = code.into();
        self.update_selection(|selection| selection.promo_code_input = code);
    }

    /// Card security code as typed
    pub fn set_cvv(&self, cvv: impl Into<String>) {
        let cvv = cvv.into();
        self.update_selection(|selection| selection.cvv = cvv);
    }

    /// An address was created or edited outside the checkout: select it and
    /// reload the saved addresses.
    #[instrument(skip(self))]
    pub async fn on_address_upserted(&self, address: AddressRef) -> Result<(), Error> {
        self.select_address(address);

        match self.client.get_shipping_addresses().await {
            Ok(addresses) => {
                self.view.send_modify(|view| view.addresses = addresses);
                Ok(())
            }
            Err(err) => {
                self.surface(&err).await;
                Err(err)
            }
        }
    }

    /// A card was added or edited outside the checkout: reload the saved
    /// cards and select `payment_method_id`, or the first card.
    #[instrument(skip(self))]
    pub async fn on_payment_method_set(&self, payment_method_id: Option<String>) -> Result<(), Error> {
        let methods = match self.client.get_payment_methods().await {
            Ok(methods) => methods,
            Err(err) => {
                self.surface(&err).await;
                return Err(err);
            }
        };

        self.view.send_modify(|view| {
            let selected = payment_method_id
                .or_else(|| methods.first().map(|method| method.payment_method_id.clone()));
            if selected.is_some() {
                view.selection.payment_method_id = selected;
            }
            view.payment_methods = methods;
        });
        Ok(())
    }

    fn update_selection(&self, update: impl FnOnce(&mut SelectionState)) {
        self.view.send_modify(|view| {
            update(&mut view.selection);
            view.notices.field_error = None;
            view.notices.response_message = None;
        });
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn start_loading(&self) -> LoadingGuard<'_> {
        self.view.send_modify(|view| view.loading = true);
        LoadingGuard { view: &self.view }
    }

    fn compensation_context(&self) -> CompensationContext<'_> {
        CompensationContext {
            view: &self.view,
            navigator: &self.navigator,
        }
    }

    /// Fetch the cart and apply it unless a newer response was applied first
    pub(crate) async fn load_cart(&self) -> Result<(), Error> {
        let sequence = self.next_sequence();
        let cart = self.client.get_info().await?;
        let default_currency = self.config.default_currency.as_str();

        let applied = self.view.send_if_modified(|view| {
            if sequence <= view.cart_generation {
                return false;
            }
            view.cart_generation = sequence;
            apply_cart(view, cart, default_currency);
            true
        });

        if !applied {
            tracing::debug!("Discarding stale cart response {}", sequence);
        }
        Ok(())
    }

    /// Fetch the shipping options and apply them unless a newer response was
    /// applied first
    pub(crate) async fn load_shipping_options(&self) -> Result<(), Error> {
        let sequence = self.next_sequence();
        let options = self.client.list_shipping_options().await?;
        let preferred = self.config.preferred_shipping_description.as_deref();

        let applied = self.view.send_if_modified(|view| {
            if sequence <= view.options_generation {
                return false;
            }
            view.options_generation = sequence;
            apply_shipping_options(view, options, preferred);
            true
        });

        if !applied {
            tracing::debug!("Discarding stale shipping options response {}", sequence);
        }
        Ok(())
    }

    /// Refresh cart and shipping options concurrently
    pub(crate) async fn refresh_cart_and_options(&self) -> Result<(), Error> {
        let (cart, options) = tokio::join!(self.load_cart(), self.load_shipping_options());
        if let Err(err) = cart.and(options) {
            self.surface(&err).await;
            return Err(err);
        }
        Ok(())
    }

    async fn redirect_to_login(&self) {
        let return_to = self.navigator.current();
        self.session.remember_destination(return_to).await;
        self.view.send_modify(|view| {
            view.redirect = Some(Redirect::Login { return_to });
            view.notices.response_message = Some(Error::AuthExpired.to_string());
        });
    }

    /// Make a failure visible to the customer
    pub(crate) async fn surface(&self, err: &Error) {
        match err {
            Error::AuthExpired => self.redirect_to_login().await,
            Error::Validation(validation) => {
                let validation = validation.clone();
                self.view
                    .send_modify(|view| view.notices.field_error = Some(validation));
            }
            Error::DomainRejection(message) => {
                let message = message.clone();
                self.view
                    .send_modify(|view| view.notices.response_message = Some(message));
            }
            other => {
                tracing::warn!("Checkout call failed: {}", other);
                let message = if other.is_retryable() {
                    TRY_AGAIN_MESSAGE.to_string()
                } else {
                    other.to_string()
                };
                self.view
                    .send_modify(|view| view.notices.response_message = Some(message));
            }
        }
    }

    /// Record a validation failure and turn it into an [`Error`]
    pub(crate) async fn reject(&self, err: ValidationError) -> Error {
        tracing::debug!("Validation failed: {}", err);
        let err = Error::Validation(err);
        self.surface(&err).await;
        err
    }
}

fn settle<T>(
    what: &str,
    result: Result<T, Error>,
    load_errors: &mut Vec<String>,
    auth_expired: &mut bool,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(Error::AuthExpired) => {
            *auth_expired = true;
            None
        }
        Err(err) => {
            tracing::warn!("Could not load {}: {}", what, err);
            load_errors.push(format!("Could not load {what}: {err}"));
            None
        }
    }
}

fn apply_cart(view: &mut CheckoutView, cart: CartSnapshot, default_currency: &str) {
    view.currency = cart.currency().unwrap_or(default_currency).to_string();

    if let Some(address) = cart.attached_address() {
        view.selection.address = Some(address);
    } else if view.selection.address.is_none() {
        view.selection.address = view.addresses.first().map(ShippingAddress::address_ref);
    }

    match cart.attached_payment() {
        Some(info) if info.payment.payment_method_id.is_some() => {
            view.selection.payment_method_id = info.payment.payment_method_id.clone();
            if info.payment.payment_id.is_some() {
                view.payment_id = info.payment.payment_id.clone();
            }
        }
        _ => {
            if view.selection.payment_method_id.is_none() {
                view.selection.payment_method_id = view
                    .payment_methods
                    .first()
                    .map(|method| method.payment_method_id.clone());
            }
        }
    }

    if pricing::empty_cart_guard(&cart) {
        tracing::info!("Cart has no products, leaving checkout");
        view.redirect = Some(Redirect::Store);
    }

    view.cart = Some(Arc::new(cart));
}

fn apply_shipping_options(
    view: &mut CheckoutView,
    options: Vec<ShippingOption>,
    preferred: Option<&str>,
) {
    if view.selection.shipping.is_none() {
        let default = preferred
            .and_then(|description| {
                options
                    .iter()
                    .find(|option| option.shipment_method_description.as_deref() == Some(description))
            })
            .or_else(|| options.first());
        view.selection.shipping = default.map(ShippingOption::choice);
    }
    view.shipping_options = options;
}
