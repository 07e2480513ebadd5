//! Continue actions and the billing/shipping attach they share

use checkout_common::cart::BillingShippingRequest;
use tracing::instrument;

use super::compensation::{Compensations, RestoreShippingOptions};
use super::view::CheckoutView;
use super::Checkout;
use crate::validation::{require_field, validate_cvv};
use crate::{CheckoutStep, Error, ValidationError};

/// Selected address must be one of the saved addresses
pub(crate) fn guard_address(view: &CheckoutView) -> Result<(), ValidationError> {
    let selected = view
        .selection
        .address
        .as_ref()
        .ok_or(ValidationError::AddressNotSelected)?;
    require_field(
        "shippingPostalContactMechId",
        Some(&selected.postal_contact_mech_id),
    )?;
    if view.selected_address().is_none() {
        return Err(ValidationError::AddressNotInList(selected.to_string()));
    }
    Ok(())
}

/// A shipping option must be selected
pub(crate) fn guard_shipping(view: &CheckoutView) -> Result<(), ValidationError> {
    if view.selection.shipping.is_none() {
        return Err(ValidationError::ShippingNotSelected);
    }
    Ok(())
}

/// Selected payment method must be one of the saved cards
pub(crate) fn guard_payment(view: &CheckoutView) -> Result<(), ValidationError> {
    let selected = view
        .selection
        .payment_method_id
        .as_deref()
        .ok_or(ValidationError::PaymentNotSelected)?;
    let selected = require_field("paymentMethodId", Some(selected))?;
    if view.selected_payment_method().is_none() {
        return Err(ValidationError::PaymentNotInList(selected.to_string()));
    }
    Ok(())
}

/// The checkout must be on `expected`
pub(crate) fn guard_step(
    expected: CheckoutStep,
    current: CheckoutStep,
) -> Result<(), ValidationError> {
    if current != expected {
        return Err(ValidationError::WrongStep { expected, current });
    }
    Ok(())
}

impl Checkout {
    /// Leave the address step
    #[instrument(skip(self))]
    pub async fn address_continue(&self) -> Result<CheckoutStep, Error> {
        self.continue_from(CheckoutStep::Address, guard_address)
            .await
    }

    /// Leave the shipping step
    #[instrument(skip(self))]
    pub async fn shipping_continue(&self) -> Result<CheckoutStep, Error> {
        self.continue_from(CheckoutStep::Shipping, |view| {
            guard_address(view)?;
            guard_shipping(view)
        })
        .await
    }

    /// Leave the billing step. An invalid card security code keeps the
    /// customer on the step without any request being made.
    #[instrument(skip(self))]
    pub async fn billing_continue(&self) -> Result<CheckoutStep, Error> {
        self.continue_from(CheckoutStep::Billing, |view| {
            validate_cvv(&view.selection.cvv)?;
            guard_address(view)?;
            guard_shipping(view)?;
            guard_payment(view)
        })
        .await
    }

    /// Run `guard`, attach the selection and move one step forward from
    /// `from`. Nothing is sent unless the checkout is on `from`.
    async fn continue_from<G>(&self, from: CheckoutStep, guard: G) -> Result<CheckoutStep, Error>
    where
        G: FnOnce(&CheckoutView) -> Result<(), ValidationError>,
    {
        let next = from
            .next()
            .ok_or_else(|| Error::Custom(format!("No step after {from}")))?;

        let checked = guard_step(from, self.navigator.current())
            .and_then(|()| guard(&self.view.borrow()));
        if let Err(err) = checked {
            return Err(self.reject(err).await);
        }

        self.view
            .send_modify(|view| view.notices.field_error = None);
        self.add_cart_billing_shipping().await?;

        if !self.navigator.advance_to(next) {
            return Err(self
                .reject(ValidationError::WrongStep {
                    expected: from,
                    current: self.navigator.current(),
                })
                .await);
        }
        Ok(next)
    }

    /// Attach the selected address, payment method and shipping option to
    /// the cart, then refresh the cart and the shipping options.
    ///
    /// The options list is cleared while the call is in flight. If the
    /// attach fails, or the options cannot be reloaded, the previous list is
    /// put back.
    #[instrument(skip(self))]
    pub async fn add_cart_billing_shipping(&self) -> Result<(), Error> {
        let (request, previous_options) = {
            let view = self.view.borrow();
            (
                BillingShippingRequest::new(
                    view.selection.address.as_ref(),
                    view.selection.payment_method_id.as_deref(),
                    view.selection.shipping.as_ref(),
                ),
                view.shipping_options.clone(),
            )
        };

        let mut compensations = Compensations::default();
        compensations.push(Box::new(RestoreShippingOptions {
            options: previous_options,
        }));
        self.view.send_modify(|view| view.shipping_options.clear());

        let response = match self.client.attach_billing_shipping(request).await {
            Ok(response) => response,
            Err(err) => {
                compensations.execute(&self.compensation_context());
                self.surface(&err).await;
                return Err(err);
            }
        };

        let message = response.messages.to_option();
        self.view.send_modify(|view| {
            if response.payment_id.is_some() {
                view.payment_id = response.payment_id;
            }
            view.notices.response_message = message;
        });

        let (cart, options) = tokio::join!(self.load_cart(), self.load_shipping_options());
        if options.is_ok() {
            compensations.clear();
        }

        if let Err(err) = options.and(cart) {
            compensations.execute(&self.compensation_context());
            self.surface(&err).await;
            return Err(err);
        }

        Ok(())
    }
}
