//! Order placement

use std::sync::atomic::{AtomicBool, Ordering};

use checkout_common::cart::{PlaceOrderRequest, PlaceOrderResponse};
use tracing::instrument;

use super::compensation::{Compensations, ReturnToStep};
use super::steps::{guard_address, guard_payment, guard_shipping, guard_step};
use super::view::{CheckoutView, Redirect};
use super::Checkout;
use crate::validation::validate_cvv;
use crate::{CheckoutStep, Error, ValidationError};

/// Shown when the payment gateway rejects the billing postal code
pub const BILLING_ZIP_MESSAGE: &str = "Please provide a valid Billing ZIP";
const GATEWAY_ERROR_MARKER: &str = "error";
const BILLING_ZIP_ERROR_CODE: &str = "122";
const ORDER_NOT_PLACED_MESSAGE: &str = "The order could not be placed";

/// Outcome of [`Checkout::place_order`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOrderOutcome {
    /// Order placed
    Placed {
        /// Placed order id
        order_id: String,
    },
    /// Another placement is still in flight, nothing was sent
    AlreadyInFlight,
}

/// Clears the in-flight flag when dropped
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn placement_request(view: &CheckoutView) -> Result<PlaceOrderRequest, ValidationError> {
    validate_cvv(&view.selection.cvv)?;
    guard_address(view)?;
    guard_shipping(view)?;
    guard_payment(view)?;

    let payment_id = view
        .payment_id
        .clone()
        .or_else(|| {
            view.cart
                .as_deref()
                .and_then(|cart| cart.attached_payment())
                .and_then(|info| info.payment.payment_id.clone())
        })
        .ok_or(ValidationError::MissingPaymentId)?;

    Ok(PlaceOrderRequest::new(payment_id, view.selection.cvv.clone()))
}

/// Order id of a placed order, or the business error the response carries
fn interpret(response: PlaceOrderResponse) -> Result<(String, Option<String>), Error> {
    if response.messages.contains(GATEWAY_ERROR_MARKER)
        && response.messages.contains(BILLING_ZIP_ERROR_CODE)
    {
        return Err(Error::DomainRejection(BILLING_ZIP_MESSAGE.to_string()));
    }

    let message = response.messages.to_option();
    match response.order_id() {
        Some(order_id) => Ok((order_id.to_string(), message)),
        None => Err(Error::DomainRejection(
            message.unwrap_or_else(|| ORDER_NOT_PLACED_MESSAGE.to_string()),
        )),
    }
}

impl Checkout {
    /// Place the order.
    ///
    /// Only one placement may be in flight; a second call while one is
    /// pending returns [`PlaceOrderOutcome::AlreadyInFlight`] without any
    /// request. Placement starts from `Review` only, so a placed order is
    /// never sent again. The step moves to `Pending` before the request is
    /// sent. On any failure it returns to `Billing` and the in-flight flag is
    /// cleared before this returns.
    #[instrument(skip(self))]
    pub async fn place_order(&self) -> Result<PlaceOrderOutcome, Error> {
        if self.placing.swap(true, Ordering::AcqRel) {
            tracing::debug!("Order placement already in flight");
            return Ok(PlaceOrderOutcome::AlreadyInFlight);
        }
        let _in_flight = InFlight(&self.placing);

        let request = guard_step(CheckoutStep::Review, self.navigator.current())
            .and_then(|()| placement_request(&self.view.borrow()));
        let request = match request {
            Ok(request) => request,
            Err(err) => return Err(self.reject(err).await),
        };

        if !self.navigator.advance_to(CheckoutStep::Pending) {
            return Err(self
                .reject(ValidationError::WrongStep {
                    expected: CheckoutStep::Review,
                    current: self.navigator.current(),
                })
                .await);
        }
        let mut compensations = Compensations::default();
        compensations.push(Box::new(ReturnToStep {
            step: CheckoutStep::Billing,
        }));
        self.view.send_modify(|view| {
            view.notices.field_error = None;
            view.notices.response_message = None;
        });

        let result = self
            .client
            .place_order(request)
            .await
            .and_then(interpret);

        match result {
            Ok((order_id, message)) => {
                compensations.clear();
                tracing::info!("Order {} placed", order_id);

                self.navigator.advance_to(CheckoutStep::Success);
                self.view.send_modify(|view| {
                    view.redirect = Some(Redirect::OrderSuccess {
                        order_id: order_id.clone(),
                    });
                    view.notices.response_message = message;
                });
                Ok(PlaceOrderOutcome::Placed { order_id })
            }
            Err(err) => {
                tracing::warn!("Order placement failed: {}", err);
                compensations.execute(&self.compensation_context());
                self.surface(&err).await;
                Err(err)
            }
        }
    }
}
