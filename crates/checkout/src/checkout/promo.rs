//! Promo codes

use checkout_common::cart::{PromoCodeRequest, RemovePromoCodeRequest};
use tracing::instrument;

use super::view::CheckoutView;
use super::Checkout;
use crate::validation::validate_promo_code;
use crate::{Error, ValidationError};

/// Marker of a promo code the store refused
const PROMO_REJECTED_MARKER: &str = "not valid";

fn add_request(view: &CheckoutView) -> Result<PromoCodeRequest, ValidationError> {
    let promo_code = validate_promo_code(&view.selection.promo_code_input)?.to_string();
    let order_id = view
        .order_id()
        .ok_or(ValidationError::MissingOrderId)?
        .to_string();
    Ok(PromoCodeRequest {
        promo_code,
        order_id,
    })
}

/// Resolve the code the customer sees to the id the store removes by
fn remove_request(view: &CheckoutView, code: &str) -> Result<RemovePromoCodeRequest, ValidationError> {
    let cart = view.cart.as_deref().ok_or(ValidationError::MissingOrderId)?;
    let detail = cart
        .promo_code_detail(code)
        .ok_or_else(|| ValidationError::PromoCodeNotApplied(code.to_string()))?;
    let order_id = detail
        .order_id
        .as_deref()
        .or(cart.order_id())
        .ok_or(ValidationError::MissingOrderId)?;

    Ok(RemovePromoCodeRequest {
        order_id: order_id.to_string(),
        promo_code_id: detail.promo_code_id.clone(),
    })
}

impl Checkout {
    /// Apply the promo code typed by the customer.
    ///
    /// A code the store refuses is reported inline and the cart is left
    /// alone. Anything else refreshes the cart and clears the input.
    #[instrument(skip(self))]
    pub async fn apply_promotion_code(&self) -> Result<(), Error> {
        let request = add_request(&self.view.borrow());
        let request = match request {
            Ok(request) => request,
            Err(err) => return Err(self.reject(err).await),
        };

        self.view.send_modify(|view| {
            view.notices.field_error = None;
            view.notices.promo_error = None;
            view.notices.promo_success = None;
        });

        let response = match self.client.add_promo_code(request).await {
            Ok(response) => response,
            Err(Error::AuthExpired) => {
                self.surface(&Error::AuthExpired).await;
                return Err(Error::AuthExpired);
            }
            Err(err) => {
                tracing::warn!("Could not apply promo code: {}", err);
                let message = err.to_string();
                self.view
                    .send_modify(|view| view.notices.promo_error = Some(message));
                return Err(err);
            }
        };

        if response.messages.contains(PROMO_REJECTED_MARKER) {
            let message = response.messages.to_string();
            tracing::info!("Promo code refused: {}", message);
            self.view
                .send_modify(|view| view.notices.promo_error = Some(message.clone()));
            return Err(Error::DomainRejection(message));
        }

        self.view.send_modify(|view| {
            view.notices.promo_success = response.messages.to_option();
            view.selection.promo_code_input.clear();
        });

        if let Err(err) = self.load_cart().await {
            self.surface(&err).await;
            return Err(err);
        }
        Ok(())
    }

    /// Remove an applied promo code, then refresh the cart and the shipping
    /// options.
    #[instrument(skip(self))]
    pub async fn remove_promotion_code(&self, code: &str) -> Result<(), Error> {
        let request = remove_request(&self.view.borrow(), code);
        let request = match request {
            Ok(request) => request,
            Err(err) => return Err(self.reject(err).await),
        };

        if let Err(err) = self.client.remove_promo_code(request).await {
            self.surface(&err).await;
            return Err(err);
        }

        self.view.send_modify(|view| {
            view.notices.promo_error = None;
            view.notices.promo_success = None;
        });
        self.refresh_cart_and_options().await
    }
}
