//! Order item quantity changes and removal

use checkout_common::cart::UpdateQuantityRequest;
use checkout_common::Decimal;
use tracing::instrument;

use super::view::CheckoutView;
use super::Checkout;
use crate::{Error, ValidationError};

/// Order id and sequence id of an item in the current cart
fn locate_item(
    view: &CheckoutView,
    order_item_seq_id: &str,
) -> Result<(String, String), ValidationError> {
    let cart = view.cart.as_deref().ok_or(ValidationError::MissingOrderId)?;
    let item = cart
        .item(order_item_seq_id)
        .ok_or_else(|| ValidationError::ItemNotInCart(order_item_seq_id.to_string()))?;
    let order_id = item
        .order_id
        .as_deref()
        .or(cart.order_id())
        .ok_or(ValidationError::MissingOrderId)?;

    Ok((order_id.to_string(), order_item_seq_id.to_string()))
}

impl Checkout {
    /// Change the quantity of an item. The cart and the shipping options are
    /// reloaded once the store accepted the change; until then the previous
    /// items stay on display.
    #[instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        order_item_seq_id: &str,
        quantity: Decimal,
    ) -> Result<(), Error> {
        let located = locate_item(&self.view.borrow(), order_item_seq_id);
        let (order_id, order_item_seq_id) = match located {
            Ok(located) => located,
            Err(err) => return Err(self.reject(err).await),
        };

        let _loading = self.start_loading();
        let request = UpdateQuantityRequest {
            order_id,
            order_item_seq_id,
            quantity,
        };

        match self.client.update_item_quantity(request).await {
            Ok(response) => {
                let message = response.messages.to_option();
                self.view
                    .send_modify(|view| view.notices.response_message = message);
            }
            Err(err) => {
                self.surface(&err).await;
                return Err(err);
            }
        }

        self.refresh_cart_and_options().await
    }

    /// Remove an item. Removing the last product ends the checkout with a
    /// redirect to the store.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, order_item_seq_id: &str) -> Result<(), Error> {
        let located = locate_item(&self.view.borrow(), order_item_seq_id);
        let (order_id, order_item_seq_id) = match located {
            Ok(located) => located,
            Err(err) => return Err(self.reject(err).await),
        };

        let _loading = self.start_loading();

        if let Err(err) = self.client.delete_item(&order_id, &order_item_seq_id).await {
            self.surface(&err).await;
            return Err(err);
        }

        self.refresh_cart_and_options().await
    }
}
