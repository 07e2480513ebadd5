//! Cart service client

use std::fmt::Debug;

use async_trait::async_trait;
use checkout_common::cart::{
    BillingShippingRequest, BillingShippingResponse, CartSnapshot, MessagesResponse,
    PlaceOrderRequest, PlaceOrderResponse, PromoCodeRequest, RemovePromoCodeRequest,
    ShippingOption, UpdateQuantityRequest,
};
use checkout_common::customer::{CustomerInfo, PaymentMethodInfo, ShippingAddress};

use crate::Error;

pub mod http_client;

pub use self::http_client::HttpClient;

/// Interface that connects a checkout to the store. Typically represents an
/// [HttpClient].
///
/// Every call carries the session credential. Implementations must apply a
/// session token reissued by the server before returning, whether the call
/// succeeded or not.
#[async_trait]
pub trait CartConnector: Debug + Send + Sync {
    /// Current cart
    async fn get_info(&self) -> Result<CartSnapshot, Error>;
    /// Attach address, payment method and shipping choice to the cart
    async fn attach_billing_shipping(
        &self,
        request: BillingShippingRequest,
    ) -> Result<BillingShippingResponse, Error>;
    /// Shipping options for the cart as it is now
    async fn list_shipping_options(&self) -> Result<Vec<ShippingOption>, Error>;
    /// Change the quantity of an order item
    async fn update_item_quantity(
        &self,
        request: UpdateQuantityRequest,
    ) -> Result<MessagesResponse, Error>;
    /// Remove an order item
    async fn delete_item(
        &self,
        order_id: &str,
        order_item_seq_id: &str,
    ) -> Result<MessagesResponse, Error>;
    /// Apply a promo code
    async fn add_promo_code(&self, request: PromoCodeRequest) -> Result<MessagesResponse, Error>;
    /// Remove an applied promo code by its internal id
    async fn remove_promo_code(
        &self,
        request: RemovePromoCodeRequest,
    ) -> Result<MessagesResponse, Error>;
    /// Place the order
    async fn place_order(&self, request: PlaceOrderRequest) -> Result<PlaceOrderResponse, Error>;
    /// Logged in customer
    async fn get_customer_info(&self) -> Result<CustomerInfo, Error>;
    /// Saved shipping addresses
    async fn get_shipping_addresses(&self) -> Result<Vec<ShippingAddress>, Error>;
    /// Saved payment methods usable at checkout
    async fn get_payment_methods(&self) -> Result<Vec<PaymentMethodInfo>, Error>;
}
