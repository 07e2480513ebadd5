//! Storefront checkout shared types.
//!
//! This crate is the base the checkout engine and its command-line driver are
//! built on: the server's cart and customer payloads, the checkout steps, the
//! session credential that is rotated by the server, and the error taxonomy.

pub mod cart;
pub mod customer;
pub mod error;
pub mod session;
pub mod step;
pub mod store_url;
pub mod util;

pub use rust_decimal::Decimal;

pub use self::cart::{
    AddressRef, BillingShippingRequest, BillingShippingResponse, CartSnapshot, ItemKind,
    Messages, MessagesResponse, OrderHeader, OrderItem, PlaceOrderRequest, PlaceOrderResponse,
    PromoCodeDetail, PromoCodeRequest, RemovePromoCodeRequest, ShippingChoice, ShippingOption,
    ShippingOptionsResponse, UpdateQuantityRequest,
};
pub use self::customer::{
    CustomerInfo, PaymentMethodInfo, PaymentMethodsResponse, ShippingAddress,
    ShippingAddressesResponse,
};
pub use self::error::{Error, ErrorResponse, ValidationError};
pub use self::session::{Session, SessionCredential};
pub use self::step::CheckoutStep;
pub use self::store_url::StoreUrl;

/// Return early with an error if a condition is not satisfied.
#[macro_export]
macro_rules! ensure_checkout {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}
