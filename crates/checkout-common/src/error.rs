//! Errors

use std::fmt;

use checkout_http_client::HttpError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::step::CheckoutStep;

/// Field-scoped validation failures. These are raised before any request is
/// made and never leave the orchestrator as a network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Card security code must be three or four digits
    #[error("Card security code must be 3 or 4 digits")]
    Cvv,
    /// No shipping address selected
    #[error("No shipping address selected")]
    AddressNotSelected,
    /// Selected address is not one of the saved addresses
    #[error("Selected shipping address `{0}` is not available")]
    AddressNotInList(String),
    /// No shipping method selected
    #[error("No shipping method selected")]
    ShippingNotSelected,
    /// No payment method selected
    #[error("No payment method selected")]
    PaymentNotSelected,
    /// Selected payment method is not one of the saved methods
    #[error("Selected payment method `{0}` is not available")]
    PaymentNotInList(String),
    /// Billing has not been attached to the cart yet
    #[error("No payment attached to the cart")]
    MissingPaymentId,
    /// The cart has no order header
    #[error("Cart has no order")]
    MissingOrderId,
    /// Item is not part of the current cart
    #[error("Order item `{0}` not found in cart")]
    ItemNotInCart(String),
    /// Required field left empty
    #[error("`{0}` is required")]
    RequiredField(String),
    /// Card number failed the checksum
    #[error("Card number is not valid")]
    CardNumber,
    /// Promo code input is empty
    #[error("Promo code is empty")]
    PromoCodeEmpty,
    /// Promo code is not applied to the cart
    #[error("Promo code `{0}` is not applied to this cart")]
    PromoCodeNotApplied(String),
    /// Action is only available on another step
    #[error("Not available on the {current} step, expected {expected}")]
    WrongStep {
        /// Step the action belongs to
        expected: CheckoutStep,
        /// Step the checkout is on
        current: CheckoutStep,
    },
}

impl ValidationError {
    /// Form field the error belongs to
    pub fn field(&self) -> &'static str {
        match self {
            Self::Cvv => "cvv",
            Self::AddressNotSelected | Self::AddressNotInList(_) => "address",
            Self::ShippingNotSelected => "shippingOption",
            Self::PaymentNotSelected | Self::PaymentNotInList(_) | Self::MissingPaymentId => {
                "paymentMethod"
            }
            Self::MissingOrderId | Self::ItemNotInCart(_) => "cart",
            Self::RequiredField(_) => "form",
            Self::CardNumber => "cardNumber",
            Self::PromoCodeEmpty | Self::PromoCodeNotApplied(_) => "promoCode",
            Self::WrongStep { .. } => "step",
        }
    }
}

/// Checkout Error
#[derive(Debug, Error)]
pub enum Error {
    /// Local validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Authentication lost (401) or never established
    #[error("Authentication expired")]
    AuthExpired,
    /// Successful response whose body carries a business error
    #[error("Rejected: {0}")]
    DomainRejection(String),
    /// Transport error. `None` status means the request never got an answer
    #[error("HTTP error: {1}")]
    HttpError(Option<u16>, String),
    /// Error response from the store
    #[error("Server error ({0}): {1}")]
    Server(u16, ErrorResponse),
    /// Response body did not match the expected schema
    #[error("Could not decode response: {0}")]
    Decode(String),
    /// Url error
    #[error(transparent)]
    Url(#[from] crate::store_url::Error),
    /// Serde Json error
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    /// Custom error
    #[error("`{0}`")]
    Custom(String),
}

impl Error {
    /// Transport failures the user may retry by re-triggering the action.
    ///
    /// Nothing in the checkout retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(None, _) => true,
            Self::HttpError(Some(status), _) | Self::Server(status, _) => {
                (500..600).contains(status)
            }
            _ => false,
        }
    }

    /// Validation error, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HttpError> for Error {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status: 401, .. } => Error::AuthExpired,
            HttpError::Status { status, message } => Error::HttpError(Some(status), message),
            HttpError::Serialization(message) => Error::Decode(message),
            other => Error::HttpError(None, other.to_string()),
        }
    }
}

/// Error body returned by the store on non-2xx responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Error code echoed by the server
    #[serde(default)]
    pub error_code: Option<u16>,
    /// Human readable errors
    #[serde(default)]
    pub errors: Option<String>,
    /// Additional messages
    #[serde(default)]
    pub messages: Option<String>,
}

impl ErrorResponse {
    /// Error response from json. Bodies that are not objects are rejected.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.errors, &self.messages) {
            (Some(errors), _) => write!(f, "{errors}"),
            (None, Some(messages)) => write!(f, "{messages}"),
            (None, None) => write!(f, "code: {:?}", self.error_code),
        }
    }
}
