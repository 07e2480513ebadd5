//! Checkout steps

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One stage of the linear checkout.
///
/// Steps are totally ordered by their position in [`CheckoutStep::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckoutStep {
    /// Choose the shipping address
    #[default]
    Address,
    /// Choose the shipping method
    Shipping,
    /// Choose the payment method and enter the card security code
    Billing,
    /// Review the order before placing it
    Review,
    /// Order placement in flight
    Pending,
    /// Order placed
    Success,
}

impl CheckoutStep {
    /// All steps in order
    pub const ALL: [CheckoutStep; 6] = [
        CheckoutStep::Address,
        CheckoutStep::Shipping,
        CheckoutStep::Billing,
        CheckoutStep::Review,
        CheckoutStep::Pending,
        CheckoutStep::Success,
    ];

    /// Position of the step in the checkout
    pub fn index(self) -> usize {
        self as usize
    }

    /// Slug used in the step's external representation
    pub fn slug(self) -> &'static str {
        match self {
            CheckoutStep::Address => "shipping-address",
            CheckoutStep::Shipping => "shipping-method",
            CheckoutStep::Billing => "payment-methods",
            CheckoutStep::Review => "review-purchase",
            CheckoutStep::Pending => "pending",
            CheckoutStep::Success => "success",
        }
    }

    /// Step a "continue" action moves to. `None` for the steps that are not
    /// left by continuing.
    pub fn next(self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Address => Some(CheckoutStep::Shipping),
            CheckoutStep::Shipping => Some(CheckoutStep::Billing),
            CheckoutStep::Billing => Some(CheckoutStep::Review),
            CheckoutStep::Review => Some(CheckoutStep::Pending),
            CheckoutStep::Pending => Some(CheckoutStep::Success),
            CheckoutStep::Success => None,
        }
    }

    /// No transitions leave a terminal step
    pub fn is_terminal(self) -> bool {
        self == CheckoutStep::Success
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for CheckoutStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckoutStep::ALL
            .into_iter()
            .find(|step| step.slug() == s)
            .ok_or_else(|| format!("Unknown checkout step: {s}"))
    }
}
