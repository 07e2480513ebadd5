//! Pricing derived from a cart snapshot
//!
//! Everything here is a pure function of its inputs. Amounts keep full
//! precision; only [`format_amount`] rounds, and only for display.

use checkout_common::cart::{CartSnapshot, ItemKind, OrderItem, ShippingOption};
use checkout_common::Decimal;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

fn sum_amounts(cart: &CartSnapshot, kind: ItemKind) -> Decimal {
    cart.order_item_list
        .iter()
        .filter(|item| item.kind == kind)
        .map(OrderItem::amount)
        .sum()
}

/// Sum of `unit_amount * quantity` over product lines
pub fn product_total(cart: &CartSnapshot) -> Decimal {
    sum_amounts(cart, ItemKind::Product)
}

/// Sum of `unit_amount * quantity` over discount lines, usually negative
pub fn discount_total(cart: &CartSnapshot) -> Decimal {
    sum_amounts(cart, ItemKind::Discount)
}

/// Number of product units in the cart
pub fn product_count(cart: &CartSnapshot) -> Decimal {
    cart.order_item_list
        .iter()
        .filter(|item| item.kind == ItemKind::Product)
        .map(|item| item.quantity)
        .sum()
}

/// Distinct promo codes carried by discount lines
pub fn applied_promo_codes(cart: &CartSnapshot) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for code in cart
        .order_item_list
        .iter()
        .filter(|item| item.kind == ItemKind::Discount)
        .filter_map(|item| item.promo_code.as_deref())
    {
        if !codes.iter().any(|applied| applied == code) {
            codes.push(code.to_string());
        }
    }
    codes
}

/// Price of shipping: the selected option's total, else the shipping line
/// already on the cart, else zero.
///
/// The fallback keeps totals stable while the options list reloads.
pub fn effective_shipping_price(
    selected: Option<&ShippingOption>,
    fallback: Option<&OrderItem>,
) -> Decimal {
    selected
        .and_then(|option| option.shipping_total)
        .or_else(|| fallback.map(|item| item.unit_amount))
        .unwrap_or(Decimal::ZERO)
}

/// True when the cart has no product lines, which ends the checkout session
pub fn empty_cart_guard(cart: &CartSnapshot) -> bool {
    !cart
        .order_item_list
        .iter()
        .any(|item| item.kind == ItemKind::Product)
}

/// Two decimal display form, rounding half away from zero
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// Totals shown on the review step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Products
    pub product_total: Decimal,
    /// Discounts
    pub discount_total: Decimal,
    /// Shipping
    pub shipping: Decimal,
    /// Products, discounts and shipping
    pub grand_total: Decimal,
    /// Product units
    pub product_count: Decimal,
}

/// Compute the totals for a cart and the selected shipping option
pub fn totals(cart: &CartSnapshot, selected: Option<&ShippingOption>) -> Totals {
    let product_total = product_total(cart);
    let discount_total = discount_total(cart);
    let shipping = effective_shipping_price(selected, cart.shipping_line_item());

    Totals {
        product_total,
        discount_total,
        shipping,
        grand_total: product_total + discount_total + shipping,
        product_count: product_count(cart),
    }
}
