use anyhow::Result;
use checkout::cart::ItemKind;
use checkout::pricing::format_amount;
use checkout::{Checkout, CheckoutView, Redirect};

pub async fn info(checkout: &Checkout) -> Result<()> {
    print_view(&checkout.view());
    Ok(())
}

pub fn print_view(view: &CheckoutView) {
    if let Some(name) = view.customer.as_ref().and_then(|customer| customer.display_name()) {
        println!("Customer: {name}");
    }

    match view.cart.as_deref() {
        Some(cart) => {
            println!("Order: {}", cart.order_id().unwrap_or("-"));
            for item in cart
                .order_item_list
                .iter()
                .filter(|item| item.kind == ItemKind::Product)
            {
                println!(
                    "  {} {} x {} {}",
                    item.order_item_seq_id.as_deref().unwrap_or("-"),
                    item.item_description
                        .as_deref()
                        .or(item.product_id.as_deref())
                        .unwrap_or("-"),
                    item.quantity,
                    format_amount(item.unit_amount),
                );
            }
        }
        None => println!("No cart"),
    }

    let totals = view.totals();
    println!("Products: {} {}", format_amount(totals.product_total), view.currency);
    if !totals.discount_total.is_zero() {
        println!("Discounts: {} {}", format_amount(totals.discount_total), view.currency);
    }
    println!("Shipping: {} {}", format_amount(totals.shipping), view.currency);
    println!("Total: {} {}", format_amount(totals.grand_total), view.currency);

    let promo_codes = view.applied_promo_codes();
    if !promo_codes.is_empty() {
        println!("Promo codes: {}", promo_codes.join(", "));
    }

    if let Some(address) = &view.selection.address {
        println!("Address: {address}");
    }
    if let Some(shipping) = &view.selection.shipping {
        println!("Shipping option: {shipping}");
    }
    if let Some(payment_method_id) = &view.selection.payment_method_id {
        println!("Payment method: {payment_method_id}");
    }

    print_notices(view);
}

pub fn print_notices(view: &CheckoutView) {
    if let Some(message) = &view.notices.response_message {
        println!("{message}");
    }
    if let Some(message) = &view.notices.promo_success {
        println!("{message}");
    }
    if let Some(message) = &view.notices.promo_error {
        println!("Promo code: {message}");
    }
    if let Some(field_error) = &view.notices.field_error {
        println!("{}: {field_error}", field_error.field());
    }
    if let Some(Redirect::Store) = view.redirect {
        println!("Cart is empty");
    }
}
