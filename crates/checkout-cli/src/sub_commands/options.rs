use anyhow::Result;
use checkout::pricing::format_amount;
use checkout::Checkout;

pub async fn options(checkout: &Checkout) -> Result<()> {
    let view = checkout.view();

    for option in &view.shipping_options {
        let choice = option.choice();
        let marker = if view.selection.shipping.as_ref() == Some(&choice) {
            "*"
        } else {
            " "
        };
        let price = option
            .shipping_total
            .map(format_amount)
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{marker} {choice} {} {price} {}",
            option.shipment_method_description.as_deref().unwrap_or(""),
            view.currency
        );
    }

    Ok(())
}
