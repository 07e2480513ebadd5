use anyhow::{bail, Result};
use checkout::cart::{AddressRef, ShippingChoice};
use checkout::{Checkout, PlaceOrderOutcome};
use clap::Args;

use super::info::{print_notices, print_view};

#[derive(Args)]
pub struct CheckoutSubCommand {
    /// Card security code
    #[arg(long)]
    cvv: String,
    /// Shipping address as <postalContactMechId>:<telecomContactMechId>
    #[arg(long)]
    address: Option<AddressRef>,
    /// Shipping option as <carrierPartyId>:<shipmentMethodEnumId>
    #[arg(long)]
    shipping: Option<ShippingChoice>,
    /// Saved card to pay with
    #[arg(long)]
    payment_method: Option<String>,
    /// Stop on the review step without placing the order
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

pub async fn checkout(checkout: &Checkout, sub_command_args: &CheckoutSubCommand) -> Result<()> {
    if let Some(address) = &sub_command_args.address {
        checkout.select_address(address.clone());
    }
    if let Some(shipping) = &sub_command_args.shipping {
        checkout.select_shipping(shipping.clone());
    }
    if let Some(payment_method) = &sub_command_args.payment_method {
        checkout.select_payment_method(payment_method.as_str());
    }
    checkout.set_cvv(sub_command_args.cvv.as_str());

    let steps = async {
        checkout.address_continue().await?;
        checkout.shipping_continue().await?;
        checkout.billing_continue().await
    };
    if let Err(err) = steps.await {
        print_notices(&checkout.view());
        return Err(err.into());
    }

    print_view(&checkout.view());
    if sub_command_args.dry_run {
        println!("Stopped at {}", checkout.current_step());
        return Ok(());
    }

    match checkout.place_order().await {
        Ok(PlaceOrderOutcome::Placed { order_id }) => {
            println!("Order {order_id} placed");
            Ok(())
        }
        Ok(PlaceOrderOutcome::AlreadyInFlight) => bail!("Order placement already in flight"),
        Err(err) => {
            print_notices(&checkout.view());
            Err(err.into())
        }
    }
}
