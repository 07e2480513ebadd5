use anyhow::Result;
use checkout::{Checkout, Decimal};
use clap::Args;

use super::info::print_view;

#[derive(Args)]
pub struct QuantitySubCommand {
    /// Order item sequence id
    order_item_seq_id: String,
    /// New quantity
    quantity: Decimal,
}

pub async fn quantity(checkout: &Checkout, sub_command_args: &QuantitySubCommand) -> Result<()> {
    checkout
        .update_item_quantity(&sub_command_args.order_item_seq_id, sub_command_args.quantity)
        .await?;

    print_view(&checkout.view());
    Ok(())
}
