use anyhow::Result;
use checkout::Checkout;
use clap::Args;

use super::info::print_view;

#[derive(Args)]
pub struct DeleteItemSubCommand {
    /// Order item sequence id
    order_item_seq_id: String,
}

pub async fn delete_item(
    checkout: &Checkout,
    sub_command_args: &DeleteItemSubCommand,
) -> Result<()> {
    checkout
        .delete_item(&sub_command_args.order_item_seq_id)
        .await?;

    print_view(&checkout.view());
    Ok(())
}
