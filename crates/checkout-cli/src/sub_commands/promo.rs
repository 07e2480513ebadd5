use anyhow::Result;
use checkout::Checkout;
use clap::{Args, Subcommand};

use super::info::print_notices;

#[derive(Args)]
pub struct PromoSubCommand {
    #[command(subcommand)]
    command: PromoCommand,
}

#[derive(Subcommand)]
enum PromoCommand {
    /// Apply a promo code
    Add {
        /// Promo code
        code: String,
    },
    /// Remove an applied promo code
    Remove {
        /// Promo code
        code: String,
    },
}

pub async fn promo(checkout: &Checkout, sub_command_args: &PromoSubCommand) -> Result<()> {
    let result = match &sub_command_args.command {
        PromoCommand::Add { code } => {
            checkout.set_promo_code_input(code.as_str());
            checkout.apply_promotion_code().await
        }
        PromoCommand::Remove { code } => checkout.remove_promotion_code(code).await,
    };

    print_notices(&checkout.view());
    result?;

    println!("Promo codes: {}", checkout.view().applied_promo_codes().join(", "));
    Ok(())
}
