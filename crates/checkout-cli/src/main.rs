//! Storefront checkout cli

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use checkout::{
    Checkout, HttpClient, MemoryLocation, Navigator, Redirect, Session, SessionCredential,
    StoreUrl,
};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use url::Url;

mod config;
mod env_vars;
mod sub_commands;
mod token_storage;

const DEFAULT_WORK_DIR: &str = ".storefront-checkout";

/// Drive a storefront checkout from the command line
#[derive(Parser)]
#[command(name = "checkout-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to working dir
    #[arg(short, long)]
    work_dir: Option<PathBuf>,
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Logging level
    #[arg(short, long, default_value = "warn")]
    log_level: Level,
    /// Proxy for store requests
    #[arg(short, long)]
    proxy: Option<Url>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart, selection and totals
    Info,
    /// List shipping options
    Options,
    /// Apply or remove a promo code
    Promo(sub_commands::promo::PromoSubCommand),
    /// Change the quantity of a cart item
    Quantity(sub_commands::quantity::QuantitySubCommand),
    /// Remove a cart item
    DeleteItem(sub_commands::delete_item::DeleteItemSubCommand),
    /// Run the checkout steps and place the order
    Checkout(sub_commands::checkout::CheckoutSubCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();
    let default_filter = args.log_level;

    let hyper_filter = "hyper=warn";
    let reqwest_filter = "reqwest=warn";

    let env_filter = EnvFilter::new(format!(
        "{},{},{}",
        default_filter, hyper_filter, reqwest_filter
    ));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let work_dir = match &args.work_dir {
        Some(work_dir) => work_dir.clone(),
        None => {
            let home_dir = home::home_dir().ok_or_else(|| anyhow::anyhow!("Unknown home dir"))?;
            home_dir.join(DEFAULT_WORK_DIR)
        }
    };

    fs::create_dir_all(&work_dir)?;

    let config_file = args
        .config
        .clone()
        .unwrap_or_else(|| work_dir.join("config.toml"));
    let settings = config::Settings::new(Some(config_file)).from_env();
    tracing::debug!("Using settings {:?}", settings);

    if settings.store.url.is_empty() {
        bail!(
            "Store url is not set, add it to the config file or set {}",
            env_vars::ENV_STORE_URL
        );
    }
    let store_url = StoreUrl::from_str(&settings.store.url)?;

    let session_token = match settings.store.session_token.clone() {
        Some(token) => Some(token),
        None => token_storage::get_token_for_store(&work_dir, &store_url)
            .await?
            .map(|data| data.session_token),
    };
    let session = Session::new(SessionCredential::new(
        settings.store.api_key.clone(),
        session_token,
    ));

    let client = HttpClient::with_settings(
        store_url.clone(),
        session.clone(),
        settings.store.timeout_secs.map(Duration::from_secs),
        args.proxy.clone(),
        settings.store.accept_invalid_certs,
    )?;

    let navigator = Navigator::with_fragment(Arc::new(MemoryLocation::default()));
    let checkout = Checkout::new(
        Arc::new(client),
        session.clone(),
        navigator,
        settings.checkout.clone().into(),
    );

    let entered = checkout.bootstrap().await;
    for load_error in &checkout.view().notices.load_errors {
        println!("Warning: {load_error}");
    }

    let result = match entered {
        Err(_) if matches!(checkout.view().redirect, Some(Redirect::Login { .. })) => Err(
            anyhow::anyhow!(
                "Not logged in, set the api key in the config file or {}",
                env_vars::ENV_API_KEY
            ),
        ),
        Err(err) => Err(err.into()),
        Ok(()) => match &args.command {
            Commands::Info => sub_commands::info::info(&checkout).await,
            Commands::Options => sub_commands::options::options(&checkout).await,
            Commands::Promo(sub_command_args) => {
                sub_commands::promo::promo(&checkout, sub_command_args).await
            }
            Commands::Quantity(sub_command_args) => {
                sub_commands::quantity::quantity(&checkout, sub_command_args).await
            }
            Commands::DeleteItem(sub_command_args) => {
                sub_commands::delete_item::delete_item(&checkout, sub_command_args).await
            }
            Commands::Checkout(sub_command_args) => {
                sub_commands::checkout::checkout(&checkout, sub_command_args).await
            }
        },
    };

    if let Some(session_token) = session.credential().await.session_token {
        token_storage::save_token(&work_dir, &store_url, &session_token).await?;
    }

    result
}
