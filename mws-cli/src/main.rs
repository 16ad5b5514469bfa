//! Command-line driver for the MWS gateway.
//!
//! Runs one gateway operation and writes the raw response to stdout.
//!
//! # Usage
//!
//! ```bash
//! # List today's orders with the default config (mws.toml)
//! mws list-orders
//!
//! # Refund 10.5 of invoice 2000000 with a custom config
//! CONFIG=/path/to/mws.toml mws return-payment --invoice-id 2000000 --amount 10.5
//!
//! # Print the request that would be sent instead of sending it
//! mws --dry-run cancel-payment --order-id 2000000
//!
//! # Configure logging level
//! RUST_LOG=debug mws list-returns
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to TOML configuration file (default: `mws.toml`)
//! - `MWS_HOST` — Override the gateway base URL
//! - `RUST_LOG` — Log level filter (default: `info`)

mod config;
mod dry_run;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mws::log::{FileLogger, Logger, TracingLogger};
use mws::{GatewayClient, GatewayResponse, MwsError};
use mws_http::HttpTransport;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;
use crate::dry_run::DryRunTransport;

#[derive(Debug, Parser)]
#[command(name = "mws", version, about = "Talk to the Yandex.Money merchant web services")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "CONFIG", default_value = "mws.toml")]
    config: PathBuf,

    /// Print the encoded (and signed) request instead of sending it.
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List successful orders created up to now.
    ListOrders,
    /// List refunds made since 2015-01-01.
    ListReturns,
    /// Refund a transfer to the payer (signed request).
    ReturnPayment {
        #[arg(long)]
        invoice_id: String,
        #[arg(long)]
        amount: Decimal,
    },
    /// Capture a deferred payment.
    ConfirmPayment {
        #[arg(long)]
        order_id: String,
        #[arg(long)]
        amount: Decimal,
    },
    /// Cancel a deferred payment.
    CancelPayment {
        #[arg(long)]
        order_id: String,
    },
    /// Charge a previously used card again.
    RepeatCardPayment {
        #[arg(long)]
        invoice_id: String,
        #[arg(long)]
        amount: Decimal,
    },
    /// Pay out to a wallet.
    DepositToWallet {
        #[arg(long)]
        invoice_id: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        destination: String,
    },
    /// Pay out to a bound card.
    DepositToCard {
        #[arg(long)]
        invoice_id: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        account_number: String,
        #[arg(long)]
        card_synonym: String,
    },
}

impl Command {
    async fn run(self, client: &GatewayClient) -> Result<GatewayResponse, MwsError> {
        match self {
            Self::ListOrders => client.list_orders().await,
            Self::ListReturns => client.list_returns().await,
            Self::ReturnPayment { invoice_id, amount } => {
                client.return_payment(&invoice_id, amount).await
            }
            Self::ConfirmPayment { order_id, amount } => {
                client.confirm_payment(&order_id, amount).await
            }
            Self::CancelPayment { order_id } => client.cancel_payment(&order_id).await,
            Self::RepeatCardPayment { invoice_id, amount } => {
                client.repeat_card_payment(&invoice_id, amount).await
            }
            Self::DepositToWallet {
                invoice_id,
                amount,
                destination,
            } => {
                client
                    .confirm_deposition_by_wallet(&invoice_id, amount, &destination)
                    .await
            }
            Self::DepositToCard {
                invoice_id,
                amount,
                account_number,
                card_synonym,
            } => {
                client
                    .confirm_deposition_by_card(&invoice_id, amount, &account_number, &card_synonym)
                    .await
            }
        }
    }
}

#[tokio::main]
async fn main() {
    // A missing .env is not an error
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("mws failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::load_from(&cli.config)?;
    tracing::info!(
        shop_id = %config.gateway.shop_id,
        testing = config.gateway.testing,
        security_type = ?config.gateway.security_type,
        "Loaded configuration"
    );

    let logger: Arc<dyn Logger> = match &config.log_file {
        Some(path) => Arc::new(FileLogger::new(path)?),
        None => Arc::new(TracingLogger),
    };

    let builder = GatewayClient::builder(config.gateway.clone()).logger(logger);
    let builder = if cli.dry_run {
        builder.transport(DryRunTransport::stdout())
    } else {
        builder.transport(HttpTransport::from_gateway_config(&config.gateway).await?)
    };
    let client = builder.build()?;

    let response = cli.command.run(&client).await?;
    if !cli.dry_run {
        writeln!(std::io::stdout().lock(), "{}", response.body)?;
    }
    Ok(())
}
