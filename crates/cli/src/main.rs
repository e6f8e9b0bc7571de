//! Upsell CLI - Database migrations and offer previews.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! upsell-cli migrate
//!
//! # Print the offers a shop's checkout would receive
//! upsell-cli offers --shop dark-roast.myshopify.com
//!
//! # Print the change request for the second variant as a subscription
//! upsell-cli changes --shop dark-roast.myshopify.com --variant 1 --subscription
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `offers` - Fetch offers for a shop
//! - `changes` - Preview the change request the extension submits

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "upsell-cli")]
#[command(author, version, about = "Post-purchase upsell CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Fetch offers for a shop using its stored session
    Offers {
        /// Shop domain (e.g., dark-roast.myshopify.com)
        #[arg(short, long)]
        shop: String,
    },
    /// Preview the change request for an offer selection
    Changes {
        /// Shop domain (e.g., dark-roast.myshopify.com)
        #[arg(short, long)]
        shop: String,

        /// Offer index
        #[arg(short, long, default_value_t = 0)]
        offer: usize,

        /// Variant index within the offer
        #[arg(short, long, default_value_t = 0)]
        variant: usize,

        /// Subscribe instead of buying once
        #[arg(long)]
        subscription: bool,

        /// Quantity (1-5)
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Offers { shop } => commands::offers::run(&shop).await?,
        Commands::Changes {
            shop,
            offer,
            variant,
            subscription,
            quantity,
        } => {
            let selection = commands::changes::Selection {
                offer,
                variant,
                subscription,
                quantity,
            };
            commands::changes::run(&shop, &selection).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_changes_defaults() {
        let cli = Cli::try_parse_from(["upsell-cli", "changes", "--shop", "dark-roast.myshopify.com"])
            .unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Commands::Changes {
                offer,
                variant,
                subscription,
                quantity,
                ..
            } => {
                assert_eq!((offer, variant, subscription, quantity), (0, 0, false, 1));
            }
            _ => panic!("expected changes command"),
        }
    }
}
