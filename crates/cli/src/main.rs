//! Web Larek CLI - shop client for the terminal.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog
//! larek catalog
//!
//! # Show one item (or just its current title and price)
//! larek item 854cef69-976d-4c2a-a18c-2aa45046c390
//! larek item 854cef69-976d-4c2a-a18c-2aa45046c390 --brief
//!
//! # Place an order
//! larek order -e buyer@example.com -p "+7 999 000-00-00" -a "Moscow" \
//!     854cef69-976d-4c2a-a18c-2aa45046c390 b06cde61-912f-4663-9751-09956c0eed67
//! ```
//!
//! # Commands
//!
//! - `catalog` - List every catalog item
//! - `item` - Show one item
//! - `order` - Fill the basket and checkout form, then submit
//!
//! Configuration comes from `LAREK_*` environment variables (or `.env`);
//! `--api-origin` overrides `LAREK_API_ORIGIN`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use larek_core::OrderDraft;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "larek")]
#[command(author, version, about = "Web Larek shop client")]
struct Cli {
    /// Shop backend origin (overrides `LAREK_API_ORIGIN`)
    #[arg(long, global = true)]
    api_origin: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the catalog
    Catalog,
    /// Show one catalog item
    Item {
        /// Item id
        id: String,

        /// Only fetch the current title and price
        #[arg(long)]
        brief: bool,
    },
    /// Place an order for the given items
    Order {
        /// Buyer email address
        #[arg(short, long)]
        email: String,

        /// Buyer phone number
        #[arg(short, long)]
        phone: String,

        /// Delivery address
        #[arg(short, long)]
        address: String,

        /// Payment method label
        #[arg(long, default_value = "online")]
        payment: String,

        /// Ids of the items to buy
        #[arg(required = true)]
        items: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing; logs go to stderr so command output stays clean
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "larek=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let shop = commands::Shop::connect(cli.api_origin.as_deref())?;

    match cli.command {
        Commands::Catalog => commands::catalog::list(&shop).await?,
        Commands::Item { id, brief } => {
            if brief {
                commands::item::brief(&shop, &id).await?;
            } else {
                commands::item::show(&shop, &id).await?;
            }
        }
        Commands::Order {
            email,
            phone,
            address,
            payment,
            items,
        } => {
            let form = OrderDraft {
                payment,
                email,
                phone,
                address,
                items: Vec::new(),
            };
            commands::order::place(&shop, &form, &items).await?;
        }
    }
    Ok(())
}
