//! Arrivo CLI - catalog seeding and account management tools.
//!
//! # Usage
//!
//! ```bash
//! # Seed every demo catalog collection
//! arrivo-cli seed catalog
//!
//! # Seed one collection only
//! arrivo-cli seed catalog --collection products
//!
//! # Register an account (and its profile document)
//! arrivo-cli account register -e user@example.com -p secret123 -n "User Name"
//!
//! # Inspect a profile document
//! arrivo-cli account show -u some-uid
//! ```
//!
//! # Commands
//!
//! - `seed catalog` - Write demo catalog documents to the document store
//! - `account register` - Register an account through the real flow
//! - `account show` - Fetch and print a profile document

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "arrivo-cli")]
#[command(author, version, about = "Arrivo CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the document store with demo data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Seed the demo catalog (products, services, spaces, events, listings, helpers)
    Catalog {
        /// Seed only this collection
        #[arg(short, long)]
        collection: Option<String>,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Register a new account
    Register {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show the profile document for a UID
    Show {
        /// Identity-provider UID
        #[arg(short, long)]
        uid: String,
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
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { collection } => {
                commands::seed::catalog(collection.as_deref()).await?;
            }
        },
        Commands::Account { action } => match action {
            AccountAction::Register {
                email,
                password,
                name,
                phone,
            } => {
                commands::account::register(&email, &password, &name, phone.as_deref()).await?;
            }
            AccountAction::Show { uid } => commands::account::show(&uid).await?,
        },
    }
    Ok(())
}
