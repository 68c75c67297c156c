//! NeuroLab CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! neurolab-cli migrate
//!
//! # Create a staff account
//! neurolab-cli staff create -u root -p 'a long passphrase'
//!
//! # Promote an existing member to staff
//! neurolab-cli staff promote -u ada
//!
//! # Seed the catalog with demo data
//! neurolab-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `staff create` / `staff promote` - Manage staff accounts
//! - `seed` - Seed the catalog with demo data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "neurolab-cli")]
#[command(author, version, about = "NeuroLab CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage staff accounts
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
    /// Seed the catalog with demo data
    Seed {
        /// Seed even if the catalog already contains records
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Create a new staff account
    Create {
        /// Username for the new account
        #[arg(short, long)]
        username: String,

        /// Password for the new account
        #[arg(short, long)]
        password: String,

        /// Email address
        #[arg(short, long, default_value = "")]
        email: String,
    },
    /// Promote an existing member to staff
    Promote {
        /// Username of the member to promote
        #[arg(short, long)]
        username: String,
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
        Commands::Staff { action } => match action {
            StaffAction::Create {
                username,
                password,
                email,
            } => {
                commands::staff::create(&username, &password, &email).await?;
            }
            StaffAction::Promote { username } => {
                commands::staff::promote(&username).await?;
            }
        },
        Commands::Seed { force } => commands::seed::run(force).await?,
    }
    Ok(())
}
