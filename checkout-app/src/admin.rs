//! # Checkout Admin
//!
//! Operator tool that talks to the store directly: seeds the payment
//! methods, registers and promotes users, and issues admin API keys.

use anyhow::Result;
use clap::{Parser, Subcommand};

use checkout_repo::build_repo;
use checkout_types::{
    CheckoutRepository, CreatePaymentMethodRequest, CreateUserRequest, PaymentMethod, Role, UserId,
};

#[derive(Parser)]
#[command(name = "checkout-admin")]
#[command(author, version, about = "Checkout store administration", long_about = None)]
struct Cli {
    /// Database URL (sqlite:// or postgres://)
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert or refresh the built-in payment methods
    Seed,
    /// User management
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Admin API keys
    Key {
        #[command(subcommand)]
        action: KeyCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a customer
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Grant the admin role
    Promote {
        #[arg(long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Issue a new admin API key (printed once)
    Create {
        #[arg(long)]
        name: String,
    },
}

/// Requests that (re)create the built-in payment methods.
fn seed_requests() -> Vec<CreatePaymentMethodRequest> {
    PaymentMethod::fallback()
        .into_iter()
        .map(|m| CreatePaymentMethodRequest {
            name: m.name,
            icon: m.icon,
            active: true,
            config: serde_json::json!({ "type": "personal" }),
        })
        .collect()
}

async fn seed(repo: &impl CheckoutRepository) -> Result<usize> {
    let mut count = 0;
    for req in seed_requests() {
        let method = repo.upsert_payment_method(req).await?;
        tracing::info!(name = %method.name, "Payment method seeded");
        count += 1;
    }
    Ok(count)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let repo = build_repo(&cli.database_url).await?;

    match cli.command {
        Commands::Seed => {
            let count = seed(&repo).await?;
            println!("✓ Seeded {} payment methods", count);
        }
        Commands::User { action } => match action {
            UserCommands::Create { id, name, email } => {
                let user = repo
                    .create_user(CreateUserRequest {
                        id: UserId::new(id),
                        name,
                        email,
                    })
                    .await?;
                println!("{}", serde_json::to_string_pretty(&user)?);
            }
            UserCommands::Promote { email } => {
                let user = repo.set_user_role(&email, Role::Admin).await?;
                println!("✓ {} is now {}", user.email, user.role);
            }
        },
        Commands::Key { action } => match action {
            KeyCommands::Create { name } => {
                let (key, raw_key) = repo.create_api_key(&name).await?;
                tracing::info!(key_id = %key.id, "Admin API key issued");
                println!("{}", raw_key);
            }
        },
    }

    Ok(())
}
