//! Checkout CLI
//!
//! Command-line interface for the Checkout API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use checkout_client::CheckoutClient;
use checkout_types::{
    Amount, CreateGatewayRequest, CreatePaymentMethodRequest, CreateTransactionRequest, Currency,
    GatewayId, Provider, SubType, UpdateGatewayRequest, UserId,
};

#[derive(Parser)]
#[command(name = "checkout")]
#[command(author, version, about = "Checkout API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Checkout API
    #[arg(
        long,
        env = "CHECKOUT_API_URL",
        default_value = "http://localhost:3201"
    )]
    api_url: String,

    /// Admin API key
    #[arg(long, env = "CHECKOUT_API_KEY")]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Gateway configuration
    Gateway {
        #[command(subcommand)]
        action: GatewayCommands,
    },
    /// Payment methods shown on the checkout page
    Method {
        #[command(subcommand)]
        action: MethodCommands,
    },
    /// Checkout transactions
    Tx {
        #[command(subcommand)]
        action: TxCommands,
    },
    /// Admin console listings
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },
    /// Bootstrap the first admin API key
    Bootstrap {
        /// Name for the new API key
        #[arg(long, default_value = "admin-console")]
        name: String,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum GatewayCommands {
    /// List all gateways
    List,
    /// Show what the checkout modal offers under a tile
    Choices {
        /// Tile id, e.g. bkash or ibbl
        option: String,
    },
    /// Get gateway details
    Get {
        /// Gateway ID (UUID)
        id: String,
    },
    /// Create a gateway
    Create {
        /// Internal name, e.g. "Nagad Personal"
        name: String,
        /// Provider key (bkash, nagad, rocket, upay, cellfin, ibbl)
        #[arg(long)]
        identifier: String,
        /// personal, agent, merchant or api
        #[arg(long, default_value = "personal")]
        sub_type: String,
        /// Receiving wallet for mobile-banking providers
        #[arg(long)]
        wallet_number: Option<String>,
        /// Enable immediately
        #[arg(long)]
        enable: bool,
    },
    /// Update a gateway; omitted flags are left unchanged
    Update {
        id: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        min_amount: Option<String>,
        #[arg(long)]
        max_amount: Option<String>,
        /// Empty text clears the instructions
        #[arg(long)]
        instructions: Option<String>,
        /// Raw JSON config object
        #[arg(long)]
        config: Option<String>,
    },
    /// Enable or disable a gateway
    Status {
        id: String,
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Delete a gateway
    Delete { id: String },
}

#[derive(Subcommand)]
enum MethodCommands {
    /// List active payment methods
    List,
    /// Create or replace a payment method by name
    Create {
        name: String,
        #[arg(long)]
        icon: String,
        #[arg(long)]
        inactive: bool,
    },
}

#[derive(Subcommand)]
enum TxCommands {
    /// List all transactions
    List,
    /// Submit a checkout
    Create {
        #[arg(long)]
        amount: String,
        /// Provider key the customer paid with
        #[arg(long)]
        method: String,
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "BDT")]
        currency: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    Customers,
    Invoices,
    Links,
    Sms,
}

fn parse_gateway_id(s: &str) -> Result<GatewayId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid gateway ID: {}", s))
}

fn parse_amount(s: &str) -> Result<Amount> {
    Ok(s.parse::<Amount>()?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = CheckoutClient::new(&cli.api_url);
    if let Some(key) = cli.api_key {
        client = client.with_api_key(key);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Bootstrap { name } => {
            let api_key = client.bootstrap(&name).await?;
            println!("{}", api_key);
        }

        Commands::Gateway { action } => match action {
            GatewayCommands::List => print_json(&client.list_gateways().await?)?,
            GatewayCommands::Choices { option } => {
                print_json(&client.gateway_choices(&option).await?)?
            }
            GatewayCommands::Get { id } => {
                print_json(&client.get_gateway(parse_gateway_id(&id)?).await?)?
            }
            GatewayCommands::Create {
                name,
                identifier,
                sub_type,
                wallet_number,
                enable,
            } => {
                let identifier: Provider = identifier.parse()?;
                let sub_type: SubType = sub_type.parse()?;
                let mut req = CreateGatewayRequest::draft(name, identifier, sub_type);
                req.status = enable;
                req.config = wallet_number.map(|n| serde_json::json!({ "walletNumber": n }));
                print_json(&client.create_gateway(&req).await?)?;
            }
            GatewayCommands::Update {
                id,
                display_name,
                min_amount,
                max_amount,
                instructions,
                config,
            } => {
                let patch = UpdateGatewayRequest {
                    display_name,
                    min_amount: min_amount.as_deref().map(parse_amount).transpose()?,
                    max_amount: max_amount.as_deref().map(parse_amount).transpose()?,
                    instructions,
                    config: config.as_deref().map(serde_json::from_str).transpose()?,
                    ..Default::default()
                };
                print_json(
                    &client
                        .update_gateway(parse_gateway_id(&id)?, &patch)
                        .await?,
                )?;
            }
            GatewayCommands::Status { id, enabled } => print_json(
                &client
                    .set_gateway_status(parse_gateway_id(&id)?, enabled)
                    .await?,
            )?,
            GatewayCommands::Delete { id } => {
                client.delete_gateway(parse_gateway_id(&id)?).await?;
                println!("✓ Gateway deleted");
            }
        },

        Commands::Method { action } => match action {
            MethodCommands::List => print_json(&client.list_payment_methods().await?)?,
            MethodCommands::Create {
                name,
                icon,
                inactive,
            } => {
                let req = CreatePaymentMethodRequest {
                    name,
                    icon,
                    active: !inactive,
                    config: serde_json::json!({ "type": "personal" }),
                };
                print_json(&client.create_payment_method(&req).await?)?;
            }
        },

        Commands::Tx { action } => match action {
            TxCommands::List => print_json(&client.list_transactions().await?)?,
            TxCommands::Create {
                amount,
                method,
                user,
                currency,
            } => {
                let req = CreateTransactionRequest {
                    amount: parse_amount(&amount)?,
                    currency: currency.parse::<Currency>()?,
                    method: method.parse()?,
                    user_id: UserId::new(user),
                };
                print_json(&client.create_transaction(&req).await?)?;
            }
        },

        Commands::Admin { action } => match action {
            AdminCommands::Customers => print_json(&client.customers().await?)?,
            AdminCommands::Invoices => print_json(&client.invoices().await?)?,
            AdminCommands::Links => print_json(&client.payment_links().await?)?,
            AdminCommands::Sms => print_json(&client.sms_data().await?)?,
        },
    }

    Ok(())
}
