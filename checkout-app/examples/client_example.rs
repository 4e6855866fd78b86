//! Client example walking through a checkout against a running server.
//!
//! Run with: cargo run -p checkout-app --example client_example --no-default-features --features sqlite

use checkout_client::CheckoutClient;
use checkout_hex::{CheckoutService, inbound::HttpServer};
use checkout_repo::build_repo;
use checkout_types::checkout::{Action, CheckoutState, Effect, Grid, SubMethod};
use checkout_types::{
    Amount, CreateGatewayRequest, CreateTransactionRequest, Currency, Provider, SubType, UserId,
};
use std::net::SocketAddr;
use tempfile::tempdir;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let port = addr.port();

    // Use a temp file-backed SQLite DB
    let tmp = tempdir()?;
    let db_path = tmp.path().join("checkout.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    println!("🚀 Starting server on port {port}...");
    println!("   Database: {db_url}");

    let repo = build_repo(&db_url).await?;
    let router = HttpServer::new(CheckoutService::new(repo)).router();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router.into_make_service()).await {
            eprintln!("server error: {e}");
        }
    });

    let client = CheckoutClient::new(format!("http://127.0.0.1:{port}"));

    let health = client.health().await?;
    println!("✅ Server health: {health}");

    // Nothing seeded yet: the page still gets the built-in methods
    let methods = client.payment_methods_or_fallback().await;
    println!("✅ Payment methods: {}", methods.len());

    let unauthorized = client
        .create_gateway(&CreateGatewayRequest::draft(
            "Nagad Personal",
            Provider::Nagad,
            SubType::Personal,
        ))
        .await;
    if let Err(e) = unauthorized {
        println!("✅ Unauthorized without key: {e}");
    }

    let key = client.bootstrap("example").await?;
    println!("✅ Admin key generated: {key}");
    let admin = CheckoutClient::new(format!("http://127.0.0.1:{port}")).with_api_key(key);

    let mut draft = CreateGatewayRequest::draft("Nagad Personal", Provider::Nagad, SubType::Personal);
    draft.status = true;
    draft.config = Some(serde_json::json!({ "walletNumber": "01700000000" }));
    let gateway = admin.create_gateway(&draft).await?;
    println!("✅ Created gateway: {} (id={})", gateway.display_name, gateway.id);

    // Walk the selection flow the checkout page runs
    let nagad = Grid::MobileBanking
        .options()
        .into_iter()
        .find(|o| o.id == "nagad")
        .ok_or_else(|| anyhow::anyhow!("nagad tile missing"))?;
    let (state, _) = CheckoutState::default().choose(nagad);
    let (_, effect) = state.reduce(Action::SelectSubMethod(SubMethod::Personal));
    if let Some(Effect::Navigate(route)) = effect {
        println!("✅ Checkout navigates to {}", route.path());
    }

    let tx = client
        .create_transaction(&CreateTransactionRequest {
            amount: Amount::whole(2200),
            currency: Currency::BDT,
            method: Provider::Nagad,
            user_id: UserId::new("demo-user"),
        })
        .await?;
    println!("✅ Recorded transaction {} ({} {})", tx.id, tx.amount, tx.status);

    let transactions = admin.list_transactions().await?;
    println!("\n📋 Transactions:");
    for t in transactions {
        println!(
            "   - {} {} {} via {}",
            t.transaction.id, t.transaction.amount, t.transaction.status, t.transaction.method
        );
    }

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
