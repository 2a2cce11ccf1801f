//! Example: Pricing Dashboard
//!
//! Logs in (or reuses a session saved by a previous run), then prints the
//! product catalog, compositions and the active subscription.
//!
//! Environment:
//! - `PRICING_API_URL`: API root (default `http://localhost:8000/api`)
//! - `PRICING_EMAIL` / `PRICING_PASSWORD`: credentials, used when no saved
//!   session exists
//! - `PRICING_LOUD_WIRE=1`: dump requests and responses to stderr
//!
//! Run with: cargo run --example dashboard

use pricing_client::{ClientBuilder, ClientError, FileStore, Session};
use std::env;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let store = Arc::new(FileStore::new(".pricing-session"));
    let session = Arc::new(Session::init(store)?);
    let client = ClientBuilder::from_env()
        .session(session)
        .timeout(Duration::from_secs(30))
        .build()?;

    println!("API: {}\n", client.base_url());

    if client.session().is_authenticated() {
        println!("Reusing saved session");
    } else {
        let email = env::var("PRICING_EMAIL").expect("PRICING_EMAIL not found in environment");
        let password =
            env::var("PRICING_PASSWORD").expect("PRICING_PASSWORD not found in environment");
        match client.login(&email, &password).await {
            Ok(user) => println!("Logged in as {}", user.email),
            Err(e) => {
                let message = e.server_message().unwrap_or_else(|| e.to_string());
                eprintln!("Login failed: {message}");
                return Ok(());
            }
        }
    }

    // =========================================================================
    // Products
    // =========================================================================
    println!("\n=== Products ===\n");
    match client.products().list().await {
        Ok(products) => {
            for product in &products {
                println!(
                    "{:>5}  {:<12} {:<30} {:>10} / {}",
                    product.id, product.sku, product.name, product.cost_price, product.unit
                );
            }
            println!("\n{} products", products.len());
        }
        Err(e) => return report(&e),
    }

    // =========================================================================
    // Compositions
    // =========================================================================
    println!("\n=== Compositions ===\n");
    match client.compositions().list().await {
        Ok(compositions) => {
            for composition in &compositions {
                println!(
                    "#{} -> product {} ({} items, fixed extra {})",
                    composition.id,
                    composition.finished_product,
                    composition.items.len(),
                    composition.fixed_extra_cost
                );
            }
        }
        Err(e) => return report(&e),
    }

    // =========================================================================
    // Subscription
    // =========================================================================
    println!("\n=== Subscription ===\n");
    match client.subscriptions().active().await {
        Ok(Some(subscription)) => println!(
            "Plan {} ({:?}), renews: {}",
            subscription.plan, subscription.status, subscription.auto_renew
        ),
        Ok(None) => println!("No active subscription"),
        Err(e) => return report(&e),
    }

    Ok(())
}

fn report(e: &ClientError) -> Result<(), Box<dyn Error>> {
    if e.is_session_expired() {
        eprintln!("Session expired; run again to log in.");
        return Ok(());
    }
    let message = e.server_message().unwrap_or_else(|| e.to_string());
    eprintln!("Request failed: {message}");
    Ok(())
}
