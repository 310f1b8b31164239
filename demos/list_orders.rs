//! Example demonstrating environment bootstrap and error handling.
//!
//! This example shows how to:
//! - Read configuration from the process environment
//! - Set up `tracing` output for the request pipeline
//! - Fetch the current user and a filtered list of orders
//! - Inspect a rejected request's status, message and error list
//!
//! Run with: `OLC_API_KEY=... cargo run --example list_orders`

use olc::{Config, Error, Olc};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("olc=debug,list_orders=info")
        .init();

    let config = Config::from_env()?;
    println!("Environment: {}", config.environment.name());
    let olc = Olc::new(config)?;

    println!("=== Current user ===");
    let me = olc.user().me().await?;
    println!("{}", serde_json::to_string_pretty(&me["data"])?);
    println!();

    println!("=== Mailed orders ===");
    let query = json!({"orderStatus": "MAILED", "page": 1, "perPage": 10});
    match olc.orders().all(query.as_object().unwrap()).await {
        Ok(orders) => println!("{}", serde_json::to_string_pretty(&orders["data"])?),
        Err(Error::Transport(e)) => {
            println!("Request rejected!");
            println!("  Status: {}", e.status());
            println!("  Message: {}", e.message());
            for detail in e.error_list() {
                println!("  Error: {}", detail);
            }
        }
        Err(e) => return Err(e.into()),
    }
    println!();

    println!("=== Validation happens before any request ===");
    let bad = json!({"productId": 1, "templateId": 2, "returnAddress": null});
    match olc.orders().create(bad.as_object().unwrap()).await {
        Err(e) if e.is_validation() => println!("Rejected locally: {}", e),
        other => println!("Unexpected: {:?}", other.map(|v| v["message"].clone())),
    }

    Ok(())
}
