use anyhow::Result;
use tokio::sync::watch;

use caregate_engine::api;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    println!("Starting Caregate...\n");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let api_handle = tokio::spawn(async move {
        if let Err(e) = api::start_server(shutdown_rx).await {
            eprintln!("API server crashed: {}", e);
        }
    });

    // Wait for Ctrl+C
    tokio::signal::ctrl_c().await?;
    println!("\nReceived shutdown signal...");

    let _ = shutdown_tx.send(true);
    let _ = api_handle.await;

    println!("Caregate shutdown complete.");
    Ok(())
}
