use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;

use super::routes::create_router;
use crate::trace::{LogSink, TraceSink};

#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub trace: Arc<dyn TraceSink>,
}

pub async fn start_server(shutdown_rx: watch::Receiver<bool>) -> Result<()> {
    let state = AppState {
        client: reqwest::Client::new(),
        trace: Arc::new(LogSink),
    };

    let app = create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    println!("Caregate API server listening on http://0.0.0.0:8080");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await?;

    Ok(())
}

async fn shutdown_signal(mut shutdown_rx: watch::Receiver<bool>) {
    // Wait for shutdown signal
    while !*shutdown_rx.borrow() {
        if shutdown_rx.changed().await.is_err() {
            break;
        }
    }
    println!("Shutting down API server...");
}
