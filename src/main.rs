//! tenancy-api - main entry point

use tenancy_api::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("tenancy-api v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::from_env();
    let state = tenancy_api::build_state(settings.clone()).await?;

    // Clean up anything a previous process left mid-provisioning.
    if let Err(e) = state.provisioner.reconcile().await {
        tracing::warn!(error = %e, "startup reconciliation failed");
    }

    let reconciler = state.provisioner.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(settings.reconcile_interval);
        ticker.tick().await; // first tick fires immediately, already swept above
        loop {
            ticker.tick().await;
            if let Err(e) = reconciler.reconcile().await {
                tracing::warn!(error = %e, "reconciliation sweep failed");
            }
        }
    });

    let app = tenancy_api::build_router(state);
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", settings.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
