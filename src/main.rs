use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use workout_tracker::{
    calendar::CalendarView,
    config::{resolve_port, resolve_seed_users, resolve_store_url},
    router, AppState, HttpDocumentStore, Tracker,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let store = HttpDocumentStore::new(resolve_store_url()?)?;
    info!("document store at {}", store.base());

    let tracker = Tracker::new(Arc::new(store), resolve_seed_users(), CalendarView::current());
    if let Err(err) = tracker.start().await {
        error!("failed to load the first user: {err}");
    }

    let app = router(AppState::new(tracker));
    let addr = SocketAddr::from(([0, 0, 0, 0], resolve_port()));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
