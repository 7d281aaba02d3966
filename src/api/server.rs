use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::error::{Result, ServeError};
use crate::service::Predictor;

/// Bind `host:port` and serve until `shutdown` resolves.
pub async fn start_server_with_shutdown<F>(
    predictor: Arc<Predictor>,
    host: &str,
    port: u16,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{host}:{port}").parse().map_err(|e| {
        ServeError::InvalidConfig(format!("bad listen address {host}:{port}: {e}"))
    })?;
    let listener = TcpListener::bind(addr).await?;
    serve(listener, predictor, shutdown).await
}

/// Serve predictions on an already-bound listener. In-flight requests finish
/// before this returns.
pub async fn serve<F>(listener: TcpListener, predictor: Arc<Predictor>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(AppState::new(predictor));
    info!(
        "Prediction server listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Prediction server stopped");
    Ok(())
}
