use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::http::router::Router;

/// Accepts connections forever, serving each one on its own task.
///
/// `router` must be fully built; it is only ever read from here on.
pub async fn run(cfg: &Config, router: Arc<Router>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.listen_addr))?;
    info!("Listening on {}", cfg.server.listen_addr);

    serve(listener, router).await
}

pub async fn serve(listener: TcpListener, router: Arc<Router>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        info!(%peer, "Accepted connection");

        let router = Arc::clone(&router);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, router);
            if let Err(e) = conn.run().await {
                tracing::error!(%peer, error = %e, "Connection error");
            }
        });
    }
}
