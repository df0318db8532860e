use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::http::transport::TcpTransport;
use crate::server::Server;

/// Accepts connections and spawns a drive task per socket.
pub async fn run(cfg: &Config, server: Arc<dyn Server>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", cfg.server.listen_addr);

    let linger = cfg.server.linger_secs.map(Duration::from_secs);
    loop {
        let (socket, peer) = listener.accept().await?;
        tracing::debug!("Accepted connection from {}", peer);

        if let Err(e) = socket.set_linger(linger) {
            tracing::info!("Unable to set linger on socket: {}", e);
        }

        let server = Arc::clone(&server);
        tokio::spawn(async move {
            let mut conn = Connection::new(server, TcpTransport::new(socket), peer);
            if let Err(e) = conn.run().await {
                tracing::debug!(peer = %peer, "Connection error: {}", e);
            }
        });
    }
}
