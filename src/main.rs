mod config;
mod http;
mod server;
mod ws;

use std::sync::Arc;

use config::Config;
use server::Endpoints;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let cfg = Config::load();
    let mut endpoints = Endpoints::new(cfg.static_files.root.clone());
    endpoints.set_index_file(cfg.static_files.index.clone());
    let endpoints = Arc::new(endpoints);

    tokio::select! {
        res = server::listener::run(&cfg, endpoints) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
