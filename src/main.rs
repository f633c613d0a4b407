//! RAX storage node - Entry Point
//!
//! Usage: rax-storage-node [node_name] [port] [base_path]

use log::{error, info};
use std::sync::Arc;

use rax_storage_node::error::handlers::handle_error;
use rax_storage_node::utils::logging::setup_logging;
use rax_storage_node::utils::network::advertised_host;
use rax_storage_node::{CliOverrides, NodeConfig, NodeError, NodeFileService, Server};

#[tokio::main]
async fn main() {
    setup_logging();

    info!("Launching storage node...");

    let config = match CliOverrides::from_args(std::env::args().skip(1))
        .and_then(|cli| NodeConfig::load(&cli))
    {
        Ok(config) => config,
        Err(e) => {
            handle_error(&NodeError::from(e));
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        handle_error(&e);
        std::process::exit(1);
    }
}

async fn run(config: NodeConfig) -> Result<(), NodeError> {
    let host = advertised_host(config.advertised_host.as_deref());
    let service = Arc::new(NodeFileService::from_config(&config));
    let server = Server::bind(config, Arc::clone(&service)).await?;

    info!("Storage node registered");
    info!("  Node name:    {}", server.config().node_name);
    info!("  Host:         {}", host);
    info!("  Port:         {}", server.local_addr()?.port());
    info!("  Storage path: {}", service.base_path().display());
    info!("  Workers:      {}", service.executor().worker_count());

    server
        .serve_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    service.shutdown().await;
    info!("Storage node {} stopped", server.config().node_name);
    Ok(())
}
