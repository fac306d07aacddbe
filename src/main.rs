// headline-cache - rate-limited news cache with synthetic fallback
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use headline_cache::cli::Args;
use headline_cache::config::AppConfig;
use headline_cache::markets::MarketService;
use headline_cache::news::NewsService;
use headline_cache::server::create_router;
use headline_cache::upstream;
use headline_cache::utils::logging;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration, CLI flags last
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting headline-cache v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Build the news and market services
    let source = upstream::from_config(&config.upstream)?;
    let news = NewsService::new(&config.news, source);
    let markets = MarketService::new(&config.markets);

    if args.warm {
        info!("Warming news cache...");
        news.warm().await;
    }

    // Phase 4: Build and start HTTP server
    let app = create_router(config.clone(), news.clone(), markets);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 5: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    news.shutdown();
    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
