use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

use agora_core::idp::client::HttpIdpClient;
use agora_server::rate_limit::FixedWindowLimiter;
use agora_server::AppState;

use super::{load_config, open_store};

/// Run the `serve` command: start the admin gateway.
pub async fn run(config_path: &str, port_override: Option<u16>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let port = port_override.unwrap_or(config.server.port);

    let repo = open_store(&config).await?;
    let provider = HttpIdpClient::new(
        &config.idp.base_url,
        &config.idp.service_key,
        config.idp.page_size,
    );

    let window = Duration::from_secs(config.server.rate_limit.window_secs);
    let state = Arc::new(AppState {
        repo,
        provider: Arc::new(provider),
        sync_limiter: FixedWindowLimiter::new(window, config.server.rate_limit.sync_limit),
        status_limiter: FixedWindowLimiter::new(window, config.server.rate_limit.status_limit),
    });

    // Security headers on every response
    let app = agora_server::router(state)
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    println!("Agora admin gateway listening on http://{}", addr);
    info!("Starting server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C handler");
    info!("Received shutdown signal");
}
