use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::info;

use common_auth::{TokenConfig, TokenService};
use storefront_service::app::{build_router, AppState};
use storefront_service::config::AppConfig;
use storefront_service::gateway::StripeGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = AppConfig::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;
    sqlx::migrate!("./migrations").run(&db).await?;

    if config.mail.is_some() {
        info!("mail relay credentials configured");
    } else {
        info!("mail relay credentials not set; outbound mail disabled");
    }

    let tokens = Arc::new(TokenService::new(&TokenConfig::new(
        config.token_secret.clone(),
    )));
    let gateway = Arc::new(StripeGateway::new(
        config.gateway.secret_key.clone(),
        config.gateway.api_base.clone(),
    ));

    let state = AppState {
        db: db.clone(),
        tokens,
        gateway,
    };
    let app = build_router(state);

    let ip: IpAddr = config.host.parse().context("HOST is not a valid address")?;
    let addr = SocketAddr::from((ip, config.port));
    println!("starting storefront-service on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drains the pool so in-flight statements finish before exit.
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
}
