//! Finance tracker real-time notification server.
//!
//! Runs the WebSocket listener over a [`NotificationService`]. Notifications
//! are raised by the services embedding it, through
//! `NotificationService::create_notification` and
//! `NotificationService::change_status`; this binary only delivers them.

use std::sync::Arc;

use http::HeaderValue;
use secrecy::ExposeSecret;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use finance_tracker::adapters::{InMemoryNotificationRepository, JwtSessionValidator};
use finance_tracker::app::NotificationService;
use finance_tracker::config::{AppConfig, AuthConfig, ConfigError, ServerConfig, ValidationError};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let service = NotificationService::new(
        Arc::new(InMemoryNotificationRepository::new()),
        Arc::new(session_validator(&config.auth)),
        config.realtime.connection_settings(),
    );

    let app = service
        .router()
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        mailbox_capacity = config.realtime.mailbox_capacity,
        "Notification server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Notification server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| server.log_level.as_str().into());

    if server.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn session_validator(auth: &AuthConfig) -> JwtSessionValidator {
    let mut validator = JwtSessionValidator::new(auth.jwt_secret.expose_secret().as_bytes())
        .with_leeway(auth.jwt_leeway_secs);
    if let Some(issuer) = &auth.jwt_issuer {
        validator = validator.with_issuer(issuer);
    }
    if let Some(audience) = &auth.jwt_audience {
        validator = validator.with_audience(audience);
    }
    validator
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() && !server.is_production() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
