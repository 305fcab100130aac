//! WebSocket upgrade handler for real-time notification connections.
//!
//! Admission happens before the upgrade:
//! 1. Require a WebSocket upgrade request
//! 2. Take the bearer token from `?token=` or `Authorization: Bearer`
//! 3. Validate it through the `SessionValidator` port
//! 4. Upgrade, register the connection, run it until disconnect

use std::sync::Arc;

use axum::{
    extract::{
        rejection::QueryRejection,
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        Query, State,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::StreamExt;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

use super::connection::{Connection, ConnectionSettings};
use super::registry::ConnectionRegistry;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct RealtimeState {
    pub registry: Arc<ConnectionRegistry>,
    pub validator: Arc<dyn SessionValidator>,
    pub settings: ConnectionSettings,
}

impl RealtimeState {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        validator: Arc<dyn SessionValidator>,
        settings: ConnectionSettings,
    ) -> Self {
        Self {
            registry,
            validator,
            settings,
        }
    }
}

/// Query string accepted on the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Reasons an upgrade request is turned away. No connection exists yet.
#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("WebSocket upgrade required")]
    UpgradeRequired,

    #[error("Missing access token")]
    MissingToken,

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl AdmissionError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdmissionError::UpgradeRequired => StatusCode::BAD_REQUEST,
            AdmissionError::MissingToken => StatusCode::UNAUTHORIZED,
            AdmissionError::Auth(AuthError::ServiceUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AdmissionError::Auth(_) => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AdmissionError::UpgradeRequired => "UPGRADE_REQUIRED",
            AdmissionError::MissingToken => "MISSING_TOKEN",
            AdmissionError::Auth(_) => "AUTH_ERROR",
        }
    }
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        let message = match &self {
            AdmissionError::Auth(AuthError::ServiceUnavailable(msg)) => {
                error!("Auth service unavailable: {}", msg);
                "Authentication service unavailable".to_string()
            }
            other => other.to_string(),
        };

        (
            self.status(),
            Json(serde_json::json!({
                "error": message,
                "code": self.code()
            })),
        )
            .into_response()
    }
}

/// Picks the bearer token; the query parameter wins over the header.
pub fn extract_token<'a>(query_token: Option<&'a str>, headers: &'a HeaderMap) -> Option<&'a str> {
    query_token
        .filter(|t| !t.is_empty())
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .filter(|t| !t.is_empty())
        })
}

/// Validates the credential presented on an upgrade request.
pub async fn authenticate_upgrade(
    validator: &dyn SessionValidator,
    query_token: Option<&str>,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, AdmissionError> {
    let token = extract_token(query_token, headers).ok_or(AdmissionError::MissingToken)?;
    Ok(validator.validate(token).await?)
}

/// Handle WebSocket upgrade requests for notifications.
///
/// Route: `GET /ws/notifications`
pub async fn ws_handler(
    State(state): State<RealtimeState>,
    headers: HeaderMap,
    query: Result<Query<TokenQuery>, QueryRejection>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, AdmissionError> {
    let ws = ws.map_err(|e| {
        debug!(error = %e, "Rejected non-upgrade request");
        AdmissionError::UpgradeRequired
    })?;

    let query = query.map(|Query(q)| q).unwrap_or_default();
    let user = authenticate_upgrade(state.validator.as_ref(), query.token.as_deref(), &headers)
        .await
        .map_err(|e| {
            debug!(code = e.code(), "Rejected WebSocket admission");
            e
        })?;

    let RealtimeState {
        registry, settings, ..
    } = state;

    Ok(ws.on_upgrade(move |socket| async move {
        let connection = Connection::open(registry, user.id, settings).await;
        debug!(
            connection_id = %connection.id(),
            user_id = %connection.user_id(),
            "WebSocket connection opened"
        );
        let (sink, stream) = socket.split();
        connection.run(sink, stream).await;
    }))
}

/// Liveness check with the current connection count.
///
/// Route: `GET /health`
pub async fn health_handler(State(state): State<RealtimeState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "connections": state.registry.total_clients().await
    }))
}

/// Create axum router for the realtime endpoints.
///
/// # Example
///
/// ```ignore
/// let app = realtime_router().with_state(state);
/// ```
pub fn realtime_router() -> Router<RealtimeState> {
    Router::new()
        .route("/ws/notifications", get(ws_handler))
        .route("/health", get(health_handler))
}
