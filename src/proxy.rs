//! The HTTP proxy endpoint.
//!
//! One route, `POST /api/chat`, accepts `{"messages": [...]}`, relays the
//! conversation to the configured completion API and answers with the first
//! candidate as `{"role": "assistant", "content": ...}`.  The handler holds no
//! state between calls; every request carries the full history.
//!
//! Failures never leak detail: the error is logged and the caller receives
//! `{"error": ...}` with a fixed, locale-specific message.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;

use crate::client::{CompletionApi, Completions};
use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use crate::locale::Locale;
use crate::observability::{PROXY_BAD_REQUESTS, PROXY_REQUESTS, PROXY_UPSTREAM_ERRORS};
use crate::types::{ChatRequest, ErrorBody, Message};

/// Path of the chat route.
pub const CHAT_ROUTE: &str = "/api/chat";

/// Shared, read-only state of the proxy.
#[derive(Clone)]
pub struct ProxyState {
    upstream: Arc<dyn CompletionApi>,
    locale: Locale,
}

impl ProxyState {
    /// Builds the state from the process configuration.
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let upstream = Completions::new(config)?;
        Ok(Self::with_upstream(Arc::new(upstream), config.locale))
    }

    /// Builds the state around an arbitrary completion API.
    pub fn with_upstream(upstream: Arc<dyn CompletionApi>, locale: Locale) -> Self {
        Self { upstream, locale }
    }

    /// The locale used for error bodies.
    pub fn locale(&self) -> Locale {
        self.locale
    }
}

/// Build the axum router serving the chat route.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route(CHAT_ROUTE, post(handle_chat))
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: ProxyConfig) -> Result<()> {
    let state = ProxyState::new(&config)?;
    let listener = TcpListener::bind(&config.bind)
        .await
        .map_err(|e| Error::io(format!("failed to bind {}", config.bind), e))?;
    let addr = listener.local_addr()?;
    tracing::info!(
        %addr,
        model = %config.model,
        upstream = %config.base_url,
        locale = %config.locale,
        "chatrelay proxy listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("chatrelay proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// A failed request as seen by the caller.
#[derive(Debug)]
struct ProxyFailure {
    status: StatusCode,
    message: &'static str,
}

impl ProxyFailure {
    fn bad_request(locale: Locale) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: locale.bad_request(),
        }
    }

    fn server_error(locale: Locale) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: locale.server_error(),
        }
    }
}

impl IntoResponse for ProxyFailure {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}

async fn handle_chat(
    State(state): State<ProxyState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> std::result::Result<Json<Message>, ProxyFailure> {
    PROXY_REQUESTS.click();

    let Json(request) = payload.map_err(|rejection| {
        PROXY_BAD_REQUESTS.click();
        tracing::warn!(error = %rejection.body_text(), "rejected chat request body");
        ProxyFailure::bad_request(state.locale)
    })?;
    if request.messages.is_empty() {
        PROXY_BAD_REQUESTS.click();
        tracing::warn!("rejected chat request with no messages");
        return Err(ProxyFailure::bad_request(state.locale));
    }

    match state.upstream.complete(&request.messages).await {
        Ok(reply) => Ok(Json(reply)),
        Err(err) => {
            PROXY_UPSTREAM_ERRORS.click();
            tracing::error!(error = %err, messages = request.messages.len(), "API error");
            Err(ProxyFailure::server_error(state.locale))
        }
    }
}
