//! Chat relay handler.
//!
//! Validates the inbound body, then hands the gateway call to the relay
//! supervisor. The response streams back as the relay writes it.

use axum::extract::State;
use axum::http::Method;
use axum::response::Response;
use bytes::Bytes;
use mc_core::{ChatRequest, GatewayConfig};
use mc_relay::{RelayError, RelayRequest};
use tracing::error;

use crate::downstream::channel_writer;
use crate::error::HttpError;
use crate::state::AppState;

/// Build the gateway chat-completions call for a validated request.
pub fn gateway_request(
    gateway: &GatewayConfig,
    chat: &ChatRequest,
) -> Result<RelayRequest, RelayError> {
    let mut builder = RelayRequest::builder(gateway.chat_completions_url())
        .method(Method::POST)
        .json(&chat.to_gateway_payload(gateway))
        .streaming(chat.stream)
        .timeout(gateway.request_timeout);
    if let Some(token) = &gateway.token {
        builder = builder.bearer_auth(token);
    }
    builder.build()
}

/// `POST /api/chat`
///
/// A malformed body is rejected with 400 before anything is sent upstream.
/// A gateway call that cannot be built from the configuration is a 500.
pub async fn relay(State(state): State<AppState>, body: Bytes) -> Result<Response, HttpError> {
    let chat = ChatRequest::from_slice(&body)
        .map_err(|e| RelayError::MalformedRequest(e.to_string()))?;
    let request = gateway_request(&state.gateway, &chat).map_err(|e| {
        error!(error = %e, "Gateway configuration cannot produce a chat request");
        HttpError::Internal(e.to_string())
    })?;

    let (writer, pending) = channel_writer(state.write_timeout);
    // Detached; the supervisor logs the outcome.
    let _relay = state.relay.spawn(request, writer);
    Ok(pending.into_response().await)
}
