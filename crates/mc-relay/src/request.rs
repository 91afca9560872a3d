//! Immutable description of one upstream call.

use std::time::Duration;

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use url::Url;

use crate::error::RelayError;

/// What to send upstream and how long to wait for it.
///
/// Built through [`RelayRequest::builder`], which validates the target and
/// timeout so a constructed request is always well-formed.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    target: Url,
    method: Method,
    headers: HeaderMap,
    body: Option<Bytes>,
    streaming: bool,
    timeout: Duration,
}

impl RelayRequest {
    /// Start building a request to `target`.
    pub fn builder(target: impl Into<String>) -> RelayRequestBuilder {
        RelayRequestBuilder {
            target: target.into(),
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            streaming: false,
            timeout: None,
            error: None,
        }
    }

    pub const fn target(&self) -> &Url {
        &self.target
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Whether the response is expected to be a continuous event stream.
    pub const fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for [`RelayRequest`].
///
/// The first invalid input is remembered and reported by [`build`](Self::build).
#[derive(Debug)]
pub struct RelayRequestBuilder {
    target: String,
    method: Method,
    headers: HeaderMap,
    body: Option<Bytes>,
    streaming: bool,
    timeout: Option<Duration>,
    error: Option<RelayError>,
}

impl RelayRequestBuilder {
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Insert a header, replacing any previous value for the same name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer_auth(mut self, token: &str) -> Self {
        match HeaderValue::try_from(format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => self.fail("bearer token contains invalid header characters"),
        }
        self
    }

    /// Raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body and set `content-type`.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                self.body = Some(Bytes::from(bytes));
            }
            Err(e) => self.fail_owned(format!("body is not serializable: {e}")),
        }
        self
    }

    #[must_use]
    pub const fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate and produce the request.
    pub fn build(self) -> Result<RelayRequest, RelayError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let raw = self.target.trim();
        if raw.is_empty() {
            return Err(RelayError::MalformedRequest("missing target".into()));
        }
        let target = Url::parse(raw)
            .map_err(|e| RelayError::MalformedRequest(format!("invalid target `{raw}`: {e}")))?;
        if !matches!(target.scheme(), "http" | "https") {
            return Err(RelayError::MalformedRequest(format!(
                "unsupported scheme `{}`",
                target.scheme()
            )));
        }
        if target.host_str().is_none_or(str::is_empty) {
            return Err(RelayError::MalformedRequest(format!(
                "target `{raw}` has no host"
            )));
        }

        let timeout = match self.timeout {
            Some(t) if !t.is_zero() => t,
            Some(_) => return Err(RelayError::MalformedRequest("timeout must be positive".into())),
            None => return Err(RelayError::MalformedRequest("missing timeout".into())),
        };

        Ok(RelayRequest {
            target,
            method: self.method,
            headers: self.headers,
            body: self.body,
            streaming: self.streaming,
            timeout,
        })
    }

    fn fail(&mut self, msg: &'static str) {
        self.fail_owned(msg.to_string());
    }

    fn fail_owned(&mut self, msg: String) {
        if self.error.is_none() {
            self.error = Some(RelayError::MalformedRequest(msg));
        }
    }
}
