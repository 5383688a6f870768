//! The WebPark client: configuration plus the five verb operations.
//!
//! # Design
//! [`WebPark`] only asks implementors for configuration data (base URL,
//! transport and an optional token service). Request building, sending and
//! status interpretation are provided methods, so a concrete client is a plain
//! struct. [`WebClient`] is the ready-made one.
//!
//! Every verb runs the same pipeline: build the request, encode the body if
//! the verb carries one, execute it through the transport, turn any status of
//! 400 or above into [`WebParkError::Http`] without touching the body, then
//! decode the body if the verb returns a value. Nothing is retried here.
//! [`RefreshOnUnauthorized`](crate::refresh::RefreshOnUnauthorized) layers a
//! single refresh-and-retry on top.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{StaticToken, TokenService};
use crate::coder;
use crate::error::{HttpFailure, Result, WebParkError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::request::RequestFactory;
use crate::transport::Transport;
use crate::url_builder::{QueryParam, DEFAULT_DISALLOWED_CHARS};

/// Environment variable holding the base URL for [`ClientConfig::from_env`].
pub const BASE_URL_ENV: &str = "WEBPARK_BASE_URL";
/// Environment variable holding an optional static bearer token.
pub const TOKEN_ENV: &str = "WEBPARK_TOKEN";

/// Configuration data every WebPark client supplies; the verbs are provided.
pub trait WebPark {
    /// Base URL that endpoints are appended to, e.g. `https://api.example.com`.
    fn base_url(&self) -> &str;

    fn transport(&self) -> &dyn Transport;

    fn token_service(&self) -> Option<&dyn TokenService> {
        None
    }

    /// Characters rejected in base URL + endpoint, on top of control characters.
    fn disallowed_chars(&self) -> &[char] {
        DEFAULT_DISALLOWED_CHARS
    }

    fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        query: &[QueryParam],
        is_json: bool,
    ) -> Result<HttpRequest> {
        RequestFactory::new(self.base_url())
            .with_token_service(self.token_service())
            .with_disallowed_chars(self.disallowed_chars())
            .build(method, endpoint, query, is_json)
    }

    /// Execute `request` and reject any status of 400 or above.
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.transport().execute(&request)?;
        debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "received response"
        );

        if response.is_failure() {
            let failure = HttpFailure::new(response.status);
            warn!(
                method = %request.method,
                url = %request.url,
                status = failure.status_code,
                kind = %failure.kind,
                "request failed"
            );
            return Err(failure.into());
        }
        Ok(response)
    }

    /// Encode `body` as JSON, send it with `method` and decode the reply.
    fn send_json<T, D>(&self, method: HttpMethod, endpoint: &str, body: &D) -> Result<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        let request = self.build_request(method, endpoint, &[], true)?;
        let payload = coder::encode(body)?;
        let response = self.send(request.with_body(payload))?;
        coder::decode(&response.body)
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[QueryParam]) -> Result<T> {
        let request = self.build_request(HttpMethod::Get, endpoint, query, false)?;
        let response = self.send(request)?;
        coder::decode(&response.body)
    }

    /// Any response body on success is ignored.
    fn delete(&self, endpoint: &str, query: &[QueryParam]) -> Result<()> {
        let request = self.build_request(HttpMethod::Delete, endpoint, query, false)?;
        self.send(request).map(|_| ())
    }

    fn post<T, D>(&self, endpoint: &str, body: &D) -> Result<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.send_json(HttpMethod::Post, endpoint, body)
    }

    fn put<T, D>(&self, endpoint: &str, body: &D) -> Result<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.send_json(HttpMethod::Put, endpoint, body)
    }

    fn patch<T, D>(&self, endpoint: &str, body: &D) -> Result<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.send_json(HttpMethod::Patch, endpoint, body)
    }
}

/// Immutable per-client settings.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    token_service: Option<Arc<dyn TokenService>>,
    disallowed_chars: &'static [char],
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token_service: None,
            disallowed_chars: DEFAULT_DISALLOWED_CHARS,
        }
    }

    /// Read [`BASE_URL_ENV`] (required) and [`TOKEN_ENV`] (optional).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a caller-supplied variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(BASE_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| WebParkError::InvalidUrl(format!("{BASE_URL_ENV} is not set")))?;

        let config = Self::new(base_url);
        Ok(match lookup(TOKEN_ENV).filter(|token| !token.is_empty()) {
            Some(token) => config.with_token(token),
            None => config,
        })
    }

    pub fn with_token_service(mut self, token_service: Arc<dyn TokenService>) -> Self {
        self.token_service = Some(token_service);
        self
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.with_token_service(Arc::new(StaticToken::new(token)))
    }

    pub fn with_disallowed_chars(mut self, disallowed_chars: &'static [char]) -> Self {
        self.disallowed_chars = disallowed_chars;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_service(&self) -> Option<&dyn TokenService> {
        self.token_service.as_deref()
    }

    pub fn disallowed_chars(&self) -> &'static [char] {
        self.disallowed_chars
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("has_token_service", &self.token_service.is_some())
            .finish_non_exhaustive()
    }
}

/// A [`WebPark`] client over any [`Transport`].
///
/// Holds no mutable state: concurrent calls from several threads are
/// independent of one another.
#[derive(Debug, Clone)]
pub struct WebClient<T> {
    config: ClientConfig,
    transport: T,
}

impl<T: Transport> WebClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The concrete transport, e.g. to inspect a mock after a call.
    pub fn inner_transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(feature = "ureq")]
impl WebClient<crate::transport::UreqTransport> {
    pub fn with_default_transport(config: ClientConfig) -> Self {
        Self::new(config, crate::transport::UreqTransport::new())
    }
}

impl<T: Transport> WebPark for WebClient<T> {
    fn base_url(&self) -> &str {
        self.config.base_url()
    }

    fn transport(&self) -> &dyn Transport {
        &self.transport
    }

    fn token_service(&self) -> Option<&dyn TokenService> {
        self.config.token_service()
    }

    fn disallowed_chars(&self) -> &[char] {
        self.config.disallowed_chars()
    }
}
