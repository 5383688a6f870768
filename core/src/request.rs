//! Request factory: turns a method, endpoint and query into an [`HttpRequest`].
//!
//! # Design
//! Construction is synchronous and performs no I/O, so every verb shares it
//! and it can be tested without a transport. The only outside call is
//! reading the current token from the configured [`TokenService`].

use tracing::debug;

use crate::auth::TokenService;
use crate::error::{Result, WebParkError};
use crate::http::{HttpMethod, HttpRequest};
use crate::url_builder::{build_url_with, QueryParam, DEFAULT_DISALLOWED_CHARS};

/// Builds requests against one base URL with one optional token source.
#[derive(Clone, Copy)]
pub struct RequestFactory<'a> {
    base_url: &'a str,
    token_service: Option<&'a dyn TokenService>,
    disallowed_chars: &'a [char],
}

impl<'a> RequestFactory<'a> {
    pub fn new(base_url: &'a str) -> Self {
        Self {
            base_url,
            token_service: None,
            disallowed_chars: DEFAULT_DISALLOWED_CHARS,
        }
    }

    pub fn with_token_service(mut self, token_service: Option<&'a dyn TokenService>) -> Self {
        self.token_service = token_service;
        self
    }

    pub fn with_disallowed_chars(mut self, disallowed_chars: &'a [char]) -> Self {
        self.disallowed_chars = disallowed_chars;
        self
    }

    /// Build a request with no body attached yet.
    ///
    /// `Authorization: Bearer <token>` is added only when a token service is
    /// configured and yields a non-empty token. `Content-Type:
    /// application/json` is added only when `is_json` is set.
    pub fn build(
        &self,
        method: HttpMethod,
        endpoint: &str,
        query: &[QueryParam],
        is_json: bool,
    ) -> Result<HttpRequest> {
        let url = build_url_with(self.base_url, endpoint, query, self.disallowed_chars)?;
        let mut request = HttpRequest::new(method, url);

        if let Some(service) = self.token_service {
            let token = service.token();
            if !token.is_empty() {
                check_header_value(&token)?;
                request = request.with_bearer_authorization(&token);
            }
        }

        if is_json {
            request = request.sending_json();
        }

        debug!(method = %request.method, url = %request.url, "built request");
        Ok(request)
    }
}

impl std::fmt::Debug for RequestFactory<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestFactory")
            .field("base_url", &self.base_url)
            .field("has_token_service", &self.token_service.is_some())
            .finish()
    }
}

/// Header values may not contain line breaks or other control characters.
fn check_header_value(value: &str) -> Result<()> {
    if value.chars().any(|c| c.is_control() && c != '\t') {
        return Err(WebParkError::RequestBuild(
            "bearer token contains control characters".to_string(),
        ));
    }
    Ok(())
}
