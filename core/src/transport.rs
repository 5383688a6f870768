//! The transport collaborator: the only piece that touches the network.
//!
//! # Design
//! The core never performs I/O itself. A [`Transport`] receives a fully built
//! [`HttpRequest`] and hands back status, headers and body as plain data.
//! Failing statuses are data too: a transport only errors when no response
//! was obtained at all. Any HTTP client can sit behind the trait. The
//! `ureq` feature ships a blocking implementation, and
//! [`MockTransport`](crate::mock::MockTransport) replays canned responses.

use std::sync::Arc;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP request.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_backend::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_backend {
    use std::io;
    use std::time::Duration;

    use ureq::typestate::WithBody;
    use ureq::{Agent, Body, RequestBuilder};

    use super::Transport;
    use crate::error::TransportError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport backed by a shared `ureq::Agent`.
    ///
    /// The agent is configured to return 4xx/5xx responses as data so status
    /// interpretation stays with the client.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: Agent,
    }

    impl UreqTransport {
        pub fn new() -> Self {
            Self::build(None)
        }

        /// Bound the whole request, connect through body read, to `timeout`.
        pub fn with_timeout(timeout: Duration) -> Self {
            Self::build(Some(timeout))
        }

        fn build(timeout: Option<Duration>) -> Self {
            let agent = Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(timeout)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl std::fmt::Debug for UreqTransport {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("UreqTransport").finish_non_exhaustive()
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let url = request.url.as_str();
            let headers = &request.headers;
            let body = request.body.as_deref();

            let mut response = match request.method {
                HttpMethod::Get => with_headers(self.agent.get(url), headers).call(),
                HttpMethod::Delete => with_headers(self.agent.delete(url), headers).call(),
                HttpMethod::Post => send(with_headers(self.agent.post(url), headers), body),
                HttpMethod::Put => send(with_headers(self.agent.put(url), headers), body),
                HttpMethod::Patch => send(with_headers(self.agent.patch(url), headers), body),
            }?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();
            let body = response.body_mut().read_to_vec()?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn send(
        builder: RequestBuilder<WithBody>,
        body: Option<&[u8]>,
    ) -> Result<ureq::http::Response<Body>, ureq::Error> {
        match body {
            Some(bytes) => builder.send(bytes),
            None => builder.send_empty(),
        }
    }

    impl From<ureq::Error> for TransportError {
        fn from(err: ureq::Error) -> Self {
            let message = err.to_string();
            match err {
                ureq::Error::Timeout(_) => TransportError::Timeout,
                ureq::Error::Io(io_err) => match io_err.kind() {
                    io::ErrorKind::TimedOut => TransportError::Timeout,
                    io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::NotConnected => TransportError::Connection(message),
                    _ => TransportError::Io(message),
                },
                ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
                    TransportError::Connection(message)
                }
                _ => TransportError::Other(message),
            }
        }
    }
}
