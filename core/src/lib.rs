//! Thin JSON-over-HTTP client helper.
//!
//! # Overview
//! Given a base URL, an optional bearer-token provider and an endpoint path,
//! WebPark builds GET/POST/PUT/PATCH/DELETE requests, encodes and decodes JSON
//! bodies, and maps failing HTTP statuses onto one typed error. Network I/O is
//! delegated to a [`Transport`]; the core itself only builds requests and
//! interprets responses.
//!
//! # Design
//! - [`WebPark`] is a trait of configuration accessors with the verbs as
//!   provided methods; [`WebClient`] is the stock implementation.
//! - URLs are validated up front (`http`/`https`, non-empty host, no
//!   whitespace or control characters) before any request is built.
//! - Any status of 400 or above becomes [`WebParkError::Http`] and the body is
//!   never decoded. Unknown statuses classify as
//!   [`ErrorResponseCode::UnhandledResponseCode`].
//! - The core never retries. [`RefreshOnUnauthorized`] is an opt-in wrapper
//!   that refreshes the token once after a 401.
//!
//! ```no_run
//! use serde::Deserialize;
//! use webpark_core::{ClientConfig, QueryParam, WebClient, WebPark};
//!
//! #[derive(Deserialize)]
//! struct Cat {
//!     name: String,
//!     color: String,
//! }
//!
//! # fn main() -> Result<(), webpark_core::WebParkError> {
//! let client = WebClient::with_default_transport(
//!     ClientConfig::new("https://api.example.com").with_token("token"),
//! );
//! let cats: Vec<Cat> = client.get("/cats", &[QueryParam::new("limit", "10")])?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod coder;
pub mod error;
pub mod http;
pub mod mock;
pub mod refresh;
pub mod request;
pub mod status;
pub mod transport;
pub mod url_builder;

pub use auth::{StaticToken, TokenService};
pub use client::{ClientConfig, WebClient, WebPark};
pub use error::{AuthError, ErrorKind, HttpFailure, Result, TransportError, WebParkError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mock::MockTransport;
pub use refresh::RefreshOnUnauthorized;
pub use request::RequestFactory;
pub use status::ErrorResponseCode;
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use url_builder::{build_url, is_valid_http_url, QueryParam, DEFAULT_DISALLOWED_CHARS};
