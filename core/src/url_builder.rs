//! Builds and validates request URLs from a base URL, an endpoint and query items.
//!
//! # Design
//! Base and endpoint are concatenated literally, with no slash normalization.
//! The combined string is first screened against a character blacklist and a
//! shape check (`http(s)://` plus authority, no backslashes, no dot segments)
//! so the lenient URL parser never gets to repair it. Only then is it parsed
//! and checked for an `http`/`https` scheme and a non-empty host.
//! The blacklist is a heuristic against malformed client input rather than a
//! protocol rule, so it is a plain constant callers can swap out.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::warn;
use url::Url;

use crate::error::{Result, WebParkError};

/// Characters rejected anywhere in the raw base URL + endpoint string.
///
/// Control characters are always rejected in addition to this set.
pub const DEFAULT_DISALLOWED_CHARS: &[char] =
    &[' ', '\t', '\n', '\r', '\u{00A0}', '\u{1F680}', '\u{1F389}'];

/// Everything except RFC 3986 unreserved characters is escaped in query items.
const QUERY_ITEM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A single `name=value` query item. A `None` value renders as a bare `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub name: String,
    pub value: Option<String>,
}

impl QueryParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for QueryParam {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// Build a request URL using [`DEFAULT_DISALLOWED_CHARS`].
pub fn build_url(base: &str, endpoint: &str, query: &[QueryParam]) -> Result<Url> {
    build_url_with(base, endpoint, query, DEFAULT_DISALLOWED_CHARS)
}

/// Build a request URL, rejecting any character in `disallowed`.
///
/// A non-empty `query` becomes the URL's entire query string, in input order.
/// An empty `query` leaves the endpoint's own query (if any) untouched.
pub fn build_url_with(
    base: &str,
    endpoint: &str,
    query: &[QueryParam],
    disallowed: &[char],
) -> Result<Url> {
    let raw = format!("{base}{endpoint}");
    let mut url = parse_http_url(&raw, disallowed).inspect_err(|err| {
        warn!(url = ?raw, error = %err, "rejected request URL");
    })?;

    if !query.is_empty() {
        url.set_query(Some(&encode_query(query)));
    }

    // Url is lenient about some inputs; the rebuilt string must still be absolute.
    let rebuilt = url.as_str();
    if !(rebuilt.starts_with("http://") || rebuilt.starts_with("https://")) {
        return Err(WebParkError::InvalidUrl(format!(
            "{rebuilt:?} is not an absolute http(s) URL"
        )));
    }
    Ok(url)
}

/// True when `raw` is a well-formed `http`/`https` URL free of disallowed characters.
pub fn is_valid_http_url(raw: &str) -> bool {
    parse_http_url(raw, DEFAULT_DISALLOWED_CHARS).is_ok()
}

/// The first control or blacklisted character in `raw`, if any.
pub fn find_disallowed_char(raw: &str, disallowed: &[char]) -> Option<char> {
    raw.chars().find(|c| c.is_control() || disallowed.contains(c))
}

/// Percent-encode query items as `name=value` pairs joined by `&`.
pub fn encode_query(query: &[QueryParam]) -> String {
    query
        .iter()
        .map(|item| {
            let name = utf8_percent_encode(&item.name, QUERY_ITEM);
            match &item.value {
                Some(value) => format!("{name}={}", utf8_percent_encode(value, QUERY_ITEM)),
                None => name.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn parse_http_url(raw: &str, disallowed: &[char]) -> Result<Url> {
    if let Some(c) = find_disallowed_char(raw, disallowed) {
        return Err(WebParkError::InvalidUrl(format!(
            "disallowed character {c:?} in {raw:?}"
        )));
    }

    check_raw_shape(raw)?;

    let url = Url::parse(raw).map_err(|e| WebParkError::InvalidUrl(format!("{raw:?}: {e}")))?;

    // Url lowercases the scheme while parsing.
    if !matches!(url.scheme(), "http" | "https") {
        return Err(WebParkError::InvalidUrl(format!(
            "unsupported scheme {:?} in {raw:?}",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(WebParkError::InvalidUrl(format!("missing host in {raw:?}")));
    }
    Ok(url)
}

/// Reject inputs `Url::parse` would silently repair.
///
/// The raw string must read `http://` or `https://` followed by a non-empty
/// authority, must not contain backslashes, and its path must not contain
/// `.` or `..` segments (plain or percent-encoded).
fn check_raw_shape(raw: &str) -> Result<()> {
    let invalid = |reason: &str| -> Result<()> {
        Err(WebParkError::InvalidUrl(format!("{reason} in {raw:?}")))
    };

    if raw.contains('\\') {
        return invalid("backslash");
    }

    let Some((scheme, rest)) = raw.split_once("://") else {
        return invalid("missing \"://\"");
    };
    if !(scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")) {
        return invalid("unsupported scheme");
    }

    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    if authority.is_empty() {
        return invalid("missing host");
    }

    let path_end = tail.find(['?', '#']).unwrap_or(tail.len());
    let has_dot_segment = tail[..path_end].split('/').any(|segment| {
        let segment = segment.to_ascii_lowercase().replace("%2e", ".");
        segment == "." || segment == ".."
    });
    if has_dot_segment {
        return invalid("dot segment");
    }
    Ok(())
}
