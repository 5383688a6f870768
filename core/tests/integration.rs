//! Full CRUD lifecycle test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every verb
//! operation over real HTTP through [`UreqTransport`]. Validates that request
//! building, status classification and JSON decoding work end-to-end with the
//! actual server.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use webpark_core::{
    AuthError, ClientConfig, ErrorKind, ErrorResponseCode, QueryParam, RefreshOnUnauthorized,
    TokenService, UreqTransport, WebClient, WebPark,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Cat {
    id: Uuid,
    name: String,
    color: String,
}

#[derive(Serialize)]
struct NewCat<'a> {
    name: &'a str,
    color: &'a str,
}

#[derive(Serialize)]
struct ColorChange<'a> {
    color: &'a str,
}

/// Start a mock server on a random port and return its address.
fn spawn_server(token: Option<&str>) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();
    let token = token.map(str::to_string);

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            match token {
                Some(token) => mock_server::run_with_token(listener, token).await,
                None => mock_server::run(listener).await,
            }
        })
    });

    addr
}

fn client(addr: SocketAddr, config: impl FnOnce(ClientConfig) -> ClientConfig) -> WebClient<UreqTransport> {
    WebClient::with_default_transport(config(ClientConfig::new(format!("http://{addr}"))))
}

#[test]
fn crud_lifecycle() {
    let addr = spawn_server(None);
    let client = client(addr, |config| config);

    // Empty list.
    let cats: Vec<Cat> = client.get("/cats", &[]).unwrap();
    assert!(cats.is_empty());

    // Create two cats.
    let yuki: Cat = client
        .post("/cats", &NewCat { name: "Yuki", color: "Brown" })
        .unwrap();
    assert_eq!(yuki.name, "Yuki");
    let carl: Cat = client
        .post("/cats", &NewCat { name: "Carl", color: "White" })
        .unwrap();

    // Duplicate name is a conflict.
    let err = client
        .post::<Cat, _>("/cats", &NewCat { name: "Yuki", color: "Black" })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HttpFailure);
    assert_eq!(err.http_failure().unwrap().kind, ErrorResponseCode::Conflict);

    // List, sorted by name, then filtered through the query string.
    let cats: Vec<Cat> = client.get("/cats", &[]).unwrap();
    assert_eq!(cats, vec![carl.clone(), yuki.clone()]);

    let cats: Vec<Cat> = client
        .get("/cats", &[QueryParam::new("color", "Brown")])
        .unwrap();
    assert_eq!(cats, vec![yuki.clone()]);

    let cats: Vec<Cat> = client.get("/cats", &[QueryParam::new("limit", "1")]).unwrap();
    assert_eq!(cats.len(), 1);

    // Get one.
    let fetched: Cat = client.get(&format!("/cats/{}", yuki.id), &[]).unwrap();
    assert_eq!(fetched, yuki);

    // Partial update.
    let patched: Cat = client
        .patch(&format!("/cats/{}", yuki.id), &ColorChange { color: "Orange" })
        .unwrap();
    assert_eq!(patched.name, "Yuki");
    assert_eq!(patched.color, "Orange");

    // Full replace.
    let replaced: Cat = client
        .put(
            &format!("/cats/{}", carl.id),
            &NewCat { name: "Carlos", color: "Black" },
        )
        .unwrap();
    assert_eq!(replaced.id, carl.id);
    assert_eq!(replaced.name, "Carlos");

    // Delete answers 204 with no body.
    client.delete(&format!("/cats/{}", carl.id), &[]).unwrap();

    // Gone.
    let err = client
        .get::<Cat>(&format!("/cats/{}", carl.id), &[])
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    assert_eq!(err.http_failure().unwrap().kind, ErrorResponseCode::NotFound);

    let err = client.delete(&format!("/cats/{}", carl.id), &[]).unwrap_err();
    assert_eq!(err.status_code(), Some(404));

    let err = client
        .patch::<Cat, _>(&format!("/cats/{}", carl.id), &ColorChange { color: "Red" })
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));

    // Final list.
    let cats: Vec<Cat> = client.get("/cats", &[]).unwrap();
    assert_eq!(cats, vec![patched]);
}

#[test]
fn bearer_token_reaches_server() {
    let addr = spawn_server(None);

    let anonymous = client(addr, |config| config);
    let err = anonymous.get::<Vec<Cat>>("/secure/cats", &[]).unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "HTTP 401: Unauthorized");

    let authorized = client(addr, |config| config.with_token("token"));
    let cats: Vec<Cat> = authorized.get("/secure/cats", &[]).unwrap();
    assert!(cats.is_empty());
}

#[test]
fn statuses_are_classified() {
    let addr = spawn_server(None);
    let client = client(addr, |config| config);

    for (code, expected) in [
        (400, ErrorResponseCode::BadRequest),
        (403, ErrorResponseCode::Forbidden),
        (409, ErrorResponseCode::Conflict),
        (500, ErrorResponseCode::InternalServerError),
        (501, ErrorResponseCode::NotImplemented),
        (503, ErrorResponseCode::ServiceUnavailable),
        (504, ErrorResponseCode::GatewayTimeout),
        (418, ErrorResponseCode::UnhandledResponseCode),
        (502, ErrorResponseCode::UnhandledResponseCode),
    ] {
        let err = client
            .get::<serde_json::Value>(&format!("/status/{code}"), &[])
            .unwrap_err();
        let failure = err.http_failure().unwrap();
        assert_eq!(failure.status_code, code);
        assert_eq!(failure.kind, expected, "status {code}");
    }
}

#[test]
fn success_with_empty_body_is_decode_failure() {
    let addr = spawn_server(None);
    let client = client(addr, |config| config);

    let err = client
        .get::<serde_json::Value>("/status/200", &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecodeFailure);
}

#[test]
fn unreachable_server_is_transport_error() {
    // Bind then drop so the port is very likely closed.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = client(addr, |config| config);

    let err = client.get::<Vec<Cat>>("/cats", &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

/// Hands out "expired" until refreshed, then "renewed".
#[derive(Default)]
struct RenewingToken {
    token: Mutex<Option<String>>,
    refreshes: AtomicUsize,
}

impl TokenService for RenewingToken {
    fn token(&self) -> String {
        self.token
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| "expired".to_string())
    }

    fn refresh_token(&self) -> Result<(), AuthError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        *self.token.lock().unwrap() = Some("renewed".to_string());
        Ok(())
    }
}

#[test]
fn refresh_on_unauthorized_recovers_once() {
    let addr = spawn_server(Some("renewed"));
    let service = Arc::new(RenewingToken::default());
    let client = RefreshOnUnauthorized::new(client(addr, |config| {
        config.with_token_service(service.clone())
    }));

    let cats: Vec<Cat> = client.get("/secure/cats", &[]).unwrap();
    assert!(cats.is_empty());
    assert_eq!(service.refreshes.load(Ordering::SeqCst), 1);

    // Token is fresh now; no further refresh.
    let _: Vec<Cat> = client.get("/secure/cats", &[]).unwrap();
    assert_eq!(service.refreshes.load(Ordering::SeqCst), 1);
}
