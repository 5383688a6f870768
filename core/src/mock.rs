//! In-memory transport that replays canned responses keyed by URL.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

type Outcome = Result<HttpResponse, TransportError>;

/// Replays registered outcomes for exact URL matches (query string included)
/// and records every request it receives.
///
/// A URL registered with several outcomes replays them in order; the last
/// one repeats once the others are used up.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, VecDeque<Outcome>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: impl Into<String>, response: HttpResponse) -> Self {
        self.register(url.into(), vec![Ok(response)])
    }

    pub fn respond_sequence(self, url: impl Into<String>, responses: Vec<HttpResponse>) -> Self {
        self.register(url.into(), responses.into_iter().map(Ok).collect())
    }

    pub fn fail(self, url: impl Into<String>, error: TransportError) -> Self {
        self.register(url.into(), vec![Err(error)])
    }

    /// Every request executed so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    fn register(self, url: String, outcomes: Vec<Outcome>) -> Self {
        lock(&self.routes)
            .entry(url)
            .or_default()
            .extend(outcomes);
        self
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        lock(&self.requests).push(request.clone());

        let mut routes = lock(&self.routes);
        let outcomes = routes
            .get_mut(&request.url)
            .filter(|outcomes| !outcomes.is_empty())
            .ok_or_else(|| TransportError::Other(format!("no mock registered for {}", request.url)))?;

        if outcomes.len() > 1 {
            outcomes
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Other("mock exhausted".to_string())))
        } else {
            outcomes
                .front()
                .cloned()
                .unwrap_or_else(|| Err(TransportError::Other("mock exhausted".to_string())))
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
