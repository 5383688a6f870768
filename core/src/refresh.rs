//! Refresh-and-retry wrapper for clients whose token can expire.
//!
//! The verb operations on [`WebPark`] never retry. This decorator adds exactly
//! one retry: when a call fails with 401 and the wrapped client has a token
//! service, it refreshes the token and runs the call again. The request is
//! rebuilt for the retry, so it carries the new token.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::client::WebPark;
use crate::error::Result;
use crate::url_builder::QueryParam;

#[derive(Debug, Clone)]
pub struct RefreshOnUnauthorized<C> {
    inner: C,
}

impl<C: WebPark> RefreshOnUnauthorized<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    pub fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[QueryParam]) -> Result<T> {
        self.with_refresh(|client| client.get(endpoint, query))
    }

    pub fn delete(&self, endpoint: &str, query: &[QueryParam]) -> Result<()> {
        self.with_refresh(|client| client.delete(endpoint, query))
    }

    pub fn post<T, D>(&self, endpoint: &str, body: &D) -> Result<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.with_refresh(|client| client.post(endpoint, body))
    }

    pub fn put<T, D>(&self, endpoint: &str, body: &D) -> Result<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.with_refresh(|client| client.put(endpoint, body))
    }

    pub fn patch<T, D>(&self, endpoint: &str, body: &D) -> Result<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.with_refresh(|client| client.patch(endpoint, body))
    }

    fn with_refresh<R>(&self, call: impl Fn(&C) -> Result<R>) -> Result<R> {
        match call(&self.inner) {
            Err(err) if err.is_unauthorized() => {
                let Some(service) = self.inner.token_service() else {
                    return Err(err);
                };
                info!(base_url = self.inner.base_url(), "refreshing token after 401");
                service.refresh_token()?;
                call(&self.inner)
            }
            outcome => outcome,
        }
    }
}
