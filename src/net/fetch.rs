//! The fetch collaborator the bootstrap loaders are handed.
//!
//! Browser (csr): `GlooFetcher` issues real requests via `gloo-net`, raced
//! against a `gloo-timers` timeout. Native/test builds supply their own
//! `Fetch` implementations.
//!
//! ERROR HANDLING
//! ==============
//! `FetchError` only covers failures where no response arrived. Non-2xx
//! responses come back as `FetchResponse` so each loader decides what a given
//! status means for it.

#[cfg(test)]
#[path = "fetch_test.rs"]
mod fetch_test;

use std::future::Future;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request against the app's own server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    pub path: String,
}

impl FetchRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::Get, path: path.into() }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self { method: Method::Post, path: path.into() }
    }
}

/// Status, redirect target and raw body of a completed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    /// Where the server (or a proxy in front of it) sent the request, if it
    /// redirected. On a 3xx this is the `Location` header; on any other status
    /// it is the URL the response was finally served from.
    pub location: Option<String>,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// A request that produced no response at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out after {0} ms")]
    Timeout(u64),
}

/// Fetch collaborator used by the server-config and current-user loaders.
pub trait Fetch {
    fn fetch(&self, request: FetchRequest) -> impl Future<Output = Result<FetchResponse, FetchError>>;
}

/// Browser fetcher on top of `gloo-net`.
///
/// `fetch` follows redirects transparently. A followed redirect keeps the
/// final status and body and reports the final URL as its location, so the
/// caller can tell a moved endpoint from a sign-in page.
#[cfg(feature = "csr")]
#[derive(Clone, Copy, Debug)]
pub struct GlooFetcher {
    timeout_ms: u64,
}

#[cfg(feature = "csr")]
impl GlooFetcher {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }

    async fn send(request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let builder = match request.method {
            Method::Get => gloo_net::http::Request::get(&request.path),
            Method::Post => gloo_net::http::Request::post(&request.path),
        };
        let resp = builder.send().await.map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = resp.status();
        let location = if resp.redirected() { Some(resp.url()) } else { resp.headers().get("location") };
        let body = resp.text().await.map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(FetchResponse { status, location, body })
    }
}

#[cfg(feature = "csr")]
impl Fetch for GlooFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        use futures::future::{Either, select};

        let millis = u32::try_from(self.timeout_ms).unwrap_or(u32::MAX);
        let send = Box::pin(Self::send(request));
        let timer = Box::pin(gloo_timers::future::TimeoutFuture::new(millis));
        match select(send, timer).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(FetchError::Timeout(self.timeout_ms)),
        }
    }
}
