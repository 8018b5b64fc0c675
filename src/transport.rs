//! The HTTP capability the retry loop drives.
//!
//! [`RetryingRequest`](crate::RetryingRequest) never talks to the network itself;
//! it hands a [`RequestDescriptor`] to a [`Transport`] once per attempt. The
//! default transport is [`ReqwestTransport`]. Tests and embedders can plug in
//! their own implementation.

use std::{fmt, future::Future, time::Duration};

use reqwest::{header::HeaderMap, StatusCode};

use crate::{RequestDescriptor, TransportError};

/// Response head plus a not-yet-read body.
#[derive(Debug)]
pub struct TransportResponse<B> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: B,
}

/// A response body that can be read to completion exactly once.
pub trait ResponseBody: Send {
    /// Drains the body into memory, releasing the underlying resource.
    fn read_all(self) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

impl ResponseBody for Vec<u8> {
    fn read_all(self) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        std::future::ready(Ok(self))
    }
}

impl ResponseBody for reqwest::Response {
    fn read_all(self) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        async move {
            let bytes = self.bytes().await?;
            Ok(bytes.to_vec())
        }
    }
}

/// Executes a single HTTP attempt.
pub trait Transport {
    type Body: ResponseBody;

    /// Sends `request`, honoring `timeout` when set.
    ///
    /// Any `Err` is treated as a connection-level failure by the retry loop.
    fn execute(
        &self,
        request: &RequestDescriptor,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<TransportResponse<Self::Body>, TransportError>> + Send;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Wraps an existing client, e.g. one configured with a proxy or custom TLS roots.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for ReqwestTransport {
    type Body = reqwest::Response;

    fn execute(
        &self,
        request: &RequestDescriptor,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<TransportResponse<Self::Body>, TransportError>> + Send {
        let mut builder = self
            .http
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        async move {
            let response = builder.send().await?;
            Ok(TransportResponse {
                status: response.status(),
                headers: response.headers().clone(),
                body: response,
            })
        }
    }
}
