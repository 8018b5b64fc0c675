use std::fmt;
use std::time::Duration;

use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::header::{HeaderName, HeaderValue};
use tokio::time::sleep;

use crate::{
    options::DEFAULT_RETRIES,
    retry::{self, Decision, Outcome},
    transport::{ResponseBody, Transport, TransportResponse},
    ReqwestTransport, RequestDescriptor, RequestError, RequestOptions, Response, Result,
};

/// One logical HTTP call plus its retry policy.
///
/// Transport errors and 5xx responses are retried with exponential backoff
/// while retry budget remains. Each retry spends exactly one unit of budget.
///
/// A request is sent once. Sending it again requires [`RetryingRequest::reset`],
/// otherwise [`RequestError::AlreadyExecuted`] is returned.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use retrying_request::RetryingRequest;
///
/// # async fn run() -> retrying_request::Result<()> {
/// let mut request = RetryingRequest::new("GET", "https://example.com/items", None)?
///     .with_retries(5)
///     .with_timeout(Duration::from_secs(2));
/// let body = request.send().await?;
/// println!("{} bytes, {} retries left", body.len(), request.retries_remaining());
/// # Ok(())
/// # }
/// ```
pub struct RetryingRequest<T = ReqwestTransport, B = ExponentialBackoff> {
    descriptor: RequestDescriptor,
    transport: T,
    backoff: B,
    timeout: Option<Duration>,
    configured_retries: u32,
    retries_remaining: u32,
    executed: bool,
}

impl<T, B> fmt::Debug for RetryingRequest<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryingRequest")
            .field("method", self.descriptor.method())
            .field("url", &self.descriptor.url().as_str())
            .field("timeout", &self.timeout)
            .field("configured_retries", &self.configured_retries)
            .field("retries_remaining", &self.retries_remaining)
            .field("executed", &self.executed)
            .finish_non_exhaustive()
    }
}

impl RetryingRequest {
    /// Creates a request with the default transport, 3 retries and the
    /// default exponential backoff.
    ///
    /// Fails when the method or URL cannot be parsed, or when the URL is
    /// not `http`/`https`.
    pub fn new(method: &str, url: &str, body: Option<Vec<u8>>) -> Result<Self> {
        let descriptor = RequestDescriptor::parse(method, url, body)?;
        Ok(Self {
            descriptor,
            transport: ReqwestTransport::new(),
            backoff: RequestOptions::default().to_backoff(),
            timeout: None,
            configured_retries: DEFAULT_RETRIES,
            retries_remaining: DEFAULT_RETRIES,
            executed: false,
        })
    }

    /// Shorthand for a bodiless `GET`.
    pub fn get(url: &str) -> Result<Self> {
        Self::new("GET", url, None)
    }

    /// Shorthand for a `POST` with `body`.
    pub fn post(url: &str, body: impl Into<Vec<u8>>) -> Result<Self> {
        Self::new("POST", url, Some(body.into()))
    }
}

impl<T, B> RetryingRequest<T, B> {
    /// Overwrites the retry budget. `0` disables retries.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.configured_retries = retries;
        self.retries_remaining = retries;
        self
    }

    /// Sets a per-attempt deadline. `Duration::ZERO` disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Adds a request header sent on every attempt.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.descriptor.append_header(name, value);
        self
    }

    /// Replaces the transport.
    pub fn with_transport<T2: Transport>(self, transport: T2) -> RetryingRequest<T2, B> {
        RetryingRequest {
            descriptor: self.descriptor,
            transport,
            backoff: self.backoff,
            timeout: self.timeout,
            configured_retries: self.configured_retries,
            retries_remaining: self.retries_remaining,
            executed: self.executed,
        }
    }

    /// Replaces the backoff policy.
    pub fn with_backoff<B2: Backoff>(self, backoff: B2) -> RetryingRequest<T, B2> {
        RetryingRequest {
            descriptor: self.descriptor,
            transport: self.transport,
            backoff,
            timeout: self.timeout,
            configured_retries: self.configured_retries,
            retries_remaining: self.retries_remaining,
            executed: self.executed,
        }
    }

    /// Applies retry budget, timeout and backoff settings at once.
    pub fn with_options(self, opts: RequestOptions) -> RetryingRequest<T, ExponentialBackoff> {
        let timeout = opts.timeout().unwrap_or(Duration::ZERO);
        self.with_backoff(opts.to_backoff())
            .with_retries(opts.retries)
            .with_timeout(timeout)
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Retry budget left. Never negative; reaches `0` when exhausted.
    pub fn retries_remaining(&self) -> u32 {
        self.retries_remaining
    }
}

impl<T, B> RetryingRequest<T, B>
where
    T: Transport,
    B: Backoff,
{
    /// Re-arms the request: restores the configured budget and rewinds the
    /// backoff so [`send`](Self::send) may run again.
    pub fn reset(&mut self) {
        self.retries_remaining = self.configured_retries;
        self.backoff.reset();
        self.executed = false;
    }

    /// Runs the call with retries and returns the response body.
    pub async fn send(&mut self) -> Result<Vec<u8>> {
        self.send_response().await.map(Response::into_bytes)
    }

    /// Runs the call with retries and returns status, headers and body.
    ///
    /// Terminal outcomes:
    /// - any non-5xx response: its body is read and returned
    /// - a transport error or 5xx with no budget left: that failure
    /// - backoff exhaustion: the last observed failure
    /// - a failed body read on an accepted response: [`RequestError::BodyRead`]
    pub async fn send_response(&mut self) -> Result<Response> {
        if self.executed {
            return Err(RequestError::AlreadyExecuted);
        }
        self.executed = true;
        self.backoff.reset();

        loop {
            let result = self
                .transport
                .execute(&self.descriptor, self.timeout)
                .await;
            let outcome = match &result {
                Ok(response) => Outcome::Status(response.status),
                Err(_) => Outcome::TransportError,
            };
            let decision = retry::classify(outcome, self.retries_remaining);

            let failure = match (decision, result) {
                (Decision::Accept, Ok(response)) => return read_response(response).await,
                (_, Ok(response)) => drain_server_error(response).await,
                (_, Err(err)) => RequestError::Transport(err),
            };

            if decision == Decision::Fail {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    method = %self.descriptor.method(),
                    url = %self.descriptor.url(),
                    "retry budget exhausted: {failure}"
                );
                return Err(failure);
            }

            self.retries_remaining = self.retries_remaining.saturating_sub(1);

            let Some(delay) = self.backoff.next_backoff() else {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    url = %self.descriptor.url(),
                    retries_remaining = self.retries_remaining,
                    "backoff exhausted: {failure}"
                );
                return Err(failure);
            };

            #[cfg(feature = "tracing")]
            tracing::debug!(
                url = %self.descriptor.url(),
                retries_remaining = self.retries_remaining,
                "retrying after {} ms: {failure}",
                delay.as_millis()
            );

            sleep(delay).await;
        }
    }
}

async fn read_response<Body: ResponseBody>(response: TransportResponse<Body>) -> Result<Response> {
    let TransportResponse {
        status,
        headers,
        body,
    } = response;
    let body = body.read_all().await.map_err(RequestError::BodyRead)?;
    Ok(Response {
        status,
        headers,
        body,
    })
}

// The body is drained so the connection is released even when the attempt is retried.
async fn drain_server_error<Body: ResponseBody>(response: TransportResponse<Body>) -> RequestError {
    let status = response.status.as_u16();
    let body = response
        .body
        .read_all()
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default();
    RequestError::Server { status, body }
}
