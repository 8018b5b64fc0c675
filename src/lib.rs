//! `retrying-request` wraps a single outbound HTTP call and retries it on
//! transient failure.
//!
//! - [`RetryingRequest`] owns the request, its retry budget and a backoff policy
//! - [`retry::classify`] decides whether an attempt is retried
//! - [`Transport`] is the pluggable HTTP capability ([`ReqwestTransport`] by default)
//!
//! Transport errors and 5xx responses are retried with exponential backoff
//! (the `backoff` crate) until the retry budget or the backoff's elapsed-time
//! budget runs out.

mod descriptor;
mod error;
mod options;
mod request;
mod response;
pub mod retry;
mod transport;

pub use descriptor::RequestDescriptor;
pub use error::{RequestError, TransportError, TransportErrorKind};
pub use options::{RequestOptions, DEFAULT_RETRIES};
pub use request::RetryingRequest;
pub use response::Response;
pub use transport::{ReqwestTransport, ResponseBody, Transport, TransportResponse};

pub type Result<T> = std::result::Result<T, RequestError>;
