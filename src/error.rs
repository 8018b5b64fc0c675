use std::fmt;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The HTTP method could not be parsed.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),
    /// The URL could not be parsed.
    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The URL parsed but uses a scheme the transport cannot send.
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    /// Connection-level failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(TransportError),
    /// 5xx response. Status and raw body are kept for diagnostics.
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },
    /// Reading the body of an accepted response failed.
    #[error("failed to read response body: {0}")]
    BodyRead(TransportError),
    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// `send` was called again without a `reset` in between.
    #[error("request was already executed; call reset() before sending again")]
    AlreadyExecuted,
}

impl RequestError {
    /// Returns `true` for errors raised while building the request.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::InvalidMethod(_) | Self::InvalidUrl { .. } | Self::UnsupportedScheme(_)
        )
    }

    /// Returns `true` when the transport gave up because of the per-call timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(err) | Self::BodyRead(err) => err.is_timeout(),
            _ => false,
        }
    }

    /// Status code of a synthesized server error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Broad category of a [`TransportError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportErrorKind {
    /// Per-call deadline elapsed.
    Timeout,
    /// Connection could not be established (refused, DNS, TLS).
    Connect,
    /// Request could not be built or sent.
    Request,
    /// Body could not be streamed.
    Body,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Failure reported by a [`Transport`](crate::Transport).
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {source}")]
pub struct TransportError {
    kind: TransportErrorKind,
    source: BoxError,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    pub fn timeout(source: impl Into<BoxError>) -> Self {
        Self::new(TransportErrorKind::Timeout, source)
    }

    pub fn connect(source: impl Into<BoxError>) -> Self {
        Self::new(TransportErrorKind::Connect, source)
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }

    pub fn is_connect(&self) -> bool {
        self.kind == TransportErrorKind::Connect
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_body() || err.is_decode() {
            TransportErrorKind::Body
        } else if err.is_request() || err.is_builder() {
            TransportErrorKind::Request
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, err)
    }
}
