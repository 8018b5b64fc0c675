//! Retry classification.
//!
//! [`classify`] is a pure function over what an attempt produced and how much
//! retry budget is left. The driver loop in [`RetryingRequest`](crate::RetryingRequest)
//! applies its verdict.

use reqwest::StatusCode;

/// What a single attempt produced, stripped down to what classification needs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The transport failed before a response head arrived.
    TransportError,
    /// A response head arrived with this status.
    Status(StatusCode),
}

/// Verdict for one attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Terminal success: read and return the body.
    Accept,
    /// Retryable failure with budget left: spend one retry and back off.
    Retry,
    /// Retryable failure with no budget left: surface the failure.
    Fail,
}

/// Returns `true` for failures worth another attempt, budget permitting.
pub fn is_retryable(outcome: Outcome) -> bool {
    match outcome {
        Outcome::TransportError => true,
        Outcome::Status(status) => status.is_server_error(),
    }
}

/// Classifies an attempt against the remaining retry budget.
pub fn classify(outcome: Outcome, retries_remaining: u32) -> Decision {
    if !is_retryable(outcome) {
        return Decision::Accept;
    }
    if retries_remaining > 0 {
        Decision::Retry
    } else {
        Decision::Fail
    }
}
