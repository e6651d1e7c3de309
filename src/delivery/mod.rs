//! Video delivery to the target chat.
//!
//! This module defines the seam between the relay core and the messaging
//! platform: the [`VideoSender`] trait describes the single outbound
//! operation, and [`SendError`] classifies its failures into the two kinds
//! the engine cares about. The trait-based design enables mock senders for
//! testing and keeps the engine free of SDK types; the production
//! implementation lives in `telegram::client`.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::types::TransportId;

pub mod backoff;
pub mod engine;

pub use backoff::BackoffPolicy;
pub use engine::{DeliveryEngine, DeliveryOutcome};

/// The kind of send failure, categorized for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendErrorKind {
    /// The platform requires a wait before retrying. Flow control, not a
    /// failure; the engine retries after the signaled duration.
    RateLimited(Duration),

    /// Any other failure (network, platform-side error). Not retried within
    /// the current attempt.
    Other,
}

/// A send failure with categorization for retry decisions.
#[derive(Debug, Error)]
pub struct SendError {
    /// The kind of failure.
    pub kind: SendErrorKind,

    /// A human-readable description.
    pub message: String,

    /// The underlying platform error, if available.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SendErrorKind::RateLimited(wait) => {
                write!(f, "rate limited: retry after {:.1}s", wait.as_secs_f64())
            }
            SendErrorKind::Other => write!(f, "send failed: {}", self.message),
        }
    }
}

impl SendError {
    /// Creates a rate-limited error carrying the platform's requested wait.
    pub fn rate_limited(
        retry_after: Duration,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            kind: SendErrorKind::RateLimited(retry_after),
            message: format!("retry after {:.1}s", retry_after.as_secs_f64()),
            source: Some(source.into()),
        }
    }

    /// Creates a generic send error from a platform error.
    pub fn other(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            kind: SendErrorKind::Other,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a rate-limited error without a platform source.
    pub fn rate_limited_without_source(retry_after: Duration) -> Self {
        Self {
            kind: SendErrorKind::RateLimited(retry_after),
            message: format!("retry after {:.1}s", retry_after.as_secs_f64()),
            source: None,
        }
    }

    /// Creates a generic send error without a platform source.
    pub fn other_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: SendErrorKind::Other,
            message: message.into(),
            source: None,
        }
    }

    /// The platform-requested wait, if this is a rate-limit condition.
    pub fn retry_after(&self) -> Option<Duration> {
        match self.kind {
            SendErrorKind::RateLimited(wait) => Some(wait),
            SendErrorKind::Other => None,
        }
    }
}

/// Sends videos to the configured target chat.
///
/// Implementations are scoped to a target at construction time, so the
/// operation carries no chat identifier.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct AlwaysOk;
///
/// impl VideoSender for AlwaysOk {
///     fn send_video(&self, _video: &TransportId)
///         -> impl Future<Output = Result<(), SendError>> + Send
///     {
///         async { Ok(()) }
///     }
/// }
/// ```
pub trait VideoSender {
    /// Requests delivery of the given asset to the target chat.
    fn send_video(
        &self,
        video: &TransportId,
    ) -> impl Future<Output = Result<(), SendError>> + Send;
}
