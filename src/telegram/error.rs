//! Classification of teloxide request errors.
//!
//! The engine distinguishes exactly two outcomes: the platform asked for a
//! wait, or something else went wrong. `RetryAfter` is the only variant that
//! carries flood-control semantics; every other request error, including
//! network failures and API rejections, is non-retryable within the current
//! attempt.

use teloxide::RequestError;

use crate::delivery::SendError;

/// Maps a teloxide [`RequestError`] onto the relay's send-error taxonomy.
pub fn classify_request_error(err: RequestError) -> SendError {
    match &err {
        RequestError::RetryAfter(wait) => {
            let wait = *wait;
            SendError::rate_limited(wait, err)
        }
        _ => SendError::other(err.to_string(), err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::delivery::SendErrorKind;

    #[test]
    fn retry_after_classifies_as_rate_limited() {
        let err = classify_request_error(RequestError::RetryAfter(Duration::from_secs(31)));
        assert_eq!(
            err.kind,
            SendErrorKind::RateLimited(Duration::from_secs(31))
        );
        assert_eq!(err.retry_after(), Some(Duration::from_secs(31)));
        assert!(err.source.is_some());
    }

    #[test]
    fn io_error_classifies_as_other() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = classify_request_error(RequestError::Io(io));
        assert_eq!(err.kind, SendErrorKind::Other);
        assert_eq!(err.retry_after(), None);
    }
}
