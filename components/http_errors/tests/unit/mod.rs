//! Unit tests for http_errors component

use http_errors::{ErrorCategory, HttpError};

#[cfg(test)]
mod category_tests {
    use super::*;

    #[test]
    fn invalid_url_category() {
        let err = HttpError::InvalidUrl("not a url".to_string());
        assert_eq!(err.category(), ErrorCategory::InvalidUrl);
    }

    #[test]
    fn timeout_category() {
        let err = HttpError::Timeout(std::time::Duration::from_secs(3));
        assert_eq!(err.category(), ErrorCategory::Timeout);
    }

    #[test]
    fn cancelled_category() {
        assert_eq!(HttpError::Cancelled.category(), ErrorCategory::Cancelled);
    }

    #[test]
    fn stub_categories_are_distinct() {
        assert_ne!(
            HttpError::StubMethodNotConfigured.category(),
            HttpError::StubUnhandled.category()
        );
    }

    #[test]
    fn retry_attempts_reached_wraps_last_error() {
        let last = HttpError::Network("reset".to_string());
        let wrapped = last.into_retry_attempts_reached();
        match wrapped {
            HttpError::RetryAttemptsReached { last } => {
                assert_eq!(last.category(), ErrorCategory::Network);
            }
            _ => panic!("expected RetryAttemptsReached"),
        }
    }
}

#[cfg(test)]
mod display_tests {
    use super::*;

    #[test]
    fn empty_response_message() {
        assert_eq!(HttpError::EmptyResponse.to_string(), "empty response");
    }

    #[test]
    fn missing_connection_message() {
        assert_eq!(
            HttpError::MissingConnection.to_string(),
            "missing connection"
        );
    }
}
