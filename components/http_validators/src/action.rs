//! Validator decisions (§4.3)

use crate::strategy::RetryStrategy;
use http_errors::HttpError;
use http_types::Response;

/// The decision a single [`crate::Validator`] returns for a response.
pub enum ValidatorAction {
    /// Pass to the next validator unchanged (or accept, if this is the last one).
    NextValidator,
    /// Replace the response and continue to the next validator.
    NextValidatorWithResponse(Response),
    /// Stop the chain; the response is finalized with this error, tagged
    /// `validatorFailure`, preserving the supplied error as its source.
    FailChain(HttpError),
    /// Stop the chain and request a retry using the given strategy, subject to the
    /// request's remaining retry budget.
    Retry(RetryStrategy),
}
