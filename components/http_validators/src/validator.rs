//! Validators: the default always-present validator plus the closed-sum-type
//! `Validator` wrapper (§9 design note: dynamic-dispatch protocols are modeled as a
//! closed enumeration with a `Custom(fn)` escape hatch rather than `dyn Trait`).

use crate::action::ValidatorAction;
use crate::strategy::RetryStrategy;
use http_errors::HttpError;
use http_types::{Response, ResponseData, ResponseStatus};
use std::collections::HashMap;
use std::sync::Arc;

/// The always-present validator (unless explicitly removed) that treats network
/// errors and non-2xx status codes as failures, with a configurable map of
/// per-status retry budgets (§4.3).
#[derive(Clone)]
pub struct DefaultValidator {
    /// Whether a successful (2xx) response with an empty body is acceptable
    pub allows_empty_responses: bool,
    /// Status code → max retries for that status, independent of the request's own
    /// `max_retries`. A status absent from this map is never retried by this
    /// validator.
    pub retriable_status_codes: HashMap<u16, u32>,
}

impl Default for DefaultValidator {
    fn default() -> Self {
        let mut retriable_status_codes = HashMap::new();
        retriable_status_codes.insert(504, 0);
        Self {
            allows_empty_responses: true,
            retriable_status_codes,
        }
    }
}

impl DefaultValidator {
    fn evaluate(&self, response: &Response) -> ValidatorAction {
        if response.error.is_some() {
            return ValidatorAction::NextValidator;
        }

        let status = match response.status {
            ResponseStatus::Code(code) => code,
            ResponseStatus::None => return ValidatorAction::NextValidator,
        };

        if status.is_success() {
            if !self.allows_empty_responses && is_empty(&response.data) {
                return ValidatorAction::FailChain(HttpError::EmptyResponse);
            }
            return ValidatorAction::NextValidator;
        }

        let status_code = status.as_u16();
        match self.retriable_status_codes.get(&status_code) {
            Some(&max_for_status) if response.current_request.current_retry < max_for_status => {
                ValidatorAction::Retry(RetryStrategy::Immediate)
            }
            _ => ValidatorAction::FailChain(HttpError::InvalidResponse(format!(
                "unexpected status {status_code}"
            ))),
        }
    }
}

fn is_empty(data: &ResponseData) -> bool {
    match data {
        ResponseData::Empty => true,
        ResponseData::Memory(bytes) => bytes.is_empty(),
        ResponseData::File(path) => std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(false),
    }
}

/// A single step in a [`crate::ValidatorChain`].
#[derive(Clone)]
pub enum Validator {
    /// The always-present default validator
    Default(DefaultValidator),
    /// Caller-supplied validation logic
    Custom(Arc<dyn Fn(&Response) -> ValidatorAction + Send + Sync>),
}

impl Validator {
    /// Evaluate this validator against a response
    pub fn evaluate(&self, response: &Response) -> ValidatorAction {
        match self {
            Validator::Default(validator) => validator.evaluate(response),
            Validator::Custom(f) => f(response),
        }
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Validator::Default(_) => f.write_str("Validator::Default"),
            Validator::Custom(_) => f.write_str("Validator::Custom(<fn>)"),
        }
    }
}
