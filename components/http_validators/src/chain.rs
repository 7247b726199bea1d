//! Ordered validator chain (§4.3)

use crate::action::ValidatorAction;
use crate::strategy::RetryStrategy;
use crate::validator::{DefaultValidator, Validator};
use http_errors::HttpError;
use http_types::Response;

/// The outcome of running a [`ValidatorChain`] against one response.
pub enum ChainOutcome {
    /// Every validator passed (or replaced the response); this is the final value.
    Pass(Response),
    /// A validator failed the chain; the response carries the `validatorFailure`
    /// error wrapping the validator's own error.
    Fail(Response),
    /// A validator requested a retry. The response is included so the caller can
    /// use its current error (if any) when finalizing a retry-budget failure.
    Retry(RetryStrategy, Response),
}

/// An ordered sequence of [`Validator`]s run against each response (§4.3).
///
/// Validators run strictly in insertion order; the first one to return
/// [`ValidatorAction::FailChain`] or [`ValidatorAction::Retry`] stops the chain.
#[derive(Clone, Debug)]
pub struct ValidatorChain {
    validators: Vec<Validator>,
}

impl Default for ValidatorChain {
    /// A chain containing just the always-present [`DefaultValidator`].
    fn default() -> Self {
        Self {
            validators: vec![Validator::Default(DefaultValidator::default())],
        }
    }
}

impl ValidatorChain {
    /// Build a chain from an explicit, ordered validator list.
    pub fn new(validators: Vec<Validator>) -> Self {
        Self { validators }
    }

    /// Append a validator to the end of the chain.
    pub fn push(&mut self, validator: Validator) {
        self.validators.push(validator);
    }

    /// Remove every validator, including the default one.
    pub fn clear(&mut self) {
        self.validators.clear();
    }

    /// The validators currently installed, in run order.
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Run every validator in order against `response`.
    pub fn run(&self, response: Response) -> ChainOutcome {
        let mut current = response;
        for validator in &self.validators {
            match validator.evaluate(&current) {
                ValidatorAction::NextValidator => {}
                ValidatorAction::NextValidatorWithResponse(next) => current = next,
                ValidatorAction::FailChain(error) => {
                    let failed = current.with_error(HttpError::ValidatorFailure {
                        source: Box::new(error),
                    });
                    return ChainOutcome::Fail(failed);
                }
                ValidatorAction::Retry(strategy) => return ChainOutcome::Retry(strategy, current),
            }
        }
        ChainOutcome::Pass(current)
    }
}
