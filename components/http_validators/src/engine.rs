//! Retry engine (§4.3): drives a request through the data loader, the validator
//! chain, and response transformers, performing retries (including alt-request and
//! async-task side effects) until a terminal response is reached.

use crate::chain::{ChainOutcome, ValidatorChain};
use crate::strategy::RetryStrategy;
use crate::transformer::{apply_transformers, ResponseTransformer};
use http_errors::{HttpError, HttpResult};
use http_loader::Loader;
use http_types::{Progress, Request, Response, SecurityPolicy};
use std::sync::Arc;
use tokio::sync::watch;
use url::Url;

/// Resolves a (possibly path-only) request to the absolute URL it should be sent
/// to. Only the owning client knows its base URL, so this is supplied by the
/// caller rather than implemented here.
pub type UrlResolver = Arc<dyn Fn(&Request) -> HttpResult<Url> + Send + Sync>;

/// Observes each retry decision before it is carried out (the client's
/// `will_retry_with_strategy` delegate, §6).
pub type WillRetryHandler = Arc<dyn Fn(&Request, &RetryStrategy) + Send + Sync>;

/// Runs the validator chain and retry orchestration around a [`Loader`].
pub struct RetryEngine {
    chain: ValidatorChain,
    transformers: Vec<ResponseTransformer>,
}

impl RetryEngine {
    /// Build an engine with the given validator chain and response transformers.
    pub fn new(chain: ValidatorChain, transformers: Vec<ResponseTransformer>) -> Self {
        Self { chain, transformers }
    }

    /// Run `request` to completion: execute it, validate the response, retry as
    /// directed (sleeping for the computed backoff between attempts), and finally
    /// apply response transformers to whatever response the chain settles on.
    pub async fn run(
        &self,
        loader: &Loader,
        request: &Request,
        resolve: &UrlResolver,
        effective_security: &SecurityPolicy,
        progress: Option<watch::Sender<Progress>>,
        on_will_retry: Option<&WillRetryHandler>,
    ) -> Response {
        let mut current = request.clone();

        loop {
            let url = match resolve(&current) {
                Ok(url) => url,
                Err(error) => return Response::error_response(error, current),
            };

            let response = loader
                .execute(&current, &url, effective_security, progress.clone())
                .await;

            match self.chain.run(response) {
                ChainOutcome::Pass(response) => {
                    return apply_transformers(&self.transformers, &current, response)
                }
                ChainOutcome::Fail(response) => {
                    return apply_transformers(&self.transformers, &current, response)
                }
                ChainOutcome::Retry(strategy, mut response) => {
                    if current.is_alt_request {
                        // §4.3/§9: alt-requests never recurse into retry.
                        return response;
                    }
                    if current.current_retry >= current.max_retries {
                        let last = response
                            .error
                            .take()
                            .unwrap_or_else(|| exhausted_without_error(&response));
                        return response.with_error(last.into_retry_attempts_reached());
                    }

                    if let Some(on_will_retry) = on_will_retry {
                        on_will_retry(&current, &strategy);
                    }

                    current = match self
                        .run_side_effect(loader, &current, &strategy, resolve, effective_security)
                        .await
                    {
                        Ok(next) => next,
                        Err(error) => return Response::error_response(error, current),
                    };

                    let backoff = strategy.backoff_duration(current.current_retry);
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }

                    current = match current.next_attempt() {
                        Ok(next) => next,
                        Err(error) => return Response::error_response(error, current),
                    };
                }
            }
        }
    }

    /// Carry out a retry strategy's side effect, returning the request to retry
    /// with next (unchanged for every variant except `AfterTask`, which may
    /// rewrite it).
    async fn run_side_effect(
        &self,
        loader: &Loader,
        current: &Request,
        strategy: &RetryStrategy,
        resolve: &UrlResolver,
        effective_security: &SecurityPolicy,
    ) -> HttpResult<Request> {
        match strategy {
            RetryStrategy::After {
                alt_request,
                on_alt_response,
                ..
            } => {
                let alt = alt_request.as_alt_request();
                if let Ok(alt_url) = resolve(&alt) {
                    let alt_response = loader.execute(&alt, &alt_url, effective_security, None).await;
                    on_alt_response(&alt_response);
                }
                Ok(current.clone())
            }
            RetryStrategy::AfterTask { task, on_task_error, .. } => {
                match task(current.clone()).await {
                    Ok(rewritten) => Ok(rewritten),
                    Err(error) => {
                        if let Some(on_task_error) = on_task_error {
                            on_task_error(&error);
                        }
                        Ok(current.clone())
                    }
                }
            }
            RetryStrategy::Immediate
            | RetryStrategy::Delayed(_)
            | RetryStrategy::Exponential { .. }
            | RetryStrategy::Fibonacci { .. } => Ok(current.clone()),
        }
    }
}

/// A response never reaches a `Retry` decision without either a transport error or
/// a non-2xx status (the default validator only retries one of those two cases),
/// so this always has a sensible fallback even when `response.error` is `None`
/// (e.g. a custom validator that retries on status alone).
fn exhausted_without_error(response: &Response) -> HttpError {
    match response.status.as_u16() {
        Some(code) => HttpError::InvalidResponse(format!("status {code} exceeded retry budget")),
        None => HttpError::Internal("retry budget exceeded with no status".to_string()),
    }
}
