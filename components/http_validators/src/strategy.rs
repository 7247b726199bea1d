//! Retry strategies and their backoff timing (§4.3)
//!
//! Backoff durations are pure functions of `current_retry`, computed synchronously
//! before the engine sleeps, so the computed delay is independently observable by a
//! `will_retry` delegate and by tests using `tokio::time::pause` (§4.3 "Backoff
//! timing precision").

use futures::future::BoxFuture;
use http_errors::HttpResult;
use http_types::{Request, Response};
use std::sync::Arc;
use std::time::Duration;

/// A caller-supplied async side effect run as part of an `AfterTask` retry
/// strategy; may return a rewritten request (e.g. with a refreshed auth header).
pub type AsyncRequestTask = Arc<dyn Fn(Request) -> BoxFuture<'static, HttpResult<Request>> + Send + Sync>;

/// A callback invoked with the response of an `After` strategy's alt-request,
/// typically to capture a refreshed credential onto the owning client.
pub type AltResponseHandler = Arc<dyn Fn(&Response) + Send + Sync>;

/// A callback invoked if an `AfterTask`'s async task itself returns an error.
pub type TaskErrorHandler = Arc<dyn Fn(&http_errors::HttpError) + Send + Sync>;

/// How a retry should be carried out, as returned by a validator's
/// [`crate::ValidatorAction::Retry`] decision.
#[derive(Clone)]
pub enum RetryStrategy {
    /// Re-fetch immediately, with no delay.
    Immediate,
    /// Sleep for a fixed duration, then re-fetch.
    Delayed(Duration),
    /// Sleep for `base * 2^current_retry`, then re-fetch.
    Exponential {
        /// Base delay multiplied by the exponential factor
        base: Duration,
    },
    /// Sleep for `unit * fibonacci(current_retry)`, then re-fetch.
    Fibonacci {
        /// Unit delay multiplied by the Fibonacci factor
        unit: Duration,
    },
    /// Execute `alt_request` (e.g. a token refresh) as a reentrancy-guarded
    /// alt-request, report its response to `on_alt_response`, sleep
    /// `delay_before_original`, then re-fetch the original request.
    After {
        /// The side-effect request to execute before retrying
        alt_request: Box<Request>,
        /// Delay applied after the alt-request completes, before retrying
        delay_before_original: Duration,
        /// Invoked with the alt-request's response
        on_alt_response: AltResponseHandler,
    },
    /// Run `task` (which may rewrite the original request, e.g. injecting a new
    /// auth header), sleep `delay`, then re-fetch using whatever request `task`
    /// returned.
    AfterTask {
        /// Delay applied after the task completes, before retrying
        delay: Duration,
        /// The async side effect to run
        task: AsyncRequestTask,
        /// Invoked if `task` itself returns an error; the original request is
        /// retried unmodified in that case
        on_task_error: Option<TaskErrorHandler>,
    },
}

impl RetryStrategy {
    /// The delay to sleep before the next attempt, as a pure function of
    /// `current_retry`. For [`RetryStrategy::After`] and [`RetryStrategy::AfterTask`]
    /// this is the delay applied *after* their side effect, not the side effect's
    /// own duration.
    pub fn backoff_duration(&self, current_retry: u32) -> Duration {
        match self {
            RetryStrategy::Immediate => Duration::ZERO,
            RetryStrategy::Delayed(duration) => *duration,
            RetryStrategy::Exponential { base } => {
                let factor = 1u32.checked_shl(current_retry).unwrap_or(u32::MAX);
                base.saturating_mul(factor)
            }
            RetryStrategy::Fibonacci { unit } => unit.saturating_mul(fibonacci(current_retry)),
            RetryStrategy::After {
                delay_before_original,
                ..
            } => *delay_before_original,
            RetryStrategy::AfterTask { delay, .. } => *delay,
        }
    }
}

/// 1-indexed-from-zero Fibonacci sequence: `fib(0) = 1, fib(1) = 1, fib(2) = 2, ...`
fn fibonacci(n: u32) -> u32 {
    let (mut a, mut b) = (1u32, 1u32);
    for _ in 0..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    a
}
