//! Client lifecycle delegate callbacks (§6): all optional, all fire-and-forget
//! observers. None of them can influence the fetch in progress — that's what
//! validators, response transformers, and the security policy are for.

use http_types::{AuthChallenge, Metrics, Request, Response};
use http_validators::RetryStrategy;
use std::sync::Arc;

/// Invoked once a fetch has been enqueued (composed and handed to the engine),
/// before the first transport attempt.
pub type DidEnqueueHandler = Arc<dyn Fn(&Request) + Send + Sync>;
/// Invoked once a fetch has reached a terminal response.
pub type DidFinishHandler = Arc<dyn Fn(&Response) + Send + Sync>;
/// Invoked after each attempt's metrics are available.
pub type DidCollectMetricsHandler = Arc<dyn Fn(&Request, &Metrics) + Send + Sync>;
/// Invoked when the transport raises an authentication challenge, after the
/// security policy has already resolved a disposition for it.
pub type DidReceiveAuthChallengeHandler = Arc<dyn Fn(&AuthChallenge) + Send + Sync>;
/// Invoked when a transport attempt is waiting for network connectivity.
pub type TaskIsWaitingForConnectivityHandler = Arc<dyn Fn(&Request) + Send + Sync>;
/// Invoked just before a retry is carried out, with the strategy that will run.
pub type WillRetryWithStrategyHandler = Arc<dyn Fn(&Request, &RetryStrategy) + Send + Sync>;

/// The full set of optional lifecycle callbacks a [`crate::Client`] may be
/// configured with (§6). Every field defaults to `None`.
#[derive(Clone, Default)]
pub struct ClientDelegate {
    /// Fires when a fetch is enqueued
    pub did_enqueue: Option<DidEnqueueHandler>,
    /// Fires when a fetch reaches a terminal response
    pub did_finish: Option<DidFinishHandler>,
    /// Fires after each attempt's metrics are collected
    pub did_collect_metrics: Option<DidCollectMetricsHandler>,
    /// Fires when an auth challenge is raised
    pub did_receive_auth_challenge: Option<DidReceiveAuthChallengeHandler>,
    /// Fires while a task is waiting for connectivity
    pub task_is_waiting_for_connectivity: Option<TaskIsWaitingForConnectivityHandler>,
    /// Fires immediately before a retry is carried out
    pub will_retry_with_strategy: Option<WillRetryWithStrategyHandler>,
}

impl ClientDelegate {
    pub(crate) fn notify_enqueue(&self, request: &Request) {
        if let Some(handler) = &self.did_enqueue {
            handler(request);
        }
    }

    pub(crate) fn notify_finish(&self, response: &Response) {
        if let Some(handler) = &self.did_finish {
            handler(response);
        }
    }

    pub(crate) fn notify_metrics(&self, request: &Request, metrics: &Metrics) {
        if let Some(handler) = &self.did_collect_metrics {
            handler(request, metrics);
        }
    }

    pub(crate) fn as_will_retry_handler(&self) -> Option<http_validators::WillRetryHandler> {
        self.will_retry_with_strategy.clone()
    }
}
