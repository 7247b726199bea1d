//! End-to-end tests for the validator chain, backoff timing, and retry engine,
//! exercised against [`http_loader::Loader`] with a scripted [`Transport`] double
//! rather than a real socket.

use async_trait::async_trait;
use http_errors::HttpResult;
use http_loader::Loader;
use http_transport::{Transport, TransportResponse, TransportTask};
use http_types::{RequestBuilder, RequestTarget, ResponseStatus, SecurityPolicy};
use http_validators::{RetryEngine, RetryStrategy, ValidatorAction, ValidatorChain, Validator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct ScriptedTransport {
    calls: AtomicUsize,
    statuses: Mutex<Vec<u16>>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, _task: TransportTask) -> HttpResult<TransportResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let statuses = self.statuses.lock().unwrap();
        let status = statuses.get(n).copied().unwrap_or(*statuses.last().unwrap());
        Ok(TransportResponse {
            status: http::StatusCode::from_u16(status).unwrap(),
            headers: http::HeaderMap::new(),
            body: Box::pin(futures::stream::empty()),
        })
    }
}

fn resolver() -> http_validators::UrlResolver {
    Arc::new(|request: &http_types::Request| match &request.target {
        RequestTarget::Absolute(url) => Ok(url.clone()),
        RequestTarget::Path(path) => Ok(url::Url::parse(&format!("http://local{path}")).unwrap()),
    })
}

fn retries_on_5xx(strategy: RetryStrategy) -> Validator {
    Validator::Custom(Arc::new(move |response: &http_types::Response| match response.status {
        ResponseStatus::Code(code) if code.is_server_error() => {
            ValidatorAction::Retry(strategy.clone())
        }
        _ => ValidatorAction::NextValidator,
    }))
}

#[tokio::test(start_paused = true)]
async fn exponential_backoff_sleeps_the_computed_durations() {
    let transport = Arc::new(ScriptedTransport {
        calls: AtomicUsize::new(0),
        statuses: Mutex::new(vec![500, 500, 200]),
    });
    let loader = Loader::new(transport);
    let chain = ValidatorChain::new(vec![retries_on_5xx(RetryStrategy::Exponential {
        base: Duration::from_millis(50),
    })]);
    let engine = RetryEngine::new(chain, vec![]);

    let request = RequestBuilder::to_path(http::Method::GET, "/x")
        .max_retries(3)
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    let response = engine
        .run(&loader, &request, &resolver(), &SecurityPolicy::Default, None, None)
        .await;
    let elapsed = start.elapsed();

    assert!(response.status.is_success());
    // backoff(0) = 50ms, backoff(1) = 100ms => at least 150ms elapsed under paused time
    assert!(elapsed >= Duration::from_millis(150));
}

#[tokio::test(start_paused = true)]
async fn default_validator_fails_non_retriable_status_without_sleeping() {
    let transport = Arc::new(ScriptedTransport {
        calls: AtomicUsize::new(0),
        statuses: Mutex::new(vec![404]),
    });
    let loader = Loader::new(transport);
    let chain = ValidatorChain::default();
    let engine = RetryEngine::new(chain, vec![]);

    let request = RequestBuilder::to_path(http::Method::GET, "/x")
        .max_retries(3)
        .build()
        .unwrap();

    let response = engine
        .run(&loader, &request, &resolver(), &SecurityPolicy::Default, None, None)
        .await;

    assert_eq!(
        response.error.unwrap().category(),
        http_errors::ErrorCategory::ValidatorFailure
    );
}

#[tokio::test(start_paused = true)]
async fn after_strategy_runs_alt_request_then_retries_original() {
    let transport = Arc::new(ScriptedTransport {
        calls: AtomicUsize::new(0),
        statuses: Mutex::new(vec![401, 200, 200]),
    });
    let loader = Loader::new(transport);

    let alt_seen = Arc::new(Mutex::new(false));
    let alt_seen_clone = alt_seen.clone();

    let strategy = RetryStrategy::After {
        alt_request: Box::new(
            RequestBuilder::to_path(http::Method::POST, "/refresh")
                .build()
                .unwrap(),
        ),
        delay_before_original: Duration::from_millis(5),
        on_alt_response: Arc::new(move |response| {
            *alt_seen_clone.lock().unwrap() = response.status.is_success();
        }),
    };

    let chain = ValidatorChain::new(vec![Validator::Custom(Arc::new(move |response| {
        match response.status {
            ResponseStatus::Code(code) if code.as_u16() == 401 => {
                ValidatorAction::Retry(strategy.clone())
            }
            _ => ValidatorAction::NextValidator,
        }
    }))]);
    let engine = RetryEngine::new(chain, vec![]);

    let request = RequestBuilder::to_path(http::Method::GET, "/protected")
        .max_retries(1)
        .build()
        .unwrap();

    let response = engine
        .run(&loader, &request, &resolver(), &SecurityPolicy::Default, None, None)
        .await;

    assert!(response.status.is_success());
    assert!(*alt_seen.lock().unwrap());
}
