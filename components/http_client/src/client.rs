//! The session-owning client (§3 "Client", §6 "Client boundary").

use crate::compose;
use crate::config::ClientConfig;
use crate::cookie_jar::{CookieJar, NoOpCookieJar};
use crate::delegate::ClientDelegate;
use crate::fetch_handle::FetchHandle;
use http_errors::HttpError;
use http_loader::Loader;
use http_transport::Transport;
use http_types::{Progress, ProgressEvent, Request, Response};
use http_validators::{ResponseTransformer, RetryEngine, UrlResolver, Validator, ValidatorChain};
use std::sync::{Arc, RwLock};
use tokio::sync::{watch, Semaphore};

/// Owns a base URL, shared defaults, the validator chain and response
/// transformers, the cookie jar, and the lifecycle delegate for every fetch run
/// through it (§3). Cheap to clone (internals are `Arc`-backed) and safe to
/// share across concurrently-running fetches.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    loader: Arc<Loader>,
    validators: Arc<RwLock<ValidatorChain>>,
    transformers: Arc<RwLock<Vec<ResponseTransformer>>>,
    cookie_jar: Arc<dyn CookieJar>,
    delegate: ClientDelegate,
    semaphore: Arc<Semaphore>,
}

impl Client {
    /// Build a client around the given transport, using default configuration,
    /// the default validator chain, no transformers, a no-op cookie jar, and no
    /// delegate callbacks.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    /// Build a client around the given transport and configuration.
    pub fn with_config(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        let max_concurrent = config.max_concurrent_operations;
        Self {
            config,
            loader: Arc::new(Loader::new(transport)),
            validators: Arc::new(RwLock::new(ValidatorChain::default())),
            transformers: Arc::new(RwLock::new(Vec::new())),
            cookie_jar: Arc::new(NoOpCookieJar),
            delegate: ClientDelegate::default(),
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Build a client around an already-configured [`Loader`] (e.g. one with a
    /// non-default [`http_loader::LoaderConfig`]).
    pub fn with_loader(loader: Arc<Loader>, config: ClientConfig) -> Self {
        let max_concurrent = config.max_concurrent_operations;
        Self {
            config,
            loader,
            validators: Arc::new(RwLock::new(ValidatorChain::default())),
            transformers: Arc::new(RwLock::new(Vec::new())),
            cookie_jar: Arc::new(NoOpCookieJar),
            delegate: ClientDelegate::default(),
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Replace the cookie jar (default is a no-op jar).
    pub fn set_cookie_jar(&mut self, cookie_jar: Arc<dyn CookieJar>) {
        self.cookie_jar = cookie_jar;
    }

    /// Replace the lifecycle delegate.
    pub fn set_delegate(&mut self, delegate: ClientDelegate) {
        self.delegate = delegate;
    }

    /// Append a validator to the end of the chain.
    pub fn add_validator(&self, validator: Validator) {
        self.validators.write().unwrap().push(validator);
    }

    /// Remove every validator, including the default one.
    pub fn clear_validators(&self) {
        self.validators.write().unwrap().clear();
    }

    /// Append a response transformer to the end of the list.
    pub fn add_transformer(&self, transformer: ResponseTransformer) {
        self.transformers.write().unwrap().push(transformer);
    }

    /// The client's configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run `request` to completion: compose it against this client's defaults,
    /// execute it through the data loader and validator chain, retrying as
    /// directed, and return a handle that resolves to the final [`Response`]
    /// (§6 `fetch`).
    pub fn fetch(&self, request: Request) -> FetchHandle {
        self.delegate.notify_enqueue(&request);

        let (composed, _url) = match compose::compose(&self.config, self.cookie_jar.as_ref(), request.clone()) {
            Ok(pair) => pair,
            Err(error) => return self.immediate_failure(request, error),
        };

        let loader = self.loader.clone();
        let base_url = self.config.base_url.clone();
        let resolver: UrlResolver = Arc::new(move |req: &Request| compose::resolve_url(base_url.as_ref(), req));
        let effective_security = composed
            .security
            .clone()
            .unwrap_or_else(|| self.config.security.clone());
        let chain = self.validators.read().unwrap().clone();
        let transformers = self.transformers.read().unwrap().clone();
        let engine = RetryEngine::new(chain, transformers);
        let will_retry = self.delegate.as_will_retry_handler();
        let delegate = self.delegate.clone();
        let cookie_jar = self.cookie_jar.clone();
        let semaphore = self.semaphore.clone();

        let (progress_tx, progress_rx) = watch::channel(initial_progress());
        let task_request = composed.clone();
        let handle_snapshot = composed;

        let join = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
            let response = engine
                .run(
                    &loader,
                    &task_request,
                    &resolver,
                    &effective_security,
                    Some(progress_tx),
                    will_retry.as_ref(),
                )
                .await;
            cookie_jar.store_from_response(&response.url, &response.headers);
            delegate.notify_metrics(&task_request, &response.metrics);
            delegate.notify_finish(&response);
            response
        });

        FetchHandle::new(join, progress_rx, handle_snapshot)
    }

    /// Run `request`, then decode the response body with `decode`. A response
    /// carrying a transport/validator error short-circuits before `decode`
    /// runs; a `decode` failure surfaces as `HttpError::DecodeFailed` (§6).
    pub async fn fetch_decoded<T>(
        &self,
        request: Request,
        decode: impl FnOnce(&Response) -> Result<T, String>,
    ) -> Result<T, HttpError> {
        let response = self.fetch(request).await;
        if let Some(error) = response.error {
            return Err(error);
        }
        decode(&response).map_err(HttpError::DecodeFailed)
    }

    fn immediate_failure(&self, request: Request, error: HttpError) -> FetchHandle {
        let response = Response::error_response(error, request.clone());
        let (_progress_tx, progress_rx) = watch::channel(initial_progress());
        let join = tokio::spawn(async move { response });
        FetchHandle::new(join, progress_rx, request)
    }
}

fn initial_progress() -> Progress {
    Progress::new(ProgressEvent::Upload, 0, -1)
}
