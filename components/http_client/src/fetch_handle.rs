//! An in-flight fetch (§5, §6): awaitable, cancelable, with a push-style and a
//! pull-style progress accessor.

use http_errors::HttpError;
use http_types::{Progress, Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A single in-flight (or completed) [`crate::Client::fetch`] call.
///
/// `FetchHandle` implements [`Future`], so `client.fetch(request).await` yields
/// the final [`Response`] directly. Dropping an un-awaited handle detaches the
/// underlying task rather than canceling it; call [`FetchHandle::cancel`]
/// explicitly to abort (§5 "Cancellation").
pub struct FetchHandle {
    join: JoinHandle<Response>,
    progress_rx: watch::Receiver<Progress>,
    request_snapshot: Request,
}

impl FetchHandle {
    pub(crate) fn new(
        join: JoinHandle<Response>,
        progress_rx: watch::Receiver<Progress>,
        request_snapshot: Request,
    ) -> Self {
        Self {
            join,
            progress_rx,
            request_snapshot,
        }
    }

    /// Cancel the in-flight fetch. The eventual (or already-resolved) output
    /// carries `error.category = cancelled` (§5).
    pub fn cancel(&self) {
        self.join.abort();
    }

    /// The most recently observed progress value (pull-style, §6).
    pub fn progress(&self) -> Progress {
        self.progress_rx.borrow().clone()
    }

    /// A push-style progress subscription (§6): clone and poll independently of
    /// the handle itself.
    pub fn progress_receiver(&self) -> watch::Receiver<Progress> {
        self.progress_rx.clone()
    }
}

impl Future for FetchHandle {
    type Output = Response;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Response> {
        match Pin::new(&mut self.join).poll(cx) {
            Poll::Ready(Ok(response)) => Poll::Ready(response),
            Poll::Ready(Err(_join_error)) => Poll::Ready(Response::error_response(
                HttpError::Cancelled,
                self.request_snapshot.clone(),
            )),
            Poll::Pending => Poll::Pending,
        }
    }
}
