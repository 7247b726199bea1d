//! The global stubber registry (§4.4, §9 "Global singleton state").
//!
//! A single process-wide registry behind a `tokio::sync::RwLock`, since lookups
//! (one per intercepted request) vastly outnumber registrations/removals.

use crate::stub::Stub;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tokio::sync::RwLock;

/// The stubber's unhandled-request policy (§3, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnhandledMode {
    /// A request matching no stub and no ignore rule is a `stubUnhandled` error
    #[default]
    OptOut,
    /// A request matching no stub and no ignore rule passes through to the real
    /// transport
    OptIn,
}

/// A handle to a previously registered [`Stub`] or ignore rule, returned by
/// [`StubberHandle::register`]/[`StubberHandle::register_ignore_rule`] for later
/// [`StubberHandle::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StubId(u64);

#[derive(Clone, Default)]
pub(crate) struct StubberState {
    pub(crate) stubs: Vec<(StubId, Stub)>,
    pub(crate) ignore_rules: Vec<(StubId, Stub)>,
    pub(crate) unhandled_mode: UnhandledMode,
    pub(crate) enabled: bool,
}

/// The process-wide stub registry. Obtain a [`StubberHandle`] via
/// [`Stubber::global`]; there is exactly one instance per process.
pub struct Stubber {
    pub(crate) state: RwLock<StubberState>,
    next_id: AtomicU64,
}

static STUBBER: OnceLock<Stubber> = OnceLock::new();

impl Stubber {
    fn new() -> Self {
        Self {
            state: RwLock::new(StubberState::default()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Obtain a handle to the process-wide registry.
    pub fn global() -> StubberHandle {
        StubberHandle(STUBBER.get_or_init(Stubber::new))
    }

    /// Build a freestanding registry, independent of the process-wide one.
    ///
    /// The production story (§4.4, §9) is a single global singleton, but tests
    /// that run concurrently within one process benefit from not sharing that
    /// singleton with every other test touching it. The returned handle behaves
    /// identically to [`Stubber::global`]'s in every other respect; it just isn't
    /// *the* shared instance.
    pub fn isolated() -> StubberHandle {
        StubberHandle(Box::leak(Box::new(Stubber::new())))
    }

    fn next_id(&self) -> StubId {
        StubId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// A handle to the global [`Stubber`], obtained via [`Stubber::global`].
///
/// Registration and removal are explicit (§4.4): there is no implicit per-test
/// setup/teardown. Use [`StubberHandle::scoped`] when you want an RAII guard
/// that reverts to the registry's prior state on drop.
#[derive(Clone, Copy)]
pub struct StubberHandle(&'static Stubber);

impl StubberHandle {
    /// Register a stub, returning an id that can later be passed to [`Self::remove`].
    pub async fn register(&self, stub: Stub) -> StubId {
        let id = self.0.next_id();
        self.0.state.write().await.stubs.push((id, stub));
        id
    }

    /// Register an ignore rule: a request matching it passes through to the real
    /// transport regardless of `unhandledMode` (§4.4 "Ignore rules").
    pub async fn register_ignore_rule(&self, stub: Stub) -> StubId {
        let id = self.0.next_id();
        self.0.state.write().await.ignore_rules.push((id, stub));
        id
    }

    /// Remove a previously registered stub or ignore rule.
    pub async fn remove(&self, id: StubId) {
        let mut state = self.0.state.write().await;
        state.stubs.retain(|(existing, _)| *existing != id);
        state.ignore_rules.retain(|(existing, _)| *existing != id);
    }

    /// Remove every registered stub and ignore rule.
    pub async fn remove_all(&self) {
        let mut state = self.0.state.write().await;
        state.stubs.clear();
        state.ignore_rules.clear();
    }

    /// Enable interception.
    pub async fn enable(&self) {
        self.0.state.write().await.enabled = true;
    }

    /// Disable interception; every request passes through to the real transport.
    pub async fn disable(&self) {
        self.0.state.write().await.enabled = false;
    }

    /// Whether interception is currently enabled.
    pub async fn is_enabled(&self) -> bool {
        self.0.state.read().await.enabled
    }

    /// Set the policy for requests matching no stub and no ignore rule.
    pub async fn set_unhandled_mode(&self, mode: UnhandledMode) {
        self.0.state.write().await.unhandled_mode = mode;
    }

    /// Snapshot the current registry state, enable interception, and return an
    /// RAII guard that restores the snapshot when dropped (§4.4 "Stub registry
    /// lifecycle") — the idiomatic way for a test to install stubs and have them
    /// automatically revert.
    ///
    /// Dropping the guard outside of a Tokio runtime context leaves the registry
    /// in its scoped state (there is no way to run the restoring write without a
    /// runtime); call [`ScopedStubGuard::restore`] explicitly from async test code
    /// when that matters.
    pub async fn scoped(&self) -> ScopedStubGuard {
        let snapshot = self.0.state.read().await.clone();
        self.0.state.write().await.enabled = true;
        ScopedStubGuard {
            stubber: self.0,
            snapshot: Some(snapshot),
        }
    }

    pub(crate) fn inner(&self) -> &'static Stubber {
        self.0
    }
}

/// RAII guard returned by [`StubberHandle::scoped`]. Restores the registry to
/// the state it held before the scope began, either explicitly via
/// [`Self::restore`] or on drop.
pub struct ScopedStubGuard {
    stubber: &'static Stubber,
    snapshot: Option<StubberState>,
}

impl ScopedStubGuard {
    /// Explicitly restore the pre-scope registry state. Prefer this over relying
    /// on `Drop` in async tests, since it awaits the restore rather than merely
    /// spawning it.
    pub async fn restore(mut self) {
        if let Some(previous) = self.snapshot.take() {
            *self.stubber.state.write().await = previous;
        }
    }
}

impl Drop for ScopedStubGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.snapshot.take() {
            let stubber = self.stubber;
            tokio::spawn(async move {
                *stubber.state.write().await = previous;
            });
        }
    }
}
