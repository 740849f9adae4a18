//! Abortable request scopes.
//!
//! A [`ViewScope`] lives as long as the view that started a request. Work run
//! through one of its handles resolves to `None` once the scope is aborted or
//! dropped, so results that arrive after teardown are discarded.

use std::future::Future;

use tokio::sync::watch;

/// Owner side of an abortable scope. Dropping it aborts.
#[derive(Debug)]
pub struct ViewScope {
    aborted: watch::Sender<bool>,
}

impl ViewScope {
    /// Open a live scope.
    #[must_use]
    pub fn new() -> Self {
        let (aborted, _) = watch::channel(false);

        Self { aborted }
    }

    /// A handle for running work inside this scope.
    #[must_use]
    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            aborted: self.aborted.subscribe(),
        }
    }

    /// Abort every in-flight request in the scope.
    pub fn abort(&self) {
        self.aborted.send_replace(true);
    }

    /// Whether the scope has been aborted.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        *self.aborted.borrow()
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Runs futures until the owning [`ViewScope`] aborts.
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    aborted: watch::Receiver<bool>,
}

impl ScopeHandle {
    /// Drive `future` to completion, or return `None` if the scope aborts
    /// first. A scope that is already aborted never polls `future`.
    pub async fn run<F>(&self, future: F) -> Option<F::Output>
    where
        F: Future,
    {
        let mut aborted = self.aborted.clone();

        tokio::select! {
            biased;

            _ = aborted.wait_for(|aborted| *aborted) => None,
            output = future => Some(output),
        }
    }

    /// Whether the owning scope has been aborted or dropped.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        *self.aborted.borrow() || self.aborted.has_changed().is_err()
    }
}
