//! Call Context Module
//!
//! A cancellable, optionally deadline-bound context passed to every store
//! operation. Cancellation is signalled through a `tokio::sync::watch`
//! channel so any number of clones observe it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{CacheError, Result};

// == Context ==
/// Carries cancellation and deadline for a chain of store calls.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    /// One receiver per `with_cancel` layer; any of them cancels
    cancel: Vec<watch::Receiver<bool>>,
}

// == Cancel Handle ==
/// Cancels every clone of the context it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a cancellable copy of this context and its handle.
    ///
    /// Handles of enclosing contexts still cancel the copy.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let mut cancel = self.cancel.clone();
        cancel.push(rx);
        let ctx = Self {
            deadline: self.deadline,
            cancel,
        };
        (ctx, CancelHandle { tx: Arc::new(tx) })
    }

    /// Returns a copy that expires after `timeout`.
    ///
    /// An existing earlier deadline is kept.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns a copy that expires at `deadline`, or at the current deadline
    /// if that comes first.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self {
            deadline: Some(deadline),
            cancel: self.cancel.clone(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, if there is one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.iter().any(|rx| *rx.borrow())
    }

    /// Fails with the reason this context is done, if it is.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(CacheError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(CacheError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Runs `fut` until it completes or this context is done, whichever
    /// comes first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(CacheError::Cancelled),
            _ = self.expired() => Err(CacheError::DeadlineExceeded),
            res = fut => res,
        }
    }

    async fn cancelled(&self) {
        wait_any(self.cancel.clone()).await
    }

    async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}

/// Resolves once any receiver observes `true`.
fn wait_any(mut receivers: Vec<watch::Receiver<bool>>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async move {
        let Some(mut first) = receivers.pop() else {
            return std::future::pending::<()>().await;
        };
        let first_cancelled = async move { first.wait_for(|cancelled| *cancelled).await.is_ok() };
        tokio::select! {
            cancelled = first_cancelled => {
                if !cancelled {
                    // Handle dropped without cancelling
                    wait_any(receivers).await
                }
            }
            _ = wait_any(receivers.clone()) => {}
        }
    })
}
