//! Deferred values with fan-out subscribers.
//!
//! A page starts resolving its data, renders the shell right away and lets
//! each section wait on its own [`Subscriber`]. The value is published once,
//! as a whole, so no subscriber ever sees a partial result.

#![forbid(unsafe_code)]

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::DashboardResult;

/// Where a deferred value is in its life. Moves from `Loading` to exactly
/// one of the other two, and never back.
pub enum Phase<T> {
    Loading,
    Resolved(Arc<T>),
    Failed(String),
}

impl<T> Clone for Phase<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Loading => Self::Loading,
            Self::Resolved(v) => Self::Resolved(v.clone()),
            Self::Failed(m) => Self::Failed(m.clone()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Phase<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("Loading"),
            Self::Resolved(v) => f.debug_tuple("Resolved").field(v).finish(),
            Self::Failed(m) => f.debug_tuple("Failed").field(m).finish(),
        }
    }
}

impl<T> Phase<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn resolved(&self) -> Option<&Arc<T>> {
        match self {
            Self::Resolved(v) => Some(v),
            _ => None,
        }
    }
}

/// A value being produced in the background.
///
/// Owned by the render that started it: dropping or cancelling it aborts
/// the producer, and subscribers still waiting get no update.
pub struct Deferred<T> {
    rx: watch::Receiver<Phase<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T> Deferred<T>
where
    T: Send + Sync + 'static,
{
    /// Spawn `producer` on the current runtime and return immediately.
    /// An `Err` or a panic resolves the value to [`Phase::Failed`].
    pub fn spawn<F>(producer: F) -> Self
    where
        F: Future<Output = DashboardResult<Arc<T>>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(Phase::Loading);
        let task = tokio::spawn(async move {
            let phase = match AssertUnwindSafe(producer).catch_unwind().await {
                Ok(Ok(v)) => Phase::Resolved(v),
                Ok(Err(e)) => {
                    warn!(error = %e, "deferred: producer failed");
                    Phase::Failed(e.to_string())
                }
                Err(_) => {
                    error!("deferred: producer panicked");
                    Phase::Failed("producer panicked".to_string())
                }
            };
            let _ = tx.send(phase);
        });
        Self { rx, task: Some(task) }
    }

    /// Already-resolved value; subscribers settle immediately.
    pub fn ready(value: Arc<T>) -> Self {
        let (_tx, rx) = watch::channel(Phase::Resolved(value));
        Self { rx, task: None }
    }
}

impl<T> Deferred<T> {
    pub fn subscribe(&self) -> Subscriber<T> {
        Subscriber { rx: self.rx.clone() }
    }

    pub fn phase(&self) -> Phase<T> {
        self.rx.borrow().clone()
    }

    /// Abort the producer. Subscribers that have not seen a value yet will
    /// settle to `None`.
    pub fn cancel(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(h) = self.task.take() {
            h.abort();
        }
    }
}

impl<T> Drop for Deferred<T> {
    fn drop(&mut self) {
        self.abort();
    }
}

/// One consumer's view of a [`Deferred`].
pub struct Subscriber<T> {
    rx: watch::Receiver<Phase<T>>,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self { rx: self.rx.clone() }
    }
}

impl<T> Subscriber<T> {
    /// Current phase, without waiting.
    pub fn phase(&self) -> Phase<T> {
        self.rx.borrow().clone()
    }

    /// Wait until the value resolves or fails. `None` if the producer was
    /// cancelled first.
    pub async fn settled(&mut self) -> Option<Phase<T>> {
        loop {
            {
                let cur = self.rx.borrow_and_update();
                if !cur.is_loading() {
                    return Some(cur.clone());
                }
            }
            if self.rx.changed().await.is_err() {
                let last = self.rx.borrow().clone();
                return if last.is_loading() { None } else { Some(last) };
            }
        }
    }
}
