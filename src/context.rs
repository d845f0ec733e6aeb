//! Cancellation and deadlines for calls to external collaborators.
//!
//! Every store read and descriptor lookup done by the resolution core goes
//! through [`Context::run`]. Nothing is retried here.

use crate::{Error, Result};
use std::{future::Future, time::Duration};
use tokio::{sync::watch, time::Instant};

#[derive(Clone, Debug, Default)]
pub struct Context {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Fires cancellation for every clone of the paired [`Context`]
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        // Receivers may already be gone, nothing left to cancel then
        let _ = self.0.send(true);
    }
}

async fn cancelled(cancel: Option<watch::Receiver<bool>>) {
    if let Some(mut rx) = cancel {
        let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
        if !closed {
            return;
        }
    }
    std::future::pending::<()>().await
}

async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

impl Context {
    /// Never cancelled, no deadline
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancel(self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                cancel: Some(rx),
                ..self
            },
            CancelHandle(tx),
        )
    }

    /// Earliest deadline wins
    pub fn with_deadline(self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self {
            deadline: Some(deadline),
            ..self
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, |rx| *rx.borrow())
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if matches!(self.deadline, Some(deadline) if deadline <= Instant::now()) {
            return Err(Error::DeadlineExceeded);
        }
        Ok(())
    }

    /// Run external call, aborting it once cancellation or deadline fires
    pub async fn run<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            _ = cancelled(self.cancel.clone()) => Err(Error::Cancelled),
            _ = expired(self.deadline) => Err(Error::DeadlineExceeded),
            result = call => result,
        }
    }
}
