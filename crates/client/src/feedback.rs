//! Expiry timers for transient UI feedback (success banner, row highlight).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// A single cancellable expiry.
///
/// Scheduling again supersedes the pending expiry; dropping the timer cancels
/// it, so no callback runs after the owner is gone.
#[derive(Debug, Default)]
pub struct FeedbackTimer {
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl FeedbackTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `expire` after `after`, unless superseded or cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, after: Duration, expire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mine = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let generation = self.generation.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if generation.load(Ordering::Acquire) == mine {
                expire();
            }
        });

        let previous = self.slot().replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(pending) = self.slot().take() {
            pending.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot().as_ref().is_some_and(|h| !h.is_finished())
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for FeedbackTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        (fired, move || {
            let f = f.clone();
            Box::new(move || {
                f.fetch_add(1, Ordering::SeqCst);
            })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let timer = FeedbackTimer::new();
        let (fired, make) = counter();
        timer.schedule(Duration::from_secs(2), make());
        assert!(timer.is_pending());

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_supersedes_pending_expiry() {
        let timer = FeedbackTimer::new();
        let (fired, make) = counter();
        timer.schedule(Duration::from_secs(2), make());

        tokio::time::sleep(Duration::from_secs(1)).await;
        timer.schedule(Duration::from_secs(2), make());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_expiry() {
        let timer = FeedbackTimer::new();
        let (fired, make) = counter();
        timer.schedule(Duration::from_secs(3), make());
        drop(timer);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
