//! At most one in-flight submission per logical form.

use std::sync::atomic::{AtomicBool, Ordering};

/// Rejects re-entrant submissions of the same form while one is in flight.
///
/// Concurrent attempts are ignored, not queued.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    in_flight: AtomicBool,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the form, or `None` if a submission is already running.
    pub fn try_begin(&self) -> Option<SubmissionPermit<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionPermit {
                in_flight: &self.in_flight,
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Releases the form when dropped, however the submission ends.
#[derive(Debug)]
pub struct SubmissionPermit<'a> {
    in_flight: &'a AtomicBool,
}

impl Drop for SubmissionPermit<'_> {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
