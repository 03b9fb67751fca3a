//! Periodic token validation bound to the lifetime of protected views.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::SessionGuard;

/// Session watchdog configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogConfig {
    /// Time between background token checks.
    pub interval: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

impl WatchdogConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Running validation loop. Dropping it stops the loop.
pub(crate) struct WatchdogTask {
    shutdown: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl WatchdogTask {
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for WatchdogTask {
    fn drop(&mut self) {
        self.shutdown.notify_one();
        // The loop may be parked on a tick; abort so nothing fires after unmount.
        self.handle.abort();
        tracing::debug!("session watchdog released");
    }
}

/// Handle held by a mounted protected view.
///
/// Dropping the handle unmounts the view; the shared validation loop stops
/// once no mounted view holds it.
pub struct ProtectedViewMount {
    task: Arc<WatchdogTask>,
}

impl ProtectedViewMount {
    pub(crate) fn new(task: Arc<WatchdogTask>) -> Self {
        Self { task }
    }

    /// Whether the validation loop is still running.
    pub fn is_watching(&self) -> bool {
        !self.task.is_finished()
    }
}

impl core::fmt::Debug for ProtectedViewMount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProtectedViewMount")
            .field("watching", &self.is_watching())
            .finish()
    }
}

pub(crate) fn spawn(guard: SessionGuard, interval: Duration) -> WatchdogTask {
    let shutdown = Arc::new(Notify::new());
    let stop = shutdown.clone();
    let mut changes = guard.subscribe();

    let handle = tokio::spawn(async move {
        if !guard.is_authenticated() {
            tracing::debug!("session watchdog not started: no authenticated session");
            return;
        }
        tracing::info!(interval_secs = interval.as_secs(), "session watchdog started");

        // Mounting already checked once; the next check is one interval later.
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = stop.notified() => {
                    tracing::debug!("session watchdog received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    if !guard.validate_token() {
                        tracing::info!("session watchdog stopping: token invalid");
                        break;
                    }
                }
                changed = changes.changed() => {
                    if changed.is_err() || !changes.borrow_and_update().is_authenticated() {
                        tracing::info!("session watchdog stopping: session ended");
                        break;
                    }
                }
            }
        }
    });

    WatchdogTask { shutdown, handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthService, InMemoryAuthService};

    async fn signed_in_guard() -> (SessionGuard, Arc<InMemoryAuthService>) {
        let auth = Arc::new(InMemoryAuthService::new());
        auth.add_account("Ana", "Pérez", "ana@example.com", "secreto");
        let guard = SessionGuard::new(auth.clone());
        guard.init(None);
        guard.login("ana@example.com", "secreto").await.unwrap();
        (guard, auth)
    }

    #[tokio::test(start_paused = true)]
    async fn checks_once_per_interval_while_mounted() {
        let (guard, auth) = signed_in_guard().await;
        let mount = guard.mount_protected_view();

        assert_eq!(auth.validity_checks(), 1);

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(auth.validity_checks(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(auth.validity_checks(), 2);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(auth.validity_checks(), 3);
        assert!(mount.is_watching());
        assert!(guard.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_token_clears_session_and_stops_ticking() {
        let (guard, auth) = signed_in_guard().await;
        let mount = guard.mount_protected_view();
        auth.set_token_valid(Some(false));

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(!guard.is_authenticated());
        assert_eq!(auth.validity_checks(), 2);
        assert!(!mount.is_watching());

        drop(mount);
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(auth.validity_checks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_session_is_cleared_on_mount() {
        let (guard, auth) = signed_in_guard().await;
        auth.set_token_valid(Some(false));

        let mount = guard.mount_protected_view();
        assert!(!guard.is_authenticated());
        assert_eq!(guard.phase(), crate::SessionPhase::Expired);
        assert_eq!(auth.validity_checks(), 1);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!mount.is_watching());
        assert_eq!(auth.validity_checks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_cancels_validation() {
        let (guard, auth) = signed_in_guard().await;
        let mount = guard.mount_protected_view();

        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(mount);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(auth.validity_checks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_mounts_share_one_loop() {
        let (guard, auth) = signed_in_guard().await;
        let first = guard.mount_protected_view();
        let second = guard.mount_protected_view();
        assert_eq!(auth.validity_checks(), 2);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(auth.validity_checks(), 3);

        drop(first);
        assert!(second.is_watching());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(auth.validity_checks(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn logout_stops_the_loop_without_another_check() {
        let (guard, auth) = signed_in_guard().await;
        let mount = guard.mount_protected_view();

        guard.logout().await;
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert!(!mount.is_watching());
        assert_eq!(auth.validity_checks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn honours_configured_interval() {
        let auth = Arc::new(InMemoryAuthService::new());
        auth.add_account("Ana", "Pérez", "ana@example.com", "secreto");
        let guard = SessionGuard::with_watchdog_config(
            auth.clone(),
            WatchdogConfig::default().with_interval(Duration::from_secs(5)),
        );
        guard.init(None);
        guard.login("ana@example.com", "secreto").await.unwrap();
        let _mount = guard.mount_protected_view();

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(auth.validity_checks(), 3);
        assert!(auth.is_token_valid(&guard.state().session.unwrap()));
    }
}
