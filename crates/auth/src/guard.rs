//! Session guard: the single owner of the client's session state.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;

use crate::credentials;
use crate::route::{self, RouteAccess, RouteDecision};
use crate::watchdog::{self, ProtectedViewMount, WatchdogConfig, WatchdogTask};
use crate::{AuthError, AuthService, Session, UserProfile};

/// Where the session is in its lifecycle.
///
/// `Expired` and `LoggedOut` are unauthenticated phases that remember why the
/// session ended; a new login starts from any of the three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Expired,
    LoggedOut,
}

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub session: Option<Session>,
    pub phase: SessionPhase,
    /// True until [`SessionGuard::init`] has settled the restored session.
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session: None,
            phase: SessionPhase::Unauthenticated,
            loading: true,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated && self.session.is_some()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.as_ref().map(|s| &s.user)
    }
}

/// Guards every mutating action and protected view against an invalid session.
///
/// Cheap to clone; clones share the same session store. Inject it into the
/// components that need it instead of reaching for a global.
#[derive(Clone)]
pub struct SessionGuard {
    inner: Arc<GuardInner>,
}

struct GuardInner {
    auth: Arc<dyn AuthService>,
    state: watch::Sender<SessionState>,
    watchdog_config: WatchdogConfig,
    watchdog: Mutex<Weak<WatchdogTask>>,
}

impl SessionGuard {
    pub fn new(auth: Arc<dyn AuthService>) -> Self {
        Self::with_watchdog_config(auth, WatchdogConfig::default())
    }

    pub fn with_watchdog_config(
        auth: Arc<dyn AuthService>,
        watchdog_config: WatchdogConfig,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(GuardInner {
                auth,
                state,
                watchdog_config,
                watchdog: Mutex::new(Weak::new()),
            }),
        }
    }

    /// Settle the initial state, keeping a restored session only if its token is still valid.
    pub fn init(&self, restored: Option<Session>) {
        let restored = restored.filter(|s| self.inner.auth.is_token_valid(s));
        let authenticated = restored.is_some();
        self.inner.state.send_modify(|state| {
            state.session = restored;
            state.phase = if authenticated {
                SessionPhase::Authenticated
            } else {
                SessionPhase::Unauthenticated
            };
            state.loading = false;
        });
        tracing::debug!(authenticated, "session store initialised");
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.begin_authentication();
        let result = self
            .inner
            .auth
            .login(email, password)
            .await
            .map_err(|err| err.or_fallback(credentials::LOGIN_FAILED));
        self.finish_authentication(&result);
        match &result {
            Ok(_) => tracing::info!(email, "login succeeded"),
            Err(err) => tracing::warn!(email, error = %err, "login failed"),
        }
        result
    }

    pub async fn register(
        &self,
        name: &str,
        lastname: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        self.begin_authentication();
        let result = self
            .inner
            .auth
            .register(name, lastname, email, password)
            .await
            .map_err(|err| err.or_fallback(credentials::SIGNUP_FAILED));
        self.finish_authentication(&result);
        match &result {
            Ok(_) => tracing::info!(email, "registration succeeded"),
            Err(err) => tracing::warn!(
                email,
                conflict = err.is_conflict(),
                error = %err,
                "registration failed"
            ),
        }
        result
    }

    /// Clear the session unconditionally, then tell the service. Idempotent.
    pub async fn logout(&self) {
        let mut previous = None;
        self.inner.state.send_modify(|state| {
            previous = state.session.take();
            state.phase = SessionPhase::LoggedOut;
            state.loading = false;
        });

        let Some(session) = previous else {
            tracing::debug!("logout without an active session");
            return;
        };
        tracing::info!(email = %session.user.email, "logged out");
        if let Err(err) = self.inner.auth.logout(&session).await {
            tracing::warn!(error = %err, "authentication service failed to acknowledge logout");
        }
    }

    /// Check the current token synchronously. An invalid token clears the
    /// session so that route guards redirect on the next render.
    pub fn validate_token(&self) -> bool {
        let Some(session) = self.inner.state.borrow().session.clone() else {
            return false;
        };
        if self.inner.auth.is_token_valid(&session) {
            return true;
        }
        self.expire();
        false
    }

    fn expire(&self) {
        let cleared = self.inner.state.send_if_modified(|state| {
            if state.session.take().is_none() {
                return false;
            }
            state.phase = SessionPhase::Expired;
            true
        });
        if cleared {
            tracing::warn!("session token is no longer valid; session cleared");
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.inner.state.borrow().user().cloned()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.state.borrow().phase
    }

    /// Route decision for a view with the given access rule.
    pub fn decide(&self, access: RouteAccess) -> RouteDecision {
        route::decide(access, &self.inner.state.borrow())
    }

    /// Validate the token now, then start (or join) periodic validation for a
    /// mounted protected view.
    ///
    /// A stale session is cleared before the view renders. At most one
    /// validation task runs per guard; every mount shares it and it stops when
    /// the last mount is dropped or the session becomes invalid.
    /// Must be called from within a tokio runtime.
    pub fn mount_protected_view(&self) -> ProtectedViewMount {
        if !self.validate_token() {
            tracing::debug!("protected view mounted without a valid session");
        }
        let mut slot = self
            .inner
            .watchdog
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = slot.upgrade().filter(|t| !t.is_finished()) {
            return ProtectedViewMount::new(task);
        }
        let task = Arc::new(watchdog::spawn(self.clone(), self.inner.watchdog_config.interval));
        *slot = Arc::downgrade(&task);
        ProtectedViewMount::new(task)
    }

    fn begin_authentication(&self) {
        self.inner.state.send_modify(|state| {
            state.phase = SessionPhase::Authenticating;
        });
    }

    fn finish_authentication(&self, result: &Result<Session, AuthError>) {
        self.inner.state.send_modify(|state| {
            match result {
                Ok(session) => {
                    state.session = Some(session.clone());
                    state.phase = SessionPhase::Authenticated;
                }
                Err(_) if state.session.is_some() => {
                    state.phase = SessionPhase::Authenticated;
                }
                Err(_) => {
                    state.phase = SessionPhase::Unauthenticated;
                }
            }
            state.loading = false;
        });
    }
}

impl core::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryAuthService;

    fn guard_with_account() -> (SessionGuard, Arc<InMemoryAuthService>) {
        let auth = Arc::new(InMemoryAuthService::new());
        auth.add_account("Ana", "Pérez", "ana@example.com", "secreto");
        let guard = SessionGuard::new(auth.clone());
        guard.init(None);
        (guard, auth)
    }

    #[test]
    fn starts_loading_until_init() {
        let guard = SessionGuard::new(Arc::new(InMemoryAuthService::new()));
        assert!(guard.is_loading());
        assert!(!guard.is_authenticated());

        guard.init(None);
        assert!(!guard.is_loading());
        assert_eq!(guard.phase(), SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn init_drops_restored_session_with_invalid_token() {
        let auth = Arc::new(InMemoryAuthService::new());
        auth.add_account("Ana", "Pérez", "ana@example.com", "secreto");
        let session = auth.login("ana@example.com", "secreto").await.unwrap();

        let guard = SessionGuard::new(auth.clone());
        auth.set_token_valid(Some(false));
        guard.init(Some(session.clone()));
        assert!(!guard.is_authenticated());

        auth.set_token_valid(None);
        guard.init(Some(session));
        assert!(guard.is_authenticated());
    }

    #[tokio::test]
    async fn login_stores_session() {
        let (guard, _) = guard_with_account();

        let session = guard.login("ana@example.com", "secreto").await.unwrap();
        assert_eq!(session.user.firstname, "Ana");
        assert!(guard.is_authenticated());
        assert_eq!(guard.user().map(|u| u.email), Some("ana@example.com".to_string()));
    }

    #[tokio::test]
    async fn login_failure_surfaces_service_message_verbatim() {
        let (guard, auth) = guard_with_account();
        auth.fail_next(AuthError::Transport("Servidor no disponible".to_string()));

        let err = guard.login("ana@example.com", "secreto").await.unwrap_err();
        assert_eq!(err, AuthError::Transport("Servidor no disponible".to_string()));
        assert_eq!(guard.phase(), SessionPhase::Unauthenticated);

        let err = guard.login("ana@example.com", "otra").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn blank_service_messages_fall_back_to_generic_text() {
        let (guard, auth) = guard_with_account();

        auth.fail_next(AuthError::Transport(String::new()));
        let err = guard.login("ana@example.com", "secreto").await.unwrap_err();
        assert_eq!(err, AuthError::Transport(credentials::LOGIN_FAILED.to_string()));

        auth.fail_next(AuthError::Conflict("  ".to_string()));
        let err = guard
            .register("Luis", "Gómez", "luis@example.com", "clave")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Conflict(credentials::SIGNUP_FAILED.to_string()));
        assert!(err.is_conflict());
        assert!(!guard.is_authenticated());
    }

    #[tokio::test]
    async fn register_conflict_is_distinguishable() {
        let (guard, _) = guard_with_account();

        let err = guard
            .register("Ana", "Pérez", "ana@example.com", "secreto")
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(!guard.is_authenticated());

        let session = guard
            .register("Luis", "Gómez", "luis@example.com", "clave")
            .await
            .unwrap();
        assert_eq!(session.user.lastname, "Gómez");
        assert!(guard.is_authenticated());
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let (guard, auth) = guard_with_account();
        guard.login("ana@example.com", "secreto").await.unwrap();

        guard.logout().await;
        guard.logout().await;

        assert!(!guard.is_authenticated());
        assert_eq!(guard.phase(), SessionPhase::LoggedOut);
        assert_eq!(auth.logout_calls(), 1);
    }

    #[tokio::test]
    async fn logout_clears_session_even_if_service_fails() {
        let (guard, auth) = guard_with_account();
        guard.login("ana@example.com", "secreto").await.unwrap();
        auth.fail_next(AuthError::Transport("sin conexión".to_string()));

        guard.logout().await;
        assert!(guard.state().session.is_none());
    }

    #[tokio::test]
    async fn invalid_token_clears_session() {
        let (guard, auth) = guard_with_account();
        guard.login("ana@example.com", "secreto").await.unwrap();
        assert!(guard.validate_token());

        auth.set_token_valid(Some(false));
        assert!(!guard.validate_token());
        assert!(!guard.is_authenticated());
        assert_eq!(guard.phase(), SessionPhase::Expired);

        // Redundant calls stay false and do not touch the service again.
        let checks = auth.validity_checks();
        assert!(!guard.validate_token());
        assert_eq!(auth.validity_checks(), checks);
    }

    #[tokio::test]
    async fn subscribers_observe_expiry() {
        let (guard, auth) = guard_with_account();
        guard.login("ana@example.com", "secreto").await.unwrap();
        let mut rx = guard.subscribe();
        rx.borrow_and_update();

        auth.set_token_valid(Some(false));
        guard.validate_token();

        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_authenticated());
    }
}
