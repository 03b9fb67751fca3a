//! In-memory authentication service for tests/dev.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::{AuthError, AuthService, Session, SessionToken, UserProfile};

pub const INVALID_CREDENTIALS: &str = "Credenciales inválidas";
pub const EMAIL_TAKEN: &str = "El email ya está registrado";

#[derive(Debug, Clone)]
struct Account {
    profile: UserProfile,
    password: String,
}

/// In-memory account registry.
///
/// - No IO
/// - Tokens valid for a fixed TTL, unless overridden with
///   [`set_token_valid`](Self::set_token_valid)
/// - Call counters for assertions; [`fail_next`](Self::fail_next) scripts one failure
#[derive(Debug)]
pub struct InMemoryAuthService {
    accounts: Mutex<HashMap<String, Account>>,
    token_ttl: Duration,
    validity_override: Mutex<Option<bool>>,
    next_failure: Mutex<Option<AuthError>>,
    issued: AtomicUsize,
    login_calls: AtomicUsize,
    register_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    validity_checks: AtomicUsize,
}

impl Default for InMemoryAuthService {
    fn default() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            token_ttl: Duration::hours(1),
            validity_override: Mutex::new(None),
            next_failure: Mutex::new(None),
            issued: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            register_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            validity_checks: AtomicUsize::new(0),
        }
    }
}

impl InMemoryAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn add_account(&self, firstname: &str, lastname: &str, email: &str, password: &str) {
        let account = Account {
            profile: UserProfile {
                firstname: firstname.to_string(),
                lastname: lastname.to_string(),
                email: email.to_string(),
            },
            password: password.to_string(),
        };
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.insert(email.to_lowercase(), account);
        }
    }

    /// Force every validity check to `valid`, or `None` to use the token window.
    pub fn set_token_valid(&self, valid: Option<bool>) {
        if let Ok(mut slot) = self.validity_override.lock() {
            *slot = valid;
        }
    }

    /// Make the next login/register/logout call fail with `error`.
    pub fn fail_next(&self, error: AuthError) {
        if let Ok(mut slot) = self.next_failure.lock() {
            *slot = Some(error);
        }
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub fn validity_checks(&self) -> usize {
        self.validity_checks.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> Result<(), AuthError> {
        let failure = self.next_failure.lock().ok().and_then(|mut slot| slot.take());
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn issue(&self, profile: UserProfile) -> Session {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        Session {
            user: profile,
            token: SessionToken {
                value: format!("mem-token-{n}"),
                issued_at: now,
                expires_at: now + self.token_ttl,
            },
        }
    }

    fn lock_accounts(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Account>>, AuthError> {
        self.accounts
            .lock()
            .map_err(|_| AuthError::Transport("account registry unavailable".to_string()))
    }
}

#[async_trait]
impl AuthService for InMemoryAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;

        let profile = {
            let accounts = self.lock_accounts()?;
            match accounts.get(&email.trim().to_lowercase()) {
                Some(account) if account.password == password => account.profile.clone(),
                _ => return Err(AuthError::InvalidCredentials(INVALID_CREDENTIALS.to_string())),
            }
        };
        Ok(self.issue(profile))
    }

    async fn register(
        &self,
        name: &str,
        lastname: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;

        let key = email.trim().to_lowercase();
        let profile = UserProfile {
            firstname: name.trim().to_string(),
            lastname: lastname.trim().to_string(),
            email: email.trim().to_string(),
        };
        {
            let mut accounts = self.lock_accounts()?;
            if accounts.contains_key(&key) {
                return Err(AuthError::from_register_message(EMAIL_TAKEN));
            }
            accounts.insert(
                key,
                Account {
                    profile: profile.clone(),
                    password: password.to_string(),
                },
            );
        }
        Ok(self.issue(profile))
    }

    async fn logout(&self, _session: &Session) -> Result<(), AuthError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()
    }

    fn is_token_valid(&self, session: &Session) -> bool {
        self.validity_checks.fetch_add(1, Ordering::SeqCst);
        let forced = self.validity_override.lock().ok().and_then(|slot| *slot);
        match forced {
            Some(valid) => valid,
            None => crate::validate_token(&session.token, Utc::now()).is_ok(),
        }
    }
}
