use async_trait::async_trait;
use chrono::Utc;

use crate::{AuthError, Session, validate_token};

/// Contract required from the remote authentication API.
///
/// Implementations own the transport. Failures carry the service-reported
/// message, which the session guard surfaces unmodified.
#[async_trait]
pub trait AuthService: Send + Sync + 'static {
    async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn register(
        &self,
        name: &str,
        lastname: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError>;

    async fn logout(&self, session: &Session) -> Result<(), AuthError>;

    /// Synchronous validity check. Defaults to the token's own validity window.
    fn is_token_valid(&self, session: &Session) -> bool {
        validate_token(&session.token, Utc::now()).is_ok()
    }
}
