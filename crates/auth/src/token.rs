use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::SessionToken;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token is empty")]
    Empty,

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate a session token against `now`.
///
/// Note: this checks the validity window only. Whether the server still
/// honours the token is up to the [`AuthService`](crate::AuthService).
pub fn validate_token(
    token: &SessionToken,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if token.value.trim().is_empty() {
        return Err(TokenValidationError::Empty);
    }
    if token.expires_at <= token.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < token.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= token.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(issued_at: DateTime<Utc>, ttl: Duration) -> SessionToken {
        SessionToken {
            value: "t".to_string(),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    #[test]
    fn accepts_token_inside_window() {
        let now = Utc::now();
        assert_eq!(validate_token(&token(now, Duration::minutes(10)), now), Ok(()));
    }

    #[test]
    fn rejects_expired_token() {
        let issued = Utc::now() - Duration::hours(2);
        let t = token(issued, Duration::hours(1));
        assert_eq!(validate_token(&t, Utc::now()), Err(TokenValidationError::Expired));
    }

    #[test]
    fn expiry_instant_is_exclusive() {
        let now = Utc::now();
        let t = token(now - Duration::minutes(5), Duration::minutes(5));
        assert_eq!(validate_token(&t, now), Err(TokenValidationError::Expired));
    }

    #[test]
    fn rejects_future_and_inverted_windows() {
        let now = Utc::now();
        let future = token(now + Duration::minutes(1), Duration::minutes(5));
        assert_eq!(validate_token(&future, now), Err(TokenValidationError::NotYetValid));

        let inverted = token(now, Duration::minutes(-1));
        assert_eq!(validate_token(&inverted, now), Err(TokenValidationError::InvalidTimeWindow));
    }

    #[test]
    fn rejects_blank_token() {
        let now = Utc::now();
        let mut t = token(now, Duration::minutes(5));
        t.value = " ".to_string();
        assert_eq!(validate_token(&t, now), Err(TokenValidationError::Empty));
    }
}
