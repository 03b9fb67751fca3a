use thiserror::Error;

/// Phrases the authentication API uses when an account already exists.
const DUPLICATE_ACCOUNT_MARKERS: [&str; 2] = ["email ya está registrado", "usuario ya existe"];

/// Failure of a login/register attempt.
///
/// Every variant carries the message to show the user. Messages coming from
/// the authentication API are kept verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The service rejected the credentials.
    #[error("{0}")]
    InvalidCredentials(String),

    /// Local or server-side validation of the submitted fields failed.
    #[error("{0}")]
    Validation(String),

    /// The account already exists; the caller should offer "go to login".
    #[error("{0}")]
    Conflict(String),

    /// The service could not be reached or failed unexpectedly.
    #[error("{0}")]
    Transport(String),
}

impl AuthError {
    pub fn message(&self) -> &str {
        match self {
            AuthError::InvalidCredentials(msg)
            | AuthError::Validation(msg)
            | AuthError::Conflict(msg)
            | AuthError::Transport(msg) => msg,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, AuthError::Conflict(_))
    }

    /// Replace a blank message with `fallback`, keeping the variant.
    pub fn or_fallback(self, fallback: &str) -> Self {
        if !self.message().trim().is_empty() {
            return self;
        }
        let fallback = fallback.to_string();
        match self {
            AuthError::InvalidCredentials(_) => AuthError::InvalidCredentials(fallback),
            AuthError::Validation(_) => AuthError::Validation(fallback),
            AuthError::Conflict(_) => AuthError::Conflict(fallback),
            AuthError::Transport(_) => AuthError::Transport(fallback),
        }
    }

    /// Classify a registration failure for services that only see message text.
    pub fn from_register_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        if DUPLICATE_ACCOUNT_MARKERS.iter().any(|m| lowered.contains(m)) {
            AuthError::Conflict(message)
        } else {
            AuthError::Validation(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_verbatim_message() {
        let err = AuthError::InvalidCredentials("Credenciales inválidas".to_string());
        assert_eq!(err.to_string(), "Credenciales inválidas");
        assert_eq!(err.message(), "Credenciales inválidas");
    }

    #[test]
    fn duplicate_account_text_is_a_conflict() {
        let err = AuthError::from_register_message("El email ya está registrado");
        assert!(err.is_conflict());
        assert_eq!(err.message(), "El email ya está registrado");

        let err = AuthError::from_register_message("El usuario ya existe en el sistema");
        assert!(err.is_conflict());
    }

    #[test]
    fn blank_message_takes_fallback_and_keeps_kind() {
        let err = AuthError::Conflict(" ".to_string()).or_fallback("Intenta nuevamente");
        assert_eq!(err, AuthError::Conflict("Intenta nuevamente".to_string()));
        assert!(err.is_conflict());

        let err = AuthError::Transport("sin conexión".to_string()).or_fallback("otro");
        assert_eq!(err.message(), "sin conexión");
    }

    #[test]
    fn other_register_text_is_validation() {
        let err = AuthError::from_register_message("La contraseña es muy corta");
        assert_eq!(err, AuthError::Validation("La contraseña es muy corta".to_string()));
    }
}
