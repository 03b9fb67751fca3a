//! Format prechecks for the login and signup forms, run before any service call.
//!
//! Only presence and basic shape are checked here; the authentication API
//! remains the judge of credentials and password policy.

use crate::AuthError;

pub const EMAIL_REQUIRED: &str = "El email es requerido";
pub const EMAIL_INVALID: &str = "Por favor ingresa un email válido";
pub const PASSWORD_REQUIRED: &str = "La contraseña es requerida";
pub const NAME_REQUIRED: &str = "El nombre es requerido";
pub const LASTNAME_REQUIRED: &str = "El apellido es requerido";
pub const PASSWORDS_DIFFER: &str = "Las contraseñas no coinciden";

/// Shown when the service fails without saying why.
pub const LOGIN_FAILED: &str = "Error al iniciar sesión. Intenta nuevamente.";
pub const SIGNUP_FAILED: &str = "Error al crear la cuenta. Intenta nuevamente.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), AuthError> {
        check_email(&self.email)?;
        if self.password.trim().is_empty() {
            return Err(AuthError::Validation(PASSWORD_REQUIRED.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.name.trim().is_empty() {
            return Err(AuthError::Validation(NAME_REQUIRED.to_string()));
        }
        if self.lastname.trim().is_empty() {
            return Err(AuthError::Validation(LASTNAME_REQUIRED.to_string()));
        }
        check_email(&self.email)?;
        if self.password.is_empty() {
            return Err(AuthError::Validation(PASSWORD_REQUIRED.to_string()));
        }
        if self.password != self.confirm_password {
            return Err(AuthError::Validation(PASSWORDS_DIFFER.to_string()));
        }
        Ok(())
    }
}

fn check_email(email: &str) -> Result<(), AuthError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::Validation(EMAIL_REQUIRED.to_string()));
    }
    if !email.contains('@') || !email.contains('.') {
        return Err(AuthError::Validation(EMAIL_INVALID.to_string()));
    }
    Ok(())
}
