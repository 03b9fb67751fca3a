//! `golden-auth`: client-side session boundary.
//!
//! Owns the current session, enforces token validity before mutating actions
//! and while protected views are mounted, and decides route access. The
//! remote authentication API is reached only through [`AuthService`].

pub mod credentials;
pub mod error;
pub mod guard;
pub mod in_memory;
pub mod route;
pub mod service;
pub mod session;
pub mod token;
pub mod watchdog;

pub use credentials::{LoginForm, SignupForm};
pub use error::AuthError;
pub use guard::{SessionGuard, SessionPhase, SessionState};
pub use in_memory::InMemoryAuthService;
pub use route::{Route, RouteAccess, RouteDecision};
pub use service::AuthService;
pub use session::{Session, SessionToken, UserProfile};
pub use token::{TokenValidationError, validate_token};
pub use watchdog::{ProtectedViewMount, WatchdogConfig};
