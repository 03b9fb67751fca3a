//! Route access decisions for protected and public-only views.

use crate::SessionState;

/// Redirect targets known to the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
        }
    }
}

/// Access rule attached to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Requires an authenticated session (catalog screens, dashboard).
    Protected,
    /// Only for visitors without a session (login, signup).
    PublicOnly,
}

/// What the router should do with a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session state is still being restored; render a neutral waiting state.
    Wait,
    Render,
    Redirect(Route),
}

pub fn decide(access: RouteAccess, state: &SessionState) -> RouteDecision {
    if state.loading {
        return RouteDecision::Wait;
    }
    match (access, state.is_authenticated()) {
        (RouteAccess::Protected, true) | (RouteAccess::PublicOnly, false) => RouteDecision::Render,
        (RouteAccess::Protected, false) => RouteDecision::Redirect(Route::Login),
        (RouteAccess::PublicOnly, true) => RouteDecision::Redirect(Route::Dashboard),
    }
}
