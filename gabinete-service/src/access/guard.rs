//! Route guard decision table.
//!
//! Each navigation is evaluated from scratch; the guard keeps no state.

use serde::Serialize;

use crate::models::Role;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Authentication status as reported by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// The provider has not finished resolving the session.
    Loading,
    Anonymous,
    Authenticated(Role),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Render a wait indicator and nothing else.
    Loading,
    /// Send the caller to the login entry point; `return_to` is the
    /// originally requested location.
    RedirectToLogin { return_to: String },
    RedirectToDashboard,
    Allow,
}

impl GuardDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardDecision::Loading => "loading",
            GuardDecision::RedirectToLogin { .. } => "redirect_login",
            GuardDecision::RedirectToDashboard => "redirect_dashboard",
            GuardDecision::Allow => "allow",
        }
    }

    /// Redirect target, if the decision is a redirect.
    pub fn location(&self) -> Option<String> {
        match self {
            GuardDecision::RedirectToLogin { return_to } => Some(login_url(return_to)),
            GuardDecision::RedirectToDashboard => Some(DASHBOARD_PATH.to_string()),
            GuardDecision::Loading | GuardDecision::Allow => None,
        }
    }
}

/// `/login?redirect=<location>` so login can send the user back.
pub fn login_url(return_to: &str) -> String {
    format!("{}?redirect={}", LOGIN_PATH, urlencoding::encode(return_to))
}

/// Requirements attached to a protected view tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteGuard {
    pub require_auth: bool,
    pub required_roles: Vec<Role>,
}

impl RouteGuard {
    pub fn public() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        Self {
            require_auth: true,
            required_roles: Vec::new(),
        }
    }

    /// Only callers holding one of `roles`. Implies authentication.
    pub fn roles(roles: &[Role]) -> Self {
        Self {
            require_auth: true,
            required_roles: roles.to_vec(),
        }
    }

    pub fn evaluate(&self, status: AuthStatus, location: &str) -> GuardDecision {
        match status {
            AuthStatus::Loading => GuardDecision::Loading,
            AuthStatus::Anonymous if self.require_auth || !self.required_roles.is_empty() => {
                GuardDecision::RedirectToLogin {
                    return_to: location.to_string(),
                }
            }
            AuthStatus::Anonymous => GuardDecision::Allow,
            AuthStatus::Authenticated(role) => {
                if !self.required_roles.is_empty() && !self.required_roles.contains(&role) {
                    GuardDecision::RedirectToDashboard
                } else {
                    GuardDecision::Allow
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_wins_over_everything() {
        let guards = [
            RouteGuard::public(),
            RouteGuard::authenticated(),
            RouteGuard::roles(&[Role::Admin]),
        ];
        for guard in guards {
            assert_eq!(
                guard.evaluate(AuthStatus::Loading, "/users"),
                GuardDecision::Loading
            );
        }
    }

    #[test]
    fn test_anonymous_redirects_to_login_preserving_path() {
        let decision = RouteGuard::authenticated().evaluate(AuthStatus::Anonymous, "/people?page=2");
        assert_eq!(
            decision,
            GuardDecision::RedirectToLogin {
                return_to: "/people?page=2".to_string()
            }
        );
        assert_eq!(
            decision.location().unwrap(),
            "/login?redirect=%2Fpeople%3Fpage%3D2"
        );
    }

    #[test]
    fn test_wrong_role_redirects_to_dashboard() {
        let decision = RouteGuard::roles(&[Role::Admin])
            .evaluate(AuthStatus::Authenticated(Role::Assessor), "/maintenance");
        assert_eq!(decision, GuardDecision::RedirectToDashboard);
        assert_eq!(decision.location().unwrap(), DASHBOARD_PATH);
    }

    #[test]
    fn test_matching_role_is_allowed() {
        let guard = RouteGuard::roles(&[Role::Admin, Role::ChefeGabinete]);
        assert_eq!(
            guard.evaluate(AuthStatus::Authenticated(Role::ChefeGabinete), "/users"),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_authenticated_without_role_requirement_is_allowed() {
        for role in Role::ALL {
            assert_eq!(
                RouteGuard::authenticated().evaluate(AuthStatus::Authenticated(role), "/"),
                GuardDecision::Allow
            );
        }
    }

    #[test]
    fn test_public_route_allows_anonymous() {
        assert_eq!(
            RouteGuard::public().evaluate(AuthStatus::Anonymous, "/maintenance"),
            GuardDecision::Allow
        );
    }
}
