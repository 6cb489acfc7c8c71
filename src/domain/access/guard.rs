use super::policy::{is_authorized, ParseRoleError, Role, User};

/// Authentication state as reported by the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// Session not resolved yet.
    Loading,
    Anonymous,
    /// The flag said "authenticated"; the user object may still be missing.
    Authenticated(Option<User>),
}

/// What a protected view should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show a neutral placeholder until the session resolves.
    Loading,
    /// Send the visitor to sign in, remembering where they were going.
    RedirectToLogin { from: String },
    /// Show an inline access-denied notice.
    AccessDenied { required: Role, actual: Role },
    Render,
}

/// Role gate for one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteGuard {
    required: Option<Role>,
}

impl RouteGuard {
    /// Gate that only asks for a signed-in user.
    pub fn authenticated() -> Self {
        Self { required: None }
    }

    pub fn requiring(role: Role) -> Self {
        Self {
            required: Some(role),
        }
    }

    /// Build from a route table entry. Unknown role names are a
    /// configuration error and are reported rather than allowed through.
    pub fn from_role_name(name: Option<&str>) -> Result<Self, ParseRoleError> {
        match name {
            None => Ok(Self::authenticated()),
            Some(name) => Ok(Self::requiring(name.parse()?)),
        }
    }

    pub fn required_role(&self) -> Option<Role> {
        self.required
    }

    pub fn evaluate(&self, status: &AuthStatus, location: &str) -> GuardDecision {
        let user = match status {
            AuthStatus::Loading => return GuardDecision::Loading,
            AuthStatus::Anonymous | AuthStatus::Authenticated(None) => {
                return GuardDecision::RedirectToLogin {
                    from: location.to_string(),
                }
            }
            AuthStatus::Authenticated(Some(user)) => user,
        };

        match self.required {
            Some(required) if !is_authorized(Some(required), Some(user)) => {
                tracing::info!(
                    user_id = user.id,
                    required_role = %required,
                    user_role = %user.role,
                    location = %location,
                    "Access denied by route guard"
                );
                GuardDecision::AccessDenied {
                    required,
                    actual: user.role,
                }
            }
            _ => GuardDecision::Render,
        }
    }
}
