pub mod guard;
pub mod policy;

pub use guard::{AuthStatus, GuardDecision, RouteGuard};
pub use policy::{is_authorized, ParseRoleError, Role, User};
