use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role. Variants are declared in rank order so the derived `Ord`
/// is the authorization order: every role satisfies the roles below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "user")]
    Student,
    Editor,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Editor, Role::Admin];

    pub fn rank(self) -> u8 {
        match self {
            Role::Student => 1,
            Role::Editor => 2,
            Role::Admin => 3,
        }
    }

    /// Whether this role meets a requirement of `required`.
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }

    /// Named feature permissions granted by the role.
    pub fn has_permission(self, permission: &str) -> bool {
        match self {
            Role::Admin => true,
            Role::Editor => matches!(
                permission,
                "code_execution" | "ai_analysis" | "view_profile" | "advanced_features"
            ),
            Role::Student => matches!(permission, "code_execution" | "ai_analysis" | "view_profile"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized role: {0:?}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" | "user" => Ok(Role::Student),
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// Signed-in identity as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

/// Decide whether `user` may see something that requires `required`.
///
/// No requirement always passes. A requirement with no user never passes;
/// callers are expected to have handled the signed-out case already.
pub fn is_authorized(required: Option<Role>, user: Option<&User>) -> bool {
    match (required, user) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(required), Some(user)) => user.role.satisfies(required),
    }
}
