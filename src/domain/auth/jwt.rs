use crate::domain::access::{Role, User};
use crate::error::{AppError, AppResult};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by the backend's access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
}

fn default_role() -> Role {
    Role::Student
}

impl From<Claims> for User {
    fn from(claims: Claims) -> Self {
        User {
            id: claims.user_id,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Reads access-token claims on the client side.
///
/// The signature is not checked: the backend re-validates every token it
/// receives, and the client only needs the claims to decide what to show.
/// Expiry is still enforced so a stale token reads as signed out.
pub struct ClaimsReader {
    validation: Validation,
}

impl ClaimsReader {
    pub fn new() -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = true;
        Self { validation }
    }

    pub fn read(&self, token: &str) -> AppResult<Claims> {
        let claims = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        match claims.token_type.as_deref() {
            None | Some("access") => Ok(claims),
            Some(other) => Err(AppError::Unauthorized(format!(
                "Expected an access token, got {}",
                other
            ))),
        }
    }
}

impl Default for ClaimsReader {
    fn default() -> Self {
        Self::new()
    }
}
