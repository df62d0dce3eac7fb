use crate::model::user::{Role, User};
use serde::{Deserialize, Serialize};

/// The caller identity carried inside a session token and attached to each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Identity {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(flatten)]
    pub identity: Identity,
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug)]
pub struct TokenDetails {
    pub token: String,
    pub token_uuid: uuid::Uuid,
    pub expires_at: i64,
}
