use crate::model::user::{Role, User};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FilteredUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&User> for FilteredUser {
    fn from(user: &User) -> Self {
        FilteredUser {
            id: user.id,
            username: user.username.to_owned(),
            email: user.email.to_owned(),
            role: user.role,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: FilteredUser,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: &'static str,
    pub user: FilteredUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse<T: Serialize> {
    pub message: &'static str,
    #[serde(flatten)]
    pub created: T,
}

#[derive(Debug, Serialize)]
pub struct CreatedId<'a> {
    pub id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreatedGame {
    #[serde(rename = "gameId")]
    pub game_id: i32,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}
