use crate::model::schema::users;
use crate::model::{text_column_enum, UnknownVariant};
use chrono::{DateTime, Utc};
use diesel::expression::AsExpression;
use diesel::sql_types::Text;
use diesel::{FromSqlRow, Insertable, Queryable, Selectable};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationError};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Admin
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

text_column_enum!(Role);

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

lazy_static! {
    static ref USER_NAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginUserSchema {
    #[validate(custom(function = "not_blank", message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserSchema {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        regex(
            path = "USER_NAME_RE",
            message = "Username may only contain letters, numbers, hyphens and underscores"
        )
    )]
    pub username: String,
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(
    function = "new_password_differs",
    skip_on_field_errors = false,
    message = "New password must be different from the current one"
))]
pub struct ChangePasswordSchema {
    #[serde(rename = "currentPassword")]
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[serde(rename = "newPassword")]
    #[validate(length(min = 6, message = "New password must be at least 6 characters long"))]
    pub new_password: String,
}

fn new_password_differs(schema: &ChangePasswordSchema) -> Result<(), ValidationError> {
    if schema.current_password == schema.new_password {
        return Err(ValidationError::new("password_unchanged"));
    }
    Ok(())
}
