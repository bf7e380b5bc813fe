use chrono::{DateTime, Utc};
use rusqlite::{types::Type, Row};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::FromSqliteRow;

/// The two kinds of account. A role is fixed when the user registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Client,
    Trainer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Client => "client",
            UserRole::Trainer => "trainer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "client" => Some(UserRole::Client),
            "trainer" => Some(UserRole::Trainer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub second_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let role_str: String = row.get("role")?;
        let role = UserRole::parse(&role_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                Type::Text,
                format!("unknown role: {}", role_str).into(),
            )
        })?;
        Ok(Self {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            second_name: row.get("second_name")?,
            email: row.get("email")?,
            password_hash: row.get("password_hash")?,
            role,
            created_at: row.get("created_at")?,
        })
    }
}

/// Public view of a user; never carries the credential hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserOut {
    pub id: i64,
    pub first_name: String,
    pub second_name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            second_name: user.second_name,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub second_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
