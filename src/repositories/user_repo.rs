use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rusqlite::OptionalExtension;

use crate::db::DbPool;
use crate::error::{is_unique_violation, AppError, Result};
use crate::models::{FromSqliteRow, RegisterUser, User};

#[derive(Clone)]
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?")?;
            let result = stmt.query_row([id], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let email = normalize_email(email);
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM users WHERE email = ?")?;
            let result = stmt.query_row([&email], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Inserts a new account. A taken email is reported as Conflict by the
    /// UNIQUE constraint, so concurrent registrations cannot both win.
    ///
    /// Hashing runs on the blocking pool together with the insert.
    pub async fn create(&self, input: &RegisterUser) -> Result<User> {
        let pool = self.pool.clone();
        let password = input.password.clone();
        let mut row = User {
            id: 0,
            first_name: input.first_name.trim().to_string(),
            second_name: input.second_name.trim().to_string(),
            email: normalize_email(&input.email),
            password_hash: String::new(),
            role: input.role,
            created_at: Utc::now(),
        };

        tokio::task::spawn_blocking(move || -> Result<User> {
            row.password_hash = hash_password(&password)?;
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO users (first_name, second_name, email, password_hash, role, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    row.first_name,
                    row.second_name,
                    row.email,
                    row.password_hash,
                    row.role.as_str(),
                    row.created_at
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Email already registered".to_string())
                } else {
                    AppError::from(e)
                }
            })?;
            row.id = conn.last_insert_rowid();
            Ok(row)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Returns the user only when the email exists and the password matches.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };

        let password = password.to_string();
        tokio::task::spawn_blocking(move || {
            if verify_password(&password, &user.password_hash)? {
                Ok(Some(user))
            } else {
                Ok(None)
            }
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AppError::PasswordHash)?
        .to_string();
    Ok(password_hash)
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AppError::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
