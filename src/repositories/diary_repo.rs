use chrono::Utc;
use rusqlite::OptionalExtension;

use crate::db::DbPool;
use crate::error::{is_unique_violation, AppError, Result};
use crate::models::{Diary, FromSqliteRow};

#[derive(Clone)]
pub struct DiaryRepository {
    pool: DbPool,
}

impl DiaryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Diary>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM diaries WHERE id = ?")?;
            let result = stmt.query_row([id], Diary::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_trainer(&self, trainer_id: i64) -> Result<Option<Diary>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM diaries WHERE trainer_id = ?")?;
            let result = stmt.query_row([trainer_id], Diary::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_client(&self, client_id: i64) -> Result<Option<Diary>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM diaries WHERE client_id = ?")?;
            let result = stmt.query_row([client_id], Diary::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Inserts a diary with no client. The UNIQUE constraint on `trainer_id`
    /// turns a second diary for the same trainer into Conflict.
    pub async fn create(&self, trainer_id: i64, name: &str) -> Result<Diary> {
        let mut diary = Diary {
            id: 0,
            name: name.to_string(),
            trainer_id,
            client_id: None,
            created_at: Utc::now(),
        };

        let pool = self.pool.clone();
        let row = diary.clone();
        diary.id = tokio::task::spawn_blocking(move || -> Result<i64> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO diaries (name, trainer_id, client_id, created_at) VALUES (?, ?, NULL, ?)",
                rusqlite::params![row.name, row.trainer_id, row.created_at],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("You already have a diary".to_string())
                } else {
                    AppError::from(e)
                }
            })?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(diary)
    }

    /// Claims the client slot of a diary.
    ///
    /// Returns `Ok(None)` when the slot is already occupied; the guarded
    /// UPDATE makes that check and the write a single statement. A client
    /// who already belongs to another diary trips the UNIQUE constraint on
    /// `client_id` and gets Conflict.
    pub async fn set_client(&self, diary_id: i64, client_id: i64) -> Result<Option<Diary>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn
                .execute(
                    "UPDATE diaries SET client_id = ? WHERE id = ? AND client_id IS NULL",
                    rusqlite::params![client_id, diary_id],
                )
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        AppError::Conflict("You already belong to a diary".to_string())
                    } else {
                        AppError::from(e)
                    }
                })?;
            if rows == 0 {
                return Ok(None);
            }
            let diary = conn.query_row(
                "SELECT * FROM diaries WHERE id = ?",
                [diary_id],
                Diary::from_row,
            )?;
            Ok(Some(diary))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Deletes a diary; its trainings and their exercises go with it.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute("DELETE FROM diaries WHERE id = ?", [id])?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
