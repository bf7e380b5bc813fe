use std::collections::HashSet;

use rusqlite::OptionalExtension;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{Exercise, FromSqliteRow};

/// SQLite's default ceiling on host parameters in one statement.
pub const MAX_BOUND_PARAMS: usize = 32766;

#[derive(Clone)]
pub struct ExerciseRepository {
    pool: DbPool,
}

impl ExerciseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Exercise>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM exercises WHERE id = ?")?;
            let result = stmt.query_row([id], Exercise::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_all(&self) -> Result<Vec<Exercise>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM exercises ORDER BY name, id")?;
            let exercises = stmt
                .query_map([], Exercise::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(exercises)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Returns the subset of `ids` that has a catalog entry.
    ///
    /// Large lists are looked up in batches so no statement binds more than
    /// [`MAX_BOUND_PARAMS`] values.
    pub async fn find_existing_ids(&self, ids: &[i64]) -> Result<HashSet<i64>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let pool = self.pool.clone();
        let ids = ids.to_vec();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut found: HashSet<i64> = HashSet::new();
            for chunk in ids.chunks(MAX_BOUND_PARAMS) {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                let sql = format!("SELECT id FROM exercises WHERE id IN ({})", placeholders);
                let mut stmt = conn.prepare(&sql)?;
                let rows =
                    stmt.query_map(rusqlite::params_from_iter(chunk.iter()), |row| row.get(0))?;
                for id in rows {
                    found.insert(id?);
                }
            }
            Ok(found)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
