use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::db::DbPool;
use crate::error::{is_unique_violation, AppError, Result};
use crate::models::{
    CreateTrainingExercise, FromSqliteRow, Training, TrainingDetail, TrainingExercise,
};

#[derive(Clone)]
pub struct TrainingRepository {
    pool: DbPool,
}

impl TrainingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Training>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM trainings WHERE id = ?")?;
            let result = stmt.query_row([id], Training::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_detail(&self, id: i64) -> Result<Option<TrainingDetail>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            load_detail(&conn, id)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Trainings of one diary, newest date first, ties broken by id.
    pub async fn find_by_diary(
        &self,
        diary_id: i64,
        date: Option<NaiveDate>,
    ) -> Result<Vec<TrainingDetail>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;

            let trainings = match date {
                Some(date) => {
                    let mut stmt = conn.prepare(
                        "SELECT * FROM trainings WHERE diary_id = ? AND date = ?
                         ORDER BY date DESC, id ASC",
                    )?;
                    let rows = stmt
                        .query_map(rusqlite::params![diary_id, date], Training::from_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT * FROM trainings WHERE diary_id = ? ORDER BY date DESC, id ASC",
                    )?;
                    let rows = stmt
                        .query_map([diary_id], Training::from_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
            };

            let mut stmt = conn.prepare(
                "SELECT te.* FROM training_exercises te
                 JOIN trainings t ON te.training_id = t.id
                 WHERE t.diary_id = ?
                 ORDER BY te.training_id, te.order_index, te.id",
            )?;
            let mut by_training: HashMap<i64, Vec<TrainingExercise>> = HashMap::new();
            for exercise in stmt.query_map([diary_id], TrainingExercise::from_row)? {
                let exercise = exercise?;
                by_training
                    .entry(exercise.training_id)
                    .or_default()
                    .push(exercise);
            }

            let details = trainings
                .into_iter()
                .map(|training| {
                    let exercises = by_training.remove(&training.id).unwrap_or_default();
                    TrainingDetail::new(training, exercises)
                })
                .collect();
            Ok(details)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Inserts a training and all of its exercises in one transaction.
    ///
    /// Either every row becomes visible or none does; a duplicate exercise
    /// within the list is rejected with Conflict and rolls the training back.
    pub async fn create_with_exercises(
        &self,
        diary_id: i64,
        name: &str,
        date: NaiveDate,
        exercises: &[CreateTrainingExercise],
    ) -> Result<TrainingDetail> {
        let pool = self.pool.clone();
        let name = name.to_string();
        let exercises = exercises.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO trainings (diary_id, name, date, start_at, end_at)
                 VALUES (?, ?, ?, NULL, NULL)",
                rusqlite::params![diary_id, name, date],
            )?;
            let training_id = tx.last_insert_rowid();

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO training_exercises
                        (training_id, exercise_id, order_index, sets_count, set_duration, weight)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )?;
                for ex in &exercises {
                    stmt.execute(rusqlite::params![
                        training_id,
                        ex.exercise_id,
                        ex.order_index,
                        ex.sets_count,
                        ex.set_duration,
                        ex.weight
                    ])
                    .map_err(|e| {
                        if is_unique_violation(&e) {
                            AppError::Conflict(format!(
                                "Exercise {} appears more than once",
                                ex.exercise_id
                            ))
                        } else {
                            AppError::from(e)
                        }
                    })?;
                }
            }

            let detail = load_detail(&tx, training_id)?
                .ok_or_else(|| AppError::Internal("training vanished mid-insert".to_string()))?;
            tx.commit()?;
            Ok(detail)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Sets `start_at` if the training has not been started yet.
    /// Returns false when another writer got there first.
    pub async fn mark_started(&self, id: i64, at: DateTime<Utc>) -> Result<bool> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE trainings SET start_at = ? WHERE id = ? AND start_at IS NULL",
                rusqlite::params![at, id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Sets `end_at` if the training is in progress.
    pub async fn mark_finished(&self, id: i64, at: DateTime<Utc>) -> Result<bool> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE trainings SET end_at = ?
                 WHERE id = ? AND start_at IS NOT NULL AND end_at IS NULL",
                rusqlite::params![at, id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute("DELETE FROM trainings WHERE id = ?", [id])?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn load_detail(conn: &Connection, id: i64) -> Result<Option<TrainingDetail>> {
    let training = conn
        .query_row(
            "SELECT * FROM trainings WHERE id = ?",
            [id],
            Training::from_row,
        )
        .optional()?;

    let Some(training) = training else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT * FROM training_exercises WHERE training_id = ? ORDER BY order_index, id",
    )?;
    let exercises = stmt
        .query_map([id], TrainingExercise::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Some(TrainingDetail::new(training, exercises)))
}
