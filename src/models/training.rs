use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::FromSqliteRow;

pub const DEFAULT_TRAINING_NAME: &str = "Training";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Training {
    pub id: i64,
    pub diary_id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

/// Lifecycle position derived from the two timestamps.
///
/// `Scheduled -> InProgress -> Finished`; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    Scheduled,
    InProgress,
    Finished,
}

impl Training {
    pub fn status(&self) -> TrainingStatus {
        match (self.start_at, self.end_at) {
            (None, _) => TrainingStatus::Scheduled,
            (Some(_), None) => TrainingStatus::InProgress,
            (Some(_), Some(_)) => TrainingStatus::Finished,
        }
    }
}

impl FromSqliteRow for Training {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            diary_id: row.get("diary_id")?,
            name: row.get("name")?,
            date: row.get("date")?,
            start_at: row.get("start_at")?,
            end_at: row.get("end_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExercise {
    pub id: i64,
    pub training_id: i64,
    pub exercise_id: i64,
    pub order_index: i32,
    pub sets_count: i32,
    pub set_duration: Option<i32>,
    pub weight: Option<f64>,
}

impl FromSqliteRow for TrainingExercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            training_id: row.get("training_id")?,
            exercise_id: row.get("exercise_id")?,
            order_index: row.get("order_index")?,
            sets_count: row.get("sets_count")?,
            set_duration: row.get("set_duration")?,
            weight: row.get("weight")?,
        })
    }
}

/// A training together with its exercises, ordered by `order_index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingDetail {
    #[serde(flatten)]
    pub training: Training,
    pub status: TrainingStatus,
    pub exercises: Vec<TrainingExercise>,
}

impl TrainingDetail {
    pub fn new(training: Training, mut exercises: Vec<TrainingExercise>) -> Self {
        exercises.sort_by_key(|e| (e.order_index, e.id));
        Self {
            status: training.status(),
            training,
            exercises,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTrainingExercise {
    pub exercise_id: i64,
    #[validate(range(min = 0))]
    pub order_index: i32,
    #[validate(range(min = 1))]
    pub sets_count: i32,
    #[validate(range(min = 0))]
    pub set_duration: Option<i32>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTraining {
    pub diary_id: i64,
    pub name: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    #[validate(nested)]
    pub exercises: Vec<CreateTrainingExercise>,
}

impl CreateTraining {
    pub fn resolved_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_TRAINING_NAME,
        }
    }
}
