use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

pub const DEFAULT_DIARY_NAME: &str = "My diary";

/// Pairing of one trainer with at most one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diary {
    pub id: i64,
    pub name: String,
    pub trainer_id: i64,
    pub client_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for Diary {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            trainer_id: row.get("trainer_id")?,
            client_id: row.get("client_id")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct JoinDiary {
    pub diary_id: i64,
}
