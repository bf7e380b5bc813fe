use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

/// Catalog entry. The service only reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_weight: bool,
    pub is_duration: bool,
}

impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            is_weight: row.get("is_weight")?,
            is_duration: row.get("is_duration")?,
        })
    }
}
