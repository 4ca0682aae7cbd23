use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, Serialize)]
pub struct Exercise {
    pub id: String,
    #[serde(skip)]
    pub user_id: String,
    pub name: String,
}

impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
        })
    }
}

/// Body of exercise create and rename requests.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseName {
    pub exercise_name: Option<String>,
}

impl ExerciseName {
    pub fn trimmed(&self) -> Option<&str> {
        self.exercise_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
