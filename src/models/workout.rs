use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    #[serde(skip)]
    pub session_id: String,
    pub exercise_id: String,
    pub content: String,
}

impl FromSqliteRow for Workout {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            session_id: row.get("session_id")?,
            exercise_id: row.get("exercise_id")?,
            content: row.get("content")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkout {
    pub exercise_id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkout {
    pub exercise_id: Option<String>,
    pub content: Option<String>,
}

/// Validated field replacements for a workout; `None` keeps the stored value.
#[derive(Debug, Default, Clone)]
pub struct WorkoutChanges {
    pub exercise_id: Option<String>,
    pub content: Option<String>,
}

impl WorkoutChanges {
    pub fn is_empty(&self) -> bool {
        self.exercise_id.is_none() && self.content.is_none()
    }
}
