use chrono::NaiveDate;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{date_format, FromSqliteRow, Workout};

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    #[serde(skip)]
    pub user_id: String,
    pub name: String,
    #[serde(serialize_with = "date_format::serialize")]
    pub date: NaiveDate,
    pub location: String,
    pub workouts: Vec<Workout>,
}

impl FromSqliteRow for Session {
    // Workouts live in their own table; repositories attach them afterwards.
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            date: row.get("date")?,
            location: row.get("location")?,
            workouts: Vec::new(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSession {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSession {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
}

/// Validated field replacements for a session; `None` keeps the stored value.
#[derive(Debug, Default, Clone)]
pub struct SessionChanges {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
}

impl SessionChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.date.is_none() && self.location.is_none()
    }
}
