use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::history::HistoryEntry;
use crate::models::{FromSqliteRow, Session, SessionChanges, Workout};

/// Workout sessions of a user, each carrying its workouts.
#[derive(Clone)]
pub struct SessionRepository {
    pool: DbPool,
}

/// Fill in the workouts of each session, in insertion order.
fn attach_workouts(conn: &Connection, sessions: &mut [Session]) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("SELECT * FROM workouts WHERE session_id = ? ORDER BY rowid")?;
    for session in sessions.iter_mut() {
        session.workouts = stmt
            .query_map([&session.id], Workout::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
    }
    Ok(())
}

fn find_in(conn: &Connection, user_id: &str, id: &str) -> rusqlite::Result<Option<Session>> {
    let session = conn
        .query_row(
            "SELECT * FROM sessions WHERE id = ? AND user_id = ?",
            [id, user_id],
            Session::from_row,
        )
        .optional()?;
    match session {
        Some(session) => {
            let mut sessions = [session];
            attach_workouts(conn, &mut sessions)?;
            let [session] = sessions;
            Ok(Some(session))
        }
        None => Ok(None),
    }
}

impl SessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: &str,
        name: &str,
        date: NaiveDate,
        location: &str,
    ) -> Result<Session> {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            date,
            location: location.to_string(),
            workouts: Vec::new(),
        };
        let session_clone = session.clone();

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO sessions (id, user_id, name, date, location, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    session_clone.id,
                    session_clone.user_id,
                    session_clone.name,
                    session_clone.date,
                    session_clone.location,
                    Utc::now()
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(session)
    }

    pub async fn find(&self, user_id: &str, id: &str) -> Result<Option<Session>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            Ok(find_in(&conn, &user_id, &id)?)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Newest first, skipping `start` sessions and returning at most `limit`.
    pub async fn find_paginated(&self, user_id: &str, start: u64, limit: u64) -> Result<Vec<Session>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        // SQLite takes signed 64-bit bounds.
        let start = i64::try_from(start).unwrap_or(i64::MAX);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM sessions WHERE user_id = ?
                 ORDER BY date DESC, rowid DESC
                 LIMIT ? OFFSET ?",
            )?;
            let mut sessions = stmt
                .query_map(rusqlite::params![user_id, limit, start], Session::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            attach_workouts(&conn, &mut sessions)?;
            Ok(sessions)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Sessions dated within `[start_date, end_date]`, oldest first.
    pub async fn find_in_range(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Session>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM sessions WHERE user_id = ? AND date BETWEEN ? AND ?
                 ORDER BY date ASC, rowid ASC",
            )?;
            let mut sessions = stmt
                .query_map(
                    rusqlite::params![user_id, start_date, end_date],
                    Session::from_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            attach_workouts(&conn, &mut sessions)?;
            Ok(sessions)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Replace the given fields in one statement. Returns `None` when the
    /// session does not belong to the user.
    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        changes: SessionChanges,
    ) -> Result<Option<Session>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let rows = tx.execute(
                "UPDATE sessions SET
                    name = COALESCE(?, name),
                    date = COALESCE(?, date),
                    location = COALESCE(?, location)
                 WHERE id = ? AND user_id = ?",
                rusqlite::params![changes.name, changes.date, changes.location, id, user_id],
            )?;
            if rows == 0 {
                return Ok(None);
            }
            let session = find_in(&tx, &user_id, &id)?;
            tx.commit()?;
            Ok(session)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Delete a session together with its workouts.
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM sessions WHERE id = ? AND user_id = ?",
                rusqlite::params![id, user_id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Every workout of one exercise with its session, newest session first.
    pub async fn exercise_history(&self, user_id: &str, exercise_id: &str) -> Result<Vec<HistoryEntry>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let exercise_id = exercise_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT s.id AS sid, s.name, s.date, s.location,
                        w.id, w.session_id, w.exercise_id, w.content
                 FROM workouts w
                 JOIN sessions s ON w.session_id = s.id
                 WHERE s.user_id = ? AND w.exercise_id = ?
                 ORDER BY s.date DESC, s.rowid DESC, w.rowid ASC",
            )?;
            let entries = stmt
                .query_map([&user_id, &exercise_id], |row| {
                    Ok(HistoryEntry {
                        session_id: row.get("sid")?,
                        name: row.get("name")?,
                        date: row.get("date")?,
                        location: row.get("location")?,
                        workout: Workout::from_row(row)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
