use chrono::Utc;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{is_constraint_violation, AppError, Result};
use crate::models::{Exercise, FromSqliteRow};

#[derive(Clone)]
pub struct ExerciseRepository {
    pool: DbPool,
}

fn duplicate_name(name: &str) -> AppError {
    AppError::Conflict(format!("Exercise {} already exist.", name))
}

impl ExerciseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// The exercise, if it exists and belongs to `user_id`.
    pub async fn find_for_user(&self, id: &str, user_id: &str) -> Result<Option<Exercise>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM exercises WHERE id = ? AND user_id = ?")?;
            let result = stmt
                .query_row([&id, &user_id], Exercise::from_row)
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// All exercises of a user in the order they were added.
    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<Exercise>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt =
                conn.prepare("SELECT * FROM exercises WHERE user_id = ? ORDER BY rowid")?;
            let exercises = stmt
                .query_map([&user_id], Exercise::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(exercises)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn create(&self, user_id: &str, name: &str) -> Result<Exercise> {
        let exercise = Exercise {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
        };
        let exercise_clone = exercise.clone();

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO exercises (id, user_id, name, created_at) VALUES (?, ?, ?, ?)",
                rusqlite::params![
                    exercise_clone.id,
                    exercise_clone.user_id,
                    exercise_clone.name,
                    Utc::now()
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    duplicate_name(&exercise_clone.name)
                } else {
                    e.into()
                }
            })?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(exercise)
    }

    /// Rename an exercise. Returns `None` when it does not belong to the user.
    pub async fn rename(&self, id: &str, user_id: &str, name: &str) -> Result<Option<Exercise>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.to_string();
        let name = name.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt =
                conn.prepare("UPDATE exercises SET name = ? WHERE id = ? AND user_id = ? RETURNING *")?;
            stmt.query_row([&name, &id, &user_id], Exercise::from_row)
                .optional()
                .map_err(|e| {
                    if is_constraint_violation(&e) {
                        duplicate_name(&name)
                    } else {
                        e.into()
                    }
                })
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Delete an exercise. Returns `false` when it does not belong to the user;
    /// an exercise still referenced by workouts is a conflict.
    pub async fn delete(&self, id: &str, user_id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn
                .execute(
                    "DELETE FROM exercises WHERE id = ? AND user_id = ?",
                    rusqlite::params![id, user_id],
                )
                .map_err(|e| {
                    if is_constraint_violation(&e) {
                        AppError::Conflict(
                            "Exercise is still used by recorded workouts.".to_string(),
                        )
                    } else {
                        e.into()
                    }
                })?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
