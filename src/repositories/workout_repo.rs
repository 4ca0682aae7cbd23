use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{FromSqliteRow, Workout, WorkoutChanges};

/// Workouts recorded inside a user's sessions.
///
/// Writes check ownership of the session and the exercise inside the same
/// `IMMEDIATE` transaction as the write, so a concurrent request cannot slip
/// in between the check and the change.
#[derive(Clone)]
pub struct WorkoutRepository {
    pool: DbPool,
}

fn session_not_found(session_id: &str) -> AppError {
    AppError::NotFound(format!("Session {} not found.", session_id))
}

fn exercise_not_found(exercise_id: &str) -> AppError {
    AppError::NotFound(format!("Exercise {} not found.", exercise_id))
}

fn owns_session(conn: &Connection, user_id: &str, session_id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM sessions WHERE id = ? AND user_id = ?",
        [session_id, user_id],
        |row| row.get(0),
    )
}

fn owns_exercise(conn: &Connection, user_id: &str, exercise_id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM exercises WHERE id = ? AND user_id = ?",
        [exercise_id, user_id],
        |row| row.get(0),
    )
}

fn find_in(
    conn: &Connection,
    user_id: &str,
    session_id: &str,
    id: &str,
) -> rusqlite::Result<Option<Workout>> {
    conn.query_row(
        "SELECT w.* FROM workouts w
         JOIN sessions s ON w.session_id = s.id
         WHERE w.id = ? AND w.session_id = ? AND s.user_id = ?",
        [id, session_id, user_id],
        Workout::from_row,
    )
    .optional()
}

impl WorkoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append a workout to a session of the user. The exercise must be one of
    /// the user's own.
    pub async fn create(
        &self,
        user_id: &str,
        session_id: &str,
        exercise_id: &str,
        content: &str,
    ) -> Result<Workout> {
        let workout = Workout {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            exercise_id: exercise_id.to_string(),
            content: content.to_string(),
        };
        let workout_clone = workout.clone();

        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut conn = pool.get()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            if !owns_session(&tx, &user_id, &workout_clone.session_id)? {
                return Err(session_not_found(&workout_clone.session_id));
            }
            if !owns_exercise(&tx, &user_id, &workout_clone.exercise_id)? {
                return Err(exercise_not_found(&workout_clone.exercise_id));
            }
            tx.execute(
                "INSERT INTO workouts (id, session_id, exercise_id, content, created_at)
                 VALUES (?, ?, ?, ?, ?)",
                rusqlite::params![
                    workout_clone.id,
                    workout_clone.session_id,
                    workout_clone.exercise_id,
                    workout_clone.content,
                    Utc::now()
                ],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(workout)
    }

    pub async fn find(&self, user_id: &str, session_id: &str, id: &str) -> Result<Option<Workout>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let session_id = session_id.to_string();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            Ok(find_in(&conn, &user_id, &session_id, &id)?)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Replace the given fields of a workout. A new exercise reference must
    /// belong to the user.
    pub async fn update(
        &self,
        user_id: &str,
        session_id: &str,
        id: &str,
        changes: WorkoutChanges,
    ) -> Result<Workout> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let session_id = session_id.to_string();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            if !owns_session(&tx, &user_id, &session_id)? {
                return Err(session_not_found(&session_id));
            }
            if let Some(exercise_id) = &changes.exercise_id {
                if !owns_exercise(&tx, &user_id, exercise_id)? {
                    return Err(exercise_not_found(exercise_id));
                }
            }
            let rows = tx.execute(
                "UPDATE workouts SET
                    exercise_id = COALESCE(?, exercise_id),
                    content = COALESCE(?, content)
                 WHERE id = ? AND session_id = ?",
                rusqlite::params![changes.exercise_id, changes.content, id, session_id],
            )?;
            if rows == 0 {
                return Err(AppError::NotFound(format!("Workout {} not found.", id)));
            }
            let workout = find_in(&tx, &user_id, &session_id, &id)?
                .ok_or_else(|| AppError::Internal("updated workout vanished".to_string()))?;
            tx.commit()?;
            Ok(workout)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn delete(&self, user_id: &str, session_id: &str, id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let session_id = session_id.to_string();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM workouts
                 WHERE id = ? AND session_id IN (SELECT id FROM sessions WHERE id = ? AND user_id = ?)",
                rusqlite::params![id, session_id, user_id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::migrations::run_migrations_for_tests;

    fn setup_test_db() -> DbPool {
        let pool = create_memory_pool().expect("Failed to create test database");
        run_migrations_for_tests(&pool).expect("Failed to run migrations");
        let conn = pool.get().unwrap();
        conn.execute_batch(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES ('user1', 'alice', 'hash', datetime('now'));
             INSERT INTO users (id, username, password_hash, created_at) VALUES ('user2', 'bob', 'hash', datetime('now'));
             INSERT INTO exercises (id, user_id, name, created_at) VALUES ('squat', 'user1', 'Squat', datetime('now'));
             INSERT INTO exercises (id, user_id, name, created_at) VALUES ('bench', 'user1', 'Bench', datetime('now'));
             INSERT INTO exercises (id, user_id, name, created_at) VALUES ('row', 'user2', 'Row', datetime('now'));
             INSERT INTO sessions (id, user_id, name, date, location, created_at)
                 VALUES ('s1', 'user1', 'Legs', '2021-07-01', '', datetime('now'));",
        )
        .unwrap();
        drop(conn);
        pool
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = WorkoutRepository::new(setup_test_db());

        let created = repo.create("user1", "s1", "squat", "100x5;110x3").await.unwrap();
        let found = repo.find("user1", "s1", &created.id).await.unwrap().unwrap();

        assert_eq!(found, created);
        assert_eq!(found.content, "100x5;110x3");
    }

    #[tokio::test]
    async fn test_create_in_unknown_session() {
        let repo = WorkoutRepository::new(setup_test_db());

        let result = repo.create("user1", "nope", "squat", "").await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("Session")));
    }

    #[tokio::test]
    async fn test_create_in_other_users_session() {
        let repo = WorkoutRepository::new(setup_test_db());

        let result = repo.create("user2", "s1", "row", "").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_with_other_users_exercise() {
        let repo = WorkoutRepository::new(setup_test_db());

        let result = repo.create("user1", "s1", "row", "").await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("Exercise")));
    }

    #[tokio::test]
    async fn test_update_fields() {
        let repo = WorkoutRepository::new(setup_test_db());
        let created = repo.create("user1", "s1", "squat", "100x5").await.unwrap();

        let changes = WorkoutChanges {
            content: Some("105x5".to_string()),
            ..Default::default()
        };
        let updated = repo.update("user1", "s1", &created.id, changes).await.unwrap();
        assert_eq!(updated.exercise_id, "squat");
        assert_eq!(updated.content, "105x5");

        let changes = WorkoutChanges {
            exercise_id: Some("bench".to_string()),
            ..Default::default()
        };
        let updated = repo.update("user1", "s1", &created.id, changes).await.unwrap();
        assert_eq!(updated.exercise_id, "bench");
        assert_eq!(updated.content, "105x5");
    }

    #[tokio::test]
    async fn test_update_unknown_workout() {
        let repo = WorkoutRepository::new(setup_test_db());

        let changes = WorkoutChanges {
            content: Some("1x1".to_string()),
            ..Default::default()
        };
        let result = repo.update("user1", "s1", "missing", changes).await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("Workout")));
    }

    #[tokio::test]
    async fn test_update_to_foreign_exercise_rejected() {
        let repo = WorkoutRepository::new(setup_test_db());
        let created = repo.create("user1", "s1", "squat", "100x5").await.unwrap();

        let changes = WorkoutChanges {
            exercise_id: Some("row".to_string()),
            ..Default::default()
        };
        let result = repo.update("user1", "s1", &created.id, changes).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        let found = repo.find("user1", "s1", &created.id).await.unwrap().unwrap();
        assert_eq!(found.exercise_id, "squat");
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = WorkoutRepository::new(setup_test_db());
        let created = repo.create("user1", "s1", "squat", "").await.unwrap();

        assert!(!repo.delete("user2", "s1", &created.id).await.unwrap());
        assert!(repo.delete("user1", "s1", &created.id).await.unwrap());
        assert!(!repo.delete("user1", "s1", &created.id).await.unwrap());
        assert!(repo.find("user1", "s1", &created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_creates_in_one_session_both_persist() {
        let repo = WorkoutRepository::new(setup_test_db());

        let (first, second) = tokio::join!(
            repo.create("user1", "s1", "squat", "100x5"),
            repo.create("user1", "s1", "bench", "60x8"),
        );
        let first = first.unwrap();
        let second = second.unwrap();

        assert!(repo.find("user1", "s1", &first.id).await.unwrap().is_some());
        assert!(repo.find("user1", "s1", &second.id).await.unwrap().is_some());
    }
}
