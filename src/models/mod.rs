pub mod date_format;
pub mod exercise;
pub mod session;
pub mod user;
pub mod workout;

use rusqlite::Row;

pub use exercise::{Exercise, ExerciseName};
pub use session::{CreateSession, Session, SessionChanges, UpdateSession};
pub use user::{Credentials, User};
pub use workout::{CreateWorkout, UpdateWorkout, Workout, WorkoutChanges};

/// Build a model from a row selected with the table's column names.
pub trait FromSqliteRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}
