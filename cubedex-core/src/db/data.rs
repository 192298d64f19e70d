use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// The type used for primary keys in the database
pub type PrimaryKey = i64;

/// Data of a registered user
#[derive(Debug, Clone, FromRow)]
pub struct UserData {
    pub id: PrimaryKey,
    pub username: String,
    /// The argon2 hash of the password, never the plaintext
    pub password: String,
}

/// Data of a login session
#[derive(Debug, Clone)]
pub struct SessionData {
    pub id: PrimaryKey,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// The user this session belongs to
    pub user: UserData,
}

/// Data of a single algorithm within a set
#[derive(Debug, Clone, FromRow)]
pub struct AlgorithmData {
    pub id: PrimaryKey,
    pub name: String,
    pub algorithm_set: String,
    pub notation: String,
    /// Raw image bytes as uploaded, if any
    pub image: Option<Vec<u8>>,
}

/// The mean rating of an algorithm, rounded to one decimal place
#[derive(Debug, Clone, Copy, FromRow)]
pub struct AverageRating {
    pub algorithm_id: PrimaryKey,
    pub average_rating: f64,
}

/// Data of a recorded solve time
#[derive(Debug, Clone, FromRow)]
pub struct TimeEntryData {
    pub id: PrimaryKey,
    pub user_id: PrimaryKey,
    pub time: String,
}
