use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

mod data;
pub use data::*;

mod sqlite;
pub use sqlite::*;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Helper trait to reduce boilerplate
pub trait DatabaseResult {
    /// Turns the Result into a conflict error if it's Ok()
    fn conflict_or_ok(self, resource: &'static str, field: &'static str, value: &str)
        -> Result<()>;
}

impl<T> DatabaseResult for Result<T> {
    fn conflict_or_ok(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> Result<()> {
        match self {
            Ok(_) => Err(DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            }),
            Err(e) => match e {
                DatabaseError::NotFound { .. } => Ok(()),
                e => Err(e),
            },
        }
    }
}

/// Represents a type that can fetch and store cubedex data
#[async_trait]
pub trait Database {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData>;
    async fn user_by_username(&self, username: &str) -> Result<UserData>;
    async fn create_user(&self, new_user: NewUser) -> Result<UserData>;
    /// Deletes a user along with their sessions, ratings, and recorded
    /// times, in a single transaction
    async fn delete_user(&self, user_id: PrimaryKey) -> Result<()>;

    /// Returns the session with this token, unless it expired
    async fn session_by_token(&self, token: &str) -> Result<SessionData>;
    async fn create_session(&self, new_session: NewSession) -> Result<SessionData>;
    async fn delete_session_by_token(&self, token: &str) -> Result<()>;
    async fn clear_expired_sessions(&self) -> Result<()>;

    async fn algorithms_by_set(&self, set: &str, order: SortOrder) -> Result<Vec<AlgorithmData>>;
    /// Returns the average rating of every rated algorithm in a set.
    /// Algorithms nobody rated are not included.
    async fn average_ratings_by_set(&self, set: &str) -> Result<Vec<AverageRating>>;
    /// Stores a rating, replacing the one the user may already have
    /// given the algorithm
    async fn upsert_rating(&self, new_rating: NewRating) -> Result<()>;

    async fn create_time_entry(&self, new_entry: NewTimeEntry) -> Result<TimeEntryData>;
    /// Returns a user's recorded times, most recent first
    async fn times_by_user(&self, user_id: PrimaryKey) -> Result<Vec<TimeEntryData>>;
    async fn clear_times(&self, user_id: PrimaryKey) -> Result<()>;
}

/// The order algorithms in a set are returned in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Insertion order, which is also id order
    #[default]
    Id,
    Name,
}

impl SortOrder {
    /// Interprets a sort selection, falling back to id order for
    /// anything unrecognized
    pub fn from_selection(selection: Option<&str>) -> Self {
        match selection {
            Some("name") => Self::Name,
            _ => Self::Id,
        }
    }

    pub fn as_selection(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
        }
    }
}

#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct NewSession {
    pub token: String,
    pub user_id: PrimaryKey,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewRating {
    pub algorithm_id: PrimaryKey,
    /// The user giving the rating
    pub user_id: PrimaryKey,
    pub rating: i64,
}

#[derive(Debug)]
pub struct NewTimeEntry {
    pub user_id: PrimaryKey,
    pub time: String,
}
