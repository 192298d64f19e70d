use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use sqlx::{
    query, query_as, query_scalar,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError, FromRow, SqlitePool,
};

use crate::{
    AlgorithmData, AverageRating, Database, DatabaseError, DatabaseResult, IntoDatabaseError,
    NewRating, NewSession, NewTimeEntry, NewUser, PrimaryKey, Result, SessionData, SortOrder,
    TimeEntryData, UserData,
};

/// A SQLite database implementation for cubedex
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Opens the database at the given url, creating and migrating it
    /// if necessary
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| e.any())?
            .create_if_missing(true)
            .foreign_keys(true);

        // A pool of in-memory connections would be a pool of separate
        // databases, so memory urls are pinned to a single connection
        // that is never reclaimed
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await
        }
        .map_err(|e| e.any())?;

        info!("Running migrations...");
        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        query_as::<_, UserData>("SELECT id, username, password FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "id"))
    }

    async fn user_by_username(&self, username: &str) -> Result<UserData> {
        query_as::<_, UserData>("SELECT id, username, password FROM users WHERE username = ?1")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "username"))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        self.user_by_username(&new_user.username)
            .await
            .conflict_or_ok("user", "username", &new_user.username)?;

        query_as::<_, UserData>(
            "INSERT INTO users (username, password)
            VALUES (?1, ?2)
            RETURNING id, username, password",
        )
        .bind(&new_user.username)
        .bind(&new_user.password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn delete_user(&self, user_id: PrimaryKey) -> Result<()> {
        // Ensure user exists
        let _ = self.user_by_id(user_id).await?;

        let mut tx = self.pool.begin().await.map_err(|e| e.any())?;

        query("DELETE FROM sessions WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| e.any())?;

        query("DELETE FROM ratings WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| e.any())?;

        query("DELETE FROM timer WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| e.any())?;

        query("DELETE FROM users WHERE id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| e.any())?;

        tx.commit().await.map_err(|e| e.any())
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        let row = query_as::<_, SessionRow>(
            "SELECT
                sessions.id,
                sessions.token,
                sessions.expires_at,
                users.id AS user_id,
                users.username,
                users.password
            FROM sessions
                INNER JOIN users ON sessions.user_id = users.id
            WHERE token = ?1 AND expires_at > ?2",
        )
        .bind(token)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("session", "token"))?;

        let result = SessionData {
            id: row.id,
            token: row.token,
            expires_at: row.expires_at,
            user: UserData {
                id: row.user_id,
                username: row.username,
                password: row.password,
            },
        };

        Ok(result)
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        self.session_by_token(&new_session.token)
            .await
            .conflict_or_ok("session", "token", &new_session.token)?;

        let token: String = query_scalar(
            "INSERT INTO sessions (token, user_id, expires_at)
            VALUES (?1, ?2, ?3)
            RETURNING token",
        )
        .bind(&new_session.token)
        .bind(new_session.user_id)
        .bind(new_session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.session_by_token(&token).await
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        // Ensure session exists
        let _ = self.session_by_token(token).await?;

        query("DELETE FROM sessions WHERE token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn clear_expired_sessions(&self) -> Result<()> {
        query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn algorithms_by_set(&self, set: &str, order: SortOrder) -> Result<Vec<AlgorithmData>> {
        // The order column comes from a closed enum, never from input
        let sql = match order {
            SortOrder::Id => {
                "SELECT id, name, algorithm_set, notation, image
                FROM algorithms WHERE algorithm_set = ?1 ORDER BY id"
            }
            SortOrder::Name => {
                "SELECT id, name, algorithm_set, notation, image
                FROM algorithms WHERE algorithm_set = ?1 ORDER BY name"
            }
        };

        query_as::<_, AlgorithmData>(sql)
            .bind(set)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn average_ratings_by_set(&self, set: &str) -> Result<Vec<AverageRating>> {
        query_as::<_, AverageRating>(
            "SELECT
                ratings.algorithm_id,
                ROUND(AVG(ratings.rating), 1) AS average_rating
            FROM ratings
                INNER JOIN algorithms ON ratings.algorithm_id = algorithms.id
            WHERE algorithms.algorithm_set = ?1
            GROUP BY ratings.algorithm_id",
        )
        .bind(set)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn upsert_rating(&self, new_rating: NewRating) -> Result<()> {
        query(
            "INSERT INTO ratings (algorithm_id, user_id, rating)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (algorithm_id, user_id) DO UPDATE SET rating = excluded.rating",
        )
        .bind(new_rating.algorithm_id)
        .bind(new_rating.user_id)
        .bind(new_rating.rating)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())
        .map(|_| ())
    }

    async fn create_time_entry(&self, new_entry: NewTimeEntry) -> Result<TimeEntryData> {
        query_as::<_, TimeEntryData>(
            "INSERT INTO timer (user_id, time)
            VALUES (?1, ?2)
            RETURNING id, user_id, time",
        )
        .bind(new_entry.user_id)
        .bind(&new_entry.time)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn times_by_user(&self, user_id: PrimaryKey) -> Result<Vec<TimeEntryData>> {
        query_as::<_, TimeEntryData>(
            "SELECT id, user_id, time FROM timer WHERE user_id = ?1 ORDER BY id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn clear_times(&self, user_id: PrimaryKey) -> Result<()> {
        query("DELETE FROM timer WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }
}

/// A flattened session row, split into [SessionData] after the join
#[derive(FromRow)]
struct SessionRow {
    id: PrimaryKey,
    token: String,
    expires_at: DateTime<Utc>,
    user_id: PrimaryKey,
    username: String,
    password: String,
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }
}

#[cfg(test)]
impl SqliteDatabase {
    /// Inserts an algorithm row directly, for tests that need images or
    /// sets beyond the seeded ones
    pub(crate) async fn insert_algorithm(
        &self,
        name: &str,
        set: &str,
        notation: &str,
        image: Option<&[u8]>,
    ) -> PrimaryKey {
        query_scalar(
            "INSERT INTO algorithms (name, algorithm_set, notation, image)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id",
        )
        .bind(name)
        .bind(set)
        .bind(notation)
        .bind(image)
        .fetch_one(&self.pool)
        .await
        .expect("algorithm is inserted")
    }

    /// Backdates a session so expiry behavior can be exercised
    pub(crate) async fn expire_session(&self, token: &str) {
        query("UPDATE sessions SET expires_at = ?1 WHERE token = ?2")
            .bind(Utc::now() - chrono::Duration::days(1))
            .bind(token)
            .execute(&self.pool)
            .await
            .expect("session is expired");
    }
}
