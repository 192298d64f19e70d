use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{Duration, Utc};
use log::info;
use rand::rngs::OsRng;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    util::random_string, Database, DatabaseError, NewSession, NewUser, PrimaryKey, SessionData,
    UserData,
};

pub struct Auth<Db> {
    db: Arc<Db>,
    argon: Argon2<'static>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password is empty or contains a space
    #[error("Username or password is empty or contains a space")]
    EmptyInput,
    /// Username or password is longer than allowed
    #[error("Username or password is longer than 10 characters")]
    ExceedsLimit,
    /// Password is shorter than required
    #[error("Password is shorter than 6 characters")]
    ShortPassword,
    /// The username is already registered
    #[error("Username is already taken")]
    UsernameTaken,
    /// No account with this username exists
    #[error("Wrong username")]
    WrongUsername,
    /// The password does not match the account
    #[error("Wrong password")]
    WrongPassword,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
    #[error("HashError: {0}")]
    HashError(String),
}

impl<Db> Auth<Db>
where
    Db: Database,
{
    const SESSION_DURATION_IN_DAYS: usize = 7;
    const TOKEN_LENGTH: usize = 32;

    /// Usernames and passwords may not be longer than this
    const CREDENTIAL_LIMIT: usize = 10;
    /// Passwords may not be shorter than this
    const MINIMUM_PASSWORD_LENGTH: usize = 6;

    pub fn new(db: &Arc<Db>) -> Self {
        Self {
            db: db.clone(),
            argon: Argon2::default(),
        }
    }

    /// Creates a new account, storing the password as an argon2 hash
    pub async fn register(&self, credentials: Credentials) -> Result<UserData, AuthError> {
        Self::validate(&credentials)?;

        if credentials.password.chars().count() < Self::MINIMUM_PASSWORD_LENGTH {
            return Err(AuthError::ShortPassword);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hashed_password = self
            .argon
            .hash_password(credentials.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        self.db
            .create_user(NewUser {
                username: credentials.username,
                password: hashed_password,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict { .. } => AuthError::UsernameTaken,
                err => AuthError::Db(err),
            })
    }

    /// Logs in a user, returning a new session
    pub async fn login(&self, credentials: Credentials) -> Result<SessionData, AuthError> {
        Self::validate(&credentials)?;
        self.clear_expired().await?;

        let user = self
            .db
            .user_by_username(&credentials.username)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound { .. } => AuthError::WrongUsername,
                err => AuthError::Db(err),
            })?;

        let stored_password = PasswordHash::parse(&user.password, Encoding::default())
            .map_err(|e| AuthError::HashError(e.to_string()))?;

        self.argon
            .verify_password(credentials.password.as_bytes(), &stored_password)
            .map_err(|_| AuthError::WrongPassword)?;

        let expires_at = Utc::now() + Duration::days(Self::SESSION_DURATION_IN_DAYS as i64);

        let new_session = NewSession {
            token: random_string(Self::TOKEN_LENGTH),
            user_id: user.id,
            expires_at,
        };

        let new_session = self
            .db
            .create_session(new_session)
            .await
            .map_err(AuthError::Db)?;

        Ok(new_session)
    }

    /// Deletes the associated session, if it exists
    pub async fn logout(&self, token: &str) -> Result<(), DatabaseError> {
        self.db.delete_session_by_token(token).await
    }

    /// Deletes an account completely, along with its sessions, ratings,
    /// and recorded times
    pub async fn delete_account(&self, user_id: PrimaryKey) -> Result<(), DatabaseError> {
        info!("Deleting account {}", user_id);
        self.db.delete_user(user_id).await
    }

    /// Returns a session if it exists and has not expired
    pub async fn session(&self, token: &str) -> Result<SessionData, DatabaseError> {
        self.db.session_by_token(token).await
    }

    fn validate(credentials: &Credentials) -> Result<(), AuthError> {
        let Credentials { username, password } = credentials;

        let is_empty = username.is_empty() || password.is_empty();
        let has_space = username.contains(' ') || password.contains(' ');

        if is_empty || has_space {
            return Err(AuthError::EmptyInput);
        }

        let over_limit = username.chars().count() > Self::CREDENTIAL_LIMIT
            || password.chars().count() > Self::CREDENTIAL_LIMIT;

        if over_limit {
            return Err(AuthError::ExceedsLimit);
        }

        Ok(())
    }

    async fn clear_expired(&self) -> Result<(), AuthError> {
        self.db
            .clear_expired_sessions()
            .await
            .map_err(AuthError::Db)
    }
}

#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
