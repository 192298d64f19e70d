use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cubedex_core::{AuthError, DatabaseError};
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{resource}:{identifier} not found")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("Username or password is empty or contains a space")]
    EmptyInput,
    #[error("Username or password is longer than 10 characters")]
    ExceedsLimit,
    #[error("Password is shorter than 6 characters")]
    ShortPassword,
    #[error("Username is already taken")]
    UsernameExists,
    #[error("Wrong username")]
    WrongUsername,
    #[error("Wrong password")]
    WrongPassword,
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } | Self::UsernameExists => StatusCode::CONFLICT,
            Self::EmptyInput | Self::ExceedsLimit | Self::ShortPassword => StatusCode::BAD_REQUEST,
            Self::WrongUsername | Self::WrongPassword => StatusCode::UNAUTHORIZED,
            Self::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.as_status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("{self}");
        }

        (status, self.to_string()).into_response()
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::EmptyInput => Self::EmptyInput,
            AuthError::ExceedsLimit => Self::ExceedsLimit,
            AuthError::ShortPassword => Self::ShortPassword,
            AuthError::UsernameTaken => Self::UsernameExists,
            AuthError::WrongUsername => Self::WrongUsername,
            AuthError::WrongPassword => Self::WrongPassword,
            AuthError::Db(e) => e.into(),
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                resource,
                identifier,
            },
            DatabaseError::Conflict {
                resource,
                field,
                value,
            } => Self::Conflict {
                resource,
                field,
                value,
            },
            e => Self::Unknown(e.to_string()),
        }
    }
}
