use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    routing::{get, post},
    Json,
};
use cubedex_core::{Credentials, SessionData, UserData};

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{LoginSchema, LogoutSchema, RegisterSchema, ValidatedJson},
    serialized::{LoginResult, LogoutResult, ToSerialized, User},
    Router,
};

/// Wraps [SessionData] so [FromRequestParts] can be implemented for it
pub struct Session(SessionData);

impl Session {
    /// Returns the user of the session
    pub fn user(&self) -> &UserData {
        &self.0.user
    }

    /// Returns the session token
    pub fn token(&self) -> &str {
        &self.0.token
    }
}

#[async_trait]
impl FromRequestParts<ServerContext> for Session {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let context = ServerContext::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|x| x.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "Missing authorization"))?;

        let parts: Vec<_> = token.split_ascii_whitespace().collect();

        if parts.first() != Some(&"Bearer") {
            return Err((StatusCode::BAD_REQUEST, "Authorization must be Bearer"));
        }

        let token = parts.last().cloned().unwrap_or_default();

        let session = context
            .app
            .auth
            .session(token)
            .await
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Session does not exist"))?;

        Ok(Self(session))
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "auth",
    request_body = RegisterSchema,
    responses(
        (status = 200, body = User),
        (status = 400, description = "Username or password failed validation"),
        (status = 409, description = "Username is already taken")
    )
)]
pub(crate) async fn register(
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<RegisterSchema>,
) -> ServerResult<Json<User>> {
    let user = context
        .app
        .auth
        .register(Credentials {
            username: body.username,
            password: body.password,
        })
        .await?;

    Ok(Json(user.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "auth",
    request_body = LoginSchema,
    responses(
        (status = 200, body = LoginResult),
        (status = 401, description = "Username or password is wrong")
    )
)]
pub(crate) async fn login(
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<LoginSchema>,
) -> ServerResult<Json<LoginResult>> {
    let session = context
        .app
        .auth
        .login(Credentials {
            username: body.username,
            password: body.password,
        })
        .await?;

    Ok(Json(session.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "auth",
    request_body = LogoutSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = LogoutResult)
    )
)]
pub(crate) async fn logout(
    session: Session,
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<LogoutSchema>,
) -> ServerResult<Json<LogoutResult>> {
    if body.confirm_delete {
        context.app.auth.delete_account(session.user().id).await?;
    } else {
        context.app.auth.logout(session.token()).await?;
    }

    Ok(Json(LogoutResult {
        deleted_account: body.confirm_delete,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/auth/user",
    tag = "auth",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = User)
    )
)]
pub(crate) async fn user(session: Session) -> Json<User> {
    Json(session.user().to_serialized())
}

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/user", get(user))
}
