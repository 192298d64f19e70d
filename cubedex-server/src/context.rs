use std::{convert::Infallible, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use cubedex_core::{Cubedex, SqliteDatabase};

/// The cubedex system this server exposes
pub type App = Cubedex<SqliteDatabase>;

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub app: Arc<App>,
}

#[async_trait]
impl FromRequestParts<ServerContext> for ServerContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.clone())
    }
}
