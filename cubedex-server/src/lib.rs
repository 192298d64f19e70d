mod algorithms;
mod auth;
mod context;
mod docs;
mod errors;
mod notation;
mod schemas;
mod serialized;
mod timer;

pub mod logging;

use std::{
    env,
    net::{Ipv6Addr, SocketAddr},
    sync::Arc,
};

use axum::{http::StatusCode, routing::get, Json};
use log::info;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use utoipa::ToSchema;

pub use context::{App, ServerContext};

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9090;

pub type Router = axum::Router<ServerContext>;

/// Basic information about this instance
#[derive(Debug, Serialize, ToSchema)]
struct InstanceInfo {
    name: &'static str,
    version: &'static str,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "instance",
    responses(
        (status = 200, body = InstanceInfo)
    )
)]
async fn instance_info() -> Json<InstanceInfo> {
    Json(InstanceInfo {
        name: "cubedex",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Nothing here")
}

/// Assembles the full cubedex router
pub fn create_app(context: ServerContext) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let version_one_router = Router::new()
        .nest("/auth", auth::router())
        .nest("/algorithms", algorithms::router())
        .nest("/timer", timer::router())
        .nest("/notation", notation::router());

    Router::new()
        .route("/", get(instance_info))
        .route("/api.json", get(docs::docs))
        .nest("/v1", version_one_router)
        .fallback(not_found)
        .layer(cors)
        .with_state(context)
}

/// Starts the cubedex server
pub async fn run_server(app: App) -> Result<(), std::io::Error> {
    let port = env::var("CUBEDEX_SERVER_PORT")
        .map(|x| x.parse::<u16>().expect("Port must be a number"))
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let context = ServerContext { app: Arc::new(app) };
    let router = create_app(context);

    let listener = TcpListener::bind(&addr).await?;

    info!("Listening on port {}", port);

    axum::serve(listener, router.into_make_service()).await
}
