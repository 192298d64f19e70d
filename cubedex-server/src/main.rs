use colored::Colorize;
use cubedex_core::{Cubedex, DatabaseError, SqliteDatabase};
use cubedex_server::logging::{self, LogColor};
use log::{error, info};
use thiserror::Error;

/// Where the database lives if CUBEDEX_DATABASE_URL is not set
const DEFAULT_DATABASE_URL: &str = "sqlite://cubedex.db";

#[derive(Debug, Error)]
enum StartupError {
    #[error("Could not initialize database: {0}")]
    Database(#[from] DatabaseError),

    #[error("Could not run server: {0}")]
    Server(#[from] std::io::Error),
}

impl StartupError {
    fn hint(&self) -> String {
        match self {
            StartupError::Database(_) => "This is a database error. Make sure the path in CUBEDEX_DATABASE_URL points somewhere writable, then try again.".to_string(),
            StartupError::Server(_) => "The server could not bind or serve. Check that the port in CUBEDEX_SERVER_PORT is free.".to_string(),
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let database_url =
        std::env::var("CUBEDEX_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    info!("Connecting to database...");
    let database = SqliteDatabase::new(&database_url).await?;

    info!("Initialized successfully.");
    cubedex_server::run_server(Cubedex::new(database)).await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    logging::init_logger();

    if let Err(error) = run().await {
        error!(
            "{} Read the error below to troubleshoot the issue.",
            "cubedex failed to start!".bold().color(LogColor::Red)
        );
        error!("{}", error);
        error!(
            "{}",
            format!("Hint: {}", error.hint())
                .color(LogColor::Dimmed)
                .italic()
        );
    }
}
