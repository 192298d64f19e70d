mod auth;
mod catalog;
mod db;
mod ratings;
mod timer;
mod util;

use std::sync::Arc;

pub use auth::*;
pub use catalog::*;
pub use db::*;
pub use ratings::*;
pub use timer::*;

/// The cubedex domain system, facilitating accounts, the algorithm
/// catalog, ratings, and solve times.
pub struct Cubedex<Db> {
    pub auth: Auth<Db>,
    pub catalog: Catalog<Db>,
    pub ratings: Ratings<Db>,
    pub timer: Timer<Db>,
}

impl<Db> Cubedex<Db>
where
    Db: Database,
{
    pub fn new(database: Db) -> Self {
        let database = Arc::new(database);

        Self {
            auth: Auth::new(&database),
            catalog: Catalog::new(&database),
            ratings: Ratings::new(&database),
            timer: Timer::new(&database),
        }
    }
}
