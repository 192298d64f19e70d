use std::sync::Arc;

use crate::{Database, DatabaseError, NewTimeEntry, PrimaryKey, TimeEntryData};

/// Keeps each user's log of recorded solve times
pub struct Timer<Db> {
    db: Arc<Db>,
}

impl<Db> Timer<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Appends a solve time to the user's log, stored as submitted
    pub async fn record(
        &self,
        user_id: PrimaryKey,
        time: String,
    ) -> Result<TimeEntryData, DatabaseError> {
        self.db.create_time_entry(NewTimeEntry { user_id, time }).await
    }

    /// Returns the user's times, most recent first
    pub async fn list(&self, user_id: PrimaryKey) -> Result<Vec<TimeEntryData>, DatabaseError> {
        self.db.times_by_user(user_id).await
    }

    /// Removes every recorded time the user has
    pub async fn clear(&self, user_id: PrimaryKey) -> Result<(), DatabaseError> {
        self.db.clear_times(user_id).await
    }
}
