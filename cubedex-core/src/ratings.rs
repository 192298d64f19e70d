use std::sync::Arc;

use thiserror::Error;

use crate::{Database, DatabaseError, NewRating, PrimaryKey};

/// Validates and stores the ratings users give algorithms
pub struct Ratings<Db> {
    db: Arc<Db>,
}

#[derive(Debug, Error)]
pub enum RatingError {
    /// The submission is empty or contains a space
    #[error("Rating is empty or contains a space")]
    Blank,
    /// The submission is not an integer
    #[error("Rating is not a number")]
    NotANumber,
    /// The submission is an integer outside the allowed range
    #[error("Rating {0} is outside the 0 to 5 range")]
    OutOfRange(i64),
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
}

impl<Db> Ratings<Db>
where
    Db: Database,
{
    const RATING_RANGE: std::ops::RangeInclusive<i64> = 0..=5;

    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Validates a raw submission and stores it, replacing the rating
    /// this user may already have given this algorithm
    pub async fn submit(
        &self,
        algorithm_id: PrimaryKey,
        user_id: PrimaryKey,
        raw_rating: &str,
    ) -> Result<(), RatingError> {
        let rating = Self::parse(raw_rating)?;

        self.db
            .upsert_rating(NewRating {
                algorithm_id,
                user_id,
                rating,
            })
            .await
            .map_err(RatingError::Db)
    }

    fn parse(raw: &str) -> Result<i64, RatingError> {
        if raw.is_empty() || raw.contains(' ') {
            return Err(RatingError::Blank);
        }

        let rating: i64 = raw.parse().map_err(|_| RatingError::NotANumber)?;

        if !Self::RATING_RANGE.contains(&rating) {
            return Err(RatingError::OutOfRange(rating));
        }

        Ok(rating)
    }
}
