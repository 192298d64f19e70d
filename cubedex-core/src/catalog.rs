use std::{collections::HashMap, sync::Arc};

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{AlgorithmData, Database, DatabaseError, PrimaryKey, SortOrder};

/// Browses the algorithm catalog, one set at a time
pub struct Catalog<Db> {
    db: Arc<Db>,
}

/// Everything needed to render an algorithm set
#[derive(Debug)]
pub struct Listing {
    pub algorithms: Vec<AlgorithmData>,
    /// Algorithm names paired with their image as a base64 string.
    /// Algorithms without a stored image have no entry here.
    pub images: Vec<AlgorithmImage>,
    /// Mean rating by algorithm id, one decimal place. Algorithms
    /// nobody rated are absent, never zero.
    pub averages: HashMap<PrimaryKey, f64>,
}

/// An algorithm image, encoded for embedding
#[derive(Debug)]
pub struct AlgorithmImage {
    pub name: String,
    pub data: String,
}

impl<Db> Catalog<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Lists a set in the given order, along with encoded images and
    /// average ratings for the set
    pub async fn list(&self, set: &str, order: SortOrder) -> Result<Listing, DatabaseError> {
        let algorithms = self.db.algorithms_by_set(set, order).await?;

        // An unknown set and an empty one are the same thing, since a
        // set only exists through its algorithms
        if algorithms.is_empty() {
            return Err(DatabaseError::NotFound {
                resource: "algorithm set",
                identifier: "name",
            });
        }

        let images = algorithms
            .iter()
            .filter_map(|algorithm| {
                algorithm.image.as_ref().map(|blob| AlgorithmImage {
                    name: algorithm.name.clone(),
                    data: STANDARD.encode(blob),
                })
            })
            .collect();

        let averages = self.averages(set).await?;

        Ok(Listing {
            algorithms,
            images,
            averages,
        })
    }

    /// The average ratings of a set, keyed by algorithm id
    pub async fn averages(&self, set: &str) -> Result<HashMap<PrimaryKey, f64>, DatabaseError> {
        let averages = self
            .db
            .average_ratings_by_set(set)
            .await?
            .into_iter()
            .map(|average| (average.algorithm_id, average.average_rating))
            .collect();

        Ok(averages)
    }
}
