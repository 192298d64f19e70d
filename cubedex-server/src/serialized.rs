//! All schemas that are exposed from endpoints are defined here
//! along with the conversion impls

use std::collections::HashMap;

use cubedex_core::{
    AlgorithmData, AlgorithmImage as CatalogImage, Listing, SessionData, SortOrder, TimeEntryData,
    UserData,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct User {
    id: i64,
    username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResult {
    token: String,
    user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResult {
    pub deleted_account: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Algorithm {
    id: i64,
    name: String,
    algorithm_set: String,
    notation: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AlgorithmImage {
    name: String,
    data: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AlgorithmListing {
    algorithm_set: String,
    sorting_way: String,
    algorithms: Vec<Algorithm>,
    images: Vec<AlgorithmImage>,
    ratings: HashMap<i64, f64>,
}

impl AlgorithmListing {
    pub fn new(set: &str, order: SortOrder, listing: Listing) -> Self {
        Self {
            algorithm_set: set.to_string(),
            sorting_way: order.as_selection().to_string(),
            algorithms: listing.algorithms.to_serialized(),
            images: listing.images.to_serialized(),
            ratings: listing.averages,
        }
    }
}

/// The outcome of a rating submission, along with the current averages
/// of the set whether or not the submission was accepted
#[derive(Debug, Serialize, ToSchema)]
pub struct RatingOutcome {
    pub valid_rating: bool,
    pub is_space: bool,
    pub in_range: bool,
    pub ratings: HashMap<i64, f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimeEntry {
    id: i64,
    time: String,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<User> for UserData {
    fn to_serialized(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

impl ToSerialized<LoginResult> for SessionData {
    fn to_serialized(&self) -> LoginResult {
        LoginResult {
            token: self.token.clone(),
            user: self.user.to_serialized(),
        }
    }
}

impl ToSerialized<Algorithm> for AlgorithmData {
    fn to_serialized(&self) -> Algorithm {
        Algorithm {
            id: self.id,
            name: self.name.clone(),
            algorithm_set: self.algorithm_set.clone(),
            notation: self.notation.clone(),
        }
    }
}

impl ToSerialized<AlgorithmImage> for CatalogImage {
    fn to_serialized(&self) -> AlgorithmImage {
        AlgorithmImage {
            name: self.name.clone(),
            data: self.data.clone(),
        }
    }
}

impl ToSerialized<TimeEntry> for TimeEntryData {
    fn to_serialized(&self) -> TimeEntry {
        TimeEntry {
            id: self.id,
            time: self.time.clone(),
        }
    }
}
