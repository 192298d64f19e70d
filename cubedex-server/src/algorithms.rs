use axum::{
    extract::{Path, Query},
    routing::{get, post},
    Json,
};
use cubedex_core::{RatingError, SortOrder};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{ListQuery, SubmitRatingSchema, ValidatedJson},
    serialized::{AlgorithmListing, RatingOutcome},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/algorithms/{set}",
    tag = "algorithms",
    responses(
        (status = 200, body = AlgorithmListing),
        (status = 404, description = "No algorithm set with this name exists")
    )
)]
pub(crate) async fn list_algorithms(
    context: ServerContext,
    Path(set): Path<String>,
    Query(query): Query<ListQuery>,
) -> ServerResult<Json<AlgorithmListing>> {
    let order = SortOrder::from_selection(query.sort.as_deref());
    let listing = context.app.catalog.list(&set, order).await?;

    Ok(Json(AlgorithmListing::new(&set, order, listing)))
}

#[utoipa::path(
    post,
    path = "/v1/algorithms/{set}/ratings",
    tag = "algorithms",
    request_body = SubmitRatingSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = RatingOutcome, description = "The outcome, whether the rating was accepted or not")
    )
)]
pub(crate) async fn submit_rating(
    session: Session,
    context: ServerContext,
    Path(set): Path<String>,
    ValidatedJson(body): ValidatedJson<SubmitRatingSchema>,
) -> ServerResult<Json<RatingOutcome>> {
    let result = context
        .app
        .ratings
        .submit(body.algorithm_id, session.user().id, &body.rating)
        .await;

    // A rejected rating is not an error, the outcome says what was
    // wrong with it
    let (valid_rating, is_space, in_range) = match result {
        Ok(()) => (true, false, true),
        Err(RatingError::Blank) => (false, true, true),
        Err(RatingError::NotANumber) | Err(RatingError::OutOfRange(_)) => (false, false, false),
        Err(RatingError::Db(e)) => return Err(e.into()),
    };

    let ratings = context.app.catalog.averages(&set).await?;

    Ok(Json(RatingOutcome {
        valid_rating,
        is_space,
        in_range,
        ratings,
    }))
}

pub fn router() -> Router {
    Router::new()
        .route("/:set", get(list_algorithms))
        .route("/:set/ratings", post(submit_rating))
}
