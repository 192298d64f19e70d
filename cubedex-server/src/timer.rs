use axum::{
    routing::{delete, get, post},
    Json,
};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{RecordTimeSchema, ValidatedJson},
    serialized::{TimeEntry, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/timer",
    tag = "timer",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<TimeEntry>)
    )
)]
pub(crate) async fn list_times(
    session: Session,
    context: ServerContext,
) -> ServerResult<Json<Vec<TimeEntry>>> {
    let times = context.app.timer.list(session.user().id).await?;

    Ok(Json(times.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/timer/times",
    tag = "timer",
    request_body = RecordTimeSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<TimeEntry>, description = "The updated list of times")
    )
)]
pub(crate) async fn record_time(
    session: Session,
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<RecordTimeSchema>,
) -> ServerResult<Json<Vec<TimeEntry>>> {
    let user_id = session.user().id;

    context.app.timer.record(user_id, body.time).await?;
    let times = context.app.timer.list(user_id).await?;

    Ok(Json(times.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/timer/times",
    tag = "timer",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<TimeEntry>, description = "The now empty list of times")
    )
)]
pub(crate) async fn clear_times(
    session: Session,
    context: ServerContext,
) -> ServerResult<Json<Vec<TimeEntry>>> {
    let user_id = session.user().id;

    context.app.timer.clear(user_id).await?;
    let times = context.app.timer.list(user_id).await?;

    Ok(Json(times.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_times))
        .route("/times", post(record_time))
        .route("/times", delete(clear_times))
}
