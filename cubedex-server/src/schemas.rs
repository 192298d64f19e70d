use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterSchema {
    #[validate(length(max = 128))]
    pub username: String,
    #[validate(length(max = 128))]
    pub password: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginSchema {
    #[validate(length(max = 128))]
    pub username: String,
    #[validate(length(max = 128))]
    pub password: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LogoutSchema {
    /// Also deletes the account and everything belonging to it
    #[serde(default)]
    pub confirm_delete: bool,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitRatingSchema {
    pub algorithm_id: i64,
    /// The rating exactly as the user typed it, validated server-side
    #[validate(length(max = 32))]
    pub rating: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecordTimeSchema {
    #[validate(length(min = 1, max = 32))]
    pub time: String,
}

/// Query parameters of the algorithm listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extracted_json: Json<T> = Json::from_request(req, state)
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "JSON parse failed"))?;

        extracted_json
            .0
            .validate()
            .map_err(|_| (StatusCode::BAD_REQUEST, "Request body is invalid"))?;

        Ok(Self(extracted_json.0))
    }
}
