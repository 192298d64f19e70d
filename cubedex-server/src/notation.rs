use axum::{routing::get, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::Router;

/// A single symbol of standard cube notation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotationEntry {
    symbol: &'static str,
    description: &'static str,
}

const NOTATION: &[NotationEntry] = &[
    NotationEntry {
        symbol: "R",
        description: "Clockwise quarter turn of the right face",
    },
    NotationEntry {
        symbol: "L",
        description: "Clockwise quarter turn of the left face",
    },
    NotationEntry {
        symbol: "U",
        description: "Clockwise quarter turn of the upper face",
    },
    NotationEntry {
        symbol: "D",
        description: "Clockwise quarter turn of the bottom face",
    },
    NotationEntry {
        symbol: "F",
        description: "Clockwise quarter turn of the front face",
    },
    NotationEntry {
        symbol: "B",
        description: "Clockwise quarter turn of the back face",
    },
    NotationEntry {
        symbol: "M",
        description: "Turn of the middle slice, following the direction of L",
    },
    NotationEntry {
        symbol: "'",
        description: "Makes the preceding turn counter-clockwise, as in R'",
    },
    NotationEntry {
        symbol: "2",
        description: "Makes the preceding turn a half turn, as in R2",
    },
    NotationEntry {
        symbol: "y",
        description: "Rotation of the whole cube around the U axis",
    },
];

#[utoipa::path(
    get,
    path = "/v1/notation",
    tag = "notation",
    responses(
        (status = 200, body = Vec<NotationEntry>)
    )
)]
pub(crate) async fn notation() -> Json<&'static [NotationEntry]> {
    Json(NOTATION)
}

pub fn router() -> Router {
    Router::new().route("/", get(notation))
}
