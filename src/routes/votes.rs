use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::auth::RequestIdentity;
use crate::civic::votes::VoteValue;
use crate::error::{AppError, AppResult};
use crate::extractors::JsonBody;
use crate::routes::non_blank;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub policy_id: Option<String>,
    pub bill_id: Option<String>,
    pub value: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/votes", post(cast_vote))
}

/// POST /votes: one vote per identity per bill; returns the live tally.
async fn cast_vote(
    State(state): State<AppState>,
    identity: RequestIdentity,
    JsonBody(req): JsonBody<CastVoteRequest>,
) -> AppResult<Response> {
    let bill_id = non_blank(req.policy_id)
        .or_else(|| non_blank(req.bill_id))
        .ok_or_else(|| AppError::BadRequest("bad request".into()))?;
    let value: VoteValue = req
        .value
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(AppError::BadRequest)?;

    let tally = state
        .repo
        .upsert_vote(&identity.identity, &bill_id, value)
        .await?;

    Ok((identity.headers(), Json(tally)).into_response())
}
