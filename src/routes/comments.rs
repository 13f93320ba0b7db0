use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::auth::RequestIdentity;
use crate::error::{AppError, AppResult};
use crate::extractors::JsonBody;
use crate::routes::{check_length, non_blank};
use crate::state::AppState;

const MAX_COMMENT_CHARS: usize = 1000;

// `policyId` is the older name for `billId`; both are accepted.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    pub bill_id: Option<String>,
    pub policy_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub bill_id: Option<String>,
    pub policy_id: Option<String>,
    pub content: Option<String>,
}

fn bill_id_of(bill_id: Option<String>, policy_id: Option<String>) -> Option<String> {
    non_blank(bill_id).or_else(|| non_blank(policy_id))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/comments", get(list_comments).post(create_comment))
}

async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<CommentQuery>,
) -> AppResult<Response> {
    let bill_id = bill_id_of(query.bill_id, query.policy_id)
        .ok_or_else(|| AppError::BadRequest("billId (or policyId) required".into()))?;

    let comments = state.repo.list_comments(&bill_id).await?;
    Ok(Json(comments).into_response())
}

async fn create_comment(
    State(state): State<AppState>,
    identity: RequestIdentity,
    JsonBody(req): JsonBody<CreateCommentRequest>,
) -> AppResult<Response> {
    let (Some(bill_id), Some(content)) = (
        bill_id_of(req.bill_id, req.policy_id),
        non_blank(req.content),
    ) else {
        return Err(AppError::BadRequest(
            "billId (or policyId) and content required".into(),
        ));
    };
    check_length("content", &content, MAX_COMMENT_CHARS)?;

    let comment = state
        .repo
        .add_comment(identity.id(), &bill_id, &content)
        .await?;

    Ok((identity.headers(), Json(comment)).into_response())
}
