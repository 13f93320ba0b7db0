use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::civic::district::resolve_district;
use crate::civic::election::{BallotKind, HouseTally, Voter};
use crate::civic::matching::{self, PARTY_PROFILES, QUESTIONS, SCALE};
use crate::error::{AppError, AppResult};
use crate::extractors::{JsonBody, MaybeUser};
use crate::routes::{check_length, non_blank};
use crate::state::AppState;

const MAX_BALLOT_CHARS: usize = 100;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastBallotRequest {
    pub kind: Option<String>,
    pub value: Option<String>,
    pub user_id: Option<String>,
    pub device_id: Option<String>,
}

#[derive(Deserialize)]
pub struct MatchingRequest {
    pub answers: Vec<Option<i64>>,
}

#[derive(Deserialize)]
pub struct DistrictQuery {
    pub prefecture: Option<String>,
    pub city: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/election/house", get(house_tally))
        .route("/election/vote", post(cast_ballot))
        .route("/election/matching", get(questionnaire).post(score_matching))
        .route("/election/district", get(district))
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// GET /election/house: proportional-representation tally. A store failure
/// degrades to an all-zero tally instead of an error.
async fn house_tally(State(state): State<AppState>) -> Json<HouseTally> {
    let tally = match state.repo.ballot_counts(BallotKind::Pr).await {
        Ok(counts) => HouseTally::from_counts(
            counts.iter().map(|(value, n)| (value.as_str(), *n)),
            now_rfc3339(),
        ),
        Err(e) => {
            tracing::warn!("Election tally unavailable, serving zeros: {}", e);
            HouseTally::empty(now_rfc3339())
        }
    };
    Json(tally)
}

/// The ballot's owner: the signed-in user, else the client-supplied user id,
/// else the client's device id.
fn voter_for(
    session_user: Option<String>,
    user_id: Option<String>,
    device_id: Option<String>,
) -> Option<Voter> {
    session_user
        .or_else(|| non_blank(user_id))
        .map(Voter::User)
        .or_else(|| non_blank(device_id).map(Voter::Device))
}

/// POST /election/vote: one ballot per voter per race kind, overwritten on
/// re-vote.
async fn cast_ballot(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    JsonBody(req): JsonBody<CastBallotRequest>,
) -> AppResult<Response> {
    let (Some(kind), Some(value)) = (non_blank(req.kind), non_blank(req.value)) else {
        return Err(AppError::BadRequest("bad request".into()));
    };
    let kind: BallotKind = kind.parse().map_err(AppError::BadRequest)?;
    check_length("value", &value, MAX_BALLOT_CHARS)?;

    let voter = voter_for(user.map(|u| u.id), req.user_id, req.device_id)
        .ok_or_else(|| AppError::BadRequest("no identity".into()))?;

    state.repo.upsert_ballot(&voter, kind, &value).await?;
    tracing::info!(kind = %kind, voter_kind = voter.kind(), "ballot recorded");

    Ok(Json(json!({ "ok": true })).into_response())
}

/// GET /election/matching: the questionnaire and answer scale.
async fn questionnaire() -> Json<serde_json::Value> {
    let scale: Vec<_> = SCALE
        .iter()
        .map(|(label, value)| json!({ "label": label, "value": value }))
        .collect();
    let parties: Vec<&str> = PARTY_PROFILES.iter().map(|(party, _)| *party).collect();

    Json(json!({
        "questions": QUESTIONS,
        "scale": scale,
        "parties": parties,
    }))
}

/// POST /election/matching: score a completed questionnaire.
async fn score_matching(JsonBody(req): JsonBody<MatchingRequest>) -> AppResult<Response> {
    let raw: Vec<i64> = req
        .answers
        .iter()
        .enumerate()
        .map(|(i, a)| {
            a.ok_or_else(|| AppError::BadRequest(format!("question {} is unanswered", i + 1)))
        })
        .collect::<AppResult<_>>()?;
    let answers =
        matching::parse_answers(&raw).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let results = matching::rank_parties(&answers);
    Ok(Json(json!({ "results": results })).into_response())
}

/// GET /election/district: estimated single-seat district for an address.
async fn district(Query(query): Query<DistrictQuery>) -> AppResult<Response> {
    let (Some(prefecture), Some(city)) = (non_blank(query.prefecture), non_blank(query.city))
    else {
        return Err(AppError::BadRequest("prefecture and city required".into()));
    };

    let district = resolve_district(&prefecture, &city);
    Ok(Json(json!({ "district": district })).into_response())
}
