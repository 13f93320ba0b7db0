use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::db::models::MyBill;
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/my/bills", get(my_bills).post(my_bills))
}

/// The signed-in user's own bills with agree/disagree counts.
async fn my_bills(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    let bills: Vec<MyBill> = state
        .repo
        .bills_by_user(&user.id)
        .await?
        .into_iter()
        .map(MyBill::from)
        .collect();

    Ok(Json(json!({ "bills": bills })).into_response())
}
