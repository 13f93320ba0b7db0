use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth::RequestIdentity;
use crate::db::models::{BillDetail, NewBill};
use crate::error::{AppError, AppResult};
use crate::extractors::JsonBody;
use crate::routes::{check_length, non_blank};
use crate::state::AppState;

const MAX_TITLE_CHARS: usize = 200;
const MAX_BODY_CHARS: usize = 5000;

#[derive(Deserialize)]
pub struct CreateBillRequest {
    pub title: Option<String>,
    pub text: Option<String>,
    pub benefit: Option<String>,
}

impl CreateBillRequest {
    fn validate(self) -> AppResult<NewBill> {
        let (Some(title), Some(text), Some(benefit)) = (
            non_blank(self.title),
            non_blank(self.text),
            non_blank(self.benefit),
        ) else {
            return Err(AppError::BadRequest("missing fields".into()));
        };

        check_length("title", &title, MAX_TITLE_CHARS)?;
        check_length("text", &text, MAX_BODY_CHARS)?;
        check_length("benefit", &benefit, MAX_BODY_CHARS)?;

        Ok(NewBill {
            title,
            text,
            benefit,
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bills", get(list_bills).post(create_bill))
        .route("/bills/{id}", get(get_bill))
}

async fn list_bills(State(state): State<AppState>) -> AppResult<Response> {
    let bills = state.repo.list_bills().await?;
    Ok(Json(json!({ "bills": bills })).into_response())
}

async fn create_bill(
    State(state): State<AppState>,
    identity: RequestIdentity,
    JsonBody(req): JsonBody<CreateBillRequest>,
) -> AppResult<Response> {
    let bill = req.validate()?;
    let id = state.repo.create_bill(&identity.identity, &bill).await?;
    tracing::info!(bill_id = %id, "bill created");

    Ok((identity.headers(), Json(json!({ "id": id }))).into_response())
}

async fn get_bill(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    let summary = state.repo.get_bill(&id).await?.ok_or(AppError::NotFound)?;
    let comments = state.repo.list_comments(&id).await?;

    Ok(Json(BillDetail { summary, comments }).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, text: &str, benefit: &str) -> CreateBillRequest {
        CreateBillRequest {
            title: Some(title.into()),
            text: Some(text.into()),
            benefit: Some(benefit.into()),
        }
    }

    #[test]
    fn validate_trims_fields() {
        let bill = request("  A ", "B\n", "\tC").validate().unwrap();
        assert_eq!((bill.title.as_str(), bill.text.as_str(), bill.benefit.as_str()), ("A", "B", "C"));
    }

    #[test]
    fn validate_rejects_blank_or_missing_fields() {
        assert!(request("A", "   ", "C").validate().is_err());
        let missing = CreateBillRequest {
            title: Some("A".into()),
            text: Some("B".into()),
            benefit: None,
        };
        assert!(matches!(missing.validate(), Err(AppError::BadRequest(m)) if m == "missing fields"));
    }

    #[test]
    fn validate_rejects_overlong_title() {
        let title = "あ".repeat(MAX_TITLE_CHARS + 1);
        assert!(request(&title, "B", "C").validate().is_err());
        let title = "あ".repeat(MAX_TITLE_CHARS);
        assert!(request(&title, "B", "C").validate().is_ok());
    }
}
