use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth::identity::{clear_cookie, get_cookie_value, session_cookie};
use crate::auth::{session, RequestIdentity};
use crate::error::AppResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
}

/// Test-only routes. Never mounted unless explicitly enabled.
pub fn seed_router() -> Router<AppState> {
    Router::new().route("/test/seed", get(test_seed))
}

/// GET /auth/me: who the server thinks is calling.
async fn me(identity: RequestIdentity) -> Response {
    let body = json!({
        "id": identity.id(),
        "authenticated": identity.identity.is_authenticated(),
    });
    (identity.headers(), Json(body)).into_response()
}

/// POST /auth/logout: drop the session row and expire the cookie.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let cookie_name = &state.config.auth.session_cookie;
    if let Some(token) = get_cookie_value(&headers, cookie_name) {
        session::delete_session(&state.db, token)?;
    }

    Ok((
        [(header::SET_COOKIE, clear_cookie(cookie_name))],
        Json(json!({ "ok": true })),
    )
        .into_response())
}

#[derive(Deserialize)]
pub struct SeedQuery {
    pub user: Option<String>,
    pub name: Option<String>,
}

/// GET /test/seed: create (or reuse) a user and hand back a fresh session.
async fn test_seed(
    State(state): State<AppState>,
    Query(query): Query<SeedQuery>,
) -> AppResult<Response> {
    let user_id = query.user.unwrap_or_else(|| "testuser".to_string());
    session::ensure_user(&state.db, &user_id, query.name.as_deref())?;

    let auth = &state.config.auth;
    let token = session::create_session(&state.db, &user_id, auth.session_hours)?;
    tracing::info!(user_id = %user_id, "seeded test session");

    Ok((
        [(
            header::SET_COOKIE,
            session_cookie(&auth.session_cookie, &token, auth.session_hours),
        )],
        Json(json!({ "user_id": user_id })),
    )
        .into_response())
}
