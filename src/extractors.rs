use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::auth::identity::{self, get_cookie_value, IdentityCookie, RequestIdentity};
use crate::auth::session;
use crate::error::AppError;
use crate::state::AppState;

/// Represents the currently authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
}

/// Extractor that requires authentication.
/// Returns 401 if no valid session found.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = get_cookie_value(&parts.headers, &state.config.auth.session_cookie)
            .ok_or(AppError::Unauthorized)?;

        let user = session::session_user(&state.db, token)?.ok_or(AppError::Unauthorized)?;
        Ok(CurrentUser { id: user.id })
    }
}

/// Optional user extractor: returns None instead of 401 when not authenticated.
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(AppError::Unauthorized) => Ok(MaybeUser(None)),
            Err(e) => Err(e),
        }
    }
}

/// Resolves the acting identity: the signed-in user, or else the anonymous
/// `uid` cookie, minting one when absent. Handlers must attach
/// [`RequestIdentity::headers`] to their response so a minted id persists.
impl FromRequestParts<AppState> for RequestIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        let cookie = IdentityCookie {
            name: &state.config.auth.identity_cookie,
            max_age_days: state.config.auth.identity_max_age_days,
        };
        let existing = get_cookie_value(&parts.headers, cookie.name);

        Ok(identity::resolve(user.map(|u| u.id), existing, &cookie))
    }
}

/// `Json` body whose rejections (malformed JSON, wrong content type, type
/// mismatches) surface as 400 with the same `{"error": ...}` shape as every
/// other failure.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}
