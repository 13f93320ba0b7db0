pub mod auth;
pub mod bills;
pub mod comments;
pub mod election;
pub mod my;
pub mod videos;
pub mod votes;

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Builds the full application router. `test_seed` mounts `/test/seed`,
/// which hands out sessions without any sign-in and must stay off in
/// production.
pub fn app(state: AppState, test_seed: bool) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(auth::router())
        .merge(bills::router())
        .merge(votes::router())
        .merge(comments::router())
        .merge(election::router())
        .merge(my::router())
        .merge(videos::router(state.config.max_upload_bytes()))
        .nest_service("/uploads", ServeDir::new(state.config.uploads_path()));

    if test_seed {
        app = app.merge(auth::seed_router());
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Trims a text field, treating blank input as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn check_length(field: &str, value: &str, max_chars: usize) -> AppResult<()> {
    if value.chars().count() > max_chars {
        return Err(AppError::BadRequest(format!(
            "{} must be {} characters or less",
            field, max_chars
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db;

    fn test_app(dir: &std::path::Path, test_seed: bool) -> Router {
        let config = Config::for_data_dir(dir);
        let pool = db::create_pool(&config.db_path()).unwrap();
        db::run_migrations(&pool).unwrap();
        app(AppState::new(pool, config), test_seed)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn non_blank_trims_and_drops_empty() {
        assert_eq!(non_blank(Some("  hi ".into())).as_deref(), Some("hi"));
        assert_eq!(non_blank(Some(" \n\t".into())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn check_length_counts_characters_not_bytes() {
        assert!(check_length("title", &"議".repeat(3), 3).is_ok());
        let err = check_length("title", &"議".repeat(4), 3).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(m) if m == "title must be 3 characters or less"));
    }

    #[tokio::test]
    async fn health_responds_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let response = test_app(tmp.path(), false)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn seed_route_is_absent_unless_enabled() {
        let tmp = tempfile::tempdir().unwrap();
        let response = test_app(tmp.path(), false)
            .oneshot(Request::get("/test/seed").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = test_app(tmp.path(), true)
            .oneshot(Request::get("/test/seed").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn malformed_json_is_a_json_400() {
        let tmp = tempfile::tempdir().unwrap();
        let response = test_app(tmp.path(), false)
            .oneshot(
                Request::post("/bills")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_bill_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let response = test_app(tmp.path(), false)
            .oneshot(Request::get("/bills/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Not found");
    }
}
