//! Admin session: cookie check middleware, login and logout

use axum::{
    extract::{Request, State},
    http::header::{COOKIE, LOCATION, SET_COOKIE},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sig_common::auth::{login_url, logout_cookie, sanitize_redirect};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::AppState;

/// Session check for protected routes
///
/// API calls get 401 JSON so scripts can react; page requests are sent
/// to the login page with the original path in `from`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let cookie_header = request
        .headers()
        .get(COOKIE)
        .and_then(|value| value.to_str().ok());

    if state.credentials.verify_cookie_header(cookie_header) {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    if path.starts_with("/api/") {
        warn!("Rejected unauthenticated API request: {}", path);
        return ApiError::Unauthorized("Admin session required".to_string()).into_response();
    }

    Redirect::to(&login_url(&path)).into_response()
}

/// Login form fields
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub from: Option<String>,
}

/// POST /login
///
/// Always answers 303 so the browser follows up with a GET.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if !state.credentials.matches(&form.username, &form.password) {
        warn!("Failed admin login for user {:?}", form.username);
        return Redirect::to("/login?error=invalid").into_response();
    }

    let target = sanitize_redirect(form.from.as_deref());
    info!("Admin logged in, redirecting to {}", target);
    (
        StatusCode::SEE_OTHER,
        [
            (SET_COOKIE, state.credentials.login_cookie()),
            (LOCATION, target),
        ],
    )
        .into_response()
}

/// GET /logout
pub async fn logout() -> Response {
    (
        StatusCode::SEE_OTHER,
        [(SET_COOKIE, logout_cookie()), (LOCATION, "/".to_string())],
    )
        .into_response()
}
