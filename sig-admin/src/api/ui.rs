//! Login and console pages

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

const LOGIN_HTML: &str = include_str!("../../ui/login.html");
const ADMIN_HTML: &str = include_str!("../../ui/admin.html");
const ADMIN_JS: &str = include_str!("../../ui/admin.js");

/// GET /login
pub async fn serve_login() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

/// GET /admin
pub async fn serve_admin() -> Html<&'static str> {
    Html(ADMIN_HTML)
}

/// GET /static/admin.js
pub async fn serve_admin_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        ADMIN_JS,
    )
        .into_response()
}
