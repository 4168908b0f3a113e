//! Admin console authentication via a static-credential cookie
//!
//! # Architecture
//!
//! - One admin account, credentials from `ADMIN_USER` / `ADMIN_PASSWORD`
//! - Login sets `admin_auth=<token>`, the token being the SHA-256 hex
//!   digest of `"<user>:<password>"`
//! - The cookie lives for 8 hours; logout expires it immediately
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies. The axum middleware lives in `sig-admin`.

use sha2::{Digest, Sha256};

/// Cookie carrying the admin session token
pub const AUTH_COOKIE: &str = "admin_auth";

/// Session lifetime in seconds (8 hours)
pub const SESSION_MAX_AGE_SECS: u64 = 8 * 60 * 60;

/// Landing page after login when no usable `from` target is given
pub const DEFAULT_REDIRECT: &str = "/admin";

pub const DEFAULT_ADMIN_USER: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

// ========================================
// Credentials
// ========================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read `ADMIN_USER` / `ADMIN_PASSWORD`, falling back to the defaults
    pub fn from_env() -> Self {
        let username = std::env::var("ADMIN_USER")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_USER.to_string());
        let password = std::env::var("ADMIN_PASSWORD")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());
        if password == DEFAULT_ADMIN_PASSWORD {
            tracing::warn!("ADMIN_PASSWORD not set, using the default admin password");
        }
        Self { username, password }
    }

    /// Check a submitted login form
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }

    /// Session token stored in the auth cookie
    pub fn session_token(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.username.as_bytes());
        hasher.update(b":");
        hasher.update(self.password.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Whether a `Cookie` request header carries a valid session
    pub fn verify_cookie_header(&self, header: Option<&str>) -> bool {
        header
            .and_then(|h| cookie_value(h, AUTH_COOKIE))
            .map(|token| token == self.session_token())
            .unwrap_or(false)
    }

    /// `Set-Cookie` value issued on successful login
    pub fn login_cookie(&self) -> String {
        format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            AUTH_COOKIE,
            self.session_token(),
            SESSION_MAX_AGE_SECS
        )
    }
}

// ========================================
// Cookie helpers
// ========================================

/// `Set-Cookie` value that expires the session
pub fn logout_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", AUTH_COOKIE)
}

/// Value of cookie `name` in a `Cookie` header (`a=1; b=2`)
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim())
    })
}

/// Login page URL remembering the page that was asked for
pub fn login_url(from: &str) -> String {
    format!("/login?from={}", urlencoding::encode(from))
}

/// Restrict post-login redirects to local absolute paths
///
/// `//host` and `/\host` are rejected since browsers treat them as
/// protocol-relative URLs.
pub fn sanitize_redirect(from: Option<&str>) -> String {
    match from.map(str::trim) {
        Some(target)
            if target.starts_with('/')
                && !target.starts_with("//")
                && !target.starts_with("/\\") =>
        {
            target.to_string()
        }
        _ => DEFAULT_REDIRECT.to_string(),
    }
}
