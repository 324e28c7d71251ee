//! Request-level route protection
//!
//! A coarse gate in front of page rendering: protected pages are only served
//! when the request carries at least one session cookie. Cookie values are
//! never parsed or validated here; the session layer does that once the page
//! loads.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::HeaderMap;
use http::header::COOKIE;
use std::sync::Arc;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Query parameter carrying the originally requested path
pub const REDIRECT_PARAM: &str = "redirect";

/// Classification of a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Static files and framework internals
    Asset,
    Public,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Redirect to the given location
    Redirect(String),
}

/// Presence of the session cookies on a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCookies {
    pub access_token: bool,
    pub refresh_token: bool,
}

impl SessionCookies {
    /// Scan every `Cookie` header; empty values count as absent
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Self::default();
        for value in headers.get_all(COOKIE) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            for pair in value.split(';') {
                let Some((name, value)) = pair.split_once('=') else {
                    continue;
                };
                let present = !value.trim().trim_matches('"').is_empty();
                match name.trim() {
                    ACCESS_TOKEN_COOKIE => cookies.access_token |= present,
                    REFRESH_TOKEN_COOKIE => cookies.refresh_token |= present,
                    _ => {}
                }
            }
        }
        cookies
    }

    pub const fn any(self) -> bool {
        self.access_token || self.refresh_token
    }
}

/// The single path-classification table for the portal
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    /// Paths that are public only on an exact match
    pub public_exact: Vec<String>,
    /// Public path prefixes, matched on segment boundaries
    pub public_prefixes: Vec<String>,
    /// Known protected sections. Anything unclassified is protected as well;
    /// the list exists so the table documents the portal's sections.
    pub protected_prefixes: Vec<String>,
    pub asset_prefixes: Vec<String>,
    /// File extensions served without a session, lowercase without the dot
    pub asset_extensions: Vec<String>,
    /// Landing/login surface that unauthenticated requests are sent to
    pub login_path: String,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| (*s).to_string()).collect()
        }

        Self {
            public_exact: owned(&["/"]),
            public_prefixes: owned(&[
                "/login",
                "/register",
                "/forgot-password",
                "/reset-password",
                "/verify-email",
                "/auth",
            ]),
            protected_prefixes: owned(&[
                "/dashboard",
                "/interviews",
                "/applications",
                "/candidates",
                "/notifications",
                "/settings",
                "/profile",
            ]),
            asset_prefixes: owned(&["/_next/", "/static/", "/assets/", "/api/"]),
            asset_extensions: owned(&[
                "js", "css", "map", "wasm", "png", "jpg", "jpeg", "gif", "svg", "ico", "webp",
                "woff", "woff2", "ttf", "txt", "xml", "json",
            ]),
            login_path: "/".to_string(),
        }
    }
}

impl RoutePolicy {
    pub fn classify(&self, path: &str) -> PathClass {
        if self.is_asset(path) {
            return PathClass::Asset;
        }
        if self.public_exact.iter().any(|p| p == path)
            || self
                .public_prefixes
                .iter()
                .any(|prefix| matches_prefix(path, prefix))
        {
            return PathClass::Public;
        }
        PathClass::Protected
    }

    /// Decide what to do with a request for `path`
    pub fn evaluate(&self, path: &str, cookies: SessionCookies) -> GuardDecision {
        match self.classify(path) {
            PathClass::Asset | PathClass::Public => GuardDecision::Allow,
            PathClass::Protected if cookies.any() => GuardDecision::Allow,
            PathClass::Protected => GuardDecision::Redirect(self.redirect_location(path)),
        }
    }

    /// Login location carrying `original` for the post-login redirect
    pub fn redirect_location(&self, original: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(REDIRECT_PARAM, original)
            .finish();
        format!("{}?{query}", self.login_path)
    }

    /// The known protected section a path belongs to, if any
    pub fn section(&self, path: &str) -> Option<&str> {
        self.protected_prefixes
            .iter()
            .find(|prefix| matches_prefix(path, prefix))
            .map(String::as_str)
    }

    fn is_asset(&self, path: &str) -> bool {
        if self
            .asset_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return true;
        }
        let last_segment = path.rsplit('/').next().unwrap_or_default();
        last_segment
            .rsplit_once('.')
            .is_some_and(|(stem, ext)| {
                !stem.is_empty()
                    && self
                        .asset_extensions
                        .iter()
                        .any(|e| e.eq_ignore_ascii_case(ext))
            })
    }
}

/// `/login` matches `/login` and `/login/...` but not `/loginx`
fn matches_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Route guard middleware, mounted with `axum::middleware::from_fn_with_state`
pub async fn route_guard(
    State(policy): State<Arc<RoutePolicy>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    let cookies = SessionCookies::from_headers(req.headers());

    match policy.evaluate(&path, cookies) {
        GuardDecision::Allow => next.run(req).await,
        GuardDecision::Redirect(location) => {
            tracing::debug!(
                path = %path,
                section = policy.section(&path).unwrap_or("unclassified"),
                %location,
                "redirecting request without session cookies"
            );
            Redirect::temporary(&location).into_response()
        }
    }
}
