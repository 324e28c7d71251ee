//! Middleware components for HTTP request processing

pub mod route_guard;

pub use route_guard::{
    ACCESS_TOKEN_COOKIE, GuardDecision, PathClass, REDIRECT_PARAM, REFRESH_TOKEN_COOKIE,
    RoutePolicy, SessionCookies, route_guard,
};
