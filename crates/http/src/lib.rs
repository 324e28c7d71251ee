//! Hireflow HTTP layer
//!
//! Wire types for the auth REST API, a typed client for it (feature
//! `client`) and the request-level route guard (feature `server`).

pub mod types;

#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "server")]
pub mod middleware;

#[cfg(feature = "client")]
pub use client::{PortalClient, error::ClientError};
#[cfg(feature = "server")]
pub use middleware::{RoutePolicy, route_guard};
