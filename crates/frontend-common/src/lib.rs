//! Session lifecycle for the Hireflow portal frontends
//!
//! The [`AuthProvider`] owns a single [`AuthStore`] and its [`TokenManager`].
//! The session record is persisted through [`SessionStorage`] so that every
//! tab of a browser profile sees the same session.

pub mod auth;
pub mod config;
pub mod services;
pub mod storage;

pub use auth::{AuthProvider, AuthState, AuthStore, LogoutReason, SessionEvent, TokenManager};
pub use config::{AppConfig, SessionConfig};
pub use services::AuthApi;
pub use storage::{MemoryStorage, SessionRecordStore, SessionStorage, StorageError};
