//! Authentication module

pub mod context;
pub mod error_messages;
pub mod provider;
pub mod store;
pub mod token_manager;

// Re-export commonly used items
pub use context::{AuthAction, AuthState, LogoutReason, SessionEvent};
pub use provider::AuthProvider;
pub use store::{AuthStore, RefreshOutcome};
pub use token_manager::{CheckOutcome, TokenManager};
