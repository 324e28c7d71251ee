//! Hireflow core types and utilities

pub mod clock;
pub mod error;
pub mod session;
#[cfg(feature = "tracing")]
pub mod tracing;
pub mod types;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult};
pub use session::SessionRecord;
pub use types::{AccessLevel, Permission, Role, UserProfile};
