//! User-friendly error message mappings

use hireflow_http::client::error::ClientError;

pub const NETWORK_ERROR: &str = "Unable to reach the server. Check your connection and try again.";
pub const UNEXPECTED_ERROR: &str = "Something went wrong. Please try again.";
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Convert a client error into text fit for an inline form message.
///
/// Status errors carry the backend's own wording when it sent one; transport
/// and decoding failures get a generic message.
pub fn user_facing(error: &ClientError) -> String {
    match error {
        ClientError::Request(_) if error.status().is_none() => NETWORK_ERROR.to_string(),
        ClientError::Request(_) | ClientError::Serialization(_) | ClientError::Configuration(_) => {
            UNEXPECTED_ERROR.to_string()
        }
        ClientError::ServerError { status, .. } if *status >= 500 => error
            .server_message()
            .filter(|m| !looks_internal(m))
            .map_or_else(|| UNEXPECTED_ERROR.to_string(), str::to_string),
        _ => error
            .server_message()
            .filter(|m| !m.trim().is_empty())
            .map_or_else(|| UNEXPECTED_ERROR.to_string(), str::to_string),
    }
}

/// Login failures without a backend message fall back to the credentials hint
pub fn login_failure(error: &ClientError) -> String {
    let generic = |m: &str| m.trim().is_empty() || m == "Unauthorized" || m == "Forbidden";
    if error.is_auth_expired() && error.server_message().is_none_or(generic) {
        return INVALID_CREDENTIALS.to_string();
    }
    user_facing(error)
}

// Stack traces and HTML error pages are not for users
fn looks_internal(message: &str) -> bool {
    let trimmed = message.trim_start();
    trimmed.is_empty() || trimmed.starts_with('<') || message.contains("\n    at ")
}
