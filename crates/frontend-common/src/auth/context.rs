//! Authentication state and the actions that change it

use hireflow_core::UserProfile;

/// Authentication state observed by the views
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<UserProfile>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Last informational message from the backend
    pub message: Option<String>,
    pub is_email_verified: bool,
    pub is_initialized: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true, // Start with loading until the stored session is resolved
            error: None,
            message: None,
            is_email_verified: false,
            is_initialized: false,
        }
    }
}

/// Authentication state actions
#[derive(Debug, Clone)]
pub enum AuthAction {
    /// An operation started; clears stale feedback
    Begin,
    SetLoading(bool),
    LoggedIn {
        user: UserProfile,
        message: Option<String>,
    },
    /// A fire-and-report operation succeeded
    Succeeded { message: Option<String> },
    Failed(String),
    EmailVerified { message: Option<String> },
    /// The session ended. `error` is only replaced when one is given.
    LoggedOut { error: Option<String> },
    Initialized,
    ClearError,
    ClearMessage,
}

impl AuthState {
    pub fn reduce(&mut self, action: AuthAction) {
        match action {
            AuthAction::Begin => {
                self.is_loading = true;
                self.error = None;
                self.message = None;
            }
            AuthAction::SetLoading(is_loading) => self.is_loading = is_loading,
            AuthAction::LoggedIn { user, message } => {
                if self.user.as_ref().is_some_and(|u| u.id != user.id) {
                    self.is_email_verified = false;
                }
                self.user = Some(user);
                self.is_loading = false;
                self.error = None;
                self.message = message;
            }
            AuthAction::Succeeded { message } => {
                self.is_loading = false;
                self.error = None;
                self.message = message;
            }
            AuthAction::Failed(error) => {
                self.is_loading = false;
                self.error = Some(error);
            }
            AuthAction::EmailVerified { message } => {
                self.is_email_verified = true;
                self.is_loading = false;
                self.error = None;
                self.message = message;
            }
            AuthAction::LoggedOut { error } => {
                self.user = None;
                self.is_loading = false;
                self.is_email_verified = false;
                self.message = None;
                if error.is_some() {
                    self.error = error;
                }
            }
            AuthAction::Initialized => {
                self.is_initialized = true;
                self.is_loading = false;
            }
            AuthAction::ClearError => self.error = None,
            AuthAction::ClearMessage => self.message = None,
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The user signed out
    UserRequested,
    /// The access token expiry passed
    Expired,
    /// The persisted record disappeared, e.g. another tab signed out
    RecordMissing,
    /// The backend rejected the session credentials
    Unauthorized,
    /// Proactive refresh failed on every attempt
    RefreshExhausted,
}

impl LogoutReason {
    /// The session ended without the user asking for it
    pub const fn is_forced(self) -> bool {
        !matches!(self, Self::UserRequested)
    }
}

/// Session lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { session_id: String },
    Refreshed { token_expiry_ms: i64 },
    LoggedOut { reason: LogoutReason },
}

#[cfg(test)]
mod tests {
    use super::*;
    use hireflow_core::Role;

    fn user(id: &str) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            name: "Alex".to_string(),
            email: "alex@example.com".to_string(),
            role: Role::User,
            is_email_verified: false,
            permissions: Vec::new(),
        }
    }

    #[test]
    fn test_begin_clears_feedback() {
        let mut state = AuthState {
            error: Some("old".to_string()),
            message: Some("older".to_string()),
            is_loading: false,
            ..AuthState::default()
        };
        state.reduce(AuthAction::Begin);
        assert!(state.is_loading);
        assert!(state.error.is_none());
        assert!(state.message.is_none());
    }

    #[test]
    fn test_logout_keeps_error_unless_given() {
        let mut state = AuthState {
            user: Some(user("1")),
            error: Some("earlier".to_string()),
            ..AuthState::default()
        };
        state.reduce(AuthAction::LoggedOut { error: None });
        assert!(state.user.is_none());
        assert_eq!(state.error.as_deref(), Some("earlier"));

        state.reduce(AuthAction::LoggedOut {
            error: Some("expired".to_string()),
        });
        assert_eq!(state.error.as_deref(), Some("expired"));
    }

    #[test]
    fn test_only_user_logout_is_unforced() {
        assert!(!LogoutReason::UserRequested.is_forced());
        for reason in [
            LogoutReason::Expired,
            LogoutReason::RecordMissing,
            LogoutReason::Unauthorized,
            LogoutReason::RefreshExhausted,
        ] {
            assert!(reason.is_forced(), "{reason:?}");
        }
    }

    #[test]
    fn test_verified_flag_survives_same_user_login() {
        let mut state = AuthState::default();
        state.reduce(AuthAction::LoggedIn {
            user: user("1"),
            message: None,
        });
        state.reduce(AuthAction::EmailVerified { message: None });
        state.reduce(AuthAction::Failed("boom".to_string()));
        state.reduce(AuthAction::LoggedIn {
            user: user("1"),
            message: None,
        });
        assert!(state.is_email_verified);

        state.reduce(AuthAction::LoggedIn {
            user: user("2"),
            message: None,
        });
        assert!(!state.is_email_verified);
    }

    #[test]
    fn test_initialized_is_sticky() {
        let mut state = AuthState::default();
        state.reduce(AuthAction::Initialized);
        state.reduce(AuthAction::LoggedOut { error: None });
        assert!(state.is_initialized);
        assert!(!state.is_loading);
    }
}
