//! Auth store: the single source of truth for authentication state
//!
//! Every operation resolves without returning an error. Outcomes are
//! observable through [`AuthStore::state`], a `watch` subscription and the
//! [`SessionEvent`] broadcast.

use super::context::{AuthAction, AuthState, LogoutReason, SessionEvent};
use super::error_messages::{self, SESSION_EXPIRED};
use crate::config::SessionConfig;
use crate::services::AuthApi;
use crate::storage::{ExpiryCommit, SessionRecordStore, StorageError};
use hireflow_core::session::duration_ms;
use hireflow_core::validation::{validate_email, validate_password, validate_required};
use hireflow_core::{Clock, CoreResult, SessionRecord};
use hireflow_http::client::error::ClientError;
use hireflow_http::types::{
    LoginRequest, PasswordResetRequest, RefreshResponse, RegisterRequest, ResetPasswordRequest,
    VerifyEmailRequest,
};
use std::sync::{Arc, PoisonError};
use tokio::sync::{Mutex, OnceCell, broadcast, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 32;

const STORAGE_FAILURE: &str = "Could not save your session in this browser.";
const REGISTERED: &str = "Registration successful. Check your email to verify your account.";
const RESET_REQUESTED: &str = "If an account exists for that email, a reset link is on its way.";
const PASSWORD_RESET: &str = "Your password has been reset. You can now log in.";
const EMAIL_VERIFIED: &str = "Your email has been verified.";

/// Result of a refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    /// Another refresh was already running; this one was suppressed
    InFlight,
    /// The response arrived after the session ended or changed
    Discarded,
    /// The backend refused the refresh for a reason other than the session;
    /// reported as `error`, the session is kept
    Failed,
    /// The refresh failed and the session was cleared
    LoggedOut,
    /// There was no session to refresh
    NoSession,
}

pub struct AuthStore {
    api: Arc<dyn AuthApi>,
    records: SessionRecordStore,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    state: watch::Sender<AuthState>,
    events: broadcast::Sender<SessionEvent>,
    initialized: OnceCell<()>,
    refresh_gate: Mutex<()>,
    // Serializes starting and ending sessions
    session_lock: std::sync::Mutex<()>,
}

impl AuthStore {
    pub fn new(
        api: Arc<dyn AuthApi>,
        records: SessionRecordStore,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            records,
            clock,
            config,
            state,
            events,
            initialized: OnceCell::new(),
            refresh_gate: Mutex::new(()),
            session_lock: std::sync::Mutex::new(()),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// The persisted record, as every tab currently sees it
    pub fn session_record(&self) -> Option<SessionRecord> {
        self.records.load()
    }

    /// A user is loaded and the persisted access token has not expired
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().user.is_some()
            && self
                .records
                .load()
                .is_some_and(|record| !record.is_expired(self.clock.now_ms()))
    }

    /// Resolve the current user once per application.
    ///
    /// Concurrent callers wait for the same resolution; later calls return
    /// immediately.
    pub async fn initialize(&self) {
        self.initialized
            .get_or_init(|| self.resolve_current_user())
            .await;
    }

    pub async fn login(&self, email: &str, password: &str) {
        if let Err(e) = validate_credentials(email, password) {
            self.dispatch(AuthAction::Failed(e.to_string()));
            return;
        }

        self.dispatch(AuthAction::Begin);
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        match self.api.login(request).await {
            Ok(response) => {
                let now = self.clock.now_ms();
                let expiry = response
                    .expiry
                    .resolve(now, duration_ms(self.config.access_token_lifetime));
                match self.establish_session(expiry, now) {
                    Ok(session_id) => {
                        info!(user_id = %response.user.id, "logged in");
                        self.dispatch(AuthAction::LoggedIn {
                            user: response.user,
                            message: response.message,
                        });
                        self.emit(SessionEvent::LoggedIn { session_id });
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to persist session record");
                        self.dispatch(AuthAction::Failed(STORAGE_FAILURE.to_string()));
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                self.dispatch(AuthAction::Failed(error_messages::login_failure(&e)));
            }
        }
    }

    /// Create an account. No session is established; the address has to be
    /// verified first.
    pub async fn register(&self, name: &str, email: &str, password: &str) {
        let validated = validate_required(name, "name")
            .and_then(|()| validate_credentials(email, password));
        if let Err(e) = validated {
            self.dispatch(AuthAction::Failed(e.to_string()));
            return;
        }

        self.dispatch(AuthAction::Begin);
        let request = RegisterRequest {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        match self.api.register(request).await {
            Ok(response) => self.dispatch(AuthAction::Succeeded {
                message: response.message.or_else(|| Some(REGISTERED.to_string())),
            }),
            Err(e) => self.fail_authenticated("registration", &e),
        }
    }

    /// Sign out. Local state is always cleared, even when the server call
    /// fails.
    pub async fn logout(&self) {
        self.dispatch(AuthAction::SetLoading(true));

        let error = match self.api.logout().await {
            Ok(_) => None,
            // The server no longer knows the session either
            Err(e) if e.is_auth_expired() => None,
            Err(e) => {
                warn!(error = %e, "server logout failed, clearing local session anyway");
                Some(error_messages::user_facing(&e))
            }
        };

        let _guard = self.session_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.records.clear();
        self.dispatch(AuthAction::LoggedOut { error });
        info!("logged out");
        self.emit(SessionEvent::LoggedOut {
            reason: LogoutReason::UserRequested,
        });
    }

    /// Exchange a one-time verification token
    pub async fn verify_email(&self, token: &str) {
        if let Err(e) = validate_required(token, "token") {
            self.dispatch(AuthAction::Failed(e.to_string()));
            return;
        }

        self.dispatch(AuthAction::Begin);
        let request = VerifyEmailRequest {
            token: token.trim().to_string(),
        };

        match self.api.verify_email(request).await {
            Ok(response) => {
                info!("email verified");
                self.dispatch(AuthAction::EmailVerified {
                    message: response.message.or_else(|| Some(EMAIL_VERIFIED.to_string())),
                });
            }
            Err(e) => self.fail_authenticated("email verification", &e),
        }
    }

    pub async fn request_password_reset(&self, email: &str) {
        if let Err(e) = validate_email(email) {
            self.dispatch(AuthAction::Failed(e.to_string()));
            return;
        }

        self.dispatch(AuthAction::Begin);
        let request = PasswordResetRequest {
            email: email.trim().to_string(),
        };

        match self.api.request_password_reset(request).await {
            Ok(response) => self.dispatch(AuthAction::Succeeded {
                message: response.message.or_else(|| Some(RESET_REQUESTED.to_string())),
            }),
            Err(e) => self.fail_authenticated("password reset request", &e),
        }
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) {
        let validated =
            validate_required(token, "token").and_then(|()| validate_password(new_password));
        if let Err(e) = validated {
            self.dispatch(AuthAction::Failed(e.to_string()));
            return;
        }

        self.dispatch(AuthAction::Begin);
        let request = ResetPasswordRequest {
            token: token.trim().to_string(),
            new_password: new_password.to_string(),
        };

        match self.api.reset_password(request).await {
            Ok(response) => self.dispatch(AuthAction::Succeeded {
                message: response.message.or_else(|| Some(PASSWORD_RESET.to_string())),
            }),
            Err(e) => self.fail_authenticated("password reset", &e),
        }
    }

    /// Refresh the access token.
    ///
    /// Transport and server failures are retried with a fixed delay up to the
    /// configured attempt count; a rejected refresh or exhausted retries clear
    /// the session. Other client errors are reported once and not retried.
    pub async fn refresh_token(&self) -> RefreshOutcome {
        let Ok(_gate) = self.refresh_gate.try_lock() else {
            debug!("refresh already in flight");
            return RefreshOutcome::InFlight;
        };

        let Some(record) = self.records.load() else {
            return if self.force_logout(LogoutReason::RecordMissing) {
                RefreshOutcome::LoggedOut
            } else {
                RefreshOutcome::NoSession
            };
        };

        let attempts = self.config.max_refresh_attempts.max(1);
        for attempt in 1..=attempts {
            match self.api.refresh().await {
                Ok(response) => return self.apply_refresh(&record.session_id, &response),
                Err(e) if e.is_auth_expired() => {
                    if !self.is_current_session(&record.session_id) {
                        return RefreshOutcome::Discarded;
                    }
                    warn!(error = %e, "refresh rejected by server");
                    self.force_logout(LogoutReason::Unauthorized);
                    return RefreshOutcome::LoggedOut;
                }
                Err(e) if !e.is_retryable() => {
                    if !self.is_current_session(&record.session_id) {
                        return RefreshOutcome::Discarded;
                    }
                    warn!(error = %e, "token refresh failed");
                    self.dispatch(AuthAction::Failed(error_messages::user_facing(&e)));
                    return RefreshOutcome::Failed;
                }
                Err(e) => {
                    warn!(attempt, max_attempts = attempts, error = %e, "token refresh failed");
                }
            }

            if !self.is_current_session(&record.session_id) {
                return RefreshOutcome::Discarded;
            }
            if attempt < attempts {
                tokio::time::sleep(self.config.refresh_retry_delay).await;
            }
        }

        self.force_logout(LogoutReason::RefreshExhausted);
        RefreshOutcome::LoggedOut
    }

    /// Clear the session without contacting the server.
    ///
    /// Returns false, and changes nothing, when there was no session left to
    /// clear.
    pub fn force_logout(&self, reason: LogoutReason) -> bool {
        let _guard = self.session_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let had_session = self.state.borrow().user.is_some() || self.records.load().is_some();
        if !had_session {
            return false;
        }

        warn!(?reason, "session invalidated");
        self.records.clear();
        self.dispatch(AuthAction::LoggedOut {
            error: Some(SESSION_EXPIRED.to_string()),
        });
        self.emit(SessionEvent::LoggedOut { reason });
        true
    }

    /// Note user activity on the shared record
    pub fn record_activity(&self) {
        match self.records.touch(self.clock.now_ms()) {
            Ok(true) => debug!("activity recorded"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "failed to record activity"),
        }
    }

    pub fn clear_error(&self) {
        self.dispatch(AuthAction::ClearError);
    }

    pub fn clear_message(&self) {
        self.dispatch(AuthAction::ClearMessage);
    }

    async fn resolve_current_user(&self) {
        self.dispatch(AuthAction::SetLoading(true));

        match self.api.current_user().await {
            Ok(user) => {
                let now = self.clock.now_ms();
                let session_id = match self.records.load() {
                    Some(record) if !record.is_expired(now) => Ok(record.session_id),
                    _ => self.establish_session(
                        now.saturating_add(duration_ms(self.config.access_token_lifetime)),
                        now,
                    ),
                };
                match session_id {
                    Ok(session_id) => {
                        info!(user_id = %user.id, "session restored");
                        self.dispatch(AuthAction::LoggedIn {
                            user,
                            message: None,
                        });
                        self.emit(SessionEvent::LoggedIn { session_id });
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to persist session record");
                        self.dispatch(AuthAction::Failed(STORAGE_FAILURE.to_string()));
                    }
                }
            }
            Err(e) if e.is_auth_expired() => {
                debug!("no active session");
                self.records.clear();
            }
            Err(e) => {
                warn!(error = %e, "failed to resolve current user");
                self.dispatch(AuthAction::Failed(error_messages::user_facing(&e)));
            }
        }

        self.dispatch(AuthAction::Initialized);
    }

    fn apply_refresh(&self, session_id: &str, response: &RefreshResponse) -> RefreshOutcome {
        if !self.is_current_session(session_id) {
            debug!("discarding refresh for an ended session");
            return RefreshOutcome::Discarded;
        }

        let now = self.clock.now_ms();
        let expiry = response
            .expiry
            .resolve(now, duration_ms(self.config.access_token_lifetime));

        match self.records.commit_expiry(session_id, expiry) {
            Ok(ExpiryCommit::Advanced) => {
                debug!(token_expiry_ms = expiry, "access token refreshed");
                self.emit(SessionEvent::Refreshed {
                    token_expiry_ms: expiry,
                });
                RefreshOutcome::Refreshed
            }
            Ok(ExpiryCommit::Stale) => {
                debug!("stored expiry is already newer");
                RefreshOutcome::Refreshed
            }
            Ok(ExpiryCommit::SessionChanged) => RefreshOutcome::Discarded,
            Err(e) => {
                warn!(error = %e, "failed to persist refreshed expiry");
                RefreshOutcome::Refreshed
            }
        }
    }

    fn establish_session(&self, token_expiry_ms: i64, now_ms: i64) -> Result<String, StorageError> {
        let _guard = self.session_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let record = SessionRecord::new(Uuid::new_v4().to_string(), token_expiry_ms, now_ms);
        self.records.establish(&record)?;
        Ok(record.session_id)
    }

    fn is_current_session(&self, session_id: &str) -> bool {
        self.records
            .load()
            .is_some_and(|record| record.session_id == session_id)
    }

    /// A rejected session ends it; anything else is reported
    fn fail_authenticated(&self, operation: &str, error: &ClientError) {
        warn!(error = %error, "{operation} failed");
        if error.is_auth_expired() && self.force_logout(LogoutReason::Unauthorized) {
            return;
        }
        self.dispatch(AuthAction::Failed(error_messages::user_facing(error)));
    }

    fn dispatch(&self, action: AuthAction) {
        self.state.send_modify(|state| state.reduce(action));
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

fn validate_credentials(email: &str, password: &str) -> CoreResult<()> {
    validate_email(email)?;
    validate_password(password)
}
