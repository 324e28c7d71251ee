//! In-memory portal backend for session lifecycle tests

#![allow(dead_code)]

use async_trait::async_trait;
use hireflow_core::{ManualClock, Role, UserProfile};
use hireflow_frontend_common::{
    AuthApi, AuthStore, MemoryStorage, SessionConfig, SessionRecordStore,
};
use hireflow_http::client::error::ClientError;
use hireflow_http::types::{
    LoginRequest, LoginResponse, MessageResponse, PasswordResetRequest, RefreshResponse,
    RegisterRequest, RegisterResponse, ResetPasswordRequest, TokenExpiry, VerifyEmailRequest,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub const NOW: i64 = 1_700_000_000_000;
pub const EMAIL: &str = "casey@example.com";
pub const PASSWORD: &str = "first-pass";

#[derive(Default)]
struct Accounts {
    passwords: HashMap<String, String>,
    reset_tokens: HashMap<String, String>,
    signed_in: bool,
    next_token: u32,
}

/// Backend double holding one account. Cookies are modelled as a single
/// signed-in flag shared by every tab.
pub struct FakePortal {
    accounts: Mutex<Accounts>,
    pub me_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    // Refresh requests wait for a permit when gated
    refresh_gate: Option<Semaphore>,
}

impl FakePortal {
    pub fn new() -> Self {
        let mut accounts = Accounts::default();
        accounts
            .passwords
            .insert(EMAIL.to_string(), PASSWORD.to_string());
        Self {
            accounts: Mutex::new(accounts),
            me_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            refresh_gate: None,
        }
    }

    /// Refresh calls block until [`FakePortal::release_refresh`]
    pub fn with_gated_refresh() -> Self {
        Self {
            refresh_gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn release_refresh(&self) {
        if let Some(gate) = &self.refresh_gate {
            gate.add_permits(1);
        }
    }

    /// The reset token most recently mailed to `email`
    pub fn mailed_token(&self, email: &str) -> Option<String> {
        self.accounts
            .lock()
            .unwrap()
            .reset_tokens
            .iter()
            .find(|(_, owner)| owner.as_str() == email)
            .map(|(token, _)| token.clone())
    }

    fn user() -> UserProfile {
        UserProfile {
            id: "u-42".to_string(),
            name: "Casey".to_string(),
            email: EMAIL.to_string(),
            role: Role::User,
            is_email_verified: true,
            permissions: Vec::new(),
        }
    }

    fn require_session(&self) -> Result<(), ClientError> {
        if self.accounts.lock().unwrap().signed_in {
            Ok(())
        } else {
            Err(ClientError::AuthenticationFailed("Not authenticated".to_string()))
        }
    }
}

#[async_trait]
impl AuthApi for FakePortal {
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ClientError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.passwords.get(&request.email) != Some(&request.password) {
            return Err(ClientError::AuthenticationFailed(String::new()));
        }
        accounts.signed_in = true;
        Ok(LoginResponse {
            user: Self::user(),
            message: Some("Login successful".to_string()),
            expiry: TokenExpiry {
                access_token_expires_at: None,
                expires_in: Some(900),
            },
        })
    }

    async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse, ClientError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.passwords.contains_key(&request.email) {
            return Err(ClientError::BadRequest("Email already registered".to_string()));
        }
        accounts.passwords.insert(request.email, request.password);
        Ok(RegisterResponse::default())
    }

    async fn logout(&self) -> Result<MessageResponse, ClientError> {
        self.accounts.lock().unwrap().signed_in = false;
        Ok(MessageResponse::default())
    }

    async fn refresh(&self) -> Result<RefreshResponse, ClientError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.refresh_gate {
            gate.acquire().await.unwrap().forget();
        }
        self.require_session()?;
        Ok(RefreshResponse {
            message: None,
            expiry: TokenExpiry {
                access_token_expires_at: None,
                expires_in: Some(900),
            },
        })
    }

    async fn verify_email(
        &self,
        _request: VerifyEmailRequest,
    ) -> Result<MessageResponse, ClientError> {
        self.require_session()?;
        Ok(MessageResponse::default())
    }

    async fn request_password_reset(
        &self,
        request: PasswordResetRequest,
    ) -> Result<MessageResponse, ClientError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.passwords.contains_key(&request.email) {
            accounts.next_token += 1;
            let token = format!("reset-{}", accounts.next_token);
            accounts.reset_tokens.insert(token, request.email);
        }
        Ok(MessageResponse::default())
    }

    async fn reset_password(
        &self,
        request: ResetPasswordRequest,
    ) -> Result<MessageResponse, ClientError> {
        let mut accounts = self.accounts.lock().unwrap();
        let Some(email) = accounts.reset_tokens.remove(&request.token) else {
            return Err(ClientError::BadRequest(
                "Invalid or expired reset token".to_string(),
            ));
        };
        accounts.passwords.insert(email, request.new_password);
        Ok(MessageResponse::default())
    }

    async fn current_user(&self) -> Result<UserProfile, ClientError> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        self.require_session()?;
        Ok(Self::user())
    }
}

/// A browser tab: its own store over the shared storage and backend
pub fn open_tab(portal: &Arc<FakePortal>, storage: &MemoryStorage, clock: &ManualClock) -> Arc<AuthStore> {
    Arc::new(AuthStore::new(
        portal.clone(),
        SessionRecordStore::new(Arc::new(storage.clone()), "hireflow"),
        Arc::new(clock.clone()),
        SessionConfig::default(),
    ))
}
