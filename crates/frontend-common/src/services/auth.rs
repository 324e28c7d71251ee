//! Authentication API service
//!
//! `AuthApi` is the seam between the session layer and the REST backend.

use async_trait::async_trait;
use hireflow_core::UserProfile;
use hireflow_http::client::{PortalClient, error::ClientError};
use hireflow_http::types::{
    LoginRequest, LoginResponse, MessageResponse, PasswordResetRequest, RefreshResponse,
    RegisterRequest, RegisterResponse, ResetPasswordRequest, VerifyEmailRequest,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ClientError>;

    async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse, ClientError>;

    async fn logout(&self) -> Result<MessageResponse, ClientError>;

    async fn refresh(&self) -> Result<RefreshResponse, ClientError>;

    async fn verify_email(&self, request: VerifyEmailRequest)
    -> Result<MessageResponse, ClientError>;

    async fn request_password_reset(
        &self,
        request: PasswordResetRequest,
    ) -> Result<MessageResponse, ClientError>;

    async fn reset_password(
        &self,
        request: ResetPasswordRequest,
    ) -> Result<MessageResponse, ClientError>;

    /// Resolve the current user from session cookies
    async fn current_user(&self) -> Result<UserProfile, ClientError>;
}

#[async_trait]
impl AuthApi for PortalClient {
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ClientError> {
        Self::login(self, &request).await
    }

    async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse, ClientError> {
        Self::register(self, &request).await
    }

    async fn logout(&self) -> Result<MessageResponse, ClientError> {
        Self::logout(self).await
    }

    async fn refresh(&self) -> Result<RefreshResponse, ClientError> {
        Self::refresh(self).await
    }

    async fn verify_email(
        &self,
        request: VerifyEmailRequest,
    ) -> Result<MessageResponse, ClientError> {
        Self::verify_email(self, &request).await
    }

    async fn request_password_reset(
        &self,
        request: PasswordResetRequest,
    ) -> Result<MessageResponse, ClientError> {
        Self::request_password_reset(self, &request).await
    }

    async fn reset_password(
        &self,
        request: ResetPasswordRequest,
    ) -> Result<MessageResponse, ClientError> {
        Self::reset_password(self, &request).await
    }

    async fn current_user(&self) -> Result<UserProfile, ClientError> {
        Ok(self.me().await?.user)
    }
}
