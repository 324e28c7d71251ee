//! Auth endpoints of the portal API

use super::{PortalClient, error::ClientError};
use crate::types::{
    LoginRequest, LoginResponse, MeResponse, MessageResponse, PasswordResetRequest,
    RefreshResponse, RegisterRequest, RegisterResponse, ResetPasswordRequest, VerifyEmailRequest,
};
use reqwest::Method;

/// Endpoint paths, relative to the client's base URL
pub mod paths {
    pub const LOGIN: &str = "/auth/login";
    pub const REGISTER: &str = "/auth/register";
    pub const LOGOUT: &str = "/auth/logout";
    pub const REFRESH: &str = "/auth/refresh";
    pub const VERIFY_EMAIL: &str = "/auth/verify-email";
    pub const REQUEST_PASSWORD_RESET: &str = "/auth/request-password-reset";
    pub const RESET_PASSWORD: &str = "/auth/reset-password";
    pub const ME: &str = "/auth/me";
}

impl PortalClient {
    /// Sign in; the backend sets the session cookies
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let req = self.request(Method::POST, paths::LOGIN).json(request);
        self.execute(req).await
    }

    /// Create an account
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ClientError> {
        let req = self.request(Method::POST, paths::REGISTER).json(request);
        self.execute(req).await
    }

    /// End the server-side session
    pub async fn logout(&self) -> Result<MessageResponse, ClientError> {
        let req = self.request(Method::POST, paths::LOGOUT);
        self.execute_message(req).await
    }

    /// Exchange the refresh cookie for a new access token
    pub async fn refresh(&self) -> Result<RefreshResponse, ClientError> {
        let req = self.request(Method::POST, paths::REFRESH);
        self.execute_or_default(req).await
    }

    /// Exchange a one-time verification token
    pub async fn verify_email(
        &self,
        request: &VerifyEmailRequest,
    ) -> Result<MessageResponse, ClientError> {
        let req = self.request(Method::POST, paths::VERIFY_EMAIL).json(request);
        self.execute_message(req).await
    }

    /// Ask for a password reset mail
    pub async fn request_password_reset(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<MessageResponse, ClientError> {
        let req = self
            .request(Method::POST, paths::REQUEST_PASSWORD_RESET)
            .json(request);
        self.execute_message(req).await
    }

    /// Set a new password using a reset token
    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<MessageResponse, ClientError> {
        let req = self.request(Method::POST, paths::RESET_PASSWORD).json(request);
        self.execute_message(req).await
    }

    /// Resolve the current user from the session cookies
    pub async fn me(&self) -> Result<MeResponse, ClientError> {
        let req = self.request(Method::GET, paths::ME);
        self.execute(req).await
    }
}
