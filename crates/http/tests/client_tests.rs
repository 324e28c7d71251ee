//! Integration tests for the portal auth client

#![cfg(feature = "client")]

use hireflow_http::client::{PortalClient, error::ClientError};
use hireflow_http::types::{LoginRequest, ResetPasswordRequest, VerifyEmailRequest};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json() -> serde_json::Value {
    json!({
        "id": "u-1",
        "name": "Jordan",
        "email": "jordan@example.com",
        "role": "company",
        "permissions": [{ "module": "interviews", "access": "write" }]
    })
}

#[tokio::test]
async fn test_client_builder() {
    let client = PortalClient::builder()
        .base_url("http://localhost:8080/api/")
        .build()
        .unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080/api");
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = PortalClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_login_posts_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "jordan@example.com", "password": "hunter22" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": user_json(),
            "message": "Login successful",
            "expiresIn": 900
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = PortalClient::new(mock_server.uri()).unwrap();
    let response = client
        .login(&LoginRequest {
            email: "jordan@example.com".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.user.id, "u-1");
    assert_eq!(response.message.as_deref(), Some("Login successful"));
    assert_eq!(response.expiry.expires_in, Some(900));
}

#[tokio::test]
async fn test_session_cookie_is_sent_back() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "access_token=abc; Path=/; HttpOnly")
                .set_body_json(json!({ "user": user_json() })),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("cookie", "access_token=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": user_json() })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = PortalClient::new(mock_server.uri()).unwrap();
    client
        .login(&LoginRequest {
            email: "jordan@example.com".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();

    let me = client.me().await.unwrap();
    assert_eq!(me.user.email, "jordan@example.com");
}

#[tokio::test]
async fn test_logout_accepts_empty_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = PortalClient::new(mock_server.uri()).unwrap();
    let response = client.logout().await.unwrap();
    assert!(response.message.is_none());
}

#[tokio::test]
async fn test_refresh_accepts_empty_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = PortalClient::new(mock_server.uri()).unwrap();
    let response = client.refresh().await.unwrap();
    assert!(response.message.is_none());
    assert_eq!(response.expiry.access_token_expires_at, None);
    assert_eq!(response.expiry.expires_in, None);
}

#[tokio::test]
async fn test_refresh_reads_expiry_when_present() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "expiresIn": 600 })))
        .mount(&mock_server)
        .await;

    let client = PortalClient::new(mock_server.uri()).unwrap();
    let response = client.refresh().await.unwrap();
    assert_eq!(response.expiry.expires_in, Some(600));
}

#[tokio::test]
async fn test_reset_password_body_and_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/reset-password"))
        .and(body_json(json!({ "token": "t-1", "newPassword": "s3cret!" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Password updated" })),
        )
        .mount(&mock_server)
        .await;

    let client = PortalClient::new(mock_server.uri()).unwrap();
    let response = client
        .reset_password(&ResetPasswordRequest {
            token: "t-1".to_string(),
            new_password: "s3cret!".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(response.message.as_deref(), Some("Password updated"));
}

#[tokio::test]
async fn test_error_handling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Refresh token expired" })),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/verify-email"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let client = PortalClient::new(mock_server.uri()).unwrap();

    let result = client.refresh().await;
    assert!(
        matches!(&result, Err(ClientError::AuthenticationFailed(m)) if m == "Refresh token expired")
    );

    let result = client
        .verify_email(&VerifyEmailRequest {
            token: "nope".to_string(),
        })
        .await;
    assert!(matches!(result, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    let client = PortalClient::new("http://127.0.0.1:9").unwrap();
    let err = client.me().await.unwrap_err();
    assert!(err.is_transport());
    assert!(!err.is_auth_expired());
}
