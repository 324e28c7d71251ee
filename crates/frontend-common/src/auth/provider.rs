//! Auth provider
//!
//! Owns the one [`AuthStore`] of an application together with its
//! [`TokenManager`], and keeps the manager running exactly while a session
//! is active.

use super::context::SessionEvent;
use super::store::AuthStore;
use super::token_manager::TokenManager;
use crate::config::{AppConfig, SessionConfig};
use crate::services::AuthApi;
use crate::storage::{SessionRecordStore, SessionStorage};
use hireflow_core::{Clock, SystemClock};
use hireflow_http::client::{PortalClient, error::ClientError};
use std::sync::{Arc, PoisonError};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct AuthProvider {
    store: Arc<AuthStore>,
    token_manager: Arc<TokenManager>,
    watcher: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl AuthProvider {
    pub fn new(
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn SessionStorage>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
        namespace: &str,
    ) -> Self {
        let records = SessionRecordStore::new(storage, namespace);
        let store = Arc::new(AuthStore::new(api, records, clock, config));
        let token_manager = Arc::new(TokenManager::new(store.clone()));
        Self {
            store,
            token_manager,
            watcher: std::sync::Mutex::new(None),
        }
    }

    /// Build a provider talking to the configured portal API
    pub fn connect(config: &AppConfig, storage: Arc<dyn SessionStorage>) -> Result<Self, ClientError> {
        let client = PortalClient::builder()
            .base_url(&config.api.base_url)
            .timeout(config.request_timeout())
            .build()?;
        info!(base_url = %client.base_url(), "auth provider connected");

        Ok(Self::new(
            Arc::new(client),
            storage,
            Arc::new(SystemClock),
            SessionConfig::default(),
            &config.storage.namespace,
        ))
    }

    pub const fn store(&self) -> &Arc<AuthStore> {
        &self.store
    }

    pub const fn token_manager(&self) -> &Arc<TokenManager> {
        &self.token_manager
    }

    /// Attach to the application: follow session events, resolve the current
    /// user and start token maintenance if a session exists.
    pub async fn mount(&self) {
        {
            let mut watcher = self.watcher.lock().unwrap_or_else(PoisonError::into_inner);
            if watcher.is_none() {
                *watcher = Some(tokio::spawn(follow_session(
                    self.store.events(),
                    self.store.clone(),
                    self.token_manager.clone(),
                )));
            }
        }

        self.store.initialize().await;
        if self.store.is_authenticated() {
            self.token_manager.start();
        }
    }

    pub fn unmount(&self) {
        self.token_manager.stop();
        let watcher = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(watcher) = watcher {
            watcher.abort();
            debug!("auth provider unmounted");
        }
    }

    /// The page came back to the foreground
    pub fn notify_visible(&self) {
        if self.token_manager.is_running() {
            self.token_manager.notify_visible();
        }
    }

    pub fn record_activity(&self) {
        self.store.record_activity();
    }
}

impl Drop for AuthProvider {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn follow_session(
    mut events: broadcast::Receiver<SessionEvent>,
    store: Arc<AuthStore>,
    token_manager: Arc<TokenManager>,
) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::LoggedIn { session_id }) => {
                debug!(%session_id, "session started");
                token_manager.start();
            }
            Ok(SessionEvent::LoggedOut { reason }) => {
                if reason.is_forced() {
                    info!(?reason, "session ended by the client, stopping token refresh");
                } else {
                    debug!(?reason, "session ended");
                }
                token_manager.stop();
            }
            Ok(SessionEvent::Refreshed { .. }) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "missed session events, resynchronizing");
                if store.is_authenticated() {
                    token_manager.start();
                } else {
                    token_manager.stop();
                }
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::MockAuthApi;
    use crate::storage::MemoryStorage;
    use hireflow_core::{ManualClock, Role, SessionRecord, UserProfile};
    use hireflow_http::types::{LoginResponse, MessageResponse, RefreshResponse, TokenExpiry};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const NOW: i64 = 1_700_000_000_000;

    fn user() -> UserProfile {
        UserProfile {
            id: "u-9".to_string(),
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            role: Role::Admin,
            is_email_verified: true,
            permissions: Vec::new(),
        }
    }

    fn provider(api: MockAuthApi) -> AuthProvider {
        provider_on(api, &MemoryStorage::new())
    }

    fn provider_on(api: MockAuthApi, storage: &MemoryStorage) -> AuthProvider {
        AuthProvider::new(
            Arc::new(api),
            Arc::new(storage.clone()),
            Arc::new(ManualClock::new(NOW)),
            SessionConfig::default(),
            "test",
        )
    }

    #[tokio::test]
    async fn test_mount_without_session_keeps_manager_idle() {
        let mut api = MockAuthApi::new();
        api.expect_current_user()
            .times(1)
            .returning(|| Err(ClientError::AuthenticationFailed("no session".to_string())));
        let provider = provider(api);

        provider.mount().await;

        assert!(provider.store().state().is_initialized);
        assert!(!provider.token_manager().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manager_follows_login_and_logout() {
        let mut api = MockAuthApi::new();
        api.expect_current_user()
            .returning(|| Err(ClientError::AuthenticationFailed("no session".to_string())));
        api.expect_login().returning(|_| {
            Ok(LoginResponse {
                user: user(),
                message: None,
                expiry: TokenExpiry::default(),
            })
        });
        api.expect_logout()
            .returning(|| Ok(MessageResponse::default()));
        let refreshes = Arc::new(AtomicUsize::new(0));
        let counter = refreshes.clone();
        api.expect_refresh().returning(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(RefreshResponse::default())
        });
        let storage = MemoryStorage::new();
        let provider = provider_on(api, &storage);
        provider.mount().await;

        provider.store().login("sam@example.com", "secret1").await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(provider.token_manager().is_running());

        provider.store().logout().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!provider.token_manager().is_running());

        // Another tab signs in with a token close to expiry; a leftover loop
        // in this tab would pick it up and refresh on its next tick
        SessionRecordStore::new(Arc::new(storage.clone()), "test")
            .establish(&SessionRecord::new("other-tab", NOW + 60_000, NOW))
            .unwrap();
        tokio::time::sleep(Duration::from_secs(600)).await;

        assert_eq!(refreshes.load(Ordering::SeqCst), 0);
        assert_eq!(
            provider.store().session_record().unwrap().token_expiry_ms,
            NOW + 60_000
        );
    }

    #[tokio::test]
    async fn test_mount_with_session_starts_manager() {
        let mut api = MockAuthApi::new();
        api.expect_current_user().times(1).returning(|| Ok(user()));
        let provider = provider(api);

        provider.mount().await;
        provider.mount().await;

        assert!(provider.store().is_authenticated());
        assert!(provider.token_manager().is_running());

        provider.unmount();
        assert!(!provider.token_manager().is_running());
    }
}
