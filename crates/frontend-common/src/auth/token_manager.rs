//! Background token maintenance
//!
//! While a session is active the manager wakes up on a fixed heartbeat, and
//! whenever the page becomes visible again, and checks the shared session
//! record: expired records end the session, records inside the refresh buffer
//! trigger a refresh.

use super::context::LogoutReason;
use super::store::{AuthStore, RefreshOutcome};
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Result of a single session check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Token is outside the refresh buffer
    Fresh,
    Refreshed,
    /// A refresh was due but another one was in flight or the result was
    /// discarded
    RefreshSkipped,
    /// A refresh was due and the backend refused it; the next check retries
    RefreshFailed,
    /// The check ended the session
    LoggedOut,
    /// There is no session to maintain
    NoSession,
}

impl CheckOutcome {
    const fn ends_loop(self) -> bool {
        matches!(self, Self::LoggedOut | Self::NoSession)
    }
}

struct RunningTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct TokenManager {
    store: Arc<AuthStore>,
    visibility: Arc<Notify>,
    task: std::sync::Mutex<Option<RunningTask>>,
}

impl TokenManager {
    pub fn new(store: Arc<AuthStore>) -> Self {
        Self {
            store,
            visibility: Arc::new(Notify::new()),
            task: std::sync::Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Start the heartbeat. A manager that is already running is left alone.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(heartbeat_loop(
            self.store.clone(),
            self.visibility.clone(),
            cancel.clone(),
        ));
        *task = Some(RunningTask { cancel, handle });
        info!(
            interval_secs = self.store.config().heartbeat_interval.as_secs(),
            "token manager started"
        );
    }

    /// Stop the heartbeat. A check already running finishes first.
    pub fn stop(&self) {
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.cancel.cancel();
            debug!("token manager stopping");
        }
    }

    /// The page became visible again; check right away instead of waiting
    /// for the next heartbeat.
    pub fn notify_visible(&self) {
        self.visibility.notify_one();
    }

    /// Run one check outside the heartbeat
    pub async fn check_now(&self) -> CheckOutcome {
        check_session(&self.store).await
    }
}

impl Drop for TokenManager {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn heartbeat_loop(store: Arc<AuthStore>, visibility: Arc<Notify>, cancel: CancellationToken) {
    let period = store.config().heartbeat_interval.max(Duration::from_millis(1));
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("token manager stopped");
                break;
            }
            _ = interval.tick() => {}
            () = visibility.notified() => {
                debug!("page visible, checking session");
            }
        }

        let outcome = check_session(&store).await;
        if outcome.ends_loop() {
            info!(?outcome, "session over, token manager exiting");
            break;
        }
        debug!(?outcome, "session check");
    }
}

async fn check_session(store: &AuthStore) -> CheckOutcome {
    let Some(record) = store.session_record() else {
        return if store.force_logout(LogoutReason::RecordMissing) {
            CheckOutcome::LoggedOut
        } else {
            CheckOutcome::NoSession
        };
    };

    let now = store.now_ms();
    if record.is_expired(now) {
        store.force_logout(LogoutReason::Expired);
        return CheckOutcome::LoggedOut;
    }
    if !record.needs_refresh(now, store.config().refresh_buffer) {
        return CheckOutcome::Fresh;
    }

    debug!(remaining_ms = record.remaining_ms(now), "access token close to expiry");
    match store.refresh_token().await {
        RefreshOutcome::Refreshed => CheckOutcome::Refreshed,
        RefreshOutcome::InFlight | RefreshOutcome::Discarded => CheckOutcome::RefreshSkipped,
        RefreshOutcome::Failed => CheckOutcome::RefreshFailed,
        RefreshOutcome::LoggedOut => CheckOutcome::LoggedOut,
        RefreshOutcome::NoSession => CheckOutcome::NoSession,
    }
}
