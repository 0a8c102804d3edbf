//! Background renewal of expiring session tokens.
//!
//! While the session is authenticated and holds a token, the monitor
//! checks remaining validity immediately on every session change and then
//! on a fixed interval, renewing once per check cycle when the expiration
//! claim drops inside the threshold. Renewal failures are logged and
//! swallowed; the next cycle naturally re-triggers if the token is still
//! unrenewed.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::claims::parse_claims;
use super::session::Session;
use crate::error::ApiError;

/// Remaining validity below which a token is proactively renewed.
pub const RENEWAL_THRESHOLD: Duration = Duration::from_secs(30 * 60);

/// Spacing between periodic checks while a session is active.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Collaborator performing the actual token renewal call.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh_token(&self) -> Result<(), ApiError>;
}

/// Whether a token's remaining validity calls for renewal.
///
/// True only when the claims decode, an expiration is present, and the
/// remaining validity is positive but inside [`RENEWAL_THRESHOLD`].
/// Malformed tokens fail open: no renewal attempt, no error.
pub fn needs_renewal(token: &str, now_secs: u64) -> bool {
    let Some(exp) = parse_claims(token).and_then(|claims| claims.exp) else {
        return false;
    };
    exp > now_secs && exp - now_secs < RENEWAL_THRESHOLD.as_secs()
}

/// Handle to the background lifecycle monitor.
///
/// The monitored timer is exclusively owned by the task and cancelled on
/// every exit path: leaving the authenticated state drops the interval,
/// and dropping the handle aborts the task outright.
pub struct TokenMonitor {
    task: JoinHandle<()>,
}

impl TokenMonitor {
    /// Spawn the monitor over a session subscription.
    pub fn spawn(sessions: watch::Receiver<Session>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            task: tokio::spawn(run(sessions, refresher)),
        }
    }

    /// Whether the background task is still alive.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for TokenMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(mut sessions: watch::Receiver<Session>, refresher: Arc<dyn TokenRefresher>) {
    loop {
        let session = sessions.borrow_and_update().clone();
        let token = match session {
            Session {
                token: Some(token),
                authenticated: true,
            } => token,
            _ => {
                // Idle: no timer exists until the session becomes active.
                if sessions.changed().await.is_err() {
                    return;
                }
                continue;
            }
        };

        tracing::debug!("session active, monitoring token expiration");

        // The first tick fires immediately, giving the prompt check on
        // every (re)entry into the monitoring state.
        let mut ticker = tokio::time::interval(CHECK_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    check_and_renew(&token, refresher.as_ref()).await;
                }
                changed = sessions.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    // Re-evaluate the session; the interval is recreated
                    // so the next check happens immediately.
                    break;
                }
            }
        }
    }
}

async fn check_and_renew(token: &str, refresher: &dyn TokenRefresher) {
    let now_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    if !needs_renewal(token, now_secs) {
        return;
    }

    tracing::info!("token approaching expiration, renewing");
    if let Err(err) = refresher.refresh_token().await {
        tracing::warn!(error = %err, "token renewal failed");
    }
}
