use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::http::ApiClient;

#[async_trait]
pub trait TokenRefresher: Send + Sync + 'static {
    async fn refresh(&self) -> Result<()>;
}

#[async_trait]
impl TokenRefresher for ApiClient {
    async fn refresh(&self) -> Result<()> {
        self.refresh_token().await
    }
}

/// Emitted to the app when the credential epoch ends without user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    ForcedLogout,
}

struct LoopState {
    running: bool,
    cancel: Option<CancellationToken>,
    task: Option<tokio::task::JoinHandle<()>>,
}

/// Process-wide silent credential renewal. Started once at boot and
/// independent of any screen; each tick renews the cookie, and a failed
/// tick ends the current auth epoch with a forced logout.
///
/// Logout races: `supersede()` bumps the epoch before the cookie is
/// destroyed, so a tick already in flight resolves under a stale epoch and
/// its outcome — success or failure — is discarded rather than resurrecting
/// or double-ending the session.
pub struct RefreshLoop {
    state: Mutex<LoopState>,
    epoch: Arc<AtomicU64>,
}

impl RefreshLoop {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LoopState {
                running: false,
                cancel: None,
                task: None,
            }),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Invalidate the credential epoch (user logout). In-flight tick
    /// completions from before this call are discarded.
    pub fn supersede(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub async fn start(
        &self,
        interval: Duration,
        refresher: Arc<dyn TokenRefresher>,
        events: mpsc::UnboundedSender<AuthEvent>,
    ) {
        let mut state = self.state.lock().await;
        if state.running {
            return;
        }

        let cancel = CancellationToken::new();
        let child = cancel.clone();
        let epoch = self.epoch.clone();

        let task = tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // interval fires immediately; the first renewal belongs one full
            // period after boot.
            tick.tick().await;

            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = tick.tick() => {
                        let started = epoch.load(Ordering::SeqCst);
                        // A cancel mid-request abandons the tick outright.
                        let outcome = tokio::select! {
                            _ = child.cancelled() => None,
                            result = refresher.refresh() => Some(result),
                        };
                        let Some(result) = outcome else { break };
                        if child.is_cancelled() || epoch.load(Ordering::SeqCst) != started {
                            tracing::debug!("discarding refresh outcome from superseded epoch");
                            continue;
                        }
                        match result {
                            Ok(()) => tracing::debug!("credential renewed"),
                            Err(err) => {
                                tracing::warn!(error = %err, "credential renewal failed; forcing logout");
                                let _ = events.send(AuthEvent::ForcedLogout);
                            }
                        }
                    }
                }
            }
            tracing::info!("refresh loop stopped");
        });

        state.running = true;
        state.cancel = Some(cancel);
        state.task = Some(task);
    }

    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        if let Some(cancel) = state.cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = state.task.take() {
            let _ = task.await;
        }
        state.running = false;
    }
}

impl Default for RefreshLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    struct FailingRefresher;

    #[async_trait]
    impl TokenRefresher for FailingRefresher {
        async fn refresh(&self) -> Result<()> {
            Err(ClientError::Server {
                status: 401,
                message: "expired".to_string(),
            })
        }
    }

    struct CountingRefresher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenRefresher for CountingRefresher {
        async fn refresh(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Blocks each refresh until released, then fails.
    struct GatedFailingRefresher {
        gate: Notify,
    }

    #[async_trait]
    impl TokenRefresher for GatedFailingRefresher {
        async fn refresh(&self) -> Result<()> {
            self.gate.notified().await;
            Err(ClientError::Network("down".to_string()))
        }
    }

    #[tokio::test]
    async fn failed_tick_forces_logout() {
        let refresh = RefreshLoop::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        refresh
            .start(Duration::from_millis(10), Arc::new(FailingRefresher), tx)
            .await;

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("no auth event");
        assert_eq!(event, Some(AuthEvent::ForcedLogout));
        refresh.stop().await;
    }

    #[tokio::test]
    async fn logout_wins_over_inflight_tick() {
        let refresher = Arc::new(GatedFailingRefresher {
            gate: Notify::new(),
        });
        let refresh = RefreshLoop::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        refresh
            .start(Duration::from_millis(10), refresher.clone(), tx)
            .await;

        // Let the tick enter the gated refresh call, then log out and only
        // then release the failing response.
        tokio::time::sleep(Duration::from_millis(40)).await;
        refresh.supersede();
        refresher.gate.notify_waiters();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(rx.try_recv().is_err(), "superseded tick must stay silent");
        refresh.stop().await;
    }

    #[tokio::test]
    async fn stop_halts_the_loop() {
        let refresher = Arc::new(CountingRefresher {
            calls: AtomicUsize::new(0),
        });
        let refresh = RefreshLoop::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        refresh
            .start(Duration::from_millis(5), refresher.clone(), tx)
            .await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        refresh.stop().await;
        let after_stop = refresher.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(refresher.calls.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let refresher = Arc::new(CountingRefresher {
            calls: AtomicUsize::new(0),
        });
        let refresh = RefreshLoop::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        refresh
            .start(Duration::from_millis(5), refresher.clone(), tx.clone())
            .await;
        refresh
            .start(Duration::from_millis(5), refresher.clone(), tx)
            .await;

        tokio::time::sleep(Duration::from_millis(23)).await;
        refresh.stop().await;
        // One loop, not two: roughly interval-many calls, not double.
        assert!(refresher.calls.load(Ordering::SeqCst) <= 5);
    }
}
