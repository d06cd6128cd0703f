use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use paperchat_types::Session;
use tokio::sync::watch;

use crate::error::Result;
use crate::http::ApiClient;

/// Where sessions come from. `ApiClient` in production; tests inject fakes.
#[async_trait]
pub trait SessionSource: Send + Sync + 'static {
    async fn load(&self) -> Result<Session>;
}

#[async_trait]
impl SessionSource for ApiClient {
    async fn load(&self) -> Result<Session> {
        self.fetch_session().await
    }
}

/// What a guard sees: either the read is still in flight, or it resolved to
/// a session / to "absent". Fetch failures resolve to absent — guards treat
/// "server unreachable" and "not logged in" identically.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionView {
    Pending,
    Resolved(Option<Session>),
}

struct CacheState {
    value: Option<Session>,
    /// A fetch has completed under the current epoch.
    resolved: bool,
    fetched_at: Option<Instant>,
    /// Bumped by every invalidation; completions from older epochs are
    /// discarded, never applied.
    epoch: u64,
    inflight: Option<watch::Receiver<bool>>,
}

/// The one shared session instance per running app. Read-through with a
/// freshness window, single-flight deduplication, and last-invalidation-wins
/// semantics.
pub struct SessionCache<S: SessionSource> {
    source: Arc<S>,
    ttl: Duration,
    state: Arc<Mutex<CacheState>>,
}

impl<S: SessionSource> Clone for SessionCache<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            ttl: self.ttl,
            state: self.state.clone(),
        }
    }
}

enum Step {
    Serve(Option<Session>),
    Wait(watch::Receiver<bool>),
    Fetch { epoch: u64, tx: watch::Sender<bool> },
}

impl<S: SessionSource> SessionCache<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source: Arc::new(source),
            ttl,
            state: Arc::new(Mutex::new(CacheState {
                value: None,
                resolved: false,
                fetched_at: None,
                epoch: 0,
                inflight: None,
            })),
        }
    }

    /// Resolve the session, fetching at most once per epoch no matter how
    /// many callers arrive concurrently. `None` means absent — not logged in
    /// or unreachable, indistinguishable by design.
    pub async fn get(&self) -> Option<Session> {
        loop {
            let step = {
                let mut state = self.state.lock().expect("session cache poisoned");
                if state.resolved
                    && state
                        .fetched_at
                        .map_or(false, |at| at.elapsed() <= self.ttl)
                {
                    Step::Serve(state.value.clone())
                } else if let Some(rx) = &state.inflight {
                    Step::Wait(rx.clone())
                } else {
                    let (tx, rx) = watch::channel(false);
                    state.inflight = Some(rx);
                    Step::Fetch {
                        epoch: state.epoch,
                        tx,
                    }
                }
            };

            match step {
                Step::Serve(value) => return value,
                Step::Wait(mut rx) => {
                    // Woken when the owning fetch completes; re-examine state.
                    if rx.changed().await.is_err() {
                        // The owning fetch vanished without completing; drop
                        // its marker so the next reader can retry.
                        let mut state = self.state.lock().expect("session cache poisoned");
                        if state
                            .inflight
                            .as_ref()
                            .map_or(false, |cur| cur.same_channel(&rx))
                        {
                            state.inflight = None;
                        }
                    }
                }
                Step::Fetch { epoch, tx } => {
                    let value = match self.source.load().await {
                        Ok(session) => Some(session),
                        Err(err) => {
                            tracing::warn!(error = %err, "session fetch failed; treating as absent");
                            None
                        }
                    };
                    {
                        let mut state = self.state.lock().expect("session cache poisoned");
                        if state.epoch == epoch {
                            state.value = value;
                            state.resolved = true;
                            state.fetched_at = Some(Instant::now());
                            state.inflight = None;
                        }
                        // Superseded by an invalidation: drop the result on
                        // the floor. A newer fetch owns the state now.
                    }
                    let _ = tx.send(true);
                }
            }
        }
    }

    /// Force the next read to bypass the cache. Readers between now and the
    /// next resolution observe `Pending`, never the stale value.
    pub fn invalidate(&self) {
        let mut state = self.state.lock().expect("session cache poisoned");
        state.epoch = state.epoch.wrapping_add(1);
        state.resolved = false;
        state.fetched_at = None;
        state.inflight = None;
    }

    /// Logout: the session is known-absent without asking the server.
    pub fn clear(&self) {
        let mut state = self.state.lock().expect("session cache poisoned");
        state.epoch = state.epoch.wrapping_add(1);
        state.value = None;
        state.resolved = true;
        state.fetched_at = Some(Instant::now());
        state.inflight = None;
    }

    /// Synchronous snapshot for rendering and guard evaluation.
    pub fn view(&self) -> SessionView {
        let state = self.state.lock().expect("session cache poisoned");
        if state.resolved {
            SessionView::Resolved(state.value.clone())
        } else {
            SessionView::Pending
        }
    }
}
