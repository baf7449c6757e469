//! Catalog session controller: one event loop owning the browsing state.
//!
//! UI events and fetch completions share a single queue. The loop task is the
//! only writer of the session model; fetches run on their own tasks and come
//! back through the queue.

use std::{
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    task::{Context, Poll},
};

use futures::Stream;
use serde::Deserialize;
use shared::page::DEFAULT_PAGE_SIZE;
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        watch,
    },
    task::JoinHandle,
};
use tracing::{debug, info, trace};

use crate::{
    error::SessionError,
    executor::{spawn_fetch, Sources},
    reducer::{reduce, ReducerConfig, SessionModel, SessionMsg, StaleFetchPolicy},
    state::{BrowsingState, CatalogEvent},
    CategorySource, ProductSource,
};

const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub page_size: usize,
    pub stale_fetch_policy: StaleFetchPolicy,
    pub queue_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            stale_fetch_policy: StaleFetchPolicy::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

pub struct CatalogSessionController {
    intake: mpsc::Sender<SessionMsg>,
    published: Arc<Published>,
    outstanding: Outstanding,
    page_size: usize,
    session_task: JoinHandle<()>,
}

impl CatalogSessionController {
    /// Starts a session on the current tokio runtime.
    ///
    /// The categories and the unfiltered first page are requested right away;
    /// `is_loading` stays set until that product page settles.
    pub fn spawn(
        products: Arc<dyn ProductSource>,
        categories: Arc<dyn CategorySource>,
        settings: SessionSettings,
    ) -> Self {
        let config = ReducerConfig {
            page_size: settings.page_size.max(1),
            stale_fetch_policy: settings.stale_fetch_policy,
        };
        let (intake, intake_rx) = mpsc::channel(settings.queue_capacity.max(1));
        let published = Arc::new(Published::new(BrowsingState::default()));
        let outstanding = Outstanding::new();

        // held until the loop has applied the bootstrap message
        outstanding.acquire();
        let session_task = tokio::spawn(run_session(SessionLoop {
            intake_rx,
            completions: intake.downgrade(),
            sources: Sources {
                products,
                categories,
            },
            config,
            published: Arc::clone(&published),
            outstanding: outstanding.clone(),
        }));

        info!(
            page_size = config.page_size,
            stale_fetch_policy = ?config.stale_fetch_policy,
            "catalog session started"
        );

        Self {
            intake,
            published,
            outstanding,
            page_size: config.page_size,
            session_task,
        }
    }

    pub fn dispatch(&self, event: CatalogEvent) -> Result<(), SessionError> {
        let event_name = event.name();
        self.outstanding.acquire();
        match self.intake.try_send(SessionMsg::Event(event)) {
            Ok(()) => {
                debug!(event = event_name, "queued catalog event");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.outstanding.release();
                Err(SessionError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => {
                self.outstanding.release();
                Err(SessionError::Closed)
            }
        }
    }

    /// Stream of states, starting with the current snapshot and then one item
    /// per published change, in order.
    pub fn state(&self) -> StateStream {
        self.published.subscribe()
    }

    pub fn snapshot(&self) -> BrowsingState {
        self.published.current()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Resolves once every queued event has been applied and no fetch is
    /// still running.
    pub async fn wait_idle(&self) {
        self.outstanding.wait_idle().await;
    }

    /// Stops the event loop. Running fetches are not cancelled; their results
    /// are discarded.
    pub fn shutdown(self) {
        self.session_task.abort();
        debug!("catalog session shut down");
    }
}

struct SessionLoop {
    intake_rx: mpsc::Receiver<SessionMsg>,
    completions: mpsc::WeakSender<SessionMsg>,
    sources: Sources,
    config: ReducerConfig,
    published: Arc<Published>,
    outstanding: Outstanding,
}

async fn run_session(mut session: SessionLoop) {
    let mut model = SessionModel::default();
    let mut pending = Some(SessionMsg::Bootstrap);

    loop {
        let msg = match pending.take() {
            Some(msg) => msg,
            None => match session.intake_rx.recv().await {
                Some(msg) => msg,
                None => break,
            },
        };
        let msg_name = msg.name();
        let before = model.browsing.clone();

        let (next, command) = reduce(model, msg, &session.config);
        model = next;

        if model.browsing != before {
            session.published.publish(&model.browsing);
        }
        if let Some(command) = command {
            match session.completions.upgrade() {
                Some(completions) => {
                    spawn_fetch(
                        command,
                        session.sources.clone(),
                        completions,
                        session.outstanding.clone(),
                    );
                }
                None => debug!(
                    command = command.name(),
                    "catalog session closing; fetch not started"
                ),
            }
        }
        trace!(msg = msg_name, "applied catalog session message");
        session.outstanding.release();
    }

    debug!("catalog session loop finished");
}

/// Count of queued messages plus running fetches.
#[derive(Clone)]
pub(crate) struct Outstanding(Arc<watch::Sender<usize>>);

impl Outstanding {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self(Arc::new(tx))
    }

    pub(crate) fn acquire(&self) {
        self.0.send_modify(|count| *count += 1);
    }

    pub(crate) fn release(&self) {
        self.0.send_modify(|count| *count = count.saturating_sub(1));
    }

    async fn wait_idle(&self) {
        let mut rx = self.0.subscribe();
        let _ = rx.wait_for(|count| *count == 0).await;
    }
}

struct Published {
    inner: Mutex<PublishedInner>,
}

struct PublishedInner {
    current: BrowsingState,
    subscribers: Vec<mpsc::UnboundedSender<BrowsingState>>,
}

impl Published {
    fn new(initial: BrowsingState) -> Self {
        Self {
            inner: Mutex::new(PublishedInner {
                current: initial,
                subscribers: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PublishedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &BrowsingState) {
        let mut inner = self.lock();
        inner.current = state.clone();
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(state.clone()).is_ok());
    }

    fn current(&self) -> BrowsingState {
        self.lock().current.clone()
    }

    fn subscribe(&self) -> StateStream {
        let mut inner = self.lock();
        let (tx, rx) = mpsc::unbounded_channel();
        if tx.send(inner.current.clone()).is_ok() {
            inner.subscribers.push(tx);
        }
        StateStream { rx }
    }
}

/// Ordered feed of published browsing states for one consumer.
pub struct StateStream {
    rx: mpsc::UnboundedReceiver<BrowsingState>,
}

impl StateStream {
    pub async fn next_state(&mut self) -> Option<BrowsingState> {
        self.rx.recv().await
    }

    /// Next state already published, without waiting.
    pub fn try_next_state(&mut self) -> Option<BrowsingState> {
        self.rx.try_recv().ok()
    }

    /// Skips states until one satisfies `predicate`.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&BrowsingState) -> bool,
    ) -> Option<BrowsingState> {
        while let Some(state) = self.rx.recv().await {
            if predicate(&state) {
                return Some(state);
            }
        }
        None
    }
}

impl Stream for StateStream {
    type Item = BrowsingState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
