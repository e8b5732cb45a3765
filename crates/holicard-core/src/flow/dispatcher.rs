//! Per-session event serialization.
//!
//! Each session gets a bounded `mpsc` mailbox drained by its own task, so
//! events of one session are handled strictly one at a time and in arrival
//! order while different sessions proceed concurrently. Enqueueing never
//! waits: a full mailbox rejects the event. A worker that stays idle for
//! the idle timeout ends the session and removes its mailbox.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::task::TaskTracker;
use tracing::debug;

use holicard_types::chat::{InboundEvent, SessionId};

/// Buffer size for per-session mailboxes.
const MAILBOX_BUFFER: usize = 32;

/// Idle time after which a session's worker stops.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatcher is shutting down")]
    ShuttingDown,

    #[error("mailbox full for session {0}")]
    Busy(SessionId),

    #[error("mailbox closed for session {0}")]
    Closed(SessionId),
}

/// Something that handles one event to completion.
pub trait EventHandler: Send + Sync + 'static {
    fn handle(&self, event: InboundEvent) -> impl Future<Output = ()> + Send;

    /// Called once a session's worker stopped after being idle.
    fn session_ended(&self, _session: SessionId) {}
}

type Mailboxes = Arc<DashMap<SessionId, mpsc::Sender<InboundEvent>>>;

/// Routes inbound events to per-session workers.
pub struct SessionDispatcher<H: EventHandler> {
    handler: Arc<H>,
    mailboxes: Mailboxes,
    tracker: TaskTracker,
    idle_timeout: Duration,
}

impl<H: EventHandler> SessionDispatcher<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            mailboxes: Arc::new(DashMap::new()),
            tracker: TaskTracker::new(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// Number of sessions with a live worker.
    pub fn active_sessions(&self) -> usize {
        self.mailboxes.len()
    }

    /// Queue an event for its session, starting a worker if needed.
    ///
    /// Never waits. The send happens under the mailbox entry lock, so an
    /// idle worker cannot retire between the lookup and the send.
    pub fn dispatch(&self, event: InboundEvent) -> Result<(), DispatchError> {
        if self.tracker.is_closed() {
            return Err(DispatchError::ShuttingDown);
        }

        let session = event.session;
        let mut sender = self
            .mailboxes
            .entry(session)
            .or_insert_with(|| self.spawn_worker(session));

        match sender.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(DispatchError::Busy(session)),
            Err(TrySendError::Closed(event)) => {
                // Worker is gone; replace it once.
                *sender = self.spawn_worker(session);
                sender
                    .try_send(event)
                    .map_err(|_| DispatchError::Closed(session))
            }
        }
    }

    /// Stop accepting events, let workers drain their mailboxes, and wait
    /// for them to finish.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.mailboxes.clear();
        self.tracker.wait().await;
        debug!("session dispatcher stopped");
    }

    fn spawn_worker(&self, session: SessionId) -> mpsc::Sender<InboundEvent> {
        let (tx, mut rx) = mpsc::channel(MAILBOX_BUFFER);
        let handler = Arc::clone(&self.handler);
        let mailboxes = Arc::clone(&self.mailboxes);
        let idle_timeout = self.idle_timeout;

        self.tracker.spawn(async move {
            debug!(%session, "session worker started");
            loop {
                match tokio::time::timeout(idle_timeout, rx.recv()).await {
                    Ok(Some(event)) => handler.handle(event).await,
                    Ok(None) => break,
                    Err(_) => {
                        // Retire only if nothing slipped in under the entry lock.
                        if mailboxes.remove_if(&session, |_, _| rx.is_empty()).is_some() {
                            handler.session_ended(session);
                            debug!(%session, "session ended after idle timeout");
                            break;
                        }
                    }
                }
            }
            debug!(%session, "session worker stopped");
        });

        tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(SessionId, String)>>,
        release: Notify,
    }

    impl EventHandler for Recorder {
        async fn handle(&self, event: InboundEvent) {
            let text = match &event.kind {
                holicard_types::chat::EventKind::Text(text) => text.clone(),
                _ => String::new(),
            };
            if text == "block" {
                self.release.notified().await;
            } else {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
            self.seen.lock().unwrap().push((event.session, text));
        }
    }

    #[tokio::test]
    async fn test_events_of_one_session_stay_in_order() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = SessionDispatcher::new(Arc::clone(&recorder));

        for i in 0..10 {
            dispatcher
                .dispatch(InboundEvent::text(SessionId(1), i.to_string()))
                .unwrap();
        }
        dispatcher.shutdown().await;

        let seen = recorder.seen.lock().unwrap();
        let texts: Vec<&str> = seen.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]);
    }

    #[tokio::test]
    async fn test_sessions_run_concurrently() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = SessionDispatcher::new(Arc::clone(&recorder));

        dispatcher
            .dispatch(InboundEvent::text(SessionId(1), "block"))
            .unwrap();
        dispatcher
            .dispatch(InboundEvent::text(SessionId(2), "free"))
            .unwrap();

        // Session 2 completes while session 1 is still blocked.
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if recorder.seen.lock().unwrap().len() == 1 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(recorder.seen.lock().unwrap()[0].0, SessionId(2));
        assert_eq!(dispatcher.active_sessions(), 2);

        recorder.release.notify_one();
        dispatcher.shutdown().await;
        assert_eq!(recorder.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_after_shutdown_is_rejected() {
        let dispatcher = SessionDispatcher::new(Arc::new(Recorder::default()));
        dispatcher.shutdown().await;

        let result = dispatcher.dispatch(InboundEvent::text(SessionId(3), "late"));
        assert!(matches!(result, Err(DispatchError::ShuttingDown)));
    }

    async fn wait_until(mut done: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !done() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_full_mailbox_does_not_stall_other_sessions() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = SessionDispatcher::new(Arc::clone(&recorder));

        dispatcher
            .dispatch(InboundEvent::text(SessionId(1), "block"))
            .unwrap();
        wait_until(|| dispatcher.active_sessions() == 1).await;
        // Give the worker time to pull "block" out of the mailbox.
        tokio::time::sleep(Duration::from_millis(20)).await;

        for i in 0..MAILBOX_BUFFER {
            dispatcher
                .dispatch(InboundEvent::text(SessionId(1), i.to_string()))
                .unwrap();
        }
        let overflow = dispatcher.dispatch(InboundEvent::text(SessionId(1), "one too many"));
        assert!(matches!(overflow, Err(DispatchError::Busy(SessionId(1)))));

        dispatcher
            .dispatch(InboundEvent::text(SessionId(2), "free"))
            .unwrap();
        wait_until(|| recorder.seen.lock().unwrap().len() == 1).await;
        assert_eq!(recorder.seen.lock().unwrap()[0].0, SessionId(2));

        recorder.release.notify_one();
        dispatcher.shutdown().await;
        assert_eq!(recorder.seen.lock().unwrap().len(), MAILBOX_BUFFER + 2);
    }

    #[derive(Default)]
    struct EndTracker {
        ended: Mutex<Vec<SessionId>>,
    }

    impl EventHandler for EndTracker {
        async fn handle(&self, _event: InboundEvent) {}

        fn session_ended(&self, session: SessionId) {
            self.ended.lock().unwrap().push(session);
        }
    }

    #[tokio::test]
    async fn test_idle_sessions_are_retired() {
        let tracker = Arc::new(EndTracker::default());
        let dispatcher = SessionDispatcher::new(Arc::clone(&tracker))
            .with_idle_timeout(Duration::from_millis(50));

        for id in 0..100 {
            dispatcher
                .dispatch(InboundEvent::text(SessionId(id), "hi"))
                .unwrap();
        }
        assert_eq!(dispatcher.active_sessions(), 100);

        wait_until(|| dispatcher.active_sessions() == 0).await;
        wait_until(|| tracker.ended.lock().unwrap().len() == 100).await;

        // A retired session starts a fresh worker on its next event.
        dispatcher
            .dispatch(InboundEvent::text(SessionId(7), "back"))
            .unwrap();
        assert_eq!(dispatcher.active_sessions(), 1);
        dispatcher.shutdown().await;
    }
}
