//! Connection Multiplexer
//!
//! One shared connection to the score feed for the whole process. Any number
//! of components register message and status handlers; the first
//! registration opens the connection and later ones reuse it.
//!
//! # States
//!
//! ```text
//! closed ──ensure──► connecting ──► open
//!   ▲                    │           │
//!   └────── error ───────┴── close ──┘
//! ```
//!
//! A closed connection stays closed. The next subscriber, or an explicit
//! [`ConnectionManager::ensure_connection`], opens a fresh one. Unsubscribing
//! the last handler leaves the connection open; only
//! [`ConnectionManager::teardown`] closes it.
//!
//! # Delivery
//!
//! Frames are decoded once and handed to every message handler in
//! registration order on the connection task. A panicking handler is logged
//! and skipped. Each connection carries a generation number and anything a
//! torn-down connection still produces is discarded. The check is repeated
//! before every handler, so a handler removed by `teardown` or `unsubscribe`
//! while a frame is being delivered is skipped for the rest of that frame.

mod transport;

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use leaderboard_protocol::{JsonCodec, ScoreMessage};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use transport::{FrameStream, Transport, WsTransport};

// =============================================================================
// Status
// =============================================================================

/// Lifecycle state of the shared connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    /// Transport is being opened.
    Connecting,
    /// Frames are flowing.
    Open,
    /// No live transport.
    Closed,
}

impl ConnectionStatus {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handler for decoded score messages.
pub type MessageHandler = Arc<dyn Fn(&ScoreMessage) + Send + Sync>;

/// Handler for status changes.
pub type StatusHandler = Arc<dyn Fn(ConnectionStatus) + Send + Sync>;

// =============================================================================
// Connection Manager
// =============================================================================

/// Shared connection with message and status fan-out.
///
/// Cheap to clone; clones share the same connection and handlers.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.registry.lock();
        f.debug_struct("ConnectionManager")
            .field("status", &registry.status)
            .field("generation", &registry.generation)
            .field("message_handlers", &registry.message_handlers.len())
            .field("status_handlers", &registry.status_handlers.len())
            .finish_non_exhaustive()
    }
}

impl ConnectionManager {
    /// Create a manager over `transport`. Nothing is opened yet.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                codec: JsonCodec::new(),
                registry: Mutex::new(Registry {
                    status: ConnectionStatus::Closed,
                    generation: 0,
                    cancel: None,
                    next_subscription: 0,
                    message_handlers: Vec::new(),
                    status_handlers: Vec::new(),
                }),
            }),
        }
    }

    /// Register a message handler and make sure a connection exists.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe_messages<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&ScoreMessage) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.inner.registry.lock();
            let id = registry.allocate_id();
            let handler: MessageHandler = Arc::new(handler);
            registry.message_handlers.push((id, handler));
            id
        };
        debug!(subscription_id = id, "Message handler registered");
        self.ensure_connection();
        Subscription::new(&self.inner, id, HandlerKind::Message)
    }

    /// Register a status handler and make sure a connection exists.
    ///
    /// The handler sees transitions from now on; read [`Self::status`] for
    /// the current state. Must be called from within a Tokio runtime.
    pub fn subscribe_status<F>(&self, handler: F) -> Subscription
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.inner.registry.lock();
            let id = registry.allocate_id();
            let handler: StatusHandler = Arc::new(handler);
            registry.status_handlers.push((id, handler));
            id
        };
        debug!(subscription_id = id, "Status handler registered");
        self.ensure_connection();
        Subscription::new(&self.inner, id, HandlerKind::Status)
    }

    /// Open a connection unless one is already connecting or open.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn ensure_connection(&self) {
        let (generation, cancel, handlers) = {
            let mut registry = self.inner.registry.lock();
            if registry.status != ConnectionStatus::Closed {
                return;
            }
            registry.generation += 1;
            registry.status = ConnectionStatus::Connecting;
            let cancel = CancellationToken::new();
            registry.cancel = Some(cancel.clone());
            (registry.generation, cancel, registry.status_handlers.clone())
        };

        info!(generation, "Opening shared connection");
        notify_status(&handlers, ConnectionStatus::Connecting);
        tokio::spawn(drive(Arc::clone(&self.inner), generation, cancel));
    }

    /// Close the shared connection and drop every handler.
    ///
    /// Status handlers hear `closed` once before they are removed.
    pub fn teardown(&self) {
        let handlers = {
            let mut registry = self.inner.registry.lock();
            registry.generation += 1;
            if let Some(cancel) = registry.cancel.take() {
                cancel.cancel();
            }
            registry.status = ConnectionStatus::Closed;
            registry.message_handlers.clear();
            std::mem::take(&mut registry.status_handlers)
        };

        notify_status(&handlers, ConnectionStatus::Closed);
        info!("Shared connection torn down");
    }

    /// Current state.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.inner.registry.lock().status
    }

    /// Number of registered message handlers.
    #[must_use]
    pub fn message_subscribers(&self) -> usize {
        self.inner.registry.lock().message_handlers.len()
    }

    /// Number of registered status handlers.
    #[must_use]
    pub fn status_subscribers(&self) -> usize {
        self.inner.registry.lock().status_handlers.len()
    }
}

// =============================================================================
// Subscription
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandlerKind {
    Message,
    Status,
}

/// Registration handle. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes its handler"]
#[derive(Debug)]
pub struct Subscription {
    inner: Weak<Inner>,
    id: u64,
    kind: HandlerKind,
    active: bool,
}

impl Subscription {
    fn new(inner: &Arc<Inner>, id: u64, kind: HandlerKind) -> Self {
        Self {
            inner: Arc::downgrade(inner),
            id,
            kind,
            active: true,
        }
    }

    /// Identifier used in logs.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Remove the handler. The connection stays as it is.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !std::mem::replace(&mut self.active, false) {
            return;
        }
        if let Some(inner) = self.inner.upgrade() {
            let mut registry = inner.registry.lock();
            match self.kind {
                HandlerKind::Message => {
                    registry.message_handlers.retain(|(id, _)| *id != self.id);
                }
                HandlerKind::Status => {
                    registry.status_handlers.retain(|(id, _)| *id != self.id);
                }
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

// =============================================================================
// Internals
// =============================================================================

struct Inner {
    transport: Arc<dyn Transport>,
    codec: JsonCodec,
    registry: Mutex<Registry>,
}

struct Registry {
    status: ConnectionStatus,
    generation: u64,
    cancel: Option<CancellationToken>,
    next_subscription: u64,
    message_handlers: Vec<(u64, MessageHandler)>,
    status_handlers: Vec<(u64, StatusHandler)>,
}

impl Registry {
    const fn allocate_id(&mut self) -> u64 {
        self.next_subscription += 1;
        self.next_subscription
    }
}

impl Inner {
    /// Apply a transition from connection `generation`. Returns `false` when
    /// that connection has been superseded.
    fn transition(&self, generation: u64, status: ConnectionStatus) -> bool {
        let handlers = {
            let mut registry = self.registry.lock();
            if registry.generation != generation {
                return false;
            }
            registry.status = status;
            if status == ConnectionStatus::Closed {
                registry.cancel = None;
            }
            registry.status_handlers.clone()
        };

        notify_status(&handlers, status);
        true
    }

    fn dispatch(&self, generation: u64, text: &str) {
        let message = match self.codec.decode(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(generation, error = %e, "Dropping undecodable frame");
                return;
            }
        };

        let handlers = {
            let registry = self.registry.lock();
            if registry.generation != generation {
                return;
            }
            registry.message_handlers.clone()
        };

        for (id, handler) in &handlers {
            if !self.is_live(generation, *id) {
                continue;
            }
            if catch_unwind(AssertUnwindSafe(|| handler(&message))).is_err() {
                warn!(
                    subscription_id = id,
                    competition_id = message.competition_id(),
                    kind = message.kind(),
                    "Message handler panicked"
                );
            }
        }
    }

    /// Whether message handler `id` is still registered on connection
    /// `generation`.
    fn is_live(&self, generation: u64, id: u64) -> bool {
        let registry = self.registry.lock();
        registry.generation == generation
            && registry.message_handlers.iter().any(|(live, _)| *live == id)
    }
}

fn notify_status(handlers: &[(u64, StatusHandler)], status: ConnectionStatus) {
    for (id, handler) in handlers {
        if catch_unwind(AssertUnwindSafe(|| handler(status))).is_err() {
            warn!(subscription_id = id, %status, "Status handler panicked");
        }
    }
}

/// Connection task: open, pump frames, report the close.
async fn drive(inner: Arc<Inner>, generation: u64, cancel: CancellationToken) {
    let connected = tokio::select! {
        () = cancel.cancelled() => return,
        result = inner.transport.connect() => result,
    };

    let mut frames = match connected {
        Ok(frames) => frames,
        Err(e) => {
            warn!(generation, error = %e, "Shared connection failed");
            inner.transition(generation, ConnectionStatus::Closed);
            return;
        }
    };

    if !inner.transition(generation, ConnectionStatus::Open) {
        frames.close().await;
        return;
    }
    info!(generation, "Shared connection open");

    loop {
        let frame = tokio::select! {
            () = cancel.cancelled() => None,
            frame = frames.next_frame() => Some(frame),
        };

        match frame {
            None => {
                frames.close().await;
                debug!(generation, "Connection task stopped by teardown");
                return;
            }
            Some(Some(Ok(text))) => inner.dispatch(generation, &text),
            Some(Some(Err(e))) => {
                warn!(generation, error = %e, "Shared connection failed");
                break;
            }
            Some(None) => {
                info!(generation, "Shared connection closed by peer");
                break;
            }
        }
    }

    inner.transition(generation, ConnectionStatus::Closed);
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use leaderboard_protocol::TraderScore;
    use rust_decimal_macros::dec;
    use test_case::test_case;
    use tokio::sync::mpsc;

    use super::*;
    use crate::error::TransportError;

    type FrameSender = mpsc::UnboundedSender<Result<String, TransportError>>;

    /// Hands out scripted connections in order.
    #[derive(Default)]
    struct ChannelTransport {
        scripted: Mutex<VecDeque<Result<ChannelFrames, TransportError>>>,
        connects: AtomicUsize,
    }

    impl ChannelTransport {
        fn push_connection(&self) -> (FrameSender, Arc<AtomicBool>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let closed = Arc::new(AtomicBool::new(false));
            self.scripted.lock().push_back(Ok(ChannelFrames {
                rx,
                closed: Arc::clone(&closed),
            }));
            (tx, closed)
        }

        fn push_failure(&self) {
            self.scripted
                .lock()
                .push_back(Err(TransportError::Connect("refused".to_string())));
        }

        fn connects(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ChannelTransport {
        async fn connect(&self) -> Result<Box<dyn FrameStream>, TransportError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            let next = self.scripted.lock().pop_front();
            match next {
                Some(Ok(frames)) => Ok(Box::new(frames)),
                Some(Err(e)) => Err(e),
                None => Err(TransportError::Connect("nothing scripted".to_string())),
            }
        }
    }

    struct ChannelFrames {
        rx: mpsc::UnboundedReceiver<Result<String, TransportError>>,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl FrameStream for ChannelFrames {
        async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
            self.rx.recv().await
        }

        async fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn setup() -> (ConnectionManager, Arc<ChannelTransport>) {
        let transport = Arc::new(ChannelTransport::default());
        let manager = ConnectionManager::new(transport.clone());
        (manager, transport)
    }

    fn frame(competition_id: &str, name: &str) -> String {
        JsonCodec::new()
            .encode(&ScoreMessage::score_update(
                competition_id,
                vec![TraderScore::new(name, dec!(1.5))],
            ))
            .unwrap()
    }

    async fn eventually(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("condition never held");
    }

    fn record_statuses(
        manager: &ConnectionManager,
    ) -> (Subscription, Arc<Mutex<Vec<ConnectionStatus>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = manager.subscribe_status(move |status| sink.lock().push(status));
        (sub, seen)
    }

    fn record_messages(
        manager: &ConnectionManager,
        label: &'static str,
        log: &Arc<Mutex<Vec<(&'static str, String)>>>,
    ) -> Subscription {
        let log = Arc::clone(log);
        manager.subscribe_messages(move |message| {
            log.lock().push((label, message.competition_id().to_string()));
        })
    }

    #[test_case(ConnectionStatus::Connecting, "connecting")]
    #[test_case(ConnectionStatus::Open, "open")]
    #[test_case(ConnectionStatus::Closed, "closed")]
    fn status_names(status: ConnectionStatus, expected: &str) {
        assert_eq!(status.to_string(), expected);
        assert_eq!(status.as_str(), expected);
    }

    #[test]
    fn starts_closed_without_subscribers() {
        let (manager, transport) = setup();

        assert_eq!(manager.status(), ConnectionStatus::Closed);
        assert_eq!(manager.message_subscribers(), 0);
        assert_eq!(manager.status_subscribers(), 0);
        assert_eq!(transport.connects(), 0);
    }

    #[tokio::test]
    async fn first_subscriber_opens_connection() {
        let (manager, transport) = setup();
        let _conn = transport.push_connection();

        let (_sub, seen) = record_statuses(&manager);
        eventually(|| manager.status() == ConnectionStatus::Open).await;

        assert_eq!(
            *seen.lock(),
            [ConnectionStatus::Connecting, ConnectionStatus::Open]
        );
        assert_eq!(transport.connects(), 1);
    }

    #[tokio::test]
    async fn later_subscribers_reuse_connection() {
        let (manager, transport) = setup();
        let _conn = transport.push_connection();
        let log = Arc::new(Mutex::new(Vec::new()));

        let _first = record_messages(&manager, "first", &log);
        let _second = record_messages(&manager, "second", &log);
        eventually(|| manager.status() == ConnectionStatus::Open).await;
        let _third = record_messages(&manager, "third", &log);
        manager.ensure_connection();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(transport.connects(), 1);
        assert_eq!(manager.message_subscribers(), 3);
    }

    #[tokio::test]
    async fn fans_out_in_registration_order() {
        let (manager, transport) = setup();
        let (tx, _) = transport.push_connection();
        let log = Arc::new(Mutex::new(Vec::new()));

        let _first = record_messages(&manager, "first", &log);
        let _second = record_messages(&manager, "second", &log);
        tx.send(Ok(frame("alpha", "A"))).unwrap();

        eventually(|| log.lock().len() == 2).await;
        assert_eq!(
            *log.lock(),
            [
                ("first", "alpha".to_string()),
                ("second", "alpha".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn panicking_handler_does_not_starve_others() {
        let (manager, transport) = setup();
        let (tx, _) = transport.push_connection();
        let log = Arc::new(Mutex::new(Vec::new()));

        let _bad = manager.subscribe_messages(|_| panic!("handler failure"));
        let _good = record_messages(&manager, "good", &log);
        tx.send(Ok(frame("alpha", "A"))).unwrap();
        tx.send(Ok(frame("beta", "B"))).unwrap();

        eventually(|| log.lock().len() == 2).await;
        assert_eq!(manager.status(), ConnectionStatus::Open);
    }

    #[tokio::test]
    async fn teardown_from_handler_stops_remaining_handlers() {
        let (manager, transport) = setup();
        let (tx, closed) = transport.push_connection();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first_log = Arc::clone(&log);
        let handle = manager.clone();
        let _first = manager.subscribe_messages(move |message| {
            first_log
                .lock()
                .push(("first", message.competition_id().to_string()));
            handle.teardown();
        });
        let _second = record_messages(&manager, "second", &log);
        tx.send(Ok(frame("alpha", "A"))).unwrap();

        eventually(|| closed.load(Ordering::SeqCst)).await;
        assert_eq!(*log.lock(), [("first", "alpha".to_string())]);
        assert_eq!(manager.status(), ConnectionStatus::Closed);
        assert_eq!(manager.message_subscribers(), 0);
    }

    #[tokio::test]
    async fn unsubscribe_from_handler_skips_it_for_current_frame() {
        let (manager, transport) = setup();
        let (tx, _) = transport.push_connection();
        let log = Arc::new(Mutex::new(Vec::new()));

        let later: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&later);
        let _first = manager.subscribe_messages(move |_| {
            if let Some(sub) = slot.lock().take() {
                sub.unsubscribe();
            }
        });
        *later.lock() = Some(record_messages(&manager, "second", &log));
        let _third = record_messages(&manager, "third", &log);

        tx.send(Ok(frame("alpha", "A"))).unwrap();
        tx.send(Ok(frame("beta", "B"))).unwrap();

        eventually(|| log.lock().len() == 2).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(
            *log.lock(),
            [
                ("third", "alpha".to_string()),
                ("third", "beta".to_string())
            ]
        );
        assert_eq!(manager.message_subscribers(), 2);
        assert_eq!(manager.status(), ConnectionStatus::Open);
    }

    #[tokio::test]
    async fn undecodable_frame_is_dropped() {
        let (manager, transport) = setup();
        let (tx, _) = transport.push_connection();
        let log = Arc::new(Mutex::new(Vec::new()));

        let _sub = record_messages(&manager, "only", &log);
        tx.send(Ok("not json".to_string())).unwrap();
        tx.send(Ok(r#"{"type":"heartbeat","competitionId":"x"}"#.to_string()))
            .unwrap();
        tx.send(Ok(frame("alpha", "A"))).unwrap();

        eventually(|| !log.lock().is_empty()).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(*log.lock(), [("only", "alpha".to_string())]);
        assert_eq!(manager.status(), ConnectionStatus::Open);
    }

    #[tokio::test]
    async fn peer_close_is_final_until_next_subscriber() {
        let (manager, transport) = setup();
        let (tx, _) = transport.push_connection();

        let (_sub, seen) = record_statuses(&manager);
        eventually(|| manager.status() == ConnectionStatus::Open).await;
        drop(tx);
        eventually(|| manager.status() == ConnectionStatus::Closed).await;

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(transport.connects(), 1);
        assert_eq!(
            *seen.lock(),
            [
                ConnectionStatus::Connecting,
                ConnectionStatus::Open,
                ConnectionStatus::Closed
            ]
        );

        let _again = transport.push_connection();
        let _sub2 = manager.subscribe_messages(|_| {});
        eventually(|| manager.status() == ConnectionStatus::Open).await;
        assert_eq!(transport.connects(), 2);
    }

    #[tokio::test]
    async fn transport_error_closes_connection() {
        let (manager, transport) = setup();
        let (tx, _) = transport.push_connection();

        let (_sub, _seen) = record_statuses(&manager);
        eventually(|| manager.status() == ConnectionStatus::Open).await;
        tx.send(Err(TransportError::Protocol("reset".to_string())))
            .unwrap();

        eventually(|| manager.status() == ConnectionStatus::Closed).await;
        assert_eq!(transport.connects(), 1);
    }

    #[tokio::test]
    async fn connect_failure_goes_straight_to_closed() {
        let (manager, transport) = setup();
        transport.push_failure();

        let (_sub, seen) = record_statuses(&manager);
        eventually(|| manager.status() == ConnectionStatus::Closed && seen.lock().len() == 2)
            .await;

        assert_eq!(
            *seen.lock(),
            [ConnectionStatus::Connecting, ConnectionStatus::Closed]
        );
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery_but_keeps_connection() {
        let (manager, transport) = setup();
        let (tx, closed) = transport.push_connection();
        let log = Arc::new(Mutex::new(Vec::new()));

        let gone = record_messages(&manager, "gone", &log);
        let _kept = record_messages(&manager, "kept", &log);
        eventually(|| manager.status() == ConnectionStatus::Open).await;

        gone.unsubscribe();
        tx.send(Ok(frame("alpha", "A"))).unwrap();

        eventually(|| !log.lock().is_empty()).await;
        assert_eq!(*log.lock(), [("kept", "alpha".to_string())]);
        assert_eq!(manager.message_subscribers(), 1);
        assert_eq!(manager.status(), ConnectionStatus::Open);
        assert!(!closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn last_unsubscribe_leaves_connection_open() {
        let (manager, transport) = setup();
        let (_tx, closed) = transport.push_connection();

        let sub = manager.subscribe_messages(|_| {});
        eventually(|| manager.status() == ConnectionStatus::Open).await;
        drop(sub);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(manager.message_subscribers(), 0);
        assert_eq!(manager.status(), ConnectionStatus::Open);
        assert!(!closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn teardown_closes_and_clears() {
        let (manager, transport) = setup();
        let (tx, closed) = transport.push_connection();
        let log = Arc::new(Mutex::new(Vec::new()));

        let (_status_sub, seen) = record_statuses(&manager);
        let _messages = record_messages(&manager, "before", &log);
        eventually(|| manager.status() == ConnectionStatus::Open).await;

        manager.teardown();

        assert_eq!(manager.status(), ConnectionStatus::Closed);
        assert_eq!(manager.message_subscribers(), 0);
        assert_eq!(manager.status_subscribers(), 0);
        assert_eq!(seen.lock().last(), Some(&ConnectionStatus::Closed));

        eventually(|| closed.load(Ordering::SeqCst)).await;
        let _ = tx.send(Ok(frame("alpha", "A")));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(log.lock().is_empty());
        assert_eq!(transport.connects(), 1);
    }

    #[tokio::test]
    async fn resubscribe_after_teardown_opens_fresh_connection() {
        let (manager, transport) = setup();
        let (old_tx, _) = transport.push_connection();
        let (new_tx, _) = transport.push_connection();
        let log = Arc::new(Mutex::new(Vec::new()));

        let _before = record_messages(&manager, "before", &log);
        eventually(|| manager.status() == ConnectionStatus::Open).await;
        manager.teardown();

        let _after = record_messages(&manager, "after", &log);
        eventually(|| manager.status() == ConnectionStatus::Open).await;
        assert_eq!(transport.connects(), 2);

        let _ = old_tx.send(Ok(frame("stale", "X")));
        new_tx.send(Ok(frame("fresh", "Y"))).unwrap();

        eventually(|| !log.lock().is_empty()).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(*log.lock(), [("after", "fresh".to_string())]);
    }

    #[tokio::test]
    async fn teardown_while_connecting_discards_connection() {
        let (manager, transport) = setup();
        let (_tx, closed) = transport.push_connection();

        let _sub = manager.subscribe_messages(|_| {});
        manager.teardown();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(manager.status(), ConnectionStatus::Closed);
        // Either the connect was cancelled or the opened frames were closed.
        assert!(transport.connects() == 0 || closed.load(Ordering::SeqCst));
    }
}
