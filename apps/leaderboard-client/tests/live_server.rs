//! Live Server Integration Tests
//!
//! Runs the leaderboard server on an ephemeral port and drives it through
//! the client's shared connection. Covers snapshots on connect, reconciled
//! views, and fresh snapshots after teardown and resubscribe.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use leaderboard_client::{
    ConnectionManager, ConnectionStatus, LeaderboardReconciler, Subscription, WsTransport,
};
use leaderboard_protocol::{ScoreMessage, TraderScore};
use leaderboard_server::{
    AppState, BroadcastHub, CompetitionDefinition, CompetitionStore,
    InMemoryCompetitionRepository, Schedule, serve,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

struct TestServer {
    url: String,
    hub: Arc<BroadcastHub>,
    store: Arc<CompetitionStore>,
    cancel: CancellationToken,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn start_server() -> TestServer {
    let mut alpha = CompetitionDefinition::new("alpha", "Alpha", dec!(10), dec!(1000));
    alpha.traders = vec![
        TraderScore::new("A", Decimal::ZERO),
        TraderScore::new("B", Decimal::ZERO),
    ];
    let beta = CompetitionDefinition::new("beta", "Beta", dec!(25), dec!(5000));

    let store = Arc::new(
        CompetitionStore::from_definitions(
            vec![alpha, beta],
            Schedule::new(Utc::now()),
            Arc::new(InMemoryCompetitionRepository::new()),
        )
        .unwrap(),
    );
    let hub = Arc::new(BroadcastHub::with_defaults());
    let state = Arc::new(AppState::new(
        Arc::clone(&store),
        Arc::clone(&hub),
        "test".to_string(),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let server_cancel = cancel.clone();
    tokio::spawn(async move {
        serve(listener, state, server_cancel).await.unwrap();
    });

    TestServer {
        url: format!("ws://{addr}/ws"),
        hub,
        store,
        cancel,
    }
}

fn forward_messages(
    manager: &ConnectionManager,
) -> (Subscription, mpsc::UnboundedReceiver<ScoreMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sub = manager.subscribe_messages(move |message| {
        let _ = tx.send(message.clone());
    });
    (sub, rx)
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<ScoreMessage>) -> ScoreMessage {
    timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for a message")
        .expect("handler channel closed")
}

async fn wait_for_viewers(hub: &BroadcastHub, expected: usize) {
    timeout(RECV_TIMEOUT, async {
        while hub.viewer_count() != expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("viewer count never settled");
}

async fn assert_snapshots_first(rx: &mut mpsc::UnboundedReceiver<ScoreMessage>) {
    let first = recv(rx).await;
    let second = recv(rx).await;
    assert!(first.is_snapshot() && second.is_snapshot());
    let mut ids = [first.competition_id(), second.competition_id()];
    ids.sort_unstable();
    assert_eq!(ids, ["alpha", "beta"]);
}

#[tokio::test]
async fn shared_connection_reconciles_join_and_update() {
    let server = start_server().await;
    let manager = ConnectionManager::new(Arc::new(WsTransport::new(server.url.clone())));

    server.store.join("alpha", "C").await.unwrap();

    let view = Arc::new(Mutex::new(LeaderboardReconciler::new("alpha")));
    let sink = Arc::clone(&view);
    let _view_sub = manager.subscribe_messages(move |message| {
        sink.lock().apply(message);
    });
    let (_sub, mut rx) = forward_messages(&manager);

    assert_snapshots_first(&mut rx).await;
    wait_for_viewers(&server.hub, 1).await;
    assert_eq!(manager.status(), ConnectionStatus::Open);

    let update = ScoreMessage::score_update("alpha", vec![TraderScore::new("A", dec!(3.5))]);
    assert_eq!(server.hub.send(update), Some(1));
    assert!(!recv(&mut rx).await.is_snapshot());

    assert_eq!(
        view.lock().view(),
        [
            TraderScore::new("A", dec!(3.5)),
            TraderScore::new("B", Decimal::ZERO),
            TraderScore::new("C", Decimal::ZERO),
        ]
    );
}

#[tokio::test]
async fn reconnect_after_teardown_receives_fresh_snapshots() {
    let server = start_server().await;
    let manager = ConnectionManager::new(Arc::new(WsTransport::new(server.url.clone())));

    let statuses = Arc::new(Mutex::new(Vec::new()));
    let status_sink = Arc::clone(&statuses);
    let _status_sub = manager.subscribe_status(move |status| status_sink.lock().push(status));
    let (_first_sub, mut first_rx) = forward_messages(&manager);

    assert_snapshots_first(&mut first_rx).await;
    wait_for_viewers(&server.hub, 1).await;

    manager.teardown();
    assert_eq!(manager.status(), ConnectionStatus::Closed);
    assert_eq!(manager.message_subscribers(), 0);
    assert_eq!(manager.status_subscribers(), 0);
    assert_eq!(
        *statuses.lock(),
        [
            ConnectionStatus::Connecting,
            ConnectionStatus::Open,
            ConnectionStatus::Closed
        ]
    );
    wait_for_viewers(&server.hub, 0).await;

    let (_second_sub, mut second_rx) = forward_messages(&manager);
    assert_snapshots_first(&mut second_rx).await;
    wait_for_viewers(&server.hub, 1).await;

    let update = ScoreMessage::score_update("beta", vec![TraderScore::new("Z", dec!(1))]);
    assert_eq!(server.hub.send(update), Some(1));
    let update = recv(&mut second_rx).await;
    assert_eq!(update.competition_id(), "beta");
    assert!(!update.is_snapshot());

    // The torn-down handler saw nothing after teardown.
    assert!(first_rx.try_recv().is_err());
}
