//! WebSocket viewer connections.
//!
//! A viewer is subscribed to the broadcast hub and handed one snapshot per
//! competition before anything else. Subscribing and reading the snapshots
//! happen under the store's read lock; mutator ticks publish under the write
//! lock, so every delta a viewer receives was applied after its snapshots.
//!
//! Inbound frames are read only to notice a close.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use leaderboard_protocol::{JsonCodec, ScoreMessage};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::AppState;
use crate::domain::competition::Competition;
use crate::infrastructure::metrics;

/// `GET /ws`
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();

    let (mut deltas, snapshots) = state.store.read(|competitions| {
        (
            state.hub.subscribe(),
            competitions
                .iter()
                .map(Competition::snapshot)
                .collect::<Vec<_>>(),
        )
    });
    metrics::set_connected_viewers(state.hub.viewer_count());
    info!(%connection_id, viewers = state.hub.viewer_count(), "Viewer connected");

    let (mut sink, mut stream) = socket.split();
    let codec = JsonCodec::new();

    let mut open = true;
    for snapshot in &snapshots {
        if !send(&mut sink, &codec, snapshot).await {
            open = false;
            break;
        }
    }

    while open {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    debug!(%connection_id, error = %e, "Viewer socket error");
                    break;
                }
                Some(Ok(_)) => {}
            },
            delta = deltas.recv() => match delta {
                Ok(message) => open = send(&mut sink, &codec, &message).await,
                Err(RecvError::Lagged(missed)) => {
                    metrics::record_lagged_deltas(missed);
                    warn!(%connection_id, missed, "Viewer lagged, deltas dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    drop(deltas);
    let _ = sink.close().await;
    metrics::set_connected_viewers(state.hub.viewer_count());
    info!(%connection_id, "Viewer disconnected");
}

/// Encode and send one message. Returns `false` once the socket is gone.
async fn send(
    sink: &mut SplitSink<WebSocket, Message>,
    codec: &JsonCodec,
    message: &ScoreMessage,
) -> bool {
    let text = match codec.encode(message) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Failed to encode score message");
            return true;
        }
    };
    sink.send(Message::Text(text.into())).await.is_ok()
}
