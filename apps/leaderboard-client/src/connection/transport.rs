//! Transport port and the WebSocket adapter.
//!
//! The connection manager only needs text frames in and an explicit close,
//! so the port is two small traits. Tests drive the manager with channel
//! backed frames instead of a socket.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::TransportError;

/// Opens connections to the score feed.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a new connection.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Connect` if the peer cannot be reached.
    async fn connect(&self) -> Result<Box<dyn FrameStream>, TransportError>;
}

/// One open connection yielding text frames.
#[async_trait]
pub trait FrameStream: Send {
    /// Next text frame. `None` once the peer has closed.
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>>;

    /// Close the connection. Errors are ignored.
    async fn close(&mut self);
}

// =============================================================================
// WebSocket
// =============================================================================

/// Transport over `tokio-tungstenite`.
#[derive(Debug, Clone)]
pub struct WsTransport {
    url: String,
}

impl WsTransport {
    /// Create a transport for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self) -> Result<Box<dyn FrameStream>, TransportError> {
        tracing::debug!(url = %self.url, "Connecting to score feed");

        let (socket, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        Ok(Box::new(WsFrames { socket }))
    }
}

struct WsFrames {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FrameStream for WsFrames {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.socket.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => {
                        tracing::warn!(len = data.len(), "Ignoring non-UTF8 binary frame");
                    }
                },
                Ok(Message::Close(_)) => return None,
                // tungstenite answers pings itself
                Ok(_) => {}
                Err(e) => {
                    return match TransportError::from(e) {
                        TransportError::Closed => None,
                        other => Some(Err(other)),
                    };
                }
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.socket.close(None).await;
    }
}
