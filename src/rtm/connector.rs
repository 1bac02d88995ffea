//! WebSocket connector backed by tokio-tungstenite.

use super::socket::{validate_socket_url, SocketChannels, SocketConnector, SocketEvent, SocketFrame};
use crate::errors::{SlackResult, SocketError};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Default connector used by the client
#[derive(Debug, Clone, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    /// Create a new connector
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SocketConnector for TungsteniteConnector {
    async fn open(&self, url: &str) -> SlackResult<SocketChannels> {
        let url = validate_socket_url(url)?;

        let (ws_stream, _) = connect_async(url.as_str()).await.map_err(|e| {
            SocketError::ConnectionFailed {
                message: e.to_string(),
            }
        })?;
        info!("RTM socket open");

        let (mut write, mut read) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<SocketFrame>();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<SocketEvent>();

        let writer_events = event_tx.clone();
        tokio::spawn(async move {
            loop {
                match out_rx.recv().await {
                    Some(SocketFrame::Text(text)) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            error!("Failed to write RTM frame: {}", e);
                            let _ = writer_events.send(SocketEvent::Error(e.to_string()));
                            return;
                        }
                    }
                    // an explicit close and a dropped socket both end the session
                    Some(SocketFrame::Close) | None => {
                        debug!("Closing RTM socket");
                        let _ = write.send(Message::Close(None)).await;
                        return;
                    }
                }
            }
        });

        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if event_tx.send(SocketEvent::Text(text)).is_err() {
                            return;
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        let reason = frame.map(|f| f.reason.to_string());
                        warn!("RTM socket closed: {:?}", reason);
                        let _ = event_tx.send(SocketEvent::Closed(reason));
                        return;
                    }
                    Ok(_) => {
                        // ping/pong handled by tungstenite
                    }
                    Err(e) => {
                        error!("RTM socket error: {}", e);
                        let _ = event_tx.send(SocketEvent::Error(e.to_string()));
                        return;
                    }
                }
            }
            warn!("RTM stream ended");
            let _ = event_tx.send(SocketEvent::Closed(None));
        });

        Ok(SocketChannels {
            outbound: out_tx,
            inbound: event_rx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SlackError;
    use crate::rtm::RtmSocket;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    #[tokio::test]
    async fn test_open_rejects_malformed_url() {
        let err = TungsteniteConnector::new().open("::not-a-url::").await.unwrap_err();
        assert!(matches!(err, SlackError::Socket(SocketError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_dropping_socket_sends_close_frame() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/websocket", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.next().await
        });

        let channels = TungsteniteConnector::new().open(&url).await.unwrap();
        drop(RtmSocket::new(channels));

        let received = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(received, Some(Ok(Message::Close(_)))));
    }

    #[tokio::test]
    async fn test_open_reports_refused_connection() {
        let err = TungsteniteConnector::new()
            .open("ws://127.0.0.1:1/websocket")
            .await
            .unwrap_err();
        assert!(matches!(err, SlackError::Socket(SocketError::ConnectionFailed { .. })));
    }
}
