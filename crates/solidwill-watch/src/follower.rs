//! Chain head follower via WebSocket `newHeads` subscription.

use std::pin::Pin;

use futures::{stream::Stream, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::WatchError;

/// Follows new blocks and emits their numbers.
///
/// Reconnection is deliberately not handled here; when the subscription
/// drops, the stream ends and the consumer decides what to do.
pub struct BlockFollower {
    ws_url: String,
}

impl BlockFollower {
    /// Create a follower from an RPC URL.
    ///
    /// Automatically converts `https://` to `wss://` and `http://` to `ws://`.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let ws_url = url.replace("https://", "wss://").replace("http://", "ws://");
        Self { ws_url }
    }

    /// Subscribe to new head numbers.
    pub async fn subscribe(
        &self,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<u64, WatchError>> + Send>>, WatchError> {
        let (tx, rx) = mpsc::channel(64);
        let ws_url = self.ws_url.clone();

        tokio::spawn(async move {
            if let Err(e) = run_subscription(ws_url, tx).await {
                tracing::error!("block follower error: {}", e);
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

async fn run_subscription(
    ws_url: String,
    tx: mpsc::Sender<Result<u64, WatchError>>,
) -> Result<(), WatchError> {
    let (ws_stream, _) =
        connect_async(&ws_url).await.map_err(|e| WatchError::WebSocket(e.to_string()))?;

    let (mut write, mut read) = ws_stream.split();

    let subscribe_msg = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_subscribe",
        "params": ["newHeads"]
    });

    write
        .send(Message::Text(subscribe_msg.to_string().into()))
        .await
        .map_err(|e| WatchError::WebSocket(e.to_string()))?;

    while let Some(msg) = read.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                let _ = tx.send(Err(WatchError::WebSocket(e.to_string()))).await;
                break;
            }
        };

        let parsed: serde_json::Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(_) => continue,
        };

        // newHeads notification carries the header under params.result
        let number = parsed
            .get("params")
            .and_then(|p| p.get("result"))
            .and_then(|r| r.get("number"))
            .and_then(|n| n.as_str())
            .and_then(|s| u64::from_str_radix(s.trim_start_matches("0x"), 16).ok());

        if let Some(number) = number {
            if tx.send(Ok(number)).await.is_err() {
                break;
            }
        }
    }

    Ok(())
}
