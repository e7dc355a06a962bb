use crate::error::{AppError, AppResult, SinkError};
use crate::health;
use crate::models::DomainEvent;
use crate::services::messages::render_event;
use crate::services::notifier::EventSink;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::sync::RwLock;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const REQUEST_HEAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Channel carrying every match event
pub const ALL_MATCHES_CHANNEL: &str = "matches";

/// Channel carrying events for one match
pub fn match_channel(match_id: &str) -> String {
    format!("match:{}", match_id)
}

/// WebSocket message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    #[serde(rename = "subscribe")]
    Subscribe {
        channel: String, // "matches" or "match:{id}"
    },
    #[serde(rename = "unsubscribe")]
    Unsubscribe {
        channel: String,
    },
    #[serde(rename = "match_event")]
    MatchEvent {
        match_id: String,
        kind: String,
        text: String,
        event: DomainEvent,
        timestamp: i64,
    },
    #[serde(rename = "error")]
    Error {
        message: String,
    },
}

/// WebSocket server pushing match events to browsers
pub struct WebSocketServer {
    /// Broadcast sender for sending messages to all clients
    tx: broadcast::Sender<WsMessage>,
    /// Active subscriptions: channel -> set of client IDs
    subscriptions: Arc<RwLock<HashMap<String, HashSet<Uuid>>>>,
    /// Client subscriptions: client_id -> set of channels
    client_channels: Arc<RwLock<HashMap<Uuid, HashSet<String>>>>,
}

impl WebSocketServer {
    /// Create a new WebSocket server
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1000); // Buffer up to 1000 messages

        Self {
            tx,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            client_channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get a receiver for everything broadcast from now on
    pub fn receiver(&self) -> broadcast::Receiver<WsMessage> {
        self.tx.subscribe()
    }

    /// Number of clients subscribed to a channel
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        let subscriptions = self.subscriptions.read().await;
        subscriptions.get(channel).map(HashSet::len).unwrap_or(0)
    }

    /// Subscribe a client to a channel
    pub async fn subscribe(&self, client_id: Uuid, channel: String) {
        let mut subscriptions = self.subscriptions.write().await;
        let mut client_channels = self.client_channels.write().await;

        subscriptions
            .entry(channel.clone())
            .or_default()
            .insert(client_id);

        client_channels
            .entry(client_id)
            .or_default()
            .insert(channel.clone());

        info!("Client {} subscribed to {}", client_id, channel);
    }

    /// Unsubscribe a client from a channel
    pub async fn unsubscribe(&self, client_id: Uuid, channel: &str) {
        let mut subscriptions = self.subscriptions.write().await;
        let mut client_channels = self.client_channels.write().await;

        if let Some(subscribers) = subscriptions.get_mut(channel) {
            subscribers.remove(&client_id);
            if subscribers.is_empty() {
                subscriptions.remove(channel);
            }
        }

        if let Some(channels) = client_channels.get_mut(&client_id) {
            channels.remove(channel);
            if channels.is_empty() {
                client_channels.remove(&client_id);
            }
        }

        info!("Client {} unsubscribed from {}", client_id, channel);
    }

    /// Get all channels a client is subscribed to
    pub async fn get_client_channels(&self, client_id: Uuid) -> Vec<String> {
        let client_channels = self.client_channels.read().await;
        client_channels
            .get(&client_id)
            .map(|channels| channels.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Check if client should receive events for a match
    async fn wants_match(&self, client_id: Uuid, match_id: &str) -> bool {
        let client_channels = self.client_channels.read().await;
        client_channels
            .get(&client_id)
            .map(|channels| {
                channels.contains(ALL_MATCHES_CHANNEL) || channels.contains(&match_channel(match_id))
            })
            .unwrap_or(false)
    }

    /// Broadcast a domain event to clients following the match (or all matches).
    ///
    /// Returns how many subscribers the message was addressed to.
    pub async fn broadcast_match_event(&self, event: &DomainEvent) -> Result<usize, SinkError> {
        let audience = self.subscriber_count(ALL_MATCHES_CHANNEL).await
            + self.subscriber_count(&match_channel(event.match_id())).await;

        if audience == 0 {
            debug!("No WebSocket subscribers for match {}", event.match_id());
            return Ok(0);
        }

        let message = WsMessage::MatchEvent {
            match_id: event.match_id().to_string(),
            kind: event.kind_str().to_string(),
            text: render_event(event),
            event: event.clone(),
            timestamp: chrono::Utc::now().timestamp(),
        };

        self.tx
            .send(message)
            .map_err(|e| SinkError::Broadcast(e.to_string()))?;

        Ok(audience)
    }

    /// Handle a new connection: WebSocket upgrades join the feed, anything else
    /// gets the plain status page
    pub async fn handle_connection(&self, mut stream: TcpStream) -> AppResult<()> {
        let head = tokio::time::timeout(REQUEST_HEAD_TIMEOUT, health::peek_request_head(&stream))
            .await
            .map_err(|_| AppError::Message("Timed out waiting for request head".to_string()))?
            .map_err(|e| AppError::Message(format!("Failed to read request: {}", e)))?;

        if head.is_empty() {
            return Ok(());
        }

        if !health::is_websocket_upgrade(&head) {
            debug!("Serving status page");
            return health::respond(&mut stream, &head)
                .await
                .map_err(|e| AppError::Message(format!("Failed to answer status request: {}", e)));
        }

        let ws_stream = accept_async(stream)
            .await
            .map_err(|e| AppError::Message(format!("WebSocket handshake failed: {}", e)))?;

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let mut rx = self.tx.subscribe();
        let client_id = Uuid::new_v4();

        info!("New WebSocket connection: {}", client_id);

        let welcome = serde_json::json!({
            "type": "connected",
            "client_id": client_id.to_string(),
            "message": "Connected to Vortex live match feed"
        });
        if let Err(e) = ws_sender.send(Message::Text(welcome.to_string())).await {
            warn!("Failed to send welcome message: {}", e);
        }

        // Both tasks below write to the socket
        let ws_sender = Arc::new(tokio::sync::Mutex::new(ws_sender));
        let ws_sender_for_receiver = ws_sender.clone();
        let ws_server_for_receiver = self.clone();

        tokio::spawn(async move {
            while let Some(msg) = ws_receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        let reply = match serde_json::from_str::<WsMessage>(&text) {
                            Ok(WsMessage::Subscribe { channel }) => {
                                ws_server_for_receiver
                                    .subscribe(client_id, channel.clone())
                                    .await;
                                serde_json::json!({ "type": "subscribed", "channel": channel })
                            }
                            Ok(WsMessage::Unsubscribe { channel }) => {
                                ws_server_for_receiver.unsubscribe(client_id, &channel).await;
                                serde_json::json!({ "type": "unsubscribed", "channel": channel })
                            }
                            Ok(_) => {
                                warn!("Unexpected message type from client {}", client_id);
                                serde_json::json!({ "type": "error", "message": "Unsupported message type" })
                            }
                            Err(_) => {
                                warn!("Failed to parse message from client {}: {}", client_id, text);
                                serde_json::json!({ "type": "error", "message": "Invalid message format" })
                            }
                        };
                        let mut sender = ws_sender_for_receiver.lock().await;
                        if let Err(e) = sender.send(Message::Text(reply.to_string())).await {
                            warn!("Failed to send reply to {}: {}", client_id, e);
                        }
                    }
                    Ok(Message::Close(_)) => {
                        info!("WebSocket connection closed: {}", client_id);
                        break;
                    }
                    Err(e) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }

            // Clean up all subscriptions for this client
            let channels = ws_server_for_receiver.get_client_channels(client_id).await;
            for channel in channels {
                ws_server_for_receiver.unsubscribe(client_id, &channel).await;
            }
        });

        let ws_server_clone = self.clone();
        tokio::spawn(async move {
            loop {
                let msg = match rx.recv().await {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Client {} lagged, {} messages dropped", client_id, skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };

                let should_send = match &msg {
                    WsMessage::MatchEvent { match_id, .. } => {
                        ws_server_clone.wants_match(client_id, match_id).await
                    }
                    _ => false, // Don't forward subscription/unsubscribe messages
                };

                if !should_send {
                    continue;
                }

                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize message: {}", e);
                        continue;
                    }
                };

                let mut sender = ws_sender.lock().await;
                if let Err(e) = sender.send(Message::Text(json)).await {
                    debug!("Stopping broadcast to client {}: {}", client_id, e);
                    break;
                }
            }
        });

        Ok(())
    }
}

#[async_trait]
impl EventSink for WebSocketServer {
    fn name(&self) -> &str {
        "websocket"
    }

    async fn deliver(&self, event: &DomainEvent) -> Result<(), SinkError> {
        self.broadcast_match_event(event).await.map(|_| ())
    }
}

impl Clone for WebSocketServer {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            subscriptions: Arc::clone(&self.subscriptions),
            client_channels: Arc::clone(&self.client_channels),
        }
    }
}

impl Default for WebSocketServer {
    fn default() -> Self {
        Self::new()
    }
}
