//! WebSocket live channel for per-cell updates
//!
//! Best effort only: messages are sent while the socket is open and dropped
//! otherwise. Nothing is queued across a reconnect.

use futures_util::{SinkExt, StreamExt};
use magnetboard_core::LiveMessage;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[derive(Debug, Clone, PartialEq)]
pub enum LiveState {
    Connecting,
    Open,
    Closed,
    Error(String),
}

impl LiveState {
    pub fn label(&self) -> String {
        match self {
            LiveState::Connecting => "connecting".to_string(),
            LiveState::Open => "open".to_string(),
            LiveState::Closed => "closed".to_string(),
            LiveState::Error(e) => format!("error: {}", e),
        }
    }
}

pub struct LiveChannel {
    url: String,
    state: Arc<Mutex<LiveState>>,
    outgoing: mpsc::UnboundedSender<LiveMessage>,
    task: JoinHandle<()>,
}

impl LiveChannel {
    /// Start connecting in the background. Must be called inside a tokio runtime.
    pub fn open(url: &str) -> Self {
        let state = Arc::new(Mutex::new(LiveState::Connecting));
        let (outgoing, rx) = mpsc::unbounded_channel();

        tracing::info!("Opening live channel to {}", url);
        let task = tokio::spawn(run_channel(url.to_string(), state.clone(), rx));

        Self {
            url: url.to_string(),
            state,
            outgoing,
            task,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> LiveState {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|_| LiveState::Error("state lock poisoned".to_string()))
    }

    /// Open or still connecting
    pub fn is_active(&self) -> bool {
        matches!(self.state(), LiveState::Connecting | LiveState::Open)
    }

    /// Returns whether the message was handed to the socket
    pub fn send(&self, msg: LiveMessage) -> bool {
        let state = self.state();
        if state != LiveState::Open {
            tracing::debug!("Live channel {}, dropping {:?}", state.label(), msg);
            return false;
        }
        self.outgoing.send(msg).is_ok()
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn set_state(state: &Mutex<LiveState>, new_state: LiveState) {
    if let Ok(mut guard) = state.lock() {
        *guard = new_state;
    }
}

async fn run_channel(
    url: String,
    state: Arc<Mutex<LiveState>>,
    mut rx: mpsc::UnboundedReceiver<LiveMessage>,
) {
    let ws = match connect_async(url.as_str()).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            tracing::error!("Live channel to {} failed to connect: {}", url, e);
            set_state(&state, LiveState::Error(e.to_string()));
            return;
        }
    };

    tracing::info!("Live channel to {} open", url);
    set_state(&state, LiveState::Open);

    let (mut write, mut read) = ws.split();
    loop {
        tokio::select! {
            outgoing = rx.recv() => match outgoing {
                Some(msg) => {
                    let json = match serde_json::to_string(&msg) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!("Failed to encode live message: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = write.send(Message::Text(json)).await {
                        tracing::error!("Live channel send failed: {}", e);
                        set_state(&state, LiveState::Error(e.to_string()));
                        break;
                    }
                }
                None => {
                    let _ = write.close().await;
                    set_state(&state, LiveState::Closed);
                    break;
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Close(frame))) => {
                    tracing::warn!("Live channel closed by device: {:?}", frame);
                    set_state(&state, LiveState::Closed);
                    break;
                }
                None => {
                    tracing::warn!("Live channel to {} closed", url);
                    set_state(&state, LiveState::Closed);
                    break;
                }
                Some(Ok(other)) => {
                    tracing::debug!("Ignoring message from device: {:?}", other);
                }
                Some(Err(e)) => {
                    tracing::error!("Live channel error: {}", e);
                    set_state(&state, LiveState::Error(e.to_string()));
                    break;
                }
            }
        }
    }
}
